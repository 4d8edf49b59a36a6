use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::config::Config;
use crate::data::model::AnalysisResult;
use crate::data::validate::GenerateRequest;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Request failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("service returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    #[error("could not reach the analysis service: {0}")]
    Transport(String),

    #[error("unexpected response from the analysis service: {0}")]
    InvalidResponse(String),

    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Message for the error banner: the service's own detail when it sent one,
    /// the generic fallback otherwise. The full error only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Rejected { detail: Some(d), .. } if !d.trim().is_empty() => d.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::InvalidResponse(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Service seam
// ---------------------------------------------------------------------------

/// The remote analysis service. Calls block; the app runs them on worker threads.
pub trait AnalysisService: Send + Sync {
    fn analyze(&self, request: &GenerateRequest) -> Result<AnalysisResult, ServiceError>;

    fn list_examples(&self) -> Result<Vec<String>, ServiceError>;

    fn fetch_example(&self, id: &str) -> Result<AnalysisResult, ServiceError>;

    fn health(&self) -> Result<(), ServiceError>;
}

// ---------------------------------------------------------------------------
// Example labels
// ---------------------------------------------------------------------------

const EXAMPLE_LABELS: &[(&str, &str)] = &[
    ("food-pantry", "Food Pantry"),
    ("library", "Library"),
    ("clinic", "Clinic"),
];

/// Display label for an example id, the raw id when unknown.
pub fn example_label(id: &str) -> &str {
    EXAMPLE_LABELS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, label)| *label)
        .unwrap_or(id)
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// FastAPI error body. `detail` is a string, or a list of validation issues.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

pub struct HttpAnalysisService {
    base: Url,
    client: Client,
}

impl HttpAnalysisService {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        let base = Url::parse(&config.api_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {e}", config.api_url)))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(config.api_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { base, client })
    }

    /// Append path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ServiceError> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {url}");
        let response = self.client.get(url).send()?;
        decode(response)
    }
}

impl AnalysisService for HttpAnalysisService {
    fn analyze(&self, request: &GenerateRequest) -> Result<AnalysisResult, ServiceError> {
        let url = self.endpoint(&["analyze"])?;
        let image = multipart::Part::bytes(request.image.bytes.to_vec())
            .file_name(request.image.file_name.clone())
            .mime_str(request.image.mime)?;
        let form = multipart::Form::new()
            .text("description", request.description.clone())
            .part("image", image);

        log::info!(
            "POST {url} ({} bytes, {:?})",
            request.image.len(),
            request.image.mime
        );
        let response = self.client.post(url).multipart(form).send()?;
        decode(response)
    }

    fn list_examples(&self) -> Result<Vec<String>, ServiceError> {
        self.get_json(&["examples"])
    }

    fn fetch_example(&self, id: &str) -> Result<AnalysisResult, ServiceError> {
        self.get_json(&["examples", id])
    }

    fn health(&self) -> Result<(), ServiceError> {
        let body: HealthBody = self.get_json(&["health"])?;
        if body.status == "healthy" {
            Ok(())
        } else {
            Err(ServiceError::InvalidResponse(format!(
                "health status {:?}",
                body.status
            )))
        }
    }
}

/// Turn a response into `T`, or into a `Rejected` error carrying the service's detail.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json()?);
    }
    let body = response.text().unwrap_or_default();
    Err(ServiceError::Rejected {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        JsonValue::String(s) => Some(s),
        JsonValue::Array(issues) => issues
            .iter()
            .filter_map(|issue| issue.get("msg").and_then(JsonValue::as_str))
            .next()
            .map(str::to_owned),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_url: &str) -> HttpAnalysisService {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        HttpAnalysisService::new(&config).unwrap()
    }

    #[test]
    fn test_example_labels() {
        assert_eq!(example_label("food-pantry"), "Food Pantry");
        assert_eq!(example_label("clinic"), "Clinic");
        assert_eq!(example_label("kanban-board"), "kanban-board");
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ServiceError::Rejected {
            status: 400,
            detail: Some("File must be an image".into()),
        };
        assert_eq!(err.user_message(), "File must be an image");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let err = ServiceError::Rejected {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let blank = ServiceError::Rejected {
            status: 502,
            detail: Some("  ".into()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_user_message_hides_local_failures() {
        let transport = ServiceError::Transport("connection refused".into());
        assert_eq!(transport.user_message(), GENERIC_FAILURE);
        assert!(transport.to_string().contains("connection refused"));

        let garbled = ServiceError::InvalidResponse("expected value at line 1".into());
        assert_eq!(garbled.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(
            error_detail(r#"{"detail":"Example 'x' not found."}"#).as_deref(),
            Some("Example 'x' not found.")
        );
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#).as_deref(),
            Some("field required")
        );
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail("{}"), None);
    }

    #[test]
    fn test_endpoint_joins_and_escapes_segments() {
        let svc = service("http://localhost:8000/api/v1/");
        assert_eq!(
            svc.endpoint(&["examples", "food-pantry"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/examples/food-pantry"
        );
        assert_eq!(
            svc.endpoint(&["examples", "a/b c"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/examples/a%2Fb%20c"
        );

        let svc = service("http://localhost:8000/api/v1");
        assert_eq!(
            svc.endpoint(&["analyze"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/analyze"
        );
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let config = Config {
            api_url: "mailto:someone@example.com".into(),
            ..Config::default()
        };
        assert!(matches!(
            HttpAnalysisService::new(&config),
            Err(ServiceError::InvalidUrl(_))
        ));
    }
}
