pub mod analysis;
pub mod code;
pub mod input;
pub mod panels;
pub mod preview;
