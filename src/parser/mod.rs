pub mod ini_parser;
pub mod types;

pub use types::{ParseMode, ParseOptions};
