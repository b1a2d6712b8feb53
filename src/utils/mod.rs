pub mod file;
pub mod string;

// Re-export common utilities
pub use file::{file_exists, file_get, write_atomic};
pub use string::{eq_ignore_case, trim_blanks_end};
