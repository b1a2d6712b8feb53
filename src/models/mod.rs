//! Core data models for the INI store
//!
//! This module contains the document tree, the line cursor and the error
//! type, separated from the parser and writer that operate on them.
//!
//! # Usage
//!
//! ```rust
//! use loki_ini::models::IniFile;
//! use loki_ini::ParseOptions;
//!
//! let ini = IniFile::parse_str("[Game]\nlevel=3\n", ParseOptions::default()).unwrap();
//! let mut cursor = ini.begin_line(Some("game")).unwrap();
//! assert_eq!(ini.get_line(&cursor).unwrap(), ("level", "3"));
//! assert!(!ini.next_line(&mut cursor));
//! ```

pub mod cursor;
pub mod error;
pub mod ini_file;

pub use cursor::LineCursor;
pub use error::{IniError, ParseErrorKind, Result};
pub use ini_file::{IniFile, Line, Section};
