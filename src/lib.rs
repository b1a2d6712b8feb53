//! Reader and editor for Windows-style INI files
//!
//! ```rust
//! use loki_ini::{IniFile, ParseOptions};
//!
//! let mut ini = IniFile::parse_str("[Sound]\nvolume=80\n", ParseOptions::default()).unwrap();
//! assert_eq!(ini.get_string(Some("sound"), "VOLUME"), Some("80"));
//!
//! ini.put_string(Some("Video"), "fullscreen", "1").unwrap();
//! assert!(ini.has_changed());
//! assert_eq!(ini.render(), "[Sound]\nvolume=80 \n[Video]\nfullscreen=1 \n");
//! ```

pub mod generator;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;

// Re-export the document types for easier access
pub use models::{IniError, IniFile, Line, LineCursor, ParseErrorKind, Result, Section};

// Re-export parser configuration
pub use parser::types::{ParseMode, ParseOptions};

pub use settings::profile::Profile;
