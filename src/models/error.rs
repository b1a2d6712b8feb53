use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// What went wrong while tokenizing an INI stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A key/value line appeared before the first `[section]` header
    ContentBeforeSection,
    /// A key was not followed by `=` before the end of its line
    UnterminatedKey,
    /// The stream ended inside a `[section` header
    UnterminatedSection,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::ContentBeforeSection => write!(f, "content before first section"),
            ParseErrorKind::UnterminatedKey => write!(f, "key without '='"),
            ParseErrorKind::UnterminatedSection => {
                write!(f, "end of file reached while in section name")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum IniError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Parse error in {source_name} on line {line}: {kind}")]
    Parse {
        source_name: String,
        line: usize,
        kind: ParseErrorKind,
    },

    #[error("Section {0:?} not found")]
    SectionNotFound(String),

    #[error("Key '{key}' not found in section {section:?}")]
    KeyNotFound { section: String, key: String },

    #[error("Invalid {what}: {value:?}")]
    Invalid { what: &'static str, value: String },

    #[error("Item exists outside of any section")]
    OutOfSection,

    #[error("Line cursor refers to an older revision of the document")]
    StaleCursor,

    #[error("Line cursor is exhausted")]
    Exhausted,
}

impl IniError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IniError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "no such section/key" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IniError::NotFound(_) | IniError::SectionNotFound(_) | IniError::KeyNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IniError>;
