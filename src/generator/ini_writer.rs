//! Serialize an [`IniFile`] back to INI text
//!
//! Output layout, kept compatible with files written by older game ports:
//!
//! ```text
//! [Section] ;header comment
//! key=value  ;comment
//! ```
//!
//! Every key line carries one trailing space after its value, and a comment
//! is always introduced by ` ;`.

use std::fmt::{self, Display};
use std::path::Path;

use log::{debug, error};

use crate::models::error::{IniError, Result};
use crate::models::ini_file::{IniFile, Line, Section};
use crate::utils::file::write_atomic;

fn write_line(out: &mut impl fmt::Write, line: &Line) -> fmt::Result {
    if let Some(key) = line.key() {
        write!(out, "{}=", key)?;
        if let Some(value) = &line.value {
            write!(out, "{}", value)?;
        }
        out.write_char(' ')?;
    }
    if let Some(comment) = line.comment() {
        write!(out, " ;{}", comment)?;
    }
    out.write_char('\n')
}

fn write_section(out: &mut impl fmt::Write, section: &Section) -> fmt::Result {
    if let Some(name) = section.name() {
        write!(out, "[{}]", name)?;
        if let Some(comment) = section.comment() {
            write!(out, " ;{}", comment)?;
        }
        out.write_char('\n')?;
    }
    for line in section.lines() {
        write_line(out, line)?;
    }
    Ok(())
}

impl Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in self.sections() {
            write_section(f, section)?;
        }
        Ok(())
    }
}

impl IniFile {
    /// Render the document as INI text
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the document to `path`, or to the file it was opened from.
    ///
    /// The text goes to a temporary file next to the target which is then
    /// renamed over it. On success the changed flag is cleared; on failure
    /// the document is left as it was.
    pub fn write(&mut self, path: Option<&Path>) -> Result<()> {
        let target = path.unwrap_or(self.path.as_path()).to_path_buf();
        if target.as_os_str().is_empty() {
            return Err(IniError::io(
                target,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "document has no backing file",
                ),
            ));
        }

        let content = self.render();
        if let Err(e) = write_atomic(&target, &content) {
            error!("Failed to write INI file '{}': {}", target.display(), e);
            return Err(IniError::io(target, e));
        }

        debug!("Wrote {} bytes to {}", content.len(), target.display());
        self.changed = false;
        Ok(())
    }
}
