//! Line cursors over a section
//!
//! A [`LineCursor`] is a small handle, not a borrow, so it can be held across
//! calls that mutate the document. Every cursor remembers which document it
//! belongs to and the generation it was created at; once the document changes
//! shape through any other path, or the cursor is handed to a different
//! document, it is stale and refuses to read, update or advance.

use super::error::{IniError, Result};
use super::ini_file::{validate_value, IniFile, Line};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCursor {
    document: u64,
    section: usize,
    line: Option<usize>,
    generation: u64,
}

impl LineCursor {
    /// True once the cursor has walked past the last key of its section
    pub fn is_exhausted(&self) -> bool {
        self.line.is_none()
    }
}

impl IniFile {
    fn check(&self, cursor: &LineCursor) -> Result<(usize, usize)> {
        if cursor.document != self.id || cursor.generation != self.generation {
            return Err(IniError::StaleCursor);
        }
        let li = cursor.line.ok_or(IniError::Exhausted)?;
        match self.sections.get(cursor.section) {
            Some(s) if li < s.lines.len() => Ok((cursor.section, li)),
            _ => Err(IniError::StaleCursor),
        }
    }

    fn line_at(&mut self, si: usize, li: usize) -> Result<&mut Line> {
        self.sections
            .get_mut(si)
            .and_then(|s| s.lines.get_mut(li))
            .ok_or(IniError::StaleCursor)
    }

    /// Position a cursor on the first key of `section`, skipping comment and
    /// blank lines. `None` if the section does not exist.
    pub fn begin_line(&self, section: Option<&str>) -> Option<LineCursor> {
        let si = self.find_section(section)?;
        Some(LineCursor {
            document: self.id,
            section: si,
            line: self.sections[si].next_keyed(0),
            generation: self.generation,
        })
    }

    /// Key and value under the cursor
    pub fn get_line(&self, cursor: &LineCursor) -> Result<(&str, &str)> {
        let (si, li) = self.check(cursor)?;
        let line = self
            .sections
            .get(si)
            .and_then(|s| s.lines.get(li))
            .ok_or(IniError::StaleCursor)?;
        Ok((line.key().unwrap_or_default(), line.value()))
    }

    /// Replace the value under the cursor
    pub fn update_line(&mut self, cursor: &LineCursor, value: &str) -> Result<()> {
        let (si, li) = self.check(cursor)?;
        validate_value(value, self.options)?;
        self.line_at(si, li)?.value = Some(value.to_string());
        self.changed = true;
        Ok(())
    }

    /// Advance to the next key of the section. Returns false at the end of
    /// the section or when the cursor is stale.
    pub fn next_line(&self, cursor: &mut LineCursor) -> bool {
        let Ok((si, li)) = self.check(cursor) else {
            return false;
        };
        cursor.line = self.sections[si].next_keyed(li + 1);
        cursor.line.is_some()
    }

    /// Remove the line under the cursor and move to the next surviving key.
    ///
    /// When that was the last key of the section the whole section goes and
    /// the cursor is left exhausted. The cursor used here stays valid; any
    /// other cursor into this document becomes stale.
    pub fn remove_current_line(&mut self, cursor: &mut LineCursor) -> Result<()> {
        let (si, li) = self.check(cursor)?;
        let section_removed = self.remove_at(si, li);
        cursor.generation = self.generation;
        cursor.line = if section_removed {
            None
        } else {
            self.sections[si].next_keyed(li)
        };
        Ok(())
    }
}
