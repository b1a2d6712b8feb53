//! In-memory INI document
//!
//! An [`IniFile`] keeps its sections in file order inside a plain vector.
//! Index 0 always holds the anonymous pseudo-section that collects whatever
//! precedes the first `[header]` (only comments and blank lines in strict
//! mode, everything in registry mode).

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, warn};

use super::error::{IniError, Result};
use crate::parser::ini_parser::parse_sections;
use crate::parser::types::ParseOptions;
use crate::utils::file::{file_exists, file_get};
use crate::utils::string::{eq_ignore_case, is_blank};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_document_id() -> u64 {
    NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A single line of a section: key/value, comment-only or blank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub(crate) key: Option<String>,
    pub(crate) value: Option<String>,
    pub(crate) comment: Option<String>,
}

impl Line {
    pub fn keyed(key: &str, value: &str) -> Self {
        Line {
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            comment: None,
        }
    }

    pub fn comment_only(comment: &str) -> Self {
        Line {
            comment: Some(comment.to_string()),
            ..Default::default()
        }
    }

    pub fn blank() -> Self {
        Line::default()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Value of a keyed line; a key written as `key=` reads back as `""`
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.key.is_none() && self.value.is_none() && self.comment.is_none()
    }

    pub(crate) fn key_matches(&self, key: &str) -> bool {
        self.key.as_deref().is_some_and(|k| eq_ignore_case(k, key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub(crate) name: Option<String>,
    /// Comment trailing the `[name]` header on the same line
    pub(crate) comment: Option<String>,
    pub(crate) lines: Vec<Line>,
}

impl Section {
    pub(crate) fn new(name: Option<String>) -> Self {
        Section {
            name,
            comment: None,
            lines: Vec::new(),
        }
    }

    /// `None` for the pseudo-section
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn has_keys(&self) -> bool {
        self.lines.iter().any(Line::has_key)
    }

    pub(crate) fn is_named(&self, name: &str) -> bool {
        self.name.as_deref().is_some_and(|n| eq_ignore_case(n, name))
    }

    pub(crate) fn find_key(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.key_matches(key))
    }

    /// Index of the first key-bearing line at or after `from`
    pub(crate) fn next_keyed(&self, from: usize) -> Option<usize> {
        self.lines
            .iter()
            .skip(from)
            .position(Line::has_key)
            .map(|offset| from + offset)
    }
}

/// An INI document plus the file it is backed by
#[derive(Debug)]
pub struct IniFile {
    /// Process-unique identity, so cursors cannot be used across documents
    pub(crate) id: u64,
    pub(crate) sections: Vec<Section>,
    pub(crate) path: PathBuf,
    pub(crate) changed: bool,
    /// Bumped on every structural change; line cursors minted at another
    /// generation are stale
    pub(crate) generation: u64,
    pub(crate) options: ParseOptions,
    /// Document-level slot driven by `first_section_name`/`next_section_name`
    pub(crate) section_cursor: Option<usize>,
}

impl Clone for IniFile {
    /// The copy is a separate document: cursors minted on one are stale on
    /// the other
    fn clone(&self) -> Self {
        IniFile {
            id: next_document_id(),
            sections: self.sections.clone(),
            path: self.path.clone(),
            changed: self.changed,
            generation: self.generation,
            options: self.options,
            section_cursor: self.section_cursor,
        }
    }
}

impl IniFile {
    /// Create an empty document backed by `path`, without touching the disk
    pub fn new<P: AsRef<Path>>(path: P, options: ParseOptions) -> Self {
        IniFile {
            id: next_document_id(),
            sections: vec![Section::new(None)],
            path: path.as_ref().to_path_buf(),
            changed: false,
            generation: 0,
            options,
            section_cursor: None,
        }
    }

    /// Open and parse a strict-mode INI file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ParseOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        if !file_exists(path) {
            return Err(IniError::NotFound(path.to_path_buf()));
        }

        let content = file_get(path).map_err(|e| {
            error!("Error reading INI file '{}': {}", path.display(), e);
            IniError::io(path, e)
        })?;

        let source_name = path.display().to_string();
        let sections = parse_sections(&content, &source_name, options).inspect_err(|e| {
            error!("{}", e);
        })?;

        debug!(
            "Loaded {} section(s) from {}",
            sections.len().saturating_sub(1),
            source_name
        );

        let mut ini = IniFile::new(path, options);
        ini.sections = sections;
        Ok(ini)
    }

    /// Like [`IniFile::open_with`], but a missing file yields an empty
    /// document backed by that path
    pub fn open_or_empty<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        match Self::open_with(path.as_ref(), options) {
            Err(IniError::NotFound(p)) => {
                debug!("{} does not exist, starting empty", p.display());
                Ok(IniFile::new(p, options))
            }
            other => other,
        }
    }

    /// Create a new, empty INI file on disk, truncating any existing one
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with(path, ParseOptions::default())
    }

    pub fn create_with<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        File::create(path).map_err(|e| {
            error!("Cannot create INI file '{}': {}", path.display(), e);
            IniError::io(path, e)
        })?;
        Ok(IniFile::new(path, options))
    }

    /// Parse INI text that does not come from a file
    pub fn parse_str(content: &str, options: ParseOptions) -> Result<Self> {
        let sections = parse_sections(content, "<memory>", options)?;
        let mut ini = IniFile::new(PathBuf::new(), options);
        ini.sections = sections;
        Ok(ini)
    }

    /// Release the document. Unwritten changes are dropped with a warning.
    pub fn close(self) {
        if self.changed {
            warn!(
                "Closing {} with unsaved changes",
                if self.path.as_os_str().is_empty() {
                    "<memory>".to_string()
                } else {
                    self.path.display().to_string()
                }
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// True when the in-memory image differs from what was last written
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All sections in file order, pseudo-section first
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Resolve a section argument to its index. `None` names the
    /// pseudo-section; in registry mode every name resolves to it.
    pub(crate) fn find_section(&self, section: Option<&str>) -> Option<usize> {
        match section {
            _ if self.options.is_registry() => Some(0),
            None => Some(0),
            Some(name) => self.sections.iter().position(|s| s.is_named(name)),
        }
    }

    pub fn section(&self, section: Option<&str>) -> Option<&Section> {
        self.find_section(section).map(|i| &self.sections[i])
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.find_section(Some(name)).is_some()
    }

    /// Look up `key` in `section`; the first matching section wins
    pub fn get_string(&self, section: Option<&str>, key: &str) -> Option<&str> {
        let s = &self.sections[self.find_section(section)?];
        s.find_key(key).map(|i| s.lines[i].value())
    }

    /// Replace the value of `section`/`key`, appending the key (and creating
    /// the section at the end of the document) when absent
    pub fn put_string(&mut self, section: Option<&str>, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(value, self.options)?;
        if section.is_none() && !self.options.is_registry() {
            return Err(IniError::OutOfSection);
        }

        match self.find_section(section) {
            Some(si) => {
                let s = &mut self.sections[si];
                match s.find_key(key) {
                    Some(li) => {
                        s.lines[li].value = Some(value.to_string());
                    }
                    None => {
                        s.lines.push(Line::keyed(key, value));
                        self.generation += 1;
                    }
                }
            }
            None => {
                let Some(name) = section else {
                    return Err(IniError::OutOfSection);
                };
                validate_section_name(name)?;
                let mut s = Section::new(Some(name.to_string()));
                s.lines.push(Line::keyed(key, value));
                self.sections.push(s);
                self.generation += 1;
            }
        }
        self.changed = true;
        Ok(())
    }

    /// Remove `section`/`key`; a section left without keys goes with it
    pub fn remove_line(&mut self, section: Option<&str>, key: &str) -> Result<()> {
        let section_label = section.unwrap_or_default().to_string();
        let si = self
            .find_section(section)
            .ok_or_else(|| IniError::SectionNotFound(section_label.clone()))?;
        let li = self.sections[si]
            .find_key(key)
            .ok_or_else(|| IniError::KeyNotFound {
                section: section_label,
                key: key.to_string(),
            })?;
        self.remove_at(si, li);
        Ok(())
    }

    /// Remove a named section with all its lines
    pub fn remove_section(&mut self, name: &str) -> Result<()> {
        match self.sections.iter().position(|s| s.is_named(name)) {
            Some(si) => {
                self.unlink_section(si);
                self.generation += 1;
                self.changed = true;
                Ok(())
            }
            None => Err(IniError::SectionNotFound(name.to_string())),
        }
    }

    /// Unlink line `li` of section `si`. Returns true when the section was
    /// removed as well.
    pub(crate) fn remove_at(&mut self, si: usize, li: usize) -> bool {
        let s = &mut self.sections[si];
        s.lines.remove(li);
        let drop_section = si != 0 && !s.has_keys();
        if drop_section {
            debug!("Section {:?} has no keys left, removing it", s.name);
            self.unlink_section(si);
        }
        self.generation += 1;
        self.changed = true;
        drop_section
    }

    fn unlink_section(&mut self, si: usize) {
        self.sections.remove(si);
        self.section_cursor = match self.section_cursor {
            Some(c) if c == si => None,
            Some(c) if c > si => Some(c - 1),
            other => other,
        };
    }

    /// Name of the first named section; restarts the document-level
    /// section iterator
    pub fn first_section_name(&mut self) -> Option<&str> {
        self.section_cursor = if self.sections.len() > 1 { Some(1) } else { None };
        self.current_section_name()
    }

    pub fn next_section_name(&mut self) -> Option<&str> {
        self.section_cursor = match self.section_cursor {
            Some(c) if c + 1 < self.sections.len() => Some(c + 1),
            _ => None,
        };
        self.current_section_name()
    }

    fn current_section_name(&self) -> Option<&str> {
        self.section_cursor
            .and_then(|c| self.sections.get(c))
            .and_then(Section::name)
    }

    /// Names of all named sections, in file order
    pub fn section_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().filter_map(Section::name)
    }

    /// Key/value pairs of `section`, skipping comment and blank lines
    pub fn pairs(&self, section: Option<&str>) -> Option<impl Iterator<Item = (&str, &str)> + '_> {
        let s = &self.sections[self.find_section(section)?];
        Some(
            s.lines
                .iter()
                .filter_map(|l| l.key().map(|k| (k, l.value()))),
        )
    }

    /// Call `f` on every key/value pair of `section` and return how many
    /// pairs were visited. In registry mode this covers the whole document.
    pub fn for_each_pair<F>(&self, section: Option<&str>, mut f: F) -> usize
    where
        F: FnMut(&str, &str),
    {
        let mut count = 0;
        if let Some(pairs) = self.pairs(section) {
            for (key, value) in pairs {
                f(key, value);
                count += 1;
            }
        }
        count
    }
}

fn invalid(what: &'static str, value: &str) -> IniError {
    IniError::Invalid {
        what,
        value: value.to_string(),
    }
}

/// True when `text` starts or ends with a space or tab, which the parser
/// would strip on the way back in
fn has_outer_blanks(text: &str) -> bool {
    text.chars().next().is_some_and(is_blank) || text.chars().next_back().is_some_and(is_blank)
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || has_outer_blanks(key) {
        return Err(invalid("key", key));
    }
    if key.starts_with([';', '#', '[']) || key.contains(['=', '\r', '\n']) {
        return Err(invalid("key", key));
    }
    Ok(())
}

/// Reject values that would not read back unchanged after a write
pub(crate) fn validate_value(value: &str, options: ParseOptions) -> Result<()> {
    if value.contains(['\r', '\n']) || has_outer_blanks(value) {
        return Err(invalid("value", value));
    }
    if options.inline_comments {
        let mut prev_blank = false;
        for c in value.chars() {
            if prev_blank && (c == ';' || c == '#') {
                return Err(invalid("value", value));
            }
            prev_blank = is_blank(c);
        }
    }
    Ok(())
}

fn validate_section_name(name: &str) -> Result<()> {
    if name.contains([']', '\r', '\n']) {
        return Err(invalid("section name", name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IniFile {
        IniFile::parse_str(
            "; top comment\n[Sound]\nvolume=80\nmusic = on\n[Video]\nfullscreen=1\n",
            ParseOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_get_string_case_insensitive() {
        let ini = sample();
        assert_eq!(ini.get_string(Some("sound"), "VOLUME"), Some("80"));
        assert_eq!(ini.get_string(Some("Sound"), "music"), Some("on"));
        assert_eq!(ini.get_string(Some("Sound"), "missing"), None);
        assert_eq!(ini.get_string(Some("Nope"), "volume"), None);
    }

    #[test]
    fn test_put_string_replaces_in_place() {
        let mut ini = sample();
        let generation = ini.generation();
        ini.put_string(Some("SOUND"), "Volume", "50").unwrap();
        assert!(ini.has_changed());
        assert_eq!(ini.generation(), generation);
        assert_eq!(ini.get_string(Some("sound"), "volume"), Some("50"));
        assert_eq!(ini.pairs(Some("Sound")).unwrap().count(), 2);
    }

    #[test]
    fn test_put_string_appends_key_and_section() {
        let mut ini = sample();
        ini.put_string(Some("Video"), "width", "640").unwrap();
        ini.put_string(Some("Input"), "mouse", "yes").unwrap();
        let names: Vec<&str> = ini.section_names().collect();
        assert_eq!(names, vec!["Sound", "Video", "Input"]);
        assert_eq!(ini.get_string(Some("video"), "width"), Some("640"));
    }

    #[test]
    fn test_put_string_rejects_pseudo_section_in_strict_mode() {
        let mut ini = sample();
        assert!(matches!(
            ini.put_string(None, "k", "v"),
            Err(IniError::OutOfSection)
        ));
        assert!(!ini.has_changed());
    }

    #[test]
    fn test_put_string_rejects_malformed_keys() {
        let mut ini = sample();
        assert!(ini.put_string(Some("Sound"), "", "v").is_err());
        assert!(ini.put_string(Some("Sound"), "a=b", "v").is_err());
        assert!(ini.put_string(Some("Sound"), "k", "two\nlines").is_err());
        assert!(ini.put_string(Some("Bad]"), "k", "v").is_err());
        assert!(ini.put_string(Some("Sound"), " k", "v").is_err());
        assert!(ini.put_string(Some("Sound"), "k\t", "v").is_err());
    }

    #[test]
    fn test_put_string_rejects_values_that_would_not_read_back() {
        let mut ini = sample();
        for value in ["red ;blue", "red\t#blue", "  x  ", " x", "x "] {
            assert!(
                matches!(
                    ini.put_string(Some("Sound"), "k", value),
                    Err(IniError::Invalid { what: "value", .. })
                ),
                "value {:?}",
                value
            );
        }
        assert_eq!(ini.get_string(Some("Sound"), "k"), None);

        ini.put_string(Some("Sound"), "k", "red;blue").unwrap();
        ini.put_string(Some("Sound"), "url", "http://host/#top").unwrap();
        let reparsed = IniFile::parse_str(&ini.render(), ParseOptions::default()).unwrap();
        assert_eq!(reparsed.get_string(Some("Sound"), "k"), Some("red;blue"));
        assert_eq!(
            reparsed.get_string(Some("Sound"), "url"),
            Some("http://host/#top")
        );
    }

    #[test]
    fn test_put_string_without_inline_comments_keeps_semicolons() {
        let options = ParseOptions {
            inline_comments: false,
            ..ParseOptions::default()
        };
        let mut ini = IniFile::parse_str("[S]\n", options).unwrap();
        ini.put_string(Some("S"), "k", "red ;blue").unwrap();
        assert!(ini.put_string(Some("S"), "pad", " x").is_err());

        let reparsed = IniFile::parse_str(&ini.render(), options).unwrap();
        assert_eq!(reparsed.get_string(Some("S"), "k"), Some("red ;blue"));
    }

    #[test]
    fn test_remove_line_cascades() {
        let mut ini = sample();
        ini.remove_line(Some("video"), "FULLSCREEN").unwrap();
        assert!(!ini.has_section("Video"));
        assert!(ini.has_section("Sound"));
        assert!(matches!(
            ini.remove_line(Some("Video"), "fullscreen"),
            Err(IniError::SectionNotFound(_))
        ));
        assert!(matches!(
            ini.remove_line(Some("Sound"), "nothing"),
            Err(IniError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_section_iteration_skips_pseudo_section() {
        let mut ini = sample();
        assert_eq!(ini.first_section_name(), Some("Sound"));
        assert_eq!(ini.next_section_name(), Some("Video"));
        assert_eq!(ini.next_section_name(), None);
        assert_eq!(ini.next_section_name(), None);
    }

    #[test]
    fn test_section_slot_cleared_when_its_section_is_removed() {
        let mut ini = sample();
        assert_eq!(ini.first_section_name(), Some("Sound"));
        ini.remove_line(Some("Sound"), "volume").unwrap();
        ini.remove_line(Some("Sound"), "music").unwrap();
        assert_eq!(ini.next_section_name(), None);
        assert_eq!(ini.first_section_name(), Some("Video"));
    }

    #[test]
    fn test_section_slot_follows_shifted_index() {
        let mut ini = sample();
        ini.first_section_name();
        assert_eq!(ini.next_section_name(), Some("Video"));
        ini.remove_section("Sound").unwrap();
        assert_eq!(ini.current_section_name(), Some("Video"));
        assert_eq!(ini.next_section_name(), None);
    }

    #[test]
    fn test_for_each_pair_counts() {
        let ini = sample();
        let mut seen = Vec::new();
        let count = ini.for_each_pair(Some("Sound"), |k, v| seen.push(format!("{k}={v}")));
        assert_eq!(count, 2);
        assert_eq!(seen, vec!["volume=80", "music=on"]);
        assert_eq!(ini.for_each_pair(Some("Missing"), |_, _| {}), 0);
    }

    #[test]
    fn test_duplicate_sections_resolve_to_first() {
        let ini = IniFile::parse_str("[A]\nk=1\n[a]\nk=2\n", ParseOptions::default()).unwrap();
        assert_eq!(ini.get_string(Some("A"), "k"), Some("1"));
        assert_eq!(ini.section_names().count(), 2);
    }

    #[test]
    fn test_registry_mode_is_flat() {
        let mut ini = IniFile::parse_str(
            "fullscreen=yes\n[ignored]\nnosound=1\n",
            ParseOptions::registry(),
        )
        .unwrap();
        assert_eq!(ini.get_string(None, "nosound"), Some("1"));
        assert_eq!(ini.get_string(Some("whatever"), "fullscreen"), Some("yes"));
        assert_eq!(ini.section_names().count(), 0);
        ini.put_string(None, "windowed", "1").unwrap();
        assert_eq!(ini.for_each_pair(None, |_, _| {}), 3);
    }
}
