//! Character-level INI tokenizer
//!
//! The input is consumed one character at a time through a small state
//! machine, building sections and lines as it goes.

use crate::models::error::{IniError, ParseErrorKind, Result};
use crate::models::ini_file::{Line, Section};
use crate::parser::types::ParseOptions;
use crate::utils::string::{is_blank, trim_blanks_end};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InSectionName,
    InKey,
    InValue,
    BeforeComment,
    InComment,
}

/// Where a comment being read will be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentTarget {
    Line,
    Header,
}

struct Parser<'a> {
    source_name: &'a str,
    options: ParseOptions,
    sections: Vec<Section>,
    state: State,
    target: CommentTarget,
    buf: String,
    line_number: usize,
    prev: char,
}

/// Parse INI text into sections. The first returned section is always the
/// anonymous pseudo-section.
pub(crate) fn parse_sections(
    content: &str,
    source_name: &str,
    options: ParseOptions,
) -> Result<Vec<Section>> {
    let mut parser = Parser::new(source_name, options);
    for c in content.chars() {
        parser.feed(c)?;
    }
    parser.finish()
}

impl<'a> Parser<'a> {
    fn new(source_name: &'a str, options: ParseOptions) -> Self {
        Parser {
            source_name,
            options,
            sections: vec![Section::new(None)],
            state: State::Start,
            target: CommentTarget::Line,
            buf: String::new(),
            line_number: 1,
            prev: '\0',
        }
    }

    fn error(&self, kind: ParseErrorKind) -> IniError {
        IniError::Parse {
            source_name: self.source_name.to_string(),
            line: self.line_number,
            kind,
        }
    }

    fn section(&mut self) -> &mut Section {
        // Never empty: the pseudo-section is pushed in `new`
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    fn push_line(&mut self) {
        self.section().lines.push(Line::blank());
    }

    fn line(&mut self) -> Option<&mut Line> {
        self.section().lines.last_mut()
    }

    fn take_buf(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    fn commit_value(&mut self) {
        let value = trim_blanks_end(&self.take_buf()).to_string();
        if let Some(line) = self.line() {
            line.value = Some(value);
        }
    }

    fn commit_comment(&mut self) {
        let comment = self.take_buf();
        match self.target {
            CommentTarget::Header => self.section().comment = Some(comment),
            CommentTarget::Line => {
                if let Some(line) = self.line() {
                    line.comment = Some(comment);
                }
            }
        }
    }

    fn feed(&mut self, c: char) -> Result<()> {
        match self.state {
            State::Start => match c {
                '\r' => {}
                '\n' => {
                    self.push_line();
                    self.line_number += 1;
                }
                ';' | '#' => {
                    self.push_line();
                    self.target = CommentTarget::Line;
                    self.state = State::InComment;
                }
                '[' => {
                    if !self.options.is_registry() {
                        self.sections.push(Section::new(None));
                    }
                    self.state = State::InSectionName;
                }
                c if is_blank(c) => {}
                c => {
                    if !self.options.is_registry() && self.section().name.is_none() {
                        return Err(self.error(ParseErrorKind::ContentBeforeSection));
                    }
                    self.push_line();
                    self.buf.push(c);
                    self.state = State::InKey;
                }
            },
            State::InSectionName => match c {
                ']' => {
                    let name = self.take_buf();
                    if !self.options.is_registry() {
                        self.section().name = Some(name);
                    }
                    self.state = State::BeforeComment;
                }
                '\n' => return Err(self.error(ParseErrorKind::UnterminatedSection)),
                '\r' => {}
                c => self.buf.push(c),
            },
            State::InKey => match c {
                '=' => {
                    let key = trim_blanks_end(&self.take_buf()).to_string();
                    if let Some(line) = self.line() {
                        line.key = Some(key);
                    }
                    self.state = State::InValue;
                }
                '\n' | '\r' => return Err(self.error(ParseErrorKind::UnterminatedKey)),
                c => self.buf.push(c),
            },
            State::InValue => match c {
                ';' | '#' if self.options.inline_comments && is_blank(self.prev) => {
                    self.commit_value();
                    self.target = CommentTarget::Line;
                    self.state = State::InComment;
                }
                '\n' => {
                    self.commit_value();
                    self.line_number += 1;
                    self.state = State::Start;
                }
                '\r' => {}
                c if is_blank(c) && self.buf.is_empty() => {}
                c => self.buf.push(c),
            },
            State::BeforeComment => match c {
                ';' | '#' => {
                    if self.options.is_registry() {
                        self.push_line();
                        self.target = CommentTarget::Line;
                    } else {
                        self.target = CommentTarget::Header;
                    }
                    self.state = State::InComment;
                }
                '\n' => {
                    self.line_number += 1;
                    self.state = State::Start;
                }
                _ => {}
            },
            State::InComment => match c {
                '\n' => {
                    self.commit_comment();
                    self.line_number += 1;
                    self.state = State::Start;
                }
                '\r' => {}
                c => self.buf.push(c),
            },
        }
        self.prev = c;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Section>> {
        match self.state {
            State::InValue => self.commit_value(),
            State::InComment => self.commit_comment(),
            State::InKey => return Err(self.error(ParseErrorKind::UnterminatedKey)),
            State::InSectionName => return Err(self.error(ParseErrorKind::UnterminatedSection)),
            State::Start | State::BeforeComment => {}
        }
        Ok(self.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ParseMode;

    fn parse(content: &str) -> Result<Vec<Section>> {
        parse_sections(content, "test.ini", ParseOptions::default())
    }

    fn parse_error(content: &str) -> (usize, ParseErrorKind) {
        match parse(content) {
            Err(IniError::Parse { line, kind, .. }) => (line, kind),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_sections_and_lines() {
        let sections = parse("; leading\n[Sound]\nvolume=80\n\n[Video]\nfullscreen=1\n").unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].name(), None);
        assert_eq!(sections[0].lines()[0].comment(), Some(" leading"));
        assert_eq!(sections[1].name(), Some("Sound"));
        assert_eq!(sections[1].lines()[0].key(), Some("volume"));
        assert_eq!(sections[1].lines()[0].value(), "80");
        assert!(sections[1].lines()[1].is_blank());
        assert_eq!(sections[2].lines().len(), 1);
    }

    #[test]
    fn test_blanks_are_trimmed() {
        let sections = parse("[S]\n   key one  \t=   some value \t\n").unwrap();
        let line = &sections[1].lines()[0];
        assert_eq!(line.key(), Some("key one"));
        assert_eq!(line.value(), "some value");
    }

    #[test]
    fn test_crlf_input() {
        let sections = parse("[S]\r\na=1\r\n; note\r\n").unwrap();
        assert_eq!(sections[1].lines()[0].value(), "1");
        assert_eq!(sections[1].lines()[1].comment(), Some(" note"));
    }

    #[test]
    fn test_inline_comment_needs_blank() {
        let sections = parse("[S]\na=1 ;one\nb=x;y\nc=p #q\n").unwrap();
        let lines = sections[1].lines();
        assert_eq!(lines[0].value(), "1");
        assert_eq!(lines[0].comment(), Some("one"));
        assert_eq!(lines[1].value(), "x;y");
        assert_eq!(lines[1].comment(), None);
        assert_eq!(lines[2].value(), "p");
        assert_eq!(lines[2].comment(), Some("q"));
    }

    #[test]
    fn test_inline_comments_disabled() {
        let options = ParseOptions {
            mode: ParseMode::Strict,
            inline_comments: false,
        };
        let sections = parse_sections("[S]\na=1 ;one\n", "t", options).unwrap();
        assert_eq!(sections[1].lines()[0].value(), "1 ;one");
        assert_eq!(sections[1].lines()[0].comment(), None);
    }

    #[test]
    fn test_header_comment() {
        let sections = parse("[S] ; the section\nk=v\n").unwrap();
        assert_eq!(sections[1].comment(), Some(" the section"));
        assert_eq!(sections[1].lines().len(), 1);
    }

    #[test]
    fn test_empty_value() {
        let sections = parse("[S]\nk=\n").unwrap();
        assert_eq!(sections[1].lines()[0].key(), Some("k"));
        assert_eq!(sections[1].lines()[0].value(), "");
    }

    #[test]
    fn test_unterminated_tokens_at_eof() {
        let sections = parse("[S]\nk=v").unwrap();
        assert_eq!(sections[1].lines()[0].value(), "v");
        let sections = parse("[S]\n;tail").unwrap();
        assert_eq!(sections[1].lines()[0].comment(), Some("tail"));
    }

    #[test]
    fn test_content_before_section() {
        assert_eq!(
            parse_error("; fine\n\nkey=value\n"),
            (3, ParseErrorKind::ContentBeforeSection)
        );
    }

    #[test]
    fn test_key_without_equals() {
        assert_eq!(
            parse_error("[S]\nbroken\n"),
            (2, ParseErrorKind::UnterminatedKey)
        );
        assert_eq!(parse_error("[S]\nbroken").1, ParseErrorKind::UnterminatedKey);
    }

    #[test]
    fn test_unterminated_section() {
        assert_eq!(parse_error("[S]\nk=v\n[Oops").1, ParseErrorKind::UnterminatedSection);
        assert_eq!(parse_error("[Oops\nk=v\n"), (1, ParseErrorKind::UnterminatedSection));
    }

    #[test]
    fn test_registry_mode() {
        let sections = parse_sections(
            "fullscreen=yes\n[Section]\nnosound = 1\n",
            "userprofile.txt",
            ParseOptions::registry(),
        )
        .unwrap();
        assert_eq!(sections.len(), 1);
        let keys: Vec<_> = sections[0].lines().iter().filter_map(Line::key).collect();
        assert_eq!(keys, vec!["fullscreen", "nosound"]);
    }
}
