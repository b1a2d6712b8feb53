/// How section headers are treated while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Every key/value line must follow a `[section]` header
    #[default]
    Strict,
    /// User-registry files: headers are skipped and every line lands in the
    /// anonymous pseudo-section, giving one flat namespace
    Registry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Accept `key=value ;comment`. A `;` or `#` only opens a comment when
    /// preceded by a blank, so `key=a;b` keeps `a;b` as its value.
    pub inline_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            mode: ParseMode::Strict,
            inline_comments: true,
        }
    }
}

impl ParseOptions {
    pub fn registry() -> Self {
        ParseOptions {
            mode: ParseMode::Registry,
            ..Default::default()
        }
    }

    pub fn is_registry(&self) -> bool {
        self.mode == ParseMode::Registry
    }
}
