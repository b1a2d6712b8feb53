//! User profile settings
//!
//! A flat, case-insensitive key/value store fed from `userprofile.txt`-style
//! files: section-less INI files read in registry mode. Files are loaded in
//! order so later ones override earlier ones, and the whole profile can be
//! dumped back into a file of the same shape.
//!
//! Some options exclude each other (`fullscreen` and `windowed` by default);
//! storing one removes its partner.

use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::models::error::Result;
use crate::models::ini_file::IniFile;
use crate::parser::types::ParseOptions;
use crate::utils::string::{eq_ignore_case, parse_leading_float, parse_leading_int};

/// File name the profile is conventionally stored under
pub const PROFILE_FILENAME: &str = "userprofile.txt";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    entries: Vec<ProfileEntry>,
    default_value: Option<String>,
    exclusives: Vec<(String, String)>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

impl Profile {
    pub fn new() -> Self {
        Profile {
            entries: Vec::new(),
            default_value: Some(String::new()),
            exclusives: vec![("fullscreen".to_string(), "windowed".to_string())],
        }
    }

    /// Value returned by [`Profile::get_str`] for keys that are not set
    pub fn set_default(&mut self, value: Option<&str>) {
        self.default_value = value.map(str::to_string);
    }

    /// Declare two options as mutually exclusive
    pub fn add_exclusive(&mut self, first: &str, second: &str) {
        self.exclusives.push((first.to_string(), second.to_string()));
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| eq_ignore_case(&e.key, key))
    }

    fn partner(&self, key: &str) -> Option<String> {
        self.exclusives.iter().find_map(|(a, b)| {
            if eq_ignore_case(a, key) {
                Some(b.clone())
            } else if eq_ignore_case(b, key) {
                Some(a.clone())
            } else {
                None
            }
        })
    }

    /// Set or replace an option
    pub fn insert(&mut self, key: &str, value: Option<&str>) {
        if let Some(partner) = self.partner(key) {
            self.remove(&partner);
        }

        let value = value.map(str::to_string);
        match self.position(key) {
            Some(i) => self.entries[i].value = value,
            None => self.entries.push(ProfileEntry {
                key: key.to_string(),
                value,
            }),
        }
    }

    /// Remove an option, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The option's value, or the profile default when it is not set
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.position(key) {
            Some(i) => self.entries[i].value.as_deref(),
            None => self.default_value.as_deref(),
        }
    }

    /// Presence-aware lookup: `None` when the option is not set at all,
    /// `Some(None)` when it is set without a value
    pub fn get_opt_str(&self, key: &str) -> Option<Option<&str>> {
        self.position(key).map(|i| self.entries[i].value.as_deref())
    }

    /// False for unset options and for `false`, `no`, `off`, `0` and the
    /// empty string; true for anything else
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get_str(key) {
            Some(value) => !["false", "no", "off", "0", ""]
                .iter()
                .any(|f| eq_ignore_case(value, f)),
            None => false,
        }
    }

    pub fn get_int(&self, key: &str) -> i32 {
        self.get_str(key).map(parse_leading_int).unwrap_or(0)
    }

    pub fn get_float(&self, key: &str) -> f64 {
        self.get_str(key).map(parse_leading_float).unwrap_or(0.0)
    }

    /// Merge the options of one profile file. A missing file contributes
    /// nothing; a malformed one is an error.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let ini = IniFile::open_or_empty(path.as_ref(), ParseOptions::registry())?;
        let mut pairs = Vec::new();
        let count = ini.for_each_pair(None, |key, value| {
            pairs.push((key.to_string(), value.to_string()));
        });
        for (key, value) in pairs {
            self.insert(&key, Some(&value));
        }
        debug!("Read {} option(s) from {}", count, path.as_ref().display());
        Ok(count)
    }

    /// Load several profile files in order, skipping the ones that fail
    pub fn load_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut total = 0;
        for path in paths {
            match self.load_file(path.as_ref()) {
                Ok(count) => total += count,
                Err(e) => warn!("Ignoring profile {}: {}", path.as_ref().display(), e),
            }
        }
        info!("Loaded {} profile option(s)", total);
        total
    }

    /// Dump every option into a section-less INI file
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut ini = IniFile::create_with(path.as_ref(), ParseOptions::registry())?;
        for entry in &self.entries {
            ini.put_string(None, &entry.key, entry.value.as_deref().unwrap_or(""))?;
        }
        ini.write(None)?;
        ini.close();
        Ok(())
    }
}
