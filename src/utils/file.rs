//! File helpers shared by the INI reader and writer

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Checks if a file exists at the given path
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Read a whole file as text
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; INI
/// files shipped with older games are frequently Latin-1.
pub fn file_get<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Replace the contents of `path` with `content`
///
/// The data is written to a temporary file in the same directory and then
/// renamed over the target, so readers never observe a half-written file.
/// Permissions of an existing target are carried over.
pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ini");
        assert!(!file_exists(&path));
        fs::write(&path, "[a]\n").unwrap();
        assert!(file_exists(&path));
        assert!(!file_exists(dir.path()));
    }

    #[test]
    fn test_file_get_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.ini");
        fs::write(&path, b"[S]\nname=Jos\xe9\n").unwrap();
        let text = file_get(&path).unwrap();
        assert!(text.starts_with("[S]\nname=Jos"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ini");
        write_atomic(&path, "first\n").unwrap();
        write_atomic(&path, "second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.ini");
        assert!(write_atomic(&path, "x").is_err());
    }
}
