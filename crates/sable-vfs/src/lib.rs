//! Filesystem host for the sable toolchain.
//!
//! The host interface is deliberately narrow and synchronous: the editing
//! engine never suspends mid-operation. Existence checks coerce errors to
//! `false`; everything else reports `io::Error` to the caller.

use std::cell::RefCell;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashMap;
use tracing::debug;

mod pattern;

use pattern::Pattern;

pub trait FileSystemHost {
    fn read_file(&self, path: &Utf8Path) -> io::Result<String>;
    fn write_file(&self, path: &Utf8Path, text: &str) -> io::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;
    /// Never fails: a path that cannot be inspected does not exist.
    fn file_exists(&self, path: &Utf8Path) -> bool;
    /// Never fails: a path that cannot be inspected does not exist.
    fn directory_exists(&self, path: &Utf8Path) -> bool;
    fn current_dir(&self) -> Utf8PathBuf;
    /// Paths matching any of the glob patterns, in sorted order.
    fn glob(&self, patterns: &[&str]) -> Vec<Utf8PathBuf>;
}

/// Host backed by the operating system.
#[derive(Debug, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystemHost for OsFileSystem {
    fn read_file(&self, path: &Utf8Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Utf8Path, text: &str) -> io::Result<()> {
        debug!(%path, len = text.len(), "writing file");
        std::fs::write(path, text)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn file_exists(&self, path: &Utf8Path) -> bool {
        std::fs::metadata(path).map(|metadata| metadata.is_file()).unwrap_or(false)
    }

    fn directory_exists(&self, path: &Utf8Path) -> bool {
        std::fs::metadata(path).map(|metadata| metadata.is_dir()).unwrap_or(false)
    }

    fn current_dir(&self) -> Utf8PathBuf {
        std::env::current_dir()
            .ok()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }

    fn glob(&self, patterns: &[&str]) -> Vec<Utf8PathBuf> {
        let current = self.current_dir();
        let mut matched = Vec::new();

        for raw in patterns {
            let pattern = Pattern::new(raw);
            let root = if raw.starts_with('/') {
                Utf8PathBuf::from("/").join(pattern.literal_prefix())
            } else {
                current.join(pattern.literal_prefix())
            };

            for entry in walkdir::WalkDir::new(&root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
                    continue;
                };
                let relative = if raw.starts_with('/') {
                    path.strip_prefix("/").unwrap_or(&path)
                } else {
                    path.strip_prefix(&current).unwrap_or(&path)
                };
                if pattern.matches(relative) {
                    matched.push(path);
                }
            }
        }

        matched.sort();
        matched.dedup();
        matched
    }
}

/// Host backed by an in-memory map, for tests.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<FxHashMap<Utf8PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fs = Self::new();
        for (path, text) in files {
            fs.files.borrow_mut().insert(path.into(), text.to_owned());
        }
        fs
    }
}

impl FileSystemHost for MemoryFileSystem {
    fn read_file(&self, path: &Utf8Path) -> io::Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn write_file(&self, path: &Utf8Path, text: &str) -> io::Result<()> {
        debug!(%path, len = text.len(), "writing file (memory)");
        self.files.borrow_mut().insert(path.to_owned(), text.to_owned());
        Ok(())
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> io::Result<()> {
        Ok(())
    }

    fn file_exists(&self, path: &Utf8Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn directory_exists(&self, path: &Utf8Path) -> bool {
        let prefix = path.as_str().trim_end_matches('/');
        self.files
            .borrow()
            .keys()
            .any(|file| file.as_str().strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')))
    }

    fn current_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from("/")
    }

    fn glob(&self, patterns: &[&str]) -> Vec<Utf8PathBuf> {
        let patterns: Vec<Pattern> = patterns.iter().map(|raw| Pattern::new(raw)).collect();
        let mut matched: Vec<Utf8PathBuf> = self
            .files
            .borrow()
            .keys()
            .filter(|path| patterns.iter().any(|pattern| pattern.matches(path)))
            .cloned()
            .collect();
        matched.sort();
        matched
    }
}
