//! The per-project container: factory, settings, host, checker, and the set
//! of open source files.
//!
//! A workspace is single-threaded and is passed explicitly to every
//! operation that needs it. Independent workspaces have fully disjoint
//! caches.

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use line_index::LineIndex;
use rustc_hash::FxHashMap;
use sable_analysis::Checker;
use sable_syntax::{SyntaxTree, TreeId};
use sable_vfs::{FileSystemHost, OsFileSystem};
use tracing::debug;
use triomphe::Arc;

use crate::error::{EditError, Result};
use crate::factory::NodeFactory;
use crate::node::Node;
use crate::settings::EditSettings;
use crate::source_file::SourceFile;

pub(crate) struct FileEntry {
    pub(crate) root: Node,
    pub(crate) saved: Cell<bool>,
    pub(crate) line_index: RefCell<Option<(TreeId, Rc<LineIndex>)>>,
}

pub struct Workspace {
    host: Rc<dyn FileSystemHost>,
    settings: EditSettings,
    factory: NodeFactory,
    checker: Checker,
    files: RefCell<FxHashMap<Utf8PathBuf, FileEntry>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_host(Rc::new(OsFileSystem::new()))
    }

    pub fn with_host(host: Rc<dyn FileSystemHost>) -> Self {
        Self {
            host,
            settings: EditSettings::default(),
            factory: NodeFactory::new(),
            checker: Checker::new(),
            files: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn with_settings(mut self, settings: EditSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    pub fn host(&self) -> &Rc<dyn FileSystemHost> {
        &self.host
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub(crate) fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Registers a new source file with the given text.
    pub fn create_source_file(
        &self,
        path: impl Into<Utf8PathBuf>,
        text: &str,
    ) -> Result<SourceFile> {
        let path = path.into();
        if self.files.borrow().contains_key(&path) {
            return Err(EditError::invalid_operation(format!(
                "a source file is already registered at {path}",
            )));
        }

        debug!(%path, len = text.len(), "creating source file");
        let parse = sable_parse::parse(path.clone(), text);
        let root = self.factory.node_for(&parse.root());
        self.files.borrow_mut().insert(
            path,
            FileEntry { root: root.clone(), saved: Cell::new(false), line_index: RefCell::new(None) },
        );
        Ok(SourceFile::from_root(root))
    }

    /// Reads a file through the host and registers it.
    pub fn open_source_file(&self, path: impl Into<Utf8PathBuf>) -> Result<SourceFile> {
        let path = path.into();
        let text = self.host.read_file(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                EditError::FileNotFound(path.clone())
            } else {
                EditError::Io { path: path.clone(), source }
            }
        })?;

        let file = self.create_source_file(path, &text)?;
        self.mark_saved(&file.path(), true);
        Ok(file)
    }

    /// The already-registered source file at `path`, if any.
    pub fn source_file(&self, path: impl AsRef<Utf8Path>) -> Option<SourceFile> {
        let files = self.files.borrow();
        let entry = files.get(path.as_ref())?;
        Some(SourceFile::from_root(entry.root.clone()))
    }

    pub fn source_files(&self) -> Vec<SourceFile> {
        let mut files: Vec<_> = self
            .files
            .borrow()
            .values()
            .map(|entry| SourceFile::from_root(entry.root.clone()))
            .collect();
        files.sort_by_key(|file| file.path());
        files
    }

    /// Opens every file the host's glob matches, skipping already-open ones.
    pub fn add_source_files_by_glob(&self, patterns: &[&str]) -> Result<Vec<SourceFile>> {
        let mut added = Vec::new();
        for path in self.host.glob(patterns) {
            if self.files.borrow().contains_key(&path) {
                continue;
            }
            added.push(self.open_source_file(path)?);
        }
        Ok(added)
    }

    /// Drops a file: its wrappers are disposed and its symbol cache entries
    /// evicted. Returns false if the path was not registered.
    pub fn forget_file(&self, path: impl AsRef<Utf8Path>) -> bool {
        let Some(entry) = self.files.borrow_mut().remove(path.as_ref()) else {
            return false;
        };
        if let Ok(syntax) = entry.root.syntax_node() {
            let id = syntax.tree().id();
            entry.root.dispose(self);
            self.checker.forget_tree(id);
            self.factory.evict_symbols_of_tree(id);
        }
        true
    }

    /// Bookkeeping after a successful edit: the file is unsaved and caches
    /// keyed by the replaced tree are dropped.
    pub(crate) fn after_edit(&self, old_tree: &Arc<SyntaxTree>) {
        if let Some(entry) = self.files.borrow().get(old_tree.path()) {
            entry.saved.set(false);
        }
        self.checker.forget_tree(old_tree.id());
        self.factory.evict_symbols_of_tree(old_tree.id());
    }

    pub(crate) fn mark_saved(&self, path: &Utf8Path, saved: bool) {
        if let Some(entry) = self.files.borrow().get(path) {
            entry.saved.set(saved);
        }
    }

    pub(crate) fn is_saved(&self, path: &Utf8Path) -> bool {
        self.files.borrow().get(path).is_some_and(|entry| entry.saved.get())
    }

    /// The line index for a file's current tree, cached until the next edit.
    pub(crate) fn line_index(&self, tree: &Arc<SyntaxTree>) -> Rc<LineIndex> {
        let files = self.files.borrow();
        let Some(entry) = files.get(tree.path()) else {
            return Rc::new(LineIndex::new(tree.text()));
        };

        let mut cached = entry.line_index.borrow_mut();
        match &*cached {
            Some((id, index)) if *id == tree.id() => index.clone(),
            _ => {
                let index = Rc::new(LineIndex::new(tree.text()));
                *cached = Some((tree.id(), index.clone()));
                index
            }
        }
    }
}
