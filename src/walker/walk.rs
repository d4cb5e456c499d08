//! Per-directory enumeration task
//!
//! One task per directory: list the entries, record files on the node, create
//! a child node for every subdirectory and spawn a tracked task for it, then
//! publish the node. A listing failure marks only this node as failed.

use crate::error::{EnumerationError, PoolResult};
use crate::tree::{DirectoryNode, NodeWriter};
use crate::walker::tracker::TaskScope;
use crate::walker::worker::current_worker;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Type of a directory entry, as reported without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (never followed)
    Symlink,
    /// Device, FIFO, socket, or unknown
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }

    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl ListedEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Source of directory listings
///
/// The walker only ever asks for the direct entries of one directory.
pub trait DirLister: Send + Sync {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>>;
}

/// Lists directories through `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        fs::read_dir(dir)?
            .map(|entry| {
                let entry = entry?;
                let kind = EntryKind::from_file_type(entry.file_type()?);
                Ok(ListedEntry::new(entry.path(), kind))
            })
            .collect()
    }
}

/// Counters shared by every task of one walk
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Directories listed successfully
    pub dirs: AtomicU64,

    /// Regular files recorded
    pub files: AtomicU64,

    /// Symlinks and special files recorded as files
    pub special: AtomicU64,

    /// Directories that could not be enumerated
    pub errors: AtomicU64,
}

impl WalkStats {
    fn record_dir(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
    }

    fn record_files(&self, regular: u64, special: u64) {
        self.files.fetch_add(regular, Ordering::Relaxed);
        self.special.fetch_add(special, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dirs(&self) -> u64 {
        self.dirs.load(Ordering::Relaxed)
    }

    /// Everything recorded in a node's file list
    pub fn files(&self) -> u64 {
        self.files.load(Ordering::Relaxed) + self.special()
    }

    pub fn special(&self) -> u64 {
        self.special.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Everything an enumeration task needs, cloned into each spawned task
#[derive(Clone)]
pub(crate) struct WalkContext {
    scope: TaskScope,
    lister: Arc<dyn DirLister>,
    stats: Arc<WalkStats>,
}

impl WalkContext {
    pub(crate) fn new(scope: TaskScope, lister: Arc<dyn DirLister>, stats: Arc<WalkStats>) -> Self {
        Self {
            scope,
            lister,
            stats,
        }
    }

    /// Spawn the tracked task that enumerates `node`
    pub(crate) fn spawn_node(&self, node: Arc<DirectoryNode>) -> PoolResult<()> {
        let ctx = self.clone();
        self.scope.spawn(move || ctx.enumerate(node))
    }

    fn enumerate(&self, node: Arc<DirectoryNode>) {
        let worker = current_worker();
        trace!(worker = ?worker, path = %node.path().display(), "Enumerating directory");

        let entries = match self.lister.list(node.path()) {
            Ok(entries) => entries,
            Err(e) => {
                let err = EnumerationError::from_io(node.path(), &e);
                self.stats.record_error();
                if err.is_vanished() {
                    debug!(worker = ?worker, path = %node.path().display(), "Directory vanished");
                } else {
                    warn!(worker = ?worker, error = %err, "Directory failed");
                }
                NodeWriter::new(node).fail(worker, err);
                return;
            }
        };

        let mut writer = NodeWriter::new(Arc::clone(&node));
        let mut regular = 0u64;
        let mut special = 0u64;
        let mut subdirs = 0usize;

        for entry in entries {
            match entry.kind {
                EntryKind::Directory => {
                    subdirs += 1;
                    let child = writer.add_child(entry.path);
                    if let Err(e) = self.spawn_node(Arc::clone(&child)) {
                        error!(
                            worker = ?worker,
                            path = %child.path().display(),
                            error = %e,
                            "Failed to schedule subdirectory"
                        );
                        self.stats.record_error();
                        let reason = e.to_string();
                        let path = child.path().to_path_buf();
                        // The rejected task never runs, so this is the node's only writer
                        NodeWriter::new(child).fail(worker, EnumerationError::Unscheduled { path, reason });
                    }
                }
                EntryKind::File => {
                    regular += 1;
                    writer.add_file(entry.path);
                }
                EntryKind::Symlink | EntryKind::Other => {
                    special += 1;
                    writer.add_file(entry.path);
                }
            }
        }

        self.stats.record_dir();
        self.stats.record_files(regular, special);
        debug!(
            worker = ?worker,
            path = %node.path().display(),
            files = regular + special,
            subdirs = subdirs,
            "Directory enumerated"
        );

        writer.finish(worker);
    }
}
