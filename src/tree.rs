//! In-memory mirror of a directory tree
//!
//! Every [`DirectoryNode`] is heap-allocated behind an `Arc`, so a node created
//! by one task stays valid for the task spawned to enumerate it no matter when
//! that task runs.
//!
//! Nodes follow a single-writer discipline: the task that enumerates a node
//! assembles its contents in a task-local [`NodeWriter`] and publishes them
//! once. Published contents never change, so readers need no locks.

use crate::error::EnumerationError;
use crate::walker::WorkerId;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// One directory in the walked tree
#[derive(Debug)]
pub struct DirectoryNode {
    path: PathBuf,
    depth: u32,
    contents: OnceLock<Contents>,
}

/// Published result of enumerating one directory
#[derive(Debug)]
struct Contents {
    discovered_by: Option<WorkerId>,
    files: Vec<PathBuf>,
    children: Vec<Arc<DirectoryNode>>,
    error: Option<EnumerationError>,
}

/// Enumeration state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Task submitted or running, contents not yet published
    Pending,
    /// Files and child stubs are final
    Populated,
    /// Listing failed; the node carries an error instead of contents
    Failed,
}

impl DirectoryNode {
    /// Allocate the root node of a walk
    pub fn root(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self::new(path.into(), 0))
    }

    fn new(path: PathBuf, depth: u32) -> Self {
        Self {
            path,
            depth,
            contents: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn state(&self) -> NodeState {
        match self.contents.get() {
            None => NodeState::Pending,
            Some(c) if c.error.is_some() => NodeState::Failed,
            Some(_) => NodeState::Populated,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state() == NodeState::Populated
    }

    /// Files directly inside this directory, in enumeration order
    ///
    /// Empty until the node is published.
    pub fn files(&self) -> &[PathBuf] {
        self.contents.get().map_or(&[], |c| c.files.as_slice())
    }

    /// Direct subdirectories, in enumeration order
    pub fn children(&self) -> &[Arc<DirectoryNode>] {
        self.contents.get().map_or(&[], |c| c.children.as_slice())
    }

    /// Worker that enumerated this node
    pub fn discovered_by(&self) -> Option<WorkerId> {
        self.contents.get().and_then(|c| c.discovered_by)
    }

    pub fn error(&self) -> Option<&EnumerationError> {
        self.contents.get().and_then(|c| c.error.as_ref())
    }

    /// Depth-first, pre-order traversal starting at this node
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst { stack: vec![self] }
    }

    /// Files recorded anywhere in this subtree
    pub fn total_files(&self) -> usize {
        self.iter().map(|n| n.files().len()).sum()
    }

    /// Directories in this subtree, including this one
    pub fn total_dirs(&self) -> usize {
        self.iter().count()
    }

    /// Nodes in this subtree that failed to enumerate
    pub fn total_errors(&self) -> usize {
        self.iter().filter(|n| n.error().is_some()).count()
    }

    /// Order-independent snapshot of this subtree, for comparing walks
    pub fn shape(&self) -> TreeShape {
        let mut files = self.files().to_vec();
        files.sort();

        let mut children: Vec<TreeShape> = self.children().iter().map(|c| c.shape()).collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));

        TreeShape {
            path: self.path.clone(),
            files,
            children,
            failed: self.error().is_some(),
        }
    }
}

/// Depth-first iterator over a subtree
pub struct DepthFirst<'a> {
    stack: Vec<&'a DirectoryNode>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a DirectoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack.extend(node.children().iter().rev().map(|c| c.as_ref()));
        Some(node)
    }
}

/// Sorted, owned structure of a subtree
///
/// Two walks over an unchanged tree produce equal shapes even though sibling
/// order differs between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeShape {
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
    pub children: Vec<TreeShape>,
    pub failed: bool,
}

/// Exclusive writer for a node's contents
///
/// Only the task that enumerates a node holds its writer. Nothing is visible
/// to readers until [`NodeWriter::finish`] or [`NodeWriter::fail`].
pub(crate) struct NodeWriter {
    node: Arc<DirectoryNode>,
    files: Vec<PathBuf>,
    children: Vec<Arc<DirectoryNode>>,
}

impl NodeWriter {
    pub(crate) fn new(node: Arc<DirectoryNode>) -> Self {
        Self {
            node,
            files: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn add_file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    /// Allocate a child node one level deeper and return its shared handle
    pub(crate) fn add_child(&mut self, path: PathBuf) -> Arc<DirectoryNode> {
        let child = Arc::new(DirectoryNode::new(path, self.node.depth + 1));
        self.children.push(Arc::clone(&child));
        child
    }

    /// Publish the collected files and children
    pub(crate) fn finish(self, worker: Option<WorkerId>) {
        let contents = Contents {
            discovered_by: worker,
            files: self.files,
            children: self.children,
            error: None,
        };
        publish(&self.node, contents);
    }

    /// Publish an enumeration failure; collected entries are discarded
    pub(crate) fn fail(self, worker: Option<WorkerId>, error: EnumerationError) {
        let contents = Contents {
            discovered_by: worker,
            files: Vec::new(),
            children: Vec::new(),
            error: Some(error),
        };
        publish(&self.node, contents);
    }
}

fn publish(node: &DirectoryNode, contents: Contents) {
    if node.contents.set(contents).is_err() {
        // Two writers for one node breaks the single-writer invariant
        panic!("directory node '{}' published twice", node.path.display());
    }
}
