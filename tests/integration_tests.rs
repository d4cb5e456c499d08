//! Integration tests for dir-traverse
//!
//! Every test builds a scratch tree under a temporary directory and walks it
//! through the public API.

use dir_traverse::config::WalkConfig;
use dir_traverse::error::{ConfigError, EnumerationError, WalkerError};
use dir_traverse::tree::{DirectoryNode, NodeState, TreeShape};
use dir_traverse::walker::{DirLister, EntryKind, FsLister, ListedEntry, WalkCoordinator, WalkResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn walk(root: &Path, workers: usize) -> WalkResult {
    let config = WalkConfig::new(root).with_workers(workers);
    WalkCoordinator::new(config).unwrap().run().unwrap()
}

fn walk_with(root: &Path, workers: usize, lister: Arc<dyn DirLister>) -> WalkResult {
    let config = WalkConfig::new(root).with_workers(workers);
    WalkCoordinator::with_lister(config, lister).unwrap().run().unwrap()
}

/// Sequential single-threaded walk used as the expected result
fn reference_shape(dir: &Path) -> TreeShape {
    let mut files = Vec::new();
    let mut children = Vec::new();

    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        if entry.file_type().unwrap().is_dir() {
            children.push(reference_shape(&entry.path()));
        } else {
            files.push(entry.path());
        }
    }

    files.sort();
    children.sort_by(|a, b| a.path.cmp(&b.path));
    TreeShape {
        path: dir.to_path_buf(),
        files,
        children,
        failed: false,
    }
}

/// Build `levels` levels with `fanout` directories and two files per directory
fn build_tree(dir: &Path, levels: usize, fanout: usize) {
    fs::write(dir.join("one.dat"), b"1").unwrap();
    fs::write(dir.join("two.dat"), b"2").unwrap();
    if levels == 0 {
        return;
    }
    for i in 0..fanout {
        let child = dir.join(format!("sub{}", i));
        fs::create_dir(&child).unwrap();
        build_tree(&child, levels - 1, fanout);
    }
}

fn child_named<'a>(node: &'a DirectoryNode, name: &str) -> &'a Arc<DirectoryNode> {
    node.children()
        .iter()
        .find(|c| c.path().file_name().and_then(|n| n.to_str()) == Some(name))
        .unwrap_or_else(|| panic!("no child named {}", name))
}

#[test]
fn test_small_tree_scenario() {
    // R{a.txt, X{b.txt}, Y{}}
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), b"a").unwrap();
    fs::create_dir(root.join("X")).unwrap();
    fs::write(root.join("X/b.txt"), b"b").unwrap();
    fs::create_dir(root.join("Y")).unwrap();

    let result = walk(root, 2);
    let tree = &result.root;

    assert_eq!(tree.state(), NodeState::Populated);
    assert_eq!(tree.files(), &[root.join("a.txt")]);
    assert_eq!(tree.children().len(), 2);

    let x = child_named(tree, "X");
    assert_eq!(x.files(), &[root.join("X/b.txt")]);
    assert!(x.children().is_empty());
    assert_eq!(x.depth(), 1);

    let y = child_named(tree, "Y");
    assert!(y.files().is_empty());
    assert!(y.children().is_empty());
    assert!(y.is_populated());

    assert_eq!(result.total_dirs, 3);
    assert_eq!(result.total_files, 2);
    assert_eq!(result.errors, 0);
    assert_eq!(result.pool.total_tasks(), 3);
}

#[test]
fn test_matches_sequential_walk() {
    let dir = tempdir().unwrap();
    build_tree(dir.path(), 3, 3);

    let result = walk(dir.path(), 4);
    assert_eq!(result.root.shape(), reference_shape(dir.path()));
}

#[test]
fn test_repeated_walks_are_identical() {
    let dir = tempdir().unwrap();
    build_tree(dir.path(), 2, 4);

    let first = walk(dir.path(), 8).root.shape();
    let second = walk(dir.path(), 3).root.shape();
    let third = walk(dir.path(), 1).root.shape();

    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_deep_narrow_tree_terminates() {
    let dir = tempdir().unwrap();
    let mut path = dir.path().to_path_buf();
    for level in 0..20 {
        path.push(format!("level{}", level));
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("bottom.txt"), b"x").unwrap();

    let result = walk(dir.path(), 2);

    assert_eq!(result.total_dirs, 21);
    assert_eq!(result.total_files, 1);
    let deepest = result.root.iter().max_by_key(|n| n.depth()).unwrap();
    assert_eq!(deepest.depth(), 20);
    assert_eq!(deepest.files(), &[path.join("bottom.txt")]);
}

#[test]
fn test_wide_tree_with_many_workers() {
    let dir = tempdir().unwrap();
    for i in 0..150 {
        let sub = dir.path().join(format!("d{:03}", i));
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("f"), b"f").unwrap();
    }

    let result = walk(dir.path(), 8);

    assert_eq!(result.root.children().len(), 150);
    assert!(result.root.iter().all(|n| n.is_populated()));
    assert_eq!(result.total_files, 150);
    assert_eq!(result.pool.tasks_per_worker.len(), 8);
    assert_eq!(result.pool.total_tasks(), 151);
}

#[test]
fn test_single_worker_completes() {
    // The only worker both runs tasks and spawns their children
    let dir = tempdir().unwrap();
    build_tree(dir.path(), 3, 2);

    let result = walk(dir.path(), 1);
    assert_eq!(result.root.shape(), reference_shape(dir.path()));
    assert_eq!(result.pool.tasks_per_worker.len(), 1);
}

#[test]
fn test_empty_root() {
    let dir = tempdir().unwrap();

    let result = walk(dir.path(), 4);

    assert!(result.root.is_populated());
    assert!(result.root.files().is_empty());
    assert!(result.root.children().is_empty());
    assert_eq!(result.total_dirs, 1);
    assert_eq!(result.total_files, 0);
}

#[test]
fn test_every_node_records_its_worker() {
    let dir = tempdir().unwrap();
    build_tree(dir.path(), 2, 3);

    let result = walk(dir.path(), 3);
    for node in result.root.iter() {
        let worker = node.discovered_by().expect("every task runs on a pool worker");
        assert!(worker.0 < 3);
    }
}

/// Refuses to list any directory named `locked`
struct LockedLister;

impl DirLister for LockedLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        if dir.file_name().and_then(|n| n.to_str()) == Some("locked") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
        }
        FsLister.list(dir)
    }
}

#[test]
fn test_failed_directory_is_isolated() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("locked/hidden")).unwrap();
    fs::write(root.join("locked/secret.txt"), b"s").unwrap();
    fs::create_dir_all(root.join("open/inner")).unwrap();
    fs::write(root.join("open/inner/visible.txt"), b"v").unwrap();

    let result = walk_with(root, 4, Arc::new(LockedLister));

    let locked = child_named(&result.root, "locked");
    assert_eq!(locked.state(), NodeState::Failed);
    assert!(locked.files().is_empty());
    assert!(locked.children().is_empty());
    assert_eq!(
        locked.error(),
        Some(&EnumerationError::PermissionDenied {
            path: root.join("locked")
        })
    );

    let open = child_named(&result.root, "open");
    let inner = child_named(open, "inner");
    assert_eq!(inner.files(), &[root.join("open/inner/visible.txt")]);

    assert_eq!(result.errors, 1);
    assert_eq!(result.root.total_errors(), 1);
    assert_eq!(result.total_dirs, 3);
}

/// Panics while listing any directory named `boom`
struct PanickingLister;

impl DirLister for PanickingLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        if dir.file_name().and_then(|n| n.to_str()) == Some("boom") {
            panic!("lister exploded");
        }
        FsLister.list(dir)
    }
}

#[test]
fn test_panicking_task_does_not_hang_walk() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("boom")).unwrap();
    fs::create_dir(dir.path().join("fine")).unwrap();

    let result = walk_with(dir.path(), 2, Arc::new(PanickingLister));

    assert_eq!(result.pool.task_panics, 1);
    assert_eq!(child_named(&result.root, "boom").state(), NodeState::Pending);
    assert!(child_named(&result.root, "fine").is_populated());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_recorded_as_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("real")).unwrap();
    fs::write(root.join("real/data"), b"d").unwrap();
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();
    // A link back to the root would loop forever if it were followed
    std::os::unix::fs::symlink(root, root.join("real/loop")).unwrap();

    let result = walk(root, 2);

    assert_eq!(result.root.files(), &[root.join("link")]);
    assert_eq!(result.root.children().len(), 1);
    assert_eq!(result.total_dirs, 2);
    assert_eq!(result.special_files, 2);
    assert_eq!(FsLister.list(root).unwrap().iter().filter(|e| e.kind == EntryKind::Symlink).count(), 1);
}

#[test]
fn test_zero_workers_rejected() {
    let dir = tempdir().unwrap();
    let config = WalkConfig::new(dir.path()).with_workers(0);

    match WalkCoordinator::new(config) {
        Err(WalkerError::Config(ConfigError::InvalidWorkerCount { count: 0, .. })) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("zero workers accepted"),
    }
}

#[test]
fn test_missing_root_rejected() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let config = WalkConfig::new(&missing).with_workers(2);

    match WalkCoordinator::new(config) {
        Err(WalkerError::Config(ConfigError::RootNotFound { path })) => assert_eq!(path, missing),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("missing root accepted"),
    }
}

#[test]
fn test_file_root_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"p").unwrap();

    let config = WalkConfig::new(&file).with_workers(2);
    assert!(matches!(
        WalkCoordinator::new(config),
        Err(WalkerError::Config(ConfigError::RootNotDirectory { .. }))
    ));
}

#[test]
fn test_task_delay_slows_walk() {
    let dir = tempdir().unwrap();
    for i in 0..3 {
        fs::create_dir(dir.path().join(format!("d{}", i))).unwrap();
    }

    let config = WalkConfig::new(dir.path())
        .with_workers(1)
        .with_task_delay(Duration::from_millis(25));

    let start = Instant::now();
    let result = WalkCoordinator::new(config).unwrap().run().unwrap();

    // Four tasks on one worker; the last delay may overlap with shutdown
    assert!(start.elapsed() >= Duration::from_millis(75));
    assert_eq!(result.total_dirs, 4);
}

#[test]
fn test_result_totals_match_tree() {
    let dir = tempdir().unwrap();
    build_tree(dir.path(), 2, 5);

    let result = walk(dir.path(), 6);

    assert_eq!(result.total_dirs, result.root.total_dirs() as u64);
    assert_eq!(result.total_files, result.root.total_files() as u64);
    // 1 + 5 + 25 directories, two files each
    assert_eq!(result.total_dirs, 31);
    assert_eq!(result.total_files, 62);
    assert_eq!(result.pool.submitted, 31);

    let mut paths: Vec<PathBuf> = result.root.iter().map(|n| n.path().to_path_buf()).collect();
    let before = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), before);
}
