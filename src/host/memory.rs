//! In-memory host for unit tests

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use super::{Commands, Files, Identity, Owner};
use crate::error::CommandError;

pub const ROOT: Owner = Owner { uid: 0, gid: 0 };

#[derive(Debug, Clone)]
pub enum Node {
    File { contents: String, mode: u32, owner: Owner },
    Dir { mode: u32, owner: Owner },
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    fail_reads: RefCell<HashSet<PathBuf>>,
    fail_writes: RefCell<HashSet<PathBuf>>,
    writes: RefCell<Vec<PathBuf>>,
    outcomes: RefCell<VecDeque<bool>>,
    commands: RefCell<Vec<String>>,
    uid: Option<u32>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uid(uid: Option<u32>) -> Self {
        Self {
            uid,
            ..Self::default()
        }
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: &str) {
        self.nodes.borrow_mut().insert(
            path.into(),
            Node::File {
                contents: contents.to_string(),
                mode: 0o644,
                owner: ROOT,
            },
        );
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>, owner: Owner) {
        self.nodes
            .borrow_mut()
            .insert(path.into(), Node::Dir { mode: 0o755, owner });
    }

    pub fn fail_read(&self, path: impl Into<PathBuf>) {
        self.fail_reads.borrow_mut().insert(path.into());
    }

    pub fn fail_write(&self, path: impl Into<PathBuf>) {
        self.fail_writes.borrow_mut().insert(path.into());
    }

    /// Queue exit results for the next `run` calls; unscripted calls fail
    pub fn script_commands(&self, outcomes: &[bool]) {
        self.outcomes.borrow_mut().extend(outcomes.iter().copied());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    pub fn node(&self, path: impl AsRef<Path>) -> Option<Node> {
        self.nodes.borrow().get(path.as_ref()).cloned()
    }

    /// Paths written so far, in order
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.borrow().clone()
    }

    /// Command lines run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

fn injected(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("{} is not accessible", path.display()),
    )
}

impl Files for MemoryHost {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.fail_reads.borrow().contains(path) {
            return Err(injected(path));
        }
        self.file(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.fail_writes.borrow().contains(path) {
            return Err(injected(path));
        }
        let parent_is_dir = path.parent().is_some_and(|p| self.is_dir(p));
        if !parent_is_dir {
            return Err(not_found(path));
        }

        let mut nodes = self.nodes.borrow_mut();
        let (mode, owner) = match nodes.get(path) {
            Some(Node::File { mode, owner, .. }) => (*mode, *owner),
            Some(Node::Dir { .. }) => {
                return Err(io::Error::new(io::ErrorKind::Other, "is a directory"))
            }
            None => (0o600, ROOT),
        };
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                contents: contents.to_string(),
                mode,
                owner,
            },
        );
        self.writes.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes.borrow().get(path), Some(Node::Dir { .. }))
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(not_found(dir));
        }
        Ok(self
            .nodes
            .borrow()
            .iter()
            .filter(|(path, node)| {
                path.parent() == Some(dir) && matches!(node, Node::File { .. })
            })
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        if self.fail_writes.borrow().contains(path) {
            return Err(injected(path));
        }
        if self.exists(path) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists"));
        }
        if !path.parent().is_some_and(|p| self.is_dir(p)) {
            return Err(not_found(path));
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::Dir { mode, owner: ROOT });
        Ok(())
    }

    fn set_mode(&self, path: &Path, new_mode: u32) -> io::Result<()> {
        match self.nodes.borrow_mut().get_mut(path) {
            Some(Node::File { mode, .. }) | Some(Node::Dir { mode, .. }) => {
                *mode = new_mode;
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn owner(&self, path: &Path) -> io::Result<Owner> {
        match self.nodes.borrow().get(path) {
            Some(Node::File { owner, .. }) | Some(Node::Dir { owner, .. }) => Ok(*owner),
            None => Err(not_found(path)),
        }
    }

    fn set_owner(&self, path: &Path, new_owner: Owner) -> io::Result<()> {
        match self.nodes.borrow_mut().get_mut(path) {
            Some(Node::File { owner, .. }) | Some(Node::Dir { owner, .. }) => {
                *owner = new_owner;
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }
}

impl Commands for MemoryHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.borrow_mut().push(line);

        match self.outcomes.borrow_mut().pop_front() {
            Some(true) => Ok(()),
            Some(false) => Err(CommandError::Status("exit status: 1".to_string())),
            None => Err(CommandError::Spawn(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program} not found"),
            ))),
        }
    }
}

impl Identity for MemoryHost {
    fn effective_uid(&self) -> Option<u32> {
        self.uid
    }
}
