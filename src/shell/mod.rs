//! # Command Engine
//!
//! [`DtShell`] holds the devicetree and the current working node, resolves
//! node paths and executes command lines.
//!
//! ## Paths
//!
//! Paths are absolute (`/soc/uart@40002000`) or relative to the working node
//! (`uart@40002000`, `../cpus`). `.` and `..` are resolved lexically; `..` at
//! the root stays at the root.
//!
//! ## Errors
//!
//! Each command line either succeeds or fails with exactly one
//! [`ShellError`], whose `Display` is the message shown to the user.

pub mod autocomp;
pub mod command;

pub use autocomp::{resolve, CompletionModel};
pub use command::{Command, CommandOption};

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::dt::{Devicetree, Node};
use crate::ui::term::Terminal;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("dtsh: Command not found: {0}")]
    CommandNotFound(String),

    #[error("{command}: {message}")]
    Usage { command: String, message: String },

    #[error("{command}: {message}")]
    Failed { command: String, message: String },
}

pub struct DtShell {
    dt: Devicetree,
    pwd: String,
}

impl DtShell {
    /// A shell on a devicetree, with the root as working node.
    pub fn new(dt: Devicetree) -> Self {
        Self {
            dt,
            pwd: "/".to_string(),
        }
    }

    /// Load the devicetree model and its bindings, then open a shell on it.
    pub fn open(dt_source: &Path, binding_dirs: &[PathBuf]) -> Result<Self> {
        Ok(Self::new(Devicetree::load(dt_source, binding_dirs)?))
    }

    pub fn dt(&self) -> &Devicetree {
        &self.dt
    }

    /// Path of the current working node.
    pub fn pwd(&self) -> &str {
        &self.pwd
    }

    fn set_pwd(&mut self, path: String) {
        tracing::debug!(pwd = %path, "changed working node");
        self.pwd = path;
    }

    /// Resolve a path against the working node into a normalized absolute path.
    pub fn resolve(&self, path: &str) -> String {
        let mut components: Vec<&str> = Vec::new();
        if !path.starts_with('/') {
            components.extend(self.pwd.split('/').filter(|c| !c.is_empty()));
        }
        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                name => components.push(name),
            }
        }
        format!("/{}", components.join("/"))
    }

    /// The node at a (relative or absolute) path.
    pub fn path2node(&self, path: &str) -> Option<Rc<Node>> {
        self.dt.path2node(&self.resolve(path))
    }

    /// Parse and execute one command line, writing its output to `term`.
    ///
    /// A line with no words is a no-op.
    pub fn exec_command_string(
        &mut self,
        line: &str,
        term: &mut Terminal,
    ) -> std::result::Result<(), ShellError> {
        let argv: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = argv.split_first() else {
            return Ok(());
        };
        let command =
            Command::from_name(name).ok_or_else(|| ShellError::CommandNotFound(name.to_string()))?;
        command::execute(self, command, args, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dt::NodeBuilder;

    fn shell() -> DtShell {
        let root = NodeBuilder::root()
            .child(NodeBuilder::new("soc").child(NodeBuilder::new("uart@40002000")))
            .child(NodeBuilder::new("chosen"))
            .build();
        DtShell::new(Devicetree::new(root, Vec::new()))
    }

    #[test]
    fn test_resolve() {
        let mut shell = shell();
        assert_eq!(shell.resolve("/"), "/");
        assert_eq!(shell.resolve("soc"), "/soc");
        assert_eq!(shell.resolve("/soc/./uart@40002000/"), "/soc/uart@40002000");
        assert_eq!(shell.resolve(".."), "/");

        shell.set_pwd("/soc".to_string());
        assert_eq!(shell.resolve("uart@40002000"), "/soc/uart@40002000");
        assert_eq!(shell.resolve("../chosen"), "/chosen");
        assert_eq!(shell.resolve("."), "/soc");
        assert_eq!(shell.resolve(""), "/soc");
    }

    #[test]
    fn test_path2node() {
        let shell = shell();
        assert_eq!(
            shell.path2node("soc/uart@40002000").unwrap().path,
            "/soc/uart@40002000"
        );
        assert!(shell.path2node("nothing").is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ShellError::CommandNotFound("foo".into()).to_string(),
            "dtsh: Command not found: foo"
        );
        assert_eq!(
            ShellError::Usage {
                command: "ls".into(),
                message: "unexpected argument '-x' found".into()
            }
            .to_string(),
            "ls: unexpected argument '-x' found"
        );
        assert_eq!(
            ShellError::Failed {
                command: "cd".into(),
                message: "no such node: /foo".into()
            }
            .to_string(),
            "cd: no such node: /foo"
        );
    }
}
