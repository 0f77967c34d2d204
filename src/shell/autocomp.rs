//! Command line autocompletion.
//!
//! [`resolve`] looks at the words before the token being completed and
//! returns a [`CompletionModel`]: the candidates, still typed, so the hint
//! display can render them with the right view.

use std::rc::Rc;

use crate::dt::{Binding, Node};
use crate::shell::command::{Command, CommandOption};
use crate::shell::DtShell;

/// Completion candidates of one kind.
#[derive(Debug, Clone, Default)]
pub enum CompletionModel {
    #[default]
    Empty,
    Commands(Vec<Command>),
    /// Options of the command being edited; `long_form` when the token
    /// starts with `--`.
    Options {
        options: Vec<CommandOption>,
        long_form: bool,
    },
    Bindings(Vec<Binding>),
    /// Child nodes of the directory part (`prefix`) of the token.
    Nodes {
        prefix: String,
        nodes: Vec<Rc<Node>>,
    },
    /// Ready-made candidates (property names).
    Plain(Vec<String>),
}

impl CompletionModel {
    /// Strings substituted on the command line, in model order.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            CompletionModel::Empty => Vec::new(),
            CompletionModel::Commands(commands) => {
                commands.iter().map(|c| c.name().to_string()).collect()
            }
            CompletionModel::Options { options, long_form } => options
                .iter()
                .map(|option| option.completion(*long_form))
                .collect(),
            CompletionModel::Bindings(bindings) => {
                bindings.iter().map(|b| b.compatible.clone()).collect()
            }
            CompletionModel::Nodes { prefix, nodes } => nodes
                .iter()
                .map(|node| {
                    let sep = if node.has_children() { "/" } else { "" };
                    format!("{}{}{}", prefix, node.name, sep)
                })
                .collect(),
            CompletionModel::Plain(candidates) => candidates.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CompletionModel::Empty => "empty",
            CompletionModel::Commands(_) => "commands",
            CompletionModel::Options { .. } => "options",
            CompletionModel::Bindings(_) => "bindings",
            CompletionModel::Nodes { .. } => "nodes",
            CompletionModel::Plain(_) => "plain",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CompletionModel::Empty => 0,
            CompletionModel::Commands(commands) => commands.len(),
            CompletionModel::Options { options, .. } => options.len(),
            CompletionModel::Bindings(bindings) => bindings.len(),
            CompletionModel::Nodes { nodes, .. } => nodes.len(),
            CompletionModel::Plain(candidates) => candidates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the completions of `token`, the last word of `line`.
pub fn resolve(shell: &DtShell, line: &str, token: &str) -> CompletionModel {
    let head = line.strip_suffix(token).unwrap_or(line);
    let words: Vec<&str> = head.split_whitespace().collect();

    let Some((name, args)) = words.split_first() else {
        return CompletionModel::Commands(
            Command::ALL
                .into_iter()
                .filter(|c| c.name().starts_with(token))
                .collect(),
        );
    };
    let Some(command) = Command::from_name(name) else {
        return CompletionModel::Empty;
    };

    if token.starts_with('-') {
        let long_form = token.starts_with("--");
        let options: Vec<CommandOption> = command
            .options()
            .into_iter()
            .filter(|option| option.completion(long_form).starts_with(token))
            .collect();
        return CompletionModel::Options { options, long_form };
    }

    match command {
        Command::Pwd => CompletionModel::Empty,
        Command::Man if args.contains(&"--compat") => CompletionModel::Bindings(
            shell
                .dt()
                .bindings()
                .filter(|b| b.compatible.starts_with(token))
                .cloned()
                .collect(),
        ),
        Command::Man => CompletionModel::Commands(
            Command::ALL
                .into_iter()
                .filter(|c| c.name().starts_with(token))
                .collect(),
        ),
        Command::Cat if token.contains('$') => complete_property(shell, token),
        _ => complete_node(shell, token),
    }
}

fn complete_property(shell: &DtShell, token: &str) -> CompletionModel {
    let Some((path, prefix)) = token.split_once('$') else {
        return CompletionModel::Empty;
    };
    let node = if path.is_empty() {
        shell.path2node(shell.pwd())
    } else {
        shell.path2node(path)
    };
    let Some(node) = node else {
        return CompletionModel::Empty;
    };
    CompletionModel::Plain(
        node.props
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(|name| format!("{}${}", path, name))
            .collect(),
    )
}

fn complete_node(shell: &DtShell, token: &str) -> CompletionModel {
    let (dir, prefix) = match token.rfind('/') {
        Some(idx) => token.split_at(idx + 1),
        None => ("", token),
    };
    let parent = if dir.is_empty() {
        shell.path2node(shell.pwd())
    } else {
        shell.path2node(dir)
    };
    let Some(parent) = parent else {
        return CompletionModel::Empty;
    };

    CompletionModel::Nodes {
        prefix: dir.to_string(),
        nodes: parent
            .children
            .values()
            .filter(|node| node.name.starts_with(prefix))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dt::{Devicetree, NodeBuilder, Property, PropertyValue};
    use pretty_assertions::assert_eq;

    fn shell() -> DtShell {
        let root = NodeBuilder::root()
            .child(
                NodeBuilder::new("soc")
                    .child(
                        NodeBuilder::new("uart@40002000")
                            .property(Property::new("current-speed", PropertyValue::Int(115200)))
                            .property(Property::new("status", PropertyValue::String("okay".into()))),
                    )
                    .child(NodeBuilder::new("uart@40028000"))
                    .child(NodeBuilder::new("gpio@50000000")),
            )
            .child(NodeBuilder::new("chosen"))
            .build();
        let bindings = vec![
            Binding {
                compatible: "nordic,nrf-uarte".into(),
                description: None,
                path: None,
            },
            Binding {
                compatible: "nordic,nrf-gpio".into(),
                description: None,
                path: None,
            },
            Binding {
                compatible: "zephyr,sdhc-spi-slot".into(),
                description: None,
                path: None,
            },
        ];
        DtShell::new(Devicetree::new(root, bindings))
    }

    #[test]
    fn test_complete_commands() {
        let shell = shell();
        let model = resolve(&shell, "c", "c");
        assert_eq!(model.kind(), "commands");
        assert_eq!(model.candidates(), vec!["cd", "cat"]);
        assert_eq!(resolve(&shell, "", "").len(), Command::ALL.len());
        assert!(resolve(&shell, "rm ", "").is_empty());
    }

    #[test]
    fn test_complete_options() {
        let shell = shell();
        let model = resolve(&shell, "tree -", "-");
        assert_eq!(model.candidates(), vec!["-l", "-L"]);
        let model = resolve(&shell, "tree --", "--");
        assert_eq!(model.candidates(), vec!["--depth"]);
        let model = resolve(&shell, "man -", "-");
        assert_eq!(model.candidates(), vec!["--compat"]);
    }

    #[test]
    fn test_complete_nodes() {
        let shell = shell();
        let model = resolve(&shell, "ls ", "");
        assert_eq!(model.candidates(), vec!["soc/", "chosen"]);

        let model = resolve(&shell, "ls /soc/uart", "/soc/uart");
        assert_eq!(model.kind(), "nodes");
        assert_eq!(
            model.candidates(),
            vec!["/soc/uart@40002000", "/soc/uart@40028000"]
        );

        let model = resolve(&shell, "tree -l so", "so");
        assert_eq!(model.candidates(), vec!["soc/"]);
        assert!(resolve(&shell, "cd /nothing/", "/nothing/").is_empty());
    }

    #[test]
    fn test_complete_properties() {
        let shell = shell();
        let model = resolve(
            &shell,
            "cat /soc/uart@40002000$c",
            "/soc/uart@40002000$c",
        );
        assert_eq!(model.kind(), "plain");
        assert_eq!(model.candidates(), vec!["/soc/uart@40002000$current-speed"]);
    }

    #[test]
    fn test_complete_bindings() {
        let shell = shell();
        let model = resolve(&shell, "man --compat nordic", "nordic");
        assert_eq!(model.kind(), "bindings");
        assert_eq!(
            model.candidates(),
            vec!["nordic,nrf-uarte", "nordic,nrf-gpio"]
        );
        assert_eq!(resolve(&shell, "man l", "l").candidates(), vec!["ls"]);
        assert!(resolve(&shell, "pwd ", "").is_empty());
    }
}
