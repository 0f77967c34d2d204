//! Built-in commands.
//!
//! | Command | Synopsis |
//! |---------|----------|
//! | `pwd` | print path of the current working node |
//! | `cd [PATH]` | change the current working node |
//! | `ls [-l] [-d] [PATH...]` | list devicetree nodes |
//! | `tree [-l] [-L N] [PATH]` | list devicetree nodes as a tree |
//! | `cat PATH[$PROP]` | show a node or one of its properties |
//! | `man [--compat] NAME` | show a command manual or a binding summary |
//!
//! Arguments are parsed with `clap`; `-h`/`--help` prints the command help.

use clap::error::ErrorKind;
use clap::{Arg, CommandFactory, Parser};
use indexmap::IndexMap;
use std::rc::Rc;

use crate::dt::Node;
use crate::shell::{DtShell, ShellError};
use crate::ui::term::Terminal;
use crate::ui::theme::STYLE_NODE_PATH;
use crate::ui::view::View;
use crate::ui::views::{self, NodeTreeView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pwd,
    Cd,
    Ls,
    Tree,
    Cat,
    Man,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Pwd,
        Command::Cd,
        Command::Ls,
        Command::Tree,
        Command::Cat,
        Command::Man,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Pwd => "pwd",
            Command::Cd => "cd",
            Command::Ls => "ls",
            Command::Tree => "tree",
            Command::Cat => "cat",
            Command::Man => "man",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// The `clap` definition of the command's arguments.
    pub fn clap(self) -> clap::Command {
        match self {
            Command::Pwd => PwdArgs::command(),
            Command::Cd => CdArgs::command(),
            Command::Ls => LsArgs::command(),
            Command::Tree => TreeArgs::command(),
            Command::Cat => CatArgs::command(),
            Command::Man => ManArgs::command(),
        }
    }

    /// One-line summary.
    pub fn summary(self) -> String {
        self.clap()
            .get_about()
            .map(|about| about.to_string())
            .unwrap_or_default()
    }

    /// Options (flags and named arguments), positionals excluded.
    pub fn options(self) -> Vec<CommandOption> {
        self.clap()
            .get_arguments()
            .filter(|arg| !arg.is_positional() && arg.get_id().as_str() != "help")
            .map(CommandOption::from_arg)
            .collect()
    }
}

/// A command option as shown in hints and completed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub short: Option<char>,
    pub long: Option<String>,
    /// Name of the option value, for options taking one.
    pub value_name: Option<String>,
    pub help: String,
}

impl CommandOption {
    fn from_arg(arg: &Arg) -> Self {
        let value_name = if arg.get_action().takes_values() {
            arg.get_value_names()
                .and_then(|names| names.first())
                .map(|name| name.to_string())
        } else {
            None
        };
        Self {
            short: arg.get_short(),
            long: arg.get_long().map(str::to_string),
            value_name,
            help: arg.get_help().map(|h| h.to_string()).unwrap_or_default(),
        }
    }

    /// Usage string, e.g. `-L, --depth <N>`.
    pub fn usage(&self) -> String {
        let mut usage = match (self.short, &self.long) {
            (Some(short), Some(long)) => format!("-{}, --{}", short, long),
            (Some(short), None) => format!("-{}", short),
            (None, Some(long)) => format!("--{}", long),
            (None, None) => String::new(),
        };
        if let Some(value) = &self.value_name {
            usage.push_str(&format!(" <{}>", value));
        }
        usage
    }

    /// Completion candidate: the long form when asked for or when there is no
    /// short form.
    pub fn completion(&self, long_form: bool) -> String {
        match (self.short, &self.long) {
            (Some(short), _) if !long_form || self.long.is_none() => format!("-{}", short),
            (_, Some(long)) => format!("--{}", long),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwd", about = "print path of current working node")]
struct PwdArgs {}

#[derive(Debug, Parser)]
#[command(name = "cd", about = "change current working node")]
struct CdArgs {
    /// node path (default: /)
    #[arg(value_name = "PATH")]
    path: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "ls", about = "list devicetree nodes")]
struct LsArgs {
    /// use rich listing format
    #[arg(short = 'l')]
    rich: bool,

    /// list nodes, not their content
    #[arg(short = 'd')]
    no_content: bool,

    /// node paths (default: current working node)
    #[arg(value_name = "PATH")]
    paths: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(name = "tree", about = "list devicetree nodes in tree-like format")]
struct TreeArgs {
    /// use rich listing format
    #[arg(short = 'l')]
    rich: bool,

    /// max display depth of the tree (0: unlimited)
    #[arg(short = 'L', long = "depth", value_name = "N", default_value_t = 0)]
    depth: usize,

    /// root node path (default: current working node)
    #[arg(value_name = "PATH")]
    path: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "cat", about = "concatenate and print devicetree content")]
struct CatArgs {
    /// node path, optionally followed by `$` and a property name
    #[arg(value_name = "PATH[$PROP]")]
    target: String,
}

#[derive(Debug, Parser)]
#[command(name = "man", about = "open a manual page")]
struct ManArgs {
    /// NAME is a compatible string, show its binding
    #[arg(long)]
    compat: bool,

    /// command name or compatible string
    #[arg(value_name = "NAME")]
    name: String,
}

/// Execute a command with its arguments (the command name excluded).
pub fn execute(
    shell: &mut DtShell,
    command: Command,
    args: &[&str],
    term: &mut Terminal,
) -> Result<(), ShellError> {
    tracing::debug!(command = command.name(), ?args, "executing command");
    match command {
        Command::Pwd => {
            if parse::<PwdArgs>(command, args, term)?.is_some() {
                let view: View = term.builder().txt(shell.pwd()).into();
                emit(command, term, &view)?;
            }
        }
        Command::Cd => {
            if let Some(args) = parse::<CdArgs>(command, args, term)? {
                let path = args.path.as_deref().unwrap_or("/");
                let node = lookup(shell, command, path)?;
                shell.set_pwd(node.path.clone());
            }
        }
        Command::Ls => {
            if let Some(args) = parse::<LsArgs>(command, args, term)? {
                ls(shell, command, args, term)?;
            }
        }
        Command::Tree => {
            if let Some(args) = parse::<TreeArgs>(command, args, term)? {
                let path = args.path.as_deref().unwrap_or(shell.pwd());
                let node = lookup(shell, command, path)?;
                let tree = NodeTreeView::new(term.builder(), shell.dt(), args.depth, args.rich)
                    .build(&node);
                emit(command, term, &tree.into())?;
            }
        }
        Command::Cat => {
            if let Some(args) = parse::<CatArgs>(command, args, term)? {
                cat(shell, command, &args.target, term)?;
            }
        }
        Command::Man => {
            if let Some(args) = parse::<ManArgs>(command, args, term)? {
                man(shell, command, args, term)?;
            }
        }
    }
    Ok(())
}

/// Parse command arguments. `None` when the help was requested and printed.
fn parse<T: Parser>(
    command: Command,
    args: &[&str],
    term: &mut Terminal,
) -> Result<Option<T>, ShellError> {
    let argv = std::iter::once(command.name()).chain(args.iter().copied());
    match T::try_parse_from(argv) {
        Ok(args) => Ok(Some(args)),
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            let help = err.render().to_string();
            let view: View = term.builder().txt(help.trim_end()).into();
            emit(command, term, &view)?;
            Ok(None)
        }
        Err(err) => Err(ShellError::Usage {
            command: command.name().to_string(),
            message: usage_message(&err),
        }),
    }
}

/// First line of a `clap` error, without its `error: ` prefix.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

fn failed(command: Command, message: impl Into<String>) -> ShellError {
    ShellError::Failed {
        command: command.name().to_string(),
        message: message.into(),
    }
}

fn lookup(shell: &DtShell, command: Command, path: &str) -> Result<Rc<Node>, ShellError> {
    shell
        .path2node(path)
        .ok_or_else(|| failed(command, format!("no such node: {}", path)))
}

fn emit(command: Command, term: &mut Terminal, view: &View) -> Result<(), ShellError> {
    term.write_view(view)
        .and_then(|()| term.flush())
        .map_err(|err| failed(command, err.to_string()))
}

fn ls(shell: &DtShell, command: Command, args: LsArgs, term: &mut Terminal) -> Result<(), ShellError> {
    let paths = if args.paths.is_empty() {
        vec![shell.pwd().to_string()]
    } else {
        args.paths
    };

    let mut node_map: IndexMap<String, Vec<Rc<Node>>> = IndexMap::new();
    for path in &paths {
        let node = lookup(shell, command, path)?;
        let content = if args.no_content {
            vec![Rc::clone(&node)]
        } else {
            node.children.values().cloned().collect()
        };
        node_map.insert(node.path.clone(), content);
    }

    let view = views::node_list_view(
        term.builder(),
        shell.dt(),
        &node_map,
        args.no_content,
        args.rich,
    );
    emit(command, term, &view)
}

fn cat(shell: &DtShell, command: Command, target: &str, term: &mut Terminal) -> Result<(), ShellError> {
    let (path, prop) = match target.split_once('$') {
        Some((path, prop)) => (path, Some(prop)),
        None => (target, None),
    };
    let path = if path.is_empty() { shell.pwd() } else { path };
    let node = lookup(shell, command, path)?;

    let view = match prop {
        Some(name) => {
            let prop = node
                .props
                .get(name)
                .ok_or_else(|| failed(command, format!("no such property: {}", name)))?;
            views::property_view(term.builder(), prop)
        }
        None => views::node_view(term.builder(), shell.dt(), &node),
    };
    emit(command, term, &view)
}

fn man(shell: &DtShell, command: Command, args: ManArgs, term: &mut Terminal) -> Result<(), ShellError> {
    let view = if args.compat {
        let binding = shell
            .dt()
            .binding(&args.name)
            .ok_or_else(|| failed(command, format!("no such binding: {}", args.name)))?;
        views::binding_view(term.builder(), binding)
    } else {
        let page = Command::from_name(&args.name)
            .ok_or_else(|| failed(command, format!("no manual entry for {}", args.name)))?;
        let help = page.clap().render_long_help().to_string();
        let vb = term.builder();
        View::Stack(vec![
            vb.txt_styled(page.name(), STYLE_NODE_PATH).into(),
            vb.txt(help.trim_end()).into(),
        ])
    };
    emit(command, term, &view)
}
