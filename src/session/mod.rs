//! # Interactive Session
//!
//! A [`Session`] runs the prompt loop: print the working node path, read a
//! line, dispatch it to the shell, remember whether it failed.
//!
//! ## States
//!
//! ```text
//!  open ──> Running ──(quit alias, end of input, I/O error)──> Closed
//!             │  ▲
//!             └──┘ one command line per step
//! ```
//!
//! The prompt turns to the error style while the last command line failed,
//! and back as soon as a command succeeds or an empty line is entered.
//!
//! Only one session may be open in a process; the slot is released when
//! the session is dropped.

pub mod editor;
pub mod error;
pub mod hints;
pub mod history;

pub use editor::{
    complete_line, Completed, CompletionHooks, LineEditor, ReadOutcome, ReedlineEditor,
};
pub use error::SessionError;
pub use hints::HintDispatcher;
pub use history::History;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::shell::{DtShell, ShellError};
use crate::ui::builders::ViewBuilder;
use crate::ui::config::{self, Config};
use crate::ui::term::Terminal;
use crate::ui::theme::{
    Theme, STYLE_BOLD, STYLE_ITALIC, STYLE_NODE_PATH, STYLE_PROMPT, STYLE_PROMPT_ERROR,
};
use crate::ui::view::Text;
use hints::SessionHooks;

/// Lines that close the session instead of being dispatched.
pub const QUIT_ALIASES: [&str; 3] = ["q", "quit", "exit"];

pub const PROMPT: &str = "❯ ";

static SESSION_OPEN: AtomicBool = AtomicBool::new(false);

/// Holds the process-wide session slot until dropped.
#[derive(Debug)]
struct SessionGuard;

impl SessionGuard {
    fn acquire() -> Result<Self, SessionError> {
        SESSION_OPEN
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| SessionGuard)
            .map_err(|_| SessionError::SessionAlreadyOpen)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        SESSION_OPEN.store(false, Ordering::SeqCst);
    }
}

/// What [`Session::open`] needs to know, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Devicetree model file.
    pub dt_source: PathBuf,
    /// Directories searched for binding files.
    pub binding_dirs: Vec<PathBuf>,
    /// Configuration directory; the platform default when `None`.
    pub config_dir: Option<PathBuf>,
    /// Theme name, overriding the configuration.
    pub theme: Option<String>,
    /// Blank line after each command, overriding the configuration when set.
    pub sparse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Closed,
}

pub struct Session {
    shell: DtShell,
    term: Terminal,
    editor: Box<dyn LineEditor>,
    hints: HintDispatcher,
    history: History,
    last_error: Option<ShellError>,
    state: SessionState,
    sparse: bool,
    _guard: SessionGuard,
}

impl Session {
    /// Open an interactive session on stdout.
    ///
    /// Fails with [`SessionError::SessionAlreadyOpen`] before loading
    /// anything if another session is open.
    pub fn open(options: SessionOptions) -> Result<Self, SessionError> {
        let guard = SessionGuard::acquire()?;

        let config_dir = match options.config_dir {
            Some(dir) => dir,
            None => config::default_config_dir().map_err(SessionError::History)?,
        };
        let mut config = Config::load(&config_dir);
        if let Some(theme) = options.theme {
            if Theme::by_name(&theme).is_none() {
                tracing::warn!(theme = %theme, "unknown theme");
            }
            config.theme = theme;
        }
        config.sparse_prompt |= options.sparse;

        let shell = DtShell::open(&options.dt_source, &options.binding_dirs)
            .map_err(SessionError::Devicetree)?;
        let history = History::load(config_dir.join(history::HISTORY_FILE), config.history_size)
            .map_err(SessionError::History)?;

        match ctrlc::set_handler(|| tracing::debug!("interrupt ignored")) {
            Ok(()) | Err(ctrlc::Error::MultipleHandlers) => {}
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            dt = %options.dt_source.display(),
            theme = %config.theme,
            "session opened"
        );
        Ok(Self::assemble(
            guard,
            shell,
            Terminal::stdout(config.stylesheet()),
            Box::new(ReedlineEditor::new()),
            history,
            config.sparse_prompt,
        ))
    }

    /// A session on caller-supplied parts.
    pub fn with_parts(
        shell: DtShell,
        term: Terminal,
        editor: Box<dyn LineEditor>,
        history: History,
        sparse: bool,
    ) -> Result<Self, SessionError> {
        let guard = SessionGuard::acquire()?;
        Ok(Self::assemble(guard, shell, term, editor, history, sparse))
    }

    fn assemble(
        guard: SessionGuard,
        shell: DtShell,
        term: Terminal,
        mut editor: Box<dyn LineEditor>,
        history: History,
        sparse: bool,
    ) -> Self {
        editor.load_history(history.entries());
        Self {
            shell,
            term,
            editor,
            hints: HintDispatcher::new(),
            history,
            last_error: None,
            state: SessionState::Running,
            sparse,
            _guard: guard,
        }
    }

    pub fn shell(&self) -> &DtShell {
        &self.shell
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Error of the last dispatched command line, if it failed.
    pub fn last_error(&self) -> Option<&ShellError> {
        self.last_error.as_ref()
    }

    /// Show the banner, then run steps until the session is closed.
    ///
    /// A terminal or editor I/O error closes the session as well: it is
    /// logged, then the history is saved.
    pub fn run(&mut self) {
        let mut result = self.start();
        while result.is_ok() && self.state == SessionState::Running {
            result = self.step();
        }
        if let Err(err) = result {
            tracing::error!("closing session: {}", err);
            self.close();
        }
    }

    fn start(&mut self) -> Result<(), SessionError> {
        self.term.clear()?;
        let banner = banner(self.term.builder());
        self.term.write_text(&banner)?;
        self.term.newline()?;
        Ok(())
    }

    /// Read and handle one command line.
    pub fn step(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        let vb = self.term.builder();
        let path = vb.txt_styled(self.shell.pwd(), STYLE_NODE_PATH);
        let prompt_style = if self.last_error.is_some() {
            STYLE_PROMPT_ERROR
        } else {
            STYLE_PROMPT
        };
        let prompt = self.term.render_inline(&vb.txt_styled(PROMPT, prompt_style));
        self.term.write_text(&path)?;
        self.term.flush()?;

        let mut hooks = SessionHooks {
            shell: &self.shell,
            term: &mut self.term,
            hints: &mut self.hints,
            prompt: &prompt,
        };
        match self.editor.read_line(&prompt, &mut hooks)? {
            ReadOutcome::Line(line) => self.handle_line(&line)?,
            ReadOutcome::Interrupted => tracing::debug!("line dropped"),
            ReadOutcome::EndOfInput => {
                self.editor.abort();
                self.term.newline()?;
                self.close();
                return Ok(());
            }
        }

        if self.state == SessionState::Running && self.sparse {
            self.term.newline()?;
        }
        self.term.flush()?;
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<(), SessionError> {
        let line = line.trim();
        if line.is_empty() {
            self.last_error = None;
            return Ok(());
        }
        self.history.push(line);

        if QUIT_ALIASES.contains(&line) {
            self.close();
            return Ok(());
        }

        match self.shell.exec_command_string(line, &mut self.term) {
            Ok(()) => self.last_error = None,
            Err(err) => {
                tracing::info!(line, error = %err, "command failed");
                let message = self.term.builder().txt(err.to_string());
                self.term.write_text(&message)?;
                self.last_error = Some(err);
            }
        }
        Ok(())
    }

    /// Say goodbye and save the history. Closing twice is a no-op.
    ///
    /// Failures are logged: the history is saved even when the terminal
    /// is gone.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        let bye = self.term.builder().txt_styled("bye.", STYLE_ITALIC);
        if let Err(err) = self.term.write_text(&bye).and_then(|()| self.term.flush()) {
            tracing::warn!("failed to write to terminal: {}", err);
        }
        if let Err(err) = self.history.save() {
            tracing::warn!("failed to save history: {:#}", err);
        }
        tracing::info!("session closed");
    }
}

/// `dtsh (<version>): Shell-like interface to a devicetree`
fn banner(vb: ViewBuilder<'_>) -> Text {
    let mut text = vb.txt_styled("dtsh", STYLE_BOLD);
    text.append(vb.txt(format!(" ({}): ", env!("CARGO_PKG_VERSION"))));
    text.append(vb.txt_styled("Shell-like interface to a devicetree", STYLE_ITALIC));
    text
}
