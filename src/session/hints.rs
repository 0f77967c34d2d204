//! # Completion Hints
//!
//! [`HintDispatcher`] keeps the model of the last completion: the editor
//! asks for its candidates one index at a time, then asks to display it.
//! Both answers come from the same model, so the hints shown always match
//! what was substituted.

use std::io;

use crate::session::editor::CompletionHooks;
use crate::shell::{resolve, CompletionModel, DtShell};
use crate::ui::term::Terminal;
use crate::ui::view::View;
use crate::ui::views;

#[derive(Debug, Default)]
pub struct HintDispatcher {
    model: CompletionModel,
    candidates: Vec<String>,
}

impl HintDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &CompletionModel {
        &self.model
    }

    /// The `index`-th completion of `token`.
    ///
    /// Index 0 resolves a new model; other indices read the cached one.
    pub fn complete(&mut self, shell: &DtShell, line: &str, token: &str, index: usize) -> Option<String> {
        if index == 0 {
            self.model = resolve(shell, line, token);
            self.candidates = self.model.candidates();
            tracing::debug!(
                kind = self.model.kind(),
                count = self.candidates.len(),
                token,
                "completion"
            );
        }
        self.candidates.get(index).cloned()
    }

    /// The hints of the cached model.
    pub fn hints_view(&self, shell: &DtShell, term: &Terminal) -> View {
        let vb = term.builder();
        match &self.model {
            CompletionModel::Empty => View::Empty,
            CompletionModel::Commands(commands) => views::command_hints(vb, commands),
            CompletionModel::Options { options, .. } => views::option_hints(vb, options),
            CompletionModel::Bindings(bindings) => views::binding_hints(vb, bindings),
            CompletionModel::Nodes { nodes, .. } => views::node_hints(vb, shell.dt(), nodes),
            CompletionModel::Plain(candidates) => views::plain_hints(vb, candidates),
        }
    }

    /// Write the hints below the input line, then the prompt and the line.
    pub fn display(
        &self,
        shell: &DtShell,
        term: &mut Terminal,
        prompt: &str,
        line_buffer: &str,
    ) -> io::Result<()> {
        let view = self.hints_view(shell, term);
        term.newline()?;
        term.write_view(&view)?;
        term.write_raw(prompt)?;
        term.write_raw(line_buffer)?;
        term.flush()
    }
}

/// The hooks a session lends to its line editor for one read.
pub struct SessionHooks<'a> {
    pub shell: &'a DtShell,
    pub term: &'a mut Terminal,
    pub hints: &'a mut HintDispatcher,
    /// Rendered prompt, redrawn after the hints.
    pub prompt: &'a str,
}

impl CompletionHooks for SessionHooks<'_> {
    fn complete(&mut self, line: &str, token: &str, index: usize) -> Option<String> {
        self.hints.complete(self.shell, line, token, index)
    }

    fn display(&mut self, substitution: &str, matches: &[String], longest: usize, line_buffer: &str) {
        tracing::trace!(substitution, count = matches.len(), longest, "display hints");
        if let Err(err) = self.hints.display(self.shell, self.term, self.prompt, line_buffer) {
            tracing::warn!("failed to display completion hints: {}", err);
        }
    }
}
