//! # Line Editor
//!
//! The session reads command lines through a [`LineEditor`]. While a line
//! is being edited the editor owns the terminal and calls back into the
//! session through [`CompletionHooks`] when the user asks for completion.
//!
//! [`ReedlineEditor`] is the interactive implementation: Tab is bound to a
//! host command, which the adapter turns into a [`complete_line`] call
//! before resuming the edit.

use reedline::{
    default_emacs_keybindings, EditCommand, Emacs, HistoryItem, KeyCode, KeyModifiers, Prompt,
    PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent,
    Signal,
};
use std::borrow::Cow;
use std::io;
use unicode_width::UnicodeWidthStr;

/// How a read ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The user entered a line (possibly empty).
    Line(String),
    /// The interrupt key was pressed; the line is dropped.
    Interrupted,
    /// End of input (Ctrl-D on an empty line, closed stdin).
    EndOfInput,
}

/// Callbacks the editor makes into the session while a line is edited.
pub trait CompletionHooks {
    /// The `index`-th completion of `token`, the last word of `line`.
    ///
    /// Index 0 starts a new completion; `None` ends the enumeration.
    fn complete(&mut self, line: &str, token: &str, index: usize) -> Option<String>;

    /// Show the candidates of the last completion below the input line,
    /// then redraw the prompt followed by `line_buffer`.
    fn display(&mut self, substitution: &str, matches: &[String], longest: usize, line_buffer: &str);
}

pub trait LineEditor {
    /// Block until the user enters a line, interrupts or ends the input.
    fn read_line(&mut self, prompt: &str, hooks: &mut dyn CompletionHooks) -> io::Result<ReadOutcome>;

    /// Contents of the line being edited.
    fn line_buffer(&self) -> String;

    /// Drop the editing state after end of input.
    fn abort(&mut self);

    /// Make previous command lines available to history navigation.
    fn load_history(&mut self, entries: &[String]);
}

/// A line after completion, with the cursor (a byte offset) placed right
/// after the substituted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub line: String,
    pub cursor: usize,
}

/// Complete the word ending at `cursor` in `line`.
///
/// The hooks see the line up to the cursor; the text after the cursor is
/// kept as is. A unique candidate replaces the word and is followed by a
/// space, unless it ends with `/` (a node with children, completion
/// continues below it). With several candidates the word is extended to
/// their longest common prefix and the candidates are displayed.
pub fn complete_line(line: &str, cursor: usize, hooks: &mut dyn CompletionHooks) -> Completed {
    let cursor = if line.is_char_boundary(cursor) { cursor } else { line.len() };
    let (before, after) = line.split_at(cursor);
    let start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let (head, token) = before.split_at(start);

    let mut matches = Vec::new();
    while let Some(candidate) = hooks.complete(before, token, matches.len()) {
        matches.push(candidate);
    }

    let word = match matches.as_slice() {
        [] => token.to_string(),
        [unique] => {
            let sep = if unique.ends_with('/') || after.starts_with(' ') { "" } else { " " };
            format!("{}{}", unique, sep)
        }
        _ => {
            let prefix = common_prefix(&matches);
            let substitution = if prefix.len() > token.len() { prefix } else { token };
            let longest = matches.iter().map(|m| m.width()).max().unwrap_or(0);
            let line_buffer = format!("{}{}{}", head, substitution, after);
            hooks.display(substitution, &matches, longest, &line_buffer);
            substitution.to_string()
        }
    };
    Completed {
        cursor: head.len() + word.len(),
        line: format!("{}{}{}", head, word, after),
    }
}

fn common_prefix(words: &[String]) -> &str {
    let Some((first, rest)) = words.split_first() else {
        return "";
    };
    let mut end = first.len();
    for word in rest {
        end = first
            .char_indices()
            .zip(word.chars())
            .find(|((_, a), b)| a != b)
            .map_or(end.min(word.len()), |((i, _), _)| i.min(end));
    }
    &first[..end]
}

/// Host command Tab is bound to.
const COMPLETE_COMMAND: &str = "\u{1}dtsh-complete";

pub struct ReedlineEditor {
    line_editor: Reedline,
}

impl ReedlineEditor {
    pub fn new() -> Self {
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::ExecuteHostCommand(COMPLETE_COMMAND.to_string()),
        );
        let line_editor = Reedline::create().with_edit_mode(Box::new(Emacs::new(keybindings)));
        Self { line_editor }
    }
}

impl Default for ReedlineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor for ReedlineEditor {
    fn read_line(&mut self, prompt: &str, hooks: &mut dyn CompletionHooks) -> io::Result<ReadOutcome> {
        let prompt = ShellPrompt(prompt);
        loop {
            match self.line_editor.read_line(&prompt)? {
                Signal::Success(command) if command == COMPLETE_COMMAND => {
                    let line = self.line_editor.current_buffer_contents().to_string();
                    let cursor = self.line_editor.current_insertion_point();
                    let completed = complete_line(&line, cursor, hooks);
                    if completed.line != line {
                        // Insert the tail first so the cursor lands after the word.
                        let (head, tail) = completed.line.split_at(completed.cursor);
                        self.line_editor.run_edit_commands(&[
                            EditCommand::Clear,
                            EditCommand::InsertString(tail.to_string()),
                            EditCommand::MoveToStart { select: false },
                            EditCommand::InsertString(head.to_string()),
                        ]);
                    }
                }
                Signal::Success(line) => return Ok(ReadOutcome::Line(line)),
                Signal::CtrlC => return Ok(ReadOutcome::Interrupted),
                Signal::CtrlD => return Ok(ReadOutcome::EndOfInput),
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }
    }

    fn line_buffer(&self) -> String {
        self.line_editor.current_buffer_contents().to_string()
    }

    fn abort(&mut self) {
        self.line_editor.run_edit_commands(&[EditCommand::Clear]);
    }

    fn load_history(&mut self, entries: &[String]) {
        let history = self.line_editor.history_mut();
        for entry in entries {
            if let Err(err) = history.save(HistoryItem::from_command_line(entry.as_str())) {
                tracing::warn!("failed to seed editor history: {}", err);
                return;
            }
        }
    }
}

/// The prompt, already rendered (ANSI included) by the session.
struct ShellPrompt<'a>(&'a str);

impl Prompt for ShellPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.0)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}reverse-search: {}) ", prefix, history_search.term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Hooks completing from a fixed word list.
    #[derive(Default)]
    struct WordHooks {
        words: Vec<&'static str>,
        cached: Vec<String>,
        displayed: Vec<(String, Vec<String>, usize, String)>,
    }

    impl CompletionHooks for WordHooks {
        fn complete(&mut self, _line: &str, token: &str, index: usize) -> Option<String> {
            if index == 0 {
                self.cached = self
                    .words
                    .iter()
                    .filter(|w| w.starts_with(token))
                    .map(|w| (*w).to_string())
                    .collect();
            }
            self.cached.get(index).cloned()
        }

        fn display(&mut self, substitution: &str, matches: &[String], longest: usize, line_buffer: &str) {
            self.displayed.push((
                substitution.to_string(),
                matches.to_vec(),
                longest,
                line_buffer.to_string(),
            ));
        }
    }

    fn word_hooks(words: &[&'static str]) -> WordHooks {
        WordHooks {
            words: words.to_vec(),
            ..WordHooks::default()
        }
    }

    /// Complete with the cursor at the end of the line.
    fn complete_at_end(line: &str, hooks: &mut WordHooks) -> String {
        let completed = complete_line(line, line.len(), hooks);
        assert_eq!(completed.cursor, completed.line.len());
        completed.line
    }

    #[test]
    fn test_unique_candidate() {
        let mut hooks = word_hooks(&["tree", "pwd"]);
        assert_eq!(complete_at_end("tr", &mut hooks), "tree ");
        assert!(hooks.displayed.is_empty());

        let mut hooks = word_hooks(&["/soc/", "/cpus"]);
        assert_eq!(complete_at_end("ls /s", &mut hooks), "ls /soc/");
    }

    #[test]
    fn test_no_candidate() {
        let mut hooks = word_hooks(&["tree"]);
        assert_eq!(complete_at_end("ls x", &mut hooks), "ls x");
        assert!(hooks.displayed.is_empty());
    }

    #[test]
    fn test_common_prefix_and_display() {
        let mut hooks = word_hooks(&["uart@40002000", "uart@40028000", "i2c@40003000"]);
        assert_eq!(complete_at_end("cat u", &mut hooks), "cat uart@400");
        assert_eq!(
            hooks.displayed,
            vec![(
                "uart@400".to_string(),
                vec!["uart@40002000".to_string(), "uart@40028000".to_string()],
                13,
                "cat uart@400".to_string()
            )]
        );
    }

    #[test]
    fn test_display_without_progress() {
        let mut hooks = word_hooks(&["cd", "cat"]);
        assert_eq!(complete_at_end("c", &mut hooks), "c");
        assert_eq!(hooks.displayed.len(), 1);
        assert_eq!(hooks.displayed[0].0, "c");
    }

    #[test]
    fn test_completes_word_at_cursor() {
        let mut hooks = word_hooks(&["/soc/", "/cpus"]);
        let completed = complete_line("cat /so --foo", 7, &mut hooks);
        assert_eq!(
            completed,
            Completed {
                line: "cat /soc/ --foo".to_string(),
                cursor: 9,
            }
        );

        let mut hooks = word_hooks(&["tree", "pwd"]);
        let completed = complete_line("tr /soc", 2, &mut hooks);
        assert_eq!(completed.line, "tree /soc");
        assert_eq!(completed.cursor, 4);
    }

    #[test]
    fn test_hooks_see_line_up_to_cursor() {
        let mut hooks = word_hooks(&["uart@40002000", "uart@40028000"]);
        let completed = complete_line("cat u extra", 5, &mut hooks);
        assert_eq!(completed.line, "cat uart@400 extra");
        assert_eq!(completed.cursor, 12);
        assert_eq!(hooks.displayed[0].3, "cat uart@400 extra");

        // Not a char boundary: complete at the end.
        let mut hooks = word_hooks(&["❯x"]);
        let completed = complete_line("❯", 1, &mut hooks);
        assert_eq!(completed.line, "❯x ");
    }

    #[test]
    fn test_common_prefix() {
        let words = |w: &[&str]| w.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        assert_eq!(common_prefix(&words(&["abc", "abd", "ab"])), "ab");
        assert_eq!(common_prefix(&words(&["ab", "abc"])), "ab");
        assert_eq!(common_prefix(&words(&["x", "y"])), "");
        assert_eq!(common_prefix(&[]), "");
    }
}
