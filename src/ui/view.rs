//! # Renderable Views
//!
//! Immutable renderables produced by the view builders and written by the
//! [`Terminal`](crate::ui::term::Terminal):
//!
//! - [`Text`] - styled runs, optionally linked to a file;
//! - [`Grid`] - rows of cells with natural or fixed column widths;
//! - [`Tree`] - a label with branches, drawn with box-drawing guides;
//! - [`View`] - any of the above, or a vertical stack of views.
//!
//! Every view lays out to a list of [`Line`]s. Styles are resolved when the
//! view is built, so layout never needs the theme.

use ratatui::style::Style;
use std::path::{Path, PathBuf};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ELLIPSIS: &str = "…";

const GUIDE_TEE: &str = "├── ";
const GUIDE_ELBOW: &str = "└── ";
const GUIDE_PIPE: &str = "│   ";
const GUIDE_SPACE: &str = "    ";

const SECTION_INDENT: &str = "  ";

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Style,
    /// File the run links to (rendered as a terminal hyperlink).
    pub link: Option<PathBuf>,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    pub fn with_link(mut self, path: &Path) -> Self {
        self.link = Some(path.to_path_buf());
        self
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// Styled text. May span several lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    spans: Vec<Span>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let mut t = Self::new();
        t.push(text, style);
        t
    }

    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        self.push_span(Span::new(text, style));
    }

    pub fn push_span(&mut self, span: Span) {
        if !span.text.is_empty() {
            self.spans.push(span);
        }
    }

    pub fn append(&mut self, other: Text) {
        self.spans.extend(other.spans);
    }

    /// Join texts with a plain separator.
    pub fn join(texts: impl IntoIterator<Item = Text>, sep: &str) -> Text {
        let mut joined = Text::new();
        for (i, text) in texts.into_iter().enumerate() {
            if i > 0 {
                joined.push(sep, Style::default());
            }
            joined.append(text);
        }
        joined
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Display width of the widest line.
    pub fn width(&self) -> usize {
        self.lines().iter().map(Line::width).max().unwrap_or(0)
    }

    /// The text without styles.
    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Split into lines at `\n`.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines = vec![Line::default()];
        for span in &self.spans {
            for (i, part) in span.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(Line::default());
                }
                if !part.is_empty() {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(Span {
                            text: part.to_string(),
                            style: span.style,
                            link: span.link.clone(),
                        });
                    }
                }
            }
        }
        lines
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::plain(text)
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::plain(text)
    }
}

/// One output line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Cut the line to `width` columns, ending with an ellipsis when cut.
    pub fn truncate(mut self, width: usize) -> Line {
        if self.width() <= width {
            return self;
        }
        if width == 0 {
            return Line::default();
        }

        let budget = width - ELLIPSIS.width();
        let mut used = 0;
        let mut spans = Vec::new();
        let mut last_style = Style::default();
        for span in self.spans.drain(..) {
            last_style = span.style;
            let mut text = String::new();
            for c in span.text.chars() {
                let w = c.width().unwrap_or(0);
                if used + w > budget {
                    break;
                }
                used += w;
                text.push(c);
            }
            let full = text.len() == span.text.len();
            if !text.is_empty() {
                spans.push(Span { text, ..span });
            }
            if !full {
                break;
            }
        }
        spans.push(Span::new(ELLIPSIS, last_style));
        Line { spans }
    }

    /// Pad with spaces up to `width` columns.
    pub fn pad(mut self, width: usize) -> Line {
        let w = self.width();
        if w < width {
            self.spans
                .push(Span::new(" ".repeat(width - w), Style::default()));
        }
        self
    }

    fn prepend(&mut self, prefix: Span) {
        self.spans.insert(0, prefix);
    }
}

/// Width policy of a grid column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnWidth {
    /// As wide as the widest cell.
    #[default]
    Natural,
    /// Exactly this wide; longer cells are truncated with an ellipsis.
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub width: ColumnWidth,
}

/// Rows of single-line cells, separated by one space.
///
/// Columns whose computed width is zero are omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    columns: Vec<Column>,
    rows: Vec<Vec<Text>>,
    show_header: bool,
    header_style: Style,
}

impl Grid {
    /// A grid with `ncols` natural-width columns and no header.
    pub fn new(ncols: usize) -> Self {
        Self {
            columns: vec![
                Column {
                    header: String::new(),
                    width: ColumnWidth::Natural,
                };
                ncols
            ],
            rows: Vec::new(),
            show_header: false,
            header_style: Style::default(),
        }
    }

    /// A grid with a header row.
    pub fn with_headers(headers: &[&str], header_style: Style) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|h| Column {
                    header: h.to_string(),
                    width: ColumnWidth::Natural,
                })
                .collect(),
            rows: Vec::new(),
            show_header: true,
            header_style,
        }
    }

    /// Fix the width of a column. Out of range indices are ignored.
    pub fn set_width(&mut self, col: usize, width: ColumnWidth) {
        if let Some(column) = self.columns.get_mut(col) {
            column.width = width;
        }
    }

    /// Add a row. Missing cells are empty, extra cells are dropped.
    pub fn add_row(&mut self, mut cells: Vec<Text>) {
        cells.resize_with(self.columns.len(), Text::new);
        self.rows.push(cells);
    }

    pub fn rows(&self) -> &[Vec<Text>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The laid out grid as (multi-line) text.
    pub fn to_text(&self) -> Text {
        let mut text = Text::new();
        for (i, line) in self.layout().into_iter().enumerate() {
            if i > 0 {
                text.push("\n", Style::default());
            }
            for span in line.spans {
                text.push_span(span);
            }
        }
        text
    }

    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| match column.width {
                ColumnWidth::Fixed(width) => width,
                ColumnWidth::Natural => {
                    let header = if self.show_header {
                        column.header.width()
                    } else {
                        0
                    };
                    self.rows
                        .iter()
                        .map(|row| cell_line(&row[i]).width())
                        .max()
                        .unwrap_or(0)
                        .max(header)
                }
            })
            .collect()
    }

    pub fn layout(&self) -> Vec<Line> {
        let widths = self.column_widths();
        let visible: Vec<usize> = (0..widths.len()).filter(|i| widths[*i] > 0).collect();
        let mut lines = Vec::new();

        if self.show_header {
            let cells: Vec<Line> = visible
                .iter()
                .map(|i| Line {
                    spans: vec![Span::new(self.columns[*i].header.clone(), self.header_style)],
                })
                .collect();
            lines.push(join_cells(cells, &visible, &widths));

            let rule_width: usize = visible.iter().map(|i| widths[*i]).sum::<usize>()
                + visible.len().saturating_sub(1);
            lines.push(Line {
                spans: vec![Span::new("─".repeat(rule_width), self.header_style)],
            });
        }

        for row in &self.rows {
            let cells: Vec<Line> = visible.iter().map(|i| cell_line(&row[*i])).collect();
            lines.push(join_cells(cells, &visible, &widths));
        }
        lines
    }
}

/// Cells are single-line: embedded newlines become spaces.
fn cell_line(text: &Text) -> Line {
    Line {
        spans: text
            .spans()
            .iter()
            .map(|span| Span {
                text: span.text.replace('\n', " "),
                ..span.clone()
            })
            .collect(),
    }
}

fn join_cells(cells: Vec<Line>, visible: &[usize], widths: &[usize]) -> Line {
    let last = cells.len().saturating_sub(1);
    let mut line = Line::default();
    for (n, (cell, col)) in cells.into_iter().zip(visible).enumerate() {
        let cell = cell.truncate(widths[*col]);
        let cell = if n < last { cell.pad(widths[*col]) } else { cell };
        if n > 0 {
            line.spans.push(Span::new(" ", Style::default()));
        }
        line.spans.extend(cell.spans);
    }
    trim_end(line)
}

fn trim_end(mut line: Line) -> Line {
    while let Some(span) = line.spans.last_mut() {
        let trimmed = span.text.trim_end_matches(' ').len();
        if trimmed == 0 {
            line.spans.pop();
        } else {
            span.text.truncate(trimmed);
            break;
        }
    }
    line
}

/// A tree: one label line, then each branch indented under box-drawing guides.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub label: Text,
    pub branches: Vec<Tree>,
    pub guide_style: Style,
}

impl Tree {
    pub fn new(label: Text, guide_style: Style) -> Self {
        Self {
            label,
            branches: Vec::new(),
            guide_style,
        }
    }

    pub fn add(&mut self, branch: Tree) {
        self.branches.push(branch);
    }

    /// Number of levels below this one.
    pub fn height(&self) -> usize {
        self.branches
            .iter()
            .map(|b| b.height() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn layout(&self) -> Vec<Line> {
        let mut lines = self.label.lines();
        let count = self.branches.len();
        for (i, branch) in self.branches.iter().enumerate() {
            let last = i + 1 == count;
            let (first_guide, rest_guide) = if last {
                (GUIDE_ELBOW, GUIDE_SPACE)
            } else {
                (GUIDE_TEE, GUIDE_PIPE)
            };
            for (n, mut line) in branch.layout().into_iter().enumerate() {
                let guide = if n == 0 { first_guide } else { rest_guide };
                line.prepend(Span::new(guide, self.guide_style));
                lines.push(trim_end(line));
            }
        }
        lines
    }
}

/// Anything the terminal can write.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Empty,
    Text(Text),
    Grid(Grid),
    Tree(Tree),
    /// Views written one below the other.
    Stack(Vec<View>),
    /// A titled section: the title, the body indented, then a blank line.
    Section { title: Text, body: Box<View> },
}

impl View {
    pub fn layout(&self) -> Vec<Line> {
        match self {
            View::Empty => Vec::new(),
            View::Text(text) => text.lines(),
            View::Grid(grid) => grid.layout(),
            View::Tree(tree) => tree.layout(),
            View::Stack(views) => views.iter().flat_map(View::layout).collect(),
            View::Section { title, body } => {
                let mut lines = title.lines();
                for mut line in body.layout() {
                    if !line.spans.is_empty() {
                        line.prepend(Span::new(SECTION_INDENT, Style::default()));
                    }
                    lines.push(line);
                }
                lines.push(Line::default());
                lines
            }
        }
    }

    /// The view as unstyled text, one `\n` after each line.
    pub fn to_plain(&self) -> String {
        self.layout()
            .iter()
            .map(|line| format!("{}\n", line.to_plain()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            View::Empty => true,
            View::Text(text) => text.is_empty(),
            View::Grid(grid) => grid.is_empty(),
            View::Tree(_) => false,
            View::Stack(views) => views.iter().all(View::is_empty),
            View::Section { .. } => false,
        }
    }
}

impl From<Text> for View {
    fn from(text: Text) -> Self {
        View::Text(text)
    }
}

impl From<Grid> for View {
    fn from(grid: Grid) -> Self {
        View::Grid(grid)
    }
}

impl From<Tree> for View {
    fn from(tree: Tree) -> Self {
        View::Tree(tree)
    }
}
