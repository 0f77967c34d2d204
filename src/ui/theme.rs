//! # Theme System
//!
//! Provides the color themes and the style registry of the shell.
//!
//! ## Overview
//!
//! A [`Theme`] is a small palette grouped by semantic role. Rendering code
//! never picks colors itself: it asks the [`StyleSheet`] for a symbolic style
//! name (e.g. [`STYLE_DT_BINDING`]) and gets a `ratatui::style::Style` back.
//! Names nobody registered resolve to the empty style, so a typo in a user
//! theme file degrades to plain text instead of failing.
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default) - warm, dark pastel theme
//! - **Catppuccin Latte** - light pastel theme
//! - **Dracula** - dark theme with vivid colors
//! - **Nord** - arctic, north-bluish color palette
//! - **Gruvbox Dark** - retro groove color scheme
//! - **Monochrome** - terminal default colors, attributes only

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;
use std::str::FromStr;

pub const STYLE_DEFAULT: &str = "dtsh.default";
pub const STYLE_APOLOGY: &str = "dtsh.apology";
pub const STYLE_TRUE: &str = "dtsh.true";
pub const STYLE_FALSE: &str = "dtsh.false";
pub const STYLE_PROMPT: &str = "dtsh.prompt";
pub const STYLE_PROMPT_ERROR: &str = "dtsh.prompt_error";
pub const STYLE_NODE_PATH: &str = "dtsh.node_path";
pub const STYLE_TREE_GUIDE: &str = "dtsh.tree_guide";
pub const STYLE_COMMAND: &str = "dtsh.command";
pub const STYLE_OPTION: &str = "dtsh.option";

pub const STYLE_DT_BINDING: &str = "dtsh.binding";
pub const STYLE_DT_COMPATS: &str = "dtsh.compats";
pub const STYLE_DT_LABEL: &str = "dtsh.label";
pub const STYLE_DT_LABELS: &str = "dtsh.labels";
pub const STYLE_DT_ALIAS: &str = "dtsh.alias";
pub const STYLE_DT_DESC: &str = "dtsh.desc";
pub const STYLE_DT_OKAY: &str = "dtsh.okay";
pub const STYLE_DT_NOT_OKAY: &str = "dtsh.not_okay";

pub const STYLE_BOLD: &str = "bold";
pub const STYLE_DIM: &str = "dim";
pub const STYLE_ITALIC: &str = "italic";

/// Colors used by the shell, grouped by semantic role.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Human-readable name, as accepted by `--theme`.
    pub name: &'static str,

    /// Primary text color.
    pub fg: Color,
    /// Muted/secondary text (apologies, tree guides).
    pub fg_dim: Color,
    /// Primary accent: bindings, prompt.
    pub accent: Color,
    /// Secondary accent: compatible strings, labels.
    pub secondary: Color,
    /// Third accent: aliases, node paths.
    pub tertiary: Color,

    /// Success / `okay` status.
    pub success: Color,
    /// Error / not `okay` status, failed prompt.
    pub error: Color,
}

impl Theme {
    /// Return the list of all built-in themes.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Return the default theme (Catppuccin Mocha).
    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }
}

/// Resolves symbolic style names to styles.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    /// Register the shell styles for a theme.
    pub fn from_theme(theme: &Theme) -> Self {
        let fg = Style::default().fg(theme.fg);
        let styles = [
            (STYLE_DEFAULT, fg),
            (
                STYLE_APOLOGY,
                Style::default()
                    .fg(theme.fg_dim)
                    .add_modifier(Modifier::ITALIC),
            ),
            (STYLE_TRUE, Style::default().fg(theme.success)),
            (STYLE_FALSE, Style::default().fg(theme.error)),
            (
                STYLE_PROMPT,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            (
                STYLE_PROMPT_ERROR,
                Style::default()
                    .fg(theme.error)
                    .add_modifier(Modifier::BOLD),
            ),
            (STYLE_NODE_PATH, Style::default().fg(theme.tertiary)),
            (STYLE_TREE_GUIDE, Style::default().fg(theme.fg_dim)),
            (
                STYLE_COMMAND,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            (STYLE_OPTION, Style::default().fg(theme.secondary)),
            (STYLE_DT_BINDING, Style::default().fg(theme.accent)),
            (STYLE_DT_COMPATS, Style::default().fg(theme.secondary)),
            (STYLE_DT_LABEL, Style::default().fg(theme.secondary)),
            (STYLE_DT_LABELS, Style::default().fg(theme.secondary)),
            (
                STYLE_DT_ALIAS,
                Style::default()
                    .fg(theme.tertiary)
                    .add_modifier(Modifier::ITALIC),
            ),
            (STYLE_DT_DESC, fg),
            (STYLE_DT_OKAY, Style::default().fg(theme.success)),
            (STYLE_DT_NOT_OKAY, Style::default().fg(theme.error)),
            (STYLE_BOLD, Style::default().add_modifier(Modifier::BOLD)),
            (STYLE_DIM, Style::default().add_modifier(Modifier::DIM)),
            (STYLE_ITALIC, Style::default().add_modifier(Modifier::ITALIC)),
        ];

        Self {
            styles: styles
                .into_iter()
                .map(|(name, style)| (name.to_string(), style))
                .collect(),
        }
    }

    /// Resolve a style name; unregistered names resolve to the empty style.
    pub fn style(&self, name: &str) -> Style {
        self.styles.get(name).copied().unwrap_or_default()
    }

    /// Register (or replace) a style.
    pub fn set(&mut self, name: impl Into<String>, style: Style) {
        self.styles.insert(name.into(), style);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }
}

/// Parse a style spec such as `"bold #89b4fa"`, `"italic dim"` or
/// `"red on black"`.
pub fn parse_style(spec: &str) -> Result<Style, String> {
    let mut style = Style::default();
    let mut words = spec.split_whitespace();

    while let Some(word) = words.next() {
        let word_lower = word.to_ascii_lowercase();
        style = match word_lower.as_str() {
            "bold" => style.add_modifier(Modifier::BOLD),
            "dim" => style.add_modifier(Modifier::DIM),
            "italic" => style.add_modifier(Modifier::ITALIC),
            "underline" => style.add_modifier(Modifier::UNDERLINED),
            "reverse" => style.add_modifier(Modifier::REVERSED),
            "strike" => style.add_modifier(Modifier::CROSSED_OUT),
            "none" => Style::default(),
            "on" => {
                let color = words
                    .next()
                    .ok_or_else(|| format!("missing background color in '{}'", spec))?;
                style.bg(parse_color(color)?)
            }
            _ => style.fg(parse_color(word)?),
        };
    }

    Ok(style)
}

fn parse_color(word: &str) -> Result<Color, String> {
    Color::from_str(word).map_err(|_| format!("unknown color '{}'", word))
}

// ---------------------------------------------------------------------------
// Built-in theme definitions
// ---------------------------------------------------------------------------

static BUILT_IN_THEMES: [Theme; 6] = [
    // 0 - Catppuccin Mocha (default)
    Theme {
        name: "Catppuccin Mocha",
        fg: Color::Rgb(205, 214, 244),        // text
        fg_dim: Color::Rgb(108, 112, 134),    // overlay0
        accent: Color::Rgb(137, 180, 250),    // blue
        secondary: Color::Rgb(249, 226, 175), // yellow
        tertiary: Color::Rgb(203, 166, 247),  // mauve
        success: Color::Rgb(166, 227, 161),   // green
        error: Color::Rgb(243, 139, 168),     // red
    },
    // 1 - Catppuccin Latte
    Theme {
        name: "Catppuccin Latte",
        fg: Color::Rgb(76, 79, 105),         // text
        fg_dim: Color::Rgb(156, 160, 176),   // overlay0
        accent: Color::Rgb(30, 102, 245),    // blue
        secondary: Color::Rgb(223, 142, 29), // yellow
        tertiary: Color::Rgb(136, 57, 239),  // mauve
        success: Color::Rgb(64, 160, 43),    // green
        error: Color::Rgb(210, 15, 57),      // red
    },
    // 2 - Dracula
    Theme {
        name: "Dracula",
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(139, 233, 253),    // cyan
        secondary: Color::Rgb(241, 250, 140), // yellow
        tertiary: Color::Rgb(255, 121, 198),  // pink
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
    },
    // 3 - Nord
    Theme {
        name: "Nord",
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),    // frost
        secondary: Color::Rgb(235, 203, 139), // yellow
        tertiary: Color::Rgb(180, 142, 173),  // purple
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
    },
    // 4 - Gruvbox Dark
    Theme {
        name: "Gruvbox Dark",
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(131, 165, 152),   // blue
        secondary: Color::Rgb(250, 189, 47), // yellow
        tertiary: Color::Rgb(211, 134, 155), // purple
        success: Color::Rgb(184, 187, 38),
        error: Color::Rgb(251, 73, 52),
    },
    // 5 - Monochrome
    Theme {
        name: "Monochrome",
        fg: Color::Reset,
        fg_dim: Color::Reset,
        accent: Color::Reset,
        secondary: Color::Reset,
        tertiary: Color::Reset,
        success: Color::Reset,
        error: Color::Reset,
    },
];

// Verify Catppuccin themes use the actual palette values.
#[cfg(test)]
mod tests {
    use super::*;

    /// Convert a catppuccin color to a ratatui Color via its RGB values.
    fn ctp(color: catppuccin::Color) -> Color {
        Color::Rgb(color.rgb.r, color.rgb.g, color.rgb.b)
    }

    #[test]
    fn test_all_themes_count() {
        assert_eq!(Theme::all().len(), 6);
    }

    #[test]
    fn test_default_is_mocha() {
        assert_eq!(Theme::default_theme().name, "Catppuccin Mocha");
    }

    #[test]
    fn test_by_name_case_insensitive() {
        assert!(Theme::by_name("catppuccin mocha").is_some());
        assert!(Theme::by_name("NORD").is_some());
        assert!(Theme::by_name("nonexistent").is_none());
    }

    #[test]
    fn test_catppuccin_mocha_matches_palette() {
        let mocha = catppuccin::PALETTE.mocha.colors;
        let theme = Theme::default_theme();
        assert_eq!(theme.fg, ctp(mocha.text));
        assert_eq!(theme.accent, ctp(mocha.blue));
        assert_eq!(theme.secondary, ctp(mocha.yellow));
        assert_eq!(theme.tertiary, ctp(mocha.mauve));
        assert_eq!(theme.success, ctp(mocha.green));
        assert_eq!(theme.error, ctp(mocha.red));
    }

    #[test]
    fn test_catppuccin_latte_matches_palette() {
        let latte = catppuccin::PALETTE.latte.colors;
        let theme = Theme::by_name("Catppuccin Latte").expect("theme exists");
        assert_eq!(theme.fg, ctp(latte.text));
        assert_eq!(theme.accent, ctp(latte.blue));
        assert_eq!(theme.error, ctp(latte.red));
    }

    #[test]
    fn test_unregistered_style_falls_back() {
        let styles = StyleSheet::from_theme(Theme::default_theme());
        assert_eq!(styles.style("dtsh.nonexistent"), Style::default());
        assert_eq!(
            styles.style(STYLE_DT_BINDING),
            Style::default().fg(Theme::default_theme().accent)
        );
        assert!(styles.contains(STYLE_DT_OKAY));
    }

    #[test]
    fn test_parse_style() {
        assert_eq!(
            parse_style("bold red").unwrap(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        );
        assert_eq!(
            parse_style("#89b4fa on black").unwrap(),
            Style::default()
                .fg(Color::Rgb(0x89, 0xb4, 0xfa))
                .bg(Color::Black)
        );
        assert_eq!(
            parse_style("italic dim").unwrap(),
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM)
        );
        assert!(parse_style("sparkly").is_err());
        assert!(parse_style("red on").is_err());
    }

    #[test]
    fn test_all_themes_have_distinct_names() {
        let names: Vec<&str> = Theme::all().iter().map(|t| t.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "duplicate theme names found");
    }
}
