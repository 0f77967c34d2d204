//! # View Builders
//!
//! Side-effect free helpers turning devicetree items into [`Text`] fragments,
//! forms and grids. All builders take the style registry they resolve style
//! names against.
//!
//! Two flags recur:
//!
//! - `with_link`: attach the binding file as a hyperlink when known;
//! - `with_status`: dim the fragment when the node's status is not `okay`.

use ratatui::style::Style;
use std::fs;
use std::path::Path;

use crate::dt::{Binding, Devicetree, Node, Property, PropertySpec, PropertyValue, Register};
use crate::ui::theme::*;
use crate::ui::view::{Grid, Span, Text, View, ELLIPSIS};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_BINDING_SOURCE: &str = "No binding source available.";

/// Node name without its `@<unit-address>` suffix.
pub fn node_nick(node: &Node) -> &str {
    match (node.unit_addr, node.name.rfind('@')) {
        (Some(_), Some(at)) => &node.name[..at],
        _ => &node.name,
    }
}

/// First line of a description; `…` marks that more lines were dropped.
pub fn desc_short(desc: &str) -> String {
    let mut lines = desc.trim().lines();
    let first = lines.next().unwrap_or("");
    if lines.next().is_some() {
        format!("{}{}", first.strip_suffix('.').unwrap_or(first), ELLIPSIS)
    } else {
        first.to_string()
    }
}

/// Strip the colors of a style, then apply the dim style over it.
pub fn dim_style(style: Style, dim: Style) -> Style {
    Style {
        fg: None,
        bg: None,
        ..style
    }
    .patch(dim)
}

/// Dim every run of a text.
pub fn dim(text: Text, dim: Style) -> Text {
    restyle(text, |style| dim_style(style, dim))
}

/// Link every run of a text to a file.
pub fn link(text: Text, path: &Path) -> Text {
    let mut linked = Text::new();
    for span in text.spans() {
        linked.push_span(span.clone().with_link(path));
    }
    linked
}

fn restyle(text: Text, f: impl Fn(Style) -> Style) -> Text {
    let mut styled = Text::new();
    for span in text.spans() {
        styled.push_span(Span {
            style: f(span.style),
            ..span.clone()
        });
    }
    styled
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Builds views against a style registry.
#[derive(Debug, Clone, Copy)]
pub struct ViewBuilder<'a> {
    styles: &'a StyleSheet,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(styles: &'a StyleSheet) -> Self {
        Self { styles }
    }

    pub fn style(&self, name: &str) -> Style {
        self.styles.style(name)
    }

    pub fn txt(&self, text: impl Into<String>) -> Text {
        Text::styled(text, self.style(STYLE_DEFAULT))
    }

    pub fn txt_styled(&self, text: impl Into<String>, style_name: &str) -> Text {
        Text::styled(text, self.style(style_name))
    }

    pub fn apology(&self, text: impl Into<String>) -> Text {
        self.txt_styled(text, STYLE_APOLOGY)
    }

    pub fn bool_text(&self, value: bool) -> Text {
        if value {
            self.txt_styled("Yes", STYLE_TRUE)
        } else {
            self.txt_styled("No", STYLE_FALSE)
        }
    }

    pub fn desc(&self, desc: Option<&str>) -> Text {
        match desc.map(str::trim).filter(|d| !d.is_empty()) {
            Some(desc) => self.txt_styled(desc, STYLE_DT_DESC),
            None => self.apology(NO_DESCRIPTION),
        }
    }

    pub fn desc_short(&self, desc: Option<&str>) -> Text {
        match desc.filter(|d| !d.trim().is_empty()) {
            Some(desc) => self.txt_styled(desc_short(desc), STYLE_DT_BINDING),
            None => Text::new(),
        }
    }

    fn with_status(&self, text: Text, node: &Node, with_status: bool) -> Text {
        if with_status && !node.status.is_okay() {
            dim(text, self.style(STYLE_DIM))
        } else {
            text
        }
    }

    pub fn node_status(&self, node: &Node) -> Text {
        let style = if node.status.is_okay() {
            STYLE_DT_OKAY
        } else {
            STYLE_DT_NOT_OKAY
        };
        self.txt_styled(node.status.as_str(), style)
    }

    pub fn node_nick(&self, node: &Node, with_status: bool) -> Text {
        self.with_status(Text::plain(node_nick(node)), node, with_status)
    }

    pub fn node_addr(&self, node: &Node, with_status: bool) -> Text {
        match node.unit_addr {
            Some(addr) => self.with_status(Text::plain(format!("{:#x}", addr)), node, with_status),
            None => Text::new(),
        }
    }

    /// The matching compatible, linked to the node's binding file.
    pub fn node_binding(&self, node: &Node, with_link: bool, with_status: bool) -> Text {
        let Some(compat) = &node.matching_compat else {
            return Text::new();
        };
        let mut text = self.txt_styled(compat.as_str(), STYLE_DT_BINDING);
        if let (true, Some(path)) = (with_link, &node.binding_path) {
            text = link(text, path);
        }
        self.with_status(text, node, with_status)
    }

    /// All compatible strings; the matching one is bold and linked to its binding.
    pub fn node_compats(
        &self,
        node: &Node,
        dt: &Devicetree,
        with_link: bool,
        with_status: bool,
    ) -> Text {
        let compats = node.compats.iter().map(|compat| {
            let mut style = self.style(STYLE_DT_COMPATS);
            let text = if node.matching_compat.as_ref() == Some(compat) {
                style = style.patch(self.style(STYLE_BOLD));
                let text = Text::styled(compat.as_str(), style);
                match dt.binding(compat).and_then(|b| b.path.as_deref()) {
                    Some(path) if with_link => link(text, path),
                    _ => text,
                }
            } else {
                Text::styled(compat.as_str(), style)
            };
            self.with_status(text, node, with_status)
        });
        Text::join(compats, " ")
    }

    pub fn node_label(&self, node: &Node, with_status: bool) -> Text {
        match &node.label {
            Some(label) => {
                self.with_status(self.txt_styled(label.as_str(), STYLE_DT_LABEL), node, with_status)
            }
            None => Text::new(),
        }
    }

    pub fn node_labels(&self, node: &Node, with_status: bool) -> Text {
        let labels = node.labels.iter().map(|label| {
            self.with_status(self.txt_styled(label.as_str(), STYLE_DT_LABELS), node, with_status)
        });
        Text::join(labels, ", ")
    }

    pub fn node_aliases(&self, node: &Node, with_status: bool) -> Text {
        let aliases = node
            .aliases
            .iter()
            .map(|alias| self.txt_styled(alias.as_str(), STYLE_DT_ALIAS));
        self.with_status(Text::join(aliases, " "), node, with_status)
    }

    /// The node label followed by its other labels.
    pub fn node_all_labels(&self, node: &Node, with_status: bool) -> Text {
        let mut text = self.node_label(node, with_status);
        let labels = self.node_labels(node, with_status);
        if !text.is_empty() && !labels.is_empty() {
            text.push(", ", self.style(STYLE_DEFAULT));
        }
        text.append(labels);
        text
    }

    pub fn node_desc_short(&self, node: &Node, with_link: bool, with_status: bool) -> Text {
        let mut text = self.desc_short(node.description.as_deref());
        // Without a matching compatible, the description carries the binding link.
        if let (true, None, Some(path)) = (with_link, &node.matching_compat, &node.binding_path) {
            text = link(text, path);
        }
        self.with_status(text, node, with_status)
    }

    pub fn binding(&self, binding: &Binding, with_link: bool) -> Text {
        let text = self.txt_styled(binding.compatible.as_str(), STYLE_DT_BINDING);
        match (&binding.path, with_link) {
            (Some(path), true) => link(text, path),
            _ => text,
        }
    }

    pub fn reg_addr(&self, reg: &Register) -> Text {
        Text::plain(format!("{:#x}", reg.addr))
    }

    pub fn reg_size(&self, reg: &Register) -> Text {
        reg.size
            .map(|size| Text::plain(size.to_string()))
            .unwrap_or_default()
    }

    pub fn reg_end_addr(&self, reg: &Register) -> Text {
        reg.end_addr()
            .map(|end| Text::plain(format!("{:#x}", end)))
            .unwrap_or_default()
    }

    pub fn reg_name(&self, reg: &Register) -> Text {
        reg.name.as_deref().map(Text::plain).unwrap_or_default()
    }

    /// Basename of the binding file a property was last defined in.
    pub fn prop_last_binding(&self, spec: &PropertySpec, with_link: bool) -> Text {
        let Some(path) = &spec.path else {
            return Text::new();
        };
        let text = self.txt_styled(file_name(path), STYLE_DT_BINDING);
        if with_link {
            link(text, path)
        } else {
            text
        }
    }

    pub fn prop_desc(&self, prop: &Property) -> Text {
        self.desc(prop.spec.as_ref().and_then(|s| s.description.as_deref()))
    }

    pub fn prop_value(&self, prop: &Property) -> Text {
        self.dt_value(&prop.value)
    }

    pub fn dt_value(&self, value: &PropertyValue) -> Text {
        match value {
            PropertyValue::Boolean(value) => self.bool_text(*value),
            other => Text::plain(other.to_string()),
        }
    }

    // ---------------------------------------------------------------------
    // Layouts
    // ---------------------------------------------------------------------

    /// Two-column (name, value) grid.
    pub fn form(&self) -> Grid {
        Grid::new(2)
    }

    /// Grid with a header row and a rule below it.
    pub fn grid_with_headers(&self, headers: &[&str]) -> Grid {
        Grid::with_headers(headers, self.style(STYLE_DEFAULT))
    }

    pub fn section(&self, title: &str, body: impl Into<View>) -> View {
        View::Section {
            title: self.txt_styled(title, STYLE_BOLD),
            body: Box::new(body.into()),
        }
    }

    fn apology_grid(&self, text: &str) -> Grid {
        let mut grid = Grid::new(1);
        grid.add_row(vec![self.apology(text)]);
        grid
    }

    pub fn form_node_common(&self, node: &Node, dt: &Devicetree) -> Grid {
        let mut form = self.form();
        form.add_row(vec!["Path:".into(), Text::plain(node.path.as_str())]);
        form.add_row(vec!["Name:".into(), Text::plain(node_nick(node))]);
        if node.unit_addr.is_some() {
            form.add_row(vec!["Unit address:".into(), self.node_addr(node, false)]);
        }
        if !node.compats.is_empty() {
            form.add_row(vec![
                "Compatible:".into(),
                self.node_compats(node, dt, true, false),
            ]);
        }
        if node.label.is_some() {
            form.add_row(vec!["Label:".into(), self.node_label(node, false)]);
        }
        if !node.labels.is_empty() {
            form.add_row(vec!["Labels:".into(), self.node_labels(node, false)]);
        }
        if !node.aliases.is_empty() {
            form.add_row(vec!["Aliases:".into(), self.node_aliases(node, false)]);
        }
        form.add_row(vec!["Status:".into(), self.node_status(node)]);
        form
    }

    fn grid_node_refs(&self, paths: &[String], dt: &Devicetree, apology: &str) -> Grid {
        if paths.is_empty() {
            return self.apology_grid(apology);
        }
        let mut grid = Grid::new(2);
        for path in paths {
            match dt.path2node(path) {
                Some(node) => grid.add_row(vec![
                    Text::plain(node.name.as_str()),
                    self.node_binding(&node, true, false),
                ]),
                None => grid.add_row(vec![Text::plain(path.as_str())]),
            }
        }
        grid
    }

    pub fn grid_node_depends_on(&self, node: &Node, dt: &Devicetree) -> Grid {
        self.grid_node_refs(
            &node.depends_on,
            dt,
            "This node does not directly depend on any node.",
        )
    }

    pub fn grid_node_required_by(&self, node: &Node, dt: &Devicetree) -> Grid {
        self.grid_node_refs(
            &node.required_by,
            dt,
            "There's no other node that directly depends on this node.",
        )
    }

    pub fn grid_node_registers(&self, node: &Node) -> Grid {
        if node.regs.is_empty() {
            return self.apology_grid("This node does not define any register.");
        }
        let mut grid = self.grid_with_headers(&["Address", "Size", "End", "Name"]);
        for reg in &node.regs {
            grid.add_row(vec![
                self.reg_addr(reg),
                self.reg_size(reg),
                self.reg_end_addr(reg),
                self.reg_name(reg),
            ]);
        }
        grid
    }

    pub fn grid_node_properties(&self, node: &Node) -> Grid {
        if node.props.is_empty() {
            return self.apology_grid("This node does not define any property.");
        }
        let mut grid = self.grid_with_headers(&["Name", "Type", "Value"]);
        for prop in node.props.values() {
            grid.add_row(vec![
                Text::plain(prop.name.as_str()),
                Text::plain(prop.type_name()),
                self.prop_value(prop),
            ]);
        }
        grid
    }

    pub fn form_prop_spec(&self, prop: &Property, spec: &PropertySpec) -> Grid {
        let mut form = self.form();
        form.add_row(vec!["Name:".into(), Text::plain(prop.name.as_str())]);
        form.add_row(vec!["Type:".into(), Text::plain(prop.type_name())]);
        form.add_row(vec!["Required:".into(), self.bool_text(spec.required)]);
        form.add_row(vec!["Value:".into(), self.prop_value(prop)]);
        if spec.path.is_some() {
            form.add_row(vec!["From:".into(), self.prop_last_binding(spec, true)]);
        }
        if let Some(default) = &spec.default {
            form.add_row(vec!["Default:".into(), self.dt_value(default)]);
        }
        form
    }

    pub fn form_prop_name_val(&self, prop: &Property) -> Grid {
        let mut form = self.form();
        form.add_row(vec!["Name:".into(), Text::plain(prop.name.as_str())]);
        form.add_row(vec!["Value:".into(), self.prop_value(prop)]);
        form
    }

    /// Binding file basename (linked), a blank line, then the file content.
    pub fn binding_source(&self, path: Option<&Path>) -> View {
        let Some(path) = path else {
            return self.apology(NO_BINDING_SOURCE).into();
        };
        let title = link(Text::plain(file_name(path)), path);
        match fs::read_to_string(path) {
            Ok(content) => View::Stack(vec![
                title.into(),
                Text::new().into(),
                self.txt(content.trim_end()).into(),
            ]),
            Err(err) => {
                tracing::debug!(path = %path.display(), "binding source unavailable: {}", err);
                View::Stack(vec![title.into(), self.apology(NO_BINDING_SOURCE).into()])
            }
        }
    }
}
