//! Views of devicetree nodes, properties and bindings, and the completion
//! hint panels.

use indexmap::IndexMap;
use std::rc::Rc;
use unicode_width::UnicodeWidthStr;

use crate::dt::{Binding, Devicetree, Node, Property};
use crate::shell::command::{Command, CommandOption};
use crate::ui::builders::{node_nick, ViewBuilder};
use crate::ui::theme::{STYLE_BOLD, STYLE_COMMAND, STYLE_DEFAULT, STYLE_OPTION, STYLE_TREE_GUIDE};
use crate::ui::view::{ColumnWidth, Grid, Text, Tree, View};

/// Sections: Node, Description, Depends-on, Required-by, Registers,
/// Properties, Binding.
pub fn node_view(vb: ViewBuilder<'_>, dt: &Devicetree, node: &Node) -> View {
    View::Stack(vec![
        vb.section("Node", vb.form_node_common(node, dt)),
        vb.section("Description", vb.desc(node.description.as_deref())),
        vb.section("Depends-on", vb.grid_node_depends_on(node, dt)),
        vb.section("Required-by", vb.grid_node_required_by(node, dt)),
        vb.section("Registers", vb.grid_node_registers(node)),
        vb.section("Properties", vb.grid_node_properties(node)),
        vb.section("Binding", vb.binding_source(node.binding_path.as_deref())),
    ])
}

pub fn property_view(vb: ViewBuilder<'_>, prop: &Property) -> View {
    match &prop.spec {
        Some(spec) => View::Stack(vec![
            vb.section("Property", vb.form_prop_spec(prop, spec)),
            vb.section("Description", vb.prop_desc(prop)),
            vb.section("Binding", vb.binding_source(spec.path.as_deref())),
        ]),
        None => vb.section("Property", vb.form_prop_name_val(prop)),
    }
}

pub fn binding_view(vb: ViewBuilder<'_>, binding: &Binding) -> View {
    let mut form = vb.form();
    form.add_row(vec!["Compatible:".into(), vb.binding(binding, true)]);
    View::Stack(vec![
        vb.section("Binding", form),
        vb.section("Description", vb.desc(binding.description.as_deref())),
        vb.section("Source", vb.binding_source(binding.path.as_deref())),
    ])
}

/// Node listing, as `ls` prints it.
///
/// `node_map` maps each listed path to its content (its children, or the
/// node itself when `no_content`).
pub fn node_list_view(
    vb: ViewBuilder<'_>,
    dt: &Devicetree,
    node_map: &IndexMap<String, Vec<Rc<Node>>>,
    no_content: bool,
    rich: bool,
) -> View {
    if rich {
        rich_node_list(vb, dt, node_map, no_content)
    } else {
        default_node_list(node_map, no_content)
    }
}

fn default_node_list(node_map: &IndexMap<String, Vec<Rc<Node>>>, no_content: bool) -> View {
    let mut lines = Vec::new();
    let count = node_map.len();
    for (n, (path, nodes)) in node_map.iter().enumerate() {
        if no_content {
            lines.push(Text::plain(path.as_str()));
            continue;
        }
        if count > 1 {
            lines.push(Text::plain(format!("{}:", path)));
        }
        lines.extend(nodes.iter().map(|node| Text::plain(node.path.as_str())));
        if n + 1 < count {
            lines.push(Text::new());
        }
    }
    View::Stack(lines.into_iter().map(View::Text).collect())
}

fn rich_node_list(
    vb: ViewBuilder<'_>,
    dt: &Devicetree,
    node_map: &IndexMap<String, Vec<Rc<Node>>>,
    no_content: bool,
) -> View {
    if no_content {
        let mut grid = node_grid(vb);
        for node in node_map.values().flatten() {
            add_node_row(vb, dt, &mut grid, node);
        }
        return grid.into();
    }

    let mut views = Vec::new();
    let count = node_map.len();
    for (n, (path, nodes)) in node_map.iter().enumerate() {
        views.push(vb.txt_styled(format!("{}:", path), STYLE_BOLD).into());
        if !nodes.is_empty() {
            let mut grid = node_grid(vb);
            for node in nodes {
                add_node_row(vb, dt, &mut grid, node);
            }
            views.push(grid.into());
        }
        if n + 1 < count {
            views.push(Text::new().into());
        }
    }
    View::Stack(views)
}

fn node_grid(vb: ViewBuilder<'_>) -> Grid {
    vb.grid_with_headers(&[
        "Name",
        "Address",
        "Labels",
        "Aliases",
        "Compatible",
        "Description",
    ])
}

fn add_node_row(vb: ViewBuilder<'_>, dt: &Devicetree, grid: &mut Grid, node: &Node) {
    grid.add_row(vec![
        vb.node_nick(node, true),
        vb.node_addr(node, true),
        vb.node_all_labels(node, true),
        vb.node_aliases(node, true),
        vb.node_compats(node, dt, true, true),
        vb.node_desc_short(node, true, true),
    ]);
}

/// Column widths shared by the rows of one tree branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchWidth {
    pub addr: usize,
    pub nick: usize,
}

impl BranchWidth {
    /// Widest unit address and nickname among the direct children of `node`.
    pub fn of(node: &Node) -> Self {
        node.children
            .values()
            .fold(BranchWidth::default(), |width, child| BranchWidth {
                addr: width
                    .addr
                    .max(child.unit_addr.map_or(0, |a| format!("{:#x}", a).len())),
                nick: width.nick.max(node_nick(child).width()),
            })
    }
}

/// Depth-limited tree of a node hierarchy, as `tree` prints it.
pub struct NodeTreeView<'a> {
    vb: ViewBuilder<'a>,
    dt: &'a Devicetree,
    /// Maximum depth below the root, 0 for unlimited.
    max_depth: usize,
    rich: bool,
}

impl<'a> NodeTreeView<'a> {
    pub fn new(vb: ViewBuilder<'a>, dt: &'a Devicetree, max_depth: usize, rich: bool) -> Self {
        Self {
            vb,
            dt,
            max_depth,
            rich,
        }
    }

    pub fn build(&self, root: &Node) -> Tree {
        let mut tree = Tree::new(
            self.vb.txt_styled(root.path.as_str(), STYLE_BOLD),
            self.vb.style(STYLE_TREE_GUIDE),
        );
        self.follow_branch(root, &mut tree, 1);
        tree
    }

    /// Attach the children of `node` (at `depth`) to `tree`.
    fn follow_branch(&self, node: &Node, tree: &mut Tree, depth: usize) {
        let width = BranchWidth::of(node);
        for child in node.children.values() {
            let label = if self.rich {
                self.rich_item(child, width)
            } else {
                Text::plain(child.name.as_str())
            };
            let mut branch = Tree::new(label, self.vb.style(STYLE_TREE_GUIDE));
            if (self.max_depth == 0 || depth < self.max_depth) && !child.status.is_disabled() {
                self.follow_branch(child, &mut branch, depth + 1);
            }
            tree.add(branch);
        }
    }

    /// `address nickname compatibles`, aligned on the branch widths.
    fn rich_item(&self, node: &Node, width: BranchWidth) -> Text {
        let mut grid = Grid::new(3);
        if width.addr > 0 {
            grid.set_width(0, ColumnWidth::Fixed(width.addr));
        }
        if width.nick > 0 {
            grid.set_width(1, ColumnWidth::Fixed(width.nick));
        }
        grid.add_row(vec![
            self.vb.node_addr(node, true),
            self.vb.node_nick(node, true),
            self.vb.node_compats(node, self.dt, true, true),
        ]);
        grid.to_text()
    }
}

// ---------------------------------------------------------------------------
// Completion hints
// ---------------------------------------------------------------------------

pub fn command_hints(vb: ViewBuilder<'_>, commands: &[Command]) -> View {
    let mut grid = Grid::new(2);
    for command in commands {
        grid.add_row(vec![
            vb.txt_styled(command.name(), STYLE_COMMAND),
            vb.txt(command.summary()),
        ]);
    }
    grid.into()
}

pub fn option_hints(vb: ViewBuilder<'_>, options: &[CommandOption]) -> View {
    let mut grid = Grid::new(2);
    for option in options {
        grid.add_row(vec![
            vb.txt_styled(option.usage(), STYLE_OPTION),
            vb.txt(option.help.as_str()),
        ]);
    }
    grid.into()
}

pub fn binding_hints(vb: ViewBuilder<'_>, bindings: &[Binding]) -> View {
    let mut grid = Grid::new(2);
    for binding in bindings {
        grid.add_row(vec![
            vb.binding(binding, false),
            vb.desc_short(binding.description.as_deref()),
        ]);
    }
    grid.into()
}

pub fn node_hints(vb: ViewBuilder<'_>, dt: &Devicetree, nodes: &[Rc<Node>]) -> View {
    let mut grid = Grid::new(3);
    for node in nodes {
        grid.add_row(vec![
            vb.node_nick(node, true),
            vb.node_addr(node, true),
            vb.node_compats(node, dt, false, true),
        ]);
    }
    grid.into()
}

pub fn plain_hints(vb: ViewBuilder<'_>, candidates: &[String]) -> View {
    View::Stack(
        candidates
            .iter()
            .map(|c| vb.txt_styled(c.as_str(), STYLE_DEFAULT).into())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dt::{NodeBuilder, PropertySpec, PropertyValue};
    use crate::ui::theme::{StyleSheet, Theme};
    use pretty_assertions::assert_eq;

    fn styles() -> StyleSheet {
        StyleSheet::from_theme(Theme::default_theme())
    }

    fn board() -> Devicetree {
        let root = NodeBuilder::root()
            .child(
                NodeBuilder::new("soc")
                    .child(
                        NodeBuilder::new("uart@40002000")
                            .compatible("nordic,nrf-uarte")
                            .matching_compat("nordic,nrf-uarte"),
                    )
                    .child(
                        NodeBuilder::new("i2c@40003000")
                            .status("disabled")
                            .compatible("nordic,nrf-twim")
                            .child(NodeBuilder::new("sensor@76")),
                    )
                    .child(NodeBuilder::new("peripheral").child(NodeBuilder::new("gpio@0"))),
            )
            .child(NodeBuilder::new("chosen"))
            .build();
        Devicetree::new(root, Vec::new())
    }

    #[test]
    fn test_branch_width_direct_children() {
        let dt = board();
        let soc = dt.path2node("/soc").unwrap();
        // "peripheral" is the longest nick; "gpio@0" under it is not a direct child.
        assert_eq!(BranchWidth::of(&soc), BranchWidth { addr: 10, nick: 10 });
        assert_eq!(BranchWidth::of(dt.root()), BranchWidth { addr: 0, nick: 6 });
    }

    #[test]
    fn test_tree_unlimited() {
        let styles = styles();
        let dt = board();
        let tree = NodeTreeView::new(ViewBuilder::new(&styles), &dt, 0, false).build(dt.root());
        assert_eq!(
            View::from(tree).to_plain(),
            "/\n\
             ├── soc\n\
             │   ├── uart@40002000\n\
             │   ├── i2c@40003000\n\
             │   └── peripheral\n\
             │       └── gpio@0\n\
             └── chosen\n"
        );
    }

    #[test]
    fn test_tree_depth_limit() {
        let styles = styles();
        let dt = board();
        let tree = NodeTreeView::new(ViewBuilder::new(&styles), &dt, 1, false).build(dt.root());
        assert_eq!(tree.height(), 1);
        assert_eq!(View::from(tree).to_plain(), "/\n├── soc\n└── chosen\n");

        let tree = NodeTreeView::new(ViewBuilder::new(&styles), &dt, 2, false).build(dt.root());
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_tree_rich_rows() {
        let styles = styles();
        let dt = board();
        let soc = dt.path2node("/soc").unwrap();
        let tree = NodeTreeView::new(ViewBuilder::new(&styles), &dt, 0, true).build(&soc);
        assert_eq!(
            View::from(tree).to_plain(),
            "/soc\n\
             ├── 0x40002000 uart       nordic,nrf-uarte\n\
             ├── 0x40003000 i2c        nordic,nrf-twim\n\
             └──            peripheral\n\
             \x20   └── 0x0 gpio\n"
        );
    }

    #[test]
    fn test_default_list() {
        let dt = board();
        let soc = dt.path2node("/soc").unwrap();
        let chosen = dt.path2node("/chosen").unwrap();

        let mut node_map = IndexMap::new();
        node_map.insert(soc.path.clone(), soc.children.values().cloned().collect());
        node_map.insert(chosen.path.clone(), Vec::new());
        assert_eq!(
            default_node_list(&node_map, false).to_plain(),
            "/soc:\n/soc/uart@40002000\n/soc/i2c@40003000\n/soc/peripheral\n\n/chosen:\n"
        );

        let mut node_map = IndexMap::new();
        node_map.insert(soc.path.clone(), vec![Rc::clone(&soc)]);
        assert_eq!(default_node_list(&node_map, true).to_plain(), "/soc\n");
    }

    #[test]
    fn test_property_view_without_spec() {
        let styles = styles();
        let prop = Property::new("current-speed", PropertyValue::Int(115200));
        assert_eq!(
            property_view(ViewBuilder::new(&styles), &prop).to_plain(),
            "Property\n  Name:  current-speed\n  Value: 115200\n\n"
        );
    }

    #[test]
    fn test_property_view_with_spec() {
        let styles = styles();
        let prop = Property::new("hw-flow-control", PropertyValue::Boolean(false)).with_spec(
            PropertySpec {
                description: Some("Set to enable RTS/CTS flow control.".into()),
                required: false,
                default: None,
                path: None,
            },
        );
        let out = property_view(ViewBuilder::new(&styles), &prop).to_plain();
        assert!(out.starts_with("Property\n  Name:     hw-flow-control\n  Type:     boolean\n"));
        assert!(out.contains("  Required: No\n  Value:    No\n"));
        assert!(out.contains("Description\n  Set to enable RTS/CTS flow control.\n"));
        assert!(out.contains("Binding\n  No binding source available.\n"));
    }

    #[test]
    fn test_node_hints() {
        let styles = styles();
        let dt = board();
        let soc = dt.path2node("/soc").unwrap();
        let nodes: Vec<Rc<Node>> = soc.children.values().cloned().collect();
        assert_eq!(
            node_hints(ViewBuilder::new(&styles), &dt, &nodes).to_plain(),
            "uart       0x40002000 nordic,nrf-uarte\n\
             i2c        0x40003000 nordic,nrf-twim\n\
             peripheral\n"
        );
    }
}
