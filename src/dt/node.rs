//! Devicetree nodes.
//!
//! [`Node`] is immutable and shared through `Rc`; hierarchies are assembled
//! bottom-up with [`NodeBuilder`], which also computes each node's path and
//! unit address.

use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::dt::property::Property;

/// Value of a node's `status` property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Okay,
    Disabled,
    Other(String),
}

impl Status {
    /// Parse a status string, normalizing the legacy `ok` to `okay`.
    pub fn parse(status: &str) -> Self {
        match status {
            "okay" | "ok" => Status::Okay,
            "disabled" => Status::Disabled,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Okay => "okay",
            Status::Disabled => "disabled",
            Status::Other(status) => status,
        }
    }

    pub fn is_okay(&self) -> bool {
        *self == Status::Okay
    }

    pub fn is_disabled(&self) -> bool {
        *self == Status::Disabled
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a node's `reg` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub addr: u64,
    pub size: Option<u64>,
    pub name: Option<String>,
}

impl Register {
    /// Last address covered by the register, if it has a non-zero size.
    pub fn end_addr(&self) -> Option<u64> {
        self.size
            .filter(|size| *size > 0)
            .map(|size| self.addr.saturating_add(size - 1))
    }
}

/// A devicetree node, as produced by the devicetree model loader.
///
/// Children and properties keep the insertion order of the source model.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub path: String,
    pub name: String,
    pub unit_addr: Option<u64>,
    pub status: Status,
    pub label: Option<String>,
    pub labels: Vec<String>,
    pub aliases: Vec<String>,
    pub compats: Vec<String>,
    pub matching_compat: Option<String>,
    pub binding_path: Option<PathBuf>,
    pub description: Option<String>,
    pub regs: Vec<Register>,
    pub props: IndexMap<String, Property>,
    pub children: IndexMap<String, Rc<Node>>,
    pub depends_on: Vec<String>,
    pub required_by: Vec<String>,
}

impl Node {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Parse the unit address out of a node name (`uart@40001000` -> `0x40001000`).
pub fn parse_unit_addr(name: &str) -> Option<u64> {
    let (_, addr) = name.rsplit_once('@')?;
    let addr = addr.trim_start_matches("0x");
    // Unit addresses like `1,0` keep only the first cell.
    let addr = addr.split(',').next().unwrap_or(addr);
    u64::from_str_radix(addr, 16).ok()
}

/// Join a child name to its parent path.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Builds immutable node hierarchies, bottom-up.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
    children: Vec<NodeBuilder>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let node = Node {
            unit_addr: parse_unit_addr(&name),
            name,
            ..Node::default()
        };
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// The root node, `/`.
    pub fn root() -> Self {
        Self::new("/")
    }

    pub fn status(mut self, status: &str) -> Self {
        self.node.status = Status::parse(status);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.node.label = Some(label.into());
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn compatible(mut self, compat: impl Into<String>) -> Self {
        self.node.compats.push(compat.into());
        self
    }

    pub fn matching_compat(mut self, compat: impl Into<String>) -> Self {
        self.node.matching_compat = Some(compat.into());
        self
    }

    pub fn binding_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.node.binding_path = Some(path.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.node.description = Some(desc.into());
        self
    }

    pub fn reg(mut self, addr: u64, size: Option<u64>, name: Option<&str>) -> Self {
        self.node.regs.push(Register {
            addr,
            size,
            name: name.map(str::to_string),
        });
        self
    }

    pub fn property(mut self, prop: Property) -> Self {
        self.node.props.insert(prop.name.clone(), prop);
        self
    }

    pub fn depends_on(mut self, path: impl Into<String>) -> Self {
        self.node.depends_on.push(path.into());
        self
    }

    pub fn required_by(mut self, path: impl Into<String>) -> Self {
        self.node.required_by.push(path.into());
        self
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Finish the hierarchy as a root (path `/` for `/`, `/<name>` otherwise).
    pub fn build(self) -> Rc<Node> {
        let path = if self.node.name == "/" {
            "/".to_string()
        } else {
            child_path("/", &self.node.name)
        };
        self.build_at(path)
    }

    fn build_at(mut self, path: String) -> Rc<Node> {
        for child in self.children {
            let child_path = child_path(&path, &child.node.name);
            let child = child.build_at(child_path);
            self.node.children.insert(child.name.clone(), child);
        }
        self.node.path = path;
        Rc::new(self.node)
    }
}
