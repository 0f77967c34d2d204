//! # Devicetree Module
//!
//! In-memory model of an edited devicetree: the node hierarchy, the bindings
//! it was matched against, and path lookups.
//!
//! ## Loading
//!
//! | Input | Loader |
//! |-------|--------|
//! | Devicetree model (`*.json`) | [`Devicetree::load`] |
//! | Binding files (`*.yaml`) | [`binding::discover_bindings`] |
//!
//! Nodes are immutable once loaded and shared through [`Rc`], so views and
//! completion candidates can hold on to them cheaply.

pub mod binding;
pub mod node;
pub mod property;
pub mod source;

pub use binding::{discover_bindings, Binding};
pub use node::{Node, NodeBuilder, Register, Status};
pub use property::{ControllerAndData, Property, PropertySpec, PropertyValue};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::dt::source::{DocumentSource, TreeBuilder};

#[derive(Debug, Clone)]
pub struct Devicetree {
    root: Rc<Node>,
    bindings: IndexMap<String, Binding>,
    source: Option<PathBuf>,
}

impl Devicetree {
    /// Create a devicetree from an already built hierarchy.
    ///
    /// When several bindings claim the same compatible string, the first one wins.
    pub fn new(root: Rc<Node>, bindings: Vec<Binding>) -> Self {
        Self {
            root,
            bindings: index_bindings(bindings),
            source: None,
        }
    }

    /// Load a devicetree model, matching its nodes against the bindings
    /// found under `binding_dirs` and those the model itself declares.
    pub fn load(path: &Path, binding_dirs: &[PathBuf]) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read devicetree model: {}", path.display()))?;
        let document: DocumentSource = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse devicetree model: {}", path.display()))?;

        if document.root.name != "/" {
            anyhow::bail!(
                "Invalid devicetree model {}: root node must be named '/', found '{}'",
                path.display(),
                document.root.name
            );
        }

        let mut bindings: Vec<Binding> = document.bindings.into_iter().map(Binding::from).collect();
        bindings.extend(discover_bindings(binding_dirs)?);
        let bindings = index_bindings(bindings);

        let builder = TreeBuilder::new(&bindings, &document.root);
        let root = builder
            .build(document.root, "/")
            .with_context(|| format!("Invalid devicetree model: {}", path.display()))?
            .build();

        tracing::info!(
            path = %path.display(),
            bindings = bindings.len(),
            "loaded devicetree model"
        );

        Ok(Self {
            root,
            bindings,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// The model file this devicetree was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Find the node at an absolute, normalized path.
    pub fn path2node(&self, path: &str) -> Option<Rc<Node>> {
        let mut node = Rc::clone(&self.root);
        for name in path.split('/').filter(|name| !name.is_empty()) {
            let child = Rc::clone(node.children.get(name)?);
            node = child;
        }
        Some(node)
    }

    /// The binding matched for a compatible string.
    pub fn binding(&self, compat: &str) -> Option<&Binding> {
        self.bindings.get(compat)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }
}

fn index_bindings(bindings: Vec<Binding>) -> IndexMap<String, Binding> {
    let mut index = IndexMap::new();
    for binding in bindings {
        index.entry(binding.compatible.clone()).or_insert(binding);
    }
    index
}
