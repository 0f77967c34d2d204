//! Devicetree properties and their typed values.
//!
//! Values are typed as the matching binding declares them. References to
//! other nodes (`phandle`, `path`, `phandles`, `phandle-array`) keep the
//! target node paths and display as node names.

use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;

/// Controller and specifier cells of one `phandle-array` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerAndData {
    /// Path of the controller node.
    pub controller: String,
    pub name: Option<String>,
    pub data: IndexMap<String, i64>,
}

/// A property value, typed as the binding declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Boolean(bool),
    Int(i64),
    Array(Vec<i64>),
    Bytes(Vec<u8>),
    String(String),
    Strings(Vec<String>),
    /// Path of the referenced node.
    Phandle(String),
    /// Path of the referenced node.
    Path(String),
    /// Paths of the referenced nodes.
    Phandles(Vec<String>),
    PhandleArray(Vec<ControllerAndData>),
    Compound(String),
}

impl PropertyValue {
    /// Devicetree binding type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Int(_) => "int",
            PropertyValue::Array(_) => "array",
            PropertyValue::Bytes(_) => "uint8-array",
            PropertyValue::String(_) => "string",
            PropertyValue::Strings(_) => "string-array",
            PropertyValue::Phandle(_) => "phandle",
            PropertyValue::Path(_) => "path",
            PropertyValue::Phandles(_) => "phandles",
            PropertyValue::PhandleArray(_) => "phandle-array",
            PropertyValue::Compound(_) => "compound",
        }
    }
}

/// Name of the node at `path` (its last path component).
pub fn node_name_of(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.rsplit('/').next().unwrap_or(path)
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(value) => write!(f, "{}", value),
            PropertyValue::Int(value) => write!(f, "{}", value),
            PropertyValue::Array(values) => write!(f, "{:?}", values),
            PropertyValue::Bytes(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                write!(f, "[{}]", hex.join(" "))
            }
            PropertyValue::String(value) | PropertyValue::Compound(value) => f.write_str(value),
            PropertyValue::Strings(values) => write!(f, "{:?}", values),
            PropertyValue::Phandle(path) | PropertyValue::Path(path) => {
                f.write_str(node_name_of(path))
            }
            PropertyValue::Phandles(paths) => {
                let names: Vec<&str> = paths.iter().map(|p| node_name_of(p)).collect();
                write!(f, "[{}]", names.join(", "))
            }
            PropertyValue::PhandleArray(entries) => {
                let names: Vec<&str> = entries
                    .iter()
                    .map(|cad| node_name_of(&cad.controller))
                    .collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// What a binding says about a property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySpec {
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<PropertyValue>,
    /// Binding file the property was last defined in.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    pub spec: Option<PropertySpec>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
            spec: None,
        }
    }

    pub fn with_spec(mut self, spec: PropertySpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name_of() {
        assert_eq!(node_name_of("/soc/gpio@50000000"), "gpio@50000000");
        assert_eq!(node_name_of("/chosen"), "chosen");
        assert_eq!(node_name_of("/"), "/");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(PropertyValue::Int(115200).to_string(), "115200");
        assert_eq!(PropertyValue::Array(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(
            PropertyValue::Bytes(vec![0x01, 0xab]).to_string(),
            "[01 ab]"
        );
        assert_eq!(
            PropertyValue::Strings(vec!["a".into(), "b".into()]).to_string(),
            r#"["a", "b"]"#
        );
        assert_eq!(
            PropertyValue::Phandles(vec!["/soc/gpio@0".into(), "/soc/gpio@1".into()]).to_string(),
            "[gpio@0, gpio@1]"
        );
    }

    #[test]
    fn test_type_name() {
        let prop = Property::new("current-speed", PropertyValue::Int(115200));
        assert_eq!(prop.type_name(), "int");
        assert_eq!(PropertyValue::Bytes(vec![]).type_name(), "uint8-array");
    }
}
