//! JSON devicetree model.
//!
//! The shell does not compile DTS itself: it loads the model an external
//! devicetree tool exported, e.g.
//!
//! ```json
//! {
//!   "bindings": [
//!     { "compatible": "nordic,nrf-uarte", "description": "Nordic UARTE", "path": "dts/bindings/serial/nordic,nrf-uarte.yaml" }
//!   ],
//!   "root": {
//!     "name": "/",
//!     "children": [
//!       {
//!         "name": "uart@40002000",
//!         "label": "uart0",
//!         "status": "okay",
//!         "compatible": ["nordic,nrf-uarte"],
//!         "reg": [{ "addr": 1073750016, "size": 4096 }],
//!         "properties": [{ "name": "current-speed", "type": "int", "value": 115200 }]
//!       }
//!     ]
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::dt::binding::Binding;
use crate::dt::node::{child_path, NodeBuilder};
use crate::dt::property::{ControllerAndData, Property, PropertySpec, PropertyValue};

#[derive(Debug, Deserialize)]
pub struct DocumentSource {
    #[serde(default)]
    pub bindings: Vec<BindingSource>,
    pub root: NodeSource,
}

#[derive(Debug, Deserialize)]
pub struct BindingSource {
    pub compatible: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl From<BindingSource> for Binding {
    fn from(source: BindingSource) -> Self {
        Binding {
            compatible: source.compatible,
            description: source.description,
            path: source.path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterSource {
    pub addr: u64,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PropertySpecSource {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct PropertySource {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub spec: Option<PropertySpecSource>,
}

#[derive(Debug, Deserialize)]
pub struct NodeSource {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub compatible: Vec<String>,
    #[serde(default)]
    pub matching_compatible: Option<String>,
    #[serde(default)]
    pub binding: Option<PathBuf>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reg: Vec<RegisterSource>,
    #[serde(default)]
    pub properties: Vec<PropertySource>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

#[derive(Debug, Deserialize)]
struct ControllerAndDataSource {
    controller: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: IndexMap<String, i64>,
}

/// Convert a JSON value to the property value its binding type names.
pub fn parse_value(type_name: &str, value: serde_json::Value) -> Result<PropertyValue> {
    let value = match type_name {
        "boolean" => PropertyValue::Boolean(if value.is_null() {
            true
        } else {
            serde_json::from_value(value)?
        }),
        "int" => PropertyValue::Int(serde_json::from_value(value)?),
        "array" => PropertyValue::Array(serde_json::from_value(value)?),
        "uint8-array" => PropertyValue::Bytes(serde_json::from_value(value)?),
        "string" => PropertyValue::String(serde_json::from_value(value)?),
        "string-array" => PropertyValue::Strings(serde_json::from_value(value)?),
        "phandle" => PropertyValue::Phandle(serde_json::from_value(value)?),
        "path" => PropertyValue::Path(serde_json::from_value(value)?),
        "phandles" => PropertyValue::Phandles(serde_json::from_value(value)?),
        "phandle-array" => {
            let entries: Vec<ControllerAndDataSource> = serde_json::from_value(value)?;
            PropertyValue::PhandleArray(
                entries
                    .into_iter()
                    .map(|entry| ControllerAndData {
                        controller: entry.controller,
                        name: entry.name,
                        data: entry.data,
                    })
                    .collect(),
            )
        }
        _ => PropertyValue::Compound(match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }),
    };
    Ok(value)
}

fn convert_property(source: PropertySource) -> Result<Property> {
    let name = source.name;
    let value = parse_value(&source.type_name, source.value)
        .with_context(|| format!("Invalid value for property '{}'", name))?;

    let spec = match source.spec {
        Some(spec) => {
            let default = match spec.default {
                Some(default) => Some(
                    parse_value(&source.type_name, default)
                        .with_context(|| format!("Invalid default for property '{}'", name))?,
                ),
                None => None,
            };
            Some(PropertySpec {
                description: spec.description,
                required: spec.required,
                default,
                path: spec.path,
            })
        }
        None => None,
    };

    Ok(Property { name, value, spec })
}

/// Builds the node hierarchy, resolving matching compatibles and binding files.
pub struct TreeBuilder<'a> {
    bindings: &'a IndexMap<String, Binding>,
    required_by: HashMap<String, Vec<String>>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(bindings: &'a IndexMap<String, Binding>, root: &NodeSource) -> Self {
        let mut required_by: HashMap<String, Vec<String>> = HashMap::new();
        collect_dependencies(root, "/", &mut required_by);
        Self {
            bindings,
            required_by,
        }
    }

    pub fn build(&self, source: NodeSource, path: &str) -> Result<NodeBuilder> {
        let mut builder = NodeBuilder::new(source.name.clone());
        if let Some(status) = &source.status {
            builder = builder.status(status);
        }
        if let Some(label) = source.label {
            builder = builder.label(label);
        }
        builder = builder.labels(source.labels).aliases(source.aliases);
        for compat in &source.compatible {
            builder = builder.compatible(compat.as_str());
        }

        let matching = source.matching_compatible.or_else(|| {
            source
                .compatible
                .iter()
                .find(|compat| self.bindings.contains_key(compat.as_str()))
                .cloned()
        });
        let binding_path = source.binding.or_else(|| {
            matching
                .as_ref()
                .and_then(|compat| self.bindings.get(compat))
                .and_then(|binding| binding.path.clone())
        });
        let description = source.description.or_else(|| {
            matching
                .as_ref()
                .and_then(|compat| self.bindings.get(compat))
                .and_then(|binding| binding.description.clone())
        });
        if let Some(matching) = matching {
            builder = builder.matching_compat(matching);
        }
        if let Some(binding_path) = binding_path {
            builder = builder.binding_path(binding_path);
        }
        if let Some(description) = description {
            builder = builder.description(description);
        }

        for reg in source.reg {
            builder = builder.reg(reg.addr, reg.size, reg.name.as_deref());
        }
        for prop in source.properties {
            builder = builder.property(convert_property(prop).with_context(|| {
                format!("Invalid property in node '{}'", path)
            })?);
        }
        for dep in source.depends_on {
            builder = builder.depends_on(dep);
        }
        if let Some(dependents) = self.required_by.get(path) {
            for dependent in dependents {
                builder = builder.required_by(dependent.as_str());
            }
        }

        for child in source.children {
            let child_path = child_path(path, &child.name);
            builder = builder.child(self.build(child, &child_path)?);
        }
        Ok(builder)
    }
}

fn collect_dependencies(
    source: &NodeSource,
    path: &str,
    required_by: &mut HashMap<String, Vec<String>>,
) {
    for dep in &source.depends_on {
        required_by
            .entry(dep.clone())
            .or_default()
            .push(path.to_string());
    }
    for child in &source.children {
        collect_dependencies(child, &child_path(path, &child.name), required_by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_values() {
        assert_eq!(
            parse_value("int", json!(115200)).unwrap(),
            PropertyValue::Int(115200)
        );
        assert_eq!(
            parse_value("boolean", serde_json::Value::Null).unwrap(),
            PropertyValue::Boolean(true)
        );
        assert_eq!(
            parse_value("phandles", json!(["/soc/gpio@0"])).unwrap(),
            PropertyValue::Phandles(vec!["/soc/gpio@0".to_string()])
        );
        assert_eq!(
            parse_value("compound", json!({"a": 1})).unwrap(),
            PropertyValue::Compound(r#"{"a":1}"#.to_string())
        );
        assert!(parse_value("int", json!("not a number")).is_err());
    }

    #[test]
    fn test_phandle_array() {
        let value = parse_value(
            "phandle-array",
            json!([{ "controller": "/soc/gpio@50000000", "data": { "pin": 13, "flags": 1 } }]),
        )
        .unwrap();
        let PropertyValue::PhandleArray(entries) = value else {
            panic!("expected a phandle-array");
        };
        assert_eq!(entries[0].controller, "/soc/gpio@50000000");
        assert_eq!(entries[0].data.get("pin"), Some(&13));
    }
}
