//! # Binding Discovery
//!
//! Finds the devicetree binding files (`*.yaml`) below the binding search
//! paths and reads their top-level `compatible` and `description` keys.
//!
//! ```text
//! dts/bindings/
//! ├── serial/nordic,nrf-uarte.yaml   -> nordic,nrf-uarte
//! ├── gpio/nordic,nrf-gpio.yaml      -> nordic,nrf-gpio
//! └── base/base.yaml                 (no compatible: ignored)
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A devicetree binding, identified by its compatible string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub compatible: String,
    pub description: Option<String>,
    /// Binding source file, when known.
    pub path: Option<PathBuf>,
}

/// Maximum directory depth scanned below each binding search path
const MAX_SEARCH_DEPTH: usize = 8;

/// Scan binding search paths for `*.yaml` binding files.
///
/// Directories that do not exist are skipped. Files without a top-level
/// `compatible:` key (include files, base bindings) are ignored, and so are
/// files that cannot be read.
pub fn discover_bindings(search_paths: &[PathBuf]) -> Result<Vec<Binding>> {
    let mut bindings = Vec::new();

    for dir in search_paths {
        if !dir.exists() {
            tracing::warn!(path = %dir.display(), "binding search path does not exist");
            continue;
        }
        if !dir.is_dir() {
            anyhow::bail!("Path '{}' exists but is not a directory", dir.display());
        }

        for entry in WalkDir::new(dir)
            .max_depth(MAX_SEARCH_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("failed to read directory entry: {}", err);
                    None
                }
            })
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if !is_yaml {
                continue;
            }
            match parse_binding(path) {
                Ok(Some(binding)) => bindings.push(binding),
                Ok(None) => {}
                Err(err) => tracing::warn!("skipping binding file: {:#}", err),
            }
        }
    }

    tracing::debug!(count = bindings.len(), "discovered bindings");
    Ok(bindings)
}

/// Read one binding file.
pub fn parse_binding(path: &Path) -> Result<Option<Binding>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read binding file: {}", path.display()))?;
    parse_binding_str(&content, Some(path))
}

/// Extract the top-level `compatible` and `description` keys of a binding.
pub fn parse_binding_str(content: &str, path: Option<&Path>) -> Result<Option<Binding>> {
    // Only top-level keys: nested `compatible:` entries are property specs.
    let compatible_re = Regex::new(r#"^compatible:\s*["']?([^"'\s#]+)["']?"#)
        .context("Failed to compile compatible regex pattern")?;
    let description_re = Regex::new(r"^description:\s*(.*)$")
        .context("Failed to compile description regex pattern")?;

    let lines: Vec<&str> = content.lines().collect();
    let mut compatible = None;
    let mut description = None;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(cap) = compatible_re.captures(line) {
            compatible.get_or_insert_with(|| cap[1].to_string());
        } else if let Some(cap) = description_re.captures(line) {
            if description.is_none() {
                description = parse_scalar(cap[1].trim(), &lines[idx + 1..]);
            }
        }
    }

    Ok(compatible.map(|compatible| Binding {
        compatible,
        description,
        path: path.map(Path::to_path_buf),
    }))
}

/// Parse a YAML scalar value: plain, quoted, or a `|`/`>` block scalar.
fn parse_scalar(value: &str, following: &[&str]) -> Option<String> {
    let block = value.chars().next().filter(|c| *c == '|' || *c == '>');
    let Some(block) = block else {
        let value = value.trim_matches(|c| c == '"' || c == '\'').trim();
        return (!value.is_empty()).then(|| value.to_string());
    };

    let body: Vec<&str> = following
        .iter()
        .take_while(|line| line.trim().is_empty() || line.starts_with(char::is_whitespace))
        .copied()
        .collect();
    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let dedented: Vec<&str> = body
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect();

    let text = if block == '>' {
        dedented.join(" ")
    } else {
        dedented.join("\n")
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}
