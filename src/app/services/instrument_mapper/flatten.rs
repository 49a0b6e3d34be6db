//! Template flattening into slash-delimited paths
//!
//! A nested YAML or JSON template becomes an ordered list of
//! `/ENTRY[entry]/a/b -> value` pairs:
//! - a key named `unit` becomes `@units`
//! - a path ending in `/value` drops that suffix
//! - a list of mappings is flattened per element; repeated paths are
//!   suffixed `1`, `2`, ... and `{value, unit}` pairs split into `<key>` and
//!   `<key>/@units`
//!
//! Later duplicates of a path replace the value but keep the first position.

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::constants::instrument::{PATH_SEPARATOR, TEMPLATE_ROOT, UNITS_ATTRIBUTE};
use crate::constants::TEMPLATE_EXTENSIONS;
use crate::{Error, Result};

/// Template serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Yaml,
    Json,
}

impl TemplateFormat {
    /// Format from a file extension: `json` or one of the YAML extensions
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(TemplateFormat::Json),
            ext if TEMPLATE_EXTENSIONS.contains(&ext) => Ok(TemplateFormat::Yaml),
            _ => Err(Error::parse(
                path.display().to_string(),
                format!(
                    "unsupported template extension, expected one of {:?}",
                    TEMPLATE_EXTENSIONS
                ),
            )),
        }
    }
}

/// Flattened template paths in first-appearance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTemplate {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl FlatTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path, replacing the value of an existing one in place
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        let path = path.into();
        match self.index.get(&path) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, value));
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.index.get(path).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for FlatTemplate {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut template = FlatTemplate::new();
        for (path, value) in iter {
            template.insert(path, value);
        }
        template
    }
}

impl IntoIterator for FlatTemplate {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse template text and flatten it
pub fn parse_template(content: &str, format: TemplateFormat) -> Result<FlatTemplate> {
    let root: Value = match format {
        TemplateFormat::Yaml => serde_yaml::from_str(content)?,
        TemplateFormat::Json => serde_json::from_str(content)?,
    };
    flatten_template(&root)
}

/// Flatten a parsed template under the `/ENTRY[entry]` root
pub fn flatten_template(root: &Value) -> Result<FlatTemplate> {
    match root {
        Value::Mapping(mapping) => flatten_mapping(mapping, TEMPLATE_ROOT, false),
        Value::Null => Ok(FlatTemplate::new()),
        _ => Err(Error::parse(
            "template",
            "expected a mapping at the top level",
        )),
    }
}

fn flatten_mapping(mapping: &Mapping, parent: &str, in_section: bool) -> Result<FlatTemplate> {
    let mut items = FlatTemplate::new();

    for (key, value) in mapping {
        let name = key_name(key)?;
        let name = if name == "unit" {
            UNITS_ATTRIBUTE.to_string()
        } else {
            name
        };
        let path = format!("{}{}{}", parent, PATH_SEPARATOR, name);

        match value {
            Value::Mapping(inner) if in_section && is_value_unit_pair(inner) => {
                items.insert(path, value.clone());
            }
            Value::Mapping(inner) => {
                for (nested_path, nested_value) in flatten_mapping(inner, &path, in_section)? {
                    items.insert(nested_path, nested_value);
                }
            }
            _ => match path.strip_suffix("/value") {
                Some(stripped) => items.insert(stripped, value.clone()),
                None => {
                    for (section_path, section_value) in flatten_section(&path, value)? {
                        items.insert(section_path, section_value);
                    }
                }
            },
        }
    }

    Ok(items)
}

/// A list of mappings flattened per element; anything else passes through
fn flatten_section(path: &str, value: &Value) -> Result<Vec<(String, Value)>> {
    let Some(groups) = section_groups(value) else {
        return Ok(vec![(path.to_string(), value.clone())]);
    };

    let mut flattened = Vec::new();
    for group in groups {
        let Value::Mapping(mapping) = group else {
            return Err(Error::parse(
                path,
                "list section mixes mappings with plain values",
            ));
        };
        flattened.extend(flatten_mapping(mapping, path, true)?);
    }

    Ok(uniquify_paths(flattened).into_iter().collect())
}

fn section_groups(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Sequence(items) if matches!(items.first(), Some(Value::Mapping(_))) => Some(items),
        _ => None,
    }
}

fn is_value_unit_pair(mapping: &Mapping) -> bool {
    mapping.len() == 2 && mapping.contains_key("value") && mapping.contains_key("unit")
}

/// Suffix repeated paths with `1`, `2`, ... and split `{value, unit}` pairs
fn uniquify_paths(items: Vec<(String, Value)>) -> FlatTemplate {
    let mut unique = FlatTemplate::new();

    for (path, value) in items {
        let mut candidate = path.clone();
        let mut suffix = 1;
        while unique.contains(&candidate) {
            candidate = format!("{}{}", path, suffix);
            suffix += 1;
        }

        match &value {
            Value::Mapping(pair) if is_value_unit_pair(pair) => {
                let units_path = format!("{}{}{}", candidate, PATH_SEPARATOR, UNITS_ATTRIBUTE);
                unique.insert(candidate, pair.get("value").cloned().unwrap_or(Value::Null));
                unique.insert(units_path, pair.get("unit").cloned().unwrap_or(Value::Null));
            }
            _ => unique.insert(candidate, value),
        }
    }

    unique
}

fn key_name(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::parse(
            "template",
            format!("unsupported mapping key {:?}", other),
        )),
    }
}
