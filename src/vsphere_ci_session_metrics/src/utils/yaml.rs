use anyhow::{anyhow, bail, Result};
use std::fs;
use std::path::Path;
use yaml_rust2::YamlLoader;
// re-export Yaml for convenience
pub use yaml_rust2::Yaml;

/// Loads the first document of a YAML file.
pub fn load_document_file<P: AsRef<Path>>(path: P) -> Result<Yaml> {
    let yaml_str = fs::read_to_string(path.as_ref())?;
    load_document_str(&yaml_str)
}

pub fn load_document_str(yaml_str: &str) -> Result<Yaml> {
    YamlLoader::load_from_str(yaml_str)?
        .into_iter()
        .next()
        .ok_or(anyhow!("Empty yaml file"))
}

pub trait YamlExt: Sized {
    fn required(&self, key: &'static str) -> Result<&Yaml>;

    fn required_string(&self, key: &'static str) -> Result<String>;

    fn optional_string(&self, key: &'static str) -> Result<Option<String>>;

    fn optional_bool(&self, key: &'static str) -> Result<Option<bool>>;

    fn optional_vec(&self, key: &'static str) -> Result<Option<&Vec<Self>>>;

    /// Finds the entry of a kubeconfig-style named list (`- name: x`) with the given name.
    fn find_named<'a>(list: &'a [Self], name: &str) -> Option<&'a Self>;
}

impl YamlExt for Yaml {
    fn required(&self, key: &'static str) -> Result<&Yaml> {
        let value = &self[key];
        if value.is_badvalue() {
            bail!("Missing key {}", key)
        } else {
            Ok(value)
        }
    }

    fn required_string(&self, key: &'static str) -> Result<String> {
        match &self[key] {
            Yaml::String(s) => Ok(s.clone()),
            Yaml::BadValue => bail!("Missing key {}", key),
            _ => bail!("Expected {} to be a string", key),
        }
    }

    fn optional_string(&self, key: &'static str) -> Result<Option<String>> {
        match &self[key] {
            Yaml::String(s) => Ok(Some(s.clone())),
            Yaml::BadValue | Yaml::Null => Ok(None),
            _ => bail!("Expected {} to be a string", key),
        }
    }

    fn optional_bool(&self, key: &'static str) -> Result<Option<bool>> {
        match &self[key] {
            Yaml::Boolean(b) => Ok(Some(*b)),
            Yaml::BadValue | Yaml::Null => Ok(None),
            _ => bail!("Expected {} to be a boolean", key),
        }
    }

    fn optional_vec(&self, key: &'static str) -> Result<Option<&Vec<Self>>> {
        match &self[key] {
            Yaml::Array(v) => Ok(Some(v)),
            Yaml::BadValue | Yaml::Null => Ok(None),
            _ => bail!("Expected {} to be an array", key),
        }
    }

    fn find_named<'a>(list: &'a [Self], name: &str) -> Option<&'a Self> {
        list.iter()
            .find(|entry| entry["name"].as_str() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
name: build01
flag: true
items:
  - name: a
    value: 1
  - name: b
    value: 2
"#;

    #[test]
    fn test_required_and_optional_lookups() {
        let doc = load_document_str(DOC).unwrap();
        assert_eq!(doc.required_string("name").unwrap(), "build01");
        assert_eq!(doc.optional_bool("flag").unwrap(), Some(true));
        assert!(doc.optional_string("missing").unwrap().is_none());
        assert!(doc.required("missing").is_err());
        assert!(doc.optional_string("flag").is_err());
    }

    #[test]
    fn test_find_named() {
        let doc = load_document_str(DOC).unwrap();
        let items = doc.optional_vec("items").unwrap().unwrap();
        let b = Yaml::find_named(items, "b").unwrap();
        assert_eq!(b["value"].as_i64(), Some(2));
        assert!(Yaml::find_named(items, "c").is_none());
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(load_document_str("").is_err());
    }
}
