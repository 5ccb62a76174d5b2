//! Shared helpers for command implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON or YAML document. `.json` files are JSON, anything else YAML.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("doc.json");
        std::fs::write(&json, r#"{"a": 1}"#).unwrap();
        let parsed: BTreeMap<String, u32> = load_document(&json).unwrap();
        assert_eq!(parsed["a"], 1);

        let yaml = dir.path().join("doc.yaml");
        let mut file = std::fs::File::create(&yaml).unwrap();
        writeln!(file, "a: 2").unwrap();
        let parsed: BTreeMap<String, u32> = load_document(&yaml).unwrap();
        assert_eq!(parsed["a"], 2);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_document::<BTreeMap<String, u32>>(Path::new("/nonexistent/doc.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/doc.json"));
    }
}
