use std::fs;
use std::path::Path;

use crate::io::workspace::WorkspaceError;
use crate::model::config::WorkspaceConfig;

/// Read the workspace config, returning both the parsed config and the
/// raw toml_edit Document for round-trip-safe editing.
pub fn read_config(
    chores_dir: &Path,
) -> Result<(WorkspaceConfig, toml_edit::DocumentMut), WorkspaceError> {
    let config_path = chores_dir.join("config.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: WorkspaceConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse().map_err(|_: toml_edit::TomlError| {
        WorkspaceError::ConfigParseError(toml::from_str::<WorkspaceConfig>("").unwrap_err())
    })?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(chores_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = chores_dir.join("config.toml");
    fs::write(&config_path, doc.to_string()).map_err(|e| WorkspaceError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

/// Look up a dotted key like "dates.locale" in the config document.
pub fn get_key(doc: &toml_edit::DocumentMut, key: &str) -> Option<String> {
    let (section, field) = key.split_once('.')?;
    let item = doc.get(section)?.get(field)?;
    let value = item.as_value()?;
    Some(match value {
        toml_edit::Value::String(s) => s.value().clone(),
        other => other.to_string().trim().to_string(),
    })
}

/// Set a dotted key like "dates.locale" in the config document. Values
/// reading as booleans or integers keep their toml type.
pub fn set_key(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), String> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| format!("invalid key '{}' (expected section.field)", key))?;
    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let item = if value == "true" || value == "false" {
        toml_edit::value(value == "true")
    } else if let Ok(n) = value.parse::<i64>() {
        toml_edit::value(n)
    } else {
        toml_edit::value(value)
    };
    doc[section][field] = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"[workspace]
name = "Home"

# Display language for date labels
[dates]
locale = "en"

[scan]
on_list = true
"#
    }

    #[test]
    fn test_round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        let chores_dir = tmp.path().join("chores");
        fs::create_dir_all(&chores_dir).unwrap();
        let config_path = chores_dir.join("config.toml");

        let original = sample_config();
        fs::write(&config_path, original).unwrap();

        let (_config, doc) = read_config(&chores_dir).unwrap();
        write_config(&chores_dir, &doc).unwrap();

        let written = fs::read_to_string(&config_path).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn test_get_key() {
        let doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert_eq!(get_key(&doc, "dates.locale").as_deref(), Some("en"));
        assert_eq!(get_key(&doc, "scan.on_list").as_deref(), Some("true"));
        assert_eq!(get_key(&doc, "dates.missing"), None);
        assert_eq!(get_key(&doc, "nodot"), None);
    }

    #[test]
    fn test_set_key_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_key(&mut doc, "dates.locale", "ru").unwrap();
        let result = doc.to_string();
        assert!(result.contains("locale = \"ru\""));
        assert!(result.contains("# Display language"));
    }

    #[test]
    fn test_set_key_infers_value_types() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_key(&mut doc, "scan.on_list", "false").unwrap();
        assert!(doc.to_string().contains("on_list = false"));

        set_key(&mut doc, "scan.batch", "25").unwrap();
        assert!(doc.to_string().contains("batch = 25"));
    }

    #[test]
    fn test_set_key_creates_missing_section() {
        let mut doc: toml_edit::DocumentMut = "[workspace]\nname = \"x\"\n".parse().unwrap();
        set_key(&mut doc, "dates.locale", "ru").unwrap();
        let config: WorkspaceConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.dates.locale, crate::model::config::Locale::Ru);
    }

    #[test]
    fn test_set_key_requires_dotted_path() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(set_key(&mut doc, "locale", "ru").is_err());
    }
}
