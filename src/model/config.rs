use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub dates: DateConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
}

/// Display language for date labels. Input phrases in both languages
/// always parse regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_true")]
    pub on_list: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig { on_list: true }
    }
}

/// Default: see src/cli/handlers/init.rs
fn default_true() -> bool {
    true
}
