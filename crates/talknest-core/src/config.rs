use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use talknest_provider::{ProviderKind, ProviderSettings};

pub const CONFIG_FILE: &str = "config.yaml";

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_file() -> String {
    "history.json".to_string()
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::Gemini
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            api_key: String::new(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TalknestConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl TalknestConfig {
    pub fn provider_settings(&self) -> ProviderSettings {
        let mut settings = ProviderSettings::new(self.provider.kind);
        if !self.provider.api_key.is_empty() {
            settings = settings.with_api_key(self.provider.api_key.clone());
        }
        if let Some(base_url) = &self.provider.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        settings
    }

    /// History file location, resolved against the config root.
    pub fn history_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.history_file)
    }
}

pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        output.push_str(&std::env::var(key).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

pub fn load_config(root: &Path) -> Result<TalknestConfig> {
    let mut config: TalknestConfig = read_yaml_file(&root.join(CONFIG_FILE))?;

    config.provider.api_key = resolve_env_var(&config.provider.api_key);
    config.provider.model = resolve_env_var(&config.provider.model);
    if let Some(base_url) = &mut config.provider.base_url {
        *base_url = resolve_env_var(base_url);
    }
    config.storage.history_file = resolve_env_var(&config.storage.history_file);

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &TalknestConfig) -> Result<()> {
    if config.provider.model.trim().is_empty() {
        return Err(anyhow!("provider.model must not be empty"));
    }

    if !(0.0..=2.0).contains(&config.provider.temperature) {
        return Err(anyhow!(
            "provider.temperature out of range (expected 0.0..=2.0): {}",
            config.provider.temperature
        ));
    }

    if config.provider.kind == ProviderKind::Gemini && config.provider.api_key.is_empty() {
        return Err(anyhow!(
            "provider.api_key is empty; set GEMINI_API_KEY or put the key in config.yaml"
        ));
    }

    if config.storage.history_file.trim().is_empty() {
        return Err(anyhow!("storage.history_file must not be empty"));
    }

    Ok(())
}

fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))
}

const SKELETON_CONFIG: &str = r#"# talknest configuration
provider:
  kind: gemini
  api_key: ${GEMINI_API_KEY}
  model: gemini-3-flash-preview
  # base_url: https://generativelanguage.googleapis.com/v1beta
  temperature: 0.7

storage:
  history_file: history.json
"#;

/// Write a starter config if the root has none yet. Returns the config path
/// either way.
pub fn ensure_skeleton_config(root: &Path) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(path);
    }

    fs::create_dir_all(root)
        .with_context(|| format!("failed to create config root: {}", root.display()))?;
    fs::write(&path, SKELETON_CONFIG)
        .with_context(|| format!("failed to write config skeleton: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn load_config_reads_all_sections() -> Result<()> {
        let dir = TempDir::new()?;
        write_config(
            &dir,
            "provider:\n  kind: stub\n  model: gemini-3-flash-preview\n  temperature: 0.4\nstorage:\n  history_file: records.json\n",
        );

        let config = load_config(dir.path())?;
        assert_eq!(config.provider.kind, ProviderKind::Stub);
        assert_eq!(config.provider.model, "gemini-3-flash-preview");
        assert_eq!(config.provider.temperature, 0.4);
        assert_eq!(config.storage.history_file, "records.json");
        assert_eq!(
            config.history_path(dir.path()),
            dir.path().join("records.json")
        );
        Ok(())
    }

    #[test]
    fn defaults_fill_missing_fields() -> Result<()> {
        let dir = TempDir::new()?;
        write_config(&dir, "provider:\n  kind: stub\n");

        let config = load_config(dir.path())?;
        assert_eq!(config.provider.model, "gemini-3-flash-preview");
        assert_eq!(config.provider.temperature, 0.7);
        assert!(config.provider.base_url.is_none());
        assert_eq!(config.storage.history_file, "history.json");
        Ok(())
    }

    #[test]
    fn api_key_resolves_from_environment() -> Result<()> {
        let dir = TempDir::new()?;
        std::env::set_var("TALKNEST_CONFIG_TEST_KEY", "sk-test-123");
        write_config(
            &dir,
            "provider:\n  kind: gemini\n  api_key: ${TALKNEST_CONFIG_TEST_KEY}\n",
        );

        let config = load_config(dir.path())?;
        assert_eq!(config.provider.api_key, "sk-test-123");
        Ok(())
    }

    #[test]
    fn gemini_without_api_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "provider:\n  kind: gemini\n");

        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn stub_provider_needs_no_api_key() -> Result<()> {
        let dir = TempDir::new()?;
        write_config(&dir, "provider:\n  kind: stub\n");
        assert!(load_config(dir.path()).is_ok());
        Ok(())
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "provider:\n  kind: stub\n  temperature: 3.5\n");

        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn provider_settings_maps_key_and_base_url() {
        let mut config = TalknestConfig::default();
        config.provider.api_key = "sk-abc".to_string();
        config.provider.base_url = Some("http://localhost:9999".to_string());

        let settings = config.provider_settings();
        assert_eq!(settings.kind, ProviderKind::Gemini);
        assert_eq!(settings.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn skeleton_config_is_written_once() -> Result<()> {
        let dir = TempDir::new()?;
        let root = dir.path().join("talknest");

        let path = ensure_skeleton_config(&root)?;
        assert!(path.exists());
        let written = fs::read_to_string(&path)?;
        assert!(written.contains("${GEMINI_API_KEY}"));

        fs::write(&path, "provider:\n  kind: stub\n")?;
        ensure_skeleton_config(&root)?;
        assert_eq!(fs::read_to_string(&path)?, "provider:\n  kind: stub\n");
        Ok(())
    }

    #[test]
    fn resolve_env_var_replaces_placeholder() {
        let expected = std::env::var("PATH").unwrap();
        assert_eq!(resolve_env_var("${PATH}"), expected);
    }

    #[test]
    fn resolve_env_var_returns_raw_when_not_placeholder() {
        assert_eq!(resolve_env_var("plain-value"), "plain-value");
    }

    #[test]
    fn resolve_env_var_handles_unclosed_bracket() {
        assert_eq!(resolve_env_var("prefix_${UNCLOSED"), "prefix_${UNCLOSED");
    }

    #[test]
    fn resolve_env_var_missing_env_returns_empty() {
        assert_eq!(resolve_env_var("val=${TALKNEST_NONEXISTENT_VAR_XYZ}"), "val=");
    }
}
