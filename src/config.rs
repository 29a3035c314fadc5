use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "jenkins-widget";

/// Configuration file structure for the widget CLI.
///
/// Loaded from the current directory, the user configuration directory, or
/// an explicit path. Command line flags override its values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Console REST access
    #[serde(default)]
    pub rest: RestConfig,

    /// Project the subscriptions belong to
    #[serde(default)]
    pub project: ProjectConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RestConfig {
    /// Console REST base URL
    #[serde(default = "default_rest_url")]
    pub base_url: String,

    pub user: Option<String>,

    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Project key new job names must start with
    pub pkey: Option<String>,

    /// Jenkins node new jobs are checked against (e.g. 'service:build:jenkins:bpr')
    pub node: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Message locale, e.g. 'en' or 'fr'
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Html,
    Json,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_rest_url(),
            user: None,
            api_token: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            locale: default_locale(),
        }
    }
}

fn default_rest_url() -> String {
    "http://localhost:8080/ligoj/rest".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./jenkins-widget.{toml,json,yaml,yml}
    /// 3. <user config dir>/jenkins-widget/config.toml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|extension| PathBuf::from(format!("{CONFIG_NAME}.{extension}")))
            .chain(Self::user_config_path());

        for path in candidates {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        // No config file found, return defaults
        Ok(Self::default())
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_NAME).join("config.toml"))
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rest.base_url, "http://localhost:8080/ligoj/rest");
        assert_eq!(config.output.locale, "en");
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(config.project.pkey.is_none());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[rest]
base-url = "https://console.sample.org/rest"
user = "admin"
api-token = "secret"

[project]
pkey = "proj"
node = "service:build:jenkins:bpr"

[output]
format = "html"
locale = "fr"
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.rest.base_url, "https://console.sample.org/rest");
        assert_eq!(config.rest.user.as_deref(), Some("admin"));
        assert_eq!(config.rest.api_token.as_deref(), Some("secret"));
        assert_eq!(config.project.pkey.as_deref(), Some("proj"));
        assert_eq!(config.project.node.as_deref(), Some("service:build:jenkins:bpr"));
        assert_eq!(config.output.format, OutputFormat::Html);
        assert_eq!(config.output.locale, "fr");
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "project": { "pkey": "json-proj" },
  "output": { "format": "json" }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.project.pkey.as_deref(), Some("json-proj"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.rest.base_url, "http://localhost:8080/ligoj/rest");
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(temp_file, "project:\n  node: service:build:jenkins:bpr\n").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.project.node.as_deref(), Some("service:build:jenkins:bpr"));
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let result = Config::load(Some(Path::new("nonexistent.toml")));
        assert!(result.unwrap_err().to_string().contains("nonexistent.toml"));
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[rest\nbase-url = ").unwrap();
        assert!(Config::load_from_path(temp_file.path()).is_err());
    }
}
