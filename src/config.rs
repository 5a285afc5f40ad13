use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    BABEL_EXPORT, BABEL_LOCATOR, COFFEESCRIPT_EXPORT, COFFEESCRIPT_LOCATOR, LESS_EXPORT,
    LESS_LOCATOR, LIVESCRIPT_EXPORT, LIVESCRIPT_LOCATOR, SASS_EXPORT, SASS_LOCATOR,
    STYLUS_EXPORT, STYLUS_LOCATOR, TYPESCRIPT_EXPORT, TYPESCRIPT_LOCATOR,
};
use crate::core::domain::Locator;

/// Where an engine is fetched from and the symbol it exports once activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEntry {
    pub locator: Locator,
    pub export: String,
}

impl EngineEntry {
    pub fn new(locator: &str, export: &str) -> Self {
        Self {
            locator: Locator::new(locator),
            export: export.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stylus: EngineEntry,
    pub sass: EngineEntry,
    pub less: EngineEntry,
    pub typescript: EngineEntry,
    pub babel: EngineEntry,
    pub livescript: EngineEntry,
    pub coffeescript: EngineEntry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stylus: EngineEntry::new(STYLUS_LOCATOR, STYLUS_EXPORT),
            sass: EngineEntry::new(SASS_LOCATOR, SASS_EXPORT),
            less: EngineEntry::new(LESS_LOCATOR, LESS_EXPORT),
            typescript: EngineEntry::new(TYPESCRIPT_LOCATOR, TYPESCRIPT_EXPORT),
            babel: EngineEntry::new(BABEL_LOCATOR, BABEL_EXPORT),
            livescript: EngineEntry::new(LIVESCRIPT_LOCATOR, LIVESCRIPT_EXPORT),
            coffeescript: EngineEntry::new(COFFEESCRIPT_LOCATOR, COFFEESCRIPT_EXPORT),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub engines: EngineConfig,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("playground.toml")
}

/// Reads the config file, falling back to built-in defaults when it is absent.
pub async fn load_config(path: Option<&Path>) -> anyhow::Result<PlaygroundConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !fs::try_exists(&path).await? {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(PlaygroundConfig::default());
    }

    let contents = fs::read_to_string(&path).await?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<PlaygroundConfig> {
    let config: PlaygroundConfig = toml::from_str(contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
        assert_eq!(config.engines.babel.export, "Babel");
        assert_eq!(config.engines.sass.locator.as_str(), SASS_LOCATOR);
    }

    #[test]
    fn test_section_overrides_one_engine() {
        let config = parse_config(
            r#"
            [engines.less]
            locator = "file:///opt/engines/less.js"
            export = "lessc"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.engines.less,
            EngineEntry::new("file:///opt/engines/less.js", "lessc")
        );
        assert_eq!(config.engines.stylus, EngineConfig::default().stylus);
    }

    #[test]
    fn test_incomplete_section_is_rejected() {
        let err = parse_config(
            r#"
            [engines.less]
            locator = "file:///opt/engines/less.js"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("export"));
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("playground_{}.toml", Uuid::new_v4()));
        let config = load_config(Some(&path)).await.unwrap();
        assert_eq!(config, PlaygroundConfig::default());
    }

    #[tokio::test]
    async fn test_load_config_reads_file() {
        let path = std::env::temp_dir().join(format!("playground_{}.toml", Uuid::new_v4()));
        fs::write(
            &path,
            "[engines.stylus]\nlocator = \"https://mirror.example/stylus.js\"\nexport = \"stylus\"\n",
        )
        .await
        .unwrap();

        let config = load_config(Some(&path)).await.unwrap();
        let _ = fs::remove_file(&path).await;

        assert_eq!(
            config.engines.stylus.locator,
            Locator::new("https://mirror.example/stylus.js")
        );
    }
}
