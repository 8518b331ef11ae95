use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("drover"))
}

/// Get the state directory (latency logs live here by default)
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("drover"))
}

// ============================================================================
// Drover Config
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DroverConfig {
    #[serde(default)]
    pub graph: Option<GraphSettings>,
    #[serde(default)]
    pub oof: OofDefaults,
    #[serde(default)]
    pub deploy: DeployDefaults,
    #[serde(default)]
    pub profiles: ProfileDefaults,
    #[serde(default)]
    pub netlat: NetlatDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphSettings {
    pub tenant_id: String,
    pub client_id: String,
    /// Environment variable holding the app registration's client secret.
    #[serde(default = "default_secret_env")]
    pub client_secret_env: String,
}

fn default_secret_env() -> String {
    "DROVER_CLIENT_SECRET".to_string()
}

impl GraphSettings {
    /// Read the client secret from the configured environment variable.
    pub fn client_secret(&self) -> Result<String> {
        std::env::var(&self.client_secret_env).with_context(|| {
            format!(
                "client secret not found; set the {} environment variable",
                self.client_secret_env
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OofDefaults {
    pub internal_message: String,
    pub external_message: String,
    pub external_audience: String,
}

impl Default for OofDefaults {
    fn default() -> Self {
        Self {
            internal_message: "I am currently out of the office and will reply on my return."
                .to_string(),
            external_message: String::new(),
            external_audience: "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployDefaults {
    /// Installer tool invoked per package.
    pub installer: String,
}

impl Default for DeployDefaults {
    fn default() -> Self {
        Self {
            installer: "winget".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    /// SIDs that must never be removed, on top of the built-in system set.
    pub exclude: Vec<String>,
    /// Unused-for-this-long counts as stale.
    pub max_age_days: i64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            max_age_days: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetlatDefaults {
    /// Log file for latency measurements; defaults to the state directory.
    pub log_file: Option<String>,
    /// Echo requests per host.
    pub probes: u32,
}

impl Default for NetlatDefaults {
    fn default() -> Self {
        Self {
            log_file: None,
            probes: 4,
        }
    }
}

impl DroverConfig {
    /// Load config.toml (or legacy config.json) from the config directory.
    ///
    /// A missing file is fine - every section has defaults - but a file
    /// that exists and does not parse is an error the user must see.
    pub fn load() -> Result<Self> {
        let dir = config_dir()?;

        let toml_path = dir.join("config.toml");
        if toml_path.exists() {
            let content = fs::read_to_string(&toml_path)
                .with_context(|| format!("Could not read {}", toml_path.display()))?;
            return toml::from_str(&content)
                .with_context(|| format!("Invalid config: {}", toml_path.display()));
        }

        let json_path = dir.join("config.json");
        if json_path.exists() {
            let content = fs::read_to_string(&json_path)
                .with_context(|| format!("Could not read {}", json_path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Invalid config: {}", json_path.display()));
        }

        log::debug!("no config file in {}; using defaults", dir.display());
        Ok(Self::default())
    }

    /// The Graph connection settings, required by Graph-backed commands.
    pub fn graph(&self) -> Result<&GraphSettings> {
        match &self.graph {
            Some(settings) => Ok(settings),
            None => bail!(
                "no [graph] section configured; add tenant_id and client_id to {}",
                config_dir()
                    .map(|d| d.join("config.toml").display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: DroverConfig = toml::from_str(
            r#"
[graph]
tenant_id = "11111111-2222-3333-4444-555555555555"
client_id = "66666666-7777-8888-9999-000000000000"
client_secret_env = "MY_SECRET"

[oof]
internal_message = "Gone fishing."
external_audience = "contacts"

[profiles]
exclude = ["S-1-5-21-1-2-3-1001"]
max_age_days = 30

[netlat]
probes = 2
"#,
        )
        .unwrap();

        let graph = config.graph().unwrap();
        assert_eq!(graph.client_secret_env, "MY_SECRET");
        assert_eq!(config.oof.internal_message, "Gone fishing.");
        // Unset fields keep their defaults.
        assert_eq!(config.oof.external_audience, "contacts");
        assert_eq!(config.deploy.installer, "winget");
        assert_eq!(config.profiles.max_age_days, 30);
        assert_eq!(config.netlat.probes, 2);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: DroverConfig = toml::from_str("").unwrap();
        assert!(config.graph.is_none());
        assert!(config.graph().is_err());
        assert_eq!(config.profiles.max_age_days, 90);
        assert_eq!(config.netlat.probes, 4);
        assert!(config.netlat.log_file.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<DroverConfig, _> = toml::from_str("[typo]\nfoo = 1\n");
        assert!(result.is_err());
    }
}
