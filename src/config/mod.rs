use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend connection block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub token_command: Option<String>,
}

/// Top-level blogq config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct BlogqConfig {
    pub api: Option<ApiConfig>,
}

impl BlogqConfig {
    /// Load config from ~/.blogq/config.toml. Returns default if the file
    /// doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(BlogqConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config.toml")
    }

    pub fn base_url(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.base_url.as_deref())
    }

    /// Display config with secrets redacted.
    pub fn display_redacted(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref api) = self.api {
            lines.push("[api]".to_string());
            if let Some(ref url) = api.base_url {
                lines.push(format!("  base_url = \"{}\"", url));
            }
            if let Some(ref token) = api.token {
                let redacted = if token.len() > 8 {
                    format!("{}...{}", &token[..4], &token[token.len() - 4..])
                } else {
                    "****".to_string()
                };
                lines.push(format!("  token = \"{}\"", redacted));
            }
            if let Some(ref cmd) = api.token_command {
                lines.push(format!("  token_command = \"{}\"", cmd));
            }
        }
        if lines.is_empty() {
            lines.push("(no backend configured)".to_string());
        }
        lines.join("\n")
    }
}

/// Resolve the write token through the chain: CLI flag > env var > config
/// token > config command. Returns None when nothing is configured; reads
/// against the public role don't need one.
pub fn resolve_token(cli_flag: Option<&str>, config: Option<&ApiConfig>) -> Result<Option<String>> {
    if let Some(token) = cli_flag {
        if !token.is_empty() {
            return Ok(Some(token.to_string()));
        }
    }

    if let Ok(val) = std::env::var("BLOGQ_TOKEN") {
        if !val.is_empty() {
            return Ok(Some(val));
        }
    }

    if let Some(api) = config {
        if let Some(ref token) = api.token {
            if !token.is_empty() {
                return Ok(Some(token.clone()));
            }
        }

        if let Some(ref cmd) = api.token_command {
            if !cmd.is_empty() {
                let output = std::process::Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .output()
                    .with_context(|| format!("Failed to run token_command: {cmd}"))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!(
                        "token_command failed (exit {}): {}",
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    );
                }

                let secret = String::from_utf8(output.stdout)
                    .context("token_command output is not valid UTF-8")?
                    .trim()
                    .to_string();

                if !secret.is_empty() {
                    return Ok(Some(secret));
                }
            }
        }
    }

    Ok(None)
}

/// Path to the config file: ~/.blogq/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".blogq").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.blogq/config.toml
# Token resolution order: --token flag > BLOGQ_TOKEN env var > token > token_command
# Reads against the public role need no token; writes usually do.

[api]
# base_url = "https://your-directus-instance.example.com"
# token = "your-static-token"
# token_command = "your-secrets-manager-command-here"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}
