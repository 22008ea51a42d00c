use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use reqwest::Url;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "EMOLENS_CONFIG";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    pub output: Option<String>,
    pub show_timing: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let (path, config) = read_config()?;

    let profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })
}

/// Parses the config file and checks every profile's values.
///
/// When `profile` is given it must also exist. Returns the file's path.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let (path, config) = read_config()?;
    let profiles = config.profiles.unwrap_or_default();

    let mut names = profiles.keys().collect::<Vec<_>>();
    names.sort();
    for name in names {
        let entry = &profiles[name];
        if let Some(base_url) = entry.base_url.as_deref() {
            parse_base_url(base_url)
                .map_err(|err| format!("Profile '{name}' in '{}': {err}", path.display()))?;
        }
        if let Some(output) = entry.output.as_deref() {
            if !matches!(output.trim().to_ascii_lowercase().as_str(), "text" | "json") {
                return Err(format!(
                    "Profile '{name}' in '{}': Invalid profile output '{output}'. Supported values: text, json.",
                    path.display()
                ));
            }
        }
    }

    if let Some(name) = profile {
        if !profiles.contains_key(name) {
            return Err(format!(
                "Profile '{}' not found in config file '{}'.",
                name,
                path.display()
            ));
        }
    }

    Ok(path)
}

/// Accepts absolute http(s) URLs only.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|err| format!("Invalid base URL '{raw}': {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!(
            "Invalid base URL '{raw}': unsupported scheme '{scheme}'"
        )),
    }
}

fn read_config() -> Result<(PathBuf, ConfigFile), String> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    Ok((path, config))
}

/// Resolves the config file location without reading it.
pub fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("emolens").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        format!("Cannot resolve config path: set {CONFIG_ENV} or HOME/XDG_CONFIG_HOME.")
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("emolens")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::parse_base_url;

    #[test]
    fn base_url_must_be_http() {
        assert!(parse_base_url("http://127.0.0.1:8000").is_ok());
        assert!(parse_base_url("https://analysis.example.com/").is_ok());

        let err = parse_base_url("ftp://127.0.0.1").unwrap_err();
        assert!(err.contains("unsupported scheme 'ftp'"));

        let err = parse_base_url("127.0.0.1:8000/api").unwrap_err();
        assert!(err.starts_with("Invalid base URL"));
    }
}
