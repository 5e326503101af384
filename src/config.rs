use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://document-management-api-u9ab.onrender.com";
pub const DEFAULT_PASSWORD: &str = "admin123";
pub const DEFAULT_USERNAME: &str = "testuser";
pub const DEFAULT_TOKEN_PATH: &str = "~/.config/doctrack/token";

/// Deployment-time settings. Every value has a development default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub password: String,
    pub username: String,
    pub token_path: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, password: &str, token_path: &str) -> Result<Self> {
        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_owned(),
            password: password.to_owned(),
            username: DEFAULT_USERNAME.to_owned(),
            token_path: expand_path(token_path)?,
        })
    }
}

fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Token file path {} is invalid", path))?;
    Ok(Path::new(expanded.as_ref()).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let config = Config::new("http://localhost:8000/", "secret", "/tmp/token").unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.username, DEFAULT_USERNAME);
        assert_eq!(config.token_path, PathBuf::from("/tmp/token"));
    }

    #[test]
    fn home_is_expanded_in_token_path() {
        let config = Config::new(DEFAULT_API_URL, DEFAULT_PASSWORD, DEFAULT_TOKEN_PATH).unwrap();
        assert!(!config.token_path.to_string_lossy().starts_with('~'));
        assert!(config.token_path.ends_with(".config/doctrack/token"));
    }
}
