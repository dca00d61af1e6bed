use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::info;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const SQLITE_FILE_NAME: &str = "posts.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub sqlite_file: PathBuf,
    pub endpoint: String,
}

impl Config {
    pub fn new() -> Result<Self> {
        let config_dir = {
            #[cfg(target_os = "android")]
            {
                PathBuf::from("/data/data/com.postlab.app/databases")
            }

            #[cfg(target_os = "ios")]
            {
                PathBuf::from("/tmp/postlab")
            }

            #[cfg(not(any(target_os = "android", target_os = "ios")))]
            {
                let proj_dirs = ProjectDirs::from("com", "postlab", "postlab")
                    .context("Failed to get project directories")?;
                proj_dirs.config_dir().to_path_buf()
            }
        };

        // Create directories if they don't exist
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let sqlite_file = config_dir.join(SQLITE_FILE_NAME);
        info!("Using config directory: {:?}", config_dir);

        Ok(Config {
            config_dir,
            sqlite_file,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Config rooted at an explicit directory, skipping platform lookup.
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;
        let sqlite_file = config_dir.join(SQLITE_FILE_NAME);

        Ok(Config {
            config_dir,
            sqlite_file,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Config for an explicit database file. The parent directory becomes
    /// `config_dir` and no platform directory is resolved.
    pub fn for_database(sqlite_file: impl Into<PathBuf>) -> Result<Self> {
        let sqlite_file = sqlite_file.into();
        let config_dir = match sqlite_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create database directory {:?}", config_dir))?;

        Ok(Config {
            config_dir,
            sqlite_file,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_sqlite_file(mut self, sqlite_file: impl Into<PathBuf>) -> Self {
        self.sqlite_file = sqlite_file.into();
        self
    }
}
