use std::{env, path::PathBuf};

use log::{info, warn};
use reqwest::Url;

use crate::error::ClientError;
use crate::DEFAULT_API_BASE;

pub const API_BASE_VAR: &'static str = "INSTAFEED_API_BASE";
pub const STORAGE_VAR: &'static str = "INSTAFEED_STORAGE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: Url,
    pub storage_path: PathBuf,
}

impl ClientConfig {
    pub fn new(api_base: &str, storage_path: PathBuf) -> Result<Self, ClientError> {
        Ok(ClientConfig {
            api_base: parse_base(api_base)?,
            storage_path,
        })
    }

    /// Reads the environment, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, ClientError> {
        let api_base = var(API_BASE_VAR).unwrap_or_else(|_| {
            info!("{API_BASE_VAR} not set, using default: {DEFAULT_API_BASE}");
            DEFAULT_API_BASE.to_owned()
        });

        let storage_path = var(STORAGE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_storage_path());

        Self::new(&api_base, storage_path)
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ClientError> {
        self.api_base = parse_base(api_base)?;
        Ok(self)
    }

    pub fn with_storage_path(mut self, storage_path: PathBuf) -> Self {
        self.storage_path = storage_path;
        self
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn parse_base(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| {
        warn!("Invalid API base {raw}: {e}");
        ClientError::Format(format!("invalid API base url {raw}: {e}"))
    })
}

pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("instafeed")
        .join("storage.json")
}
