//! Global options resolved into what commands need

use anyhow::{anyhow, Context as _};
use shared::{ModerationConfig, Uid, VerifiedIdentity};
use std::path::{Path, PathBuf};
use store::JsonFileProfileStore;

/// Resolved global options
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ModerationConfig,
    pub store_path: Option<PathBuf>,
    pub actor: Option<Uid>,
    pub json: bool,
}

impl Context {
    /// Build a context from command-line options.
    ///
    /// `--store` wins over `storePath` from the config file.
    pub fn resolve(
        config_path: Option<&Path>,
        store_path: Option<PathBuf>,
        actor: Option<&str>,
        json: bool,
    ) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => ModerationConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ModerationConfig::default(),
        };
        let store_path = store_path.or_else(|| config.store_path.clone());
        let actor = actor.map(Uid::parse).transpose()?;

        Ok(Self {
            config,
            store_path,
            actor,
            json,
        })
    }

    pub fn open_store(&self) -> anyhow::Result<JsonFileProfileStore> {
        let path = self
            .store_path
            .as_ref()
            .ok_or_else(|| anyhow!("no profile store given: pass --store or set storePath in the config"))?;
        JsonFileProfileStore::open(path)
            .with_context(|| format!("failed to open profile store {}", path.display()))
    }

    /// Identity the command acts as. Missing `--as` is passed through so the
    /// authority reports it as unauthorized.
    pub fn identity(&self) -> Option<VerifiedIdentity> {
        self.actor.clone().map(VerifiedIdentity::new)
    }

    /// Print a serializable value as JSON, or the text form otherwise
    pub fn emit<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}
