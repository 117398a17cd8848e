use anyhow::Result;
use std::path::PathBuf;

use crate::access::{require_trainer, AccessError};
use crate::api::BackendClient;
use crate::config::Config;
use crate::models::UserProfile;
use crate::services::SessionService;

use super::ui;

/// Per-invocation state shared by all commands
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref())
    }

    pub fn client(&self) -> Result<BackendClient> {
        BackendClient::new(self.load_config()?)
    }

    /// Client plus the signed-in user's profile
    pub async fn session(&self) -> Result<(BackendClient, UserProfile)> {
        let client = self.client()?;
        if !client.is_authenticated() {
            return Err(AccessError::NotLoggedIn.into());
        }

        let pb = ui::spinner("Cargando sesión...");
        let profile = SessionService::new(&client).current_profile().await;
        pb.finish_and_clear();

        Ok((client, profile?))
    }

    /// Like `session`, but only trainers get through
    pub async fn trainer_session(&self) -> Result<(BackendClient, UserProfile)> {
        let (client, profile) = self.session().await?;
        require_trainer(&profile)?;
        Ok((client, profile))
    }
}
