use anyhow::{Context, Result};

use crate::access::AccessError;
use crate::api::{BackendClient, Query};
use crate::models::UserProfile;

use super::USERS_TABLE;

/// Authenticated user and their role
pub struct SessionService<'a> {
    client: &'a BackendClient,
}

impl<'a> SessionService<'a> {
    pub fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Sign in and load the profile of the signed-in user
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let session = self.client.login(email, password).await?;
        self.profile(&session.user.id)
            .await
            .context("Signed in, but the user profile could not be loaded")
    }

    /// Profile of the stored session
    pub async fn current_profile(&self) -> Result<UserProfile> {
        let user_id = self
            .client
            .current_user_id()
            .map_err(|_| AccessError::NotLoggedIn)?;
        self.profile(&user_id).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let query = Query::table(USERS_TABLE).select("*").eq("id", user_id);
        let profile: UserProfile = self.client.select_single(&query).await?;
        tracing::debug!("Loaded profile {} ({})", profile.id, profile.rol.as_str());
        Ok(profile)
    }

    pub async fn profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>> {
        let query = Query::table(USERS_TABLE)
            .select("*")
            .in_list("id", user_ids);
        self.client.select(&query).await
    }
}
