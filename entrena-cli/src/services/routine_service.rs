use anyhow::{Context, Result};
use std::collections::BTreeSet;

use crate::access::{require_owner, require_trainer, AccessError};
use crate::api::{ApiError, BackendClient, Query};
use crate::models::{PlanAssignment, PlanRoutine, Routine, RoutineForm, UserProfile};

use super::media_service::{content_type_for, upload_media};
use super::{ASSIGNMENTS_TABLE, PLAN_ROUTINES_TABLE, ROUTINES_TABLE};

/// Routines visible to the current user, kept in sync with local mutations
pub struct RoutineService<'a> {
    client: &'a BackendClient,
    routines: Vec<Routine>,
}

impl<'a> RoutineService<'a> {
    pub fn new(client: &'a BackendClient) -> Self {
        Self {
            client,
            routines: Vec::new(),
        }
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn find(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    /// Load a trainer's own routines, newest first
    pub async fn load_for_trainer(&mut self, trainer_id: &str) -> Result<&[Routine]> {
        let query = Query::table(ROUTINES_TABLE)
            .select("*")
            .eq("entrenador_id", trainer_id)
            .order_desc("created_at");

        self.routines = self
            .client
            .select(&query)
            .await
            .context("No se pudieron cargar las rutinas")?;

        tracing::debug!("Loaded {} routines for trainer {}", self.routines.len(), trainer_id);
        Ok(&self.routines)
    }

    /// Load routines reachable through the plans assigned to a trainee
    pub async fn load_assigned(&mut self, user_id: &str) -> Result<&[Routine]> {
        let assignments: Vec<PlanAssignment> = self
            .client
            .select(
                &Query::table(ASSIGNMENTS_TABLE)
                    .select("*")
                    .eq("usuario_id", user_id),
            )
            .await
            .context("No se pudieron cargar los planes asignados")?;

        let plan_ids: BTreeSet<String> = assignments.into_iter().map(|a| a.plan_id).collect();

        let links: Vec<PlanRoutine> = self
            .client
            .select(
                &Query::table(PLAN_ROUTINES_TABLE)
                    .select("*")
                    .in_list("plan_id", &plan_ids),
            )
            .await
            .context("No se pudieron cargar las rutinas de los planes")?;

        let routine_ids: BTreeSet<String> = links.into_iter().map(|l| l.rutina_id).collect();

        self.routines = self
            .client
            .select(
                &Query::table(ROUTINES_TABLE)
                    .select("*")
                    .in_list("id", &routine_ids)
                    .order_desc("created_at"),
            )
            .await
            .context("No se pudieron cargar las rutinas")?;

        Ok(&self.routines)
    }

    pub async fn get(&self, id: &str) -> Result<Routine> {
        let query = Query::table(ROUTINES_TABLE).select("*").eq("id", id);
        self.client.select_single(&query).await
    }

    /// A routine the user may look at: trainers see their own routines,
    /// trainees the routines of their assigned plans. Anything else reads as
    /// not found.
    pub async fn get_visible(&self, id: &str, user: &UserProfile) -> Result<Routine> {
        let mut query = Query::table(ROUTINES_TABLE).select("*").eq("id", id);

        if user.is_trainer() {
            query = query.eq("entrenador_id", &user.id);
        } else if !self.is_reachable(id, &user.id).await? {
            tracing::debug!("Routine {} is not in a plan assigned to {}", id, user.id);
            return Err(ApiError::NotFound(format!("rutina {}", id)).into());
        }

        self.client.select_single(&query).await
    }

    /// Whether a routine belongs to at least one plan assigned to the trainee
    async fn is_reachable(&self, routine_id: &str, user_id: &str) -> Result<bool> {
        let links: Vec<PlanRoutine> = self
            .client
            .select(
                &Query::table(PLAN_ROUTINES_TABLE)
                    .select("*")
                    .eq("rutina_id", routine_id),
            )
            .await
            .context("No se pudieron cargar los planes de la rutina")?;

        let plan_ids: BTreeSet<String> = links.into_iter().map(|l| l.plan_id).collect();

        let assignments: Vec<PlanAssignment> = self
            .client
            .select(
                &Query::table(ASSIGNMENTS_TABLE)
                    .select("*")
                    .eq("usuario_id", user_id)
                    .in_list("plan_id", &plan_ids),
            )
            .await
            .context("No se pudieron cargar los planes asignados")?;

        Ok(!assignments.is_empty())
    }

    /// Upload the form's media file, if any. Rejects unsupported files before
    /// touching the network.
    async fn upload_form_media(&self, form: &RoutineForm, trainer: &UserProfile) -> Result<Option<String>> {
        let Some(media) = &form.media else {
            return Ok(None);
        };
        content_type_for(media)?;
        let url = upload_media(self.client, &trainer.id, media).await?;
        Ok(Some(url))
    }

    /// Validate, optionally upload media, then insert the routine
    pub async fn create(&mut self, form: RoutineForm, trainer: &UserProfile) -> Result<Routine> {
        require_trainer(trainer)?;
        form.validate()?;
        let imagen_url = self.upload_form_media(&form, trainer).await?;

        let new_routine = form.into_new_routine(&trainer.id, imagen_url);
        let created: Vec<Routine> = self
            .client
            .insert(ROUTINES_TABLE, &new_routine)
            .await
            .context("No se pudo crear la rutina")?;

        let routine = created
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Unknown("Insert returned no rows".to_string()))?;

        tracing::info!("Created routine {}", routine.id);
        self.routines.insert(0, routine.clone());
        Ok(routine)
    }

    /// Update title/description and, if given, replace the media
    pub async fn update(&mut self, id: &str, form: RoutineForm, trainer: &UserProfile) -> Result<Routine> {
        require_trainer(trainer)?;
        form.validate()?;
        let imagen_url = self.upload_form_media(&form, trainer).await?;

        let query = Query::table(ROUTINES_TABLE)
            .eq("id", id)
            .eq("entrenador_id", &trainer.id);

        let updated: Vec<Routine> = self
            .client
            .update(&query, &form.into_changes(imagen_url))
            .await
            .context("No se pudo actualizar la rutina")?;

        // Zero rows back means the row is gone or belongs to someone else
        let routine = updated
            .into_iter()
            .next()
            .ok_or(AccessError::NotOwner("esta rutina"))?;

        tracing::info!("Updated routine {}", routine.id);
        match self.routines.iter_mut().find(|r| r.id == routine.id) {
            Some(slot) => *slot = routine.clone(),
            None => self.routines.insert(0, routine.clone()),
        }
        Ok(routine)
    }

    /// Delete a routine and its plan links
    pub async fn delete(&mut self, id: &str, trainer: &UserProfile) -> Result<()> {
        require_trainer(trainer)?;

        let routine = self.get(id).await?;
        require_owner(&routine, trainer)?;

        self.client
            .delete(&Query::table(PLAN_ROUTINES_TABLE).eq("rutina_id", id))
            .await
            .context("No se pudo quitar la rutina de sus planes")?;

        self.client
            .delete(
                &Query::table(ROUTINES_TABLE)
                    .eq("id", id)
                    .eq("entrenador_id", &trainer.id),
            )
            .await
            .context("No se pudo eliminar la rutina")?;

        tracing::info!("Deleted routine {}", id);
        self.routines.retain(|r| r.id != id);
        Ok(())
    }
}
