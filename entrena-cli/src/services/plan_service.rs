use anyhow::{Context, Result};
use std::collections::BTreeSet;

use crate::access::{require_owner, require_trainer, AccessError};
use crate::api::{ApiError, BackendClient, Query};
use crate::models::{
    NewPlan, PlanAssignment, PlanChanges, PlanForm, PlanRoutine, Role, Routine, RoutineSetDiff,
    TrainingPlan, UserProfile, ValidationError,
};

use super::session_service::SessionService;
use super::{ASSIGNMENTS_TABLE, PLANS_TABLE, PLAN_ROUTINES_TABLE, ROUTINES_TABLE};

/// Training plans visible to the current user, kept in sync with local mutations
pub struct PlanService<'a> {
    client: &'a BackendClient,
    plans: Vec<TrainingPlan>,
}

impl<'a> PlanService<'a> {
    pub fn new(client: &'a BackendClient) -> Self {
        Self {
            client,
            plans: Vec::new(),
        }
    }

    pub fn plans(&self) -> &[TrainingPlan] {
        &self.plans
    }

    pub fn find(&self, id: &str) -> Option<&TrainingPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Load a trainer's own plans
    pub async fn load_for_trainer(&mut self, trainer_id: &str) -> Result<&[TrainingPlan]> {
        let query = Query::table(PLANS_TABLE)
            .select("*")
            .eq("entrenador_id", trainer_id)
            .order_asc("nombre");

        self.plans = self
            .client
            .select(&query)
            .await
            .context("No se pudieron cargar los planes")?;

        tracing::debug!("Loaded {} plans for trainer {}", self.plans.len(), trainer_id);
        Ok(&self.plans)
    }

    /// Load the plans assigned to a trainee
    pub async fn load_assigned(&mut self, user_id: &str) -> Result<&[TrainingPlan]> {
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

        self.plans = self
            .client
            .select(
                &Query::table(PLANS_TABLE)
                    .select("*")
                    .in_list("id", &plan_ids)
                    .order_asc("nombre"),
            )
            .await
            .context("No se pudieron cargar los planes")?;

        Ok(&self.plans)
    }

    pub async fn get(&self, id: &str) -> Result<TrainingPlan> {
        let query = Query::table(PLANS_TABLE).select("*").eq("id", id);
        self.client.select_single(&query).await
    }

    /// A plan the user may look at: trainers see their own plans, trainees the
    /// plans assigned to them. Anything else reads as not found.
    pub async fn get_visible(&self, id: &str, user: &UserProfile) -> Result<TrainingPlan> {
        let mut query = Query::table(PLANS_TABLE).select("*").eq("id", id);

        if user.is_trainer() {
            query = query.eq("entrenador_id", &user.id);
        } else if !self.is_assigned(id, &user.id).await? {
            tracing::debug!("Plan {} is not assigned to {}", id, user.id);
            return Err(ApiError::NotFound(format!("plan {}", id)).into());
        }

        self.client.select_single(&query).await
    }

    async fn is_assigned(&self, plan_id: &str, user_id: &str) -> Result<bool> {
        let rows: Vec<PlanAssignment> = self
            .client
            .select(
                &Query::table(ASSIGNMENTS_TABLE)
                    .select("*")
                    .eq("plan_id", plan_id)
                    .eq("usuario_id", user_id),
            )
            .await
            .context("No se pudieron cargar los planes asignados")?;

        Ok(!rows.is_empty())
    }

    /// Ids of the routines currently associated with a plan
    pub async fn routine_ids(&self, plan_id: &str) -> Result<BTreeSet<String>> {
        let links: Vec<PlanRoutine> = self
            .client
            .select(
                &Query::table(PLAN_ROUTINES_TABLE)
                    .select("*")
                    .eq("plan_id", plan_id),
            )
            .await
            .context("No se pudieron cargar las rutinas del plan")?;

        Ok(links.into_iter().map(|l| l.rutina_id).collect())
    }

    /// Routines of a plan: join-table ids first, then the routine rows
    pub async fn routines_of(&self, plan_id: &str) -> Result<Vec<Routine>> {
        let ids = self.routine_ids(plan_id).await?;

        self.client
            .select(
                &Query::table(ROUTINES_TABLE)
                    .select("*")
                    .in_list("id", &ids)
                    .order_desc("created_at"),
            )
            .await
            .context("No se pudieron cargar las rutinas del plan")
    }

    /// Insert a plan and link the selected routines
    pub async fn create(&mut self, form: PlanForm, trainer: &UserProfile) -> Result<TrainingPlan> {
        require_trainer(trainer)?;
        form.validate()?;

        let new_plan = NewPlan {
            nombre: form.nombre.trim().to_string(),
            descripcion: form.descripcion.trim().to_string(),
            entrenador_id: trainer.id.clone(),
        };

        let created: Vec<TrainingPlan> = self
            .client
            .insert(PLANS_TABLE, &new_plan)
            .await
            .context("No se pudo crear el plan")?;

        let plan = created
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Unknown("Insert returned no rows".to_string()))?;

        self.replace_routines(&plan.id, form.selected()).await?;

        tracing::info!("Created plan {} with {} routines", plan.id, form.selected().len());
        self.plans.push(plan.clone());
        Ok(plan)
    }

    /// Update name/description and replace the plan's routine set
    pub async fn update(&mut self, id: &str, form: PlanForm, trainer: &UserProfile) -> Result<TrainingPlan> {
        require_trainer(trainer)?;
        form.validate()?;

        let changes = PlanChanges {
            nombre: form.nombre.trim().to_string(),
            descripcion: form.descripcion.trim().to_string(),
        };

        let query = Query::table(PLANS_TABLE)
            .eq("id", id)
            .eq("entrenador_id", &trainer.id);

        let updated: Vec<TrainingPlan> = self
            .client
            .update(&query, &changes)
            .await
            .context("No se pudo actualizar el plan")?;

        // Zero rows back means the row is gone or belongs to someone else
        let plan = updated
            .into_iter()
            .next()
            .ok_or(AccessError::NotOwner("este plan"))?;

        let diff = self.replace_routines(&plan.id, form.selected()).await?;

        tracing::info!(
            "Updated plan {} (+{} / -{} routines)",
            plan.id,
            diff.to_insert.len(),
            diff.to_delete.len()
        );

        match self.plans.iter_mut().find(|p| p.id == plan.id) {
            Some(slot) => *slot = plan.clone(),
            None => self.plans.push(plan.clone()),
        }
        Ok(plan)
    }

    /// Make the plan's routine set equal to `desired`, touching only the
    /// join rows that differ. Resubmitting the current set writes nothing.
    pub async fn replace_routines(&self, plan_id: &str, desired: &BTreeSet<String>) -> Result<RoutineSetDiff> {
        let current = self.routine_ids(plan_id).await?;
        let diff = RoutineSetDiff::between(&current, desired);

        if diff.is_empty() {
            tracing::debug!("Routine set of plan {} unchanged", plan_id);
            return Ok(diff);
        }

        if !diff.to_delete.is_empty() {
            self.client
                .delete(
                    &Query::table(PLAN_ROUTINES_TABLE)
                        .eq("plan_id", plan_id)
                        .in_list("rutina_id", &diff.to_delete),
                )
                .await
                .context("No se pudieron quitar rutinas del plan")?;
        }

        if !diff.to_insert.is_empty() {
            let rows: Vec<PlanRoutine> = diff
                .to_insert
                .iter()
                .map(|rutina_id| PlanRoutine {
                    plan_id: plan_id.to_string(),
                    rutina_id: rutina_id.clone(),
                })
                .collect();

            let _: Vec<PlanRoutine> = self
                .client
                .insert(PLAN_ROUTINES_TABLE, &rows)
                .await
                .context("No se pudieron asociar rutinas al plan")?;
        }

        Ok(diff)
    }

    /// Delete a plan together with its routine links and assignments
    pub async fn delete(&mut self, id: &str, trainer: &UserProfile) -> Result<()> {
        require_trainer(trainer)?;

        let plan = self.get(id).await?;
        require_owner(&plan, trainer)?;

        self.client
            .delete(&Query::table(PLAN_ROUTINES_TABLE).eq("plan_id", id))
            .await
            .context("No se pudieron quitar las rutinas del plan")?;

        self.client
            .delete(&Query::table(ASSIGNMENTS_TABLE).eq("plan_id", id))
            .await
            .context("No se pudieron quitar las asignaciones del plan")?;

        self.client
            .delete(
                &Query::table(PLANS_TABLE)
                    .eq("id", id)
                    .eq("entrenador_id", &trainer.id),
            )
            .await
            .context("No se pudo eliminar el plan")?;

        tracing::info!("Deleted plan {}", id);
        self.plans.retain(|p| p.id != id);
        Ok(())
    }

    /// Trainees assigned to a plan
    pub async fn assigned_users(&self, plan_id: &str) -> Result<Vec<UserProfile>> {
        let assignments = self.assignments(plan_id).await?;
        let user_ids: Vec<String> = assignments.into_iter().map(|a| a.usuario_id).collect();
        SessionService::new(self.client).profiles(&user_ids).await
    }

    async fn assignments(&self, plan_id: &str) -> Result<Vec<PlanAssignment>> {
        self.client
            .select(
                &Query::table(ASSIGNMENTS_TABLE)
                    .select("*")
                    .eq("plan_id", plan_id),
            )
            .await
            .context("No se pudieron cargar las asignaciones del plan")
    }

    /// Assign a plan to a trainee. Returns false if already assigned.
    pub async fn assign(&self, plan_id: &str, trainee_id: &str, trainer: &UserProfile) -> Result<bool> {
        require_trainer(trainer)?;

        let plan = self.get(plan_id).await?;
        require_owner(&plan, trainer)?;

        let trainee = SessionService::new(self.client).profile(trainee_id).await?;
        if trainee.rol != Role::Usuario {
            return Err(ValidationError::NotATrainee(trainee_id.to_string()).into());
        }

        let already = self
            .assignments(plan_id)
            .await?
            .iter()
            .any(|a| a.usuario_id == trainee_id);
        if already {
            tracing::debug!("Trainee {} already assigned to plan {}", trainee_id, plan_id);
            return Ok(false);
        }

        let row = PlanAssignment {
            plan_id: plan_id.to_string(),
            usuario_id: trainee_id.to_string(),
        };
        let _: Vec<PlanAssignment> = self
            .client
            .insert(ASSIGNMENTS_TABLE, &row)
            .await
            .context("No se pudo asignar el plan")?;

        tracing::info!("Assigned plan {} to {}", plan_id, trainee_id);
        Ok(true)
    }

    pub async fn unassign(&self, plan_id: &str, trainee_id: &str, trainer: &UserProfile) -> Result<()> {
        require_trainer(trainer)?;

        let plan = self.get(plan_id).await?;
        require_owner(&plan, trainer)?;

        self.client
            .delete(
                &Query::table(ASSIGNMENTS_TABLE)
                    .eq("plan_id", plan_id)
                    .eq("usuario_id", trainee_id),
            )
            .await
            .context("No se pudo quitar la asignación")?;

        tracing::info!("Unassigned plan {} from {}", plan_id, trainee_id);
        Ok(())
    }
}
