use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::routine::Routine;
use super::validation::{is_filled, ValidationError};

/// Row of the `planes_entrenamiento` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    /// Owning trainer
    pub entrenador_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TrainingPlan {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.entrenador_id == user_id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlan {
    pub nombre: String,
    pub descripcion: String,
    pub entrenador_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanChanges {
    pub nombre: String,
    pub descripcion: String,
}

/// Row of the `plan_rutina` join table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanRoutine {
    pub plan_id: String,
    pub rutina_id: String,
}

/// Row of the `plan_usuario` assignment table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanAssignment {
    pub plan_id: String,
    pub usuario_id: String,
}

/// Join-table writes needed to move a plan from one routine set to another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineSetDiff {
    pub to_insert: Vec<String>,
    pub to_delete: Vec<String>,
}

impl RoutineSetDiff {
    pub fn between(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            to_insert: desired.difference(current).cloned().collect(),
            to_delete: current.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Local form state of the plan create/edit screens
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    pub nombre: String,
    pub descripcion: String,
    selected: BTreeSet<String>,
}

impl PlanForm {
    pub fn new(nombre: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            descripcion: descripcion.into(),
            selected: BTreeSet::new(),
        }
    }

    /// Prefill from a plan and the routines currently associated with it
    pub fn from_plan<I, S>(plan: &TrainingPlan, routine_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(plan.nombre.clone(), plan.descripcion.clone()).with_routines(routine_ids)
    }

    pub fn with_routines<I, S>(mut self, routine_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = routine_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Select the routine if unselected, unselect it otherwise
    pub fn toggle(&mut self, routine_id: &str) {
        if !self.selected.remove(routine_id) {
            self.selected.insert(routine_id.to_string());
        }
    }

    pub fn is_selected(&self, routine_id: &str) -> bool {
        self.selected.contains(routine_id)
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_filled(&self.nombre) || !is_filled(&self.descripcion) || self.selected.is_empty() {
            return Err(ValidationError::IncompletePlan);
        }
        Ok(())
    }

    /// Every selected routine must come from the trainer's own list
    pub fn check_routines_in(&self, own: &[Routine]) -> Result<(), ValidationError> {
        match self
            .selected
            .iter()
            .find(|id| !own.iter().any(|r| &r.id == *id))
        {
            Some(id) => Err(ValidationError::ForeignRoutine(id.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_selects_and_unselects() {
        let mut form = PlanForm::new("Base", "Semana 1");
        form.toggle("r1");
        form.toggle("r2");
        assert!(form.is_selected("r1"));
        form.toggle("r1");
        assert!(!form.is_selected("r1"));
        assert_eq!(form.selected(), &set(&["r2"]));
    }

    #[test]
    fn test_plan_needs_at_least_one_routine() {
        let form = PlanForm::new("Base", "Semana 1");
        assert_eq!(form.validate(), Err(ValidationError::IncompletePlan));

        let form = form.with_routines(["r1"]);
        assert!(form.validate().is_ok());

        let form = PlanForm::new("", "Semana 1").with_routines(["r1"]);
        assert_eq!(form.validate(), Err(ValidationError::IncompletePlan));
    }

    #[test]
    fn test_selection_limited_to_own_routines() {
        let own = vec![Routine {
            id: "r1".into(),
            titulo: "Piernas".into(),
            descripcion: "Sentadillas".into(),
            entrenador_id: "t1".into(),
            created_at: Utc::now(),
            imagen_url: None,
        }];

        let form = PlanForm::new("Base", "Semana 1").with_routines(["r1"]);
        assert!(form.check_routines_in(&own).is_ok());

        let form = form.with_routines(["r1", "r9"]);
        assert_eq!(
            form.check_routines_in(&own),
            Err(ValidationError::ForeignRoutine("r9".into()))
        );
        assert!(PlanForm::new("Base", "Semana 1")
            .with_routines(["r1"])
            .check_routines_in(&[])
            .is_err());
    }

    #[test]
    fn test_diff_replaces_set() {
        let diff = RoutineSetDiff::between(&set(&["a", "b", "c"]), &set(&["b", "d"]));
        assert_eq!(diff.to_insert, vec!["d".to_string()]);
        assert_eq!(diff.to_delete, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_diff_same_set_is_empty() {
        let current = set(&["a", "b"]);
        assert!(RoutineSetDiff::between(&current, &current.clone()).is_empty());
    }
}
