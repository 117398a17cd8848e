use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::validation::{is_filled, ValidationError};

/// Row of the `rutinas` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: String,
    pub titulo: String,
    pub descripcion: String,
    /// Owning trainer
    pub entrenador_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

impl Routine {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.entrenador_id == user_id
    }
}

/// Insert payload for `rutinas`
#[derive(Debug, Clone, Serialize)]
pub struct NewRoutine {
    pub titulo: String,
    pub descripcion: String,
    pub entrenador_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

/// Update payload for `rutinas`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutineChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

/// Local form state of the routine create/edit screens
#[derive(Debug, Clone, Default)]
pub struct RoutineForm {
    pub titulo: String,
    pub descripcion: String,
    /// Local file to upload as demonstration media
    pub media: Option<PathBuf>,
}

impl RoutineForm {
    pub fn new(titulo: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            titulo: titulo.into(),
            descripcion: descripcion.into(),
            media: None,
        }
    }

    /// Prefill from an existing routine (edit screen)
    pub fn from_routine(routine: &Routine) -> Self {
        Self::new(routine.titulo.clone(), routine.descripcion.clone())
    }

    pub fn with_media(mut self, media: Option<PathBuf>) -> Self {
        self.media = media;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_filled(&self.titulo) || !is_filled(&self.descripcion) {
            return Err(ValidationError::MissingRoutineFields);
        }
        Ok(())
    }

    pub fn into_new_routine(self, entrenador_id: &str, imagen_url: Option<String>) -> NewRoutine {
        NewRoutine {
            titulo: self.titulo.trim().to_string(),
            descripcion: self.descripcion.trim().to_string(),
            entrenador_id: entrenador_id.to_string(),
            imagen_url,
        }
    }

    pub fn into_changes(self, imagen_url: Option<String>) -> RoutineChanges {
        RoutineChanges {
            titulo: Some(self.titulo.trim().to_string()),
            descripcion: Some(self.descripcion.trim().to_string()),
            imagen_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_title_and_description() {
        assert_eq!(
            RoutineForm::new("", "Sentadillas").validate(),
            Err(ValidationError::MissingRoutineFields)
        );
        assert_eq!(
            RoutineForm::new("Piernas", "  ").validate(),
            Err(ValidationError::MissingRoutineFields)
        );
        assert!(RoutineForm::new("Piernas", "Sentadillas 4x10").validate().is_ok());
    }

    #[test]
    fn test_changes_skip_missing_image() {
        let changes = RoutineForm::new(" Piernas ", "Sentadillas").into_changes(None);
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json["titulo"], "Piernas");
        assert!(json.get("imagen_url").is_none());
    }

    #[test]
    fn test_routine_row_without_image() {
        let routine: Routine = serde_json::from_str(
            r#"{"id":"r1","titulo":"Core","descripcion":"Plancha","entrenador_id":"t1","created_at":"2025-03-01T10:00:00+00:00"}"#,
        )
        .unwrap();
        assert!(routine.imagen_url.is_none());
        assert!(routine.is_owned_by("t1"));
        assert!(!routine.is_owned_by("t2"));
    }
}
