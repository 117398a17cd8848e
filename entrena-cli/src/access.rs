//! Role and ownership gates shared by every create/edit command.
//!
//! The backend's row-level security is the authority; these checks only keep
//! the client from offering screens and requests that would be refused.

use thiserror::Error;

use crate::models::UserProfile;

pub const TRAINER_ONLY_MESSAGE: &str = "Esta sección es solo para entrenadores 🏋️‍♂️";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Usuario no autenticado")]
    NotLoggedIn,

    #[error("Esta sección es solo para entrenadores 🏋️‍♂️")]
    TrainerOnly,

    #[error("No tienes permiso para editar {0}")]
    NotOwner(&'static str),
}

/// Anything with an owning trainer
pub trait Owned {
    fn owner_id(&self) -> &str;
    /// Noun used in the denial message, with article
    fn noun() -> &'static str;
}

impl Owned for crate::models::Routine {
    fn owner_id(&self) -> &str {
        &self.entrenador_id
    }

    fn noun() -> &'static str {
        "esta rutina"
    }
}

impl Owned for crate::models::TrainingPlan {
    fn owner_id(&self) -> &str {
        &self.entrenador_id
    }

    fn noun() -> &'static str {
        "este plan"
    }
}

pub fn require_trainer(user: &UserProfile) -> Result<(), AccessError> {
    if user.is_trainer() {
        Ok(())
    } else {
        Err(AccessError::TrainerOnly)
    }
}

pub fn require_owner<T: Owned>(item: &T, user: &UserProfile) -> Result<(), AccessError> {
    if item.owner_id() == user.id {
        Ok(())
    } else {
        Err(AccessError::NotOwner(T::noun()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TrainingPlan};

    fn profile(id: &str, rol: Role) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            rol,
            nombre: None,
            email: None,
        }
    }

    #[test]
    fn test_trainee_is_denied_with_fixed_message() {
        let err = require_trainer(&profile("u1", Role::Usuario)).unwrap_err();
        assert_eq!(err, AccessError::TrainerOnly);
        assert_eq!(err.to_string(), TRAINER_ONLY_MESSAGE);
        assert!(require_trainer(&profile("t1", Role::Entrenador)).is_ok());
    }

    #[test]
    fn test_owner_check() {
        let plan = TrainingPlan {
            id: "p1".into(),
            nombre: "Base".into(),
            descripcion: "Semana 1".into(),
            entrenador_id: "t1".into(),
            created_at: None,
        };
        assert!(require_owner(&plan, &profile("t1", Role::Entrenador)).is_ok());

        let err = require_owner(&plan, &profile("t2", Role::Entrenador)).unwrap_err();
        assert_eq!(err.to_string(), "No tienes permiso para editar este plan");
    }
}
