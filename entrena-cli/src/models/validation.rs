use thiserror::Error;

/// Client-side form validation failures. Raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Completa todos los campos")]
    MissingRoutineFields,

    #[error("Completa todos los campos y selecciona al menos una rutina")]
    IncompletePlan,

    #[error("Formato de archivo no soportado: {0}")]
    UnsupportedMedia(String),

    #[error("La rutina {0} no está entre tus rutinas")]
    ForeignRoutine(String),

    #[error("El usuario {0} no tiene rol de alumno")]
    NotATrainee(String),
}

/// A required text field counts as filled only if it has non-whitespace content
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}
