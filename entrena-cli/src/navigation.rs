use crate::models::Role;

/// Top-level sections of the app, shown according to role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Inicio,
    MisRutinas,
    MisPlanes,
    RutinasAsignadas,
    Progreso,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Inicio => "Inicio",
            Section::MisRutinas => "Mis Rutinas",
            Section::MisPlanes => "Mis Planes",
            Section::RutinasAsignadas => "Rutinas",
            Section::Progreso => "Mi Progreso",
        }
    }

    /// Command that renders this section
    pub fn command(&self) -> &'static str {
        match self {
            Section::Inicio => "entrena whoami",
            Section::MisRutinas => "entrena routine list",
            Section::MisPlanes => "entrena plan list",
            Section::RutinasAsignadas => "entrena routine list",
            Section::Progreso => "entrena plan list",
        }
    }
}

pub fn visible_sections(role: Option<Role>) -> Vec<Section> {
    match role {
        Some(Role::Entrenador) => vec![Section::Inicio, Section::MisRutinas, Section::MisPlanes],
        Some(Role::Usuario) => vec![
            Section::Inicio,
            Section::RutinasAsignadas,
            Section::Progreso,
        ],
        None => vec![Section::Inicio],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_by_role() {
        assert_eq!(
            visible_sections(Some(Role::Entrenador)),
            vec![Section::Inicio, Section::MisRutinas, Section::MisPlanes]
        );
        assert_eq!(
            visible_sections(Some(Role::Usuario)),
            vec![Section::Inicio, Section::RutinasAsignadas, Section::Progreso]
        );
        assert_eq!(visible_sections(None), vec![Section::Inicio]);
    }

    #[test]
    fn test_trainee_never_sees_trainer_sections() {
        let sections = visible_sections(Some(Role::Usuario));
        assert!(!sections.contains(&Section::MisRutinas));
        assert!(!sections.contains(&Section::MisPlanes));
    }
}
