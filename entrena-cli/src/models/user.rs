use serde::{Deserialize, Serialize};

/// Role stored in `usuarios.rol`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Trainer: owns routines and plans
    Entrenador,
    /// Trainee: reads what is assigned to them
    Usuario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Entrenador => "entrenador",
            Role::Usuario => "usuario",
        }
    }

    pub fn is_trainer(&self) -> bool {
        matches!(self, Role::Entrenador)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Entrenador => write!(f, "Entrenador"),
            Role::Usuario => write!(f, "Usuario"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entrenador" => Ok(Role::Entrenador),
            "usuario" => Ok(Role::Usuario),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Row of the `usuarios` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub rol: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn is_trainer(&self) -> bool {
        self.rol.is_trainer()
    }

    /// Name to show in lists, falling back to email and then id
    pub fn display_name(&self) -> &str {
        self.nombre
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":"u1","rol":"entrenador"}"#).unwrap();
        assert_eq!(profile.rol, Role::Entrenador);
        assert!(profile.is_trainer());
        assert_eq!(profile.display_name(), "u1");

        let json = serde_json::to_string(&Role::Usuario).unwrap();
        assert_eq!(json, "\"usuario\"");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed = serde_json::from_str::<UserProfile>(r#"{"id":"u1","rol":"admin"}"#);
        assert!(parsed.is_err());
        assert!("ADMIN".parse::<Role>().is_err());
        assert_eq!("Entrenador".parse::<Role>().unwrap(), Role::Entrenador);
    }
}
