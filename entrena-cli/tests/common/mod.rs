#![allow(dead_code)]

use entrena_cli::api::BackendClient;
use entrena_cli::config::Config;
use entrena_cli::models::{Role, UserProfile};
use serde_json::{json, Value};

pub const ANON_KEY: &str = "anon-key";
pub const ACCESS_TOKEN: &str = "access-token";
pub const TRAINER_ID: &str = "t1";
pub const OTHER_TRAINER_ID: &str = "t2";
pub const TRAINEE_ID: &str = "u1";

/// Config pointing at a mock server with a stored session for `user_id`
pub fn config_for(url: &str, user_id: &str) -> Config {
    let mut config = Config::default();
    config.backend.url = url.to_string();
    config.backend.anon_key = ANON_KEY.to_string();
    config.set_session(
        ACCESS_TOKEN.to_string(),
        "refresh-token".to_string(),
        user_id.to_string(),
    );
    config
}

pub fn client_for(url: &str, user_id: &str) -> BackendClient {
    BackendClient::new(config_for(url, user_id)).expect("client")
}

pub fn profile(id: &str, rol: Role) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        rol,
        nombre: Some(format!("Perfil {}", id)),
        email: None,
    }
}

pub fn trainer() -> UserProfile {
    profile(TRAINER_ID, Role::Entrenador)
}

pub fn trainee() -> UserProfile {
    profile(TRAINEE_ID, Role::Usuario)
}

pub fn profile_json(id: &str, rol: &str) -> Value {
    json!({ "id": id, "rol": rol, "nombre": format!("Perfil {}", id) })
}

pub fn routine_json(id: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "titulo": format!("Rutina {}", id),
        "descripcion": "3 series de 12",
        "entrenador_id": owner,
        "created_at": "2025-03-01T10:00:00+00:00"
    })
}

pub fn plan_json(id: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "nombre": format!("Plan {}", id),
        "descripcion": "Cuatro semanas",
        "entrenador_id": owner
    })
}

pub fn link_json(plan_id: &str, rutina_id: &str) -> Value {
    json!({ "plan_id": plan_id, "rutina_id": rutina_id })
}

pub fn assignment_json(plan_id: &str, usuario_id: &str) -> Value {
    json!({ "plan_id": plan_id, "usuario_id": usuario_id })
}

pub fn no_rows_body() -> String {
    json!({
        "code": "PGRST116",
        "details": "The result contains 0 rows",
        "hint": null,
        "message": "JSON object requested, multiple (or no) rows returned"
    })
    .to_string()
}
