pub mod media_service;
pub mod plan_service;
pub mod routine_service;
pub mod session_service;

pub use plan_service::PlanService;
pub use routine_service::RoutineService;
pub use session_service::SessionService;

pub const ROUTINES_TABLE: &str = "rutinas";
pub const PLANS_TABLE: &str = "planes_entrenamiento";
pub const PLAN_ROUTINES_TABLE: &str = "plan_rutina";
pub const ASSIGNMENTS_TABLE: &str = "plan_usuario";
pub const USERS_TABLE: &str = "usuarios";
