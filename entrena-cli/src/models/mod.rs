pub mod plan;
pub mod routine;
pub mod user;
pub mod validation;

pub use plan::{NewPlan, PlanAssignment, PlanChanges, PlanForm, PlanRoutine, RoutineSetDiff, TrainingPlan};
pub use routine::{NewRoutine, Routine, RoutineChanges, RoutineForm};
pub use user::{Role, UserProfile};
pub use validation::ValidationError;
