use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::MultiSelect;

use crate::access::require_owner;
use crate::models::{PlanForm, Routine, TrainingPlan};
use crate::services::{PlanService, RoutineService};

use super::context::AppContext;
use super::ui;

/// Form fields shared by `plan create` and `plan edit`
#[derive(Args)]
pub struct PlanFormArgs {
    /// Plan name
    #[arg(short, long)]
    nombre: Option<String>,

    /// Plan description
    #[arg(short, long)]
    descripcion: Option<String>,

    /// Routine to include; repeat to give the full set
    #[arg(short, long = "routine", value_name = "ROUTINE_ID")]
    routines: Vec<String>,

    /// Flip one routine in or out of the current selection
    #[arg(long, value_name = "ROUTINE_ID", conflicts_with = "routines")]
    toggle: Vec<String>,
}

impl PlanFormArgs {
    /// Merge flags and prompts over the initial form state
    fn into_form(self, initial: PlanForm, available: &[Routine]) -> Result<PlanForm> {
        let nombre = ui::text_or_prompt(self.nombre, "Nombre del plan", &initial.nombre)?;
        let descripcion = ui::text_or_prompt(self.descripcion, "Descripción", &initial.descripcion)?;

        let mut form = PlanForm::new(nombre, descripcion);

        if !self.routines.is_empty() {
            form = form.with_routines(self.routines);
        } else {
            form = form.with_routines(initial.selected().iter().cloned());
            if !self.toggle.is_empty() {
                for id in &self.toggle {
                    form.toggle(id);
                }
            } else if ui::is_interactive() && !available.is_empty() {
                form = select_routines(form, available)?;
            }
        }

        form.check_routines_in(available)?;
        Ok(form)
    }
}

fn select_routines(mut form: PlanForm, available: &[Routine]) -> Result<PlanForm> {
    let items: Vec<String> = available
        .iter()
        .map(|r| format!("{} — {}", r.titulo, r.descripcion))
        .collect();
    let defaults: Vec<bool> = available.iter().map(|r| form.is_selected(&r.id)).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Selecciona Rutinas (espacio para marcar)")
        .items(&items)
        .defaults(&defaults)
        .interact()?;

    for (idx, routine) in available.iter().enumerate() {
        if chosen.contains(&idx) != form.is_selected(&routine.id) {
            form.toggle(&routine.id);
        }
    }
    Ok(form)
}

fn print_plan_line(plan: &TrainingPlan) {
    println!("  {}  {}", plan.id.dimmed(), plan.nombre.bold());
    println!("      {}", plan.descripcion);
}

pub async fn list_plans(ctx: &AppContext) -> Result<()> {
    let (client, profile) = ctx.session().await?;
    let mut service = PlanService::new(&client);

    let pb = ui::spinner("Cargando planes...");
    let loaded = if profile.is_trainer() {
        service.load_for_trainer(&profile.id).await.map(|p| p.len())
    } else {
        service.load_assigned(&profile.id).await.map(|p| p.len())
    };
    pb.finish_and_clear();
    loaded?;

    if profile.is_trainer() {
        ui::header("Mis Planes");
    } else {
        ui::header("Mis planes asignados");
    }

    if service.plans().is_empty() {
        if profile.is_trainer() {
            println!("Aún no has creado planes.");
            ui::next_step("entrena plan create");
        } else {
            println!("No tienes planes asignados.");
        }
        return Ok(());
    }

    for plan in service.plans() {
        print_plan_line(plan);
    }

    Ok(())
}

pub async fn show_plan(ctx: &AppContext, id: &str) -> Result<()> {
    let (client, profile) = ctx.session().await?;
    let service = PlanService::new(&client);

    let plan = service
        .get_visible(id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Plan no encontrado"))?;
    let routines = service.routines_of(&plan.id).await?;

    ui::header(&plan.nombre);
    println!("{}", plan.descripcion);
    println!();
    println!("Rutinas ({}):", routines.len());
    for routine in &routines {
        println!("  • {} {}", routine.titulo.bold(), routine.id.dimmed());
    }

    if plan.is_owned_by(&profile.id) {
        let trainees = service.assigned_users(&plan.id).await?;
        println!();
        println!("Asignado a ({}):", trainees.len());
        for trainee in &trainees {
            println!("  • {} {}", trainee.display_name(), trainee.id.dimmed());
        }
    }

    Ok(())
}

pub async fn create_plan(ctx: &AppContext, args: PlanFormArgs) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut routines = RoutineService::new(&client);
    let mut plans = PlanService::new(&client);

    routines.load_for_trainer(&profile.id).await?;
    if routines.routines().is_empty() {
        println!("No tienes rutinas para asignar");
        ui::next_step("entrena routine create");
    }

    ui::header("Nuevo Plan");
    let form = args.into_form(PlanForm::default(), routines.routines())?;

    let pb = ui::spinner("Creando plan...");
    let created = plans.create(form, &profile).await;
    pb.finish_and_clear();
    let plan = created?;

    ui::success("Plan creado correctamente");
    println!("  {} ({})", plan.nombre, plan.id);
    ui::next_step("entrena plan list");

    Ok(())
}

pub async fn edit_plan(ctx: &AppContext, id: &str, args: PlanFormArgs) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut routines = RoutineService::new(&client);
    let mut plans = PlanService::new(&client);

    let pb = ui::spinner("Cargando plan...");
    let loaded = plans.get(id).await;
    pb.finish_and_clear();
    let plan = loaded.map_err(|e| ui::label_not_found(e, "Plan no encontrado"))?;
    require_owner(&plan, &profile)?;

    let current = plans.routine_ids(&plan.id).await?;
    routines.load_for_trainer(&profile.id).await?;
    if routines.routines().is_empty() {
        println!("No tienes rutinas para asignar");
    }

    ui::header("Editar Plan");
    let form = args.into_form(PlanForm::from_plan(&plan, current), routines.routines())?;

    let pb = ui::spinner("Guardando cambios...");
    let updated = plans.update(&plan.id, form, &profile).await;
    pb.finish_and_clear();
    updated?;

    ui::success("Plan actualizado correctamente");
    ui::next_step("entrena plan list");

    Ok(())
}

pub async fn delete_plan(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut service = PlanService::new(&client);

    if !ui::confirm(&format!("¿Eliminar el plan {}?", id), force)? {
        println!("Cancelado");
        return Ok(());
    }

    service
        .delete(id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Plan no encontrado"))?;
    ui::success("Plan eliminado");

    Ok(())
}

pub async fn assign_plan(ctx: &AppContext, id: &str, trainee_id: &str) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let service = PlanService::new(&client);

    let inserted = service
        .assign(id, trainee_id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Plan o usuario no encontrado"))?;

    if inserted {
        ui::success("Plan asignado correctamente");
    } else {
        println!("El usuario ya tenía este plan asignado.");
    }

    Ok(())
}

pub async fn unassign_plan(ctx: &AppContext, id: &str, trainee_id: &str) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let service = PlanService::new(&client);

    service
        .unassign(id, trainee_id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Plan no encontrado"))?;
    ui::success("Asignación eliminada");

    Ok(())
}
