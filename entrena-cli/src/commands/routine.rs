use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::access::require_owner;
use crate::models::{Routine, RoutineForm};
use crate::services::RoutineService;

use super::context::AppContext;
use super::ui;

/// Form fields shared by `routine create` and `routine edit`
#[derive(Args)]
pub struct RoutineFormArgs {
    /// Routine title
    #[arg(short, long)]
    titulo: Option<String>,

    /// Routine description
    #[arg(short, long)]
    descripcion: Option<String>,

    /// Demonstration image or video to upload
    #[arg(short, long)]
    media: Option<PathBuf>,
}

impl RoutineFormArgs {
    fn into_form(self, initial: &RoutineForm) -> Result<RoutineForm> {
        let titulo = ui::text_or_prompt(self.titulo, "Título de la rutina", &initial.titulo)?;
        let descripcion = ui::text_or_prompt(self.descripcion, "Descripción", &initial.descripcion)?;
        Ok(RoutineForm::new(titulo, descripcion).with_media(self.media))
    }
}

fn print_routine_line(routine: &Routine) {
    let media = if routine.imagen_url.is_some() { " 📷" } else { "" };
    println!(
        "  {}  {}{}",
        routine.id.dimmed(),
        routine.titulo.bold(),
        media
    );
    println!("      {}", routine.descripcion);
}

pub async fn list_routines(ctx: &AppContext) -> Result<()> {
    let (client, profile) = ctx.session().await?;
    let mut service = RoutineService::new(&client);

    let pb = ui::spinner("Cargando rutinas...");
    let loaded = if profile.is_trainer() {
        service.load_for_trainer(&profile.id).await.map(|r| r.len())
    } else {
        service.load_assigned(&profile.id).await.map(|r| r.len())
    };
    pb.finish_and_clear();
    loaded?;

    if profile.is_trainer() {
        ui::header("Mis Rutinas");
    } else {
        ui::header("Rutinas asignadas");
    }

    if service.routines().is_empty() {
        if profile.is_trainer() {
            println!("Aún no has creado rutinas.");
            ui::next_step("entrena routine create");
        } else {
            println!("No tienes rutinas asignadas.");
        }
        return Ok(());
    }

    for routine in service.routines() {
        print_routine_line(routine);
    }

    Ok(())
}

pub async fn show_routine(ctx: &AppContext, id: &str) -> Result<()> {
    let (client, profile) = ctx.session().await?;
    let service = RoutineService::new(&client);

    let routine = service
        .get_visible(id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Rutina no encontrada"))?;

    ui::header(&routine.titulo);
    println!("{}", routine.descripcion);
    println!();
    println!("  ID:      {}", routine.id);
    println!("  Creada:  {}", routine.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(url) = &routine.imagen_url {
        println!("  Media:   {}", url);
    }

    Ok(())
}

pub async fn create_routine(ctx: &AppContext, args: RoutineFormArgs) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut service = RoutineService::new(&client);

    ui::header("Nueva Rutina");
    let form = args.into_form(&RoutineForm::default())?;

    let pb = ui::spinner("Creando rutina...");
    let created = service.create(form, &profile).await;
    pb.finish_and_clear();
    let routine = created?;

    ui::success("Rutina creada correctamente");
    println!("  {} ({})", routine.titulo, routine.id);
    ui::next_step("entrena routine list");

    Ok(())
}

pub async fn edit_routine(ctx: &AppContext, id: &str, args: RoutineFormArgs) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut service = RoutineService::new(&client);

    let routine = service
        .get(id)
        .await
        .map_err(|e| ui::label_not_found(e, "Rutina no encontrada"))?;
    require_owner(&routine, &profile)?;

    ui::header("Editar Rutina");
    let form = args.into_form(&RoutineForm::from_routine(&routine))?;

    let pb = ui::spinner("Guardando cambios...");
    let updated = service.update(id, form, &profile).await;
    pb.finish_and_clear();
    updated?;

    ui::success("Rutina actualizada correctamente");
    ui::next_step("entrena routine list");

    Ok(())
}

pub async fn delete_routine(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    let (client, profile) = ctx.trainer_session().await?;
    let mut service = RoutineService::new(&client);

    if !ui::confirm(&format!("¿Eliminar la rutina {}?", id), force)? {
        println!("Cancelado");
        return Ok(());
    }

    service
        .delete(id, &profile)
        .await
        .map_err(|e| ui::label_not_found(e, "Rutina no encontrada"))?;
    ui::success("Rutina eliminada");

    Ok(())
}
