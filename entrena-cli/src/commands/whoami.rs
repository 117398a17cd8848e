use anyhow::Result;
use clap::Args;

use crate::navigation::visible_sections;

use super::context::AppContext;
use super::ui;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let config = ctx.load_config()?;

        if !config.is_authenticated() {
            println!("No has iniciado sesión.");
            println!();
            println!("Secciones disponibles:");
            for section in visible_sections(None) {
                println!("  {:<14} {}", section.title(), section.command());
            }
            ui::next_step("entrena login");
            return Ok(());
        }

        let (_client, profile) = ctx.session().await?;

        ui::header("Sesión actual");
        println!("  Nombre: {}", profile.display_name());
        if let Some(email) = &profile.email {
            println!("  Email:  {}", email);
        }
        println!("  Rol:    {}", profile.rol);
        println!("  ID:     {}", profile.id);
        println!();
        println!("Secciones disponibles:");
        for section in visible_sections(Some(profile.rol)) {
            println!("  {:<14} {}", section.title(), section.command());
        }

        Ok(())
    }
}
