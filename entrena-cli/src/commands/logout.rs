use anyhow::Result;
use clap::Args;

use super::context::AppContext;
use super::ui;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let mut config = ctx.load_config()?;

        if !config.is_authenticated() {
            println!("No has iniciado sesión.");
            return Ok(());
        }

        config.clear_session();
        config.save()?;

        ui::success("Sesión cerrada");

        Ok(())
    }
}
