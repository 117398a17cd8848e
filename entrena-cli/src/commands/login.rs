use anyhow::Result;
use clap::Args;
use dialoguer::{Input, Password};

use crate::services::SessionService;

use super::context::AppContext;
use super::ui;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted if omitted)
    #[arg(short, long)]
    email: Option<String>,

    /// Password; prefer the prompt or ENTRENA_PASSWORD over the command line
    #[arg(long, env = "ENTRENA_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        println!("Entrena - Iniciar sesión");
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };

        let password = match self.password {
            Some(password) => password,
            None => Password::new().with_prompt("Contraseña").interact()?,
        };

        let client = ctx.client()?;
        let session = SessionService::new(&client);

        let pb = ui::spinner(&format!("Iniciando sesión como {}...", email));
        let profile = session.login(&email, &password).await;
        pb.finish_and_clear();
        let profile = profile?;

        ui::success("Sesión iniciada");
        println!();
        println!("Bienvenido, {}!", profile.display_name());
        println!("Rol: {}", profile.rol);
        ui::next_step("entrena whoami");

        Ok(())
    }
}
