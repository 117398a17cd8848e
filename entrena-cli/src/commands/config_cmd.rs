use anyhow::Result;

use crate::config::Config;

use super::context::AppContext;
use super::ui;

pub async fn show_config(ctx: &AppContext) -> Result<()> {
    let mut config = ctx.load_config()?;
    config.backend = config.backend.effective();
    if !config.auth.access_token.is_empty() {
        config.auth.access_token = "********".to_string();
    }
    if !config.auth.refresh_token.is_empty() {
        config.auth.refresh_token = "********".to_string();
    }
    let config_str = toml::to_string_pretty(&config)?;

    ui::header("Configuración actual");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(ctx: &AppContext, force: bool) -> Result<()> {
    let config_file = Config::config_file(ctx.config_path.as_deref())?;

    if config_file.exists() && !force {
        println!(
            "Ya existe un archivo de configuración en: {}",
            config_file.display()
        );
        println!("Usa --force para sobrescribirlo");
        return Ok(());
    }

    let config = Config::default().with_path(&config_file);
    config.save()?;

    ui::success(&format!(
        "Configuración creada en: {}",
        config_file.display()
    ));
    println!();
    println!("Completa [backend] url y anon_key antes de iniciar sesión.");

    Ok(())
}
