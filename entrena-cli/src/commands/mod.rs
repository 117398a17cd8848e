mod config_cmd;
mod context;
mod login;
mod logout;
mod plan;
mod routine;
pub mod ui;
mod whoami;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use context::AppContext;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use plan::PlanFormArgs;
pub use routine::RoutineFormArgs;
pub use whoami::WhoamiCommand;

#[derive(Parser)]
#[command(name = "entrena")]
#[command(about = "Rutinas y planes de entrenamiento para entrenadores y alumnos", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "ENTRENA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login(LoginCommand),

    /// Sign out and forget the stored session
    Logout(LogoutCommand),

    /// Show the current user, role and available sections
    Whoami(WhoamiCommand),

    /// Manage workout routines
    #[command(subcommand)]
    Routine(RoutineSubcommands),

    /// Manage training plans
    #[command(subcommand)]
    Plan(PlanSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum RoutineSubcommands {
    /// List own routines (trainers) or assigned routines (trainees)
    List,

    /// Show routine details
    Show {
        /// Routine ID
        id: String,
    },

    /// Create a routine (trainers only)
    Create(RoutineFormArgs),

    /// Edit a routine (owner only)
    Edit {
        /// Routine ID
        id: String,

        #[command(flatten)]
        form: RoutineFormArgs,
    },

    /// Delete a routine (owner only)
    Delete {
        /// Routine ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum PlanSubcommands {
    /// List own plans (trainers) or assigned plans (trainees)
    List,

    /// Show plan details with its routines
    Show {
        /// Plan ID
        id: String,
    },

    /// Create a plan (trainers only)
    Create(PlanFormArgs),

    /// Edit a plan and replace its routines (owner only)
    Edit {
        /// Plan ID
        id: String,

        #[command(flatten)]
        form: PlanFormArgs,
    },

    /// Delete a plan (owner only)
    Delete {
        /// Plan ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Assign a plan to a trainee (owner only)
    Assign {
        /// Plan ID
        id: String,

        /// Trainee user ID
        user_id: String,
    },

    /// Remove a trainee from a plan (owner only)
    Unassign {
        /// Plan ID
        id: String,

        /// Trainee user ID
        user_id: String,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let ctx = AppContext::new(self.config);

        match self.command {
            Commands::Login(cmd) => cmd.execute(&ctx).await,
            Commands::Logout(cmd) => cmd.execute(&ctx).await,
            Commands::Whoami(cmd) => cmd.execute(&ctx).await,
            Commands::Routine(subcmd) => match subcmd {
                RoutineSubcommands::List => routine::list_routines(&ctx).await,
                RoutineSubcommands::Show { id } => routine::show_routine(&ctx, &id).await,
                RoutineSubcommands::Create(form) => routine::create_routine(&ctx, form).await,
                RoutineSubcommands::Edit { id, form } => {
                    routine::edit_routine(&ctx, &id, form).await
                }
                RoutineSubcommands::Delete { id, force } => {
                    routine::delete_routine(&ctx, &id, force).await
                }
            },
            Commands::Plan(subcmd) => match subcmd {
                PlanSubcommands::List => plan::list_plans(&ctx).await,
                PlanSubcommands::Show { id } => plan::show_plan(&ctx, &id).await,
                PlanSubcommands::Create(form) => plan::create_plan(&ctx, form).await,
                PlanSubcommands::Edit { id, form } => plan::edit_plan(&ctx, &id, form).await,
                PlanSubcommands::Delete { id, force } => plan::delete_plan(&ctx, &id, force).await,
                PlanSubcommands::Assign { id, user_id } => {
                    plan::assign_plan(&ctx, &id, &user_id).await
                }
                PlanSubcommands::Unassign { id, user_id } => {
                    plan::unassign_plan(&ctx, &id, &user_id).await
                }
            },
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&ctx).await,
                ConfigSubcommands::Init { force } => config_cmd::init_config(&ctx, force).await,
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
