//! Solar Console - terminal dashboard for solar plant monitoring
//!
//! - `init`: interactive configuration wizard
//! - `login` / `logout` / `whoami`: session persisted between runs
//! - `watch <screen>`: live, paginated, searchable tables
//! - `plant`, `admin`, `user`, `task`, `report`, `password`: mutations

mod commands;
mod prompt;
mod render;
mod screens;
mod session_store;
mod wizard;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use screens::{Screen, WatchOptions};
use session_store::SessionStore;
use solar_sync::config::DashboardConfig;
use solar_sync::logging::init_logging;
use solar_sync::{Dashboard, Role};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "solar-console", version, about = "Terminal dashboard for solar plant monitoring")]
struct Cli {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $SOLAR_DASHBOARD_CONFIG, then the OS config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the configuration wizard
    Init,
    /// Sign in and remember the session
    Login(LoginArgs),
    /// Forget the saved session
    Logout,
    /// Show the saved session
    Whoami,
    /// Live view of one screen
    Watch {
        #[arg(value_enum)]
        screen: Screen,
        /// Page to open once the first rows arrive
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        search: Option<String>,
        /// Print the first answer and exit
        #[arg(long)]
        once: bool,
    },
    /// Access-portal plant registry
    #[command(subcommand)]
    Plant(PlantCommand),
    /// Access-portal admin registry
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Users of the signed-in plant
    #[command(subcommand)]
    User(UserCommand),
    /// Maintenance tasks of the signed-in plant
    #[command(subcommand)]
    Task(TaskCommand),
    /// Request a plant report
    Report(ReportArgs),
    /// Password reset by one-time code
    #[command(subcommand)]
    Password(PasswordCommand),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long, value_parser = parse_role)]
    pub role: Role,
    /// Required for user sessions; plant screens need it for admins too
    #[arg(long)]
    pub plant: Option<String>,
    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse()
}

#[derive(Debug, Subcommand)]
pub enum PlantCommand {
    Register(PlantRegisterArgs),
    Update {
        plant_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
    },
    Delete {
        plant_id: String,
    },
}

#[derive(Debug, Args)]
pub struct PlantRegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub country: String,
    #[arg(long, default_value = "")]
    pub state: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub postal_code: String,
    /// `lat,lng`
    #[arg(long, default_value = "")]
    pub geolocation: String,
    #[arg(long, default_value = "")]
    pub contact_name: String,
    #[arg(long, default_value = "")]
    pub contact_phone: String,
    #[arg(long, default_value = "")]
    pub contact_email: String,
    #[arg(long, default_value = "")]
    pub smbs: String,
    #[arg(long, default_value = "")]
    pub strings: String,
    #[arg(long, default_value = "")]
    pub panels: String,
    #[arg(long, default_value = "")]
    pub capacity: String,
    #[arg(long, default_value = "Active")]
    pub status: String,
    /// Permits document uploaded with the form
    #[arg(long)]
    pub permits: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    Register {
        #[arg(long)]
        plant: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    Update {
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Delete {
        user_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    Update {
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Delete {
        user_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    Update {
        task_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Complete {
        task_id: String,
    },
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    pub from: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub to: String,
    /// Daily, Weekly, Monthly or Yearly
    #[arg(long = "type", default_value = "Daily")]
    pub report_type: String,
    /// analytics, faults or all
    #[arg(long = "data", default_value = "all")]
    pub data_type: String,
    /// SMB ids, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub smbs: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    SendOtp {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
    },
    VerifyOtp {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResendOtp {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
    },
    Reset {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
    },
}

async fn load_config(path: Option<&PathBuf>) -> Result<DashboardConfig> {
    let config = match path {
        Some(path) => DashboardConfig::load_from(path).await,
        None => DashboardConfig::load().await,
    };
    config.context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Init = cli.command {
        return wizard::SetupWizard::run().await;
    }

    if cli.config.is_none() && DashboardConfig::is_first_time_setup() {
        info!("No configuration found, using defaults (run `solar-console init` to create one)");
    }
    let config = load_config(cli.config.as_ref()).await?;
    let store = SessionStore::default_location()?;
    let session = store.load().await;
    let dashboard = Dashboard::new(config, session).context("Failed to build the API client")?;

    match cli.command {
        Command::Init => Ok(()),
        Command::Login(args) => commands::login(&dashboard, &store, args).await,
        Command::Logout => commands::logout(&dashboard, &store).await,
        Command::Whoami => {
            commands::whoami(&dashboard);
            Ok(())
        }
        Command::Watch { screen, page, search, once } => {
            screens::run(&dashboard, screen, WatchOptions { page, search, once }).await
        }
        Command::Plant(cmd) => commands::plant(&dashboard, cmd).await,
        Command::Admin(cmd) => commands::admin(&dashboard, cmd).await,
        Command::User(cmd) => commands::user(&dashboard, cmd).await,
        Command::Task(cmd) => commands::task(&dashboard, cmd).await,
        Command::Report(args) => commands::report(&dashboard, args).await,
        Command::Password(cmd) => commands::password(&dashboard, cmd).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_watch_and_report() {
        let cli = Cli::try_parse_from(["solar-console", "watch", "alert-history", "--page", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Watch { screen: Screen::AlertHistory, page: Some(2), .. }
        ));

        let cli = Cli::try_parse_from([
            "solar-console", "report", "--from", "2025-01-01", "--to", "2025-01-31", "--smbs", "1,2",
        ])
        .unwrap();
        match cli.command {
            Command::Report(args) => assert_eq!(args.smbs, vec!["1", "2"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn login_role_is_validated() {
        assert!(Cli::try_parse_from(["solar-console", "login", "--user", "u", "--role", "root"]).is_err());
        assert!(Cli::try_parse_from(["solar-console", "login", "--user", "u", "--role", "portal"]).is_err());
        let cli = Cli::try_parse_from(["solar-console", "login", "--user", "u", "--role", "Admin"]).unwrap();
        assert!(matches!(cli.command, Command::Login(LoginArgs { role: Role::Admin, plant: None, .. })));
    }
}
