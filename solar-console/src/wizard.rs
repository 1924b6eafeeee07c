//! Interactive first-run configuration
//!
//! Walks through the backend address, polling cadences, table page sizes and
//! the stale-row policy, then writes `config.toml` to the OS config dir.

use crate::prompt::Terminal;
use anyhow::{Context, Result};
use solar_sync::config::{BackendConfig, DashboardConfig, PollingConfig, SyncConfig, TableConfig};
use solar_sync::{ApiClient, StalePolicy};
use std::time::Duration;

pub struct SetupWizard;

impl SetupWizard {
    pub async fn run() -> Result<()> {
        println!();
        println!("☀️  ======================================");
        println!("   SOLAR DASHBOARD CONFIGURATION WIZARD");
        println!("☀️  ======================================");
        println!();

        let mut term = Terminal::stdio();
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            backend: Self::configure_backend(&mut term, &defaults.backend).await?,
            polling: Self::configure_polling(&mut term, &defaults.polling)?,
            tables: Self::configure_tables(&mut term, &defaults.tables)?,
            sync: Self::configure_sync(&mut term)?,
        };

        Self::display_summary(&config);

        if term.confirm("💾 Save this configuration?", true)? {
            config.save().await.context("Failed to save configuration")?;
            let path = DashboardConfig::config_file_path().context("No config directory")?;
            println!();
            println!("✅ Configuration saved to {}", path.display());
            println!("🚀 Run `solar-console login` next.");
            println!();
        } else {
            println!("❌ Configuration cancelled.");
        }
        Ok(())
    }

    async fn configure_backend(term: &mut Terminal, defaults: &BackendConfig) -> Result<BackendConfig> {
        println!("🌐 BACKEND");
        println!("────────────────────────────────────────");

        let base_url = term.base_url("API base URL", &defaults.base_url)?;
        let request_timeout = term.seconds("Request timeout (seconds)", defaults.request_timeout)?;
        let backend = BackendConfig { base_url, request_timeout };

        println!("🔍 Testing connection...");
        match Self::test_connection(&backend).await {
            Ok(true) => println!("✅ Backend reachable."),
            Ok(false) => println!("⚠️  Backend unreachable, configuration will be saved anyway."),
            Err(e) => println!("⚠️  {} - configuration will be saved anyway.", e),
        }
        println!();
        Ok(backend)
    }

    fn configure_polling(term: &mut Terminal, defaults: &PollingConfig) -> Result<PollingConfig> {
        println!("⏱️  POLLING");
        println!("────────────────────────────────────────");
        println!("Seconds between refreshes for each screen family.");
        println!();

        let polling = PollingConfig {
            portal_lists: term.seconds("Plant and admin lists", defaults.portal_lists)?,
            telemetry: term.seconds("SMB and string telemetry", defaults.telemetry)?,
            alerts: term.seconds("Alerts", defaults.alerts)?,
            maintenance: term.seconds("Maintenance", defaults.maintenance)?,
            users: term.seconds("Users and login history", defaults.users)?,
            clock: defaults.clock,
        };
        println!();
        Ok(polling)
    }

    fn configure_tables(term: &mut Terminal, defaults: &TableConfig) -> Result<TableConfig> {
        println!("📋 TABLES");
        println!("────────────────────────────────────────");

        let tables = TableConfig {
            alerts_page_size: term.rows_per_page("Alert rows per page", defaults.alerts_page_size)?,
            maintenance_page_size: term
                .rows_per_page("Maintenance rows per page", defaults.maintenance_page_size)?,
            portal_page_size: term.rows_per_page("Plant/admin rows per page", defaults.portal_page_size)?,
            telemetry_page_size: term
                .rows_per_page("SMB/string rows per page", defaults.telemetry_page_size)?,
            users_page_size: term.rows_per_page("User rows per page", defaults.users_page_size)?,
        };
        println!();
        Ok(tables)
    }

    fn configure_sync(term: &mut Terminal) -> Result<SyncConfig> {
        println!("🔄 FAILED REFRESHES");
        println!("────────────────────────────────────────");

        let choice = term.pick(
            "on_error",
            &[
                ("keep-stale", "Keep showing the last rows received"),
                ("clear", "Empty the table until the next success"),
            ],
            "keep-stale",
        )?;
        let on_error = match choice {
            "clear" => StalePolicy::Clear,
            _ => StalePolicy::KeepStale,
        };
        println!();
        Ok(SyncConfig { on_error })
    }

    fn display_summary(config: &DashboardConfig) {
        println!("📋 CONFIGURATION SUMMARY");
        println!("────────────────────────────────────────");
        println!("🌐 Backend: {} (timeout {:?})", config.backend.base_url, config.backend.request_timeout);
        println!("⏱️  Polling:");
        println!("   Portal lists: {:?}", config.polling.portal_lists);
        println!("   Telemetry: {:?}", config.polling.telemetry);
        println!("   Alerts: {:?}", config.polling.alerts);
        println!("   Maintenance: {:?}", config.polling.maintenance);
        println!("   Users: {:?}", config.polling.users);
        println!(
            "📋 Page sizes: alerts {}, maintenance {}, portal {}, telemetry {}, users {}",
            config.tables.alerts_page_size,
            config.tables.maintenance_page_size,
            config.tables.portal_page_size,
            config.tables.telemetry_page_size,
            config.tables.users_page_size
        );
        println!("🔄 On failure: {:?}", config.sync.on_error);
        println!();
    }

    async fn test_connection(backend: &BackendConfig) -> Result<bool> {
        let client = ApiClient::new(backend)?;
        let url = client.base_url();
        let host = url.host_str().context("Base URL has no host")?.to_string();
        let port = url.port_or_known_default().context("Base URL has no port")?;

        let attempt = tokio::time::timeout(
            Duration::from_secs(5),
            tokio::net::TcpStream::connect((host.as_str(), port)),
        )
        .await;
        Ok(matches!(attempt, Ok(Ok(_))))
    }
}
