//! `watch <screen>`: mounts one polled resource and redraws on every change.
//!
//! Keys (one per line on stdin): `n` next page, `p` previous page, a page
//! number or `g <n>` to jump, `/text` to search (`/` alone clears), `r` to
//! refresh now, `q` to quit.

use crate::render::render_view;
use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use solar_sync::clock;
use solar_sync::resources::{
    ActiveAlerts, Admins, AlertHistory, LoginHistory, MaintenanceHistory, PlantSummary, Plants,
    Resource, Smbs, Strings, UpcomingMaintenance, Users,
};
use solar_sync::{Dashboard, GateDecision, PageJump, Route, Row, Snapshot, StopReason, SyncState, TableView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Screen {
    Plants,
    Admins,
    Summary,
    Smbs,
    Strings,
    Alerts,
    AlertHistory,
    Maintenance,
    MaintenanceHistory,
    Users,
    LoginHistory,
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Plants => Route::AccessPortal("plants".into()),
            Screen::Admins => Route::AccessPortal("admins".into()),
            Screen::Summary => Route::Dashboard,
            Screen::Smbs | Screen::Strings => Route::SolarPanelDetails,
            Screen::Alerts | Screen::AlertHistory => Route::FaultsAlerts,
            Screen::Maintenance | Screen::MaintenanceHistory => Route::Maintenance,
            Screen::Users | Screen::LoginHistory => Route::UserInformation,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Plants => "Solar Plants",
            Screen::Admins => "Plant Administrators",
            Screen::Summary => "Plant Overview",
            Screen::Smbs => "SMB Telemetry",
            Screen::Strings => "String Telemetry",
            Screen::Alerts => "Active Alerts",
            Screen::AlertHistory => "Alert History",
            Screen::Maintenance => "Upcoming Maintenance",
            Screen::MaintenanceHistory => "Maintenance History",
            Screen::Users => "Users",
            Screen::LoginHistory => "Login History",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub page: Option<usize>,
    pub search: Option<String>,
    /// Print the first answer and exit
    pub once: bool,
}

pub async fn run(dashboard: &Dashboard, screen: Screen, options: WatchOptions) -> Result<()> {
    match screen {
        Screen::Plants => watch(dashboard, Plants, screen, options).await,
        Screen::Admins => watch(dashboard, Admins, screen, options).await,
        Screen::Summary => watch(dashboard, PlantSummary, screen, options).await,
        Screen::Smbs => watch(dashboard, Smbs, screen, options).await,
        Screen::Strings => watch(dashboard, Strings, screen, options).await,
        Screen::Alerts => watch(dashboard, ActiveAlerts, screen, options).await,
        Screen::AlertHistory => watch(dashboard, AlertHistory, screen, options).await,
        Screen::Maintenance => watch(dashboard, UpcomingMaintenance, screen, options).await,
        Screen::MaintenanceHistory => watch(dashboard, MaintenanceHistory, screen, options).await,
        Screen::Users => watch(dashboard, Users, screen, options).await,
        Screen::LoginHistory => watch(dashboard, LoginHistory, screen, options).await,
    }
}

enum Command {
    Next,
    Prev,
    Jump(String),
    Search(String),
    Refresh,
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return Command::Search(query.trim().to_string());
    }
    match line {
        "n" => Command::Next,
        "p" => Command::Prev,
        "r" => Command::Refresh,
        "q" => Command::Quit,
        _ => match line.strip_prefix("g ") {
            Some(page) => Command::Jump(page.trim().to_string()),
            None if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) => {
                Command::Jump(line.to_string())
            }
            None => Command::Unknown,
        },
    }
}

fn jump<R: Row>(view: &mut TableView<R>, page: &str) -> Option<String> {
    if !view.set_page_input(page) {
        return Some(format!("'{page}' is not a page number"));
    }
    match view.submit_page() {
        PageJump::Moved(_) => None,
        PageJump::Rejected { total_pages } => Some(format!("Page must be between 1 and {total_pages}")),
    }
}

async fn watch<Res: Resource>(
    dashboard: &Dashboard,
    resource: Res,
    screen: Screen,
    options: WatchOptions,
) -> Result<()> {
    let route = screen.route();
    let mut view = dashboard.table(&resource);
    let sync = dashboard.sync(resource);
    let mut snapshots = sync.subscribe();

    if let GateDecision::Redirect(to) = sync.mount(&dashboard.gate(), &route) {
        bail!("{} needs a session allowed on {} (redirected to {}). Run `solar-console login` first.", screen.title(), route, to);
    }
    if let Some(query) = &options.search {
        view.set_query(query);
    }
    let mut pending_page = options.page;

    if options.once {
        snapshots
            .wait_for(|s| s.generation > 0 || s.last_error.is_some() || s.skipped.is_some())
            .await?;
        let snapshot = sync.snapshot();
        if let Some(missing) = snapshot.skipped {
            sync.stop();
            bail!("{} cannot load: the session has no {}", screen.title(), missing);
        }
        view.set_rows(snapshot.rows.clone());
        let notice = pending_page.and_then(|p| jump(&mut view, &p.to_string()));
        println!("{}", frame(dashboard, screen, &view, &snapshot, Local::now(), notice.as_deref()));
        sync.stop();
        return Ok(());
    }

    let clock = dashboard.clock();
    let mut ticks = clock.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut snapshot = sync.snapshot();
    let mut notice: Option<String> = None;
    info!("Watching {}", screen.title());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshot = snapshots.borrow_and_update().clone();
                view.set_rows(snapshot.rows.clone());
                if let Some(page) = pending_page.take() {
                    notice = jump(&mut view, &page.to_string());
                }
            }
            _ = ticks.changed() => {}
            line = input.next_line() => {
                let Some(line) = line? else { break };
                notice = None;
                match parse_command(&line) {
                    Command::Next => { view.next_page(); }
                    Command::Prev => { view.prev_page(); }
                    Command::Jump(page) => notice = jump(&mut view, &page),
                    Command::Search(query) => view.set_query(&query),
                    Command::Refresh => { sync.refresh(); }
                    Command::Quit => break,
                    Command::Unknown => notice = Some("Keys: n, p, <page>, /search, r, q".into()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        if let SyncState::Stopped(StopReason::Revoked) = sync.state() {
            println!("Session ended, stopping.");
            break;
        }
        let now = *ticks.borrow();
        print!("\x1B[2J\x1B[H");
        println!("{}", frame(dashboard, screen, &view, &snapshot, now, notice.as_deref()));
    }

    debug!("Leaving {}", screen.title());
    sync.stop();
    clock.stop();
    Ok(())
}

fn frame<R: Row>(
    dashboard: &Dashboard,
    screen: Screen,
    view: &TableView<R>,
    snapshot: &Snapshot<R>,
    now: DateTime<Local>,
    notice: Option<&str>,
) -> String {
    let (time, date) = clock::display(&now);
    let mut out = vec![format!("☀️  {}    {}  {}", screen.title(), time, date)];

    if matches!(screen, Screen::Plants | Screen::Admins) {
        let counters = dashboard.counters();
        out.push(format!("Plants: {}   Admins: {}", counters.plant_count(), counters.admin_count()));
    }
    match (snapshot.fetched_at, snapshot.skipped) {
        (Some(at), _) => out.push(format!("Updated {}", at.format("%H:%M:%S"))),
        (None, Some(missing)) => out.push(format!("Waiting for a {missing} in the session")),
        (None, None) => out.push("Loading...".to_string()),
    }
    if let Some(error) = &snapshot.last_error {
        out.push(format!("⚠️  Last refresh failed: {error}"));
    }
    out.push(String::new());
    out.push(render_view(view));
    if let Some(notice) = notice {
        out.push(format!("› {notice}"));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_sync::models::UserRecord;
    use solar_sync::rows::UserRow;
    use std::sync::Arc;

    #[test]
    fn commands_parse() {
        assert!(matches!(parse_command("n"), Command::Next));
        assert!(matches!(parse_command(" 3 "), Command::Jump(p) if p == "3"));
        assert!(matches!(parse_command("g 12"), Command::Jump(p) if p == "12"));
        assert!(matches!(parse_command("/A1"), Command::Search(q) if q == "A1"));
        assert!(matches!(parse_command("/"), Command::Search(q) if q.is_empty()));
        assert!(matches!(parse_command("x"), Command::Unknown));
    }

    #[test]
    fn out_of_range_jump_keeps_the_page() {
        let mut view = TableView::new(1);
        let rows = (1..=3)
            .map(|i| {
                UserRow::from(UserRecord {
                    object_id: None,
                    plant_id: None,
                    user_id: format!("op-{i}"),
                    email: None,
                    phone: None,
                })
            })
            .collect();
        view.set_rows(Arc::new(rows));

        assert_eq!(jump(&mut view, "2"), None);
        assert_eq!(view.current_page(), 2);
        assert_eq!(jump(&mut view, "9").as_deref(), Some("Page must be between 1 and 3"));
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn skipped_fetch_is_shown_instead_of_loading() {
        let dashboard = Dashboard::new(
            solar_sync::DashboardConfig::default(),
            solar_sync::SessionHandle::new(),
        )
        .unwrap();
        let view: TableView<UserRow> = TableView::new(5);
        let snapshot = Snapshot { skipped: Some("plant_id"), ..Snapshot::default() };

        let out = frame(&dashboard, Screen::Users, &view, &snapshot, Local::now(), None);
        assert!(out.contains("Waiting for a plant_id in the session"));
        assert!(!out.contains("Loading..."));
    }

    #[test]
    fn screens_map_to_gated_routes() {
        assert_eq!(Screen::Admins.route(), Route::AccessPortal("admins".into()));
        assert_eq!(Screen::LoginHistory.route(), Route::UserInformation);
    }
}
