//! Process-wide wiring: one client, one session, one set of counters.

use crate::api::{ApiClient, PathParams};
use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::error::SyncResult;
use crate::fetcher::Fetcher;
use crate::gate::AuthGate;
use crate::mutation::Mutations;
use crate::resources::Resource;
use crate::rows::Row;
use crate::scheduler::ResourceSync;
use crate::session::SessionHandle;
use crate::state::Counters;
use crate::table::TableView;

#[derive(Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    session: SessionHandle,
    counters: Counters,
    client: ApiClient,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, session: SessionHandle) -> SyncResult<Self> {
        let client = ApiClient::new(&config.backend)?.with_session(session.clone());
        Ok(Self { config, session, counters: Counters::new(), client })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::new(self.session.clone())
    }

    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new(self.client.clone(), self.counters.clone())
    }

    pub fn mutations(&self) -> Mutations {
        Mutations::new(self.client.clone(), self.session.clone(), self.counters.clone())
    }

    /// Path parameters taken from the current session
    pub fn params(&self) -> PathParams {
        PathParams {
            plant_id: self.session.snapshot().plant_id().map(str::to_string),
            ..PathParams::default()
        }
    }

    /// A scheduler for `resource` at its family's cadence and the configured stale policy
    pub fn sync<Res: Resource>(&self, resource: Res) -> ResourceSync<Res::Row> {
        let interval = self.config.polling.interval_for(resource.family());
        self.fetcher()
            .sync(resource, self.params())
            .every(interval)
            .on_error(self.config.sync.on_error)
    }

    pub fn table<R: Row, Res: Resource<Row = R>>(&self, resource: &Res) -> TableView<R> {
        TableView::new(self.config.tables.page_size_for(resource.family()))
    }

    pub fn clock(&self) -> Clock {
        Clock::start(self.config.polling.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ActiveAlerts, Admins};
    use crate::session::{Identity, Role};
    use std::time::Duration;

    #[test]
    fn families_pick_cadence_and_page_size() {
        let dashboard = Dashboard::new(DashboardConfig::default(), SessionHandle::new()).unwrap();
        assert_eq!(dashboard.table(&ActiveAlerts).page_size(), 12);
        assert_eq!(dashboard.table(&Admins).page_size(), 15);
    }

    #[tokio::test]
    async fn sync_uses_family_interval_and_session_plant() {
        let session = SessionHandle::new();
        session.login(Identity {
            role: Role::User,
            token: Some("t".into()),
            user_id: "op".into(),
            plant_id: Some("SP-9".into()),
        });
        let dashboard = Dashboard::new(DashboardConfig::default(), session).unwrap();

        assert_eq!(dashboard.params().plant_id.as_deref(), Some("SP-9"));
        assert_eq!(dashboard.sync(Admins).interval(), Duration::from_secs(5));
        assert_eq!(dashboard.sync(ActiveAlerts).interval(), Duration::from_secs(10));
    }
}
