//! Polling Fetcher: one GET, transformed into rows.
//!
//! The fetcher never writes screen state itself. It hands its outcome to the
//! scheduler, which owns the liveness check that guards every write.

use crate::api::{ApiClient, PathParams};
use crate::error::{SyncError, SyncResult};
use crate::resources::Resource;
use crate::scheduler::ResourceSync;
use crate::state::Counters;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<R> {
    /// Rows in server order, ready to replace the previous set
    Rows(Vec<R>),
    /// A required parameter was missing; no request was issued
    Skipped { missing: &'static str },
}

impl<R> FetchOutcome<R> {
    pub fn rows(self) -> Option<Vec<R>> {
        match self {
            FetchOutcome::Rows(rows) => Some(rows),
            FetchOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: ApiClient,
    counters: Counters,
}

impl Fetcher {
    pub fn new(client: ApiClient, counters: Counters) -> Self {
        Self { client, counters }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Fetch `resource` once.
    ///
    /// Path parameters are resolved before anything is sent, so an absent or
    /// empty plant id yields `Skipped` instead of a request to a broken URL.
    pub async fn fetch<Res: Resource>(
        &self,
        resource: &Res,
        params: &PathParams,
    ) -> SyncResult<FetchOutcome<Res::Row>> {
        let endpoint = resource.endpoint();
        if let Err(SyncError::MissingParam(missing)) = endpoint.path(params) {
            debug!("Skipping {} fetch: {} not set", endpoint.key(), missing);
            return Ok(FetchOutcome::Skipped { missing });
        }

        let body = self.client.get_json(endpoint, params).await?;
        let rows = resource.rows(body)?;
        debug!("Fetched {} rows from {}", rows.len(), endpoint.key());
        Ok(FetchOutcome::Rows(rows))
    }

    /// One-shot fetch that also publishes the derived count, for callers
    /// without a scheduler (console list commands)
    pub async fn fetch_once<Res: Resource>(
        &self,
        resource: &Res,
        params: &PathParams,
    ) -> SyncResult<Vec<Res::Row>> {
        match self.fetch(resource, params).await? {
            FetchOutcome::Rows(rows) => {
                if let Some(slot) = resource.publishes() {
                    slot.publish(&self.counters, rows.len());
                }
                Ok(rows)
            }
            FetchOutcome::Skipped { missing } => Err(SyncError::MissingParam(missing)),
        }
    }

    /// Build a scheduler that polls `resource` with these parameters
    pub fn sync<Res: Resource>(&self, resource: Res, params: PathParams) -> ResourceSync<Res::Row> {
        let slot = resource.publishes();
        let name = resource.endpoint().key();
        let resource = Arc::new(resource);
        let fetcher = self.clone();
        let params = Arc::new(params);

        let sync = ResourceSync::new(name, move || -> BoxFuture<'static, SyncResult<FetchOutcome<Res::Row>>> {
            let fetcher = fetcher.clone();
            let resource = Arc::clone(&resource);
            let params = Arc::clone(&params);
            async move { fetcher.fetch(resource.as_ref(), &params).await }.boxed()
        });

        match slot {
            Some(slot) => {
                let counters = self.counters.clone();
                sync.publish_count(move |count| slot.publish(&counters, count))
            }
            None => sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::resources::ActiveAlerts;

    fn unreachable_fetcher() -> Fetcher {
        // port 9 (discard) on loopback; nothing should ever be sent there in these tests
        let config = BackendConfig { base_url: "http://127.0.0.1:9/api/".into(), ..BackendConfig::default() };
        Fetcher::new(ApiClient::new(&config).unwrap(), Counters::new())
    }

    #[tokio::test]
    async fn missing_plant_id_skips_without_request() {
        let fetcher = unreachable_fetcher();
        let outcome = fetcher.fetch(&ActiveAlerts, &PathParams::default()).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Skipped { missing: "plant_id" });

        let outcome = fetcher.fetch(&ActiveAlerts, &PathParams::plant("  ")).await.unwrap();
        assert!(outcome.rows().is_none());
    }

    #[tokio::test]
    async fn fetch_once_reports_skip_as_missing_param() {
        let fetcher = unreachable_fetcher();
        let err = fetcher.fetch_once(&ActiveAlerts, &PathParams::default()).await.unwrap_err();
        assert!(matches!(err, SyncError::MissingParam("plant_id")));
    }
}
