//! Interval Scheduler: the resource synchronization utility every screen reuses.
//!
//! A `ResourceSync` is parametrized by a fetch function (usually built by
//! `Fetcher::sync`), a cadence and a stale policy. Lifecycle:
//!
//! - `mount` consults the `AuthGate`; a denied gate leaves the sync `Idle`
//!   and no fetch is ever issued.
//! - an admitted mount fetches immediately, then once per interval. Ticks
//!   run sequentially inside one task, so a tick never starts while a fetch
//!   is in flight and missed ticks are skipped.
//! - `stop` (or drop) clears the liveness flag under the same lock every
//!   write takes and aborts the task. A response that lands afterwards is
//!   discarded.
//! - a tick that finds the session revoked stops the sync on its own.

use crate::config::StalePolicy;
use crate::error::SyncResult;
use crate::fetcher::FetchOutcome;
use crate::gate::{AuthGate, GateDecision};
use crate::routes::Route;
use crate::rows::Row;
use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub type FetchFn<R> = Arc<dyn Fn() -> BoxFuture<'static, SyncResult<FetchOutcome<R>>> + Send + Sync>;
type PublishFn = Arc<dyn Fn(usize) + Send + Sync>;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
/// Shortest cadence a timer accepts
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Unmounted,
    Revoked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Never mounted, or mount was refused by the gate
    Idle,
    Active,
    /// Back to idle after running; terminal for this instance
    Stopped(StopReason),
}

impl SyncState {
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Active)
    }
}

/// What a screen renders from
pub struct Snapshot<R> {
    pub rows: Arc<Vec<R>>,
    /// Number of successful replacements so far
    pub generation: u64,
    pub fetched_at: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    /// Parameter whose absence made the latest fetch skip its request
    pub skipped: Option<&'static str>,
}

impl<R> Clone for Snapshot<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            generation: self.generation,
            fetched_at: self.fetched_at,
            last_error: self.last_error.clone(),
            skipped: self.skipped,
        }
    }
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            generation: 0,
            fetched_at: None,
            last_error: None,
            skipped: None,
        }
    }
}

/// State shared between the handle and its polling task
struct Slots<R> {
    name: &'static str,
    live: Mutex<bool>,
    state: Mutex<SyncState>,
    snapshot: watch::Sender<Snapshot<R>>,
    refresh: Notify,
    fetches: AtomicU64,
    writes: AtomicU64,
}

impl<R: Row> Slots<R> {
    fn is_live(&self) -> bool {
        *self.live.lock()
    }

    /// Returns false once the sync is no longer live; nothing is written then
    fn apply(
        &self,
        outcome: SyncResult<FetchOutcome<R>>,
        policy: StalePolicy,
        publish: Option<&PublishFn>,
    ) -> bool {
        let live = self.live.lock();
        if !*live {
            return false;
        }

        match outcome {
            Ok(FetchOutcome::Rows(rows)) => {
                let count = rows.len();
                self.snapshot.send_modify(|snap| {
                    snap.rows = Arc::new(rows);
                    snap.generation += 1;
                    snap.fetched_at = Some(Local::now());
                    snap.last_error = None;
                    snap.skipped = None;
                });
                if let Some(publish) = publish {
                    publish(count);
                }
                self.writes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(FetchOutcome::Skipped { missing }) => {
                debug!("{}: fetch skipped, {} not set", self.name, missing);
                self.snapshot.send_if_modified(|snap| {
                    let changed = snap.skipped != Some(missing);
                    snap.skipped = Some(missing);
                    changed
                });
            }
            Err(e) => {
                warn!("{}: poll failed: {}", self.name, e);
                let message = e.user_message();
                self.snapshot.send_modify(|snap| {
                    if policy == StalePolicy::Clear {
                        snap.rows = Arc::new(Vec::new());
                    }
                    snap.last_error = Some(message);
                });
                self.writes.fetch_add(1, Ordering::SeqCst);
            }
        }
        true
    }

    /// Flip liveness off and record why; returns whether it was running
    fn halt(&self, reason: StopReason) -> bool {
        let was_live = {
            let mut live = self.live.lock();
            std::mem::replace(&mut *live, false)
        };
        let mut state = self.state.lock();
        if state.is_active() {
            *state = SyncState::Stopped(reason);
        }
        was_live
    }
}

pub struct ResourceSync<R: Row> {
    interval: Duration,
    policy: StalePolicy,
    fetch: FetchFn<R>,
    publish: Option<PublishFn>,
    slots: Arc<Slots<R>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Row> ResourceSync<R> {
    pub fn new<F>(name: &'static str, fetch: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, SyncResult<FetchOutcome<R>>> + Send + Sync + 'static,
    {
        let (snapshot, _) = watch::channel(Snapshot::default());
        Self {
            interval: DEFAULT_INTERVAL,
            policy: StalePolicy::default(),
            fetch: Arc::new(fetch),
            publish: None,
            slots: Arc::new(Slots {
                name,
                live: Mutex::new(false),
                state: Mutex::new(SyncState::Idle),
                snapshot,
                refresh: Notify::new(),
                fetches: AtomicU64::new(0),
                writes: AtomicU64::new(0),
            }),
            task: Mutex::new(None),
        }
    }

    /// Polling cadence, floored at `MIN_INTERVAL`
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn on_error(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Called with the row count after each successful replacement
    pub fn publish_count<F>(mut self, publish: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.publish = Some(Arc::new(publish));
        self
    }

    pub fn name(&self) -> &'static str {
        self.slots.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SyncState {
        *self.slots.state.lock()
    }

    /// Gate the mount of `route`, then start polling if admitted.
    ///
    /// Must be called from within a tokio runtime. Starting happens at most
    /// once per instance; later calls only report the gate's decision.
    pub fn mount(&self, gate: &AuthGate, route: &Route) -> GateDecision {
        let decision = gate.check(route);
        if !decision.is_admitted() {
            info!("{}: not started, gate redirected from {}", self.name(), route);
            return decision;
        }

        {
            let mut state = self.slots.state.lock();
            if *state != SyncState::Idle {
                debug!("{}: mount ignored in state {:?}", self.name(), *state);
                return decision;
            }
            *state = SyncState::Active;
        }
        *self.slots.live.lock() = true;

        let handle = tokio::spawn(run(
            Arc::clone(&self.slots),
            gate.clone(),
            Arc::clone(&self.fetch),
            self.publish.clone(),
            self.interval,
            self.policy,
        ));
        *self.task.lock() = Some(handle);
        info!("{}: sync started, every {:?}", self.name(), self.interval);
        decision
    }

    /// Unmount: no state write happens after this returns
    pub fn stop(&self) {
        let was_live = self.slots.halt(StopReason::Unmounted);
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        if was_live {
            info!("{}: sync stopped", self.name());
        }
    }

    /// Request an immediate out-of-cadence fetch; false if not running
    pub fn refresh(&self) -> bool {
        if !self.state().is_active() {
            return false;
        }
        self.slots.refresh.notify_one();
        true
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        self.slots.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.slots.snapshot.borrow().clone()
    }

    pub fn rows(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.slots.snapshot.borrow().rows)
    }

    /// Fetches issued so far (skipped ones included)
    pub fn fetch_count(&self) -> u64 {
        self.slots.fetches.load(Ordering::SeqCst)
    }

    /// State writes performed so far
    pub fn write_count(&self) -> u64 {
        self.slots.writes.load(Ordering::SeqCst)
    }
}

impl<R: Row> Drop for ResourceSync<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<R: Row>(
    slots: Arc<Slots<R>>,
    gate: AuthGate,
    fetch: FetchFn<R>,
    publish: Option<PublishFn>,
    period: Duration,
    policy: StalePolicy,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let manual = tokio::select! {
            _ = ticker.tick() => false,
            _ = slots.refresh.notified() => true,
        };
        if manual {
            debug!("{}: manual refresh", slots.name);
            ticker.reset();
        }

        if !slots.is_live() {
            break;
        }
        if !gate.still_authenticated() {
            if slots.halt(StopReason::Revoked) {
                info!("{}: session revoked, sync stopped", slots.name);
            }
            break;
        }

        slots.fetches.fetch_add(1, Ordering::SeqCst);
        let outcome = fetch().await;
        if !slots.apply(outcome, policy, publish.as_ref()) {
            debug!("{}: late response discarded", slots.name);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::session::{Identity, Role, SessionHandle};
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{sleep, timeout};

    #[derive(Debug, Clone, PartialEq)]
    struct TestRow(String);

    impl Row for TestRow {
        fn headers() -> &'static [&'static str] {
            &["Id"]
        }
        fn id(&self) -> &str {
            &self.0
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.0]
        }
        fn cells(&self) -> Vec<String> {
            vec![self.0.clone()]
        }
    }

    fn signed_in_gate() -> AuthGate {
        let session = SessionHandle::new();
        session.login(Identity {
            role: Role::Admin,
            token: None,
            user_id: "admin-1".into(),
            plant_id: Some("SP-1".into()),
        });
        AuthGate::new(session)
    }

    fn rows(ids: &[&str]) -> Vec<TestRow> {
        ids.iter().map(|id| TestRow(id.to_string())).collect()
    }

    /// Fetch function that counts calls and answers after `delay`
    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        delay: Duration,
        answer: Vec<TestRow>,
    ) -> impl Fn() -> BoxFuture<'static, SyncResult<FetchOutcome<TestRow>>> + Send + Sync + 'static {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let answer = answer.clone();
            async move {
                sleep(delay).await;
                Ok::<_, SyncError>(FetchOutcome::Rows(answer))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn zero_cadence_is_floored_and_still_polls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("alerts", counting_fetch(calls.clone(), Duration::ZERO, rows(&["a"])))
            .every(Duration::ZERO);
        assert_eq!(sync.interval(), MIN_INTERVAL);

        let mut rx = sync.subscribe();
        assert!(sync.mount(&signed_in_gate(), &Route::FaultsAlerts).is_admitted());
        timeout(Duration::from_secs(1), rx.wait_for(|s| s.generation >= 2))
            .await
            .unwrap()
            .unwrap();
        assert!(sync.state().is_active());
        sync.stop();
    }

    #[tokio::test]
    async fn gate_denial_issues_no_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("alerts", counting_fetch(calls.clone(), Duration::ZERO, rows(&["a"])))
            .every(Duration::from_millis(10));

        let gate = AuthGate::new(SessionHandle::new());
        let decision = sync.mount(&gate, &Route::FaultsAlerts);

        assert_eq!(decision, GateDecision::Redirect(Route::Login));
        sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sync.fetch_count(), 0);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn first_fetch_is_immediate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("alerts", counting_fetch(calls.clone(), Duration::ZERO, rows(&["a", "b"])))
            .every(Duration::from_secs(3600));
        let mut rx = sync.subscribe();

        assert!(sync.mount(&signed_in_gate(), &Route::FaultsAlerts).is_admitted());
        timeout(Duration::from_secs(1), rx.changed()).await.unwrap().unwrap();

        let snap = sync.snapshot();
        assert_eq!(snap.generation, 1);
        assert_eq!(*snap.rows, rows(&["a", "b"]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        sync.stop();
    }

    #[tokio::test]
    async fn unmount_mid_flight_writes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new(
            "smbs",
            counting_fetch(calls.clone(), Duration::from_millis(150), rows(&["late"])),
        )
        .every(Duration::from_millis(20));

        sync.mount(&signed_in_gate(), &Route::SolarPanelDetails);
        sleep(Duration::from_millis(40)).await;
        assert_eq!(sync.fetch_count(), 1);

        sync.stop();
        sleep(Duration::from_millis(250)).await;

        assert_eq!(sync.write_count(), 0);
        assert!(sync.rows().is_empty());
        assert_eq!(sync.state(), SyncState::Stopped(StopReason::Unmounted));
    }

    #[tokio::test]
    async fn ticks_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (in_flight.clone(), peak.clone());
        let sync = ResourceSync::new("strings", move || {
            let (f, p) = (f.clone(), p.clone());
            async move {
                let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(30)).await;
                f.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, SyncError>(FetchOutcome::Rows(vec![TestRow("s".into())]))
            }
            .boxed()
        })
        .every(Duration::from_millis(5));

        sync.mount(&signed_in_gate(), &Route::SolarPanelDetails);
        sleep(Duration::from_millis(200)).await;
        sync.stop();

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(sync.fetch_count() >= 2);
    }

    #[tokio::test]
    async fn failed_tick_keeps_stale_rows_by_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sync = ResourceSync::new("alerts", move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(FetchOutcome::Rows(vec![TestRow("kept".into())]))
                } else {
                    Err(SyncError::Decode("boom".into()))
                }
            }
            .boxed()
        })
        .every(Duration::from_millis(10));

        sync.mount(&signed_in_gate(), &Route::FaultsAlerts);
        sleep(Duration::from_millis(60)).await;
        sync.stop();

        let snap = sync.snapshot();
        assert_eq!(*snap.rows, vec![TestRow("kept".into())]);
        assert_eq!(snap.generation, 1);
        assert!(snap.last_error.is_some());
        assert!(sync.fetch_count() >= 2);
    }

    #[tokio::test]
    async fn clear_policy_empties_rows_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sync = ResourceSync::new("alerts", move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(FetchOutcome::Rows(vec![TestRow("gone".into())]))
                } else {
                    Err(SyncError::Decode("boom".into()))
                }
            }
            .boxed()
        })
        .every(Duration::from_millis(10))
        .on_error(StalePolicy::Clear);

        sync.mount(&signed_in_gate(), &Route::FaultsAlerts);
        sleep(Duration::from_millis(60)).await;
        sync.stop();

        assert!(sync.rows().is_empty());
    }

    #[tokio::test]
    async fn skipped_fetch_does_not_write() {
        let sync = ResourceSync::<TestRow>::new("users", || {
            async { Ok::<_, SyncError>(FetchOutcome::Skipped { missing: "plant_id" }) }.boxed()
        })
        .every(Duration::from_millis(10));

        let mut rx = sync.subscribe();
        sync.mount(&signed_in_gate(), &Route::UserInformation);
        let snap = timeout(Duration::from_secs(1), rx.wait_for(|s| s.skipped.is_some()))
            .await
            .unwrap()
            .unwrap()
            .clone();
        sleep(Duration::from_millis(50)).await;
        sync.stop();

        assert_eq!(snap.skipped, Some("plant_id"));
        assert_eq!(snap.generation, 0);
        assert!(sync.fetch_count() >= 1);
        assert_eq!(sync.write_count(), 0);
    }

    #[tokio::test]
    async fn revoked_session_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("admins", counting_fetch(calls.clone(), Duration::ZERO, rows(&["a"])))
            .every(Duration::from_millis(10));
        let gate = signed_in_gate();

        sync.mount(&gate, &Route::Dashboard);
        sleep(Duration::from_millis(30)).await;
        gate.session().logout();
        sleep(Duration::from_millis(40)).await;

        assert_eq!(sync.state(), SyncState::Stopped(StopReason::Revoked));
        let settled = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn refresh_fetches_out_of_cadence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("tasks", counting_fetch(calls.clone(), Duration::ZERO, rows(&["t"])))
            .every(Duration::from_secs(3600));
        let mut rx = sync.subscribe();

        sync.mount(&signed_in_gate(), &Route::Maintenance);
        timeout(Duration::from_secs(1), rx.changed()).await.unwrap().unwrap();
        assert!(sync.refresh());
        timeout(Duration::from_secs(1), rx.changed()).await.unwrap().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sync.snapshot().generation, 2);
        sync.stop();
        assert!(!sync.refresh());
    }

    #[tokio::test]
    async fn second_mount_does_not_start_another_task() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sync = ResourceSync::new("plants", counting_fetch(calls.clone(), Duration::ZERO, rows(&["p"])))
            .every(Duration::from_secs(3600));
        let gate = signed_in_gate();

        sync.mount(&gate, &Route::Dashboard);
        sync.mount(&gate, &Route::Dashboard);
        sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        sync.stop();
    }
}
