use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::assign::{resolve, Assignments};
use crate::pco::PlanSource;
use crate::roster::ServicePlan;
use crate::settings::AppSettings;

pub const OFFLINE_REASON: &str = "PCO Offline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum SyncStatus {
    /// Nothing fetched yet
    Pending,
    /// No credentials configured, only the baseline is shown
    SetupRequired,
    Online,
    Offline(String),
}

/// What the dashboard currently shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub plan: Option<ServicePlan>,
    pub assignments: Assignments,
    pub status: SyncStatus,
    pub last_updated: DateTime<Utc>,
    /// Generation of the refresh that produced this state
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { generation: u64 },
    /// A newer refresh was issued while this one was in flight
    Stale { generation: u64, latest: u64 },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the board and keeps it in step with the plan source.
///
/// Every refresh takes a generation number when it starts. When it
/// finishes, its result is applied only if no newer refresh has been
/// issued since, so a slow response can never replace a newer one.
pub struct RefreshCoordinator {
    source: Arc<dyn PlanSource>,
    settings: Mutex<AppSettings>,
    issued: AtomicU64,
    board: Mutex<BoardState>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshCoordinator {
    pub fn new(source: Arc<dyn PlanSource>, settings: AppSettings) -> Arc<Self> {
        let assignments = resolve(None, &settings, &mut rand::thread_rng());
        let status = if settings.has_credentials() {
            SyncStatus::Pending
        } else {
            SyncStatus::SetupRequired
        };

        Arc::new(Self {
            source,
            settings: Mutex::new(settings),
            issued: AtomicU64::new(0),
            board: Mutex::new(BoardState {
                plan: None,
                assignments,
                status,
                last_updated: Utc::now(),
                generation: 0,
            }),
            timer: Mutex::new(None),
        })
    }

    pub fn source(&self) -> &Arc<dyn PlanSource> {
        &self.source
    }

    pub fn settings(&self) -> AppSettings {
        lock(&self.settings).clone()
    }

    pub fn board(&self) -> BoardState {
        lock(&self.board).clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn commit(&self, generation: u64, plan: Option<ServicePlan>, status: SyncStatus) -> RefreshOutcome {
        let settings = self.settings();
        let mut board = lock(&self.board);

        let latest = self.latest_generation();
        if generation != latest {
            debug!(generation, latest, "discarding stale refresh");
            return RefreshOutcome::Stale { generation, latest };
        }

        board.assignments = resolve(plan.as_ref(), &settings, &mut rand::thread_rng());
        board.plan = plan;
        board.status = status;
        board.last_updated = Utc::now();
        board.generation = generation;
        RefreshOutcome::Applied { generation }
    }

    /// Fetches the current plan and resolves the board from it. A failed
    /// fetch still leaves a renderable board built without a plan.
    pub async fn refresh(&self) -> RefreshOutcome {
        let settings = self.settings();
        let generation = self.issue();

        if !settings.has_credentials() {
            return self.commit(generation, None, SyncStatus::SetupRequired);
        }

        match self.source.fetch_plan(&settings).await {
            Ok(plan) => {
                info!(generation, plan = plan.as_ref().map(|p| p.id.as_str()), "plan refreshed");
                self.commit(generation, plan, SyncStatus::Online)
            }
            Err(err) => {
                warn!(generation, error = %err, "plan refresh failed");
                self.commit(generation, None, SyncStatus::Offline(OFFLINE_REASON.to_string()))
            }
        }
    }

    /// Resolves the held plan again against the current settings
    pub fn reresolve(&self) {
        let settings = self.settings();
        let mut board = lock(&self.board);
        board.assignments = resolve(board.plan.as_ref(), &settings, &mut rand::thread_rng());
        board.last_updated = Utc::now();
    }

    /// Replaces the settings. Changes that affect what gets fetched restart
    /// the timer, which refreshes straight away; anything else is applied to
    /// the plan already on the board. Returns whether a refetch was started.
    pub fn update_settings(self: &Arc<Self>, next: AppSettings) -> bool {
        let refetch = {
            let mut current = lock(&self.settings);
            let refetch = current.refetch_required(&next);
            *current = next;
            refetch
        };

        if refetch {
            self.start_timer();
        } else {
            self.reresolve();
        }
        refetch
    }

    /// Starts (or restarts) the periodic refresh. The first tick fires
    /// immediately.
    pub fn start_timer(self: &Arc<Self>) {
        let period = self.settings().refresh_period();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                this.refresh().await;
            }
        });

        debug!(period_secs = period.as_secs(), "refresh timer started");
        if let Some(previous) = lock(&self.timer).replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_timer(&self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}
