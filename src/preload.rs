//! Best-effort background loading of deferred page bundles.
//!
//! Every bundle gets one ticket per session. The ticket's load future is
//! shared, so concurrent callers await the same outcome and the loader runs
//! once. A failed ticket stays failed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures_util::future::{FutureExt, LocalBoxFuture, Shared};

use crate::logging::Logger;

/// Requested during the first idle period after load.
pub const IDLE_BUNDLES: [&str; 2] = ["Skills", "ExperienceTimeline"];

/// Requested once scroll progress first passes [`MILESTONE_PROGRESS`].
pub const MILESTONE_BUNDLES: [&str; 3] = ["Projects", "Education", "Contact"];

pub const MILESTONE_PROGRESS: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreloadError {
    #[error("bundle {bundle} failed to load: {message}")]
    LoadFailed { bundle: String, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketState {
    Pending,
    Loaded,
    Failed,
}

pub type PreloadOutcome = Result<(), PreloadError>;
pub type PreloadFuture = Shared<LocalBoxFuture<'static, PreloadOutcome>>;

struct Ticket {
    state: TicketState,
    load: PreloadFuture,
}

#[derive(Clone)]
pub struct PreloadScheduler {
    tickets: Rc<RefCell<HashMap<String, Ticket>>>,
    logger: Logger,
}

impl PreloadScheduler {
    pub fn new(logger: Logger) -> Self {
        Self {
            tickets: Rc::new(RefCell::new(HashMap::new())),
            logger,
        }
    }

    /// Returns the bundle's shared load. `loader` is only invoked for the
    /// first request of a name; the load starts when the result is polled.
    pub fn preload<F, Fut>(&self, bundle: &str, loader: F) -> PreloadFuture
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), String>> + 'static,
    {
        if let Some(ticket) = self.tickets.borrow().get(bundle) {
            return ticket.load.clone();
        }

        self.logger.debug("preload_start", serde_json::json!({ "bundle": bundle }));

        let load = track(
            Rc::downgrade(&self.tickets),
            self.logger,
            bundle.to_string(),
            loader(),
        )
        .boxed_local()
        .shared();

        self.tickets.borrow_mut().insert(
            bundle.to_string(),
            Ticket {
                state: TicketState::Pending,
                load: load.clone(),
            },
        );

        load
    }

    pub fn state(&self, bundle: &str) -> Option<TicketState> {
        self.tickets.borrow().get(bundle).map(|ticket| ticket.state)
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.borrow().len()
    }
}

async fn track<Fut>(
    tickets: Weak<RefCell<HashMap<String, Ticket>>>,
    logger: Logger,
    bundle: String,
    load: Fut,
) -> PreloadOutcome
where
    Fut: Future<Output = Result<(), String>>,
{
    let outcome = load.await.map_err(|message| PreloadError::LoadFailed {
        bundle: bundle.clone(),
        message,
    });

    let state = match &outcome {
        Ok(()) => {
            logger.debug("preload_loaded", serde_json::json!({ "bundle": bundle }));
            TicketState::Loaded
        }
        Err(error) => {
            logger.warn(
                "preload_failed",
                serde_json::json!({ "bundle": bundle, "message": error.to_string() }),
            );
            TicketState::Failed
        }
    };

    if let Some(tickets) = tickets.upgrade() {
        if let Some(ticket) = tickets.borrow_mut().get_mut(&bundle) {
            ticket.state = state;
        }
    }

    outcome
}

/// Fires the first time progress passes the threshold, never again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MilestoneLatch {
    threshold: f64,
    fired: bool,
}

impl MilestoneLatch {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, fired: false }
    }

    pub fn observe(&mut self, progress_fraction: f64) -> bool {
        if self.fired || progress_fraction.is_nan() || progress_fraction <= self.threshold {
            return false;
        }

        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl Default for MilestoneLatch {
    fn default() -> Self {
        Self::new(MILESTONE_PROGRESS)
    }
}

/// `ExperienceTimeline` -> `/bundles/experience-timeline.json`
pub fn bundle_url(bundle: &str) -> String {
    let mut kebab = String::with_capacity(bundle.len() + 4);

    for (index, ch) in bundle.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                kebab.push('-');
            }
            kebab.push(ch.to_ascii_lowercase());
        } else {
            kebab.push(ch);
        }
    }

    format!("/bundles/{kebab}.json")
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_bundle(bundle: String) -> Result<(), String> {
    let response = gloo_net::http::Request::get(&bundle_url(&bundle))
        .send()
        .await
        .map_err(|error| error.to_string())?;

    if response.ok() {
        Ok(())
    } else {
        Err(format!("status {}", response.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::cell::Cell;

    fn scheduler() -> PreloadScheduler {
        PreloadScheduler::new(Logger::new(LogLevel::Warn))
    }

    fn counting_loader(
        calls: &Rc<Cell<usize>>,
        result: Result<(), String>,
    ) -> impl FnOnce() -> LocalBoxFuture<'static, Result<(), String>> {
        let calls = Rc::clone(calls);
        move || {
            calls.set(calls.get() + 1);
            async move {
                tokio::task::yield_now().await;
                result
            }
            .boxed_local()
        }
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_load() {
        let scheduler = scheduler();
        let calls = Rc::new(Cell::new(0));

        let first = scheduler.preload("Skills", counting_loader(&calls, Ok(())));
        let second = scheduler.preload("Skills", counting_loader(&calls, Ok(())));
        assert_eq!(scheduler.state("Skills"), Some(TicketState::Pending));

        let (a, b) = futures_util::future::join(first, second).await;

        assert_eq!(calls.get(), 1);
        assert_eq!(a, Ok(()));
        assert_eq!(b, Ok(()));
        assert_eq!(scheduler.state("Skills"), Some(TicketState::Loaded));
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_failure() {
        let scheduler = scheduler();
        let calls = Rc::new(Cell::new(0));

        let first = scheduler.preload("Projects", counting_loader(&calls, Err("status 404".to_string())));
        let second = scheduler.preload("Projects", counting_loader(&calls, Ok(())));
        let (a, b) = futures_util::future::join(first, second).await;

        assert_eq!(calls.get(), 1);
        assert_eq!(a, b);
        assert_eq!(
            a,
            Err(PreloadError::LoadFailed {
                bundle: "Projects".to_string(),
                message: "status 404".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn failed_ticket_is_not_retried() {
        let scheduler = scheduler();
        let calls = Rc::new(Cell::new(0));

        let _ = scheduler
            .preload("Contact", counting_loader(&calls, Err("offline".to_string())))
            .await;
        let retry = scheduler.preload("Contact", counting_loader(&calls, Ok(()))).await;

        assert_eq!(calls.get(), 1);
        assert!(retry.is_err());
        assert_eq!(scheduler.state("Contact"), Some(TicketState::Failed));
    }

    #[tokio::test]
    async fn one_failure_does_not_block_other_bundles() {
        let scheduler = scheduler();
        let calls = Rc::new(Cell::new(0));

        let failed = scheduler.preload("Education", counting_loader(&calls, Err("boom".to_string())));
        let loaded = scheduler.preload("Skills", counting_loader(&calls, Ok(())));
        let (failed, loaded) = futures_util::future::join(failed, loaded).await;

        assert!(failed.is_err());
        assert_eq!(loaded, Ok(()));
        assert_eq!(calls.get(), 2);
        assert_eq!(scheduler.ticket_count(), 2);
    }

    #[tokio::test]
    async fn load_outliving_the_scheduler_still_completes() {
        let scheduler = scheduler();
        let calls = Rc::new(Cell::new(0));

        let load = scheduler.preload("Skills", counting_loader(&calls, Ok(())));
        drop(scheduler);

        assert_eq!(load.await, Ok(()));
    }

    #[test]
    fn milestone_latch_fires_once_past_threshold() {
        let mut latch = MilestoneLatch::default();

        assert!(!latch.observe(0.1));
        assert!(!latch.observe(0.25));
        assert!(latch.observe(0.26));
        assert!(latch.has_fired());
        assert!(!latch.observe(0.9));
        assert!(!latch.observe(0.1));
        assert!(!latch.observe(0.5));
    }

    #[test]
    fn milestone_latch_ignores_nan() {
        let mut latch = MilestoneLatch::default();
        assert!(!latch.observe(f64::NAN));
        assert!(!latch.has_fired());
    }

    #[test]
    fn bundle_urls_are_kebab_case() {
        assert_eq!(bundle_url("Skills"), "/bundles/skills.json");
        assert_eq!(bundle_url("ExperienceTimeline"), "/bundles/experience-timeline.json");
    }
}
