//! Convergence polling for asynchronously reconciled resources.
//!
//! The control plane acknowledges mutations immediately and converges
//! out-of-band. [`poll_until`] is the synchronization point: it refetches
//! the resource on a fixed interval until a readiness predicate reports a
//! terminal state or the deadline expires. Every resource handler funnels
//! its create/update/delete confirmation through this one loop.

use std::future::Future;
use std::time::Duration;

use kube::api::Api;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{HasConditions, HasGeneration};
use crate::conditions::{is_condition_true, CONDITION_READY};
use crate::error::{ProviderError, Result};

/// Default interval between fetch attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Shorter interval for lightweight confirmations (service account bindings).
pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Classification of one observed fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    /// The resource reached the caller's terminal condition.
    Converged,
    /// Not there yet; fetch again after the interval.
    Pending,
    /// Terminal failure; polling stops immediately.
    Failed(String),
}

/// Identifies what to poll and for how long. Created fresh per mutating
/// call; the deadline is fixed at construction.
#[derive(Debug, Clone)]
pub struct PollParams {
    pub kind: &'static str,
    pub namespace: String,
    pub name: String,
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollParams {
    pub fn new(kind: &'static str, namespace: &str, name: &str, timeout: Duration) -> Self {
        Self {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn describe(&self) -> String {
        format!("{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// What a successful poll observed.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Number of fetches performed, including the converging one.
    pub attempts: u32,
    /// Wall time from first fetch to convergence.
    pub elapsed: Duration,
}

/// Polls `fetch` until `classify` reports [`ReadyState::Converged`].
///
/// Returns immediately on `Converged` or `Failed`. On `Pending` the loop
/// sleeps one interval, then checks the deadline before fetching again, so
/// the call never blocks past the deadline plus one in-flight fetch. The
/// sleep races `cancel`; a cancelled caller aborts the poll early.
pub async fn poll_until<T, F, Fut, C>(
    params: &PollParams,
    cancel: &CancellationToken,
    mut fetch: F,
    classify: C,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&Result<T>) -> ReadyState,
{
    let started = Instant::now();
    let deadline = started + params.timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let observed = fetch().await;
        match classify(&observed) {
            ReadyState::Converged => {
                let elapsed = started.elapsed();
                info!(
                    "{} converged after {} attempt(s) in {:?}",
                    params.describe(),
                    attempts,
                    elapsed
                );
                return Ok(PollOutcome { attempts, elapsed });
            }
            ReadyState::Failed(reason) => {
                return Err(ProviderError::ConvergenceFailed(format!(
                    "{}: {}",
                    params.describe(),
                    reason
                )));
            }
            ReadyState::Pending => {
                debug!(
                    "{} still pending after attempt {}, sleeping {:?}",
                    params.describe(),
                    attempts,
                    params.interval
                );
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(params.interval) => {}
            _ = cancel.cancelled() => {
                return Err(ProviderError::Cancelled(format!(
                    "{}: wait aborted by caller after {:?}",
                    params.describe(),
                    started.elapsed()
                )));
            }
        }

        if Instant::now() >= deadline {
            return Err(ProviderError::Timeout(format!(
                "{} did not converge within {:?} ({} attempt(s))",
                params.describe(),
                params.timeout,
                attempts
            )));
        }
    }
}

/// Fetches a named object, mapping kube errors into [`ProviderError`].
pub async fn fetch_named<T>(api: &Api<T>, name: &str) -> Result<T>
where
    T: Clone + serde::de::DeserializeOwned + std::fmt::Debug,
{
    api.get(name).await.map_err(ProviderError::from)
}

/// Create-confirmation predicate: converged once the "Ready" condition
/// reports "True". A freshly created resource may not be readable yet, so
/// "not found" counts as pending; any other fetch error is terminal.
pub fn ready_condition_met<T: HasConditions>(observed: &Result<T>) -> ReadyState {
    match observed {
        Ok(resource) => {
            if is_condition_true(resource.conditions(), CONDITION_READY) {
                ReadyState::Converged
            } else {
                ReadyState::Pending
            }
        }
        Err(e) if e.is_not_found() => ReadyState::Pending,
        Err(e) => ReadyState::Failed(e.to_string()),
    }
}

/// Update-confirmation predicate: converged once the control plane has
/// processed the latest spec (`observedGeneration >= generation`). The
/// resource is expected to exist, so "not found" is terminal.
pub fn generation_observed<T: HasGeneration>(observed: &Result<T>) -> ReadyState {
    match observed {
        Ok(resource) => match (resource.generation(), resource.observed_generation()) {
            (Some(gen), Some(observed_gen)) if observed_gen >= gen => ReadyState::Converged,
            _ => ReadyState::Pending,
        },
        Err(e) if e.is_not_found() => {
            ReadyState::Failed(format!("resource disappeared while waiting: {}", e))
        }
        Err(e) => ReadyState::Failed(e.to_string()),
    }
}

/// Delete-confirmation predicate: converged once the fetch reports "not
/// found". Any other fetch error is terminal rather than retried, so a
/// permissions failure surfaces immediately instead of spinning until the
/// deadline.
pub fn confirmed_absent<T>(observed: &Result<T>) -> ReadyState {
    match observed {
        Ok(_) => ReadyState::Pending,
        Err(e) if e.is_not_found() => ReadyState::Converged,
        Err(e) => ReadyState::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Condition;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct FakeResource {
        conditions: Vec<Condition>,
        generation: Option<i64>,
        observed_generation: Option<i64>,
    }

    impl FakeResource {
        fn with_ready(status: &str) -> Self {
            Self {
                conditions: vec![Condition {
                    r#type: "Ready".to_string(),
                    status: status.to_string(),
                    last_transition_time: None,
                    reason: None,
                    message: None,
                }],
                generation: None,
                observed_generation: None,
            }
        }

        fn with_generations(generation: i64, observed: i64) -> Self {
            Self {
                conditions: Vec::new(),
                generation: Some(generation),
                observed_generation: Some(observed),
            }
        }

        fn empty() -> Self {
            Self {
                conditions: Vec::new(),
                generation: None,
                observed_generation: None,
            }
        }
    }

    impl HasConditions for FakeResource {
        fn conditions(&self) -> &[Condition] {
            &self.conditions
        }
    }

    impl HasGeneration for FakeResource {
        fn generation(&self) -> Option<i64> {
            self.generation
        }

        fn observed_generation(&self) -> Option<i64> {
            self.observed_generation
        }
    }

    fn not_found() -> ProviderError {
        ProviderError::NotFound("gone".to_string())
    }

    fn params(timeout_secs: u64, interval_secs: u64) -> PollParams {
        PollParams::new(
            "PulsarCluster",
            "acme",
            "demo",
            Duration::from_secs(timeout_secs),
        )
        .with_interval(Duration::from_secs(interval_secs))
    }

    // Predicate truth tables

    #[test]
    fn test_ready_predicate_truth_table() {
        let ready: Result<FakeResource> = Ok(FakeResource::with_ready("True"));
        assert_eq!(ready_condition_met(&ready), ReadyState::Converged);

        let not_ready: Result<FakeResource> = Ok(FakeResource::with_ready("False"));
        assert_eq!(ready_condition_met(&not_ready), ReadyState::Pending);

        let no_conditions: Result<FakeResource> = Ok(FakeResource::empty());
        assert_eq!(ready_condition_met(&no_conditions), ReadyState::Pending);

        let missing: Result<FakeResource> = Err(not_found());
        assert_eq!(ready_condition_met(&missing), ReadyState::Pending);

        let forbidden: Result<FakeResource> = Err(ProviderError::Api("403".to_string()));
        assert!(matches!(ready_condition_met(&forbidden), ReadyState::Failed(_)));
    }

    #[test]
    fn test_generation_predicate_truth_table() {
        let processed: Result<FakeResource> = Ok(FakeResource::with_generations(3, 3));
        assert_eq!(generation_observed(&processed), ReadyState::Converged);

        let lagging: Result<FakeResource> = Ok(FakeResource::with_generations(3, 2));
        assert_eq!(generation_observed(&lagging), ReadyState::Pending);

        let ahead: Result<FakeResource> = Ok(FakeResource::with_generations(3, 4));
        assert_eq!(generation_observed(&ahead), ReadyState::Converged);

        let no_status: Result<FakeResource> = Ok(FakeResource::empty());
        assert_eq!(generation_observed(&no_status), ReadyState::Pending);

        let missing: Result<FakeResource> = Err(not_found());
        assert!(matches!(generation_observed(&missing), ReadyState::Failed(_)));
    }

    #[test]
    fn test_absence_predicate_truth_table() {
        let still_there: Result<FakeResource> = Ok(FakeResource::empty());
        assert_eq!(confirmed_absent(&still_there), ReadyState::Pending);

        let missing: Result<FakeResource> = Err(not_found());
        assert_eq!(confirmed_absent(&missing), ReadyState::Converged);

        // Non-not-found errors fail fast instead of retrying.
        let forbidden: Result<FakeResource> = Err(ProviderError::Api("403".to_string()));
        assert!(matches!(confirmed_absent(&forbidden), ReadyState::Failed(_)));
    }

    // Poll loop behavior (paused clock: sleeps auto-advance)

    #[tokio::test(start_paused = true)]
    async fn test_immediate_convergence_performs_one_fetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let outcome = poll_until(
            &params(30, 10),
            &cancel,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<FakeResource, _>(not_found()) }
            },
            confirmed_absent,
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Zero sleeps: no simulated time elapsed.
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let outcome = poll_until(
            &params(30, 10),
            &cancel,
            move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        Ok(FakeResource::with_ready("False"))
                    } else {
                        Ok(FakeResource::with_ready("True"))
                    }
                }
            },
            ready_condition_met,
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_bounds_fetches_and_elapsed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let err = poll_until(
            &params(30, 10),
            &cancel,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(FakeResource::with_ready("False")) }
            },
            ready_condition_met,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(_)));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(40));
        // No more fetches than ceil(deadline / interval) + 1.
        assert!(calls.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_classification_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();

        let err = poll_until(
            &params(30, 10),
            &cancel,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<FakeResource, _>(ProviderError::Api("forbidden".to_string())) }
            },
            ready_condition_met,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::ConvergenceFailed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_during_sleep() {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            token.cancel();
        });

        let err = poll_until(
            &params(300, 10),
            &cancel,
            || async { Ok(FakeResource::with_ready("False")) },
            ready_condition_met,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Cancelled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_confirmation_after_two_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let cancel = CancellationToken::new();

        let outcome = poll_until(
            &params(60, 5),
            &cancel,
            move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        Ok(FakeResource::empty())
                    } else {
                        Err(not_found())
                    }
                }
            },
            confirmed_absent,
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 3);
    }
}
