pub mod backoff;
pub mod error;

use crate::fetcher::backoff::{ticks_to_honour, Backoff};
use crate::fetcher::error::FetchError;
use crate::thread_manager::SteppableTask;
use crate::types::{BoundingBox, Snapshot};

pub type FetchOutcome = Result<Snapshot, FetchError>;

/// Anything that can produce a snapshot of the aircraft inside a bounding box.
pub trait FlightSource: Send + 'static {
    fn fetch(&mut self, bounding_box: &BoundingBox) -> FetchOutcome;
}

/// Polls a [`FlightSource`] once per tick and forwards every outcome.
pub struct FetchTask<S: FlightSource> {
    source: S,
    bounding_box: BoundingBox,
    period: std::time::Duration,
    sender: crossbeam_channel::Sender<FetchOutcome>,
    backoff: Backoff,
    ticks_to_skip: u32,
}

impl<S: FlightSource> FetchTask<S> {
    #[must_use]
    pub fn new(
        source: S,
        bounding_box: BoundingBox,
        period: std::time::Duration,
        max_backoff_ticks: u32,
        sender: crossbeam_channel::Sender<FetchOutcome>,
    ) -> Self {
        FetchTask {
            source,
            bounding_box,
            period,
            sender,
            backoff: Backoff::new(max_backoff_ticks),
            ticks_to_skip: 0,
        }
    }

    fn plan_retry(&mut self, error: &FetchError) {
        let backoff_ticks = self.backoff.on_failure();
        let rate_limit_ticks = error
            .retry_after()
            .map_or(0, |retry_after| ticks_to_honour(retry_after, self.period));
        self.ticks_to_skip = backoff_ticks.max(rate_limit_ticks);
        log::warn!(
            "Fetch failed ({0} in a row): {error}. Skipping {1} tick(s).",
            self.backoff.consecutive_failures(),
            self.ticks_to_skip
        );
    }
}

impl<S: FlightSource> SteppableTask for FetchTask<S> {
    fn step(&mut self) -> bool {
        if self.ticks_to_skip > 0 {
            self.ticks_to_skip -= 1;
            log::debug!("Backing off, {} tick(s) left.", self.ticks_to_skip);
            return true;
        }

        let outcome = self.source.fetch(&self.bounding_box);
        match &outcome {
            Ok(snapshot) => {
                log::info!("Fetched {} flight(s).", snapshot.len());
                self.backoff.reset();
            }
            Err(error) => self.plan_retry(error),
        }

        if let Err(err) = self.sender.send(outcome) {
            log::error!("FetchTask: display side disconnected: {err}");
            return false;
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{FetchOutcome, FetchTask, FlightSource};
    use crate::fetcher::error::FetchError;
    use crate::thread_manager::SteppableTask;
    use crate::types::{BoundingBox, Snapshot};

    /// Replays a fixed list of outcomes, then keeps failing with status 503.
    pub(crate) struct ScriptedSource {
        outcomes: std::collections::VecDeque<FetchOutcome>,
        pub calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl ScriptedSource {
        pub(crate) fn new(outcomes: Vec<FetchOutcome>) -> Self {
            ScriptedSource {
                outcomes: outcomes.into(),
                calls: std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0)),
            }
        }
    }

    impl FlightSource for ScriptedSource {
        fn fetch(&mut self, _bounding_box: &BoundingBox) -> FetchOutcome {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.outcomes
                .pop_front()
                .unwrap_or(Err(FetchError::Status(503)))
        }
    }

    fn london() -> BoundingBox {
        BoundingBox::new(51.2868, 51.6918, -0.5103, 0.3340).unwrap()
    }

    fn fetch_task(
        source: ScriptedSource,
    ) -> (
        FetchTask<ScriptedSource>,
        crossbeam_channel::Receiver<FetchOutcome>,
    ) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let task = FetchTask::new(
            source,
            london(),
            std::time::Duration::from_secs(10),
            8,
            sender,
        );
        (task, receiver)
    }

    #[test]
    fn when_fetch_succeeds_then_snapshot_is_forwarded() {
        let (mut task, receiver) = fetch_task(ScriptedSource::new(vec![Ok(Snapshot::empty())]));

        assert!(task.step());

        let outcome = receiver.try_recv().expect("outcome forwarded");
        assert_eq!(outcome.unwrap(), Snapshot::empty());
    }

    #[test]
    fn when_fetch_fails_then_error_is_forwarded_and_task_keeps_running() {
        let (mut task, receiver) =
            fetch_task(ScriptedSource::new(vec![Err(FetchError::Status(500))]));

        assert!(task.step());

        let outcome = receiver.try_recv().expect("outcome forwarded");
        assert!(matches!(outcome, Err(FetchError::Status(500))));
    }

    #[test]
    fn when_failures_repeat_then_ticks_are_skipped_before_retrying() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::Status(500)),
            Err(FetchError::Status(500)),
            Ok(Snapshot::empty()),
        ]);
        let calls = source.calls.clone();
        let (mut task, receiver) = fetch_task(source);

        // fail, retry immediately, fail again, skip one, then succeed
        for _ in 0..4 {
            assert!(task.step());
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
        let outcomes: Vec<FetchOutcome> = receiver.try_iter().collect();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn when_rate_limited_then_retry_after_is_honoured() {
        let source = ScriptedSource::new(vec![Err(FetchError::RateLimited {
            retry_after: Some(std::time::Duration::from_secs(35)),
        })]);
        let calls = source.calls.clone();
        let (mut task, _receiver) = fetch_task(source);

        // 35s at a 10s period means three skipped ticks
        for _ in 0..4 {
            assert!(task.step());
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        assert!(task.step());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn when_receiver_is_dropped_then_task_stops() {
        let (mut task, receiver) = fetch_task(ScriptedSource::new(vec![Ok(Snapshot::empty())]));
        drop(receiver);

        assert!(!task.step());
    }
}
