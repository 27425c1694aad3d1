use crate::display::error::RenderError;
use crate::display::MatrixBackend;
use crate::fetcher::{FetchOutcome, FlightSource};
use crate::renderer::{page_count, render, BoardView, Layout};
use crate::thread_manager::SteppableTask;
use crate::types::{BoundingBox, FeedStatus, Snapshot};

/// Last-known-good snapshot plus the health of the feed behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    snapshot: Snapshot,
    status: FeedStatus,
}

impl BoardState {
    #[must_use]
    pub fn new() -> Self {
        BoardState {
            snapshot: Snapshot::empty(),
            status: FeedStatus::Waiting,
        }
    }

    /// A success replaces the snapshot wholesale. A failure keeps the previous
    /// snapshot (empty if there never was one) and marks the feed stale.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.status = FeedStatus::Live;
            }
            Err(error) => {
                let failures = match self.status {
                    FeedStatus::Stale { failures, .. } => failures.saturating_add(1),
                    FeedStatus::Waiting | FeedStatus::Live => 1,
                };
                self.status = FeedStatus::Stale {
                    failures,
                    last_error: error.kind(),
                };
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn status(&self) -> FeedStatus {
        self.status
    }

    #[must_use]
    pub fn view(&self, page: usize) -> BoardView<'_> {
        BoardView {
            snapshot: &self.snapshot,
            status: &self.status,
            page,
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState::new()
    }
}

/// Advances the visible page every `ticks_per_page` refresh ticks.
#[derive(Debug, Clone)]
pub struct Pager {
    ticks_per_page: u64,
    ticks: u64,
}

impl Pager {
    #[must_use]
    pub fn new(ticks_per_page: u64) -> Self {
        Pager {
            ticks_per_page: ticks_per_page.max(1),
            ticks: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn page(&self, pages: usize) -> usize {
        ((self.ticks / self.ticks_per_page) % pages.max(1) as u64) as usize
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Back to the first page, used when a new snapshot arrives.
    pub fn restart(&mut self) {
        self.ticks = 0;
    }
}

/// Drains fetch outcomes, keeps the board state and redraws when it changes.
pub struct DisplayTask<B: MatrixBackend> {
    receiver: crossbeam_channel::Receiver<FetchOutcome>,
    backend: B,
    layout: Layout,
    state: BoardState,
    pager: Pager,
    last_presented: Option<(FeedStatus, usize)>,
    needs_redraw: bool,
}

impl<B: MatrixBackend> DisplayTask<B> {
    #[must_use]
    pub fn new(
        receiver: crossbeam_channel::Receiver<FetchOutcome>,
        backend: B,
        layout: Layout,
        ticks_per_page: u64,
    ) -> Self {
        DisplayTask {
            receiver,
            backend,
            layout,
            state: BoardState::new(),
            pager: Pager::new(ticks_per_page),
            last_presented: None,
            needs_redraw: true,
        }
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    fn drain_outcomes(&mut self) {
        for outcome in self.receiver.try_iter() {
            if outcome.is_ok() {
                self.pager.restart();
            }
            self.state.apply(outcome);
            self.needs_redraw = true;
        }
    }

    fn present_current_page(&mut self) {
        let page = self.pager.page(page_count(self.state.snapshot().len()));
        let current = (self.state.status(), page);
        if !self.needs_redraw && self.last_presented == Some(current) {
            return;
        }

        let frame = render(&self.state.view(page), &self.layout);
        match self.backend.present(&frame) {
            Ok(()) => {
                self.last_presented = Some(current);
                self.needs_redraw = false;
            }
            // Left flagged so the next tick retries
            Err(err) => log::error!("DisplayTask: {err}"),
        }
    }
}

impl<B: MatrixBackend> SteppableTask for DisplayTask<B> {
    fn step(&mut self) -> bool {
        self.drain_outcomes();
        self.present_current_page();
        self.pager.tick();
        true
    }

    fn finish(&mut self) {
        log::info!("DisplayTask: Clearing display.");
        if let Err(err) = self.backend.clear() {
            log::error!("DisplayTask: Failed to clear display: {err}");
        }
    }
}

/// One strictly sequential fetch, render and present cycle.
pub fn run_single_cycle<S, B>(
    source: &mut S,
    bounding_box: &BoundingBox,
    layout: &Layout,
    backend: &mut B,
) -> Result<BoardState, RenderError>
where
    S: FlightSource,
    B: MatrixBackend,
{
    let mut state = BoardState::new();
    let outcome = source.fetch(bounding_box);
    match &outcome {
        Ok(snapshot) => log::info!("Fetched {} flight(s).", snapshot.len()),
        Err(err) => log::warn!("Fetch failed: {err}"),
    }
    state.apply(outcome);
    backend.present(&render(&state.view(0), layout))?;
    Ok(state)
}
