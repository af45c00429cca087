//! View state and the event loop that drives feed requests.
//!
//! The state is an immutable [`ViewState`] that [`reduce`] replaces on every
//! event. [`Session::run`] owns it and keeps at most one request in flight: a
//! new submission aborts the previous request, and a completion tagged with an
//! older generation is dropped.

use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::dashboard::Dashboard;
use crate::error::{Failure, Result};
use crate::fetch::{HttpClient, fetch_feed};
use crate::range::DateRange;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    /// Incremented on every submission; completions must carry the current value.
    pub generation: u64,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Loading(DateRange),
    Ready(DateRange, Dashboard),
    Failed(DateRange, Failure),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.phase {
            Phase::Ready(_, dashboard) => Some(dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Submitted(DateRange),
    Completed {
        generation: u64,
        outcome: std::result::Result<Dashboard, Failure>,
    },
}

/// Computes the state that follows `event`.
pub fn reduce(state: &ViewState, event: Event) -> ViewState {
    match event {
        Event::Submitted(range) => ViewState {
            generation: state.generation + 1,
            phase: Phase::Loading(range),
        },
        Event::Completed { generation, outcome } => {
            let range = match &state.phase {
                Phase::Loading(range) if generation == state.generation => *range,
                _ => return state.clone(),
            };
            let phase = match outcome {
                Ok(dashboard) => Phase::Ready(range, dashboard),
                Err(failure) => Phase::Failed(range, failure),
            };
            ViewState { generation, phase }
        }
    }
}

/// Fetches one range and runs the aggregation over it.
pub async fn load_dashboard<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &Url,
    range: DateRange,
) -> Result<Dashboard> {
    let feed = fetch_feed(client, endpoint, range).await?;
    Dashboard::from_feed(&feed)
}

pub struct Session<C> {
    client: Arc<C>,
    endpoint: Url,
}

impl<C: HttpClient + 'static> Session<C> {
    pub fn new(client: C, endpoint: Url) -> Self {
        Self {
            client: Arc::new(client),
            endpoint,
        }
    }

    /// Processes submissions until the channel closes and nothing is in flight.
    ///
    /// `render` sees the initial state and every state that differs from the
    /// previous one. Returns the final state.
    pub async fn run(
        &self,
        mut submissions: mpsc::Receiver<DateRange>,
        mut render: impl FnMut(&ViewState),
    ) -> ViewState {
        let (done_tx, mut done_rx) = mpsc::channel(4);
        let mut state = ViewState::default();
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut open = true;

        render(&state);

        loop {
            let event = tokio::select! {
                submission = submissions.recv(), if open => match submission {
                    Some(range) => Event::Submitted(range),
                    None => {
                        debug!("Submission channel closed");
                        open = false;
                        if state.is_loading() {
                            continue;
                        }
                        break;
                    }
                },
                Some((generation, outcome)) = done_rx.recv() => Event::Completed { generation, outcome },
                else => break,
            };

            if let Event::Submitted(range) = &event {
                if let Some(handle) = in_flight.take() {
                    if !handle.is_finished() {
                        warn!(generation = state.generation, "Replacing the in-flight request");
                    }
                    handle.abort();
                }
                in_flight = Some(self.spawn_fetch(state.generation + 1, *range, done_tx.clone()));
            }

            let next = reduce(&state, event);
            if next == state {
                debug!("Stale completion ignored");
                continue;
            }
            state = next;
            render(&state);

            if !state.is_loading() {
                in_flight = None;
                if !open {
                    break;
                }
            }
        }

        state
    }

    fn spawn_fetch(
        &self,
        generation: u64,
        range: DateRange,
        done: mpsc::Sender<(u64, std::result::Result<Dashboard, Failure>)>,
    ) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let endpoint = self.endpoint.clone();
        let span = tracing::info_span!("load", generation, range = %range);

        tokio::spawn(
            async move {
                let outcome = load_dashboard(client.as_ref(), &endpoint, range)
                    .await
                    .map_err(Failure::from);
                match &outcome {
                    Ok(dashboard) => info!(total_count = dashboard.summary.total_count, "Feed loaded"),
                    Err(failure) => warn!(kind = %failure.kind, message = %failure.message, "Feed load failed"),
                }
                let _ = done.send((generation, outcome)).await;
            }
            .instrument(span),
        )
    }
}
