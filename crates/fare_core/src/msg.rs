#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin an invocation against the results page at `url`.
    Start { url: String },
    /// The initial load reached quiescence; `current_url` is where the browser ended up.
    PageLoaded { current_url: String },
    /// The redirect branch finished; `clicked` is false when no submit control was found.
    SearchSubmitted { clicked: bool },
    /// Scroll and settle delay are done; the session now belongs to the orchestrator.
    Settled,
    RowsCounted(usize),
    /// Row `index` was processed; `extracted` is false when it was skipped.
    RowFinished { index: usize, extracted: bool },
    PersistFinished { stored: usize, failed: usize },
    /// Any unhandled error; ends the invocation.
    Failed { reason: String },
}
