/// Work the orchestrator must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Launch a browser session and navigate it to `url`.
    OpenSession { url: String },
    CountRows,
    /// Extract the row at the 1-based `index`.
    ExtractRow { index: usize },
    ReleaseSession,
    /// Hand every extracted record to the persister.
    PersistRecords,
}
