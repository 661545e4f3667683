use crate::Phase;

/// Read-only snapshot of an invocation, for logging and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapeSummary {
    pub phase: Phase,
    pub trail: Vec<Phase>,
    pub rows_total: usize,
    pub rows_extracted: usize,
    pub rows_skipped: usize,
    pub stored: usize,
    pub store_failures: usize,
    pub search_clicked: Option<bool>,
    pub failure: Option<String>,
}

impl ScrapeSummary {
    pub fn no_flights(&self) -> bool {
        self.trail.contains(&Phase::Empty)
    }
}
