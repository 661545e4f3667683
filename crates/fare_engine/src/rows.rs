use std::sync::Arc;

use crate::{BrowserError, PageSession, ResultsLayout};

/// Counts rendered result rows; zero means the query found no flights.
pub struct RowEnumerator {
    layout: Arc<dyn ResultsLayout>,
}

impl RowEnumerator {
    pub fn new(layout: Arc<dyn ResultsLayout>) -> Self {
        Self { layout }
    }

    pub async fn count<S: PageSession>(&self, session: &S) -> Result<usize, BrowserError> {
        Ok(session.query(self.layout.row_container()).await?.len())
    }
}
