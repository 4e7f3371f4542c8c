use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::store::{GraphStore, QueryResults, StoreError};

/// In-process [`GraphStore`] answering every query with the same outcome.
///
/// Clones share the record of received queries.
#[derive(Clone)]
pub struct StubStore {
    outcome: Result<QueryResults, StoreError>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Default for StubStore {
    fn default() -> Self {
        Self::with_results(QueryResults::solutions(Vec::new(), Vec::new()))
    }
}

impl StubStore {
    #[must_use]
    pub fn with_results(results: QueryResults) -> Self {
        Self {
            outcome: Ok(results),
            queries: Arc::default(),
        }
    }

    #[must_use]
    pub fn with_error(error: StoreError) -> Self {
        Self {
            outcome: Err(error),
            queries: Arc::default(),
        }
    }

    /// Queries received so far, in order.
    ///
    /// # Panics
    /// Panics when the record lock is poisoned.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphStore for StubStore {
    async fn query(&self, query: &str) -> Result<QueryResults, StoreError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone()
    }

    fn location(&self) -> String {
        "stub://jaguars".to_string()
    }
}
