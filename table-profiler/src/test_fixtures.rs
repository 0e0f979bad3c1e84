//! Canned stores for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::TypeOracle;
use crate::store::{StoreClient, TabularResult, Value};

/// A [`StoreClient`] that answers from a list of canned results.
///
/// A query receives the result of the first registered needle it contains;
/// anything else gets the empty result, like a failed query would.
#[derive(Debug, Default)]
pub struct CannedStore {
    responses: Vec<(String, TabularResult)>,
    executed: Mutex<Vec<String>>,
}

impl CannedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, needle: impl Into<String>, result: TabularResult) -> Self {
        self.responses.push((needle.into(), result));
        self
    }

    /// Every query executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreClient for CannedStore {
    async fn execute(&self, query: &str) -> TabularResult {
        self.executed.lock().unwrap().push(query.to_string());
        self.responses
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default()
    }

    fn type_oracle(&self) -> TypeOracle {
        TypeOracle::postgres()
    }
}

/// A one-cell result, as returned by the aggregate queries.
pub fn scalar(alias: &str, value: impl Into<Value>) -> TabularResult {
    TabularResult::new(vec![alias.to_string()], vec![vec![value.into()]])
}
