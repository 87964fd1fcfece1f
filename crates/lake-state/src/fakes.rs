//! In-memory fake for the content lake (testing only)
//!
//! `MemoryLake` records every call it receives, answers queries from stubs
//! registered up front and can be told to fail actions or mutations. It does
//! not evaluate query text.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::backend::{ContentLake, LakeResult};
use crate::error::LakeError;
use crate::schema::{Action, ActionResult, Mutation, MutationOutcome, MutationResult, Query, Visibility};

/// One call observed by `MemoryLake`.
#[derive(Debug, Clone, PartialEq)]
pub enum LakeCall {
    Fetch(Query),
    Actions(Vec<Action>),
    Mutate {
        mutations: Vec<Mutation>,
        visibility: Visibility,
    },
}

#[derive(Debug)]
struct QueryStub {
    query: String,
    params: Map<String, Value>,
    response: LakeResult<Vec<Value>>,
}

impl QueryStub {
    fn matches(&self, query: &Query) -> bool {
        self.query == query.query
            && self
                .params
                .iter()
                .all(|(name, value)| query.params.get(name) == Some(value))
    }
}

/// Call-recording content lake backed by stubbed query responses.
///
/// Queries without a matching stub return no rows. Stubs match on exact
/// query text plus a subset of params; the first registered match wins.
#[derive(Debug, Default)]
pub struct MemoryLake {
    calls: Mutex<Vec<LakeCall>>,
    stubs: Mutex<Vec<QueryStub>>,
    action_failure: Mutex<Option<LakeError>>,
    mutation_failure: Mutex<Option<LakeError>>,
}

impl MemoryLake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `rows` whenever every param in `params` matches.
    pub fn stub_query(&self, query: &str, params: Value, rows: Vec<Value>) {
        self.push_stub(query, params, Ok(rows));
    }

    /// Fail `query` with `error` whenever every param in `params` matches.
    pub fn stub_query_error(&self, query: &str, params: Value, error: LakeError) {
        self.push_stub(query, params, Err(error));
    }

    /// Fail every subsequent actions dispatch.
    pub fn fail_actions(&self, error: LakeError) {
        *self.action_failure.lock().unwrap() = Some(error);
    }

    /// Fail every subsequent transaction commit.
    pub fn fail_mutations(&self, error: LakeError) {
        *self.mutation_failure.lock().unwrap() = Some(error);
    }

    /// Every call in arrival order.
    pub fn calls(&self) -> Vec<LakeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Actions from each dispatch, in arrival order.
    pub fn dispatched_actions(&self) -> Vec<Vec<Action>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LakeCall::Actions(actions) => Some(actions),
                _ => None,
            })
            .collect()
    }

    /// Mutations and visibility from each commit, in arrival order.
    pub fn commits(&self) -> Vec<(Vec<Mutation>, Visibility)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LakeCall::Mutate {
                    mutations,
                    visibility,
                } => Some((mutations, visibility)),
                _ => None,
            })
            .collect()
    }

    /// Queries received, in arrival order.
    pub fn fetches(&self) -> Vec<Query> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LakeCall::Fetch(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn push_stub(&self, query: &str, params: Value, response: LakeResult<Vec<Value>>) {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.stubs.lock().unwrap().push(QueryStub {
            query: query.to_string(),
            params,
            response,
        });
    }

    fn record(&self, call: LakeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn transaction_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl ContentLake for MemoryLake {
    async fn fetch(&self, query: &Query) -> LakeResult<Vec<Value>> {
        self.record(LakeCall::Fetch(query.clone()));
        let stubs = self.stubs.lock().unwrap();
        match stubs.iter().find(|stub| stub.matches(query)) {
            Some(stub) => stub.response.clone(),
            None => Ok(Vec::new()),
        }
    }

    async fn perform_actions(&self, actions: Vec<Action>) -> LakeResult<ActionResult> {
        self.record(LakeCall::Actions(actions));
        if let Some(err) = self.action_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(ActionResult {
            transaction_id: transaction_id(),
        })
    }

    async fn mutate(
        &self,
        mutations: Vec<Mutation>,
        visibility: Visibility,
    ) -> LakeResult<MutationResult> {
        let results: Vec<MutationOutcome> = mutations
            .iter()
            .map(|m| MutationOutcome {
                id: m
                    .target_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                operation: Some(
                    match m {
                        Mutation::Delete { .. } => "delete",
                        Mutation::Patch(_) => "update",
                        _ => "create",
                    }
                    .to_string(),
                ),
            })
            .collect();
        self.record(LakeCall::Mutate {
            mutations,
            visibility,
        });
        if let Some(err) = self.mutation_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(MutationResult {
            transaction_id: transaction_id(),
            document_id: results.first().map(|r| r.id.clone()),
            results,
        })
    }
}
