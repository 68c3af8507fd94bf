// In-memory upstream replaying canned bodies, for tests.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use super::{Endpoint, Upstream};
use crate::error::UpstreamError;

#[derive(Default)]
pub(crate) struct ScriptedUpstream {
    bodies: Mutex<HashMap<Endpoint, Value>>,
    calls: Mutex<Vec<(Endpoint, Vec<(&'static str, String)>)>>,
}

impl ScriptedUpstream {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `endpoint`. Unscripted endpoints fail.
    pub(crate) fn with(self, endpoint: Endpoint, body: Value) -> Self {
        self.set(endpoint, body);
        self
    }

    pub(crate) fn set(&self, endpoint: Endpoint, body: Value) {
        self.bodies.lock().insert(endpoint, body);
    }

    pub(crate) fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().iter().filter(|(e, _)| *e == endpoint).count()
    }

    pub(crate) fn last_form(&self, endpoint: Endpoint) -> Option<Vec<(&'static str, String)>> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|(e, _)| *e == endpoint)
            .map(|(_, form)| form.clone())
    }
}

#[async_trait::async_trait]
impl Upstream for ScriptedUpstream {
    async fn post(&self, endpoint: Endpoint, form: &[(&'static str, String)])
        -> Result<Value, UpstreamError>
    {
        self.calls.lock().push((endpoint, form.to_vec()));
        self.bodies
            .lock()
            .get(&endpoint)
            .cloned()
            .ok_or_else(|| UpstreamError::Decode {
                endpoint: endpoint.path(),
                reason: "connection refused (scripted)".into(),
            })
    }
}
