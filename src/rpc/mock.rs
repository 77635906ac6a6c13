use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::error::{Result, RpcError};
use super::transport::Transport;

/// Replays canned response bodies and records every request body.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Value>>>,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockTransport {
    pub fn with_results(results: Vec<Value>) -> Self {
        let responses = results
            .into_iter()
            .map(|result| serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}))
            .collect();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::default(),
        }
    }

    pub fn push_body(&self, body: Value) {
        self.responses.lock().unwrap().push_back(body);
    }

    pub fn params(&self, index: usize) -> Value {
        self.requests.lock().unwrap()[index]["params"].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn post(&self, _url: &str, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RpcError::UnexpectedResponse("no canned response".to_string()))
    }
}
