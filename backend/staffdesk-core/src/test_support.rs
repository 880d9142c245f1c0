// src/test_support.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::api_client::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::error::{io_context, Result};
use crate::session::Session;

enum Reply {
    Respond(StatusCode, Vec<u8>),
    NetworkDown,
}

/// Transport answering from per-route queues keyed `"METHOD path"`.
/// Every request is recorded; an unscripted route answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, route: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn reply_json(&self, route: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.push(route, Reply::Respond(status, body.to_string().into_bytes()));
    }

    pub fn reply_ok(&self, route: &str, body: Value) {
        self.reply_json(route, 200, body);
    }

    pub fn fail_network(&self, route: &str) {
        self.push(route, Reply::NetworkDown);
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_routes(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path()))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let route = format!("{} {}", request.method, request.path());
        self.sent.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|queue| queue.pop_front());
        match reply {
            Some(Reply::Respond(status, body)) => Ok(ApiResponse { status, body }),
            Some(Reply::NetworkDown) => Err(io_context(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
                format!("Simulated network failure for {}", route),
            )),
            None => Ok(ApiResponse {
                status: StatusCode::NOT_FOUND,
                body: Vec::new(),
            }),
        }
    }
}

/// A client over a scripted transport with a signed-in in-memory session.
pub fn signed_in_client() -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new();
    let session = Session::in_memory();
    session.set_token("test-token").unwrap();
    (ApiClient::new(transport.clone(), session), transport)
}
