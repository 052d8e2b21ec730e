#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use wa_sdk::{Client, Result, Transport, TransportRequest};

pub const KEY: &str = "0123456789abcdefghijABCDEFGHIJkl";

/// Transport double: replays queued responses and records every request.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Option<Value>>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, body: Option<Value>) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn fail(&self, err: wa_sdk::Error) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<Option<Value>> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no response queued for fake transport")
    }
}

pub fn client_with(transport: &Arc<FakeTransport>) -> Client {
    Client::builder(KEY)
        .host("http://wrapapi.test")
        .transport(transport.clone())
        .build()
        .unwrap()
}
