//! Scripted transport double
//!
//! Replays queued responses in FIFO order and records every request it sees.
//! An empty queue answers with a `Send` error, so an unexpected extra call
//! fails loudly instead of hanging.

use crate::{Error, HttpRequest, HttpResponse, HttpTransport, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` (tokio time) before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response with the given status and raw body.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        lock(&self.responses).push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, value: serde_json::Value) {
        self.push_response(status, value.to_string());
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: Error) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Snapshot of all requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HttpTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        lock(&self.requests).push(request);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            lock(&self.responses)
                .pop_front()
                .unwrap_or_else(|| Err(Error::Send("no scripted response queued".into())))
        })
    }
}
