//! In-memory [`Transport`] whose replies are released on demand.
//!
//! Paths can be given a canned reply that every request receives at once.
//! Requests to any other path park until a test releases them with
//! [`ScriptedTransport::reply_json`] and friends. That gives full control over
//! the order in which responses arrive.

use super::transport::{HttpReply, Transport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Waiter = oneshot::Sender<Result<HttpReply>>;

#[derive(Debug, Clone)]
enum Canned {
    Reply(HttpReply),
    Failure(String),
}

impl Canned {
    fn to_result(&self) -> Result<HttpReply> {
        match self {
            Self::Reply(reply) => Ok(reply.clone()),
            Self::Failure(message) => Err(Error::Custom(message.clone())),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    canned: Mutex<HashMap<String, Canned>>,
    pending: Mutex<HashMap<String, VecDeque<Waiter>>>,
    requests: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request to `path` gets a 200 with `body` serialized as JSON
    pub fn always_json(&self, path: &str, body: &serde_json::Value) {
        self.set_canned(path, Canned::Reply(HttpReply::ok(body.to_string())));
    }

    /// Every request to `path` gets `status` with an empty body
    pub fn always_status(&self, path: &str, status: u16) {
        self.set_canned(
            path,
            Canned::Reply(HttpReply {
                status,
                body: String::new(),
            }),
        );
    }

    /// Every request to `path` fails at the transport level with `message`
    pub fn always_fail(&self, path: &str, message: &str) {
        self.set_canned(path, Canned::Failure(message.to_string()));
    }

    fn set_canned(&self, path: &str, canned: Canned) {
        lock(&self.canned).insert(path.to_string(), canned);
    }

    /// Paths requested so far, in request order
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    #[must_use]
    pub fn request_count(&self, path: &str) -> usize {
        lock(&self.requests).iter().filter(|p| *p == path).count()
    }

    /// Requests to `path` still waiting for a reply
    #[must_use]
    pub fn pending_count(&self, path: &str) -> usize {
        lock(&self.pending).get(path).map_or(0, VecDeque::len)
    }

    /// Wait until at least `count` requests to `path` are parked
    pub async fn wait_pending(&self, path: &str, count: usize) {
        wait_until(|| self.pending_count(path) >= count).await;
    }

    /// Release the oldest parked request to `path` with a 200 JSON reply
    pub fn reply_json(&self, path: &str, body: &serde_json::Value) -> bool {
        self.release(path, false, Ok(HttpReply::ok(body.to_string())))
    }

    /// Release the newest parked request to `path` with a 200 JSON reply
    pub fn reply_newest_json(&self, path: &str, body: &serde_json::Value) -> bool {
        self.release(path, true, Ok(HttpReply::ok(body.to_string())))
    }

    /// Release the oldest parked request to `path` with `status`
    pub fn reply_status(&self, path: &str, status: u16) -> bool {
        self.release(
            path,
            false,
            Ok(HttpReply {
                status,
                body: String::new(),
            }),
        )
    }

    /// Release the oldest parked request to `path` with a raw 200 body
    pub fn reply_body(&self, path: &str, body: &str) -> bool {
        self.release(path, false, Ok(HttpReply::ok(body)))
    }

    /// Fail the oldest parked request to `path` at the transport level
    pub fn fail(&self, path: &str, message: &str) -> bool {
        self.release(path, false, Err(Error::Custom(message.to_string())))
    }

    fn release(&self, path: &str, newest: bool, result: Result<HttpReply>) -> bool {
        let waiter = {
            let mut pending = lock(&self.pending);
            pending.get_mut(path).and_then(|queue| {
                if newest {
                    queue.pop_back()
                } else {
                    queue.pop_front()
                }
            })
        };

        waiter.is_some_and(|tx| tx.send(result).is_ok())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<HttpReply> {
        lock(&self.requests).push(path.to_string());

        let canned = lock(&self.canned).get(path).cloned();
        if let Some(canned) = canned {
            return canned.to_result();
        }

        let (tx, rx) = oneshot::channel();
        lock(&self.pending)
            .entry(path.to_string())
            .or_default()
            .push_back(tx);

        rx.await
            .map_err(|_| Error::Custom(format!("request to {path} was abandoned")))?
    }
}

/// Yield to the runtime until `condition` holds.
///
/// Callers should wrap this in `tokio::time::timeout`.
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    while !condition() {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_canned_reply_is_immediate() {
        let transport = ScriptedTransport::new();
        transport.always_json("/api/pie", &json!([]));

        let reply = transport.get("/api/pie").await.unwrap();
        assert_eq!(reply, HttpReply::ok("[]"));
        assert_eq!(transport.request_count("/api/pie"), 1);
    }

    #[tokio::test]
    async fn test_parked_requests_release_in_chosen_order() {
        let transport = Arc::new(ScriptedTransport::new());

        let first = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.get("/api/raw").await }
        });
        transport.wait_pending("/api/raw", 1).await;
        let second = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.get("/api/raw").await }
        });
        transport.wait_pending("/api/raw", 2).await;

        assert!(transport.reply_newest_json("/api/raw", &json!(["second"])));
        assert!(transport.fail("/api/raw", "boom"));
        assert!(!transport.reply_status("/api/raw", 500));

        assert_eq!(second.await.unwrap().unwrap().body, r#"["second"]"#);
        assert_eq!(first.await.unwrap().unwrap_err().to_string(), "boom");
    }
}
