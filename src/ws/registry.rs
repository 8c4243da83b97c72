//! Event handler registry and dispatch

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Receives the `data` payload of inbound events of one type
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, data: Value);
}

#[async_trait]
impl<F> EventHandler for F
where
    F: Fn(Value) + Send + Sync,
{
    async fn handle(&self, data: Value) {
        self(data)
    }
}

/// Append-only mapping from event type to handlers, in registration order
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `event_type`
    pub fn register(&mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry(event_type.into())
            .or_default()
            .push(handler);
    }

    /// Snapshot of the handlers for `event_type`
    pub fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers.get(event_type).cloned().unwrap_or_default()
    }

    /// Number of handlers registered for `event_type`
    pub fn count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

/// Spawn one task per handler, in registration order. On a current-thread
/// runtime they also start in that order; a multi-thread runtime may start
/// them in any order. A panicking handler only takes down its own task.
pub fn dispatch(handlers: Vec<Arc<dyn EventHandler>>, data: Value) {
    for handler in handlers {
        let data = data.clone();
        tokio::spawn(async move {
            handler.handle(data).await;
        });
    }
}
