//! Fire-and-forget audit events
//!
//! The security/audit subsystem lives outside this core. Operations emit
//! structured events into an [`AuditSink`]; whatever the sink does (or
//! fails to do) with them never affects the operation's result, so the
//! trait is infallible by design of the interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Event severity, mirrored from the security log's levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One structured audit event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: String,
    /// Username of the acting user, when one is known.
    pub actor: Option<String>,
    pub details: Map<String, Value>,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(event_type: impl Into<String>, severity: Severity) -> Self {
        Self {
            event_type: event_type.into(),
            actor: None,
            details: Map::new(),
            severity,
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, username: impl Into<String>) -> Self {
        self.actor = Some(username.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Receives audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits audit events as `tracing` records.
#[derive(Clone, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        let details = Value::Object(event.details.clone()).to_string();
        match event.severity {
            Severity::Low => tracing::info!(
                event_type = %event.event_type,
                actor = event.actor.as_deref().unwrap_or("system"),
                %details,
                "audit event"
            ),
            Severity::Medium => tracing::info!(
                event_type = %event.event_type,
                actor = event.actor.as_deref().unwrap_or("system"),
                %details,
                "audit event"
            ),
            Severity::High | Severity::Critical => tracing::warn!(
                event_type = %event.event_type,
                actor = event.actor.as_deref().unwrap_or("system"),
                %details,
                "audit event"
            ),
        }
    }
}

/// Collects audit events in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
