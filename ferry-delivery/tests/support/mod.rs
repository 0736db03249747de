//! Shared harness for the failure policy tests
#![allow(dead_code)] // Not every test uses every helper

use std::{sync::Arc, time::SystemTime};

use ferry_delivery::{
    DeliveryRequest, FailurePolicy, PolicyConfig, Recipient, SmtpSession, TraceFlags,
    backends::{MemoryQueue, MemoryStatusLog},
};

pub const QUEUE_ID: &str = "4B7E2C19D0";

pub struct Harness {
    pub defer: Arc<MemoryStatusLog>,
    pub bounce: Arc<MemoryStatusLog>,
    pub queue: Arc<MemoryQueue>,
    pub policy: FailurePolicy,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PolicyConfig::default())
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        let defer = Arc::new(MemoryStatusLog::new());
        let bounce = Arc::new(MemoryStatusLog::new());
        let queue = Arc::new(MemoryQueue::new());
        let policy = FailurePolicy::new(config, defer.clone(), bounce.clone(), queue.clone());

        Self {
            defer,
            bounce,
            queue,
            policy,
        }
    }

    /// Total records across both logs
    pub fn logged(&self) -> usize {
        self.defer.len() + self.bounce.len()
    }
}

/// A request for three pending recipients.
pub fn request() -> DeliveryRequest {
    DeliveryRequest::new(
        QUEUE_ID,
        SystemTime::UNIX_EPOCH,
        vec![
            Recipient::new("alice@example.com", "alice@example.com", 1024),
            Recipient::new("bob@example.com", "bob@mail.example.com", 1088),
            Recipient::new("carol@example.com", "carol@example.com", 1152),
        ],
    )
    .with_trace_flags(TraceFlags::RECORD)
}

pub fn session() -> SmtpSession {
    SmtpSession::new("mx1.example.com", "192.0.2.25")
}

pub const PEER: &str = "mx1.example.com[192.0.2.25]";
