use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::SystemTime,
};

use parking_lot::Mutex;

use crate::{
    error::{LogError, QueueError},
    recorder::{QueueTracker, StatusLog, StatusRecord},
    request::{QueueId, TraceFlags},
};

/// An owned copy of a [`StatusRecord`] as kept by [`MemoryStatusLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRecord {
    pub trace_flags: TraceFlags,
    pub queue_id: QueueId,
    pub original: String,
    pub address: String,
    pub offset: u64,
    pub peer: String,
    pub arrival_time: SystemTime,
    pub reason: String,
}

impl From<&StatusRecord<'_>> for LoggedRecord {
    fn from(record: &StatusRecord<'_>) -> Self {
        Self {
            trace_flags: record.trace_flags,
            queue_id: record.queue_id.clone(),
            original: record.original.to_string(),
            address: record.address.to_string(),
            offset: record.offset,
            peer: record.peer.to_string(),
            arrival_time: record.arrival_time,
            reason: record.reason.to_string(),
        }
    }
}

/// In-memory status log
///
/// Records are kept in append order behind a mutex, so appends from
/// concurrent attempts interleave as whole records. The log can be switched
/// into a failing mode, or told to refuse individual appends, to exercise
/// how callers cope with an unavailable logging service.
#[derive(Debug, Default)]
pub struct MemoryStatusLog {
    records: Mutex<Vec<LoggedRecord>>,
    failing: AtomicBool,
    appends: AtomicUsize,
    refused: Mutex<Vec<usize>>,
}

impl MemoryStatusLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While `failing` is set every append is refused.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Refuse the `nth` append made to this log, counting from 1 and
    /// including appends that were refused.
    pub fn refuse_append(&self, nth: usize) {
        self.refused.lock().push(nth);
    }

    /// Snapshot of the records appended so far
    #[must_use]
    pub fn records(&self) -> Vec<LoggedRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatusLog for MemoryStatusLog {
    fn append(&self, record: &StatusRecord<'_>) -> Result<(), LogError> {
        let call = self.appends.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing.load(Ordering::SeqCst) || self.refused.lock().contains(&call) {
            return Err(LogError::Unavailable(format!(
                "memory log refusing record for {}",
                record.queue_id
            )));
        }

        self.records.lock().push(LoggedRecord::from(record));
        Ok(())
    }
}

/// In-memory queue tracker remembering which recipient offsets were marked
/// as done.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    delivered: Mutex<Vec<(QueueId, u64)>>,
    failing: AtomicBool,
}

impl MemoryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While `failing` is set every update is refused.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(queue id, offset)` pairs in the order they were marked
    #[must_use]
    pub fn delivered(&self) -> Vec<(QueueId, u64)> {
        self.delivered.lock().clone()
    }

    #[must_use]
    pub fn is_delivered(&self, queue_id: &QueueId, offset: u64) -> bool {
        self.delivered
            .lock()
            .iter()
            .any(|(id, marked)| id == queue_id && *marked == offset)
    }
}

impl QueueTracker for MemoryQueue {
    fn mark_delivered(&self, queue_id: &QueueId, offset: u64) -> Result<(), QueueError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueueError::Internal(format!(
                "memory queue refusing update of {queue_id} at offset {offset}"
            )));
        }

        self.delivered.lock().push((queue_id.clone(), offset));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn record<'a>(queue_id: &'a QueueId, address: &'a str, offset: u64) -> StatusRecord<'a> {
        StatusRecord {
            trace_flags: TraceFlags::NONE,
            queue_id,
            original: address,
            address,
            offset,
            peer: "none",
            arrival_time: SystemTime::UNIX_EPOCH,
            reason: "test",
        }
    }

    #[test]
    fn test_append_and_fail() {
        let log = MemoryStatusLog::new();
        let id = QueueId::from("Q1");
        assert!(log.is_empty());

        log.append(&record(&id, "a@example.com", 1)).unwrap();
        assert_eq!(log.len(), 1);

        log.set_failing(true);
        assert!(matches!(
            log.append(&record(&id, "b@example.com", 2)),
            Err(LogError::Unavailable(_))
        ));
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].address, "a@example.com");
    }

    #[test]
    fn test_refuse_single_append() {
        let log = MemoryStatusLog::new();
        let id = QueueId::from("Q1");
        log.refuse_append(2);

        log.append(&record(&id, "a@example.com", 1)).unwrap();
        assert!(log.append(&record(&id, "b@example.com", 2)).is_err());
        log.append(&record(&id, "c@example.com", 3)).unwrap();

        let offsets: Vec<_> = log.records().iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![1, 3]);
    }

    #[test]
    fn test_queue_tracking() {
        let queue = MemoryQueue::new();
        let id = QueueId::from("Q1");

        queue.mark_delivered(&id, 42).unwrap();
        assert!(queue.is_delivered(&id, 42));
        assert!(!queue.is_delivered(&id, 43));

        queue.set_failing(true);
        assert!(queue.mark_delivered(&id, 43).is_err());
        assert_eq!(queue.delivered().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_are_whole_records() {
        let log = Arc::new(MemoryStatusLog::new());

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let log = log.clone();
                thread::spawn(move || {
                    let id = QueueId::from(format!("Q{worker}"));
                    for offset in 0..50 {
                        log.append(&record(&id, "rcpt@example.com", offset)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let records = log.records();
        assert_eq!(records.len(), 400);
        for worker in 0..8u64 {
            let id = QueueId::from(format!("Q{worker}"));
            let offsets: Vec<_> = records
                .iter()
                .filter(|r| r.queue_id == id)
                .map(|r| r.offset)
                .collect();
            assert_eq!(offsets, (0..50).collect::<Vec<_>>());
        }
    }
}
