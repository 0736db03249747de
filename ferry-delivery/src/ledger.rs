//! Per-attempt bookkeeping of which recipients still need a final outcome.

use serde::{Deserialize, Serialize};

/// Whether a recipient still needs an outcome recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientState {
    /// No final outcome has been recorded yet.
    Pending,
    /// A delivery, deferral or bounce has been recorded and the queue file
    /// updated. Never revisited within the attempt.
    Completed,
}

/// One addressee of a queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// The address as originally submitted
    pub original: String,
    /// The address after rewriting and canonicalisation
    pub address: String,
    /// Where this recipient's record lives in the queue file
    pub offset: u64,
    state: RecipientState,
}

impl Recipient {
    /// Create a pending recipient
    #[must_use]
    pub fn new(original: impl Into<String>, address: impl Into<String>, offset: u64) -> Self {
        Self {
            original: original.into(),
            address: address.into(),
            offset,
            state: RecipientState::Pending,
        }
    }

    #[must_use]
    pub const fn state(&self) -> RecipientState {
        self.state
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, RecipientState::Pending)
    }
}

/// The recipients of one delivery request.
///
/// Completion is one-way: once a recipient is marked completed it is never
/// handed out as pending again, which is what keeps each outcome from being
/// logged twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientLedger {
    recipients: Vec<Recipient>,
}

impl RecipientLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recipients: Vec::new(),
        }
    }

    pub fn push(&mut self, recipient: Recipient) {
        self.recipients.push(recipient);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Recipient> {
        self.recipients.get(index)
    }

    /// Returns `false` for completed recipients and for indices outside the
    /// list.
    #[must_use]
    pub fn is_pending(&self, index: usize) -> bool {
        self.recipients.get(index).is_some_and(Recipient::is_pending)
    }

    /// Iterate over the recipients still waiting for an outcome, with their
    /// index in the list.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &Recipient)> {
        self.recipients
            .iter()
            .enumerate()
            .filter(|(_, recipient)| recipient.is_pending())
    }

    /// Indices of the pending recipients, collected up front so the ledger
    /// can be mutated while walking them.
    pub(crate) fn pending_indices(&self) -> Vec<usize> {
        self.pending().map(|(index, _)| index).collect()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Mark the recipient at `index` as completed.
    ///
    /// Returns `false`, and changes nothing, when the recipient was already
    /// completed or does not exist.
    pub fn mark_completed(&mut self, index: usize) -> bool {
        match self.recipients.get_mut(index) {
            Some(recipient) if recipient.is_pending() => {
                recipient.state = RecipientState::Completed;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> {
        self.recipients.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

impl FromIterator<Recipient> for RecipientLedger {
    fn from_iter<T: IntoIterator<Item = Recipient>>(iter: T) -> Self {
        Self {
            recipients: iter.into_iter().collect(),
        }
    }
}
