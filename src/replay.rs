use crate::Error;
use crate::message::Message;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};

/// Identifier of an accepted message: SHA-256 over `header || ciphertext`.
///
/// The header has a fixed size, so the concatenation is unambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MessageId([u8; 32]);

impl MessageId {
    pub(crate) fn of(message: &Message) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(message.header.to_bytes());
        hasher.update(&message.ciphertext);

        let mut id = [0u8; 32];
        id.copy_from_slice(&hasher.finalize());
        Self(id)
    }
}

/// Rejects messages that were already accepted.
///
/// Remembers at most `capacity` identifiers and forgets the oldest first.
#[derive(Clone)]
pub(crate) struct ReplayGuard {
    seen: HashSet<MessageId>,
    order: VecDeque<MessageId>,
    capacity: usize,
}

impl ReplayGuard {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub(crate) fn check(&self, id: &MessageId) -> Result<(), Error> {
        if self.seen.contains(id) {
            return Err(Error::ReplayDetected);
        }
        Ok(())
    }

    /// Records a successfully decrypted message.
    pub(crate) fn record(&mut self, id: MessageId) {
        if !self.seen.insert(id) {
            return;
        }
        self.order.push_back(id);

        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> MessageId {
        MessageId([byte; 32])
    }

    #[test]
    fn test_recorded_id_is_rejected() {
        let mut guard = ReplayGuard::new(8);
        assert!(guard.check(&id(1)).is_ok());

        guard.record(id(1));
        assert_eq!(guard.check(&id(1)), Err(Error::ReplayDetected));
        assert!(guard.check(&id(2)).is_ok());
    }

    #[test]
    fn test_oldest_id_is_evicted() {
        let mut guard = ReplayGuard::new(2);
        guard.record(id(1));
        guard.record(id(2));
        guard.record(id(1));
        guard.record(id(3));

        assert!(guard.check(&id(1)).is_ok());
        assert!(guard.check(&id(2)).is_err());
        assert!(guard.check(&id(3)).is_err());
    }
}
