use std::sync::atomic::{AtomicU32, Ordering};

use crate::codec::MessageId;

/// Mints message ids for one client: a fixed instance tag followed by an
/// atomically incremented sequence number.
///
/// The sequence wraps silently after 2^32 ids; an instance that sends that
/// many messages may reuse an id.
#[derive(Debug)]
pub struct IdentityCounter {
    instance: [u8; 4],
    sequence: AtomicU32,
}

impl IdentityCounter {
    pub fn new(instance: [u8; 4]) -> Self {
        Self::starting_at(instance, 0)
    }

    /// Counter whose next id carries `last.wrapping_add(1)`.
    pub fn starting_at(instance: [u8; 4], last: u32) -> Self {
        Self {
            instance,
            sequence: AtomicU32::new(last),
        }
    }

    /// Next id. Safe to call from many threads at once.
    pub fn next_id(&self) -> MessageId {
        let sequence = self
            .sequence
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1);
        MessageId::new(self.instance, sequence)
    }

    pub fn instance(&self) -> [u8; 4] {
        self.instance
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn sequential_ids_increment_by_one() {
        let counter = IdentityCounter::new([0xaa, 0xbb, 0xcc, 0xdd]);
        let ids: Vec<MessageId> = (0..100).map(|_| counter.next_id()).collect();

        assert_eq!(ids[0].sequence(), 1);
        for pair in ids.windows(2) {
            assert_eq!(pair[0].instance(), [0xaa, 0xbb, 0xcc, 0xdd]);
            assert_eq!(pair[1].sequence(), pair[0].sequence() + 1);
        }
        let unique: HashSet<MessageId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn sequence_wraps_without_error() {
        let counter = IdentityCounter::starting_at([1, 1, 1, 1], u32::MAX - 1);
        assert_eq!(counter.next_id().sequence(), u32::MAX);
        assert_eq!(counter.next_id().sequence(), 0);
        assert_eq!(counter.next_id().sequence(), 1);
    }

    #[test]
    fn concurrent_ids_are_unique() {
        let counter = Arc::new(IdentityCounter::new([7, 7, 7, 7]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..1000).map(|_| counter.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }
}
