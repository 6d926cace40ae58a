//! Read ordering shared by every store
//!
//! Newest first: greater timestamp wins, and among equal timestamps the
//! record appended later (greater sequence) wins. `latest` and the
//! descending view use the same key, so the head of the view is always the
//! latest record.

use std::cmp::Reverse;

use super::record::Record;

fn recency(record: &Record) -> (i64, u64) {
    (record.timestamp, record.sequence)
}

/// Sort a snapshot newest first. Operates on a copy, never the store itself.
pub fn sort_descending(records: &mut [Record]) {
    records.sort_by_key(|r| Reverse(recency(r)));
}

/// The newest record of a slice
pub fn newest(records: &[Record]) -> Option<&Record> {
    records.iter().max_by_key(|r| recency(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::{Tag, TAG_LEN};

    fn rec(sequence: u64, timestamp: i64) -> Record {
        Record::new(sequence, timestamp, Vec::new(), Tag::from_bytes([0u8; TAG_LEN]))
    }

    #[test]
    fn test_descending_by_timestamp() {
        let mut records = vec![rec(0, 10), rec(1, 30), rec(2, 20)];
        sort_descending(&mut records);
        let order: Vec<u64> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_broken_by_sequence() {
        let mut records = vec![rec(0, 5), rec(1, 5), rec(2, 5)];
        sort_descending(&mut records);
        let order: Vec<u64> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(newest(&records).map(|r| r.sequence), Some(2));
    }

    #[test]
    fn test_out_of_order_timestamps() {
        // A clock step backwards must not make an older timestamp "newest".
        let records = vec![rec(0, 100), rec(1, 50)];
        assert_eq!(newest(&records).map(|r| r.sequence), Some(0));
    }

    #[test]
    fn test_newest_of_empty() {
        assert!(newest(&[]).is_none());
    }
}
