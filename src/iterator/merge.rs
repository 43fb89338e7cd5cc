use std::cmp::Ordering;

use crate::error::Result;
use crate::iterator::EntryIterator;
use crate::types::Entry;

/// Merges two sorted cursors into a single sorted stream.
///
/// Used by the merge engine to fold two segments into one without loading
/// either into memory: only the current entry of each side is resident.
///
/// Deduplication: when both sides hold the same key, only the entry with the
/// larger primary offset is yielded and both sides advance.
pub struct MergeIterator {
    left: Box<dyn EntryIterator>,
    right: Box<dyn EntryIterator>,
    current: Option<Entry>,
}

impl MergeIterator {
    /// Create a merged view and position it at the smallest entry.
    pub fn new(left: Box<dyn EntryIterator>, right: Box<dyn EntryIterator>) -> Result<Self> {
        let mut iter = MergeIterator {
            left,
            right,
            current: None,
        };
        iter.advance()?;
        Ok(iter)
    }

    /// Pull the next winner from the two sides into `current`.
    fn advance(&mut self) -> Result<()> {
        self.current = match (self.left.is_valid(), self.right.is_valid()) {
            (false, false) => None,
            (true, false) => Some(take(&mut *self.left)?),
            (false, true) => Some(take(&mut *self.right)?),
            (true, true) => {
                let order = self
                    .left
                    .entry()
                    .key
                    .as_bytes()
                    .cmp(self.right.entry().key.as_bytes());
                match order {
                    Ordering::Less => Some(take(&mut *self.left)?),
                    Ordering::Greater => Some(take(&mut *self.right)?),
                    Ordering::Equal => {
                        let a = take(&mut *self.left)?;
                        let b = take(&mut *self.right)?;
                        Some(Entry::newest(a, b))
                    }
                }
            }
        };
        Ok(())
    }
}

/// Clone the current entry of `iter` and step past it.
fn take(iter: &mut dyn EntryIterator) -> Result<Entry> {
    let entry = iter.entry().clone();
    iter.next()?;
    Ok(entry)
}

impl EntryIterator for MergeIterator {
    fn entry(&self) -> &Entry {
        self.current
            .as_ref()
            .expect("entry() called on exhausted MergeIterator")
    }

    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) -> Result<()> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::collect;

    /// Cursor over an in-memory, already sorted vector.
    struct VecIterator {
        entries: Vec<Entry>,
        pos: usize,
    }

    impl VecIterator {
        fn new(entries: Vec<Entry>) -> Self {
            VecIterator { entries, pos: 0 }
        }
    }

    impl EntryIterator for VecIterator {
        fn entry(&self) -> &Entry {
            &self.entries[self.pos]
        }

        fn is_valid(&self) -> bool {
            self.pos < self.entries.len()
        }

        fn next(&mut self) -> Result<()> {
            if self.is_valid() {
                self.pos += 1;
            }
            Ok(())
        }
    }

    fn merged(a: &[(&str, u64)], b: &[(&str, u64)]) -> Vec<Entry> {
        let to_iter = |items: &[(&str, u64)]| -> Box<dyn EntryIterator> {
            Box::new(VecIterator::new(
                items.iter().map(|(k, o)| Entry::new(*k, *o)).collect(),
            ))
        };
        let mut iter = MergeIterator::new(to_iter(a), to_iter(b)).unwrap();
        collect(&mut iter).unwrap()
    }

    #[test]
    fn interleaves_disjoint_inputs() {
        let out = merged(&[("a", 1), ("c", 3), ("e", 5)], &[("b", 2), ("d", 4)]);
        let keys: Vec<_> = out.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn one_side_empty() {
        assert_eq!(merged(&[], &[("x", 1)]), vec![Entry::new("x", 1)]);
        assert_eq!(merged(&[("x", 1)], &[]), vec![Entry::new("x", 1)]);
        assert!(merged(&[], &[]).is_empty());
    }

    #[test]
    fn duplicate_key_keeps_larger_offset() {
        let out = merged(&[("k", 10), ("z", 1)], &[("k", 40)]);
        assert_eq!(out, vec![Entry::new("k", 40), Entry::new("z", 1)]);

        let out = merged(&[("k", 40)], &[("k", 10)]);
        assert_eq!(out, vec![Entry::new("k", 40)]);
    }
}
