//! Append-only result log shared by all workers.

use std::sync::Mutex;

/// Thread-safe, append-only sequence of result records.
///
/// The lock lives inside the sink, so every mutation is serialized.
#[derive(Default)]
pub struct ResultSink {
    entries: Mutex<Vec<String>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record atomically with respect to other appends.
    pub fn append(&self, entry: impl Into<String>) {
        let entry = entry.into();
        let mut guard = self.entries.lock().expect("result sink mutex poisoned");
        guard.push(entry);
    }

    /// Copy of every record, in append order.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("result sink mutex poisoned")
            .clone()
    }

    /// Take the records once no other owner remains.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
            .into_inner()
            .expect("result sink mutex poisoned")
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("result sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn snapshot_preserves_append_order() {
        let sink = ResultSink::new();
        sink.append("a");
        sink.append(String::from("b"));
        sink.append("c");
        assert_eq!(sink.snapshot(), vec!["a", "b", "c"]);
        assert!(!sink.is_empty());
        assert_eq!(sink.into_entries(), vec!["a", "b", "c"]);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let writers = 8;
        let per_writer = 250;
        let sink = Arc::new(ResultSink::new());
        let barrier = Arc::new(Barrier::new(writers));

        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let sink = Arc::clone(&sink);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for n in 0..per_writer {
                        sink.append(format!("writer-{writer} entry-{n}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        let entries = Arc::try_unwrap(sink)
            .ok()
            .expect("sink still shared")
            .into_entries();
        assert_eq!(entries.len(), writers * per_writer);
        let unique: HashSet<_> = entries.iter().collect();
        assert_eq!(unique.len(), entries.len());
        assert!(
            entries
                .iter()
                .all(|entry| entry.starts_with("writer-") && entry.contains(" entry-"))
        );
    }
}
