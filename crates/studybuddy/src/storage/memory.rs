//! In-process slot backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{check_quota, DurableSlot};
use crate::error::{Error, Result};

/// Slots held in a `HashMap`. Nothing survives the process.
///
/// Reads and writes can be made to fail on demand, which is how the tests
/// exercise load and persistence failures.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlot {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of values accepted by `write`.
    #[must_use]
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Create a backend that already holds `value` under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let slot = Self::default();
        if let Ok(mut values) = slot.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        slot
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| Error::internal("memory slot lock poisoned"))
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("simulated read failure")));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("simulated write failure")));
        }
        check_quota(value, self.quota)?;

        self.lock()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove() {
        let slot = MemorySlot::new();
        assert!(slot.read("k").unwrap().is_none());

        slot.write("k", "v").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
        assert_eq!(slot.write_count(), 1);

        assert!(slot.remove("k").unwrap());
        assert!(slot.read("k").unwrap().is_none());
    }

    #[test]
    fn test_with_value() {
        let slot = MemorySlot::with_value("k", "seeded");
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("seeded"));
        assert_eq!(slot.write_count(), 0);
    }

    #[test]
    fn test_fail_writes() {
        let slot = MemorySlot::new();
        slot.set_fail_writes(true);
        assert!(slot.write("k", "v").is_err());
        assert!(slot.read("k").unwrap().is_none());

        slot.set_fail_writes(false);
        assert!(slot.write("k", "v").is_ok());
    }

    #[test]
    fn test_fail_reads() {
        let slot = MemorySlot::with_value("k", "v");
        slot.set_fail_reads(true);
        assert!(slot.read("k").is_err());

        slot.set_fail_reads(false);
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_quota() {
        let slot = MemorySlot::new().with_quota(Some(2));
        assert!(slot.write("k", "ab").is_ok());
        assert!(slot.write("k", "abc").unwrap_err().is_quota_exceeded());
    }
}
