//! Bounded in-process store for raw solve results.
//!
//! The transport collaborator keeps the φ bytes of recent solves
//! around so a renderer can fetch them later by id. The store is an
//! explicitly constructed object, not an ambient singleton; share it
//! with `Arc` where needed.

use std::{
    collections::{
        HashMap,
        VecDeque,
    },
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;

/// Opaque handle to a stored result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResultId(u64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Thread-safe map from [`ResultId`] to result bytes with FIFO
/// eviction beyond `capacity` entries.
#[derive(Debug)]
pub struct ResultStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<u64, Arc<[u8]>>,
    order: VecDeque<u64>,
    next_id: u64,
}

impl ResultStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn put(&self, bytes: impl Into<Arc<[u8]>>) -> ResultId {
        let mut inner = self.inner.lock();

        let id = inner.next_id;
        inner.next_id += 1;

        inner.entries.insert(id, bytes.into());
        inner.order.push_back(id);

        while inner.entries.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        ResultId(id)
    }

    pub fn get(&self, id: ResultId) -> Option<Arc<[u8]>> {
        self.inner.lock().entries.get(&id.0).cloned()
    }
}
