//! Generation-stamped visited sets and a pool to share them between threads.
//!
//! A search marks nodes by writing the current generation into a slot per node;
//! resetting is a counter bump rather than a memset. The pool hands each
//! concurrent search (or insertion) its own set.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

#[derive(Debug)]
pub(crate) struct VisitedSet {
    data: Vec<u16>,
    generation: u16,
}

impl VisitedSet {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u16; capacity],
            generation: 1,
        }
    }

    /// Forget every mark. Full memset only once per `u16::MAX - 1` calls.
    pub(crate) fn clear(&mut self) {
        if self.generation == u16::MAX {
            self.data.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Mark `id`. Returns `true` if it was not already marked.
    #[inline]
    pub(crate) fn insert(&mut self, id: u32) -> bool {
        let slot = &mut self.data[id as usize];
        if *slot == self.generation {
            false
        } else {
            *slot = self.generation;
            true
        }
    }
}

/// Pool of visited sets sized for one graph.
#[derive(Debug)]
pub(crate) struct VisitedPool {
    capacity: usize,
    free: Mutex<Vec<VisitedSet>>,
}

impl VisitedPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Take a cleared set; it returns to the pool on drop.
    pub(crate) fn acquire(&self) -> PooledVisited<'_> {
        let mut set = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| VisitedSet::new(self.capacity));
        set.clear();
        PooledVisited { pool: self, set }
    }
}

pub(crate) struct PooledVisited<'a> {
    pool: &'a VisitedPool,
    set: VisitedSet,
}

impl Deref for PooledVisited<'_> {
    type Target = VisitedSet;

    fn deref(&self) -> &VisitedSet {
        &self.set
    }
}

impl DerefMut for PooledVisited<'_> {
    fn deref_mut(&mut self) -> &mut VisitedSet {
        &mut self.set
    }
}

impl Drop for PooledVisited<'_> {
    fn drop(&mut self) {
        // Zero-capacity placeholder; never indexed after drop.
        let set = std::mem::replace(&mut self.set, VisitedSet::new(0));
        self.pool.free.lock().push(set);
    }
}
