//! Process-wide counting semaphore bounding concurrent CPT-estimation and
//! per-sample inference workers (spec §4.5). Mirrors
//! `bayesnet::CountingSemaphore`: a single global instance with
//! `acquire`/`release` and no other side effects (spec §9).

use std::sync::{Condvar, Mutex, OnceLock};

pub struct CountingSemaphore {
    state: Mutex<usize>,
    available: Condvar,
    capacity: usize,
}

impl CountingSemaphore {
    fn new(capacity: usize) -> Self {
        CountingSemaphore {
            state: Mutex::new(capacity),
            available: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn acquire(&self) {
        let mut permits = self.state.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    pub fn release(&self) {
        let mut permits = self.state.lock().unwrap();
        *permits += 1;
        self.available.notify_one();
    }
}

/// RAII guard returned by [`global().guard()`]; releases the permit on drop.
pub struct Permit<'a>(&'a CountingSemaphore);

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl CountingSemaphore {
    pub fn guard(&self) -> Permit<'_> {
        self.acquire();
        Permit(self)
    }
}

static GLOBAL: OnceLock<CountingSemaphore> = OnceLock::new();

/// The process-wide semaphore, capacity `max(1, available_parallelism - 1)`.
pub fn global() -> &'static CountingSemaphore {
    GLOBAL.get_or_init(|| {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        CountingSemaphore::new(cpus.saturating_sub(1).max(1))
    })
}
