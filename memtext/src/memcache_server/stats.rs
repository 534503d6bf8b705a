use std::sync::atomic::{AtomicU64, Ordering};

/// Process wide counters shared by every connection.
///
/// Item counters live in the store, these only describe traffic.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub(crate) curr_connections: AtomicU64,
    pub(crate) total_connections: AtomicU64,
    pub(crate) cmd_get: AtomicU64,
    pub(crate) cmd_set: AtomicU64,
    pub(crate) cmd_flush: AtomicU64,
    pub(crate) get_hits: AtomicU64,
    pub(crate) get_misses: AtomicU64,
    pub(crate) delete_hits: AtomicU64,
    pub(crate) delete_misses: AtomicU64,
    pub(crate) incr_hits: AtomicU64,
    pub(crate) incr_misses: AtomicU64,
    pub(crate) decr_hits: AtomicU64,
    pub(crate) decr_misses: AtomicU64,
    threads: u64,
    started_at: u64,
}

#[inline]
pub(crate) fn increment(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

#[inline]
fn load(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

impl ServerStats {
    pub fn new(threads: usize, started_at: u64) -> ServerStats {
        ServerStats {
            threads: threads as u64,
            started_at,
            ..Default::default()
        }
    }

    pub fn connection_opened(&self) {
        increment(&self.curr_connections);
        increment(&self.total_connections);
    }

    pub fn connection_closed(&self) {
        self.curr_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn curr_connections(&self) -> u64 {
        load(&self.curr_connections)
    }

    pub fn total_connections(&self) -> u64 {
        load(&self.total_connections)
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Traffic counters in the order they are reported by `stats`.
    pub fn snapshot(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("threads", self.threads),
            ("curr_connections", load(&self.curr_connections)),
            ("total_connections", load(&self.total_connections)),
            ("cmd_get", load(&self.cmd_get)),
            ("cmd_set", load(&self.cmd_set)),
            ("cmd_flush", load(&self.cmd_flush)),
            ("get_hits", load(&self.get_hits)),
            ("get_misses", load(&self.get_misses)),
            ("delete_misses", load(&self.delete_misses)),
            ("delete_hits", load(&self.delete_hits)),
            ("incr_misses", load(&self.incr_misses)),
            ("incr_hits", load(&self.incr_hits)),
            ("decr_misses", load(&self.decr_misses)),
            ("decr_hits", load(&self.decr_hits)),
        ]
    }
}
