//! Staged scanning: fast scan, deferred full scan, chunked processing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};

use crate::vault::VaultFile;

/// Delay between the fast scan and the full scan.
pub const FULL_SCAN_DELAY: Duration = Duration::from_millis(2000);

/// Files processed per full-scan chunk.
pub const CHUNK_SIZE: usize = 200;

/// Pause the host should leave between two chunks.
pub const CHUNK_YIELD: Duration = Duration::from_millis(10);

/// Source of time for scheduling and for the fast-scan month token.
pub trait Clock {
    fn now(&self) -> Instant;
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Fast scan now and full scan later, instead of one synchronous scan.
    pub lazy: bool,
    pub chunk_size: usize,
    pub full_scan_delay: Duration,
    pub chunk_yield: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            lazy: true,
            chunk_size: CHUNK_SIZE,
            full_scan_delay: FULL_SCAN_DELAY,
            chunk_yield: CHUNK_YIELD,
        }
    }
}

/// Observable lifecycle phase of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Uninitialized,
    FastScanning,
    FullScanPending,
    FullScanning,
    Steady,
    Unloaded,
}

/// A scheduled full scan.
///
/// The handle records the index generation it was scheduled under; once the
/// index resets or unloads, the generation moves on and the handle is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredScan {
    pub due: Instant,
    generation: u64,
}

impl DeferredScan {
    pub(crate) fn new(due: Instant, generation: u64) -> Self {
        Self { due, generation }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Counters reported when a scan finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_seen: usize,
    /// Files that carry an entry after the scan.
    pub classified: usize,
    /// Files whose frontmatter could not be read.
    pub skipped: usize,
    pub duration_ms: u64,
}

impl ScanStats {
    pub(crate) fn absorb(&mut self, other: &ScanStats) {
        self.files_seen += other.files_seen;
        self.classified += other.classified;
        self.skipped += other.skipped;
    }
}

/// What a call to `poll` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    /// Nothing scheduled.
    Idle,
    /// The deferred scan is not due yet.
    Waiting { until: Instant },
    /// One chunk was processed; more remain.
    Scanned { processed: usize, remaining: usize },
    /// The full scan finished.
    Completed(ScanStats),
}

/// An in-flight full scan.
#[derive(Debug)]
pub(crate) struct FullScan {
    queue: VecDeque<VaultFile>,
    pub(crate) started: Instant,
    pub(crate) last_chunk_at: Instant,
    pub(crate) stats: ScanStats,
}

impl FullScan {
    pub(crate) fn new(files: Vec<VaultFile>, now: Instant) -> Self {
        Self {
            queue: files.into(),
            started: now,
            last_chunk_at: now,
            stats: ScanStats::default(),
        }
    }

    pub(crate) fn next_chunk(&mut self, size: usize) -> Vec<VaultFile> {
        let take = size.max(1).min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Drop a path the listing captured but that no longer exists there.
    pub(crate) fn forget(&mut self, path: &str) {
        self.queue.retain(|f| f.path != path);
    }
}

#[derive(Debug)]
pub(crate) enum ScanState {
    Uninitialized,
    FastScanning,
    FullScanPending(DeferredScan),
    FullScanning(FullScan),
    Steady,
    Unloaded,
}

impl ScanState {
    pub(crate) fn phase(&self) -> ScanPhase {
        match self {
            ScanState::Uninitialized => ScanPhase::Uninitialized,
            ScanState::FastScanning => ScanPhase::FastScanning,
            ScanState::FullScanPending(_) => ScanPhase::FullScanPending,
            ScanState::FullScanning(_) => ScanPhase::FullScanning,
            ScanState::Steady => ScanPhase::Steady,
            ScanState::Unloaded => ScanPhase::Unloaded,
        }
    }
}
