//! Periodic note resolution.
//!
//! Classifies vault files as day, week, month, quarter or year notes from
//! their filename or frontmatter and keeps a queryable index of them.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use perinote_core::periodic::{
//!     Granularity, IndexConfiguration, PeriodicConfig, PeriodicNoteIndex,
//! };
//! use perinote_core::vault::FsNoteStore;
//!
//! let store = FsNoteStore::open(Path::new("/notes"), Vec::new()).unwrap();
//! let config = IndexConfiguration::default()
//!     .with(Granularity::Day, PeriodicConfig::enabled("Journal", "YYYY-MM-DD"));
//!
//! let mut index = PeriodicNoteIndex::new(store, config);
//! index.initialize(false);
//! let today = chrono::Local::now().date_naive();
//! println!("{:?}", index.note_for_period(Granularity::Day, today));
//! ```

mod entry;
mod events;
pub mod format;
mod granularity;
mod index;
pub mod loose;
mod scan;
mod settings;

pub use entry::{MatchSource, PeriodKey, PeriodicNoteEntry};
pub use events::{IndexEvent, Listener, ListenerId, ResolveReason, VaultEvent};
pub use format::{DateFormat, FormatError};
pub use granularity::{Granularity, UnknownGranularity, WeekRules};
pub use index::{Direction, PeriodicNoteIndex};
pub use loose::{LooseMatch, loosely_matched_date};
pub use scan::{
    CHUNK_SIZE, CHUNK_YIELD, Clock, DeferredScan, FULL_SCAN_DELAY, ScanOptions, ScanPhase,
    ScanProgress, ScanStats, SystemClock,
};
pub use settings::{IndexConfiguration, PeriodicConfig, WeekStart};
