#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use perinote_core::frontmatter::Frontmatter;
use perinote_core::periodic::{
    Clock, Granularity, IndexConfiguration, IndexEvent, PeriodicConfig, PeriodicNoteIndex,
};
use perinote_core::vault::{NoteStore, StoreError, VaultFile};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct StoreState {
    files: BTreeMap<String, (u64, Option<Frontmatter>)>,
    unreadable: HashSet<String>,
    listing_fails: bool,
}

/// In-memory store; clones share the same files.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<StoreState>>,
}

impl MemoryStore {
    pub fn add(&self, path: &str) -> VaultFile {
        self.add_sized(path, 10)
    }

    pub fn add_empty(&self, path: &str) -> VaultFile {
        self.add_sized(path, 0)
    }

    fn add_sized(&self, path: &str, size: u64) -> VaultFile {
        self.state.borrow_mut().files.insert(path.to_string(), (size, None));
        VaultFile::new(path, size)
    }

    pub fn add_with_frontmatter(&self, path: &str, pairs: &[(&str, &str)]) -> VaultFile {
        let frontmatter = Frontmatter::from_pairs(pairs.iter().copied());
        self.state.borrow_mut().files.insert(path.to_string(), (10, Some(frontmatter)));
        VaultFile::new(path, 10)
    }

    pub fn delete(&self, path: &str) {
        self.state.borrow_mut().files.remove(path);
    }

    pub fn rename(&self, from: &str, to: &str) -> VaultFile {
        let mut state = self.state.borrow_mut();
        let (size, frontmatter) = state.files.remove(from).unwrap();
        state.files.insert(to.to_string(), (size, frontmatter));
        VaultFile::new(to, size)
    }

    pub fn make_unreadable(&self, path: &str) {
        self.state.borrow_mut().unreadable.insert(path.to_string());
    }

    pub fn fail_listing(&self) {
        self.state.borrow_mut().listing_fails = true;
    }
}

impl NoteStore for MemoryStore {
    fn list_files(&self) -> Result<Vec<VaultFile>, StoreError> {
        let state = self.state.borrow();
        if state.listing_fails {
            return Err(StoreError::Read {
                path: String::new(),
                source: io::Error::other("listing failed"),
            });
        }
        let files = state.files.iter().map(|(path, (size, _))| VaultFile::new(path.clone(), *size));
        Ok(files.collect())
    }

    fn read_frontmatter(&self, file: &VaultFile) -> Result<Option<Frontmatter>, StoreError> {
        let state = self.state.borrow();
        if state.unreadable.contains(&file.path) {
            return Err(StoreError::Read {
                path: file.path.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(state.files.get(&file.path).and_then(|(_, fm)| fm.clone()))
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
    today: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn now_plus(&self, by: Duration) -> Instant {
        self.now() + by
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

/// Day notes in `Journal`, week notes in `Journal/Weeks`, month notes in
/// `Journal/Months`.
pub fn journal_config() -> IndexConfiguration {
    IndexConfiguration::default()
        .with(Granularity::Day, PeriodicConfig::enabled("Journal", "YYYY-MM-DD"))
        .with(Granularity::Week, PeriodicConfig::enabled("Journal/Weeks", "gggg-[W]ww"))
        .with(Granularity::Month, PeriodicConfig::enabled("Journal/Months", "YYYY-MM"))
}

pub fn day_only_config() -> IndexConfiguration {
    IndexConfiguration::default()
        .with(Granularity::Day, PeriodicConfig::enabled("Journal", "YYYY-MM-DD"))
}

/// Record every event the index emits.
pub fn record_events<S: NoteStore>(
    index: &mut PeriodicNoteIndex<S>,
) -> Rc<RefCell<Vec<IndexEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    index.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}
