//! The periodic note index.
//!
//! Maps files to the calendar period they represent and periods back to the
//! file that holds them. The index never touches a timer or a thread itself:
//! the host feeds it [`VaultEvent`]s and calls [`PeriodicNoteIndex::poll`]
//! once [`PeriodicNoteIndex::next_deadline`] has passed.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::entry::{MatchSource, PeriodKey, PeriodicNoteEntry};
use super::events::{IndexEvent, Listener, ListenerId, Listeners, ResolveReason, VaultEvent};
use super::format::{DateFormat, match_path};
use super::granularity::Granularity;
use super::loose::loosely_matched_date;
use super::scan::{
    Clock, DeferredScan, FullScan, ScanOptions, ScanPhase, ScanProgress, ScanState, ScanStats,
    SystemClock,
};
use super::settings::IndexConfiguration;
use crate::frontmatter::Frontmatter;
use crate::vault::{NoteStore, VaultFile};

/// Direction for [`PeriodicNoteIndex::find_adjacent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

pub struct PeriodicNoteIndex<S: NoteStore> {
    store: S,
    config: IndexConfiguration,
    options: ScanOptions,
    clock: Box<dyn Clock>,
    /// Forward index: vault path to entry.
    entries: HashMap<String, PeriodicNoteEntry>,
    /// Reverse index: period to the path currently holding it.
    by_period: HashMap<PeriodKey, String>,
    /// Every path whose entry normalizes to a period, holder or not.
    members: HashMap<PeriodKey, BTreeSet<String>>,
    state: ScanState,
    /// Bumped on every reset and unload; stale deferred scans compare against it.
    generation: u64,
    listeners: Listeners,
}

impl<S: NoteStore> PeriodicNoteIndex<S> {
    pub fn new(store: S, config: IndexConfiguration) -> Self {
        Self {
            store,
            config,
            options: ScanOptions::default(),
            clock: Box::new(SystemClock),
            entries: HashMap::new(),
            by_period: HashMap::new(),
            members: HashMap::new(),
            state: ScanState::Uninitialized,
            generation: 0,
            listeners: Listeners::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &IndexConfiguration {
        &self.config
    }

    pub fn phase(&self) -> ScanPhase {
        self.state.phase()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&IndexEvent) + 'static) -> ListenerId {
        let listener: Listener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Dispatch a host event.
    pub fn handle(&mut self, event: VaultEvent) {
        if self.is_unloaded() {
            debug!("Ignoring event after unload: {:?}", event);
            return;
        }

        match event {
            VaultEvent::LayoutReady => {
                if matches!(self.state, ScanState::Uninitialized) {
                    self.initialize(self.options.lazy);
                }
            }
            VaultEvent::ConfigurationChanged(config) => self.set_configuration(config),
            event if matches!(self.state, ScanState::Uninitialized) => {
                debug!("Ignoring event before layout is ready: {:?}", event);
            }
            VaultEvent::Created(file) => self.resolve(&file, ResolveReason::Create),
            VaultEvent::Renamed { file, old_path } => self.resolve_rename(&file, &old_path),
            VaultEvent::Deleted { path } => {
                self.remove(&path);
            }
            VaultEvent::MetadataChanged { file, frontmatter } => {
                self.resolve_frontmatter_change(&file, frontmatter.as_ref());
            }
        }
    }

    /// Populate the index.
    ///
    /// Lazily, only files whose path contains the current `YYYY-MM` are
    /// classified now and a full scan is scheduled; otherwise every file is
    /// classified before returning.
    pub fn initialize(&mut self, lazy: bool) {
        if self.is_unloaded() {
            return;
        }
        info!("Initializing periodic note index");

        if !lazy {
            self.begin_full_scan();
            while matches!(self.state, ScanState::FullScanning(_)) {
                self.scan_next_chunk();
            }
            return;
        }

        self.state = ScanState::FastScanning;
        self.fast_scan();
        let due = self.clock.now() + self.options.full_scan_delay;
        self.state = ScanState::FullScanPending(DeferredScan::new(due, self.generation));
    }

    /// Clear everything and rescan under the current configuration.
    pub fn reset(&mut self) {
        if self.is_unloaded() {
            return;
        }
        info!("Resetting periodic note index");
        self.generation += 1;
        self.state = ScanState::Uninitialized;
        self.clear_entries();
        self.listeners.emit(&IndexEvent::Reset);
        self.initialize(self.options.lazy);
    }

    /// Cancel pending work, drop every entry and every subscriber.
    pub fn unload(&mut self) {
        if self.is_unloaded() {
            return;
        }
        debug!("Unloading periodic note index");
        self.generation += 1;
        self.state = ScanState::Unloaded;
        self.clear_entries();
        self.listeners.clear();
    }

    /// Replace the configuration; a changed configuration resets the index
    /// once it has been initialized.
    pub fn set_configuration(&mut self, config: IndexConfiguration) {
        if self.is_unloaded() || config == self.config {
            return;
        }
        self.config = config;
        if !matches!(self.state, ScanState::Uninitialized) {
            self.reset();
        }
    }

    /// Earliest instant at which `poll` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            ScanState::FullScanPending(timer) if timer.is_current(self.generation) => {
                Some(timer.due)
            }
            ScanState::FullScanning(scan) => Some(scan.last_chunk_at + self.options.chunk_yield),
            _ => None,
        }
    }

    /// Advance scheduled work: start the deferred full scan when due, or
    /// process the next chunk of a running one.
    pub fn poll(&mut self) -> ScanProgress {
        match &self.state {
            ScanState::FullScanPending(timer) => {
                if !timer.is_current(self.generation) {
                    self.state = ScanState::Steady;
                    return ScanProgress::Idle;
                }
                if self.clock.now() < timer.due {
                    return ScanProgress::Waiting { until: timer.due };
                }
                info!("Starting deferred full scan");
                self.begin_full_scan();
                self.scan_next_chunk()
            }
            ScanState::FullScanning(_) => self.scan_next_chunk(),
            _ => ScanProgress::Idle,
        }
    }

    fn is_unloaded(&self) -> bool {
        matches!(self.state, ScanState::Unloaded)
    }

    fn clear_entries(&mut self) {
        self.entries.clear();
        self.by_period.clear();
        self.members.clear();
    }

    fn fast_scan(&mut self) {
        let month = self.clock.today().format("%Y-%m").to_string();
        let files = match self.store.list_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Fast scan could not list files: {}", e);
                return;
            }
        };
        let priority: Vec<VaultFile> =
            files.into_iter().filter(|f| f.path.contains(&month)).collect();
        debug!("Fast scanning {} priority files", priority.len());
        self.process_batch(&priority);
    }

    fn begin_full_scan(&mut self) {
        match self.store.list_files() {
            Ok(files) => {
                info!("Full scanning {} files", files.len());
                self.state = ScanState::FullScanning(FullScan::new(files, self.clock.now()));
            }
            Err(e) => {
                warn!("Full scan aborted, could not list files: {}", e);
                self.state = ScanState::Steady;
            }
        }
    }

    fn scan_next_chunk(&mut self) -> ScanProgress {
        let ScanState::FullScanning(scan) = &mut self.state else {
            return ScanProgress::Idle;
        };
        let chunk = scan.next_chunk(self.options.chunk_size);

        let batch = self.process_batch(&chunk);
        let now = self.clock.now();

        let ScanState::FullScanning(scan) = &mut self.state else {
            return ScanProgress::Idle;
        };
        scan.stats.absorb(&batch);
        scan.last_chunk_at = now;

        let remaining = scan.remaining();
        if remaining > 0 {
            return ScanProgress::Scanned { processed: chunk.len(), remaining };
        }

        let mut stats = std::mem::take(&mut scan.stats);
        stats.duration_ms = u64::try_from(now.duration_since(scan.started).as_millis())
            .unwrap_or(u64::MAX);
        info!(
            "Full scan complete: {} files, {} classified, {} skipped in {}ms",
            stats.files_seen, stats.classified, stats.skipped, stats.duration_ms
        );
        self.state = ScanState::Steady;
        ScanProgress::Completed(stats)
    }

    fn process_batch(&mut self, files: &[VaultFile]) -> ScanStats {
        let mut stats = ScanStats::default();
        if self.config.enabled_granularities().is_empty() {
            stats.files_seen = files.len();
            return stats;
        }

        for file in files {
            stats.files_seen += 1;
            if self.has_frontmatter_entry(&file.path) {
                stats.classified += 1;
                continue;
            }
            if !self.config.watches(&file.path) {
                continue;
            }

            self.resolve(file, ResolveReason::Initialize);
            match self.store.read_frontmatter(file) {
                Ok(Some(frontmatter)) => {
                    self.resolve_frontmatter_change(file, Some(&frontmatter));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping frontmatter of {}: {}", file.path, e);
                    stats.skipped += 1;
                }
            }
            if self.entries.contains_key(&file.path) {
                stats.classified += 1;
            }
        }
        stats
    }

    // ---------------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------------

    /// Classify a file by its name.
    ///
    /// Enabled granularities are tried finest first, each against its own
    /// folder and format. When none matches strictly, a loose heuristic is
    /// applied to the basename wherever the file lives. Files already dated
    /// by frontmatter are left alone.
    pub fn resolve(&mut self, file: &VaultFile, reason: ResolveReason) {
        if self.is_unloaded() || self.has_frontmatter_entry(&file.path) {
            return;
        }
        let active = self.config.enabled_granularities();
        if active.is_empty() {
            return;
        }
        let weeks = self.config.week_rules();

        for granularity in active {
            let settings = self.config.get(granularity);
            if !settings.contains(&file.path) {
                continue;
            }
            let Some(date) = match_path(&file.path, settings.effective_format(granularity), weeks)
            else {
                continue;
            };

            let entry =
                PeriodicNoteEntry::new(&file.path, date, granularity, MatchSource::FilenameStrict);
            debug!("Resolved {} note {} ({})", granularity, file.path, entry.canonical_date_key);
            let apply_template = reason == ResolveReason::Create && file.is_empty();
            self.store_and_emit(entry, reason, apply_template);
            return;
        }

        if let Some(found) = loosely_matched_date(file.basename(), weeks)
            && self.config.is_enabled(found.granularity)
        {
            let entry = PeriodicNoteEntry::new(
                &file.path,
                found.date,
                found.granularity,
                MatchSource::FilenameLoose,
            );
            debug!("Loosely matched {} note {}", found.granularity, file.path);
            self.store_and_emit(entry, reason, false);
        }
    }

    /// Re-classify a file after its frontmatter changed.
    ///
    /// A frontmatter field named after an enabled granularity, holding a date
    /// in that granularity's canonical format, overrides the filename. When
    /// such a date disappears, the file falls back to filename resolution.
    pub fn resolve_frontmatter_change(
        &mut self,
        file: &VaultFile,
        frontmatter: Option<&Frontmatter>,
    ) {
        if self.is_unloaded() {
            return;
        }
        let active = self.config.enabled_granularities();
        if active.is_empty() {
            return;
        }
        let weeks = self.config.week_rules();

        if let Some(frontmatter) = frontmatter {
            for granularity in active {
                if !self.config.get(granularity).contains(&file.path) {
                    continue;
                }
                let Some(value) = frontmatter.scalar(granularity.as_str()) else {
                    continue;
                };
                let Some(date) = DateFormat::new(granularity.default_format()).parse(&value, weeks)
                else {
                    debug!("Ignoring {} frontmatter {:?} in {}", granularity, value, file.path);
                    continue;
                };

                let entry =
                    PeriodicNoteEntry::new(&file.path, date, granularity, MatchSource::Frontmatter);
                if self.entries.get(&file.path) == Some(&entry) {
                    return;
                }
                debug!("Frontmatter dates {} as {} {}", file.path, granularity, value);
                self.store_and_emit(entry, ResolveReason::MetadataChange, false);
                return;
            }
        }

        if self.has_frontmatter_entry(&file.path) {
            debug!("Frontmatter date removed from {}", file.path);
            self.drop_entry(&file.path);
            self.resolve(file, ResolveReason::MetadataChange);
        }
    }

    /// Move a file's classification to its new path.
    pub fn resolve_rename(&mut self, file: &VaultFile, old_path: &str) {
        if self.is_unloaded() {
            return;
        }
        self.remove(old_path);
        self.resolve(file, ResolveReason::Rename);
    }

    /// Drop a path from the index, freeing its period for other files.
    pub fn remove(&mut self, path: &str) -> Option<PeriodicNoteEntry> {
        if let ScanState::FullScanning(scan) = &mut self.state {
            scan.forget(path);
        }
        self.drop_entry(path)
    }

    fn drop_entry(&mut self, path: &str) -> Option<PeriodicNoteEntry> {
        let entry = self.entries.remove(path)?;
        self.detach(path, entry.period_key(self.config.week_rules()));
        debug!("Removed {} note {}", entry.granularity, path);
        self.listeners.emit(&IndexEvent::Removed {
            path: path.to_string(),
            granularity: entry.granularity,
        });
        Some(entry)
    }

    fn has_frontmatter_entry(&self, path: &str) -> bool {
        self.entries.get(path).is_some_and(|e| e.match_source == MatchSource::Frontmatter)
    }

    fn store_and_emit(
        &mut self,
        entry: PeriodicNoteEntry,
        reason: ResolveReason,
        apply_template: bool,
    ) {
        self.store_entry(entry.clone());
        self.listeners.emit(&IndexEvent::Resolved { entry, reason, apply_template });
    }

    /// Insert or replace the entry for its path and let it claim its period
    /// unless a higher-precedence entry already holds it.
    fn store_entry(&mut self, entry: PeriodicNoteEntry) {
        let weeks = self.config.week_rules();
        let path = entry.file_path.clone();
        let key = entry.period_key(weeks);

        if let Some(previous) = self.entries.remove(&path) {
            self.detach(&path, previous.period_key(weeks));
        }

        let claims = match self.by_period.get(&key).and_then(|holder| self.entries.get(holder)) {
            Some(holder) => entry.match_source >= holder.match_source,
            None => true,
        };
        if claims {
            self.by_period.insert(key, path.clone());
        }
        self.members.entry(key).or_default().insert(path.clone());
        self.entries.insert(path, entry);
    }

    /// Unlink `path` from `key`; a vacated slot goes to the best remaining
    /// member (highest precedence, then smallest path).
    fn detach(&mut self, path: &str, key: PeriodKey) {
        if let Some(members) = self.members.get_mut(&key) {
            members.remove(path);
            if members.is_empty() {
                self.members.remove(&key);
            }
        }
        if self.by_period.get(&key).map(String::as_str) != Some(path) {
            return;
        }
        self.by_period.remove(&key);

        let successor = self.members.get(&key).and_then(|members| {
            members
                .iter()
                .filter_map(|p| self.entries.get(p))
                .max_by(|a, b| {
                    a.match_source.cmp(&b.match_source).then_with(|| b.file_path.cmp(&a.file_path))
                })
                .map(|e| e.file_path.clone())
        });
        if let Some(successor) = successor {
            self.by_period.insert(key, successor);
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Path of the note holding the period containing `date`, if it was
    /// matched exactly.
    pub fn note_for_period(&self, granularity: Granularity, date: NaiveDate) -> Option<&str> {
        let key = PeriodKey::new(granularity, date, self.config.week_rules());
        self.holder(&key).filter(|e| e.is_exact).map(|e| e.file_path.as_str())
    }

    /// Entries for the period containing `date`.
    ///
    /// With `include_finer`, every entry of `granularity` or finer whose date
    /// falls inside that period is returned, ordered by granularity, then
    /// date, then path. Disabled granularities yield nothing.
    pub fn entries_for_period(
        &self,
        granularity: Granularity,
        date: NaiveDate,
        include_finer: bool,
    ) -> Vec<&PeriodicNoteEntry> {
        if !self.config.is_enabled(granularity) {
            return Vec::new();
        }
        let weeks = self.config.week_rules();

        if !include_finer {
            return self.holder(&PeriodKey::new(granularity, date, weeks)).into_iter().collect();
        }

        let mut found: Vec<&PeriodicNoteEntry> = self
            .by_period
            .iter()
            .filter(|(key, _)| key.granularity <= granularity)
            .filter_map(|(_, path)| self.entries.get(path))
            .filter(|e| granularity.same_period(e.date, date, weeks))
            .collect();
        found.sort_by(|a, b| {
            a.granularity
                .cmp(&b.granularity)
                .then_with(|| a.canonical_date_key.cmp(&b.canonical_date_key))
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        found
    }

    /// Whether `path` is classified, optionally at a given granularity.
    pub fn is_periodic(&self, path: &str, granularity: Option<Granularity>) -> bool {
        self.entries
            .get(path)
            .is_some_and(|e| granularity.is_none_or(|g| e.granularity == g))
    }

    pub fn find(&self, path: &str) -> Option<&PeriodicNoteEntry> {
        self.entries.get(path)
    }

    /// The neighbour of `path` among entries of the same granularity,
    /// ordered by date then path.
    pub fn find_adjacent(&self, path: &str, direction: Direction) -> Option<&PeriodicNoteEntry> {
        let current = self.entries.get(path)?;
        let mut siblings: Vec<&PeriodicNoteEntry> =
            self.entries.values().filter(|e| e.granularity == current.granularity).collect();
        siblings.sort_by(|a, b| {
            a.canonical_date_key
                .cmp(&b.canonical_date_key)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });

        let position = siblings.iter().position(|e| e.file_path == path)?;
        match direction {
            Direction::Forward => siblings.get(position + 1).copied(),
            Direction::Backward => position.checked_sub(1).and_then(|i| siblings.get(i).copied()),
        }
    }

    /// Reverse index for one granularity: period start to holding entry,
    /// in period order.
    pub fn snapshot(&self, granularity: Granularity) -> Vec<(NaiveDate, &PeriodicNoteEntry)> {
        let mut periods: Vec<(NaiveDate, &PeriodicNoteEntry)> = self
            .by_period
            .iter()
            .filter(|(key, _)| key.granularity == granularity)
            .filter_map(|(key, path)| self.entries.get(path).map(|e| (key.start, e)))
            .collect();
        periods.sort_by_key(|(start, _)| *start);
        periods
    }

    /// Every entry, ordered by granularity, date, then path.
    pub fn entries(&self) -> Vec<&PeriodicNoteEntry> {
        let mut all: Vec<&PeriodicNoteEntry> = self.entries.values().collect();
        all.sort_by(|a, b| {
            a.granularity
                .cmp(&b.granularity)
                .then_with(|| a.canonical_date_key.cmp(&b.canonical_date_key))
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        all
    }

    fn holder(&self, key: &PeriodKey) -> Option<&PeriodicNoteEntry> {
        self.by_period.get(key).and_then(|path| self.entries.get(path))
    }
}

impl<S: NoteStore> Drop for PeriodicNoteIndex<S> {
    fn drop(&mut self) {
        self.unload();
    }
}

impl<S: NoteStore> std::fmt::Debug for PeriodicNoteIndex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicNoteIndex")
            .field("phase", &self.state.phase())
            .field("entries", &self.entries.len())
            .field("periods", &self.by_period.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
