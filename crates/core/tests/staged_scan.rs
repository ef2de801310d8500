mod common;

use std::time::Duration;

use common::{ManualClock, MemoryStore, date, day_only_config};
use perinote_core::periodic::{
    Granularity, IndexConfiguration, PeriodicNoteIndex, ScanOptions, ScanPhase, ScanProgress,
    VaultEvent,
};

fn lazy_index(
    store: &MemoryStore,
    clock: &ManualClock,
    config: IndexConfiguration,
    chunk_size: usize,
) -> PeriodicNoteIndex<MemoryStore> {
    let options = ScanOptions { chunk_size, ..ScanOptions::default() };
    PeriodicNoteIndex::new(store.clone(), config).with_clock(clock.clone()).with_options(options)
}

/// Poll until the running full scan completes.
fn finish_scan(index: &mut PeriodicNoteIndex<MemoryStore>) -> perinote_core::periodic::ScanStats {
    loop {
        match index.poll() {
            ScanProgress::Completed(stats) => return stats,
            ScanProgress::Scanned { .. } => {}
            other => panic!("scan stalled: {other:?}"),
        }
    }
}

#[test]
fn fast_scan_covers_current_month_then_full_scan_catches_up() {
    let store = MemoryStore::default();
    store.add("Journal/2024-03-15.md");
    store.add("Journal/2023-12-01.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);

    index.handle(VaultEvent::LayoutReady);

    assert_eq!(index.phase(), ScanPhase::FullScanPending);
    assert!(index.find("Journal/2024-03-15.md").is_some());
    assert!(index.find("Journal/2023-12-01.md").is_none());

    let due = clock.now_plus(Duration::from_millis(2000));
    assert_eq!(index.next_deadline(), Some(due));
    assert_eq!(index.poll(), ScanProgress::Waiting { until: due });

    clock.advance(Duration::from_millis(2000));
    let stats = finish_scan(&mut index);

    assert_eq!(stats.files_seen, 2);
    assert_eq!(stats.classified, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(index.phase(), ScanPhase::Steady);
    assert_eq!(index.next_deadline(), None);
    assert_eq!(
        index.note_for_period(Granularity::Day, date(2023, 12, 1)),
        Some("Journal/2023-12-01.md")
    );
    assert_eq!(index.poll(), ScanProgress::Idle);
}

#[test]
fn full_scan_runs_in_chunks() {
    let store = MemoryStore::default();
    for day in 1..=5 {
        store.add(&format!("Journal/2023-01-0{day}.md"));
    }
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 2);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));

    assert_eq!(index.poll(), ScanProgress::Scanned { processed: 2, remaining: 3 });
    assert_eq!(index.phase(), ScanPhase::FullScanning);
    assert_eq!(index.len(), 2);
    assert_eq!(index.next_deadline(), Some(clock.now_plus(Duration::from_millis(10))));

    assert_eq!(index.poll(), ScanProgress::Scanned { processed: 2, remaining: 1 });
    let ScanProgress::Completed(stats) = index.poll() else {
        panic!("expected the last chunk to complete the scan");
    };
    assert_eq!(stats.files_seen, 5);
    assert_eq!(index.len(), 5);
}

#[test]
fn reset_replaces_pending_full_scan() {
    let store = MemoryStore::default();
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);

    clock.advance(Duration::from_millis(1500));
    index.reset();
    let rescheduled = clock.now_plus(Duration::from_millis(2000));

    clock.advance(Duration::from_millis(600));
    assert_eq!(index.poll(), ScanProgress::Waiting { until: rescheduled });
    assert_eq!(index.phase(), ScanPhase::FullScanPending);
}

#[test]
fn deleted_file_is_not_resurrected_by_running_scan() {
    let store = MemoryStore::default();
    store.add("Journal/2023-01-01.md");
    store.add("Journal/2023-01-02.md");
    store.add("Journal/2023-01-03.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 1);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));

    assert_eq!(index.poll(), ScanProgress::Scanned { processed: 1, remaining: 2 });

    store.delete("Journal/2023-01-03.md");
    index.handle(VaultEvent::Deleted { path: "Journal/2023-01-03.md".into() });
    let stats = finish_scan(&mut index);

    assert_eq!(stats.files_seen, 2);
    assert!(index.find("Journal/2023-01-03.md").is_none());
    assert_eq!(index.len(), 2);
}

#[test]
fn renamed_file_is_indexed_once_under_new_path() {
    let store = MemoryStore::default();
    store.add("Journal/2023-01-01.md");
    store.add("Journal/2023-01-02.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 1);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));
    index.poll();

    let file = store.rename("Journal/2023-01-02.md", "Journal/Old/2023-01-02.md");
    index.handle(VaultEvent::Renamed { file, old_path: "Journal/2023-01-02.md".into() });
    finish_scan(&mut index);

    assert!(index.find("Journal/2023-01-02.md").is_none());
    assert!(index.find("Journal/Old/2023-01-02.md").is_some());
}

#[test]
fn unreadable_frontmatter_is_skipped() {
    let store = MemoryStore::default();
    store.add("Journal/2023-01-01.md");
    store.add("Journal/2023-01-02.md");
    store.make_unreadable("Journal/2023-01-01.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));

    let stats = finish_scan(&mut index);

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.files_seen, 2);
    assert!(index.find("Journal/2023-01-02.md").is_some());
    // Filename classification does not depend on the unreadable content.
    assert!(index.find("Journal/2023-01-01.md").is_some());
}

#[test]
fn files_outside_watched_folders_are_not_classified() {
    let store = MemoryStore::default();
    store.add("Journal/2023-01-01.md");
    store.add("Elsewhere/2023-01-02.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));

    let stats = finish_scan(&mut index);

    assert_eq!(stats.files_seen, 2);
    assert_eq!(stats.classified, 1);
}

#[test]
fn listing_failure_leaves_index_steady() {
    let store = MemoryStore::default();
    store.fail_listing();
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);
    clock.advance(Duration::from_secs(2));

    assert_eq!(index.poll(), ScanProgress::Idle);
    assert_eq!(index.phase(), ScanPhase::Steady);
    assert!(index.is_empty());

    index.handle(VaultEvent::Created(store.add("Journal/2024-03-20.md")));
    assert_eq!(index.len(), 1);
}

#[test]
fn unload_cancels_pending_scan() {
    let store = MemoryStore::default();
    store.add("Journal/2023-01-01.md");
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);

    index.unload();
    clock.advance(Duration::from_secs(5));

    assert_eq!(index.next_deadline(), None);
    assert_eq!(index.poll(), ScanProgress::Idle);
    assert!(index.is_empty());
}

#[test]
fn events_during_pending_scan_are_applied() {
    let store = MemoryStore::default();
    let clock = ManualClock::new(date(2024, 3, 20));
    let mut index = lazy_index(&store, &clock, day_only_config(), 200);
    index.handle(VaultEvent::LayoutReady);

    index.handle(VaultEvent::Created(store.add_empty("Journal/2024-03-21.md")));
    assert!(index.find("Journal/2024-03-21.md").is_some());

    clock.advance(Duration::from_secs(2));
    let stats = finish_scan(&mut index);
    assert_eq!(stats.classified, 1);
    assert_eq!(index.len(), 1);
}
