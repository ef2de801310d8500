//! Live index driven by filesystem notifications.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use perinote_core::periodic::{IndexConfiguration, IndexEvent, PeriodicNoteIndex, VaultEvent};
use perinote_core::vault::{FsNoteStore, NoteStore};
use tracing::{debug, error, info, warn};

use crate::GlobalArgs;

/// How long to block when the index has nothing scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(60);

/// How long one side of a rename waits for the backend to report the pair.
const RENAME_WINDOW: Duration = Duration::from_millis(50);

pub fn run(global: &GlobalArgs) {
    let (rc, _log) = super::load_config(global);
    let store = super::open_store(&rc);
    let root = store.root().to_path_buf();

    let (tx, rx) = mpsc::channel();
    let mut watcher = match notify::recommended_watcher(tx) {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("Failed to create watcher: {}", e);
            eprintln!("Error: cannot watch {}: {}", root.display(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
        error!("Failed to watch {}: {}", root.display(), e);
        eprintln!("Error: cannot watch {}: {}", root.display(), e);
        std::process::exit(1);
    }

    let mut index = PeriodicNoteIndex::new(store, rc.periodic.clone());
    let templates = rc.periodic.clone();
    index.subscribe(move |event| print_event(event, &templates));
    index.handle(VaultEvent::LayoutReady);
    info!("Watching {}", root.display());

    let mut renames = RenamePairing::default();
    loop {
        let due = match (index.next_deadline(), renames.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let wait = due.map_or(IDLE_WAIT, |due| due.saturating_duration_since(Instant::now()));

        match rx.recv_timeout(wait) {
            Ok(Ok(event)) => {
                let events = translate(index.store(), &event, &mut renames, Instant::now());
                for vault_event in events {
                    index.handle(vault_event);
                }
            }
            Ok(Err(e)) => warn!("Watch error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                error!("Filesystem watcher stopped");
                break;
            }
        }

        let unpaired = renames.expired(Instant::now());
        let settled: Vec<_> =
            unpaired.into_iter().filter_map(|h| h.settle(index.store())).collect();
        for vault_event in settled {
            index.handle(vault_event);
        }

        if index.next_deadline().is_some_and(|due| due <= Instant::now()) {
            let progress = index.poll();
            debug!("Scan progress: {:?}", progress);
        }
    }
}

fn print_event(event: &IndexEvent, config: &IndexConfiguration) {
    match event {
        IndexEvent::Resolved { entry, reason, apply_template } => {
            println!(
                "resolved {} {} {} ({:?})",
                entry.granularity, entry.canonical_date_key, entry.file_path, reason
            );
            if *apply_template && let Some(template) = config.get(entry.granularity).template() {
                println!("template {} -> {}", template, entry.file_path);
            }
        }
        IndexEvent::Removed { path, granularity } => println!("removed {granularity} {path}"),
        IndexEvent::Reset => println!("reset"),
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// One side of a rename reported on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RenameHalf {
    From(PathBuf),
    To(PathBuf),
}

impl RenameHalf {
    /// The event for a half whose pair never arrived: the file left or
    /// entered the vault.
    fn settle(self, store: &FsNoteStore) -> Option<VaultEvent> {
        match self {
            RenameHalf::From(path) => {
                store.vault_file(&path).map(|f| VaultEvent::Deleted { path: f.path })
            }
            RenameHalf::To(path) => store.vault_file(&path).map(VaultEvent::Created),
        }
    }
}

/// Rename halves waiting to be matched with a `Both` event.
///
/// inotify reports a rename inside the watched tree as `From`, `To` and then
/// `Both`. Only `Both` is applied; halves left over after [`RENAME_WINDOW`]
/// belong to moves across the vault boundary.
#[derive(Debug, Default)]
struct RenamePairing {
    pending: Vec<(Instant, RenameHalf)>,
}

impl RenamePairing {
    fn hold(&mut self, half: RenameHalf, now: Instant) {
        self.pending.push((now, half));
    }

    fn complete(&mut self, from: &Path, to: &Path) {
        self.pending.retain(|(_, half)| match half {
            RenameHalf::From(path) => path != from,
            RenameHalf::To(path) => path != to,
        });
    }

    fn expired(&mut self, now: Instant) -> Vec<RenameHalf> {
        let (expired, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|(held, _)| now.saturating_duration_since(*held) >= RENAME_WINDOW);
        self.pending = waiting;
        expired.into_iter().map(|(_, half)| half).collect()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(held, _)| *held + RENAME_WINDOW).min()
    }
}

/// Map a filesystem notification onto host events for the index.
fn translate(
    store: &FsNoteStore,
    event: &Event,
    renames: &mut RenamePairing,
    now: Instant,
) -> Vec<VaultEvent> {
    let created = |path: &Path| store.vault_file(path).map(VaultEvent::Created);
    let deleted =
        |path: &Path| store.vault_file(path).map(|f| VaultEvent::Deleted { path: f.path });
    let markdown = || event.paths.iter().filter(|p| is_markdown(p));

    match &event.kind {
        EventKind::Create(_) => markdown().filter_map(|p| created(p)).collect(),
        EventKind::Remove(_) => markdown().filter_map(|p| deleted(p)).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in markdown() {
                renames.hold(RenameHalf::From(path.clone()), now);
            }
            Vec::new()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in markdown() {
                renames.hold(RenameHalf::To(path.clone()), now);
            }
            Vec::new()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let (from, to) = (&event.paths[0], &event.paths[1]);
            renames.complete(from, to);
            match (is_markdown(from), is_markdown(to)) {
                (true, true) => store
                    .vault_file(to)
                    .zip(store.vault_file(from))
                    .map(|(file, old)| VaultEvent::Renamed { file, old_path: old.path })
                    .into_iter()
                    .collect(),
                (true, false) => deleted(from).into_iter().collect(),
                (false, true) => created(to).into_iter().collect(),
                (false, false) => Vec::new(),
            }
        }
        // Backends that cannot tell the two sides apart report each path
        // separately; whether it still exists says which side it was.
        EventKind::Modify(ModifyKind::Name(_)) => markdown()
            .filter_map(|p| if p.exists() { created(p) } else { deleted(p) })
            .collect(),
        EventKind::Modify(_) => markdown()
            .filter(|p| p.is_file())
            .filter_map(|p| store.vault_file(p))
            .filter_map(|file| match store.read_frontmatter(&file) {
                Ok(frontmatter) => Some(VaultEvent::MetadataChanged { file, frontmatter }),
                Err(e) => {
                    warn!("Skipping change to {}: {}", file.path, e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}
