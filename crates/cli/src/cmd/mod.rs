pub mod adjacent;
pub mod completions;
pub mod doctor;
pub mod list;
pub mod note;
pub mod output;
pub mod period;
pub mod watch;

use chrono::{Local, NaiveDate};
use perinote_core::config::loader::ConfigLoader;
use perinote_core::config::types::ResolvedConfig;
use perinote_core::periodic::{PeriodicNoteIndex, ScanOptions, VaultEvent};
use perinote_core::vault::FsNoteStore;
use tracing::error;

use crate::logging::{self, LogGuard, LogSettings};
use crate::{GlobalArgs, dates};

/// Load configuration and install logging, or exit.
///
/// The returned guard flushes the log file; keep it alive for the whole
/// command.
pub fn load_config(global: &GlobalArgs) -> (ResolvedConfig, LogGuard) {
    let rc = match ConfigLoader::load(global.config.as_deref(), global.profile.as_deref()) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let settings = LogSettings::resolve(&rc.logging, global.verbosity());
    let guard = match logging::init(&settings) {
        Ok(guard) => guard,
        Err(e) => {
            let file = settings.file.as_ref().map(|(path, _)| path.display().to_string());
            eprintln!("Error opening log file {}: {}", file.unwrap_or_default(), e);
            std::process::exit(1);
        }
    };
    (rc, guard)
}

pub fn open_store(rc: &ResolvedConfig) -> FsNoteStore {
    match FsNoteStore::open(&rc.vault_root, rc.excluded_folders.clone()) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open vault: {}", e);
            eprintln!("Error opening vault {}: {}", rc.vault_root.display(), e);
            std::process::exit(1);
        }
    }
}

/// Build an index over the whole vault.
pub fn build_index(rc: &ResolvedConfig) -> PeriodicNoteIndex<FsNoteStore> {
    let options = ScanOptions { lazy: false, ..ScanOptions::default() };
    let mut index =
        PeriodicNoteIndex::new(open_store(rc), rc.periodic.clone()).with_options(options);
    index.handle(VaultEvent::LayoutReady);
    index
}

pub fn parse_date_arg(input: &str) -> NaiveDate {
    match dates::parse_date(input, Local::now().date_naive()) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
