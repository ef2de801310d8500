//! Inbound host events and outbound index notifications.

use crate::frontmatter::Frontmatter;
use crate::vault::VaultFile;

use super::entry::PeriodicNoteEntry;
use super::granularity::Granularity;
use super::settings::IndexConfiguration;

/// Events delivered by the host application.
#[derive(Debug, Clone)]
pub enum VaultEvent {
    /// The file store is ready to be queried; starts the initial scan.
    LayoutReady,
    Created(VaultFile),
    Renamed { file: VaultFile, old_path: String },
    Deleted { path: String },
    MetadataChanged { file: VaultFile, frontmatter: Option<Frontmatter> },
    ConfigurationChanged(IndexConfiguration),
}

/// Why a file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveReason {
    Create,
    Rename,
    Initialize,
    MetadataChange,
}

/// Notifications emitted to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// A file was classified (or reclassified).
    Resolved {
        entry: PeriodicNoteEntry,
        reason: ResolveReason,
        /// The file was just created empty and should receive its template.
        apply_template: bool,
    },
    /// A file's entry was dropped.
    Removed { path: String, granularity: Granularity },
    /// The index was cleared ahead of a rescan.
    Reset,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&IndexEvent)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    registered: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registered.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.registered.len();
        self.registered.retain(|(registered, _)| *registered != id);
        self.registered.len() != before
    }

    pub(crate) fn emit(&mut self, event: &IndexEvent) {
        for (_, listener) in &mut self.registered {
            listener(event);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.registered.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.registered.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.registered.len()).finish()
    }
}
