use crate::engine::ListConsumer;
use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

/// In-process name list fed by the reloader.
///
/// Names present before the first reload are snapshotted and re-appended
/// after the whitelist on every apply, so repeated reloads never stack up
/// stale whitelist entries.
#[derive(Debug)]
pub struct NameRegistry {
    names: ArcSwap<Vec<String>>,
    original: OnceLock<Vec<String>>,
    // Names already handed out; cleared on reload so new names become usable at once.
    spawned: Mutex<FxHashSet<String>>,
}

impl NameRegistry {
    pub fn new(initial: Vec<String>) -> Self {
        Self {
            names: ArcSwap::from_pointee(initial),
            original: OnceLock::new(),
            spawned: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn names(&self) -> Arc<Vec<String>> {
        self.names.load_full()
    }

    pub fn len(&self) -> usize {
        self.names.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.load().is_empty()
    }

    /// Marks a name as in use. Returns false if it was already taken.
    pub fn mark_spawned(&self, name: &str) -> bool {
        self.spawned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string())
    }

    /// Hands out the first name not yet in use and marks it.
    pub fn spawn_next(&self) -> Option<String> {
        let names = self.names.load();
        let mut spawned = self.spawned.lock().unwrap_or_else(|e| e.into_inner());
        let name = names.iter().find(|n| !spawned.contains(n.as_str()))?;
        spawned.insert(name.clone());
        Some(name.clone())
    }

    pub fn spawned_count(&self) -> usize {
        self.spawned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ListConsumer for NameRegistry {
    fn apply(&self, mut names: Vec<String>) -> anyhow::Result<()> {
        let original = self
            .original
            .get_or_init(|| (**self.names.load()).clone());

        names.extend(original.iter().cloned());
        info!(
            "Name registry updated: {} names ({} built-in)",
            names.len(),
            original.len()
        );
        self.names.store(Arc::new(names));

        self.spawned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }
}
