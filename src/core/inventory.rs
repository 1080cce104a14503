//! Owned package arena with category index and filter/search views.
//!
//! Records live in one `Vec`, addressed through an origin→index map; all
//! status mutation goes through update-by-key operations on this owner.
//! Filtering and searching never touch the records — they produce a *view*
//! (category → member indices) that narrows membership while the reference
//! index keeps the full picture, so category headers can keep reporting
//! their unfiltered size.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bitflags::bitflags;
use thiserror::Error;

use super::backend::{BackendError, PkgBackend, RawPackage};

bitflags! {
    /// Per-package status flags; also used as the filter mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const AVAILABLE       = 1 << 0;
        const INSTALLED       = 1 << 1;
        const PENDING_INSTALL = 1 << 2;
        const PENDING_REMOVAL = 1 << 3;
        const UPGRADABLE      = 1 << 4;

        const PENDING = Self::PENDING_INSTALL.bits() | Self::PENDING_REMOVAL.bits();
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("unknown package origin [{0}]")]
    UnknownOrigin(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One package, keyed by its `category/name` origin.
#[derive(Debug, Clone)]
pub struct PkgRecord {
    pub origin: String,
    pub category: String,
    pub name: String,
    pub local_version: Option<String>,
    pub remote_version: String,
    pub comment: String,
    pub description: String,
    pub status: Status,
}

impl PkgRecord {
    fn from_raw(raw: RawPackage, status: Status) -> Self {
        let (category, name) = split_origin(&raw.origin);
        Self {
            origin: raw.origin,
            category,
            name,
            local_version: None,
            remote_version: raw.version,
            comment: raw.comment,
            description: raw.description,
            status,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.status.contains(Status::INSTALLED)
    }

    pub fn has_pending(&self) -> bool {
        self.status.intersects(Status::PENDING)
    }

    pub fn is_upgradable(&self) -> bool {
        self.status.contains(Status::UPGRADABLE)
    }
}

/// Category is everything before the first `/`, display name the rest.
fn split_origin(origin: &str) -> (String, String) {
    match origin.split_once('/') {
        Some((category, name)) => (category.to_string(), name.to_string()),
        None => (origin.to_string(), origin.to_string()),
    }
}

type CategoryIndex = BTreeMap<String, Vec<usize>>;

/// The package inventory: arena, category index, and the active view.
pub struct Inventory {
    backend: Arc<dyn PkgBackend>,
    records: Vec<PkgRecord>,
    by_origin: HashMap<String, usize>,
    /// Reference index over all records, stable category/member order.
    categories: CategoryIndex,
    /// Narrowed membership while a filter or search is active.
    view: Option<CategoryIndex>,
}

impl Inventory {
    pub fn new(backend: Arc<dyn PkgBackend>) -> Self {
        Self {
            backend,
            records: Vec::new(),
            by_origin: HashMap::new(),
            categories: CategoryIndex::new(),
            view: None,
        }
    }

    pub fn backend(&self) -> Arc<dyn PkgBackend> {
        Arc::clone(&self.backend)
    }

    pub fn has_privileges(&self) -> bool {
        self.backend.has_privileges()
    }

    // ── loading ────────────────────────────────────────────────

    /// Rebuild the arena from the remote repository, then overlay the local
    /// one: locally present packages become installed (and upgradable when
    /// the versions differ). Drops any active view and pending flags.
    pub fn reload(&mut self) -> Result<(), InventoryError> {
        let remote = self.backend.query_remote()?;
        let local = self.backend.query_local()?;

        self.records.clear();
        self.by_origin.clear();
        self.view = None;

        for raw in remote {
            self.insert(PkgRecord::from_raw(raw, Status::AVAILABLE));
        }
        for raw in local {
            let version = raw.version.clone();
            match self.by_origin.get(&raw.origin) {
                Some(&idx) => {
                    let record = &mut self.records[idx];
                    record.status |= Status::INSTALLED;
                    if version != record.remote_version {
                        // Assume a version mismatch means the local package
                        // is outdated; locally-newer builds are rare enough
                        // not to warrant a real version comparison.
                        record.status |= Status::UPGRADABLE;
                    }
                    record.local_version = Some(version);
                }
                None => {
                    let mut record = PkgRecord::from_raw(raw, Status::INSTALLED);
                    record.local_version = Some(version);
                    self.insert(record);
                }
            }
        }

        self.rebuild_category_index();
        tracing::debug!(
            packages = self.records.len(),
            categories = self.categories.len(),
            "inventory reloaded"
        );
        Ok(())
    }

    fn insert(&mut self, record: PkgRecord) {
        self.by_origin.insert(record.origin.clone(), self.records.len());
        self.records.push(record);
    }

    fn rebuild_category_index(&mut self) {
        self.categories.clear();
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| self.records[a].origin.cmp(&self.records[b].origin));
        for idx in order {
            self.categories
                .entry(self.records[idx].category.clone())
                .or_default()
                .push(idx);
        }
    }

    // ── queries ────────────────────────────────────────────────

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Category names in stable (sorted) order. Always the full reference
    /// set — filtering narrows members, never the category list.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Unfiltered member count of a category.
    pub fn category_size(&self, category: &str) -> usize {
        self.categories.get(category).map_or(0, Vec::len)
    }

    /// Member indices of a category under the active view.
    pub fn members_of(&self, category: &str) -> &[usize] {
        let index = self.view.as_ref().unwrap_or(&self.categories);
        index.get(category).map_or(&[], Vec::as_slice)
    }

    pub fn record(&self, idx: usize) -> &PkgRecord {
        &self.records[idx]
    }

    pub fn get(&self, origin: &str) -> Result<&PkgRecord, InventoryError> {
        self.by_origin
            .get(origin)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| InventoryError::UnknownOrigin(origin.to_string()))
    }

    fn get_mut(&mut self, origin: &str) -> Result<&mut PkgRecord, InventoryError> {
        match self.by_origin.get(origin) {
            Some(&idx) => Ok(&mut self.records[idx]),
            None => Err(InventoryError::UnknownOrigin(origin.to_string())),
        }
    }

    // ── pending actions ────────────────────────────────────────

    /// Queue an install: not installed → pending install; a queued removal
    /// is cancelled instead; an installed-but-upgradable package queues its
    /// upgrade as an install.
    pub fn register_install(&mut self, origin: &str) -> Result<(), InventoryError> {
        let record = self.get_mut(origin)?;
        if !record.status.contains(Status::INSTALLED) {
            record.status |= Status::PENDING_INSTALL;
        } else if record.status.contains(Status::PENDING_REMOVAL) {
            record.status -= Status::PENDING_REMOVAL;
        } else if record.status.contains(Status::UPGRADABLE) {
            record.status |= Status::PENDING_INSTALL;
        }
        Ok(())
    }

    /// Queue a removal; a queued install is cancelled instead.
    pub fn register_removal(&mut self, origin: &str) -> Result<(), InventoryError> {
        let record = self.get_mut(origin)?;
        if record.status.contains(Status::PENDING_INSTALL) {
            record.status -= Status::PENDING_INSTALL;
        } else if record.status.contains(Status::INSTALLED) {
            record.status |= Status::PENDING_REMOVAL;
        }
        Ok(())
    }

    /// Origins queued for install and removal, in stable order.
    pub fn pending(&self) -> (Vec<String>, Vec<String>) {
        let mut installs = Vec::new();
        let mut removals = Vec::new();
        for members in self.categories.values() {
            for &idx in members {
                let record = &self.records[idx];
                if record.status.contains(Status::PENDING_INSTALL) {
                    installs.push(record.origin.clone());
                } else if record.status.contains(Status::PENDING_REMOVAL) {
                    removals.push(record.origin.clone());
                }
            }
        }
        (installs, removals)
    }

    pub fn has_pending(&self) -> bool {
        self.records.iter().any(PkgRecord::has_pending)
    }

    pub fn reset_pending(&mut self) {
        for record in &mut self.records {
            record.status -= Status::PENDING;
        }
    }

    // ── filter / search ────────────────────────────────────────

    /// Narrow members to records whose status intersects `mask`. An empty
    /// mask drops back to the reference view.
    pub fn apply_filter(&mut self, mask: Status) {
        if mask.is_empty() {
            self.reset_filter();
            return;
        }
        let view = self.narrowed(|record| record.status.intersects(mask));
        self.view = Some(view);
    }

    /// Narrow members to origins reported by the backend's search.
    pub fn search(&mut self, term: &str) -> Result<(), InventoryError> {
        let matches: HashSet<String> = self.backend.search(term)?.into_iter().collect();
        let view = self.narrowed(|record| matches.contains(&record.origin));
        self.view = Some(view);
        Ok(())
    }

    pub fn reset_filter(&mut self) {
        self.view = None;
    }

    fn narrowed(&self, keep: impl Fn(&PkgRecord) -> bool) -> CategoryIndex {
        // Every category stays present; only membership narrows.
        self.categories
            .iter()
            .map(|(category, members)| {
                let kept = members
                    .iter()
                    .copied()
                    .filter(|&idx| keep(&self.records[idx]))
                    .collect();
                (category.clone(), kept)
            })
            .collect()
    }
}
