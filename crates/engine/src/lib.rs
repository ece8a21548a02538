#![forbid(unsafe_code)]

pub mod bootstrap;
mod render;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use pedigree_core::ancestry;
use pedigree_core::draft::{DraftMember, DraftState, ResolvedParents};
use pedigree_core::layout::{LayoutConfig, PedigreeLayout, compute_layout};
use pedigree_core::member::Individual;
use pedigree_core::merge::BaseView;
use pedigree_core::relation::{ParentLink, ParentSide, PartnerEdge, PedigreeNode, partner_pairs};
use pedigree_core::validate::{ValidationReport, validate};
use pedigree_storage::draft_store::DraftStore;
use pedigree_storage::port::StoragePort;

pub use bootstrap::BootstrapOutcome;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyContext {
    pub id: String,
    pub display_name: String,
}

impl FamilyContext {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Canonical record-system state for one family: the roster, the stored
/// parent map, the relationship records carrying biological-nature flags,
/// and explicit partner records.
#[derive(Clone, Debug, Default)]
pub struct PedigreeBase {
    pub members: Vec<Individual>,
    pub pedigree: BTreeMap<String, PedigreeNode>,
    pub links: Vec<ParentLink>,
    pub partners: Vec<PartnerEdge>,
}

impl PedigreeBase {
    fn view(&self) -> BaseView<'_> {
        BaseView {
            members: &self.members,
            pedigree: &self.pedigree,
        }
    }
}

pub(crate) struct EngineInner {
    family: FamilyContext,
    base: PedigreeBase,
    store: DraftStore,
    config: LayoutConfig,
}

impl EngineInner {
    pub(crate) fn merged_members(&self) -> Vec<Individual> {
        self.store.state().merged_members(self.base.view())
    }

    pub(crate) fn merged_pedigree(&self) -> BTreeMap<String, PedigreeNode> {
        self.store.state().merged_pedigree(self.base.view())
    }

    pub(crate) fn layout_for(
        &self,
        members: &[Individual],
        pedigree: &BTreeMap<String, PedigreeNode>,
    ) -> PedigreeLayout {
        let generations = ancestry::generations(members, pedigree);
        let sides = ancestry::sides(members, pedigree);
        let natures = ParentLink::nature_index(&self.base.links);
        let partners = partner_pairs(members, pedigree, &self.base.partners);
        compute_layout(
            members,
            &generations,
            &sides,
            pedigree,
            &partners,
            &natures,
            &self.config,
        )
    }

    pub(crate) fn compute_layout(&self) -> PedigreeLayout {
        let members = self.merged_members();
        let pedigree = self.merged_pedigree();
        self.layout_for(&members, &pedigree)
    }

    pub(crate) fn validate(&self) -> ValidationReport {
        validate(&self.merged_members(), &self.merged_pedigree())
    }
}

/// Thread-safe handle over one family's merged pedigree: hydrates the draft
/// overlay on open, recomputes classification and layout on demand, applies
/// draft mutations with persist-on-change, and follows writes made by other
/// instances sharing the same port.
#[derive(Clone)]
pub struct PedigreeEngine {
    inner: Arc<Mutex<EngineInner>>,
}

impl PedigreeEngine {
    pub fn open(family: FamilyContext, base: PedigreeBase, port: Arc<dyn StoragePort>) -> Self {
        let store = DraftStore::open(Arc::clone(&port), family.id.clone());
        let inner = Arc::new(Mutex::new(EngineInner {
            family,
            base,
            store,
            config: LayoutConfig::default(),
        }));

        // Follow foreign writes to whatever key the engine currently tracks.
        // The port never notifies the writing handle, so this cannot re-enter
        // a mutation in progress on this engine; try_lock covers the
        // cross-thread case, where the next notification catches us up.
        let weak = Arc::downgrade(&inner);
        port.subscribe(Arc::new(move |key: &str| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Ok(mut guard) = inner.try_lock() else {
                return;
            };
            if guard.store.storage_key() == key {
                log::debug!("reloading draft after foreign write to {key}");
                guard.store.refresh();
            }
        }));

        Self { inner }
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("engine state mutex poisoned")
    }

    pub fn family(&self) -> FamilyContext {
        self.lock().family.clone()
    }

    /// Re-points the engine at another family: drops the previous overlay
    /// state and hydrates the new family's blob.
    pub fn switch_family(&self, family: FamilyContext, base: PedigreeBase) {
        let mut inner = self.lock();
        inner.store.switch_family(family.id.clone());
        inner.family = family;
        inner.base = base;
    }

    /// Manually re-reads the persisted blob, discarding unpersisted edits.
    pub fn refresh(&self) {
        self.lock().store.refresh();
    }

    pub fn draft_ready(&self) -> bool {
        self.lock().store.draft_ready()
    }

    pub fn draft_state(&self) -> DraftState {
        self.lock().store.state().clone()
    }

    pub fn set_layout_config(&self, config: LayoutConfig) {
        self.lock().config = config;
    }

    pub fn merged_members(&self) -> Vec<Individual> {
        self.lock().merged_members()
    }

    pub fn merged_pedigree(&self) -> BTreeMap<String, PedigreeNode> {
        self.lock().merged_pedigree()
    }

    pub fn layout(&self) -> PedigreeLayout {
        self.lock().compute_layout()
    }

    pub fn validate(&self) -> ValidationReport {
        self.lock().validate()
    }

    /// Full render payload for a frontend: family, merged graph, layout
    /// geometry, and the validation report.
    pub fn render_json(&self) -> serde_json::Value {
        let inner = self.lock();
        render::render_json(&inner)
    }

    pub fn ensure_parents_for(&self, target_id: &str) -> Option<ResolvedParents> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let resolved = inner
            .store
            .state_mut()
            .ensure_parents_for(inner.base.view(), target_id);
        if resolved.is_some() {
            inner.store.persist();
        }
        resolved
    }

    pub fn add_sibling(&self, target_id: &str) -> Option<String> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let created = inner
            .store
            .state_mut()
            .add_sibling(inner.base.view(), target_id);
        if created.is_some() {
            inner.store.persist();
        }
        created
    }

    pub fn add_child(&self, target_id: &str, forced_side: Option<ParentSide>) -> Option<String> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let created = inner
            .store
            .state_mut()
            .add_child(inner.base.view(), target_id, forced_side);
        if created.is_some() {
            inner.store.persist();
        }
        created
    }

    pub fn add_partner(&self, target_id: &str) -> Option<String> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let created = inner
            .store
            .state_mut()
            .add_partner(inner.base.view(), target_id);
        if created.is_some() {
            inner.store.persist();
        }
        created
    }

    pub fn update_member(&self, patch: DraftMember) -> bool {
        let mut inner = self.lock();
        let applied = inner.store.state_mut().update_member(patch);
        if applied {
            inner.store.persist();
        }
        applied
    }

    pub fn remove_member(&self, member_id: &str) -> bool {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let removed = inner
            .store
            .state_mut()
            .remove_member(inner.base.view(), member_id);
        if removed {
            inner.store.persist();
        }
        removed
    }

    pub fn set_parent(&self, child_id: &str, side: ParentSide, parent_id: &str) -> bool {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let applied = inner
            .store
            .state_mut()
            .set_parent(inner.base.view(), child_id, side, parent_id);
        if applied {
            inner.store.persist();
        }
        applied
    }

    /// Copies the base pedigree into the overlay so later edits never touch
    /// canonical records. Returns how many nodes were copied.
    pub fn clone_base_pedigree(&self) -> usize {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let copied = inner.store.state_mut().clone_from_base(inner.base.view());
        if copied > 0 {
            inner.store.persist();
        }
        copied
    }

    /// Clears all draft edits for the current family and persists the empty
    /// overlay.
    pub fn reset_draft(&self) {
        let mut inner = self.lock();
        inner.store.state_mut().reset();
        inner.store.persist();
    }

    /// One-shot parent wiring for the reference individual; see
    /// [`BootstrapOutcome`] for the paths it can take.
    pub fn bootstrap_parents(&self) -> BootstrapOutcome {
        let mut inner = self.lock();
        bootstrap::run(&mut inner)
    }
}
