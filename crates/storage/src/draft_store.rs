#![forbid(unsafe_code)]

use std::sync::Arc;

use pedigree_core::draft::DraftState;

use crate::port::StoragePort;

/// Namespace prefix for persisted draft blobs; the full key is
/// `<namespace>/<family_id>`.
pub const DEFAULT_NAMESPACE: &str = "pedigree-draft";

/// Hydrates, holds, and persists the draft overlay for one family at a
/// time. Never fails outward: a missing blob starts empty, a malformed one
/// is discarded, and storage errors are logged rather than surfaced.
///
/// Writes are guarded against the stale-hydration race: if the store has
/// switched family since the state was loaded, a persist call is dropped so
/// it can never clobber another family's draft.
pub struct DraftStore {
    port: Arc<dyn StoragePort>,
    namespace: String,
    family_id: String,
    loaded_family_id: Option<String>,
    state: DraftState,
    draft_ready: bool,
}

impl DraftStore {
    pub fn open(port: Arc<dyn StoragePort>, family_id: impl Into<String>) -> Self {
        Self::open_with_namespace(port, DEFAULT_NAMESPACE, family_id)
    }

    pub fn open_with_namespace(
        port: Arc<dyn StoragePort>,
        namespace: impl Into<String>,
        family_id: impl Into<String>,
    ) -> Self {
        let mut store = Self {
            port,
            namespace: namespace.into(),
            family_id: family_id.into(),
            loaded_family_id: None,
            state: DraftState::new(),
            draft_ready: false,
        };
        store.hydrate();
        store
    }

    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.namespace, self.family_id)
    }

    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    /// True once the current family's blob has been loaded (or defaulted).
    /// Mutations observed while this is false must not be persisted.
    pub fn draft_ready(&self) -> bool {
        self.draft_ready
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DraftState {
        &mut self.state
    }

    /// Re-reads the current family's blob, replacing in-memory state. Used
    /// both at open and when another instance signals a change.
    pub fn refresh(&mut self) {
        self.hydrate();
    }

    /// Abandons the previous family's state and hydrates the new one. Any
    /// in-flight edits for the old family are dropped, not carried over.
    pub fn switch_family(&mut self, family_id: impl Into<String>) {
        self.family_id = family_id.into();
        self.hydrate();
    }

    /// Serializes the current state under the current family key. Drops the
    /// write with a warning when the state was hydrated for another family.
    pub fn persist(&mut self) {
        if !self.draft_ready {
            log::debug!(
                "skipping draft persist for {}: not hydrated yet",
                self.storage_key()
            );
            return;
        }
        if self.loaded_family_id.as_deref() != Some(self.family_id.as_str()) {
            log::warn!(
                "dropping draft persist for {}: state was hydrated for {:?}",
                self.storage_key(),
                self.loaded_family_id
            );
            return;
        }
        let key = self.storage_key();
        match serde_json::to_string(&self.state) {
            Ok(raw) => {
                if let Err(err) = self.port.write(&key, &raw) {
                    log::warn!("draft persist failed for {key}: {err}");
                }
            }
            Err(err) => log::warn!("draft serialization failed for {key}: {err}"),
        }
    }

    fn hydrate(&mut self) {
        self.draft_ready = false;
        let key = self.storage_key();
        self.state = match self.port.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<DraftState>(&raw) {
                Ok(state) => state,
                Err(err) => {
                    log::warn!("draft blob at {key} is malformed, starting empty: {err}");
                    DraftState::new()
                }
            },
            Ok(None) => DraftState::new(),
            Err(err) => {
                log::warn!("draft hydration failed for {key}, starting empty: {err}");
                DraftState::new()
            }
        };
        self.loaded_family_id = Some(self.family_id.clone());
        self.draft_ready = true;
    }
}
