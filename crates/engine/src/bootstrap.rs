#![forbid(unsafe_code)]

use pedigree_core::ancestry;
use pedigree_core::candidates::{pick_parent_candidates, today_utc};
use pedigree_core::relation::ParentSide;

use crate::EngineInner;

/// Which path the one-shot parent wiring took. Every path except
/// `AlreadyRan` and `EmptyRoster` records the persisted `bootstrapped` flag,
/// so the flow runs at most once per family across sessions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyRan,
    /// Roster is empty; nothing to wire yet, and the flag stays unset so
    /// records arriving later still get bootstrapped.
    EmptyRoster,
    /// The merged view already had both parent slots for the reference.
    ParentsPresent,
    /// The base pedigree recorded ancestry; it was copied into the overlay.
    ClonedFromBase { copied: usize },
    /// Heuristic candidates and/or synthesized placeholders fill both slots.
    Wired {
        father_id: String,
        mother_id: String,
        father_synthesized: bool,
        mother_synthesized: bool,
    },
}

pub(crate) fn run(inner: &mut EngineInner) -> BootstrapOutcome {
    if inner.store.state().bootstrapped {
        return BootstrapOutcome::AlreadyRan;
    }
    let view = inner.base.view();
    let merged = inner.store.state().merged_members(view);
    let Some(reference) = ancestry::reference_individual(&merged) else {
        return BootstrapOutcome::EmptyRoster;
    };
    let reference_id = reference.id.clone();

    let node = inner
        .store
        .state()
        .merged_pedigree(view)
        .get(&reference_id)
        .cloned()
        .unwrap_or_default();
    if node.father().is_some() && node.mother().is_some() {
        finish(inner);
        return BootstrapOutcome::ParentsPresent;
    }

    if inner
        .base
        .pedigree
        .get(&reference_id)
        .is_some_and(|base_node| !base_node.is_empty())
    {
        let copied = inner.store.state_mut().clone_from_base(view);
        finish(inner);
        return BootstrapOutcome::ClonedFromBase { copied };
    }

    let picked = pick_parent_candidates(reference, &merged, today_utc());
    let father_synthesized = picked.father_id.is_none();
    let mother_synthesized = picked.mother_id.is_none();
    if let Some(mother_id) = picked.mother_id.as_deref() {
        inner
            .store
            .state_mut()
            .set_parent(view, &reference_id, ParentSide::Mother, mother_id);
    }
    if let Some(father_id) = picked.father_id.as_deref() {
        inner
            .store
            .state_mut()
            .set_parent(view, &reference_id, ParentSide::Father, father_id);
    }
    let Some(resolved) = inner
        .store
        .state_mut()
        .ensure_parents_for(view, &reference_id)
    else {
        // The reference came from the merged view, so resolution cannot
        // miss; still, degrade into a plain marker rather than panic.
        finish(inner);
        return BootstrapOutcome::ParentsPresent;
    };
    log::info!(
        "bootstrap wired parents for {reference_id}: father={} mother={}",
        resolved.father_id,
        resolved.mother_id
    );
    finish(inner);
    BootstrapOutcome::Wired {
        father_id: resolved.father_id,
        mother_id: resolved.mother_id,
        father_synthesized,
        mother_synthesized,
    }
}

fn finish(inner: &mut EngineInner) {
    inner.store.state_mut().bootstrapped = true;
    inner.store.persist();
}
