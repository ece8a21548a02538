#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use crate::draft::DraftMember;
use crate::member::Individual;
use crate::relation::PedigreeNode;

/// Borrowed view of the canonical record-system state a draft overlays.
#[derive(Clone, Copy, Debug)]
pub struct BaseView<'a> {
    pub members: &'a [Individual],
    pub pedigree: &'a BTreeMap<String, PedigreeNode>,
}

/// Merges the base roster with the draft overlay.
///
/// Base individuals come first in base order; draft-only individuals follow
/// in draft order. Draft entries matching a base id apply as shallow patches.
/// A tombstone removes the base individual and blocks any later draft entry
/// for the same id, so deletion wins over concurrent edits.
pub fn merge_members(base: &[Individual], draft: &[DraftMember]) -> Vec<Individual> {
    let mut order: Vec<String> = Vec::with_capacity(base.len() + draft.len());
    let mut by_id: BTreeMap<String, Individual> = BTreeMap::new();
    let mut tombstoned: BTreeSet<&str> = BTreeSet::new();

    for member in base {
        if !by_id.contains_key(&member.id) {
            order.push(member.id.clone());
        }
        by_id.insert(member.id.clone(), member.clone());
    }

    for entry in draft {
        if entry.deleted {
            by_id.remove(&entry.id);
            tombstoned.insert(&entry.id);
            continue;
        }
        if tombstoned.contains(entry.id.as_str()) {
            continue;
        }
        match by_id.get_mut(&entry.id) {
            Some(existing) => entry.apply_to(existing),
            None => {
                order.push(entry.id.clone());
                by_id.insert(entry.id.clone(), entry.materialize());
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Merges the base parent map with the draft overlay. Draft nodes override
/// base nodes wholesale; there is no per-slot merge.
pub fn merge_pedigree(
    base: &BTreeMap<String, PedigreeNode>,
    draft: &BTreeMap<String, PedigreeNode>,
) -> BTreeMap<String, PedigreeNode> {
    let mut merged = base.clone();
    for (child_id, node) in draft {
        merged.insert(child_id.clone(), node.clone());
    }
    merged
}
