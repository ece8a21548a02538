#![forbid(unsafe_code)]
#![allow(dead_code)]

use std::sync::Arc;

use pedigree_core::member::{Individual, Sex};
use pedigree_core::relation::{PartnerEdge, PedigreeNode};
use pedigree_engine::{FamilyContext, PedigreeBase, PedigreeEngine};
use pedigree_storage::memory::MemoryPort;
use pedigree_storage::port::StoragePort;

pub(crate) fn person(id: &str, name: &str, sex: Sex) -> Individual {
    Individual::new(id, name, sex)
}

pub(crate) fn proband(id: &str, name: &str, sex: Sex) -> Individual {
    let mut p = Individual::new(id, name, sex);
    p.role_label = Some("Proband".to_string());
    p
}

pub(crate) fn family() -> FamilyContext {
    FamilyContext::new("fam-1", "Familia García")
}

pub(crate) fn open_instance(port: &MemoryPort, base: PedigreeBase) -> PedigreeEngine {
    open_instance_for(port, family(), base)
}

pub(crate) fn open_instance_for(
    port: &MemoryPort,
    family: FamilyContext,
    base: PedigreeBase,
) -> PedigreeEngine {
    let handle: Arc<dyn StoragePort> = Arc::new(port.clone());
    PedigreeEngine::open(family, base, handle)
}

pub(crate) fn engine_over(base: PedigreeBase) -> (PedigreeEngine, MemoryPort) {
    let port = MemoryPort::new();
    let engine = open_instance(&port, base);
    (engine, port)
}

/// Proband with both parents, a maternal grandmother, a younger brother,
/// and an explicit partner record between the parents.
pub(crate) fn garcia_base() -> PedigreeBase {
    let mut base = PedigreeBase::default();
    base.members = vec![
        proband("p1", "Lucía", Sex::Female),
        person("dad", "Carlos", Sex::Male),
        person("mom", "María", Sex::Female),
        person("gma", "Rosa", Sex::Female),
        person("bro", "Diego", Sex::Male),
    ];
    base.pedigree
        .insert("p1".to_string(), PedigreeNode::new("dad", "mom"));
    base.pedigree
        .insert("bro".to_string(), PedigreeNode::new("dad", "mom"));
    base.pedigree
        .insert("mom".to_string(), PedigreeNode::new("", "gma"));
    base.partners.push(PartnerEdge::new("dad", "mom"));
    base
}

/// A lone proband with no recorded ancestry at all.
pub(crate) fn lone_proband_base() -> PedigreeBase {
    let mut base = PedigreeBase::default();
    base.members = vec![proband("s1", "Sol", Sex::Female)];
    base
}

/// Roster-only family for the parent-guess flow: a child proband, a likely
/// mother, and an uncle too old to be a plausible father.
pub(crate) fn roster_only_base() -> PedigreeBase {
    let mut base = PedigreeBase::default();
    let mut p = proband("p1", "Nico", Sex::Male);
    p.birth_date = Some("2015-03-10".to_string());
    let mut mother = person("f", "Francisca", Sex::Female);
    mother.birth_date = Some("1985-01-01".to_string());
    mother.role_label = Some("Madre".to_string());
    let mut uncle = person("u", "Ulises", Sex::Male);
    uncle.birth_date = Some("1950-01-01".to_string());
    uncle.role_label = Some("Tío".to_string());
    base.members = vec![p, mother, uncle];
    base
}
