#![forbid(unsafe_code)]

//! Generation and lineage-side classification relative to the reference
//! individual (the proband). Both walks tolerate dangling ids and cycles;
//! classification never fails, it only leaves defaults behind.

use std::collections::{BTreeMap, VecDeque};

use crate::member::Individual;
use crate::relation::PedigreeNode;

/// Which side of the family an individual's lineage belongs to, seen from
/// the reference individual. Maternal lineage goes left, paternal right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Center,
    Right,
}

/// The individual the chart is anchored on: the first member whose role
/// label reads "proband" (case-insensitive), falling back to the first
/// member of the roster.
pub fn reference_individual(members: &[Individual]) -> Option<&Individual> {
    members
        .iter()
        .find(|m| {
            m.role_label
                .as_deref()
                .is_some_and(|role| role.trim().eq_ignore_ascii_case("proband"))
        })
        .or_else(|| members.first())
}

/// Reverse index of the parent map: parent id to child ids, children in
/// map order.
pub fn child_index(pedigree: &BTreeMap<String, PedigreeNode>) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (child_id, node) in pedigree {
        for parent in [node.father(), node.mother()].into_iter().flatten() {
            index
                .entry(parent.to_string())
                .or_default()
                .push(child_id.clone());
        }
    }
    index
}

/// Generation offsets relative to the reference individual: parents walk to
/// generation - 1, children to generation + 1, breadth-first in both
/// directions at once. Members the walk never reaches default to 0.
pub fn generations(
    members: &[Individual],
    pedigree: &BTreeMap<String, PedigreeNode>,
) -> BTreeMap<String, i32> {
    let mut levels: BTreeMap<String, i32> = BTreeMap::new();
    let Some(reference) = reference_individual(members) else {
        return levels;
    };
    let children = child_index(pedigree);
    let mut queue: VecDeque<String> = VecDeque::new();
    levels.insert(reference.id.clone(), 0);
    queue.push_back(reference.id.clone());

    while let Some(id) = queue.pop_front() {
        let level = levels[&id];
        if let Some(node) = pedigree.get(&id) {
            for parent in [node.father(), node.mother()].into_iter().flatten() {
                if !levels.contains_key(parent) {
                    levels.insert(parent.to_string(), level - 1);
                    queue.push_back(parent.to_string());
                }
            }
        }
        if let Some(kids) = children.get(&id) {
            for kid in kids {
                if !levels.contains_key(kid) {
                    levels.insert(kid.clone(), level + 1);
                    queue.push_back(kid.clone());
                }
            }
        }
    }

    for member in members {
        levels.entry(member.id.clone()).or_insert(0);
    }
    levels
}

/// Classifies lineage sides: the reference is Center, the maternal ancestor
/// chain is Left, the paternal chain is Right. Everyone else (partners,
/// siblings, descendants) stays unclassified and later defaults to Center.
pub fn sides(
    members: &[Individual],
    pedigree: &BTreeMap<String, PedigreeNode>,
) -> BTreeMap<String, Side> {
    let mut map: BTreeMap<String, Side> = BTreeMap::new();
    let Some(reference) = reference_individual(members) else {
        return map;
    };
    map.insert(reference.id.clone(), Side::Center);
    let Some(node) = pedigree.get(&reference.id) else {
        return map;
    };
    if let Some(mother) = node.mother() {
        mark_lineage(mother, Side::Left, pedigree, &mut map);
    }
    if let Some(father) = node.father() {
        mark_lineage(father, Side::Right, pedigree, &mut map);
    }
    map
}

fn mark_lineage(
    start: &str,
    side: Side,
    pedigree: &BTreeMap<String, PedigreeNode>,
    map: &mut BTreeMap<String, Side>,
) {
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(start.to_string());
    while let Some(id) = queue.pop_front() {
        // First marking wins, which also terminates loops.
        if map.contains_key(&id) {
            continue;
        }
        map.insert(id.clone(), side);
        if let Some(node) = pedigree.get(&id) {
            for parent in [node.father(), node.mother()].into_iter().flatten() {
                if !map.contains_key(parent) {
                    queue.push_back(parent.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Sex;

    fn person(id: &str, sex: Sex) -> Individual {
        Individual::new(id, id.to_uppercase(), sex)
    }

    fn proband(id: &str, sex: Sex) -> Individual {
        let mut p = person(id, sex);
        p.role_label = Some("Proband".to_string());
        p
    }

    // p1 with parents dad/mom, maternal grandmother gma, child kid.
    fn family() -> (Vec<Individual>, BTreeMap<String, PedigreeNode>) {
        let members = vec![
            proband("p1", Sex::Female),
            person("dad", Sex::Male),
            person("mom", Sex::Female),
            person("gma", Sex::Female),
            person("kid", Sex::Male),
            person("loose", Sex::Unknown),
        ];
        let mut pedigree = BTreeMap::new();
        pedigree.insert("p1".to_string(), PedigreeNode::new("dad", "mom"));
        pedigree.insert("mom".to_string(), PedigreeNode::new("", "gma"));
        pedigree.insert("kid".to_string(), PedigreeNode::new("", "p1"));
        (members, pedigree)
    }

    #[test]
    fn reference_prefers_the_proband_role_over_roster_order() {
        let (members, _) = family();
        assert_eq!(reference_individual(&members).unwrap().id, "p1");

        let plain = vec![person("a", Sex::Male), person("b", Sex::Female)];
        assert_eq!(reference_individual(&plain).unwrap().id, "a");
        assert!(reference_individual(&[]).is_none());
    }

    #[test]
    fn generations_walk_up_and_down_from_the_reference() {
        let (members, pedigree) = family();
        let levels = generations(&members, &pedigree);
        assert_eq!(levels["p1"], 0);
        assert_eq!(levels["dad"], -1);
        assert_eq!(levels["mom"], -1);
        assert_eq!(levels["gma"], -2);
        assert_eq!(levels["kid"], 1);
        assert_eq!(levels["loose"], 0, "unreachable members default to 0");
    }

    #[test]
    fn generations_ignore_parent_ids_also_reachable_as_children() {
        // A cycle: x is its own grandparent. The walk must terminate and
        // keep the first level it assigned.
        let members = vec![proband("x", Sex::Male), person("y", Sex::Female)];
        let mut pedigree = BTreeMap::new();
        pedigree.insert("x".to_string(), PedigreeNode::new("", "y"));
        pedigree.insert("y".to_string(), PedigreeNode::new("", "x"));
        let levels = generations(&members, &pedigree);
        assert_eq!(levels["x"], 0);
        assert_eq!(levels["y"], -1, "first assignment wins over the loop");
    }

    #[test]
    fn sides_split_maternal_left_and_paternal_right() {
        let (members, pedigree) = family();
        let map = sides(&members, &pedigree);
        assert_eq!(map["p1"], Side::Center);
        assert_eq!(map["mom"], Side::Left);
        assert_eq!(map["gma"], Side::Left, "maternal chain stays left");
        assert_eq!(map["dad"], Side::Right);
        assert!(!map.contains_key("kid"), "descendants stay unclassified");
        assert!(!map.contains_key("loose"));
    }

    #[test]
    fn sides_without_a_reference_node_only_mark_center() {
        let members = vec![proband("p1", Sex::Female)];
        let map = sides(&members, &BTreeMap::new());
        assert_eq!(map.len(), 1);
        assert_eq!(map["p1"], Side::Center);
    }
}
