#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::member::Individual;
use crate::relation::PedigreeNode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: &'static str,
    /// "member" or "link".
    pub kind: &'static str,
    pub key: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub ok: bool,
    pub members_checked: usize,
    pub links_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

/// Reports structural problems in the merged graph without refusing to
/// render any of them. The layout degrades around every issue listed here;
/// this pass exists so the application can surface them.
pub fn validate(
    members: &[Individual],
    pedigree: &BTreeMap<String, PedigreeNode>,
) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();
    let mut ids: BTreeSet<&str> = BTreeSet::new();

    for (index, member) in members.iter().enumerate() {
        if member.id.trim().is_empty() {
            issues.push(ValidationIssue {
                code: "EMPTY_MEMBER_ID",
                kind: "member",
                key: format!("#{index}"),
                message: format!("member at index {index} has an empty id"),
            });
            continue;
        }
        if !ids.insert(&member.id) {
            issues.push(ValidationIssue {
                code: "DUPLICATE_MEMBER_ID",
                kind: "member",
                key: member.id.clone(),
                message: format!("member id '{}' appears more than once", member.id),
            });
        }
    }

    for member in members {
        if let Some(partner) = member.partner_of.as_deref()
            && !partner.trim().is_empty()
            && !ids.contains(partner.trim())
        {
            issues.push(ValidationIssue {
                code: "DANGLING_PARTNER",
                kind: "member",
                key: member.id.clone(),
                message: format!(
                    "member '{}' references unknown partner '{}'",
                    member.id, partner
                ),
            });
        }
    }

    for (child_id, node) in pedigree {
        for (slot, parent) in [("padre", node.father()), ("madre", node.mother())] {
            let Some(parent) = parent else { continue };
            if parent == child_id {
                issues.push(ValidationIssue {
                    code: "SELF_PARENT",
                    kind: "link",
                    key: format!("{child_id}/{slot}"),
                    message: format!("'{child_id}' is recorded as its own parent"),
                });
            } else if !ids.contains(parent) {
                issues.push(ValidationIssue {
                    code: "DANGLING_PARENT",
                    kind: "link",
                    key: format!("{child_id}/{slot}"),
                    message: format!("'{child_id}' references unknown parent '{parent}'"),
                });
            }
        }
        if has_ancestor_cycle(child_id, pedigree) {
            issues.push(ValidationIssue {
                code: "PEDIGREE_CYCLE",
                kind: "link",
                key: child_id.clone(),
                message: format!("'{child_id}' is an ancestor of itself"),
            });
        }
    }

    ValidationReport {
        ok: issues.is_empty(),
        members_checked: members.len(),
        links_checked: pedigree.len(),
        issues,
    }
}

fn has_ancestor_cycle(start: &str, pedigree: &BTreeMap<String, PedigreeNode>) -> bool {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    if let Some(node) = pedigree.get(start) {
        queue.extend([node.father(), node.mother()].into_iter().flatten());
    }
    while let Some(id) = queue.pop_front() {
        if id == start {
            return true;
        }
        if !visited.insert(id) {
            continue;
        }
        if let Some(node) = pedigree.get(id) {
            queue.extend([node.father(), node.mother()].into_iter().flatten());
        }
    }
    false
}
