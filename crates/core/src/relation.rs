#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::member::Individual;

fn default_biological() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Biological-nature flags for a parent edge. `biological` defaults to true;
/// the other flags default to false.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNature {
    #[serde(default = "default_biological")]
    pub biological: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub gestational: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub adoptive: bool,
}

impl Default for LinkNature {
    fn default() -> Self {
        Self {
            biological: true,
            gestational: false,
            adoptive: false,
        }
    }
}

impl LinkNature {
    /// Non-biological and adoptive edges render dashed.
    pub fn dashed(self) -> bool {
        !self.biological || self.adoptive
    }
}

/// Directed child-to-parents record as stored by the record system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLink {
    pub child_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<String>,
    #[serde(flatten)]
    pub nature: LinkNature,
}

impl ParentLink {
    pub fn nature_index(links: &[ParentLink]) -> BTreeMap<String, LinkNature> {
        let mut index = BTreeMap::new();
        for link in links {
            index.entry(link.child_id.clone()).or_insert(link.nature);
        }
        index
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    #[default]
    Current,
    Separated,
    Divorced,
    Widowed,
}

/// Undirected partner edge. The endpoint pair is canonicalized so `(a, b)`
/// and `(b, a)` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerEdge {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub status: PartnerStatus,
    #[serde(default, skip_serializing_if = "is_false")]
    pub consanguineous: bool,
}

impl PartnerEdge {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            a,
            b,
            status: PartnerStatus::default(),
            consanguineous: false,
        }
    }

    pub fn pair(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentSide {
    Father,
    Mother,
}

/// Per-child parent slots in the Spanish wire shape of the record system:
/// `padreId` (father) and `madreId` (mother), empty string meaning unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeNode {
    #[serde(rename = "padreId", default)]
    pub father_id: String,
    #[serde(rename = "madreId", default)]
    pub mother_id: String,
}

impl PedigreeNode {
    pub fn new(father_id: impl Into<String>, mother_id: impl Into<String>) -> Self {
        Self {
            father_id: father_id.into(),
            mother_id: mother_id.into(),
        }
    }

    pub fn father(&self) -> Option<&str> {
        non_empty(&self.father_id)
    }

    pub fn mother(&self) -> Option<&str> {
        non_empty(&self.mother_id)
    }

    pub fn slot(&self, side: ParentSide) -> Option<&str> {
        match side {
            ParentSide::Father => self.father(),
            ParentSide::Mother => self.mother(),
        }
    }

    pub fn set_slot(&mut self, side: ParentSide, parent_id: impl Into<String>) {
        match side {
            ParentSide::Father => self.father_id = parent_id.into(),
            ParentSide::Mother => self.mother_id = parent_id.into(),
        }
    }

    pub fn clear_slot(&mut self, side: ParentSide) {
        self.set_slot(side, "");
    }

    pub fn is_empty(&self) -> bool {
        self.father().is_none() && self.mother().is_none()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Union of partner relationships visible to the layout: explicit partner
/// records, `partnerOf` back-references, and couples inferred from a shared
/// child. First occurrence wins on duplicates, so explicit records keep
/// their status and consanguinity flags.
pub fn partner_pairs(
    members: &[Individual],
    pedigree: &BTreeMap<String, PedigreeNode>,
    explicit: &[PartnerEdge],
) -> Vec<PartnerEdge> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut pairs: Vec<PartnerEdge> = Vec::new();
    let mut push = |edge: PartnerEdge, pairs: &mut Vec<PartnerEdge>| {
        if edge.a == edge.b || edge.a.trim().is_empty() || edge.b.trim().is_empty() {
            return;
        }
        if seen.insert((edge.a.clone(), edge.b.clone())) {
            pairs.push(edge);
        }
    };

    for edge in explicit {
        let mut canonical = PartnerEdge::new(edge.a.clone(), edge.b.clone());
        canonical.status = edge.status;
        canonical.consanguineous = edge.consanguineous;
        push(canonical, &mut pairs);
    }
    for member in members {
        if let Some(partner) = member.partner_of.as_deref()
            && !partner.trim().is_empty()
        {
            push(PartnerEdge::new(member.id.clone(), partner), &mut pairs);
        }
    }
    for node in pedigree.values() {
        if let (Some(father), Some(mother)) = (node.father(), node.mother()) {
            push(PartnerEdge::new(father, mother), &mut pairs);
        }
    }
    pairs
}
