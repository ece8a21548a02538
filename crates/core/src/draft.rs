#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::member::{Individual, Sex, VitalStatus};
use crate::merge::{BaseView, merge_members, merge_pedigree};
use crate::relation::{ParentSide, PedigreeNode};

/// Current on-disk shape of the persisted draft blob.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Distinguishes "field absent" (keep the base value) from "field null"
/// (clear the base value) in patch entries.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// One entry in the draft overlay: a patch over a base individual, a fully
/// draft-originated individual, or a tombstone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMember {
    pub id: String,
    #[serde(rename = "_deleted", default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_status: Option<VitalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_override: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub partner_of: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl DraftMember {
    pub fn tombstone(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
            ..Self::default()
        }
    }

    /// Builds a standalone individual from a draft-only entry. Absent fields
    /// fall back to blanks, never to another individual's data.
    pub fn materialize(&self) -> Individual {
        Individual {
            id: self.id.clone(),
            display_name: self.display_name.clone().unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            birth_date: self.birth_date.clone(),
            role_label: self.role_label.clone(),
            vital_status: self.vital_status,
            symbol_override: self.symbol_override.clone(),
            partner_of: self.partner_of.clone().flatten(),
            initials: self.initials.clone(),
            family_id: self.family_id.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Shallow patch onto a base individual. `partnerOf` is tri-state:
    /// absent keeps, null clears, a value replaces.
    pub fn apply_to(&self, target: &mut Individual) {
        if let Some(value) = &self.display_name {
            target.display_name = value.clone();
        }
        if let Some(value) = self.sex {
            target.sex = value;
        }
        if let Some(value) = &self.birth_date {
            target.birth_date = Some(value.clone());
        }
        if let Some(value) = &self.role_label {
            target.role_label = Some(value.clone());
        }
        if let Some(value) = self.vital_status {
            target.vital_status = Some(value);
        }
        if let Some(value) = &self.symbol_override {
            target.symbol_override = Some(value.clone());
        }
        if let Some(value) = &self.partner_of {
            target.partner_of = value.clone();
        }
        if let Some(value) = &self.initials {
            target.initials = Some(value.clone());
        }
        if let Some(value) = &self.family_id {
            target.family_id = Some(value.clone());
        }
        if let Some(value) = &self.metadata {
            target.metadata = Some(value.clone());
        }
    }

    fn merge_from(&mut self, incoming: DraftMember) {
        if incoming.deleted {
            self.deleted = true;
        }
        if incoming.display_name.is_some() {
            self.display_name = incoming.display_name;
        }
        if incoming.sex.is_some() {
            self.sex = incoming.sex;
        }
        if incoming.birth_date.is_some() {
            self.birth_date = incoming.birth_date;
        }
        if incoming.role_label.is_some() {
            self.role_label = incoming.role_label;
        }
        if incoming.vital_status.is_some() {
            self.vital_status = incoming.vital_status;
        }
        if incoming.symbol_override.is_some() {
            self.symbol_override = incoming.symbol_override;
        }
        if incoming.partner_of.is_some() {
            self.partner_of = incoming.partner_of;
        }
        if incoming.initials.is_some() {
            self.initials = incoming.initials;
        }
        if incoming.family_id.is_some() {
            self.family_id = incoming.family_id;
        }
        if incoming.metadata.is_some() {
            self.metadata = incoming.metadata;
        }
    }
}

/// Parent ids resolved for a target, synthesizing placeholders as needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedParents {
    pub father_id: String,
    pub mother_id: String,
}

/// The persisted draft overlay for one family. All mutations are reducers on
/// this value; unknown or blank target ids degrade to no-ops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftState {
    #[serde(default)]
    pub version: u32,
    #[serde(rename = "draftMembers", default)]
    pub members: Vec<DraftMember>,
    #[serde(rename = "draftPedigree", default)]
    pub pedigree: BTreeMap<String, PedigreeNode>,
    #[serde(default)]
    pub bootstrapped: bool,
    #[serde(rename = "draftSeq", default)]
    pub draft_seq: u64,
}

impl Default for DraftState {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftState {
    pub fn new() -> Self {
        Self {
            version: DRAFT_SCHEMA_VERSION,
            members: Vec::new(),
            pedigree: BTreeMap::new(),
            bootstrapped: false,
            draft_seq: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.pedigree.is_empty()
    }

    pub fn merged_members(&self, base: BaseView<'_>) -> Vec<Individual> {
        merge_members(base.members, &self.members)
    }

    pub fn merged_pedigree(&self, base: BaseView<'_>) -> BTreeMap<String, PedigreeNode> {
        merge_pedigree(base.pedigree, &self.pedigree)
    }

    /// Resolves both parent slots for `target_id`, synthesizing placeholder
    /// individuals for the missing ones. Idempotent once both slots are
    /// populated.
    pub fn ensure_parents_for(
        &mut self,
        base: BaseView<'_>,
        target_id: &str,
    ) -> Option<ResolvedParents> {
        let target_id = target_id.trim();
        if target_id.is_empty() || self.merged_member(base, target_id).is_none() {
            return None;
        }
        let node = self.merged_node(base, target_id);
        let (father_id, father_new) = match node.father() {
            Some(id) => (id.to_string(), false),
            None => (self.push_placeholder(base, "Padre", Some(Sex::Male)), true),
        };
        let (mother_id, mother_new) = match node.mother() {
            Some(id) => (id.to_string(), false),
            None => (self.push_placeholder(base, "Madre", Some(Sex::Female)), true),
        };
        if father_new || mother_new {
            self.pedigree.insert(
                target_id.to_string(),
                PedigreeNode::new(father_id.clone(), mother_id.clone()),
            );
        }
        Some(ResolvedParents {
            father_id,
            mother_id,
        })
    }

    /// Adds a sibling sharing the target's (possibly synthesized) parents.
    pub fn add_sibling(&mut self, base: BaseView<'_>, target_id: &str) -> Option<String> {
        let parents = self.ensure_parents_for(base, target_id)?;
        let sibling_id = self.push_placeholder(base, "Hermano/a", None);
        self.pedigree.insert(
            sibling_id.clone(),
            PedigreeNode::new(parents.father_id, parents.mother_id),
        );
        Some(sibling_id)
    }

    /// Adds a child under the target, inferring which parent slot the target
    /// fills from its sex (unknown defaults to the mother slot) unless a side
    /// is forced. The other slot is filled by the target's current partner,
    /// when one can be found.
    pub fn add_child(
        &mut self,
        base: BaseView<'_>,
        target_id: &str,
        forced_side: Option<ParentSide>,
    ) -> Option<String> {
        let target = self.merged_member(base, target_id.trim())?;
        let side = forced_side.unwrap_or(match target.sex {
            Sex::Male => ParentSide::Father,
            Sex::Female | Sex::Unknown => ParentSide::Mother,
        });
        let partner = self.current_partner(base, &target).unwrap_or_default();
        let child_id = self.push_placeholder(base, "Hijo/a", None);
        let node = match side {
            ParentSide::Father => PedigreeNode::new(target.id, partner),
            ParentSide::Mother => PedigreeNode::new(partner, target.id),
        };
        self.pedigree.insert(child_id.clone(), node);
        Some(child_id)
    }

    /// Adds an opposite-sex partner placeholder and links both directions
    /// via `partnerOf`.
    pub fn add_partner(&mut self, base: BaseView<'_>, target_id: &str) -> Option<String> {
        let target = self.merged_member(base, target_id.trim())?;
        let partner_id = self.alloc_id(base);
        self.members.push(DraftMember {
            id: partner_id.clone(),
            display_name: Some("Pareja".to_string()),
            sex: Some(target.sex.opposite()),
            role_label: Some("Pareja".to_string()),
            partner_of: Some(Some(target.id.clone())),
            ..DraftMember::default()
        });
        self.upsert(DraftMember {
            id: target.id,
            partner_of: Some(Some(partner_id.clone())),
            ..DraftMember::default()
        });
        Some(partner_id)
    }

    /// Upserts a patch entry, creating it if absent. Patches against ids the
    /// base does not know simply become draft-only members.
    pub fn update_member(&mut self, patch: DraftMember) -> bool {
        if patch.id.trim().is_empty() {
            return false;
        }
        self.upsert(patch);
        true
    }

    /// Removes an individual from the merged view: draft entries are dropped,
    /// base-originated ids get a tombstone, partner back-references pointing
    /// at the removed id are cleared, and overlay parent slots naming it are
    /// swept (nodes left with both slots empty are deleted outright).
    pub fn remove_member(&mut self, base: BaseView<'_>, member_id: &str) -> bool {
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return false;
        }
        let merged_before = self.merged_members(base);
        if !merged_before.iter().any(|m| m.id == member_id) {
            return false;
        }
        let in_base = base.members.iter().any(|m| m.id == member_id);

        self.members.retain(|entry| entry.id != member_id);
        if in_base {
            self.members.push(DraftMember::tombstone(member_id));
        }
        for other in &merged_before {
            if other.id != member_id && other.partner_of.as_deref() == Some(member_id) {
                self.upsert(DraftMember {
                    id: other.id.clone(),
                    partner_of: Some(None),
                    ..DraftMember::default()
                });
            }
        }

        let mut emptied: Vec<String> = Vec::new();
        for (child_id, node) in self.pedigree.iter_mut() {
            let mut touched = false;
            if node.father() == Some(member_id) {
                node.clear_slot(ParentSide::Father);
                touched = true;
            }
            if node.mother() == Some(member_id) {
                node.clear_slot(ParentSide::Mother);
                touched = true;
            }
            if touched && node.is_empty() {
                emptied.push(child_id.clone());
            }
        }
        for child_id in emptied {
            self.pedigree.remove(&child_id);
        }
        self.pedigree.remove(member_id);
        true
    }

    /// Writes a full pedigree node for the child with one slot replaced,
    /// preserving the other slot from the merged view.
    pub fn set_parent(
        &mut self,
        base: BaseView<'_>,
        child_id: &str,
        side: ParentSide,
        parent_id: &str,
    ) -> bool {
        let child_id = child_id.trim();
        if child_id.is_empty() {
            return false;
        }
        let mut node = self.merged_node(base, child_id);
        node.set_slot(side, parent_id.trim());
        self.pedigree.insert(child_id.to_string(), node);
        true
    }

    /// Copies every base pedigree node into the overlay verbatim. Used to
    /// materialize a read-only ancestry so later edits stay in the draft.
    pub fn clone_from_base(&mut self, base: BaseView<'_>) -> usize {
        for (child_id, node) in base.pedigree {
            self.pedigree.insert(child_id.clone(), node.clone());
        }
        base.pedigree.len()
    }

    /// Discards all draft edits. The bootstrapped marker survives so the
    /// parent-guess flow does not re-run against an explicitly cleared draft.
    pub fn reset(&mut self) {
        self.members.clear();
        self.pedigree.clear();
        self.draft_seq = 0;
    }

    fn merged_member(&self, base: BaseView<'_>, member_id: &str) -> Option<Individual> {
        if member_id.is_empty() {
            return None;
        }
        self.merged_members(base)
            .into_iter()
            .find(|m| m.id == member_id)
    }

    fn merged_node(&self, base: BaseView<'_>, child_id: &str) -> PedigreeNode {
        self.pedigree
            .get(child_id)
            .or_else(|| base.pedigree.get(child_id))
            .cloned()
            .unwrap_or_default()
    }

    fn current_partner(&self, base: BaseView<'_>, target: &Individual) -> Option<String> {
        if let Some(partner) = target.partner_of.as_deref() {
            let partner = partner.trim();
            if !partner.is_empty() && partner != target.id {
                return Some(partner.to_string());
            }
        }
        for node in self.merged_pedigree(base).values() {
            if node.father() == Some(target.id.as_str())
                && let Some(mother) = node.mother()
            {
                return Some(mother.to_string());
            }
            if node.mother() == Some(target.id.as_str())
                && let Some(father) = node.father()
            {
                return Some(father.to_string());
            }
        }
        None
    }

    fn upsert(&mut self, patch: DraftMember) {
        match self.members.iter_mut().find(|m| m.id == patch.id) {
            Some(existing) => existing.merge_from(patch),
            None => self.members.push(patch),
        }
    }

    fn push_placeholder(&mut self, base: BaseView<'_>, label: &str, sex: Option<Sex>) -> String {
        let id = self.alloc_id(base);
        self.members.push(DraftMember {
            id: id.clone(),
            display_name: Some(label.to_string()),
            sex,
            role_label: Some(label.to_string()),
            ..DraftMember::default()
        });
        id
    }

    fn alloc_id(&mut self, base: BaseView<'_>) -> String {
        loop {
            self.draft_seq += 1;
            let id = format!("draft-{:04}", self.draft_seq);
            let taken = self.members.iter().any(|m| m.id == id)
                || base.members.iter().any(|m| m.id == id);
            if !taken {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_pedigree() -> BTreeMap<String, PedigreeNode> {
        BTreeMap::new()
    }

    fn base_view<'a>(
        members: &'a [Individual],
        pedigree: &'a BTreeMap<String, PedigreeNode>,
    ) -> BaseView<'a> {
        BaseView { members, pedigree }
    }

    #[test]
    fn ensure_parents_synthesizes_father_then_mother() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();

        let parents = draft
            .ensure_parents_for(base_view(&members, &pedigree), "p1")
            .expect("target exists");
        assert_eq!(parents.father_id, "draft-0001");
        assert_eq!(parents.mother_id, "draft-0002");

        let node = &draft.pedigree["p1"];
        assert_eq!(node.father(), Some("draft-0001"));
        assert_eq!(node.mother(), Some("draft-0002"));

        let father = draft.members.iter().find(|m| m.id == "draft-0001").unwrap();
        assert_eq!(father.display_name.as_deref(), Some("Padre"));
        assert_eq!(father.sex, Some(Sex::Male));
        let mother = draft.members.iter().find(|m| m.id == "draft-0002").unwrap();
        assert_eq!(mother.sex, Some(Sex::Female));
    }

    #[test]
    fn ensure_parents_is_idempotent() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        let first = draft.ensure_parents_for(base, "p1").expect("first call");
        let members_after_first = draft.members.len();
        let second = draft.ensure_parents_for(base, "p1").expect("second call");
        assert_eq!(first, second, "resolved ids must be stable");
        assert_eq!(
            draft.members.len(),
            members_after_first,
            "no new members on the second call"
        );
    }

    #[test]
    fn ensure_parents_keeps_an_existing_slot() {
        let members = vec![
            Individual::new("p1", "Paciente", Sex::Female),
            Individual::new("mom", "Madre Real", Sex::Female),
        ];
        let mut pedigree = empty_pedigree();
        pedigree.insert("p1".to_string(), PedigreeNode::new("", "mom"));
        let mut draft = DraftState::new();

        let parents = draft
            .ensure_parents_for(base_view(&members, &pedigree), "p1")
            .expect("target exists");
        assert_eq!(parents.mother_id, "mom", "existing slot untouched");
        assert_eq!(parents.father_id, "draft-0001");
    }

    #[test]
    fn ensure_parents_for_unknown_or_blank_target_is_a_no_op() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        assert_eq!(draft.ensure_parents_for(base, "ghost"), None);
        assert_eq!(draft.ensure_parents_for(base, "  "), None);
        assert!(draft.is_empty(), "no-op must not dirty the draft");
    }

    #[test]
    fn add_sibling_shares_the_synthesized_parents() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Male)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();

        let sibling_id = draft
            .add_sibling(base_view(&members, &pedigree), "p1")
            .expect("sibling created");
        assert_eq!(sibling_id, "draft-0003");
        assert_eq!(draft.pedigree["p1"], draft.pedigree[&sibling_id]);
    }

    #[test]
    fn add_child_places_target_by_sex_and_finds_partner_via_shared_child() {
        let members = vec![
            Individual::new("dad", "D", Sex::Male),
            Individual::new("mom", "M", Sex::Female),
        ];
        let mut pedigree = empty_pedigree();
        pedigree.insert("existing".to_string(), PedigreeNode::new("dad", "mom"));
        let mut draft = DraftState::new();

        let child_id = draft
            .add_child(base_view(&members, &pedigree), "dad", None)
            .expect("child created");
        let node = &draft.pedigree[&child_id];
        assert_eq!(node.father(), Some("dad"));
        assert_eq!(node.mother(), Some("mom"), "partner inferred from shared child");
    }

    #[test]
    fn add_child_prefers_the_explicit_partner_link() {
        let mut mom = Individual::new("mom", "M", Sex::Female);
        mom.partner_of = Some("dad2".to_string());
        let members = vec![mom, Individual::new("dad2", "D2", Sex::Male)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();

        let child_id = draft
            .add_child(base_view(&members, &pedigree), "mom", None)
            .expect("child created");
        let node = &draft.pedigree[&child_id];
        assert_eq!(node.mother(), Some("mom"));
        assert_eq!(node.father(), Some("dad2"));
    }

    #[test]
    fn add_child_with_unknown_sex_defaults_to_the_mother_slot() {
        let members = vec![Individual::new("x", "X", Sex::Unknown)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();

        let child_id = draft
            .add_child(base_view(&members, &pedigree), "x", None)
            .expect("child created");
        let node = &draft.pedigree[&child_id];
        assert_eq!(node.mother(), Some("x"));
        assert_eq!(node.father(), None);

        let forced = draft
            .add_child(base_view(&members, &pedigree), "x", Some(ParentSide::Father))
            .expect("forced child");
        assert_eq!(draft.pedigree[&forced].father(), Some("x"));
    }

    #[test]
    fn add_partner_links_both_directions_with_opposite_sex() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        let partner_id = draft.add_partner(base, "p1").expect("partner created");
        let partner = draft.members.iter().find(|m| m.id == partner_id).unwrap();
        assert_eq!(partner.sex, Some(Sex::Male));
        assert_eq!(partner.partner_of, Some(Some("p1".to_string())));

        let merged = draft.merged_members(base);
        let target = merged.iter().find(|m| m.id == "p1").unwrap();
        assert_eq!(target.partner_of.as_deref(), Some(partner_id.as_str()));
    }

    #[test]
    fn update_member_upserts_and_merges_patches() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        assert!(draft.update_member(DraftMember {
            id: "p1".to_string(),
            display_name: Some("Nueva".to_string()),
            ..DraftMember::default()
        }));
        assert!(draft.update_member(DraftMember {
            id: "p1".to_string(),
            initials: Some("NP".to_string()),
            ..DraftMember::default()
        }));
        assert_eq!(draft.members.len(), 1, "patches merge into one entry");

        let merged = draft.merged_members(base);
        assert_eq!(merged[0].display_name, "Nueva");
        assert_eq!(merged[0].initials.as_deref(), Some("NP"));

        assert!(!draft.update_member(DraftMember::default()), "blank id is a no-op");
    }

    #[test]
    fn remove_member_tombstones_base_and_clears_partner_back_references() {
        let mut ana = Individual::new("ana", "Ana", Sex::Female);
        ana.partner_of = Some("beto".to_string());
        let members = vec![ana, Individual::new("beto", "Beto", Sex::Male)];
        let mut pedigree = empty_pedigree();
        pedigree.insert("kid".to_string(), PedigreeNode::new("beto", "ana"));
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        assert!(draft.remove_member(base, "beto"));
        let merged = draft.merged_members(base);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "ana");
        assert_eq!(merged[0].partner_of, None, "back-reference cleared");
        assert!(
            draft.members.iter().any(|m| m.id == "beto" && m.deleted),
            "base-originated id gets a tombstone"
        );
    }

    #[test]
    fn remove_member_sweeps_overlay_nodes_and_deletes_emptied_ones() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Male)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        let sibling_id = draft.add_sibling(base, "p1").expect("sibling");
        let father_id = draft.pedigree["p1"].father().unwrap().to_string();
        let mother_id = draft.pedigree["p1"].mother().unwrap().to_string();

        assert!(draft.remove_member(base, &father_id));
        assert_eq!(draft.pedigree["p1"].father(), None);
        assert_eq!(draft.pedigree["p1"].mother(), Some(mother_id.as_str()));
        assert_eq!(draft.pedigree[&sibling_id].father(), None);
        assert!(
            !draft.members.iter().any(|m| m.id == father_id),
            "draft-originated member is dropped outright, no tombstone"
        );

        assert!(draft.remove_member(base, &mother_id));
        assert!(
            !draft.pedigree.contains_key("p1"),
            "node with both slots empty is deleted"
        );
        assert!(!draft.pedigree.contains_key(&sibling_id));
    }

    #[test]
    fn remove_member_with_unknown_id_is_a_no_op() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Male)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();

        assert!(!draft.remove_member(base_view(&members, &pedigree), "ghost"));
        assert!(draft.is_empty());
    }

    #[test]
    fn set_parent_preserves_the_other_slot_from_the_merged_view() {
        let members = vec![
            Individual::new("p1", "Paciente", Sex::Female),
            Individual::new("mom", "Madre", Sex::Female),
            Individual::new("dad", "Padre", Sex::Male),
        ];
        let mut pedigree = empty_pedigree();
        pedigree.insert("p1".to_string(), PedigreeNode::new("", "mom"));
        let mut draft = DraftState::new();
        let base = base_view(&members, &pedigree);

        assert!(draft.set_parent(base, "p1", ParentSide::Father, "dad"));
        let node = &draft.pedigree["p1"];
        assert_eq!(node.father(), Some("dad"));
        assert_eq!(node.mother(), Some("mom"), "base slot carried into the override");

        assert!(!draft.set_parent(base, "", ParentSide::Father, "dad"));
    }

    #[test]
    fn clone_from_base_copies_nodes_verbatim() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let mut pedigree = empty_pedigree();
        pedigree.insert("p1".to_string(), PedigreeNode::new("f", "m"));
        let mut draft = DraftState::new();

        let copied = draft.clone_from_base(base_view(&members, &pedigree));
        assert_eq!(copied, 1);
        assert_eq!(draft.pedigree["p1"], PedigreeNode::new("f", "m"));
    }

    #[test]
    fn reset_clears_edits_but_keeps_the_bootstrapped_marker() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        draft.bootstrapped = true;
        draft.add_sibling(base_view(&members, &pedigree), "p1");

        draft.reset();
        assert!(draft.is_empty());
        assert_eq!(draft.draft_seq, 0);
        assert!(draft.bootstrapped, "reset must not re-arm the bootstrap");
    }

    #[test]
    fn draft_state_round_trips_through_the_wire_shape() {
        let members = vec![Individual::new("p1", "Paciente", Sex::Female)];
        let pedigree = empty_pedigree();
        let mut draft = DraftState::new();
        draft.add_sibling(base_view(&members, &pedigree), "p1");
        draft.bootstrapped = true;

        let raw = serde_json::to_string(&draft).expect("serialize draft");
        assert!(raw.contains("\"draftMembers\""), "raw: {raw}");
        assert!(raw.contains("\"draftPedigree\""), "raw: {raw}");
        assert!(raw.contains("\"padreId\""), "raw: {raw}");
        assert!(raw.contains("\"draftSeq\""), "raw: {raw}");

        let back: DraftState = serde_json::from_str(&raw).expect("deserialize draft");
        assert_eq!(back, draft);
    }

    #[test]
    fn tombstone_serializes_with_the_underscore_marker() {
        let raw = serde_json::to_string(&DraftMember::tombstone("x")).expect("serialize");
        assert!(raw.contains("\"_deleted\":true"), "raw: {raw}");

        let back: DraftMember = serde_json::from_str(&raw).expect("deserialize");
        assert!(back.deleted);
    }

    #[test]
    fn partner_of_distinguishes_absent_null_and_value() {
        let absent: DraftMember = serde_json::from_str(r#"{"id":"x"}"#).expect("absent");
        assert_eq!(absent.partner_of, None);

        let null: DraftMember =
            serde_json::from_str(r#"{"id":"x","partnerOf":null}"#).expect("null");
        assert_eq!(null.partner_of, Some(None));

        let value: DraftMember =
            serde_json::from_str(r#"{"id":"x","partnerOf":"y"}"#).expect("value");
        assert_eq!(value.partner_of, Some(Some("y".to_string())));
    }
}
