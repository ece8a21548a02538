#![forbid(unsafe_code)]

//! Heuristic parent guessing for rosters that come with no pedigree at all.
//! Scores every same-family candidate for "is this the mother / the father"
//! from age plausibility, role labels, and initials. Pure scoring over an
//! explicit `today`, so tests pin the clock.

use regex::Regex;
use std::sync::OnceLock;
use time::{Date, OffsetDateTime};

use crate::member::{Individual, Sex};
use crate::relation::ParentSide;

const MOTHER_ROLE_HINTS: &[&str] = &["madre", "mamá", "mama", "mother", "mom"];
const FATHER_ROLE_HINTS: &[&str] = &["padre", "papá", "papa", "father", "dad"];

/// Beyond this many years of age gap a candidate stops being a plausible
/// parent, no matter how much older they are.
const PLAUSIBLE_GAP_MAX: i32 = 60;

static MOTHER_INITIALS: OnceLock<Option<Regex>> = OnceLock::new();
static FATHER_INITIALS: OnceLock<Option<Regex>> = OnceLock::new();

fn initials_pattern(side: ParentSide) -> Option<&'static Regex> {
    let (slot, pattern) = match side {
        ParentSide::Mother => (&MOTHER_INITIALS, r"(?i)^ma"),
        ParentSide::Father => (&FATHER_INITIALS, r"(?i)^pa"),
    };
    slot.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn role_hints(side: ParentSide) -> &'static [&'static str] {
    match side {
        ParentSide::Mother => MOTHER_ROLE_HINTS,
        ParentSide::Father => FATHER_ROLE_HINTS,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParentCandidates {
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Scores one candidate for one parent slot. Zero means "not a plausible
/// parent"; callers only accept strictly positive scores.
pub fn score_parent_candidate(
    candidate: &Individual,
    side: ParentSide,
    proband: &Individual,
    today: Date,
) -> i32 {
    let mut score = 0;
    let candidate_age = candidate.age_on(today);
    let proband_age = proband.age_on(today);

    // Plausibly older, with missing data counting in favor, not against.
    match (candidate_age, proband_age) {
        (Some(c), Some(p)) => {
            let gap = c - p;
            if gap > 0 && gap <= PLAUSIBLE_GAP_MAX {
                score += 2;
            }
            if (16..=50).contains(&gap) {
                score += 2;
            } else if (12..=60).contains(&gap) {
                score += 1;
            }
        }
        _ => score += 2,
    }

    if let Some(role) = candidate.role_label.as_deref() {
        let role = role.trim().to_lowercase();
        if role_hints(side).contains(&role.as_str()) {
            score += 3;
        }
    }

    if let (Some(pattern), Some(initials)) = (initials_pattern(side), candidate.initials.as_deref())
        && pattern.is_match(initials.trim())
    {
        score += 2;
    }

    score
}

/// Picks the best-scoring female as mother and the best-scoring male as
/// father, independently. Ties keep the first-seen candidate; slots with no
/// positive-scoring candidate stay empty.
pub fn pick_parent_candidates(
    proband: &Individual,
    pool: &[Individual],
    today: Date,
) -> ParentCandidates {
    let mut best_mother: Option<(i32, &Individual)> = None;
    let mut best_father: Option<(i32, &Individual)> = None;

    for candidate in pool {
        if candidate.id == proband.id {
            continue;
        }
        let (side, best) = match candidate.sex {
            Sex::Female => (ParentSide::Mother, &mut best_mother),
            Sex::Male => (ParentSide::Father, &mut best_father),
            Sex::Unknown => continue,
        };
        let score = score_parent_candidate(candidate, side, proband, today);
        if score > 0 && best.map_or(true, |(top, _)| score > top) {
            *best = Some((score, candidate));
        }
    }

    ParentCandidates {
        father_id: best_father.map(|(_, c)| c.id.clone()),
        mother_id: best_mother.map(|(_, c)| c.id.clone()),
    }
}
