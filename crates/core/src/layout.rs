#![forbid(unsafe_code)]

//! Deterministic 2-D placement for the merged pedigree. Rows follow
//! generation offsets, columns follow lineage sides: maternal lineage fans
//! out to the left of a center gutter, paternal to the right, everyone else
//! stays centered. Pure geometry; no randomness, no iteration over unordered
//! containers, so a fixed input graph always yields identical coordinates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ancestry::Side;
use crate::lines::build_child_lines;
use crate::member::Individual;
use crate::relation::{LinkNature, PartnerEdge, PedigreeNode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between sibling columns.
    pub cell_w: f64,
    /// Vertical distance between generation rows.
    pub row_h: f64,
    /// Node circle radius, echoed back to renderers.
    pub node_r: f64,
    /// Clearance kept around the outermost nodes.
    pub padding: f64,
    /// Gap between the innermost Left and Right columns.
    pub center_gutter: f64,
    /// Height of the sibling bus above a child's node center.
    pub bus_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_w: 120.0,
            row_h: 140.0,
            node_r: 30.0,
            padding: 48.0,
            center_gutter: 160.0,
            bus_gap: 26.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Horizontal connector between two partners, with the midpoint child lines
/// hang from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleLine {
    pub a: String,
    pub b: String,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub mid_x: f64,
    pub mid_y: f64,
}

/// Orthogonal parent-to-child connector: a drop from the couple midpoint (or
/// single parent) to a horizontal bus above the child, then a stub down into
/// the child node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLine {
    pub child_id: String,
    pub segments: Vec<Segment>,
    pub dashed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub couple_lines: Vec<CoupleLine>,
    pub child_lines: Vec<ChildLine>,
    /// Id to node-center map, shared with the line builders so every
    /// connector agrees with node placement pixel-for-pixel.
    #[serde(skip)]
    pub pos: BTreeMap<String, (f64, f64)>,
    pub width: f64,
    pub height: f64,
    pub node_r: f64,
}

pub fn compute_layout(
    members: &[Individual],
    generations: &BTreeMap<String, i32>,
    sides: &BTreeMap<String, Side>,
    pedigree: &BTreeMap<String, PedigreeNode>,
    partners: &[PartnerEdge],
    natures: &BTreeMap<String, LinkNature>,
    config: &LayoutConfig,
) -> PedigreeLayout {
    if members.is_empty() {
        return PedigreeLayout {
            nodes: Vec::new(),
            couple_lines: Vec::new(),
            child_lines: Vec::new(),
            pos: BTreeMap::new(),
            width: config.padding * 2.0,
            height: config.padding * 2.0,
            node_r: config.node_r,
        };
    }

    let level_of = |member: &Individual| generations.get(&member.id).copied().unwrap_or(0);
    let side_of = |member: &Individual| sides.get(&member.id).copied().unwrap_or(Side::Center);

    let min_level = members.iter().map(&level_of).min().unwrap_or(0);
    let max_level = members.iter().map(&level_of).max().unwrap_or(0);

    // Group into generation rows, preserving roster order within a row.
    let mut rows: BTreeMap<i32, Vec<&Individual>> = BTreeMap::new();
    for member in members {
        rows.entry(level_of(member)).or_default().push(member);
    }

    let mut pos: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for (&level, row) in &rows {
        let y = config.padding + (level - min_level) as f64 * config.row_h;
        let mut left: Vec<&Individual> = Vec::new();
        let mut center: Vec<&Individual> = Vec::new();
        let mut right: Vec<&Individual> = Vec::new();
        for member in row {
            match side_of(member) {
                Side::Left => left.push(member),
                Side::Center => center.push(member),
                Side::Right => right.push(member),
            }
        }
        for (i, member) in left.iter().enumerate() {
            let x = -(config.center_gutter / 2.0) - i as f64 * config.cell_w;
            pos.insert(member.id.clone(), (x, y));
        }
        let span = center.len() as f64 - 1.0;
        for (i, member) in center.iter().enumerate() {
            let x = (i as f64 - span / 2.0) * config.cell_w;
            pos.insert(member.id.clone(), (x, y));
        }
        for (i, member) in right.iter().enumerate() {
            let x = config.center_gutter / 2.0 + i as f64 * config.cell_w;
            pos.insert(member.id.clone(), (x, y));
        }
    }

    // Shift into canvas space: leftmost node center lands at `padding`.
    let min_x = pos.values().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = pos.values().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let shift = config.padding - min_x;
    for point in pos.values_mut() {
        point.0 += shift;
    }
    let width = (max_x - min_x) + config.padding * 2.0;
    let height = (max_level - min_level) as f64 * config.row_h + config.padding * 2.0;

    let nodes = members
        .iter()
        .filter_map(|member| {
            pos.get(&member.id).map(|&(x, y)| LayoutNode {
                id: member.id.clone(),
                x,
                y,
                r: config.node_r,
            })
        })
        .collect();

    let mut couple_lines = Vec::new();
    for edge in partners {
        let (Some(&(ax, ay)), Some(&(bx, by))) = (pos.get(&edge.a), pos.get(&edge.b)) else {
            continue;
        };
        let (x1, x2) = if ax <= bx { (ax, bx) } else { (bx, ax) };
        let mid_x = (ax + bx) / 2.0;
        let mid_y = (ay + by) / 2.0;
        couple_lines.push(CoupleLine {
            a: edge.a.clone(),
            b: edge.b.clone(),
            x1,
            x2,
            y: mid_y,
            mid_x,
            mid_y,
        });
    }

    let child_lines = build_child_lines(pedigree, &pos, natures, config);

    PedigreeLayout {
        nodes,
        couple_lines,
        child_lines,
        pos,
        width,
        height,
        node_r: config.node_r,
    }
}
