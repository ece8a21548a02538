#![forbid(unsafe_code)]

//! Parent-to-child connector routing. Consumes the same position map the
//! node placement produced, so connectors and nodes can never disagree.
//! Children or parents without a position are skipped silently; a dangling
//! reference degrades to a missing line, never a panic.

use std::collections::BTreeMap;

use crate::layout::{ChildLine, LayoutConfig, Segment};
use crate::relation::{LinkNature, PedigreeNode};

/// Routes one orthogonal connector per pedigree node: drop from the couple
/// midpoint (or the single recorded parent) to a horizontal bus sitting
/// `bus_gap` above the child, then a stub down into the child.
pub fn build_child_lines(
    pedigree: &BTreeMap<String, PedigreeNode>,
    pos: &BTreeMap<String, (f64, f64)>,
    natures: &BTreeMap<String, LinkNature>,
    config: &LayoutConfig,
) -> Vec<ChildLine> {
    let mut lines = Vec::new();
    for (child_id, node) in pedigree {
        let Some(&(cx, cy)) = pos.get(child_id) else {
            continue;
        };
        let father = node.father().and_then(|id| pos.get(id)).copied();
        let mother = node.mother().and_then(|id| pos.get(id)).copied();
        let (sx, sy) = match (father, mother) {
            // Same midpoint formula as the couple line, so the drop starts
            // exactly on the partner bar.
            (Some((fx, fy)), Some((mx, my))) => ((fx + mx) / 2.0, (fy + my) / 2.0),
            (Some(point), None) | (None, Some(point)) => point,
            (None, None) => continue,
        };
        let bus_y = cy - config.bus_gap;
        let dashed = natures
            .get(child_id)
            .map(|nature| nature.dashed())
            .unwrap_or(false);
        lines.push(ChildLine {
            child_id: child_id.clone(),
            segments: vec![
                Segment {
                    x1: sx,
                    y1: sy,
                    x2: sx,
                    y2: bus_y,
                },
                Segment {
                    x1: sx,
                    y1: bus_y,
                    x2: cx,
                    y2: bus_y,
                },
                Segment {
                    x1: cx,
                    y1: bus_y,
                    x2: cx,
                    y2: cy,
                },
            ],
            dashed,
        });
    }
    lines
}
