#![forbid(unsafe_code)]

use serde::Serialize;
use serde_json::{Value, json};

use pedigree_core::validate::validate;

use crate::EngineInner;

/// Shapes the full frontend payload. Everything a renderer needs to draw the
/// chart without touching the engine again: the family header, the merged
/// graph, the computed geometry, and the validation report.
pub(crate) fn render_json(inner: &EngineInner) -> Value {
    let members = inner.merged_members();
    let pedigree = inner.merged_pedigree();
    let layout = inner.layout_for(&members, &pedigree);
    let validation = validate(&members, &pedigree);
    json!({
        "family": to_value_or_null(&inner.family),
        "members": to_value_or_null(&members),
        "pedigree": to_value_or_null(&pedigree),
        "layout": to_value_or_null(&layout),
        "validation": to_value_or_null(&validation),
    })
}

fn to_value_or_null<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
