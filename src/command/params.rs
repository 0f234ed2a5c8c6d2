use super::keys;
use crate::core::{AttrValue, CommandArgs, EntityId, Result, RtpError, pick_one};
use crate::selection::{NAME_ATTR, Region, SelectionApi, Shape, ShapeRegistry, VERSION_ATTR};
use std::collections::BTreeMap;

/// Shape used when `shape` is given without a value.
pub const DEFAULT_SHAPE: &str = "CIRCLE";

/// Merges overrides into a fresh shape's attribute set.
///
/// For every attribute of `fresh` except `name` and `version`:
/// - a matching argument wins, coerced through [`AttrValue::parse_override`];
/// - otherwise the same-named attribute of `original` is carried over when it
///   is numeric or of the same kind as the fresh default;
/// - otherwise the fresh default stays.
pub fn merge_attributes(
    fresh: &Shape,
    original: &Shape,
    args: &CommandArgs,
) -> BTreeMap<String, AttrValue> {
    let mut merged = fresh.attributes().clone();

    for (attribute, value) in merged.iter_mut() {
        if attribute.eq_ignore_ascii_case(NAME_ATTR) || attribute.eq_ignore_ascii_case(VERSION_ATTR) {
            continue;
        }

        if let Some(raw) = args.get_ignore_case(attribute) {
            *value = AttrValue::parse_override(&pick_one(Some(raw), ""));
            continue;
        }

        if let Some(previous) = original.find(attribute) {
            if previous.is_numeric() || previous.same_kind(value) {
                *value = previous.clone();
            }
        }
    }

    merged
}

/// Builds a per-request region whose shape reflects the requested overrides.
///
/// The shared region is never modified. The result is also recorded in the
/// sender's temporary-region slot. When the requested shape is not
/// registered the unmodified region is returned.
pub fn apply_shape_overrides(
    selection: &SelectionApi,
    shapes: &ShapeRegistry,
    region: &Region,
    args: &CommandArgs,
    invoker: EntityId,
) -> Result<Region> {
    let shape_name = pick_one(args.get(keys::SHAPE), DEFAULT_SHAPE);

    let Some(mut shape) = shapes.instantiate(&shape_name) else {
        let err = RtpError::ShapeNotFound(shape_name);
        tracing::error!(region = region.name(), error = %err, "shape override skipped");
        selection.put_temp_region(invoker, region.clone())?;
        return Ok(region.clone());
    };

    let merged = merge_attributes(&shape, region.shape(), args);
    shape.set_attributes(merged);

    let modified = region.with_shape(shape);
    selection.put_temp_region(invoker, modified.clone())?;
    Ok(modified)
}
