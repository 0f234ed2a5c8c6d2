use rtp_core::command::params::{DEFAULT_SHAPE, apply_shape_overrides, merge_attributes};
use rtp_core::selection::shape::CircleShape;
use rtp_core::selection::{NAME_ATTR, VERSION_ATTR};
use rtp_core::{AttrValue, CommandArgs, Region, SelectionApi, Shape, ShapeFactory, ShapeRegistry};
use uuid::Uuid;

/// Square with a small default radius.
struct SmallSquare;

impl ShapeFactory for SmallSquare {
    fn name(&self) -> &'static str {
        "SMALLSQUARE"
    }

    fn create(&self) -> Shape {
        Shape::new(self.name(), 3)
            .with("radius", 10i64)
            .with("weight", 1.0f64)
            .with("expand", false)
            .with("mode", "NEAREST")
    }
}

fn registry() -> ShapeRegistry {
    let mut registry = ShapeRegistry::with_default_shapes();
    registry.register(Box::new(SmallSquare));
    registry
}

fn spawn_region() -> Region {
    Region::new("spawn", "world", CircleShape.create().with("radius", 50i64))
}

fn overrides(raw: &[&str]) -> Region {
    let selection = SelectionApi::new();
    let args = CommandArgs::parse(raw);
    apply_shape_overrides(&selection, &registry(), &spawn_region(), &args, Uuid::new_v4()).unwrap()
}

#[test]
fn test_original_radius_carries_over() {
    let region = overrides(&["shape:smallsquare"]);

    assert_eq!(region.shape().name(), "SMALLSQUARE");
    assert_eq!(region.shape().get("radius"), Some(&AttrValue::Integer(50)));
}

#[test]
fn test_explicit_override_wins() {
    let region = overrides(&["shape:smallsquare", "radius:77"]);
    assert_eq!(region.shape().get("radius"), Some(&AttrValue::Integer(77)));
}

#[test]
fn test_override_key_ignores_case() {
    let region = overrides(&["shape:smallsquare", "RADIUS:64"]);
    assert_eq!(region.shape().get("radius"), Some(&AttrValue::Integer(64)));
}

#[test]
fn test_override_value_types() {
    let region = overrides(&[
        "shape:smallsquare",
        "weight:2.5",
        "expand:TRUE",
        "mode:farthest",
    ]);
    let shape = region.shape();

    assert_eq!(shape.get("weight"), Some(&AttrValue::Float(2.5)));
    assert_eq!(shape.get("expand"), Some(&AttrValue::Boolean(true)));
    assert_eq!(shape.get("mode"), Some(&AttrValue::Text("farthest".to_string())));
}

#[test]
fn test_name_and_version_are_fixed() {
    let region = overrides(&["shape:smallsquare", "name:circle", "version:9"]);

    assert_eq!(region.shape().get(NAME_ATTR), Some(&AttrValue::Text("SMALLSQUARE".into())));
    assert_eq!(region.shape().get(VERSION_ATTR), Some(&AttrValue::Integer(3)));
}

#[test]
fn test_empty_shape_defaults_to_circle() {
    let region = overrides(&["shape:", "radius:12"]);

    assert_eq!(region.shape().name(), DEFAULT_SHAPE);
    assert_eq!(region.shape().get("radius"), Some(&AttrValue::Integer(12)));
}

#[test]
fn test_unknown_shape_keeps_region() {
    let selection = SelectionApi::new();
    let invoker = Uuid::new_v4();
    let args = CommandArgs::parse(&["shape:hexagon", "radius:5"]);

    let region = apply_shape_overrides(&selection, &registry(), &spawn_region(), &args, invoker).unwrap();

    assert_eq!(region, spawn_region());
    assert_eq!(selection.temp_region(invoker).unwrap(), Some(spawn_region()));
}

#[test]
fn test_shared_region_is_untouched() {
    let selection = SelectionApi::new();
    selection.add_region(spawn_region()).unwrap();
    let shared = selection.region("spawn").unwrap().unwrap();
    let invoker = Uuid::new_v4();
    let args = CommandArgs::parse(&["shape:smallsquare", "radius:77"]);

    let modified = apply_shape_overrides(&selection, &registry(), &shared, &args, invoker).unwrap();

    assert_eq!(selection.region("spawn").unwrap().unwrap(), spawn_region());
    assert_eq!(selection.temp_region(invoker).unwrap(), Some(modified));
}

#[test]
fn test_merge_only_touches_fresh_attributes() {
    let fresh = SmallSquare.create();
    let original = CircleShape.create().with("radius", 50i64);

    let merged = merge_attributes(&fresh, &original, &CommandArgs::parse(&["centerX:400"]));

    // centerX is not part of the fresh shape
    assert!(!merged.contains_key("centerX"));
    assert_eq!(merged.len(), fresh.attributes().len());
    assert_eq!(merged["weight"], AttrValue::Float(1.0));
}
