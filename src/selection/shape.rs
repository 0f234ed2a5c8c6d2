use crate::core::AttrValue;
use std::collections::{BTreeMap, HashMap};

/// Fixed attribute naming the shape. Never overridden.
pub const NAME_ATTR: &str = "name";
/// Fixed attribute carrying the shape's data version. Never overridden.
pub const VERSION_ATTR: &str = "version";

/// Named geometry descriptor with a typed attribute set.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    attributes: BTreeMap<String, AttrValue>,
}

impl Shape {
    pub fn new(name: &str, version: i64) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(NAME_ATTR.to_string(), AttrValue::Text(name.to_uppercase()));
        attributes.insert(VERSION_ATTR.to_string(), AttrValue::Integer(version));
        Self { attributes }
    }

    pub fn with(mut self, attribute: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(attribute.to_string(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        self.attributes
            .get(NAME_ATTR)
            .and_then(AttrValue::as_str)
            .unwrap_or("")
    }

    pub fn version(&self) -> i64 {
        self.attributes
            .get(VERSION_ATTR)
            .and_then(AttrValue::as_i64)
            .unwrap_or(0)
    }

    pub fn get(&self, attribute: &str) -> Option<&AttrValue> {
        self.attributes.get(attribute)
    }

    /// Case-insensitive attribute lookup.
    pub fn find(&self, attribute: &str) -> Option<&AttrValue> {
        self.get(attribute).or_else(|| {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(attribute))
                .map(|(_, v)| v)
        })
    }

    pub fn set(&mut self, attribute: &str, value: impl Into<AttrValue>) {
        self.attributes.insert(attribute.to_string(), value.into());
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Replaces the attribute set. `name` and `version` are kept from `self`.
    pub fn set_attributes(&mut self, mut attributes: BTreeMap<String, AttrValue>) {
        for fixed in [NAME_ATTR, VERSION_ATTR] {
            match self.attributes.get(fixed) {
                Some(value) => {
                    attributes.insert(fixed.to_string(), value.clone());
                }
                None => {
                    attributes.remove(fixed);
                }
            }
        }
        self.attributes = attributes;
    }
}

/// Produces fresh shapes carrying default attributes.
pub trait ShapeFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(&self) -> Shape;
}

pub struct CircleShape;

impl ShapeFactory for CircleShape {
    fn name(&self) -> &'static str {
        "CIRCLE"
    }

    fn create(&self) -> Shape {
        Shape::new(self.name(), 1)
            .with("radius", 4096i64)
            .with("centerRadius", 1024i64)
            .with("centerX", 0i64)
            .with("centerZ", 0i64)
            .with("weight", 1.0f64)
            .with("uniquePlacements", false)
            .with("expand", false)
    }
}

pub struct SquareShape;

impl ShapeFactory for SquareShape {
    fn name(&self) -> &'static str {
        "SQUARE"
    }

    fn create(&self) -> Shape {
        Shape::new(self.name(), 1)
            .with("radius", 4096i64)
            .with("centerRadius", 1024i64)
            .with("centerX", 0i64)
            .with("centerZ", 0i64)
            .with("weight", 1.0f64)
            .with("uniquePlacements", false)
            .with("expand", false)
            .with("mode", "NEAREST")
    }
}

/// Registry of shape factories, keyed by upper-cased name.
pub struct ShapeRegistry {
    factories: HashMap<String, Box<dyn ShapeFactory>>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, factory: Box<dyn ShapeFactory>) {
        tracing::debug!(shape = factory.name(), "registered shape factory");
        self.factories.insert(factory.name().to_uppercase(), factory);
    }

    pub fn with_default_shapes() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CircleShape));
        registry.register(Box::new(SquareShape));
        registry
    }

    /// Instantiates a fresh shape with default attributes.
    pub fn instantiate(&self, name: &str) -> Option<Shape> {
        self.factories
            .get(&name.to_uppercase())
            .map(|factory| factory.create())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.values().map(|f| f.name()).collect();
        names.sort();
        names
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::with_default_shapes()
    }
}
