use super::Shape;
use std::collections::BTreeSet;

/// Named spatial boundary a target may land in.
///
/// Regions are shared between concurrent requests; any request that needs a
/// different shape works on a clone via [`Region::with_shape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    world: String,
    shape: Shape,
    price: f64,
    flags: BTreeSet<String>,
}

impl Region {
    pub fn new(name: &str, world: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            world: world.to_string(),
            shape,
            price: 0.0,
            flags: BTreeSet::new(),
        }
    }

    /// Negative or non-finite prices make the region free.
    pub fn price(mut self, price: f64) -> Self {
        self.price = if price.is_finite() && price > 0.0 { price } else { 0.0 };
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.insert(flag.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn cost(&self) -> f64 {
        self.price
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Independent copy carrying a replacement shape.
    pub fn with_shape(&self, shape: Shape) -> Self {
        Self {
            shape,
            ..self.clone()
        }
    }
}
