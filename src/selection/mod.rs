pub mod region;
pub mod shape;

pub use region::Region;
pub use shape::{NAME_ATTR, Shape, ShapeFactory, ShapeRegistry, VERSION_ATTR};

use crate::config::DEFAULT_REGION;
use crate::core::{EntityId, Result, RtpError};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Region registry shared by every request.
///
/// Besides the named regions it keeps a per-actor table of temporary
/// regions built from shape overrides, and a cache of which entities
/// already have a known safe location in a region.
#[derive(Default)]
pub struct SelectionApi {
    regions: RwLock<HashMap<String, Region>>,
    temp_regions: RwLock<HashMap<EntityId, Region>>,
    known_locations: RwLock<HashMap<String, HashSet<EntityId>>>,
}

impl SelectionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&self, region: Region) -> Result<Option<Region>> {
        let mut regions = self.regions.write()?;
        Ok(regions.insert(region.name().to_ascii_lowercase(), region))
    }

    pub fn remove_region(&self, name: &str) -> Result<Option<Region>> {
        let mut regions = self.regions.write()?;
        self.known_locations.write()?.remove(&name.to_ascii_lowercase());
        Ok(regions.remove(&name.to_ascii_lowercase()))
    }

    pub fn region(&self, name: &str) -> Result<Option<Region>> {
        let regions = self.regions.read()?;
        Ok(regions.get(&name.to_ascii_lowercase()).cloned())
    }

    /// Named region, else the `default` region.
    pub fn get_region_or_default(&self, name: &str) -> Result<Region> {
        let regions = self.regions.read()?;
        regions
            .get(&name.to_ascii_lowercase())
            .or_else(|| regions.get(DEFAULT_REGION))
            .cloned()
            .ok_or_else(|| RtpError::RegionNotFound(name.to_string()))
    }

    pub fn region_names(&self) -> Result<Vec<String>> {
        let regions = self.regions.read()?;
        let mut names: Vec<String> = regions.values().map(|r| r.name().to_string()).collect();
        names.sort();
        Ok(names)
    }

    pub fn put_temp_region(&self, owner: EntityId, region: Region) -> Result<()> {
        self.temp_regions.write()?.insert(owner, region);
        Ok(())
    }

    pub fn temp_region(&self, owner: EntityId) -> Result<Option<Region>> {
        Ok(self.temp_regions.read()?.get(&owner).cloned())
    }

    pub fn clear_temp_region(&self, owner: EntityId) -> Result<Option<Region>> {
        Ok(self.temp_regions.write()?.remove(&owner))
    }

    /// Records that `entity` has a pre-computed safe location in `region`.
    pub fn cache_location(&self, region: &str, entity: EntityId) -> Result<()> {
        self.known_locations
            .write()?
            .entry(region.to_ascii_lowercase())
            .or_default()
            .insert(entity);
        Ok(())
    }

    pub fn consume_location(&self, region: &str, entity: EntityId) -> Result<bool> {
        let mut known = self.known_locations.write()?;
        Ok(known
            .get_mut(&region.to_ascii_lowercase())
            .map(|set| set.remove(&entity))
            .unwrap_or(false))
    }

    pub fn has_location(&self, region: &str, entity: EntityId) -> Result<bool> {
        let known = self.known_locations.read()?;
        Ok(known
            .get(&region.to_ascii_lowercase())
            .map(|set| set.contains(&entity))
            .unwrap_or(false))
    }
}
