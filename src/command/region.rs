use super::keys;
use crate::config::{DEFAULT_REGION, RtpConfig};
use crate::core::{Actor, CommandArgs, RtpError, pick_one};
use crate::selection::{Region, SelectionApi};
use crate::server::ServerAccessor;
use std::collections::BTreeSet;

/// World name used when neither the arguments nor the target supply one.
const DEFAULT_WORLD: &str = "default";

/// Resolves the region a target lands in, or `None` when it cannot be.
///
/// An explicit `region` argument wins. Otherwise the world (explicit
/// argument, else the target's own) must be configured, and its default
/// region is used. Registry errors count as a miss.
pub fn resolve_region(
    selection: &SelectionApi,
    config: &RtpConfig,
    target: &Actor,
    args: &CommandArgs,
) -> Option<Region> {
    let region_name = if args.contains(keys::REGION) {
        pick_one(args.get(keys::REGION), DEFAULT_REGION)
    } else {
        let world = if args.contains(keys::WORLD) {
            pick_one(args.get(keys::WORLD), DEFAULT_WORLD)
        } else {
            target.world().unwrap_or(DEFAULT_WORLD).to_string()
        };

        // TODO: tell the sender the world is not configured once a message key exists for it
        let Some(world_config) = config.world_config(&world) else {
            let err = RtpError::WorldNotConfigured(world);
            tracing::debug!(target = target.name(), error = %err, "region resolution failed");
            return None;
        };
        world_config.region.clone()
    };

    match selection.get_region_or_default(&region_name) {
        Ok(region) => Some(region),
        Err(err) => {
            tracing::debug!(region = %region_name, error = %err, "region lookup failed");
            None
        }
    }
}

/// Substitutes the world's current border shape when the request asks for it.
///
/// Returns the region to use and whether the override was requested. The
/// shared region is never mutated; the override works on a clone.
pub fn apply_world_border_override(
    server: &dyn ServerAccessor,
    args: &CommandArgs,
    region: Region,
) -> (Region, bool) {
    if !args.flag(keys::WORLD_BORDER_OVERRIDE) {
        return (region, false);
    }

    match server.world_border_shape(region.world()) {
        Some(border) => (region.with_shape(border), true),
        None => {
            tracing::debug!(world = region.world(), "no world border shape available");
            (region, true)
        }
    }
}

/// Upper-cased biome filter, or `None` when the request has none.
pub fn biome_filter(args: &CommandArgs) -> Option<BTreeSet<String>> {
    args.get(keys::BIOME)
        .map(|biomes| biomes.iter().map(|b| b.to_uppercase()).collect())
}
