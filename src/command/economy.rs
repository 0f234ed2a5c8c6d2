use super::keys;
use crate::config::{EconomyConfig, MessageKey, RtpConfig};
use crate::context::RtpContext;
use crate::core::{Actor, CommandArgs, EntityId, Permission, Result};
use crate::selection::Region;
use crate::server::{Economy, ServerAccessor};

/// Outcome of the aggregate pre-screen run before any target is touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomyCheckResult {
    pub can_proceed: bool,
    pub price: f64,
    pub floor: f64,
}

impl EconomyCheckResult {
    pub fn approved() -> Self {
        Self {
            can_proceed: true,
            price: 0.0,
            floor: 0.0,
        }
    }
}

/// Senders that are never charged: the console and `rtp.free` holders.
pub fn is_exempt(server: &dyn ServerAccessor, sender: &Actor) -> bool {
    sender.is_system() || server.has_permission(sender.id(), Permission::Free)
}

/// Summed price of a request across all targets.
///
/// Base price for the sender itself, the "other" price for each target that
/// lacks `rtp.notme`, then the params and biome surcharges once each.
pub fn quote(
    eco: &EconomyConfig,
    server: &dyn ServerAccessor,
    sender: &Actor,
    targets: &[Actor],
    args: &CommandArgs,
) -> f64 {
    let mut price = 0.0;
    for target in targets {
        if target.id() == sender.id() {
            price += eco.price;
        } else if !server.has_permission(target.id(), Permission::NotMe) {
            price += eco.other_price;
        }
    }
    if args.contains(keys::SHAPE) || args.contains(keys::VERT) {
        price += eco.params_price;
    }
    if args.contains(keys::BIOME) {
        price += eco.biome_price;
    }
    price
}

/// Advisory pre-screen: can the sender afford the whole request?
pub async fn check_economy(
    ctx: &RtpContext,
    config: &RtpConfig,
    sender: &Actor,
    targets: &[Actor],
    args: &CommandArgs,
) -> Result<EconomyCheckResult> {
    let server = ctx.server();
    let Some(economy) = ctx.economy() else {
        return Ok(EconomyCheckResult::approved());
    };
    if is_exempt(server, sender) {
        return Ok(EconomyCheckResult::approved());
    }

    let price = quote(&config.economy, server, sender, targets, args);
    let floor = config.economy.balance_floor;
    let balance = economy.balance(sender.id()).await?;

    if balance - price < floor {
        tracing::debug!(sender = sender.name(), balance, price, floor, "insufficient funds");
        server.send_message(sender.id(), &not_enough_money(config, price));
        return Ok(EconomyCheckResult {
            can_proceed: false,
            price,
            floor,
        });
    }

    Ok(EconomyCheckResult {
        can_proceed: true,
        price,
        floor,
    })
}

/// Authoritative per-target debit.
///
/// Charges the sender for this target, plus the target itself when target
/// permissions are toggled on. Each charge is added to the target's record
/// cost and re-checked against the floor before debiting. Earlier debits in
/// the same request are not refunded when this one fails.
#[allow(clippy::too_many_arguments)]
pub async fn charge_target(
    ctx: &RtpContext,
    config: &RtpConfig,
    sender: &Actor,
    target: &Actor,
    args: &CommandArgs,
    region: &Region,
    world_border_override: bool,
    toggle_target_perms: bool,
    check: &EconomyCheckResult,
) -> Result<bool> {
    let Some(economy) = ctx.economy() else {
        return Ok(true);
    };
    let server = ctx.server();
    let eco = &config.economy;
    let extras = surcharges(eco, args, world_border_override) + region.cost();

    if !is_exempt(server, sender) {
        let mut cost = extras;
        if target.id() == sender.id() {
            cost += eco.price;
        } else if !server.has_permission(target.id(), Permission::NotMe) {
            cost += eco.other_price;
        }

        add_cost(ctx, target.id(), cost)?;
        if !debit_above_floor(economy, sender.id(), cost, check.floor).await? {
            server.send_message(sender.id(), &not_enough_money(config, check.price));
            return Ok(false);
        }
    }

    if toggle_target_perms
        && target.id() != sender.id()
        && !server.has_permission(target.id(), Permission::Free)
    {
        let cost = eco.price + extras;

        // Configured floor; the sender's check is empty when the sender is exempt
        add_cost(ctx, target.id(), cost)?;
        if !debit_above_floor(economy, target.id(), cost, eco.balance_floor).await? {
            server.send_message_about(sender.id(), target.id(), &not_enough_money(config, cost));
            return Ok(false);
        }
    }

    Ok(true)
}

fn surcharges(eco: &EconomyConfig, args: &CommandArgs, world_border_override: bool) -> f64 {
    let mut extra = 0.0;
    if args.contains(keys::SHAPE) || args.contains(keys::VERT) || world_border_override {
        extra += eco.params_price;
    }
    if args.contains(keys::BIOME) {
        extra += eco.biome_price;
    }
    extra
}

fn add_cost(ctx: &RtpContext, target: EntityId, cost: f64) -> Result<()> {
    ctx.state().update(target, &mut |record| record.cost += cost)?;
    Ok(())
}

/// Check-then-debit. A ledger refusal at debit time counts as insufficient funds.
async fn debit_above_floor(economy: &dyn Economy, payer: EntityId, amount: f64, floor: f64) -> Result<bool> {
    let balance = economy.balance(payer).await?;
    if balance - amount < floor {
        return Ok(false);
    }
    economy.debit(payer, amount).await
}

fn not_enough_money(config: &RtpConfig, price: f64) -> String {
    config
        .messages
        .render_with(MessageKey::NotEnoughMoney, &[("[money]", price.to_string().as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::InMemoryServer;
    use uuid::Uuid;

    fn prices() -> EconomyConfig {
        EconomyConfig::new()
            .price(10.0)
            .other_price(5.0)
            .params_price(2.0)
            .biome_price(3.0)
    }

    #[test]
    fn test_quote_self_with_params_and_biome() {
        let server = InMemoryServer::new();
        let alice = Actor::player(Uuid::new_v4(), "alice", "world");
        let args = CommandArgs::parse(&["shape:square", "biome:desert"]);

        let price = quote(&prices(), &server, &alice, &[alice.clone()], &args);
        assert_eq!(price, 15.0);
    }

    #[test]
    fn test_quote_others_and_notme() {
        let server = InMemoryServer::new();
        let alice = Actor::player(Uuid::new_v4(), "alice", "world");
        let bob = Actor::player(Uuid::new_v4(), "bob", "world");
        let carol = Actor::player(Uuid::new_v4(), "carol", "world");
        server.grant(carol.id(), Permission::NotMe);

        let targets = [alice.clone(), bob, carol];
        let price = quote(&prices(), &server, &alice, &targets, &CommandArgs::new());
        assert_eq!(price, 15.0);

        let vert = CommandArgs::parse(&["vert:up"]);
        assert_eq!(quote(&prices(), &server, &alice, &targets, &vert), 17.0);
    }

    #[test]
    fn test_surcharges() {
        let eco = prices();
        assert_eq!(surcharges(&eco, &CommandArgs::new(), false), 0.0);
        assert_eq!(surcharges(&eco, &CommandArgs::new(), true), 2.0);
        assert_eq!(surcharges(&eco, &CommandArgs::parse(&["biome:plains"]), false), 3.0);
    }

    #[test]
    fn test_exemptions() {
        let server = InMemoryServer::new();
        let alice = Actor::player(Uuid::new_v4(), "alice", "world");
        assert!(is_exempt(&server, &Actor::system()));
        assert!(!is_exempt(&server, &alice));
        server.grant(alice.id(), Permission::Free);
        assert!(is_exempt(&server, &alice));
    }
}
