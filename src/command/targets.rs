use super::keys;
use crate::config::{MessageKey, RtpConfig};
use crate::core::{Actor, CommandArgs};
use crate::server::ServerAccessor;

/// Resolves who the request moves.
///
/// Named players are looked up one by one; a miss is reported to the sender
/// and skipped. With no names, a placeable sender targets itself, while a
/// console sender gets a "target required" notice and nothing.
pub fn collect_targets(
    server: &dyn ServerAccessor,
    config: &RtpConfig,
    sender: &Actor,
    args: &CommandArgs,
) -> Vec<Actor> {
    if let Some(names) = args.get(keys::PLAYER) {
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            match server.player(name) {
                Some(player) => targets.push(player),
                None => {
                    let arg = format!("{}:{}", keys::PLAYER, name);
                    let msg = config
                        .messages
                        .render_with(MessageKey::BadArg, &[("[arg]", arg.as_str())]);
                    server.send_message(sender.id(), &msg);
                }
            }
        }
        return targets;
    }

    if sender.is_placeable() {
        return vec![sender.clone()];
    }

    let msg = config.messages.render(MessageKey::ConsoleCmdNotAllowed);
    server.send_message(sender.id(), &msg);
    server.fail_event(sender, &msg);
    Vec::new()
}
