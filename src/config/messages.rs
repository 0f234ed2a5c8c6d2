use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys of user-facing message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKey {
    Busy,
    NoPerms,
    CooldownMessage,
    AlreadyTeleporting,
    BadArg,
    ConsoleCmdNotAllowed,
    NotEnoughMoney,
    DelayMessage,
}

impl MessageKey {
    pub const ALL: [MessageKey; 8] = [
        MessageKey::Busy,
        MessageKey::NoPerms,
        MessageKey::CooldownMessage,
        MessageKey::AlreadyTeleporting,
        MessageKey::BadArg,
        MessageKey::ConsoleCmdNotAllowed,
        MessageKey::NotEnoughMoney,
        MessageKey::DelayMessage,
    ];

    pub fn default_template(&self) -> &'static str {
        match self {
            Self::Busy => "&4busy",
            Self::NoPerms => "&4You don't have permission to do that.",
            Self::CooldownMessage => "&4You must wait before teleporting again.",
            Self::AlreadyTeleporting => "&4[player] is already teleporting.",
            Self::BadArg => "&4Invalid argument: [arg]",
            Self::ConsoleCmdNotAllowed => "&4Console must name a player to teleport.",
            Self::NotEnoughMoney => "&4You need [money] to teleport.",
            Self::DelayMessage => "&aTeleporting [player] shortly, don't move.",
        }
    }
}

/// Message templates with `[placeholder]` substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages {
    templates: HashMap<MessageKey, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: MessageKey, template: impl Into<String>) -> Self {
        self.templates.insert(key, template.into());
        self
    }

    pub fn template(&self, key: MessageKey) -> &str {
        self.templates
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    pub fn render(&self, key: MessageKey) -> String {
        self.template(key).to_string()
    }

    /// Renders a template, replacing each `(placeholder, value)` pair.
    pub fn render_with(&self, key: MessageKey, substitutions: &[(&str, &str)]) -> String {
        substitutions
            .iter()
            .fold(self.render(key), |text, (placeholder, value)| {
                text.replace(placeholder, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_every_key() {
        let messages = Messages::new();
        for key in MessageKey::ALL {
            assert!(!messages.template(key).is_empty());
        }
    }

    #[test]
    fn test_money_substitution() {
        let messages = Messages::new().set(MessageKey::NotEnoughMoney, "need [money] coins");
        assert_eq!(
            messages.render_with(MessageKey::NotEnoughMoney, &[("[money]", "15")]),
            "need 15 coins"
        );
    }

    #[test]
    fn test_deserialize_camel_case_keys() {
        let messages: Messages =
            serde_json::from_str(r#"{"cooldownMessage": "slow down"}"#).unwrap();
        assert_eq!(messages.template(MessageKey::CooldownMessage), "slow down");
        assert_eq!(messages.template(MessageKey::Busy), "&4busy");
    }
}
