use rand::Rng;
use std::collections::BTreeMap;

/// Separates a parameter key from its value in a raw token (`player:alice`).
pub const PARAMETER_DELIMITER: char = ':';

/// Separates multiple values of one token (`biome:desert,plains`).
pub const VALUE_SEPARATOR: char = ',';

/// Argument multimap. A key may repeat, so values keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    values: BTreeMap<String, Vec<String>>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any raw token carries a parameter delimiter.
    pub fn has_delimiters<S: AsRef<str>>(raw: &[S]) -> bool {
        raw.iter()
            .any(|arg| arg.as_ref().contains(PARAMETER_DELIMITER))
    }

    /// Parses raw `key:value` tokens. Tokens without a delimiter are
    /// subcommand words and are not part of the multimap.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut args = Self::new();
        for token in raw {
            let Some((key, value)) = token.as_ref().split_once(PARAMETER_DELIMITER) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            let entry = args.values.entry(key.to_string()).or_default();
            entry.extend(
                value
                    .split(VALUE_SEPARATOR)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }
        args
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Registers a key with no values.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_default();
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Lookup ignoring ASCII case, used for shape attribute names.
    pub fn get_ignore_case(&self, key: &str) -> Option<&[String]> {
        self.get(key).or_else(|| {
            self.values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_slice())
        })
    }

    /// Boolean parse of the first value; anything but `true` is false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .and_then(|values| values.first())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Picks one value uniformly at random, or `default` when there is none.
pub fn pick_one(values: Option<&[String]>, default: &str) -> String {
    pick_one_with(&mut rand::thread_rng(), values, default)
}

pub fn pick_one_with<R: Rng + ?Sized>(rng: &mut R, values: Option<&[String]>, default: &str) -> String {
    match values {
        Some(values) if !values.is_empty() => values[rng.gen_range(0..values.len())].clone(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_parse_multimap() {
        let args = CommandArgs::parse(&["player:alice,bob", "player:carol", "region:spawn", "reload"]);
        assert_eq!(
            args.get("player").unwrap(),
            &["alice".to_string(), "bob".to_string(), "carol".to_string()]
        );
        assert_eq!(args.get("region").unwrap(), &["spawn".to_string()]);
        assert!(!args.contains("reload"));
    }

    #[test]
    fn test_empty_value_keeps_key() {
        let args = CommandArgs::parse(&["region:"]);
        assert!(args.contains("region"));
        assert!(args.get("region").unwrap().is_empty());
    }

    #[test]
    fn test_has_delimiters() {
        assert!(CommandArgs::has_delimiters(&["player:bob"]));
        assert!(!CommandArgs::has_delimiters(&["reload", "help"]));
        assert!(!CommandArgs::has_delimiters::<&str>(&[]));
    }

    #[test]
    fn test_flag() {
        let args = CommandArgs::new()
            .with("worldBorderOverride", "TRUE")
            .with("toggletargetperms", "yes");
        assert!(args.flag("worldBorderOverride"));
        assert!(!args.flag("toggletargetperms"));
        assert!(!args.flag("missing"));
    }

    #[test]
    fn test_get_ignore_case() {
        let args = CommandArgs::new().with("centerradius", "5");
        assert_eq!(args.get_ignore_case("centerRadius").unwrap(), &["5".to_string()]);
    }

    #[test]
    fn test_pick_one_default() {
        assert_eq!(pick_one(None, "default"), "default");
        assert_eq!(pick_one(Some(&[]), "CIRCLE"), "CIRCLE");
    }

    #[test]
    fn test_pick_one_covers_all_values() {
        let values: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = pick_one_with(&mut rng, Some(&values), "z");
            assert!(values.contains(&picked));
            seen.insert(picked);
        }
        assert_eq!(seen.len(), 3);
    }
}
