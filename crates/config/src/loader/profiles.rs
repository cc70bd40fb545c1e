//! Profile expansion: one composite layer built from a list of profiles.
//!
//! Responsibilities:
//! - Run a caller callback once per profile against a fresh nested stack.
//! - Choose the iteration direction so either the first or the last profile wins.
//! - Re-read a dynamic profile list on every resolution.
//!
//! Does NOT handle:
//! - Deciding what a profile means; profiles are opaque to this module.
//!
//! Invariants:
//! - Order is priority: there is no separate priority field anywhere.
//! - Static lists are expanded once, when the layer is declared; dynamic
//!   lists are expanded each time the parent stack resolves.

use std::sync::Arc;

use super::layer::SharedProducer;
use super::stack::LayerStack;
use crate::error::ConfigError;
use crate::properties::property;
use crate::tree::ConfigTree;

/// Build the nested stack for one expansion.
///
/// With `prefer_first`, profiles are visited in order so the first profile's
/// layers are added first and outrank the rest. Otherwise they are visited in
/// reverse and the last profile wins.
pub fn combine_profiles<P, C>(
    profiles: &[P],
    prefer_first: bool,
    callback: &C,
) -> Result<LayerStack, ConfigError>
where
    C: Fn(&P, &mut LayerStack) -> Result<(), ConfigError> + ?Sized,
{
    let mut collector = LayerStack::new();
    if prefer_first {
        for profile in profiles {
            callback(profile, &mut collector)?;
        }
    } else {
        for profile in profiles.iter().rev() {
            callback(profile, &mut collector)?;
        }
    }
    Ok(collector)
}

/// Expand a fixed profile list right away into one composite layer.
pub fn static_profiles<P, I, C>(
    profiles: I,
    prefer_first: bool,
    callback: C,
) -> Result<SharedProducer, ConfigError>
where
    I: IntoIterator<Item = P>,
    C: Fn(&P, &mut LayerStack) -> Result<(), ConfigError>,
{
    let profiles: Vec<P> = profiles.into_iter().collect();
    tracing::debug!(count = profiles.len(), prefer_first, "Expanding static profiles");
    let collector = combine_profiles(&profiles, prefer_first, &callback)?;
    Ok(Arc::new(collector))
}

/// A composite layer that asks `supplier` for the active profiles every time
/// it is produced.
pub fn dynamic_profiles<P, S, C>(supplier: S, prefer_first: bool, callback: C) -> SharedProducer
where
    P: 'static,
    S: Fn() -> Vec<P> + Send + Sync + 'static,
    C: Fn(&P, &mut LayerStack) -> Result<(), ConfigError> + Send + Sync + 'static,
{
    Arc::new(move || -> Result<Option<ConfigTree>, ConfigError> {
        let profiles = supplier();
        tracing::debug!(count = profiles.len(), prefer_first, "Expanding active profiles");
        combine_profiles(&profiles, prefer_first, &callback)?
            .resolve()
            .map(Some)
    })
}

/// A profile supplier backed by a comma-separated property.
///
/// The property (or its environment variable, e.g. `APP_PROFILES_ACTIVE` for
/// `app.profiles.active`) is read on every call; blank entries are dropped.
pub fn active_profiles_from_property(
    name: impl Into<String>,
) -> impl Fn() -> Vec<String> + Send + Sync + 'static {
    let name = name.into();
    move || {
        property(&name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::layer::constant;
    use serial_test::serial;

    fn add_marker(profile: &&str, stack: &mut LayerStack) -> Result<(), ConfigError> {
        let seen = format!("seen.{profile}");
        stack.add(constant(ConfigTree::from_dotted_pairs([
            ("winner".to_string(), profile.to_string()),
            (seen, "yes".to_string()),
        ])));
        Ok(())
    }

    #[test]
    fn test_prefer_first_makes_first_profile_win() {
        let stack = combine_profiles(&["a", "b", "c"], true, &add_marker).unwrap();
        let config = stack.resolve().unwrap();

        assert_eq!(config.get_str("winner"), Some("a"));
        assert_eq!(config.get_str("seen.c"), Some("yes"));
    }

    #[test]
    fn test_prefer_last_makes_last_profile_win() {
        let stack = combine_profiles(&["a", "b", "c"], false, &add_marker).unwrap();
        let config = stack.resolve().unwrap();

        assert_eq!(config.get_str("winner"), Some("c"));
        assert_eq!(config.get_str("seen.a"), Some("yes"));
    }

    /// Each profile writes its name under every pair key it belongs to, so
    /// `pair.ab` records which of `a` and `b` outranks the other.
    fn add_pairs(profile: &&str, stack: &mut LayerStack) -> Result<(), ConfigError> {
        let pairs = ["ab", "ac", "bc"]
            .into_iter()
            .filter(|pair| pair.contains(*profile))
            .map(|pair| (format!("pair.{pair}"), profile.to_string()));
        stack.add(constant(ConfigTree::from_dotted_pairs(pairs)));
        Ok(())
    }

    #[test]
    fn test_prefer_first_ranks_every_profile_in_list_order() {
        let stack = combine_profiles(&["a", "b", "c"], true, &add_pairs).unwrap();
        let config = stack.resolve().unwrap();

        // a > b > c
        assert_eq!(config.get_str("pair.ab"), Some("a"));
        assert_eq!(config.get_str("pair.ac"), Some("a"));
        assert_eq!(config.get_str("pair.bc"), Some("b"));
    }

    #[test]
    fn test_prefer_last_ranks_every_profile_in_reverse_order() {
        let stack = combine_profiles(&["a", "b", "c"], false, &add_pairs).unwrap();
        let config = stack.resolve().unwrap();

        // c > b > a
        assert_eq!(config.get_str("pair.ab"), Some("b"));
        assert_eq!(config.get_str("pair.ac"), Some("c"));
        assert_eq!(config.get_str("pair.bc"), Some("c"));
    }

    #[test]
    fn test_callback_error_stops_expansion() {
        let result = combine_profiles(&["ok", "bad"], true, &|profile: &&str, _: &mut LayerStack| {
            if *profile == "bad" {
                Err(ConfigError::UnknownStrategy("bad".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(ConfigError::UnknownStrategy(_))));
    }

    #[test]
    fn test_empty_profile_list_yields_empty_layer() {
        let producer = static_profiles(Vec::<String>::new(), true, |_, _| Ok(())).unwrap();
        assert_eq!(producer.produce().unwrap(), Some(ConfigTree::empty()));
    }

    #[test]
    #[serial]
    fn test_active_profiles_from_property_reads_each_call() {
        let supplier = active_profiles_from_property("layered.test.profiles");

        temp_env::with_vars([("LAYERED_TEST_PROFILES", Some(" dev , ,eu "))], || {
            assert_eq!(supplier(), vec!["dev".to_string(), "eu".to_string()]);
        });
        temp_env::with_vars([("LAYERED_TEST_PROFILES", None::<&str>)], || {
            assert!(supplier().is_empty());
        });
    }
}
