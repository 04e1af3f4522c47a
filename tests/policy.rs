//! Tests for the admission gate and property-based policy resolution.

use fluentgate::policy::{EXCLUSIVE_KEY, INCLUSIVE_KEY, THRESHOLD_KEY, level_key};
use fluentgate::{Level, Mode, Policy, PolicyResolver, PropertiesPolicyResolver};
use std::collections::HashMap;

fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn unset_enables_everything() {
    let policy = Policy::unset();
    for level in Level::all() {
        assert!(policy.is_enabled(Some(level)));
    }
    assert!(policy.is_enabled(None));
}

#[test]
fn conflict_enables_everything() {
    let policy = Policy::new(Mode::Conflict)
        .with_threshold(Level::Severe.rank())
        .with_override("CONFIG", true);
    for level in Level::all() {
        assert!(policy.is_enabled(Some(level)));
    }
    assert!(policy.is_enabled(None));
}

#[test]
fn exclusive_without_rules_enables_everything() {
    let policy = Policy::new(Mode::Exclusive);
    for level in Level::all() {
        assert!(policy.is_enabled(Some(level)));
    }
}

#[test]
fn exclusive_override_disables_level() {
    let policy = Policy::new(Mode::Exclusive).with_override("CONFIG", true);
    assert!(!policy.is_enabled(Some(Level::Config)));
    assert!(policy.is_enabled(Some(Level::Info)));
}

#[test]
fn exclusive_false_override_is_ignored() {
    let policy = Policy::new(Mode::Exclusive)
        .with_override("CONFIG", false)
        .with_threshold(Level::Config.rank());
    assert!(!policy.is_enabled(Some(Level::Config)));
}

#[test]
fn exclusive_threshold_keeps_levels_below() {
    let threshold = Level::Config.rank();
    let policy = Policy::new(Mode::Exclusive).with_threshold(threshold);
    for level in Level::all() {
        assert_eq!(policy.is_enabled(Some(level)), level.rank() < threshold);
    }
    assert!(policy.is_enabled(Some(Level::Finest)));
    assert!(!policy.is_enabled(Some(Level::Config)));
    assert!(!policy.is_enabled(Some(Level::Severe)));
}

#[test]
fn exclusive_override_beats_threshold() {
    let policy = Policy::new(Mode::Exclusive)
        .with_threshold(Level::Severe.rank())
        .with_override("finest", true);
    assert!(!policy.is_enabled(Some(Level::Finest)));
    assert!(policy.is_enabled(Some(Level::Finer)));
}

#[test]
fn inclusive_without_rules_disables_everything() {
    let policy = Policy::new(Mode::Inclusive);
    for level in Level::all() {
        assert!(!policy.is_enabled(Some(level)));
    }
}

#[test]
fn inclusive_override_enables_level() {
    let policy = Policy::new(Mode::Inclusive).with_override("CONFIG", true);
    assert!(policy.is_enabled(Some(Level::Config)));
    assert!(!policy.is_enabled(Some(Level::Severe)));
}

#[test]
fn inclusive_threshold_keeps_levels_at_or_above() {
    let threshold = Level::Config.rank();
    let policy = Policy::new(Mode::Inclusive).with_threshold(threshold);
    for level in Level::all() {
        assert_eq!(policy.is_enabled(Some(level)), level.rank() >= threshold);
    }
    assert!(policy.is_enabled(Some(Level::Config)));
    assert!(!policy.is_enabled(Some(Level::Finest)));
    assert!(policy.is_enabled(Some(Level::Severe)));
}

#[test]
fn absent_level_falls_back_to_mode_default() {
    let exclusive = Policy::new(Mode::Exclusive).with_threshold(0);
    let inclusive = Policy::new(Mode::Inclusive).with_threshold(0);
    assert!(exclusive.is_enabled(None));
    assert!(!inclusive.is_enabled(None));
}

#[test]
fn mode_from_signals() {
    assert_eq!(Mode::from_signals(None, None), Mode::Unset);
    assert_eq!(Mode::from_signals(Some(true), Some(true)), Mode::Conflict);
    assert_eq!(Mode::from_signals(Some(true), None), Mode::Exclusive);
    assert_eq!(Mode::from_signals(Some(true), Some(false)), Mode::Exclusive);
    assert_eq!(Mode::from_signals(Some(false), None), Mode::Inclusive);
    assert_eq!(Mode::from_signals(None, Some(true)), Mode::Inclusive);
    assert_eq!(Mode::from_signals(Some(false), Some(true)), Mode::Inclusive);
    assert_eq!(Mode::from_signals(None, Some(false)), Mode::Exclusive);
}

#[test]
fn properties_without_mode_resolve_unset() {
    let resolver = PropertiesPolicyResolver::new(props(&[(THRESHOLD_KEY, "700")]));
    let policy = resolver.resolve("any");
    assert_eq!(policy.mode(), Mode::Unset);
    assert!(policy.is_enabled(Some(Level::Finest)));
}

#[test]
fn properties_exclusive_with_level_override() {
    let key = level_key(Level::Config);
    assert_eq!(key, "flogger.CONFIG");
    let resolver = PropertiesPolicyResolver::new(props(&[(EXCLUSIVE_KEY, "TRUE"), (key.as_str(), "true")]));
    let policy = resolver.resolve("any");
    assert_eq!(policy.mode(), Mode::Exclusive);
    assert!(!policy.is_enabled(Some(Level::Config)));
    assert!(policy.is_enabled(Some(Level::Severe)));
}

#[test]
fn properties_exclusive_false_is_inclusive() {
    let resolver = PropertiesPolicyResolver::new(props(&[
        (EXCLUSIVE_KEY, "false"),
        (THRESHOLD_KEY, "700"),
    ]));
    let policy = resolver.resolve("any");
    assert_eq!(policy.mode(), Mode::Inclusive);
    assert!(policy.is_enabled(Some(Level::Config)));
    assert!(!policy.is_enabled(Some(Level::Finest)));
}

#[test]
fn properties_conflict_is_permissive() {
    let resolver = PropertiesPolicyResolver::new(props(&[
        (EXCLUSIVE_KEY, "true"),
        (INCLUSIVE_KEY, "true"),
        (THRESHOLD_KEY, "100"),
    ]));
    let policy = resolver.resolve("any");
    assert_eq!(policy.mode(), Mode::Conflict);
    assert!(Level::all().iter().all(|l| policy.is_enabled(Some(*l))));
}

#[test]
fn properties_malformed_threshold_is_absent() {
    let resolver = PropertiesPolicyResolver::new(props(&[
        (EXCLUSIVE_KEY, "true"),
        (THRESHOLD_KEY, "not-a-number"),
    ]));
    let policy = resolver.resolve("any");
    assert_eq!(policy.threshold(), None);
    assert!(policy.is_enabled(Some(Level::Severe)));
}

#[test]
fn static_policy_resolves_to_itself() {
    let policy = Policy::new(Mode::Inclusive).with_threshold(900);
    assert_eq!(policy.resolve("a"), policy);
    assert_eq!(policy.resolve("b"), policy);
}
