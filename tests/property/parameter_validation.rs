// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Parameter Validation

use std::collections::BTreeMap;

use policy_distribution::parameters::validation::{validate_group_map, GroupValidationResult};
use policy_distribution::parameters::{
    ConfigurationParameters, ParameterGroup, PluginHandlerParameters, PolicyDecoderParameters,
    PolicyForwarderParameters, ValidationStatus,
};
use policy_distribution::plugins::file::{
    FilePolicyForwarder, JsonPolicyDecoder, JsonPolicyDecoderParameterGroup,
};
use policy_distribution::PluginRegistry;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Class names: some registered, some not, some blank
fn decoder_class_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(Some(JsonPolicyDecoder::CLASS_NAME.to_string())),
        Just(Some(String::new())),
        Just(Some("   ".to_string())),
        Just(None),
        "[a-z:]{1,24}".prop_map(Some),
    ]
}

fn decoder_parameters() -> impl Strategy<Value = PolicyDecoderParameters> {
    (prop::option::of("[A-Za-z ]{0,12}"), decoder_class_name()).prop_map(|(decoder_type, class_name)| {
        serde_json::from_value(json!({
            "decoderType": decoder_type,
            "decoderClassName": class_name,
        }))
        .unwrap_or_default()
    })
}

fn decoder_map() -> impl Strategy<Value = BTreeMap<String, PolicyDecoderParameters>> {
    prop::collection::btree_map("[A-Z][a-z]{0,8}", decoder_parameters(), 0..6)
}

fn forwarders() -> BTreeMap<String, PolicyForwarderParameters> {
    BTreeMap::from([(
        "FileForwarder".to_string(),
        PolicyForwarderParameters::new("FileForwarder", FilePolicyForwarder::CLASS_NAME, None),
    )])
}

/// Insert spaces between the characters of `text` where `mask` says so
fn sprinkle_whitespace(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .flat_map(|(c, space)| if *space { vec![' ', c, '\t'] } else { vec![c] })
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Validation is deterministic
    #[test]
    fn prop_validation_is_deterministic(decoders in decoder_map()) {
        let registry = PluginRegistry::with_builtin_plugins();
        let handler = PluginHandlerParameters::new("handler", Some(decoders), Some(forwarders()));

        prop_assert_eq!(handler.validate(&registry), handler.validate(&registry));
    }

    /// Property: A group is as bad as its worst entry
    #[test]
    fn prop_group_status_is_worst_entry(decoders in decoder_map()) {
        let registry = PluginRegistry::with_builtin_plugins();
        let expected = decoders
            .values()
            .map(|decoder| decoder.validate(&registry).status())
            .max()
            .unwrap_or(ValidationStatus::Invalid);

        let handler = PluginHandlerParameters::new("handler", Some(decoders), Some(forwarders()));
        prop_assert_eq!(handler.validate(&registry).status(), expected);
    }

    /// Property: Only clean trees render nothing
    #[test]
    fn prop_result_text_iff_not_clean(decoders in decoder_map()) {
        let registry = PluginRegistry::with_builtin_plugins();
        let handler = PluginHandlerParameters::new("handler", Some(decoders), Some(forwarders()));
        let result = handler.validate(&registry);

        prop_assert_eq!(result.result().is_none(), result.is_clean());
    }

    /// Property: Null and empty maps are both invalid, with distinct messages
    #[test]
    fn prop_null_and_empty_maps_differ(name in "[a-z]{1,12}") {
        let empty: BTreeMap<String, ()> = BTreeMap::new();
        let ok = |_: &()| GroupValidationResult::new("entry", "Entry");

        let null_result = validate_group_map(&name, None::<&BTreeMap<String, ()>>, "must not be empty", ok);
        let empty_result = validate_group_map(&name, Some(&empty), "must not be empty", ok);

        prop_assert_eq!(null_result.status(), ValidationStatus::Invalid);
        prop_assert_eq!(empty_result.status(), ValidationStatus::Invalid);
        prop_assert_ne!(null_result, empty_result);
    }

    /// Property: Whitespace inside parameterClassName is ignored
    #[test]
    fn prop_class_name_whitespace_is_stripped(mask in prop::collection::vec(any::<bool>(), 1..8)) {
        let registry = PluginRegistry::with_builtin_plugins();
        let class_name = sprinkle_whitespace(JsonPolicyDecoderParameterGroup::CLASS_NAME, &mask);
        let envelope = json!({ "parameterClassName": class_name, "parameters": {} });

        let configuration = ConfigurationParameters::from_envelope("json", &envelope, &registry).unwrap();
        prop_assert_eq!(configuration.class_name(), JsonPolicyDecoderParameterGroup::CLASS_NAME);
    }
}
