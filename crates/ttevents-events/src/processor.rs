// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-method argument pipelines.
//
// Each operation reads one argument bag and either returns the value to
// forward to the vendor SDK or the first validation error. Nothing is
// forwarded on error, so a failed call never leaves a partial event or a
// partially hashed identity behind.

use tracing::{debug, instrument};

use ttevents_core::error::{PluginError, Result};
use ttevents_core::{ArgumentBag, LogLevel, NormalizedIdentity, SdkConfig, SdkOptions, TypedEvent};
use ttevents_security::{PiiHasher, Sha256Hasher, is_valid_email, is_valid_event_name, is_valid_phone, sanitize};

use crate::builder::build_event;
use crate::resolve::{DEFAULT_TYPE_TAG, resolve_kind};

/// Option keys understood by at least one platform SDK.
const KNOWN_OPTIONS: &[&str] = &[
    "disableAutoStart",
    "disableAutoEvents",
    "disableInstallLogging",
    "disableLaunchLogging",
    "disableRetentionLogging",
    "enableAutoIapTrack",
    "disableAdvertiserIDCollection",
    "disableTracking",
    "disableAutomaticTracking",
    "disableInstallTracking",
    "disableLaunchTracking",
    "disableRetentionTracking",
    "disablePaymentTracking",
    "disableAppTrackingDialog",
    "disableSKAdNetworkSupport",
    "displayAtt",
    "accessToken",
];

/// Sanitizes, validates and converts the arguments of each bridge method.
#[derive(Debug, Clone, Default)]
pub struct EventArgumentProcessor<H = Sha256Hasher> {
    hasher: H,
}

impl EventArgumentProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: PiiHasher> EventArgumentProcessor<H> {
    /// Use a custom PII hasher.
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// `initialize`: app ids are required; debug flag, log level and
    /// option toggles are optional.
    #[instrument(skip_all)]
    pub fn initialize(&self, args: &ArgumentBag) -> Result<SdkConfig> {
        let app_id = required(args, "appId")?;
        let tiktok_id = required(args, "tiktokId")?;

        let debug_mode = args.opt_bool("isDebugMode").unwrap_or(false);
        let log_level = args.opt_str("logLevel").map(LogLevel::parse).unwrap_or_default();
        let options = parse_options(&args.bag_field("options")?);

        Ok(SdkConfig {
            app_id,
            tiktok_id,
            debug_mode,
            log_level,
            options,
        })
    }

    /// `identify`: sanitize the ids, validate then hash phone and email.
    ///
    /// Format checks run on the raw PII before any hashing, so an invalid
    /// email or phone aborts the call without the hasher ever seeing it.
    #[instrument(skip_all)]
    pub fn identify(&self, args: &ArgumentBag) -> Result<NormalizedIdentity> {
        let external_id = required(args, "externalId")?;
        let external_user_name = required(args, "externalUserName")?;

        let email = args.str_field("email")?.filter(|s| !s.is_empty());
        let phone = args.str_field("phoneNumber")?.filter(|s| !s.is_empty());

        if let Some(email) = email {
            if !is_valid_email(email) {
                return Err(PluginError::Format {
                    field: "email",
                    reason: "not a valid email address",
                });
            }
        }
        if let Some(phone) = phone {
            if !is_valid_phone(phone) {
                return Err(PluginError::Format {
                    field: "phoneNumber",
                    reason: "not a valid phone number",
                });
            }
        }

        Ok(NormalizedIdentity {
            external_id,
            external_user_name: Some(external_user_name),
            phone_hash: phone.map(|p| self.hasher.hash(p)),
            email_hash: email.map(|e| self.hasher.hash(e)),
        })
    }

    /// `sendEvent`: validate the name and type tag, then build the event.
    #[instrument(skip_all)]
    pub fn send_event(&self, args: &ArgumentBag) -> Result<TypedEvent> {
        let event_name = required(args, "event_name")?;
        if !is_valid_event_name(&event_name) {
            return Err(PluginError::Format {
                field: "event_name",
                reason: "use only letters, numbers, and underscore",
            });
        }

        let type_tag = sanitize(args.opt_str("event_type_name"))
            .unwrap_or_else(|| DEFAULT_TYPE_TAG.to_owned());
        if !is_valid_event_name(&type_tag) {
            return Err(PluginError::Format {
                field: "event_type_name",
                reason: "use only letters, numbers, and underscore",
            });
        }

        let event_id = sanitize(args.opt_str("event_id"));
        let parameters = args.bag_field("parameters")?;

        let kind = resolve_kind(&type_tag);
        debug!(
            event_name = %event_name,
            type_tag = %type_tag,
            kind = kind.vendor_name(),
            parameters = parameters.len(),
            "resolved event"
        );

        Ok(build_event(kind, &event_name, event_id, &parameters))
    }

    /// `startTrack`: tracking may only start on an explicit `true`.
    #[instrument(skip_all)]
    pub fn start_track(&self, args: &ArgumentBag) -> Result<()> {
        match args.bool_field("hasConsent")? {
            Some(true) => Ok(()),
            _ => Err(PluginError::ConsentRequired {
                reason: "user consent is required but not provided; call startTrack with \
                         'hasConsent: true' only after obtaining explicit user opt-in"
                    .into(),
                status: None,
            }),
        }
    }
}

/// Sanitized, non-empty string argument.
fn required(args: &ArgumentBag, key: &'static str) -> Result<String> {
    sanitize(args.str_field(key)?).ok_or(PluginError::InvalidArgument { field: key })
}

/// Read the initialization toggles. A toggle is on only for a literal
/// `true`; unknown keys are ignored.
fn parse_options(options: &ArgumentBag) -> SdkOptions {
    for (key, _) in options.iter() {
        if !KNOWN_OPTIONS.contains(&key.as_str()) {
            debug!(option = %key, "ignoring unknown SDK option");
        }
    }

    let on = |key: &str| options.opt_bool(key) == Some(true);

    SdkOptions {
        disable_auto_start: on("disableAutoStart"),
        disable_auto_events: on("disableAutoEvents"),
        disable_install_logging: on("disableInstallLogging"),
        disable_launch_logging: on("disableLaunchLogging"),
        disable_retention_logging: on("disableRetentionLogging"),
        enable_auto_iap_track: on("enableAutoIapTrack"),
        disable_advertiser_id_collection: on("disableAdvertiserIDCollection"),
        disable_tracking: on("disableTracking"),
        disable_automatic_tracking: on("disableAutomaticTracking"),
        disable_install_tracking: on("disableInstallTracking"),
        disable_launch_tracking: on("disableLaunchTracking"),
        disable_retention_tracking: on("disableRetentionTracking"),
        disable_payment_tracking: on("disablePaymentTracking"),
        disable_app_tracking_dialog: on("disableAppTrackingDialog"),
        disable_sk_ad_network_support: on("disableSKAdNetworkSupport"),
        display_att: options.opt_bool("displayAtt"),
        access_token: options
            .opt_str("accessToken")
            .filter(|t| !t.is_empty())
            .map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use serde_json::json;
    use ttevents_core::{EventKind, PluginError};

    fn bag(value: serde_json::Value) -> ArgumentBag {
        ArgumentBag::from_value(value).unwrap()
    }

    /// Records every input it is asked to hash.
    #[derive(Default)]
    struct RecordingHasher {
        seen: RefCell<Vec<String>>,
    }

    impl PiiHasher for &RecordingHasher {
        fn hash(&self, input: &str) -> String {
            self.seen.borrow_mut().push(input.to_owned());
            format!("hashed:{input}")
        }
    }

    // -- initialize --

    #[test]
    fn initialize_requires_both_ids() {
        let p = EventArgumentProcessor::new();
        let err = p.initialize(&bag(json!({"appId": "com.example"}))).unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument { field: "tiktokId" }));

        let err = p
            .initialize(&bag(json!({"appId": "  <> ", "tiktokId": "123"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument { field: "appId" }));
    }

    #[test]
    fn initialize_reads_optional_settings() {
        let p = EventArgumentProcessor::new();
        let config = p
            .initialize(&bag(json!({
                "appId": " com.example ",
                "tiktokId": "7123",
                "isDebugMode": true,
                "logLevel": "Debug",
                "options": {
                    "disableAutoStart": true,
                    "disableAutoEvents": false,
                    "enableAutoIapTrack": "true",
                    "displayAtt": false,
                    "accessToken": "tok",
                    "somethingNew": true,
                },
            })))
            .unwrap();

        assert_eq!(config.app_id, "com.example");
        assert_eq!(config.tiktok_id, "7123");
        assert!(config.debug_mode);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.options.disable_auto_start);
        assert!(!config.options.disable_auto_events);
        assert!(!config.options.enable_auto_iap_track);
        assert_eq!(config.options.display_att, Some(false));
        assert_eq!(config.options.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn initialize_defaults() {
        let p = EventArgumentProcessor::new();
        let config = p
            .initialize(&bag(json!({"appId": "a", "tiktokId": "b"})))
            .unwrap();
        assert!(!config.debug_mode);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.options, SdkOptions::default());
    }

    #[test]
    fn initialize_rejects_non_map_options() {
        let p = EventArgumentProcessor::new();
        let err = p
            .initialize(&bag(json!({"appId": "a", "tiktokId": "b", "options": "all"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::UnsupportedValue { field: "options", .. }));
    }

    // -- identify --

    #[test]
    fn identify_hashes_valid_pii() {
        let p = EventArgumentProcessor::new();
        let identity = p
            .identify(&bag(json!({
                "externalId": " user-1 ",
                "externalUserName": "<Jane>",
                "email": "jane@example.com",
                "phoneNumber": "+1 555 123 4567",
            })))
            .unwrap();

        assert_eq!(identity.external_id, "user-1");
        assert_eq!(identity.external_user_name.as_deref(), Some("Jane"));
        assert_eq!(identity.email_hash, ttevents_security::hash_pii(Some("jane@example.com")));
        assert_eq!(identity.phone_hash, ttevents_security::hash_pii(Some("+1 555 123 4567")));
    }

    #[test]
    fn identify_without_optional_pii() {
        let p = EventArgumentProcessor::new();
        let identity = p
            .identify(&bag(json!({"externalId": "u", "externalUserName": "n", "email": ""})))
            .unwrap();
        assert_eq!(identity.email_hash, None);
        assert_eq!(identity.phone_hash, None);
    }

    #[test]
    fn identify_requires_both_ids() {
        let p = EventArgumentProcessor::new();
        let err = p.identify(&bag(json!({"externalId": "u"}))).unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument { field: "externalUserName" }));

        let err = p
            .identify(&bag(json!({"externalId": " ", "externalUserName": "n"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument { field: "externalId" }));
    }

    #[test]
    fn invalid_email_is_rejected_before_hashing() {
        let hasher = RecordingHasher::default();
        let p = EventArgumentProcessor::with_hasher(&hasher);

        let err = p
            .identify(&bag(json!({
                "externalId": "u",
                "externalUserName": "n",
                "email": "not-an-email",
                "phoneNumber": "+1 555 123 4567",
            })))
            .unwrap_err();

        assert!(matches!(err, PluginError::Format { field: "email", .. }));
        assert!(hasher.seen.borrow().is_empty());
    }

    #[test]
    fn invalid_phone_is_rejected_before_hashing() {
        let hasher = RecordingHasher::default();
        let p = EventArgumentProcessor::with_hasher(&hasher);

        let err = p
            .identify(&bag(json!({
                "externalId": "u",
                "externalUserName": "n",
                "email": "jane@example.com",
                "phoneNumber": "call me",
            })))
            .unwrap_err();

        assert!(matches!(err, PluginError::Format { field: "phoneNumber", .. }));
        assert!(hasher.seen.borrow().is_empty());
    }

    #[test]
    fn identify_hashes_only_the_raw_pii() {
        let hasher = RecordingHasher::default();
        let p = EventArgumentProcessor::with_hasher(&hasher);

        let identity = p
            .identify(&bag(json!({
                "externalId": "u",
                "externalUserName": "n",
                "email": "jane@example.com",
            })))
            .unwrap();

        assert_eq!(*hasher.seen.borrow(), vec!["jane@example.com".to_owned()]);
        assert_eq!(identity.email_hash.as_deref(), Some("hashed:jane@example.com"));
    }

    #[test]
    fn identify_rejects_non_string_pii() {
        let p = EventArgumentProcessor::new();
        let err = p
            .identify(&bag(json!({"externalId": "u", "externalUserName": "n", "email": 5})))
            .unwrap_err();
        assert!(matches!(err, PluginError::UnsupportedValue { field: "email", .. }));
    }

    // -- sendEvent --

    #[test]
    fn send_event_round_trip_add_to_cart() {
        let p = EventArgumentProcessor::new();
        let event = p
            .send_event(&bag(json!({
                "event_name": "cart",
                "event_type_name": "Add_To_Cart",
                "parameters": {"content_id": "sku1", "price": "19.99", "quantity": 2},
            })))
            .unwrap();

        match event {
            TypedEvent::Contents(e) => {
                assert_eq!(e.kind, EventKind::AddToCart);
                let contents = e.contents.expect("contents block");
                assert_eq!(contents.content_id.as_deref(), Some("sku1"));
                assert!((contents.price.unwrap() - 19.99).abs() < 1e-9);
                assert_eq!(contents.quantity, Some(2));
            }
            other => panic!("expected contents event, got {other:?}"),
        }
    }

    #[test]
    fn bogus_type_falls_back_to_named_event() {
        let p = EventArgumentProcessor::new();
        let event = p
            .send_event(&bag(json!({
                "event_name": "valid_name",
                "event_type_name": "bogus",
                "event_id": "e-1",
            })))
            .unwrap();

        match event {
            TypedEvent::Base(e) => {
                assert_eq!(e.name, "valid_name");
                assert_eq!(e.id.as_deref(), Some("e-1"));
            }
            other => panic!("expected base event, got {other:?}"),
        }
    }

    #[test]
    fn missing_type_defaults_to_generic() {
        let p = EventArgumentProcessor::new();
        let event = p.send_event(&bag(json!({"event_name": "tap"}))).unwrap();
        assert_eq!(event.kind(), EventKind::None);
        assert_eq!(event.id(), None);
    }

    #[test]
    fn add_to_cart_without_parameters_has_no_contents() {
        let p = EventArgumentProcessor::new();
        let event = p
            .send_event(&bag(json!({
                "event_name": "cart",
                "event_type_name": "AddToCart",
                "parameters": {},
            })))
            .unwrap();

        match event {
            TypedEvent::Contents(e) => assert_eq!(e.contents, None),
            other => panic!("expected contents event, got {other:?}"),
        }
    }

    #[test]
    fn bad_event_name_is_a_format_error() {
        let p = EventArgumentProcessor::new();
        let err = p
            .send_event(&bag(json!({"event_name": "bad name!"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::Format { field: "event_name", .. }));
    }

    #[test]
    fn missing_event_name_is_invalid_argument() {
        let p = EventArgumentProcessor::new();
        let err = p
            .send_event(&bag(json!({"event_type_name": "Purchase"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument { field: "event_name" }));
    }

    #[test]
    fn type_tag_with_invalid_characters_is_rejected() {
        let p = EventArgumentProcessor::new();
        let err = p
            .send_event(&bag(json!({"event_name": "ok", "event_type_name": "add to cart"})))
            .unwrap_err();
        assert!(matches!(err, PluginError::Format { field: "event_type_name", .. }));
    }

    #[test]
    fn non_map_parameters_are_rejected() {
        let p = EventArgumentProcessor::new();
        let err = p
            .send_event(&bag(json!({"event_name": "ok", "parameters": [1, 2]})))
            .unwrap_err();
        assert!(matches!(err, PluginError::UnsupportedValue { field: "parameters", .. }));
    }

    // -- startTrack --

    #[test]
    fn start_track_requires_explicit_consent() {
        let p = EventArgumentProcessor::new();
        assert!(p.start_track(&bag(json!({"hasConsent": true}))).is_ok());

        for args in [json!({"hasConsent": false}), json!({}), json!({"hasConsent": null})] {
            let err = p.start_track(&bag(args)).unwrap_err();
            assert!(matches!(err, PluginError::ConsentRequired { status: None, .. }));
        }

        let err = p.start_track(&bag(json!({"hasConsent": "yes"}))).unwrap_err();
        assert!(matches!(err, PluginError::UnsupportedValue { field: "hasConsent", .. }));
    }
}
