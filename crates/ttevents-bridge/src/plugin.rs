// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method dispatch: one entry point for every invocation arriving over the
// channel, shared by all platform adapters.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use ttevents_core::error::{PluginError, Result};
use ttevents_core::{ArgumentBag, AuthorizationStatus, BridgeConfig, MethodName, SdkConfig};
use ttevents_events::EventArgumentProcessor;

use crate::reply::{ErrorPolicy, ErrorReply};
use crate::traits::PlatformBridge;

/// Routes method invocations through the argument pipeline to the platform
/// bridge.
pub struct EventsPlugin {
    bridge: Arc<dyn PlatformBridge>,
    processor: EventArgumentProcessor,
    policy: ErrorPolicy,
}

impl EventsPlugin {
    /// Create a plugin. `config` is fixed for the plugin's lifetime.
    pub fn new(bridge: Arc<dyn PlatformBridge>, config: &BridgeConfig) -> Self {
        info!(
            platform = bridge.platform_name(),
            debug_build = config.debug_build,
            log_level = ?config.log_level,
            "events plugin created"
        );
        Self {
            bridge,
            processor: EventArgumentProcessor::new(),
            policy: ErrorPolicy::new(config),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    /// Handle one invocation. Returns the success string for the host, or
    /// the structured error shaped by the disclosure policy.
    pub fn handle(&self, method: &str, args: &ArgumentBag) -> std::result::Result<String, ErrorReply> {
        let invocation = Uuid::new_v4();
        let span = info_span!("invocation", %method, %invocation);
        let _guard = span.enter();

        let Some(name) = MethodName::from_wire(method) else {
            warn!("unknown method");
            return Err(self
                .policy
                .reply(None, &PluginError::NotImplemented(method.to_owned())));
        };

        self.dispatch(name, args).map_err(|err| {
            if err.is_validation() {
                warn!(error = %err, "invocation rejected");
            } else {
                error!(error = %err, "invocation failed");
            }
            self.policy.reply(Some(name), &err)
        })
    }

    fn dispatch(&self, method: MethodName, args: &ArgumentBag) -> Result<String> {
        match method {
            MethodName::Initialize => {
                let config = self.processor.initialize(args)?;
                if config.options.display_att == Some(false) {
                    warn_att_suppression(&config);
                }
                self.bridge.initialize(&config)?;
                info!(app_id = %config.app_id, "SDK initialized");
                Ok("TikTok SDK initialized!".to_owned())
            }
            MethodName::Identify => {
                let identity = self.processor.identify(args)?;
                self.bridge.identify(&identity)?;
                info!(
                    has_phone = identity.phone_hash.is_some(),
                    has_email = identity.email_hash.is_some(),
                    "user identified"
                );
                Ok("User identified successfully!".to_owned())
            }
            MethodName::SendEvent => {
                let event = self.processor.send_event(args)?;
                self.bridge.track(&event)?;
                info!(event = event.label(), kind = ?event.kind(), "event forwarded");
                Ok(format!("Event '{}' sent successfully!", event.label()))
            }
            MethodName::Logout => {
                self.bridge.logout()?;
                info!("logged out");
                Ok("TikTok SDK logout!".to_owned())
            }
            MethodName::StartTrack => {
                self.processor.start_track(args)?;
                let status = self.bridge.tracking_authorization()?;
                if status != AuthorizationStatus::Authorized {
                    return Err(PluginError::ConsentRequired {
                        reason: format!(
                            "ATT authorization is not granted (status: {})",
                            status.raw_value()
                        ),
                        status: Some(status),
                    });
                }
                self.bridge.start_track()?;
                info!("tracking started");
                Ok("TikTok Start Tracking!".to_owned())
            }
        }
    }
}

fn warn_att_suppression(config: &SdkConfig) {
    warn!(
        target: "ttevents::privacy",
        "ATT suppression enabled: the App Tracking Transparency dialog will not be shown; \
         ensure consent was obtained through other means before tracking"
    );
    if config.debug_mode && config.log_level.is_verbose() {
        debug!(
            target: "ttevents::privacy",
            "verify ATT suppression complies with App Store guidelines and GDPR/CCPA"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ttevents_core::{EventKind, LogLevel, TypedEvent};

    use crate::stub::{StubBridge, VendorCall};

    fn bag(value: serde_json::Value) -> ArgumentBag {
        ArgumentBag::from_value(value).unwrap()
    }

    fn plugin_with(stub: &Arc<StubBridge>) -> EventsPlugin {
        let config = BridgeConfig {
            debug_build: false,
            log_level: LogLevel::Info,
        };
        EventsPlugin::new(stub.clone(), &config)
    }

    fn calls(stub: &StubBridge) -> Vec<VendorCall> {
        stub.calls().into_iter().map(|c| c.call).collect()
    }

    #[test]
    fn initialize_forwards_config() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        let reply = plugin.handle(
            "initialize",
            &bag(json!({"appId": "com.example", "tiktokId": "7123", "options": {"displayAtt": false}})),
        );
        assert_eq!(reply.unwrap(), "TikTok SDK initialized!");

        match calls(&stub).as_slice() {
            [VendorCall::Initialize { config }] => {
                assert_eq!(config.app_id, "com.example");
                assert!(config.options.suppresses_att());
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn identify_forwards_only_hashes() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        plugin
            .handle(
                "identify",
                &bag(json!({
                    "externalId": "u1",
                    "externalUserName": "jane",
                    "email": "jane@example.com",
                })),
            )
            .unwrap();

        let recorded = serde_json::to_string(&stub.calls()).unwrap();
        assert!(!recorded.contains("jane@example.com"));
        match calls(&stub).as_slice() {
            [VendorCall::Identify { identity }] => {
                assert_eq!(identity.email_hash.as_ref().map(String::len), Some(64));
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn invalid_email_forwards_nothing() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        let err = plugin
            .handle(
                "identify",
                &bag(json!({"externalId": "u1", "externalUserName": "jane", "email": "not-an-email"})),
            )
            .unwrap_err();

        assert_eq!(err.code, "INVALID_FORMAT");
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn send_event_success_message_and_forwarding() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        let reply = plugin
            .handle(
                "sendEvent",
                &bag(json!({"event_name": "valid_name", "event_type_name": "bogus"})),
            )
            .unwrap();
        assert_eq!(reply, "Event 'valid_name' sent successfully!");

        match calls(&stub).as_slice() {
            [VendorCall::Track { event: TypedEvent::Base(e) }] => assert_eq!(e.name, "valid_name"),
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn send_event_commerce_kind() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        plugin
            .handle(
                "sendEvent",
                &bag(json!({
                    "event_name": "checkout",
                    "event_type_name": "check_out",
                    "parameters": {"currency": "EUR", "value": 10},
                })),
            )
            .unwrap();

        match calls(&stub).as_slice() {
            [VendorCall::Track { event }] => assert_eq!(event.kind(), EventKind::Checkout),
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn bad_event_name_is_rejected_before_tracking() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        let err = plugin
            .handle("sendEvent", &bag(json!({"event_name": "bad name!"})))
            .unwrap_err();
        assert_eq!(err.code, "INVALID_EVENT_NAME");
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn start_track_without_consent_never_enables_tracking() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        for args in [json!({"hasConsent": false}), json!({})] {
            let err = plugin.handle("startTrack", &bag(args)).unwrap_err();
            assert_eq!(err.code, "CONSENT_NOT_GRANTED");
            assert_eq!(err.details, None);
        }
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn start_track_respects_platform_gate() {
        let stub = Arc::new(StubBridge::with_authorization(AuthorizationStatus::Denied));
        let plugin = plugin_with(&stub);

        let err = plugin
            .handle("startTrack", &bag(json!({"hasConsent": true})))
            .unwrap_err();
        assert_eq!(err.code, "CONSENT_NOT_GRANTED");
        assert_eq!(err.details.unwrap()["status"], 2);
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn start_track_with_consent() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        let reply = plugin.handle("startTrack", &bag(json!({"hasConsent": true})));
        assert_eq!(reply.unwrap(), "TikTok Start Tracking!");
        assert_eq!(calls(&stub), vec![VendorCall::StartTrack]);
    }

    #[test]
    fn logout_and_unknown_methods() {
        let stub = Arc::new(StubBridge::new());
        let plugin = plugin_with(&stub);

        assert_eq!(plugin.handle("logout", &ArgumentBag::new()).unwrap(), "TikTok SDK logout!");
        let err = plugin.handle("sendCustomEvent", &ArgumentBag::new()).unwrap_err();
        assert_eq!(err.code, "NOT_IMPLEMENTED");
        assert_eq!(calls(&stub), vec![VendorCall::Logout]);
    }

    #[test]
    fn vendor_failures_use_generic_messages() {
        let stub = Arc::new(StubBridge::failing("native crash in TTConfig"));
        let plugin = plugin_with(&stub);

        let err = plugin.handle("logout", &ArgumentBag::new()).unwrap_err();
        assert_eq!(err.code, "LOGOUT_FAILED");
        assert_eq!(err.message, "An error occurred during logout.");
        assert_eq!(err.stack_trace, None);
    }
}
