// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform bridge via objc2.
//
// Requires the TikTokBusinessSDK framework to be linked into the host app.
// Vendor classes are looked up at runtime, so a missing framework surfaces
// as a configuration error rather than a link failure. The Swift plugin
// class forwards each method call to `ttevents_handle_method_call` and
// releases the reply with `ttevents_free_string`.
//
// The SDK's event setters vary between releases. Setters the linked class
// does not respond to fall back to `addPropertyWithKey:value:`.

#![cfg(target_os = "ios")]

use std::ffi::{CStr, CString, c_char};

use objc2::rc::{Allocated, Retained};
use objc2::runtime::{AnyClass, AnyObject, Bool, MessageReceiver, Sel};
use objc2::{msg_send, sel};
use objc2_foundation::{NSArray, NSNumber, NSString};
use tracing::{debug, error, info};

use ttevents_core::error::{PluginError, Result};
use ttevents_core::{
    AuthorizationStatus, BaseEvent, BridgeConfig, ContentParams, ContentsEvent, EventKind,
    LogLevel, NormalizedIdentity, SdkConfig, SdkOptions, TypedEvent,
};

use crate::marshal;
use crate::traits::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a vendor class linked into the app.
fn class(name: &CStr) -> Result<&'static AnyClass> {
    AnyClass::get(name).ok_or_else(|| {
        PluginError::ConfigurationFatal(format!(
            "{} is not available; is TikTokBusinessSDK linked?",
            name.to_string_lossy()
        ))
    })
}

fn responds_to(object: &AnyObject, selector: Sel) -> bool {
    object.class().responds_to(selector)
}

/// `-[TikTokBaseEvent addPropertyWithKey:value:]`
fn add_property(event: &AnyObject, key: &str, value: &AnyObject) {
    let key = NSString::from_str(key);
    // SAFETY: every TikTok event class inherits addPropertyWithKey:value:
    // from TikTokBaseEvent; both arguments are valid objects.
    unsafe {
        let _: () = msg_send![event, addPropertyWithKey: &*key, value: value];
    }
}

/// Call a one-argument string setter, or record the value as a property
/// when the linked SDK lacks the setter.
fn set_text(event: &AnyObject, setter: Sel, key: &str, value: &str) {
    let value = NSString::from_str(value);
    if responds_to(event, setter) {
        // SAFETY: the receiver responds to `setter`, which takes one object
        // argument and returns void.
        unsafe {
            let _: () = MessageReceiver::send_message(event, setter, (&*value,));
        }
    } else {
        add_property(event, key, &value);
    }
}

/// Decimal rendering the SDK expects for `setValue:`; integral values keep
/// a trailing `.0`.
fn decimal_string(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Raw `TikTokLogLevel` value for `level`.
fn log_level_raw(level: LogLevel) -> usize {
    match level {
        LogLevel::Verbose => 1,
        LogLevel::Debug => 2,
        LogLevel::Info => 3,
        LogLevel::Warn => 4,
        LogLevel::None => 7,
    }
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// iOS implementation backed by `TikTokBusiness`.
pub struct IosBridge;

impl IosBridge {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IosBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for IosBridge {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

// ---------------------------------------------------------------------------
// VendorSdk: TikTokBusiness
// ---------------------------------------------------------------------------

impl VendorSdk for IosBridge {
    fn initialize(&self, config: &SdkConfig) -> Result<()> {
        let tt_config = new_config(config)?;
        let business = class(c"TikTokBusiness")?;
        // SAFETY: +[TikTokBusiness initializeSdk:] takes a TikTokConfig.
        unsafe {
            let _: () = msg_send![business, initializeSdk: &*tt_config];
        }
        info!("iOS: TikTokBusiness initialized");
        Ok(())
    }

    fn identify(&self, identity: &NormalizedIdentity) -> Result<()> {
        let business = class(c"TikTokBusiness")?;
        let external_id = NSString::from_str(&identity.external_id);
        let user_name = identity.external_user_name.as_deref().map(NSString::from_str);
        let phone = identity.phone_hash.as_deref().map(NSString::from_str);
        let email = identity.email_hash.as_deref().map(NSString::from_str);
        // SAFETY: all four parameters are nullable NSStrings except the id.
        unsafe {
            let _: () = msg_send![
                business,
                identifyWithExternalID: &*external_id,
                externalUserName: user_name.as_deref(),
                phoneNumber: phone.as_deref(),
                email: email.as_deref()
            ];
        }
        Ok(())
    }

    fn track(&self, event: &TypedEvent) -> Result<()> {
        let built = match event {
            TypedEvent::Base(base) => build_base_event(base)?,
            TypedEvent::Contents(contents) => build_contents_event(contents)?,
        };
        let business = class(c"TikTokBusiness")?;
        // SAFETY: every built event is a TikTokBaseEvent subclass.
        unsafe {
            let _: () = msg_send![business, trackTTEvent: &*built];
        }
        debug!(event = event.label(), "iOS: event handed to SDK");
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        let business = class(c"TikTokBusiness")?;
        // SAFETY: +[TikTokBusiness logout] takes no arguments.
        unsafe {
            let _: () = msg_send![business, logout];
        }
        Ok(())
    }

    fn start_track(&self) -> Result<()> {
        let business = class(c"TikTokBusiness")?;
        // SAFETY: +[TikTokBusiness setTrackingEnabled:] takes a BOOL.
        unsafe {
            let _: () = msg_send![business, setTrackingEnabled: Bool::YES];
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConsentGate: ATTrackingManager
// ---------------------------------------------------------------------------

impl ConsentGate for IosBridge {
    /// `ATTrackingManager.trackingAuthorizationStatus`. Systems without
    /// AppTrackingTransparency (before iOS 14) have no prompt and report
    /// `Authorized`.
    fn tracking_authorization(&self) -> Result<AuthorizationStatus> {
        let Some(manager) = AnyClass::get(c"ATTrackingManager") else {
            return Ok(AuthorizationStatus::Authorized);
        };
        // SAFETY: class property returning an NSUInteger-backed enum.
        let raw: usize = unsafe { msg_send![manager, trackingAuthorizationStatus] };
        Ok(AuthorizationStatus::from_raw(raw as u64))
    }
}

// ---------------------------------------------------------------------------
// TikTokConfig
// ---------------------------------------------------------------------------

fn new_config(config: &SdkConfig) -> Result<Retained<AnyObject>> {
    let cls = class(c"TikTokConfig")?;
    let app_id = NSString::from_str(&config.app_id);
    let tiktok_id = NSString::from_str(&config.tiktok_id);

    // SAFETY: designated initializers of TikTokConfig; both return nil on
    // rejected identifiers.
    let tt_config: Option<Retained<AnyObject>> = unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        match config.options.access_token.as_deref() {
            Some(token) => {
                let token = NSString::from_str(token);
                msg_send![alloc, initWithAccessToken: &*token, appId: &*app_id, tiktokAppId: &*tiktok_id]
            }
            None => msg_send![alloc, initWithAppId: &*app_id, tiktokAppId: &*tiktok_id],
        }
    };
    let tt_config = tt_config
        .ok_or_else(|| PluginError::Vendor("TikTokConfig rejected the app identifiers".into()))?;

    for selector in enabled_toggles(&config.options) {
        // SAFETY: toggles are zero-argument void methods on TikTokConfig.
        unsafe {
            let _: () = MessageReceiver::send_message(&*tt_config, selector, ());
        }
    }

    // SAFETY: known TikTokConfig selectors.
    unsafe {
        if config.debug_mode {
            let _: () = msg_send![&*tt_config, enableDebugMode];
        }
        let _: () = msg_send![&*tt_config, setLogLevel: log_level_raw(config.log_level)];
    }

    Ok(tt_config)
}

/// `TikTokConfig` selectors to send for the toggles set in `options`.
/// ATT suppression via `displayAtt: false` also disables the dialog.
fn enabled_toggles(options: &SdkOptions) -> Vec<Sel> {
    [
        (options.disable_tracking, sel!(disableTracking)),
        (options.disable_automatic_tracking, sel!(disableAutomaticTracking)),
        (options.disable_install_tracking, sel!(disableInstallTracking)),
        (options.disable_launch_tracking, sel!(disableLaunchTracking)),
        (options.disable_retention_tracking, sel!(disableRetentionTracking)),
        (options.disable_payment_tracking, sel!(disablePaymentTracking)),
        (options.suppresses_att(), sel!(disableAppTrackingDialog)),
        (options.disable_sk_ad_network_support, sel!(disableSKAdNetworkSupport)),
    ]
    .into_iter()
    .filter_map(|(enabled, selector)| enabled.then_some(selector))
    .collect()
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn build_base_event(event: &BaseEvent) -> Result<Retained<AnyObject>> {
    let cls = class(c"TikTokBaseEvent")?;
    let name = NSString::from_str(&event.name);
    let id = event.id.as_deref().map(NSString::from_str);

    // SAFETY: -[TikTokBaseEvent initWithEventName:eventId:], id nullable.
    let built: Option<Retained<AnyObject>> = unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        msg_send![alloc, initWithEventName: &*name, eventId: id.as_deref()]
    };
    let built = built.ok_or_else(|| PluginError::Vendor("TikTokBaseEvent init returned nil".into()))?;

    for (key, value) in &event.properties {
        add_property(&built, key, &NSString::from_str(value));
    }
    Ok(built)
}

/// SDK class for a commerce event kind. Generic events have no contents
/// class and are rejected.
fn contents_class(kind: EventKind) -> Result<&'static CStr> {
    match kind {
        EventKind::AddToCart => Ok(c"TikTokAddToCartEvent"),
        EventKind::AddToWishlist => Ok(c"TikTokAddToWishlistEvent"),
        EventKind::Checkout => Ok(c"TikTokCheckoutEvent"),
        EventKind::Purchase => Ok(c"TikTokPurchaseEvent"),
        EventKind::ViewContent => Ok(c"TikTokViewContentEvent"),
        EventKind::None => Err(PluginError::Bridge(
            "generic events cannot be sent as contents events".to_owned(),
        )),
    }
}

fn build_contents_event(event: &ContentsEvent) -> Result<Retained<AnyObject>> {
    let cls = class(contents_class(event.kind)?)?;

    // SAFETY: contents event classes expose `init` and `initWithEventId:`.
    let built: Option<Retained<AnyObject>> = unsafe {
        let alloc: Allocated<AnyObject> = msg_send![cls, alloc];
        match event.id.as_deref() {
            Some(id) => {
                let id = NSString::from_str(id);
                msg_send![alloc, initWithEventId: &*id]
            }
            None => msg_send![alloc, init],
        }
    };
    let built = built.ok_or_else(|| {
        PluginError::Vendor(format!("{} init returned nil", event.kind.vendor_name()))
    })?;

    if let Some(description) = event.description.as_deref() {
        set_text(&built, sel!(setDescription:), "description", description);
    }
    if let Some(currency) = event.currency {
        set_text(&built, sel!(setCurrency:), "currency", currency.code());
    }
    if let Some(value) = event.value {
        set_text(&built, sel!(setValue:), "value", &decimal_string(value));
    }
    if let Some(content_type) = event.content_type.as_deref() {
        set_text(&built, sel!(setContentType:), "content_type", content_type);
    }
    if let Some(contents) = &event.contents {
        attach_contents(&built, contents)?;
    }
    Ok(built)
}

fn attach_contents(event: &AnyObject, contents: &ContentParams) -> Result<()> {
    if !responds_to(event, sel!(setContents:)) {
        add_contents_as_properties(event, contents);
        return Ok(());
    }

    let params = new_content_params(contents)?;
    let array = NSArray::from_retained_slice(&[params]);
    // SAFETY: setContents: takes an NSArray<TikTokContentParams *>.
    unsafe {
        let _: () = msg_send![event, setContents: &*array];
    }
    Ok(())
}

fn new_content_params(contents: &ContentParams) -> Result<Retained<AnyObject>> {
    let cls = class(c"TikTokContentParams")?;
    // SAFETY: plain NSObject subclass.
    let params: Option<Retained<AnyObject>> = unsafe { msg_send![cls, new] };
    let params =
        params.ok_or_else(|| PluginError::Vendor("TikTokContentParams init returned nil".into()))?;

    let text_fields = [
        (sel!(setContentId:), contents.content_id.as_deref()),
        (sel!(setContentCategory:), contents.content_category.as_deref()),
        (sel!(setContentName:), contents.content_name.as_deref()),
        (sel!(setBrand:), contents.brand.as_deref()),
    ];
    for (setter, value) in text_fields {
        if let Some(value) = value {
            let value = NSString::from_str(value);
            // SAFETY: string properties of TikTokContentParams.
            unsafe {
                let _: () = MessageReceiver::send_message(&*params, setter, (&*value,));
            }
        }
    }

    // SAFETY: `price` is an NSNumber property, `quantity` an NSInteger.
    unsafe {
        if let Some(price) = contents.price {
            let price = NSNumber::new_f64(price);
            let _: () = msg_send![&*params, setPrice: &*price];
        }
        if let Some(quantity) = contents.quantity {
            let quantity = isize::try_from(quantity).unwrap_or(if quantity < 0 {
                isize::MIN
            } else {
                isize::MAX
            });
            let _: () = msg_send![&*params, setQuantity: quantity];
        }
    }
    Ok(params)
}

fn add_contents_as_properties(event: &AnyObject, contents: &ContentParams) {
    let text_fields = [
        ("content_id", contents.content_id.as_deref()),
        ("content_category", contents.content_category.as_deref()),
        ("content_name", contents.content_name.as_deref()),
        ("brand", contents.brand.as_deref()),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            add_property(event, key, &NSString::from_str(value));
        }
    }
    if let Some(price) = contents.price {
        add_property(event, "price", &NSNumber::new_f64(price));
    }
    if let Some(quantity) = contents.quantity {
        add_property(event, "quantity", &NSNumber::new_i64(quantity));
    }
}

// ---------------------------------------------------------------------------
// C ABI for the Swift plugin class
// ---------------------------------------------------------------------------

/// Read a C string argument. `NULL` reads as the empty string.
///
/// # Safety
/// `ptr` must be `NULL` or a valid NUL-terminated string.
unsafe fn read_c_str(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    // SAFETY: guaranteed by the caller.
    let s = unsafe { CStr::from_ptr(ptr) };
    s.to_str()
        .map(str::to_owned)
        .map_err(|e| PluginError::Bridge(format!("argument is not valid UTF-8: {e}")))
}

fn into_c_string(reply: String) -> *mut c_char {
    match CString::new(reply) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "reply contained an interior NUL");
            std::ptr::null_mut()
        }
    }
}

/// Install the bridge configuration. Returns `false` when the plugin was
/// already configured.
///
/// # Safety
/// `log_level` must be `NULL` or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ttevents_configure(debug_build: bool, log_level: *const c_char) -> bool {
    // SAFETY: forwarded from the caller's contract.
    let log_level = unsafe { read_c_str(log_level) }
        .map(|name| LogLevel::parse(&name))
        .unwrap_or_default();
    marshal::configure(BridgeConfig {
        debug_build,
        log_level,
    })
}

/// Handle one method call and return a JSON reply owned by Rust. Release it
/// with [`ttevents_free_string`].
///
/// # Safety
/// Both pointers must be `NULL` or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ttevents_handle_method_call(
    method: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    let plugin = marshal::global_plugin();
    // SAFETY: forwarded from the caller's contract.
    let decoded = unsafe { read_c_str(method).and_then(|m| Ok((m, read_c_str(args_json)?))) };

    let reply = match decoded {
        Ok((method, args)) => marshal::handle_json(plugin, &method, &args),
        Err(err) => marshal::encode_reply(&crate::reply::BridgeReply::Error {
            error: plugin.policy().reply(None, &err),
        }),
    };
    into_c_string(reply)
}

/// Free a string returned by [`ttevents_handle_method_call`].
///
/// # Safety
/// `ptr` must be `NULL` or a pointer previously returned by this library,
/// freed at most once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ttevents_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: the pointer came from `CString::into_raw`.
        drop(unsafe { CString::from_raw(ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_name() {
        assert_eq!(IosBridge::new().platform_name(), "iOS");
    }

    #[test]
    fn values_render_with_a_decimal_point() {
        assert_eq!(decimal_string(10.0), "10.0");
        assert_eq!(decimal_string(19.99), "19.99");
    }

    #[test]
    fn log_levels_map_to_sdk_values() {
        assert_eq!(log_level_raw(LogLevel::None), 7);
        assert_eq!(log_level_raw(LogLevel::Verbose), 1);
    }

    #[test]
    fn att_suppression_disables_the_dialog() {
        let options = SdkOptions {
            display_att: Some(false),
            ..SdkOptions::default()
        };
        assert_eq!(enabled_toggles(&options), vec![sel!(disableAppTrackingDialog)]);
    }

    #[test]
    fn generic_kind_has_no_contents_class() {
        assert!(matches!(contents_class(EventKind::None), Err(PluginError::Bridge(_))));
        assert_eq!(contents_class(EventKind::Checkout).unwrap(), c"TikTokCheckoutEvent");
    }

    #[test]
    fn reply_strings_round_trip_through_c() {
        let ptr = into_c_string("{\"status\":\"ok\",\"value\":\"x\"}".to_owned());
        assert!(!ptr.is_null());
        let read = unsafe { read_c_str(ptr) }.unwrap();
        assert!(read.contains("\"ok\""));
        unsafe { ttevents_free_string(ptr) };
    }
}
