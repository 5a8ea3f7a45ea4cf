// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Targets `aarch64-linux-android` / `armv7-linux-androideabi`. The Kotlin
// plugin class `com.example.tiktok_events_sdk.TikTokEventsBridge` calls
// `nativeInit` once from `onAttachedToEngine`, then forwards every method
// call to `nativeHandle` and decodes the JSON reply.
//
// Every vendor call runs inside a JNI local frame so references created
// while building events are released before returning to the JVM. A Java
// exception thrown by the SDK is cleared and surfaced as a vendor error.

#![cfg(target_os = "android")]

use std::sync::OnceLock;

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jstring};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, error, info};

use ttevents_core::error::{PluginError, Result};
use ttevents_core::{
    AuthorizationStatus, BaseEvent, BridgeConfig, ContentParams, ContentsEvent, EventKind,
    LogLevel, NormalizedIdentity, SdkConfig, SdkOptions, TypedEvent,
};

use crate::marshal;
use crate::traits::*;

// ---------------------------------------------------------------------------
// Vendor class names and signatures
// ---------------------------------------------------------------------------

const SDK_CLASS: &str = "com/tiktok/TikTokBusinessSdk";
const CONFIG_CLASS: &str = "com/tiktok/TikTokBusinessSdk$TTConfig";
const LOG_LEVEL_CLASS: &str = "com/tiktok/TikTokBusinessSdk$LogLevel";
const BASE_EVENT_CLASS: &str = "com/tiktok/appevents/base/TTBaseEvent";
const CURRENCY_CLASS: &str = "com/tiktok/appevents/contents/TTContentsEventConstants$Currency";
const CONTENT_PARAMS_CLASS: &str = "com/tiktok/appevents/contents/TTContentParams";

const CONFIG_SIG: &str = "()Lcom/tiktok/TikTokBusinessSdk$TTConfig;";
const CONFIG_STRING_SIG: &str = "(Ljava/lang/String;)Lcom/tiktok/TikTokBusinessSdk$TTConfig;";
const BASE_BUILDER_RET: &str = "Lcom/tiktok/appevents/base/TTBaseEvent$Builder;";
const CONTENTS_BUILDER_RET: &str = "Lcom/tiktok/appevents/contents/TTContentsEvent$Builder;";
const PARAMS_BUILDER_RET: &str = "Lcom/tiktok/appevents/contents/TTContentParams$Builder;";

// ---------------------------------------------------------------------------
// JNI bootstrap
// ---------------------------------------------------------------------------

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();
static APP_CONTEXT: OnceLock<GlobalRef> = OnceLock::new();

/// Map a JNI failure into a vendor error.
fn jni_err(context: &str, e: jni::errors::Error) -> PluginError {
    PluginError::Vendor(format!("{context}: {e}"))
}

/// Run `f` on an attached thread inside a fresh local frame, handing it the
/// application `Context` captured by `nativeInit`.
fn with_env<T>(
    what: &str,
    f: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
) -> Result<T> {
    let vm = JAVA_VM.get().ok_or(PluginError::PlatformUnavailable)?;
    let context = APP_CONTEXT.get().ok_or(PluginError::PlatformUnavailable)?;
    let mut env = vm
        .attach_current_thread_permanently()
        .map_err(|e| PluginError::Bridge(format!("failed to attach JNI thread: {e}")))?;

    env.with_local_frame(32, |env| f(env, context.as_obj()))
        .map_err(|e| {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_describe();
                let _ = env.exception_clear();
            }
            jni_err(what, e)
        })
}

/// Read a Java string argument. `null` reads as the empty string.
fn read_string(env: &mut JNIEnv, value: &JString) -> Result<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    env.get_string(value)
        .map(String::from)
        .map_err(|e| PluginError::Bridge(format!("failed to read Java string: {e}")))
}

fn reply_to_java(env: &mut JNIEnv, reply: String) -> jstring {
    match env.new_string(reply) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "failed to allocate reply string");
            std::ptr::null_mut()
        }
    }
}

/// `TikTokEventsBridge.nativeInit(Context, boolean, String): boolean`
///
/// Captures the VM and application context and installs the bridge
/// configuration. Returns `false` when the plugin was already configured.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_tiktok_1events_1sdk_TikTokEventsBridge_nativeInit<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
    debug_build: jboolean,
    log_level: JString<'local>,
) -> jboolean {
    match env.get_java_vm() {
        Ok(vm) => {
            let _ = JAVA_VM.set(vm);
        }
        Err(e) => {
            error!(error = %e, "nativeInit: no JavaVM available");
            return JNI_FALSE;
        }
    }
    match env.new_global_ref(&context) {
        Ok(global) => {
            let _ = APP_CONTEXT.set(global);
        }
        Err(e) => {
            error!(error = %e, "nativeInit: failed to pin application context");
            return JNI_FALSE;
        }
    }

    let log_level = read_string(&mut env, &log_level)
        .map(|name| LogLevel::parse(&name))
        .unwrap_or_default();
    let config = BridgeConfig {
        debug_build: debug_build != JNI_FALSE,
        log_level,
    };

    if marshal::configure(config) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// `TikTokEventsBridge.nativeHandle(String method, String argsJson): String`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_tiktok_1events_1sdk_TikTokEventsBridge_nativeHandle<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JString<'local>,
    args_json: JString<'local>,
) -> jstring {
    let plugin = marshal::global_plugin();
    let decoded = read_string(&mut env, &method)
        .and_then(|m| Ok((m, read_string(&mut env, &args_json)?)));

    let reply = match decoded {
        Ok((method, args)) => marshal::handle_json(plugin, &method, &args),
        Err(err) => marshal::encode_reply(&crate::reply::BridgeReply::Error {
            error: plugin.policy().reply(None, &err),
        }),
    };
    reply_to_java(&mut env, reply)
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation backed by `com.tiktok.TikTokBusinessSdk`.
///
/// Zero-sized; the VM and context live in process statics set by
/// `nativeInit`.
pub struct AndroidBridge;

impl AndroidBridge {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// VendorSdk: TikTokBusinessSdk
// ---------------------------------------------------------------------------

impl VendorSdk for AndroidBridge {
    fn initialize(&self, config: &SdkConfig) -> Result<()> {
        with_env("initializeSdk", |env, context| {
            let tt_config = new_config(env, context, config)?;
            env.call_static_method(
                SDK_CLASS,
                "initializeSdk",
                "(Lcom/tiktok/TikTokBusinessSdk$TTConfig;)V",
                &[JValue::Object(&tt_config)],
            )?;
            Ok(())
        })?;
        info!("Android: TikTokBusinessSdk initialized");
        Ok(())
    }

    fn identify(&self, identity: &NormalizedIdentity) -> Result<()> {
        with_env("identify", |env, _| {
            let external_id = nullable_string(env, Some(&identity.external_id))?;
            let user_name = nullable_string(env, identity.external_user_name.as_deref())?;
            let phone = nullable_string(env, identity.phone_hash.as_deref())?;
            let email = nullable_string(env, identity.email_hash.as_deref())?;
            env.call_static_method(
                SDK_CLASS,
                "identify",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V",
                &[
                    JValue::Object(&external_id),
                    JValue::Object(&user_name),
                    JValue::Object(&phone),
                    JValue::Object(&email),
                ],
            )?;
            Ok(())
        })
    }

    fn track(&self, event: &TypedEvent) -> Result<()> {
        match event {
            TypedEvent::Base(base) => with_env("trackTTEvent", |env, _| {
                let built = build_base_event(env, base)?;
                track_built(env, &built)
            })?,
            TypedEvent::Contents(contents) => {
                let class = contents_class(contents.kind)?;
                with_env("trackTTEvent", |env, _| {
                    let built = build_contents_event(env, contents, class)?;
                    track_built(env, &built)
                })?
            }
        }
        debug!(event = event.label(), "Android: event handed to SDK");
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        with_env("logout", |env, _| {
            env.call_static_method(SDK_CLASS, "logout", "()V", &[])?;
            Ok(())
        })
    }

    fn start_track(&self) -> Result<()> {
        with_env("startTrack", |env, _| {
            env.call_static_method(SDK_CLASS, "startTrack", "()V", &[])?;
            Ok(())
        })
    }
}

impl ConsentGate for AndroidBridge {
    /// Android has no OS-level tracking prompt; the host's `hasConsent`
    /// flag is the only gate.
    fn tracking_authorization(&self) -> Result<AuthorizationStatus> {
        Ok(AuthorizationStatus::Authorized)
    }
}

// ---------------------------------------------------------------------------
// TTConfig
// ---------------------------------------------------------------------------

fn new_config<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
    config: &SdkConfig,
) -> jni::errors::Result<JObject<'local>> {
    let tt_config = match config.options.access_token.as_deref() {
        Some(token) => {
            let token = env.new_string(token)?;
            env.new_object(
                CONFIG_CLASS,
                "(Landroid/content/Context;Ljava/lang/String;)V",
                &[JValue::Object(context), JValue::Object(&token)],
            )?
        }
        None => env.new_object(
            CONFIG_CLASS,
            "(Landroid/content/Context;)V",
            &[JValue::Object(context)],
        )?,
    };

    let app_id = env.new_string(&config.app_id)?;
    env.call_method(&tt_config, "setAppId", CONFIG_STRING_SIG, &[JValue::Object(&app_id)])?;
    let tiktok_id = env.new_string(&config.tiktok_id)?;
    env.call_method(&tt_config, "setTTAppId", CONFIG_STRING_SIG, &[JValue::Object(&tiktok_id)])?;

    let level = env
        .get_static_field(
            LOG_LEVEL_CLASS,
            log_level_field(config.log_level),
            "Lcom/tiktok/TikTokBusinessSdk$LogLevel;",
        )?
        .l()?;
    env.call_method(
        &tt_config,
        "setLogLevel",
        "(Lcom/tiktok/TikTokBusinessSdk$LogLevel;)Lcom/tiktok/TikTokBusinessSdk$TTConfig;",
        &[JValue::Object(&level)],
    )?;

    for method in enabled_toggles(&config.options) {
        env.call_method(&tt_config, method, CONFIG_SIG, &[])?;
    }

    if config.debug_mode {
        env.call_method(&tt_config, "openDebugMode", CONFIG_SIG, &[])?;
    }

    Ok(tt_config)
}

/// `TikTokBusinessSdk.LogLevel` constant for `level`. The Android SDK has
/// no verbose level; it maps to `DEBUG`.
fn log_level_field(level: LogLevel) -> &'static str {
    match level {
        LogLevel::None => "NONE",
        LogLevel::Info => "INFO",
        LogLevel::Warn => "WARN",
        LogLevel::Debug | LogLevel::Verbose => "DEBUG",
    }
}

/// `TTConfig` methods to call for the toggles set in `options`.
fn enabled_toggles(options: &SdkOptions) -> impl Iterator<Item = &'static str> {
    [
        (options.disable_auto_start, "disableAutoStart"),
        (options.disable_auto_events, "disableAutoEvents"),
        (options.disable_install_logging, "disableInstallLogging"),
        (options.disable_launch_logging, "disableLaunchLogging"),
        (options.disable_retention_logging, "disableRetentionLogging"),
        (options.enable_auto_iap_track, "enableAutoIapTrack"),
        (options.disable_advertiser_id_collection, "disableAdvertiserIDCollection"),
    ]
    .into_iter()
    .filter_map(|(enabled, method)| enabled.then_some(method))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn nullable_string<'local>(
    env: &mut JNIEnv<'local>,
    value: Option<&str>,
) -> jni::errors::Result<JObject<'local>> {
    match value {
        Some(s) => Ok(JObject::from(env.new_string(s)?)),
        None => Ok(JObject::null()),
    }
}

fn build_base_event<'local>(
    env: &mut JNIEnv<'local>,
    event: &BaseEvent,
) -> jni::errors::Result<JObject<'local>> {
    let name = env.new_string(&event.name)?;
    let builder = match event.id.as_deref() {
        Some(id) => {
            let id = env.new_string(id)?;
            env.call_static_method(
                BASE_EVENT_CLASS,
                "newBuilder",
                format!("(Ljava/lang/String;Ljava/lang/String;){BASE_BUILDER_RET}"),
                &[JValue::Object(&name), JValue::Object(&id)],
            )?
        }
        None => env.call_static_method(
            BASE_EVENT_CLASS,
            "newBuilder",
            format!("(Ljava/lang/String;){BASE_BUILDER_RET}"),
            &[JValue::Object(&name)],
        )?,
    }
    .l()?;

    for (key, value) in &event.properties {
        let key = env.new_string(key)?;
        let value = env.new_string(value)?;
        env.call_method(
            &builder,
            "addProperty",
            format!("(Ljava/lang/String;Ljava/lang/Object;){BASE_BUILDER_RET}"),
            &[JValue::Object(&key), JValue::Object(&value)],
        )?;
    }

    env.call_method(&builder, "build", "()Lcom/tiktok/appevents/base/TTBaseEvent;", &[])?
        .l()
}

/// Java class providing the static `newBuilder` for a commerce kind.
fn track_built(env: &mut JNIEnv, built: &JObject) -> jni::errors::Result<()> {
    env.call_static_method(
        SDK_CLASS,
        "trackTTEvent",
        "(Lcom/tiktok/appevents/base/TTBaseEvent;)V",
        &[JValue::Object(built)],
    )?;
    Ok(())
}

/// SDK class for a commerce event kind. Generic events have no contents
/// class and are rejected.
fn contents_class(kind: EventKind) -> Result<&'static str> {
    match kind {
        EventKind::AddToCart => Ok("com/tiktok/appevents/contents/TTAddToCartEvent"),
        EventKind::AddToWishlist => Ok("com/tiktok/appevents/contents/TTAddToWishlistEvent"),
        EventKind::Checkout => Ok("com/tiktok/appevents/contents/TTCheckoutEvent"),
        EventKind::Purchase => Ok("com/tiktok/appevents/contents/TTPurchaseEvent"),
        EventKind::ViewContent => Ok("com/tiktok/appevents/contents/TTViewContentEvent"),
        EventKind::None => Err(PluginError::Bridge(
            "generic events cannot be sent as contents events".to_owned(),
        )),
    }
}

fn build_contents_event<'local>(
    env: &mut JNIEnv<'local>,
    event: &ContentsEvent,
    class: &'static str,
) -> jni::errors::Result<JObject<'local>> {
    let builder = match event.id.as_deref() {
        Some(id) => {
            let id = env.new_string(id)?;
            env.call_static_method(
                class,
                "newBuilder",
                format!("(Ljava/lang/String;){CONTENTS_BUILDER_RET}"),
                &[JValue::Object(&id)],
            )?
        }
        None => env.call_static_method(class, "newBuilder", format!("(){CONTENTS_BUILDER_RET}"), &[])?,
    }
    .l()?;

    if let Some(description) = event.description.as_deref() {
        let description = env.new_string(description)?;
        env.call_method(
            &builder,
            "setDescription",
            format!("(Ljava/lang/String;){CONTENTS_BUILDER_RET}"),
            &[JValue::Object(&description)],
        )?;
    }
    if let Some(currency) = event.currency {
        let code = env.new_string(currency.code())?;
        let currency = env
            .call_static_method(
                CURRENCY_CLASS,
                "valueOf",
                format!("(Ljava/lang/String;)L{CURRENCY_CLASS};"),
                &[JValue::Object(&code)],
            )?
            .l()?;
        env.call_method(
            &builder,
            "setCurrency",
            format!("(L{CURRENCY_CLASS};){CONTENTS_BUILDER_RET}"),
            &[JValue::Object(&currency)],
        )?;
    }
    if let Some(value) = event.value {
        env.call_method(
            &builder,
            "setValue",
            format!("(D){CONTENTS_BUILDER_RET}"),
            &[JValue::Double(value)],
        )?;
    }
    if let Some(content_type) = event.content_type.as_deref() {
        let content_type = env.new_string(content_type)?;
        env.call_method(
            &builder,
            "setContentType",
            format!("(Ljava/lang/String;){CONTENTS_BUILDER_RET}"),
            &[JValue::Object(&content_type)],
        )?;
    }
    if let Some(contents) = &event.contents {
        let params = build_content_params(env, contents)?;
        let array = env.new_object_array(1, CONTENT_PARAMS_CLASS, &params)?;
        env.call_method(
            &builder,
            "setContents",
            format!("([L{CONTENT_PARAMS_CLASS};){CONTENTS_BUILDER_RET}"),
            &[JValue::Object(&array)],
        )?;
    }

    env.call_method(&builder, "build", "()Lcom/tiktok/appevents/base/TTBaseEvent;", &[])?
        .l()
}

fn build_content_params<'local>(
    env: &mut JNIEnv<'local>,
    params: &ContentParams,
) -> jni::errors::Result<JObject<'local>> {
    let builder = env
        .call_static_method(CONTENT_PARAMS_CLASS, "newBuilder", format!("(){PARAMS_BUILDER_RET}"), &[])?
        .l()?;

    let text_fields = [
        ("setContentId", params.content_id.as_deref()),
        ("setContentCategory", params.content_category.as_deref()),
        ("setContentName", params.content_name.as_deref()),
        ("setBrand", params.brand.as_deref()),
    ];
    for (setter, value) in text_fields {
        if let Some(value) = value {
            let value = env.new_string(value)?;
            env.call_method(
                &builder,
                setter,
                format!("(Ljava/lang/String;){PARAMS_BUILDER_RET}"),
                &[JValue::Object(&value)],
            )?;
        }
    }
    if let Some(price) = params.price {
        env.call_method(
            &builder,
            "setPrice",
            format!("(F){PARAMS_BUILDER_RET}"),
            &[JValue::Float(price as f32)],
        )?;
    }
    if let Some(quantity) = params.quantity {
        env.call_method(
            &builder,
            "setQuantity",
            format!("(I){PARAMS_BUILDER_RET}"),
            &[JValue::Int(clamp_quantity(quantity))],
        )?;
    }

    env.call_method(&builder, "build", format!("()L{CONTENT_PARAMS_CLASS};"), &[])?
        .l()
}

/// The Android SDK takes quantities as a Java `int`.
fn clamp_quantity(quantity: i64) -> i32 {
    quantity.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
