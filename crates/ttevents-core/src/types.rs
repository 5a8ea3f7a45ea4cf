// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: methods, identities and typed analytics events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::currency::Currency;

/// Methods the host can invoke over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodName {
    Initialize,
    Identify,
    SendEvent,
    Logout,
    StartTrack,
}

impl MethodName {
    pub const ALL: [MethodName; 5] = [
        Self::Initialize,
        Self::Identify,
        Self::SendEvent,
        Self::Logout,
        Self::StartTrack,
    ];

    /// Wire name used on the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Identify => "identify",
            Self::SendEvent => "sendEvent",
            Self::Logout => "logout",
            Self::StartTrack => "startTrack",
        }
    }

    /// Exact, case-sensitive lookup of a wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl std::fmt::Display for MethodName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User identity after sanitization and PII hashing.
///
/// Raw phone numbers and email addresses never reach this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    pub external_id: String,
    pub external_user_name: Option<String>,
    /// Lowercase hex SHA-256 of the validated phone number.
    pub phone_hash: Option<String>,
    /// Lowercase hex SHA-256 of the validated email address.
    pub email_hash: Option<String>,
}

/// Platform tracking-authorization state (ATT on iOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthorizationStatus {
    /// Map the platform's raw status value. Unknown values are treated as
    /// not determined.
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Self::Restricted,
            2 => Self::Denied,
            3 => Self::Authorized,
            _ => Self::NotDetermined,
        }
    }

    pub fn raw_value(&self) -> u64 {
        match self {
            Self::NotDetermined => 0,
            Self::Restricted => 1,
            Self::Denied => 2,
            Self::Authorized => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NotDetermined => "ATT permission has not been requested yet",
            Self::Restricted => {
                "ATT permission is restricted by parental controls or device management"
            }
            Self::Denied => "User has denied ATT permission",
            Self::Authorized => "ATT permission is authorized",
        }
    }
}

/// Which vendor event an invocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Generic named event.
    None,
    AddToCart,
    AddToWishlist,
    Checkout,
    Purchase,
    ViewContent,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        Self::None,
        Self::AddToCart,
        Self::AddToWishlist,
        Self::Checkout,
        Self::Purchase,
        Self::ViewContent,
    ];

    /// Vendor-side event tag.
    pub fn vendor_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::AddToCart => "AddToCart",
            Self::AddToWishlist => "AddToWishlist",
            Self::Checkout => "Checkout",
            Self::Purchase => "Purchase",
            Self::ViewContent => "ViewContent",
        }
    }

    /// Commerce variants carry a contents payload instead of free-form
    /// properties.
    pub fn is_contents(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Commerce item attached to a contents event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentParams {
    pub content_id: Option<String>,
    pub content_category: Option<String>,
    pub content_name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

impl ContentParams {
    /// No field was populated.
    pub fn is_empty(&self) -> bool {
        self.content_id.is_none()
            && self.content_category.is_none()
            && self.content_name.is_none()
            && self.brand.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }
}

/// Generic named event with string properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEvent {
    pub name: String,
    /// `None` lets the vendor SDK generate its own id.
    pub id: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// One of the five commerce events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsEvent {
    pub kind: EventKind,
    pub id: Option<String>,
    pub description: Option<String>,
    pub currency: Option<Currency>,
    pub value: Option<f64>,
    pub content_type: Option<String>,
    /// Never `Some` of an empty block.
    pub contents: Option<ContentParams>,
}

impl ContentsEvent {
    pub fn new(kind: EventKind, id: Option<String>) -> Self {
        Self {
            kind,
            id,
            description: None,
            currency: None,
            value: None,
            content_type: None,
            contents: None,
        }
    }
}

/// Event ready to hand to the vendor SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedEvent {
    Base(BaseEvent),
    Contents(ContentsEvent),
}

impl TypedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Base(_) => EventKind::None,
            Self::Contents(e) => e.kind,
        }
    }

    /// Short label for logs and success replies: the event name for
    /// generic events, the vendor tag for commerce events.
    pub fn label(&self) -> &str {
        match self {
            Self::Base(e) => &e.name,
            Self::Contents(e) => e.kind.vendor_name(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Base(e) => e.id.as_deref(),
            Self::Contents(e) => e.id.as_deref(),
        }
    }
}
