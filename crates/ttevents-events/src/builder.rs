// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed event construction.
//
// Commerce events follow an omit-when-absent policy: a field that is
// missing or cannot be coerced is left unset, never filled with a
// placeholder.

use tracing::debug;

use ttevents_core::{ArgumentBag, BaseEvent, ContentParams, ContentsEvent, EventKind, TypedEvent};

use crate::capabilities::{EventField, supports};
use crate::coerce::{as_float, as_quantity, as_text, property_text};

// Parameter keys read from the bag for commerce events.
const KEY_DESCRIPTION: &str = "description";
const KEY_CURRENCY: &str = "currency";
const KEY_VALUE: &str = "value";
const KEY_CONTENT_TYPE: &str = "content_type";
const KEY_CONTENT_ID: &str = "content_id";
const KEY_CONTENT_CATEGORY: &str = "content_category";
const KEY_CONTENT_NAME: &str = "content_name";
const KEY_BRAND: &str = "brand";
const KEY_PRICE: &str = "price";
const KEY_QUANTITY: &str = "quantity";

/// Build the event for an already-resolved `kind`.
///
/// `event_name` names generic events and is ignored for commerce kinds.
pub fn build_event(
    kind: EventKind,
    event_name: &str,
    event_id: Option<String>,
    params: &ArgumentBag,
) -> TypedEvent {
    if kind.is_contents() {
        TypedEvent::Contents(build_contents_event(kind, event_id, params))
    } else {
        TypedEvent::Base(build_base_event(event_name, event_id, params))
    }
}

/// Generic named event. Every parameter becomes a string property.
pub fn build_base_event(name: &str, id: Option<String>, params: &ArgumentBag) -> BaseEvent {
    let properties = if supports(EventKind::None, EventField::Properties) {
        params
            .iter()
            .map(|(key, value)| (key.clone(), property_text(value)))
            .collect()
    } else {
        Default::default()
    };

    BaseEvent {
        name: name.to_owned(),
        id,
        properties,
    }
}

/// One of the five commerce events.
pub fn build_contents_event(kind: EventKind, id: Option<String>, params: &ArgumentBag) -> ContentsEvent {
    let mut event = ContentsEvent::new(kind, id);
    let field = |f: EventField| supports(kind, f);

    if field(EventField::Description) {
        event.description = params.get(KEY_DESCRIPTION).and_then(as_text);
    }
    if field(EventField::ContentType) {
        event.content_type = params.get(KEY_CONTENT_TYPE).and_then(as_text);
    }
    if field(EventField::Currency) {
        event.currency = params.opt_str(KEY_CURRENCY).and_then(|raw| match raw.parse() {
            Ok(currency) => Some(currency),
            Err(_) => {
                debug!(currency = raw, "unknown currency code, omitting");
                None
            }
        });
    }
    if field(EventField::Value) {
        event.value = params.get(KEY_VALUE).and_then(as_float);
    }
    if field(EventField::Contents) {
        event.contents = content_params(params);
    }

    event
}

/// Collect the commerce item fields. `None` when no field could be
/// populated, so an event never carries an empty block.
pub fn content_params(params: &ArgumentBag) -> Option<ContentParams> {
    let contents = ContentParams {
        content_id: params.get(KEY_CONTENT_ID).and_then(as_text),
        content_category: params.get(KEY_CONTENT_CATEGORY).and_then(as_text),
        content_name: params.get(KEY_CONTENT_NAME).and_then(as_text),
        brand: params.get(KEY_BRAND).and_then(as_text),
        price: params.get(KEY_PRICE).and_then(as_float),
        quantity: params.get(KEY_QUANTITY).and_then(as_quantity),
    };

    (!contents.is_empty()).then_some(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ttevents_core::Currency;

    fn bag(value: serde_json::Value) -> ArgumentBag {
        ArgumentBag::from_value(value).unwrap()
    }

    #[test]
    fn add_to_cart_with_string_price() {
        let params = bag(json!({"content_id": "sku1", "price": "19.99", "quantity": 2}));
        let event = build_contents_event(EventKind::AddToCart, None, &params);

        assert_eq!(event.kind, EventKind::AddToCart);
        let contents = event.contents.expect("contents block");
        assert_eq!(contents.content_id.as_deref(), Some("sku1"));
        assert!((contents.price.unwrap() - 19.99).abs() < 1e-9);
        assert_eq!(contents.quantity, Some(2));
    }

    #[test]
    fn empty_parameters_carry_no_contents() {
        let event = build_contents_event(EventKind::AddToCart, None, &ArgumentBag::new());
        assert_eq!(event.contents, None);
        assert_eq!(event.currency, None);
        assert_eq!(event.value, None);
    }

    #[test]
    fn missing_fields_are_not_defaulted() {
        let params = bag(json!({"brand": "acme"}));
        let contents = content_params(&params).unwrap();
        assert_eq!(contents.brand.as_deref(), Some("acme"));
        assert_eq!(contents.price, None);
        assert_eq!(contents.quantity, None);
        assert_eq!(contents.content_name, None);
        assert_eq!(contents.content_category, None);
    }

    #[test]
    fn uncoercible_item_fields_do_not_create_a_block() {
        let params = bag(json!({"price": "free", "quantity": "lots", "content_id": 7}));
        assert_eq!(content_params(&params), None);
    }

    #[test]
    fn top_level_commerce_fields() {
        let params = bag(json!({
            "currency": "USD",
            "value": "42.5",
            "description": "summer sale",
            "content_type": "product",
        }));
        let event = build_contents_event(EventKind::Purchase, Some("order-9".into()), &params);

        assert_eq!(event.id.as_deref(), Some("order-9"));
        assert_eq!(event.currency, Some(Currency::USD));
        assert_eq!(event.value, Some(42.5));
        assert_eq!(event.description.as_deref(), Some("summer sale"));
        assert_eq!(event.content_type.as_deref(), Some("product"));
        assert_eq!(event.contents, None);
    }

    #[test]
    fn unknown_currency_is_omitted() {
        let params = bag(json!({"currency": "usd", "value": 1}));
        let event = build_contents_event(EventKind::Checkout, None, &params);
        assert_eq!(event.currency, None);
        assert_eq!(event.value, Some(1.0));
    }

    #[test]
    fn base_event_stringifies_every_parameter() {
        let params = bag(json!({
            "level": 7,
            "boss": true,
            "zone": "lava",
            "loot": {"gold": 10},
        }));
        let event = build_base_event("level_up", None, &params);

        assert_eq!(event.name, "level_up");
        assert_eq!(event.id, None);
        assert_eq!(event.properties.len(), 4);
        assert_eq!(event.properties["level"], "7");
        assert_eq!(event.properties["boss"], "true");
        assert_eq!(event.properties["zone"], "lava");
        assert_eq!(event.properties["loot"], r#"{"gold":10}"#);
    }

    #[test]
    fn build_event_dispatches_on_kind() {
        let params = bag(json!({"content_id": "sku1"}));
        match build_event(EventKind::None, "valid_name", None, &params) {
            TypedEvent::Base(e) => {
                assert_eq!(e.name, "valid_name");
                assert_eq!(e.properties["content_id"], "sku1");
            }
            other => panic!("expected base event, got {other:?}"),
        }
        match build_event(EventKind::ViewContent, "ignored", None, &params) {
            TypedEvent::Contents(e) => assert_eq!(e.kind, EventKind::ViewContent),
            other => panic!("expected contents event, got {other:?}"),
        }
    }
}
