// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static field-capability table for each event variant.
//
// The builder checks this table before assigning a field, so a variant
// never receives a field the vendor SDK type does not expose.

use ttevents_core::EventKind;

/// Assignable fields on vendor event objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    /// Free-form string properties (generic events only).
    Properties,
    Description,
    Currency,
    Value,
    ContentType,
    /// The `ContentParams` block.
    Contents,
}

const BASE_FIELDS: &[EventField] = &[EventField::Properties];

const CONTENTS_FIELDS: &[EventField] = &[
    EventField::Description,
    EventField::Currency,
    EventField::Value,
    EventField::ContentType,
    EventField::Contents,
];

/// Fields the vendor event type for `kind` accepts.
pub fn capabilities(kind: EventKind) -> &'static [EventField] {
    match kind {
        EventKind::None => BASE_FIELDS,
        EventKind::AddToCart
        | EventKind::AddToWishlist
        | EventKind::Checkout
        | EventKind::Purchase
        | EventKind::ViewContent => CONTENTS_FIELDS,
    }
}

pub fn supports(kind: EventKind, field: EventField) -> bool {
    capabilities(kind).contains(&field)
}
