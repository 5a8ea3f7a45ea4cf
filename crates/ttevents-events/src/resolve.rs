// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event type tag resolution.

use ttevents_core::EventKind;

/// Tag assumed when the host sends none.
pub const DEFAULT_TYPE_TAG: &str = "none";

/// Map a free-form type tag to an [`EventKind`].
///
/// Matching ignores case and underscores, so `Add_To_Cart`, `AddToCart`
/// and `addtocart` are the same tag. Anything unrecognised, including the
/// empty string, resolves to the generic [`EventKind::None`].
pub fn resolve_kind(tag: &str) -> EventKind {
    let normalized: String = tag
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    match normalized.as_str() {
        "addtocart" => EventKind::AddToCart,
        "addtowishlist" => EventKind::AddToWishlist,
        "checkout" => EventKind::Checkout,
        "purchase" => EventKind::Purchase,
        "viewcontent" => EventKind::ViewContent,
        _ => EventKind::None,
    }
}
