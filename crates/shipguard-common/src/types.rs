//! Shared domain types
//!
//! Attribute and settings keys live here so the server and CLI agree on
//! them, together with the tracking-number codec and the canonical
//! shipment record exchanged with the remote API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Order attribute keys
// ============================================================================

/// Remote order id; present once the order is linked.
pub const ATTR_REMOTE_ORDER_ID: &str = "_shipguard_order_id";

/// Protection charge as a decimal string; empty string means no charge.
pub const ATTR_CHARGE: &str = "_shipguard_charge";

/// Protection flag, "0" or "1".
pub const ATTR_PROTECTION: &str = "_shipguard_protection";

/// Tracking numbers, pipe-joined.
pub const ATTR_TRACKING_NUMBER: &str = "shipguard_tracking_number";

/// Courier identifier recorded alongside the tracking number.
pub const ATTR_TRACKING_PROVIDER: &str = "shipguard_tracking_provider";

/// Set by provider-driven shipment pushes.
pub const ATTR_SHIPMENT_API_CALLED: &str = "shipguard_shipment_api_called";

/// Set once a periodic shipment-reconciliation attempt completed.
pub const ATTR_SHIPMENT_CRON_CALLED: &str = "shipguard_shipment_cron_api_called";

/// Value both completion flags are set to.
pub const FLAG_SUCCESS: &str = "success";

// ============================================================================
// Host settings keys
// ============================================================================

pub const SETTING_INSTALL_DATE: &str = "shipguard_install_date";
pub const SETTING_INCLUDED_STATUSES: &str = "shipguard_included_order_statuses";
pub const SETTING_CANCEL_STATUSES: &str = "shipguard_cancel_order_statuses";
pub const SETTING_EXCLUDED_SHIPPING_METHODS: &str = "shipguard_excluded_shipping_methods";
pub const SETTING_ACTIVE_INTEGRATIONS: &str = "shipguard_active_integrations";
pub const SETTING_WEBHOOK_TOPICS: &str = "shipguard_webhook_topics";
pub const SETTING_WEBHOOK_CALLBACK_URL: &str = "shipguard_webhook_callback_url";

// ============================================================================
// Tracking-number codec
// ============================================================================

pub const SEPARATOR_PIPE: char = '|';
pub const SEPARATOR_COMMA: char = ',';

/// Split a stored tracking attribute into individual numbers.
///
/// Pipe is the preferred delimiter; comma is the legacy fallback. Empty
/// segments are dropped so a malformed composite never yields blank
/// tracking numbers.
pub fn split_tracking_numbers(raw: &str) -> Vec<String> {
    let separator = if raw.contains(SEPARATOR_PIPE) {
        SEPARATOR_PIPE
    } else {
        SEPARATOR_COMMA
    };

    raw.split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tracking numbers with the preferred pipe delimiter.
pub fn join_tracking_numbers<S: AsRef<str>>(numbers: &[S]) -> String {
    numbers
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join("|")
}

/// Derive a courier id from a human-readable carrier name.
pub fn courier_slug(carrier_name: &str) -> String {
    carrier_name.trim().to_lowercase().replace(' ', "-")
}

// ============================================================================
// Canonical shipment record
// ============================================================================

/// Normalized shipment tuple, independent of which tracking-data provider
/// produced it. Doubles as the create-shipment wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub source_order_id: i64,
    /// One entry per unit of each line item; the remote side tracks
    /// protection per unit.
    pub source_product_ids: Vec<i64>,
    pub courier_id: String,
    pub tracking_number: String,
}

/// Cancel-shipment wire payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelShipmentPayload {
    pub source_order_id: i64,
    pub source_product_ids: Vec<i64>,
}

/// Split a comma-separated settings value into trimmed, non-empty entries.
pub fn split_setting_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_prefers_pipe() {
        assert_eq!(
            split_tracking_numbers("AB1|CD2|EF3"),
            vec!["AB1", "CD2", "EF3"]
        );
    }

    #[test]
    fn split_falls_back_to_comma() {
        assert_eq!(split_tracking_numbers("AB1,CD2"), vec!["AB1", "CD2"]);
    }

    #[test]
    fn split_single_number() {
        assert_eq!(split_tracking_numbers("AB1"), vec!["AB1"]);
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_tracking_numbers("AB1||CD2|"), vec!["AB1", "CD2"]);
        assert!(split_tracking_numbers("").is_empty());
    }

    #[test]
    fn join_then_split_round_trips() {
        let numbers = vec!["A1".to_string(), "B2".to_string(), "C3".to_string()];
        let joined = join_tracking_numbers(&numbers);
        assert_eq!(joined, "A1|B2|C3");
        assert_eq!(split_tracking_numbers(&joined), numbers);
    }

    #[test]
    fn courier_slug_lowercases_and_hyphenates() {
        assert_eq!(courier_slug("Canada Post"), "canada-post");
        assert_eq!(courier_slug("  UPS "), "ups");
    }

    #[test]
    fn setting_list_trims_entries() {
        assert_eq!(
            split_setting_list("processing, completed ,"),
            vec!["processing", "completed"]
        );
    }
}
