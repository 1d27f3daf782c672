//! Remote API wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insured-status value that carries a protection charge.
pub const INSURED_SELECTED: &str = "insured_selected";

/// Raw outcome of one remote call: an HTTP status plus the parsed JSON
/// body (`Null` when the body is empty or not JSON). Transport failures
/// never reach this type; they surface as `SyncError::Transport`.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Value,
}

impl RemoteResponse {
    pub fn order_body(&self) -> RemoteOrderBody {
        RemoteOrderBody::from_value(&self.body)
    }
}

/// The fields of a remote order record this service reads.
#[derive(Debug, Clone, Default)]
pub struct RemoteOrderBody {
    pub id: Option<String>,
    pub order_number: Option<String>,
    pub insured_status: Option<String>,
    pub paid_to_insure: Option<String>,
}

impl RemoteOrderBody {
    pub fn from_value(body: &Value) -> Self {
        Self {
            id: json_string(body, "id"),
            order_number: json_string(body, "order_number"),
            insured_status: json_string(body, "insured_status"),
            paid_to_insure: json_string(body, "paid_to_insure"),
        }
    }

    /// A body is usable as a creation result only when it names both the
    /// remote id and the order number.
    pub fn is_complete(&self) -> bool {
        self.id.is_some() && self.order_number.is_some()
    }

    /// Charge the merchant collected for protection: `paid_to_insure`
    /// when the order was insured, empty string otherwise.
    pub fn charge(&self) -> String {
        if self.insured_status.as_deref() == Some(INSURED_SELECTED) {
            self.paid_to_insure.clone().unwrap_or_default()
        } else {
            String::new()
        }
    }
}

/// Read a field that remote payloads serialize either as a string or a
/// bare number.
fn json_string(body: &Value, key: &str) -> Option<String> {
    match body.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Order-creation payload sent to the remote side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    pub source_order_id: i64,
    pub order_number: String,
    pub currency: String,
    pub subtotal: f64,
    pub shipping_method: Option<String>,
    pub created_on: chrono::DateTime<chrono::Utc>,
}

/// One entry of the remote webhook registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteWebhook {
    pub id: String,
    pub topic: String,
    pub url: String,
}
