//! eSewa ePay v2 integration: request signing, checkout form fields, and
//! callback decoding/verification.
//!
//! The gateway signs with HMAC-SHA256 over a canonical comma-joined field
//! string (`name=value,name=value,...`) in a fixed order, base64-encoded.
//! The same scheme covers both the outgoing checkout request and the
//! incoming result callback, so the signing helper is shared.

use base64::{
    engine::general_purpose::{STANDARD as BASE64, STANDARD_NO_PAD as BASE64_NO_PAD},
    Engine,
};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Field order for the checkout request signature. Order is part of the
/// contract: the gateway recomputes the HMAC over exactly this sequence.
pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// eSewa credentials and endpoint, injected at startup.
#[derive(Debug, Clone)]
pub struct EsewaConfig {
    pub secret_key: String,
    pub product_code: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone)]
pub struct EsewaClient {
    config: EsewaConfig,
}

/// Everything the hosted checkout form needs, returned flat so the caller
/// can render it directly as form fields.
#[derive(Debug, Clone, Serialize)]
pub struct EsewaCheckoutRequest {
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
    pub signature: String,
    pub esewa_url: String,
}

/// Decoded result callback. `fields` keeps the raw JSON object so the
/// response signature can be recomputed over the exact received values.
#[derive(Debug, Clone)]
pub struct EsewaCallback {
    pub transaction_uuid: String,
    pub status: String,
    pub signature: Option<String>,
    pub signed_field_names: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl EsewaClient {
    pub fn new(config: EsewaConfig) -> Self {
        Self { config }
    }

    pub fn product_code(&self) -> &str {
        &self.config.product_code
    }

    /// Compute the base64 HMAC-SHA256 signature over the canonical message
    /// built from `fields` in the given order. Deterministic: the same
    /// inputs always produce the same signature string.
    pub fn sign(&self, fields: &[(&str, &str)]) -> Result<String> {
        let message = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(",");
        self.sign_message(&message)
    }

    fn sign_message(&self, message: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret_key.as_bytes())
            .map_err(|_| AppError::Internal("Invalid eSewa secret key".into()))?;
        mac.update(message.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Build the signed checkout form for a pending payment. The signature
    /// binds amount, transaction id, and product code, so none of them can
    /// be altered after intent creation.
    pub fn checkout_request(
        &self,
        amount: &Decimal,
        transaction_uuid: &str,
        success_url: &str,
        failure_url: &str,
    ) -> Result<EsewaCheckoutRequest> {
        let total_amount = amount.to_string();
        let signature = self.sign(&[
            ("total_amount", &total_amount),
            ("transaction_uuid", transaction_uuid),
            ("product_code", &self.config.product_code),
        ])?;

        Ok(EsewaCheckoutRequest {
            amount: total_amount.clone(),
            tax_amount: "0".to_string(),
            total_amount,
            transaction_uuid: transaction_uuid.to_string(),
            product_code: self.config.product_code.clone(),
            product_service_charge: "0".to_string(),
            product_delivery_charge: "0".to_string(),
            success_url: success_url.to_string(),
            failure_url: failure_url.to_string(),
            signed_field_names: SIGNED_FIELD_NAMES.to_string(),
            signature,
            esewa_url: self.config.checkout_url.clone(),
        })
    }

    /// Decode the `data` query parameter of a result callback:
    /// base64-encoded JSON with at least `transaction_uuid` and `status`.
    pub fn decode_callback(data: &str) -> Result<EsewaCallback> {
        // '+' in the base64 alphabet arrives as a space after URL query
        // decoding, so undo that before decoding.
        let cleaned = data.trim().replace(' ', "+");

        let bytes = BASE64
            .decode(cleaned.as_bytes())
            .or_else(|_| BASE64_NO_PAD.decode(cleaned.trim_end_matches('=').as_bytes()))
            .map_err(|e| AppError::BadRequest(format!("Callback is not valid base64: {}", e)))?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Callback is not valid JSON: {}", e)))?;

        let fields = match value {
            serde_json::Value::Object(map) => map,
            _ => return Err(AppError::BadRequest("Callback is not a JSON object".into())),
        };

        let transaction_uuid = fields
            .get("transaction_uuid")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::BadRequest("Callback missing transaction_uuid".into()))?
            .to_string();
        let status = fields
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::BadRequest("Callback missing status".into()))?
            .to_string();
        let signature = fields
            .get("signature")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let signed_field_names = fields
            .get("signed_field_names")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(EsewaCallback {
            transaction_uuid,
            status,
            signature,
            signed_field_names,
            fields,
        })
    }

    /// Verify the response signature of a decoded callback. The canonical
    /// message is rebuilt from the callback's own `signed_field_names`
    /// list over the received values, so the client-supplied `status` is
    /// only trusted once the HMAC checks out.
    pub fn verify_callback(&self, callback: &EsewaCallback) -> Result<bool> {
        let (signature, signed_field_names) =
            match (&callback.signature, &callback.signed_field_names) {
                (Some(sig), Some(names)) => (sig, names),
                _ => return Ok(false),
            };

        let mut parts = Vec::new();
        for name in signed_field_names.split(',') {
            let value = match callback.fields.get(name) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => return Ok(false),
            };
            parts.push(format!("{}={}", name, value));
        }
        let expected = self.sign_message(&parts.join(","))?;

        // Constant-time comparison. Signature length is not secret (the
        // digest is always 32 bytes), so the length check can short-circuit.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();
        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}
