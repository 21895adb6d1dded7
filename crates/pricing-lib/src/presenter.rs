//! Result presentation
//!
//! Turns the outcome of a submission into what the user sees: a price in
//! rupiah with a disclaimer, or a categorized error message. User-facing
//! copy is Indonesian.

use crate::error::{ErrorCategory, PredictionError, ResourceKind};
use crate::models::PriceEstimate;
use serde::Serialize;

/// Currency marker placed before the amount
pub const CURRENCY_PREFIX: &str = "Rp";

/// Label shown above the price
pub const PRICE_LABEL: &str = "Estimasi Harga Jual";

/// Static note attached to every estimate
pub const DISCLAIMER: &str = "Catatan: Harga ini adalah estimasi berdasarkan data historis. \
Kondisi fisik aktual mobil dapat mempengaruhi harga nyata.";

/// What the user sees after one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DisplayOutput {
    Success {
        label: &'static str,
        /// Estimate truncated toward zero
        amount: i64,
        formatted: String,
        disclaimer: &'static str,
    },
    Error {
        category: ErrorCategory,
        message: String,
    },
}

impl DisplayOutput {
    pub fn is_success(&self) -> bool {
        matches!(self, DisplayOutput::Success { .. })
    }
}

/// Present a prediction outcome
pub fn present(outcome: &Result<PriceEstimate, PredictionError>) -> DisplayOutput {
    match outcome {
        Ok(estimate) => {
            let amount = truncate(estimate.value());
            DisplayOutput::Success {
                label: PRICE_LABEL,
                amount,
                formatted: format_rupiah(amount),
                disclaimer: DISCLAIMER,
            }
        }
        Err(err) => DisplayOutput::Error {
            category: err.category(),
            message: error_message(err),
        },
    }
}

/// Human-readable message for a failed submission
pub fn error_message(err: &PredictionError) -> String {
    match err {
        PredictionError::ResourceLoad(e) if e.kind == ResourceKind::Model => {
            "Model belum dimuat, tidak bisa melakukan prediksi.".to_string()
        }
        PredictionError::ResourceLoad(_) | PredictionError::EmptyCarTable => {
            "Data mapping mobil kosong.".to_string()
        }
        PredictionError::UnknownCarName(name) => format!("Model mobil tidak dikenal: {}", name),
        PredictionError::InvalidInput(reason) => format!("Input tidak valid: {}", reason),
        PredictionError::Inference(cause) => {
            format!("Terjadi kesalahan saat memprediksi: {}", cause)
        }
    }
}

/// Drop the fractional part, saturating at the i64 range
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Format an amount as `Rp 12.345.678`
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{} {}{}", CURRENCY_PREFIX, sign, grouped)
}
