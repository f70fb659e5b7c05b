use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DELIVERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Qualitative confidence levels an estimate may carry
pub const CONFIDENCE_LEVELS: [&str; 4] = ["High", "Medium", "Low", "High (Rule-based)"];

/// Price estimate for a single order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub base_price: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub rush_fee: f64,
    pub total_price: f64,
    pub breakdown: Breakdown,
    /// Qualitative level, e.g. "High", "Medium", "Low" or "High (Rule-based)"
    pub confidence: String,
    /// Calendar date, `YYYY-MM-DD`
    pub estimated_delivery: String,
}

/// Itemized view of an estimate.
///
/// Line items differ per product variant (binding and lamination for print
/// jobs; finish, adhesive and special features for nameplates), so they are
/// kept in an ordered map flattened next to the fixed fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakdown {
    pub per_unit_cost: f64,
    #[serde(default)]
    pub volume_discount_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(flatten)]
    pub line_items: BTreeMap<String, serde_json::Value>,
}

impl Breakdown {
    pub fn line_item(&self, name: &str) -> Option<f64> {
        self.line_items.get(name).and_then(|v| v.as_f64())
    }
}

impl PriceEstimate {
    /// Check field constraints on an estimate that came from outside the calculator.
    pub fn validate(&self) -> Result<(), String> {
        let amounts = [
            ("base_price", self.base_price),
            ("material_cost", self.material_cost),
            ("labor_cost", self.labor_cost),
            ("rush_fee", self.rush_fee),
            ("total_price", self.total_price),
            ("breakdown.per_unit_cost", self.breakdown.per_unit_cost),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative amount, got {}", field, value));
            }
        }

        let confidence = self.confidence.trim();
        if !CONFIDENCE_LEVELS
            .iter()
            .any(|level| level.eq_ignore_ascii_case(confidence))
        {
            return Err(format!("unknown confidence level {:?}", self.confidence));
        }

        NaiveDate::parse_from_str(&self.estimated_delivery, DELIVERY_DATE_FORMAT).map_err(|e| {
            format!(
                "estimated_delivery {:?} is not a YYYY-MM-DD date: {}",
                self.estimated_delivery, e
            )
        })?;

        Ok(())
    }

    /// Every named line item must be present in the breakdown as a non-negative amount.
    pub fn validate_line_items(&self, labels: &[&str]) -> Result<(), String> {
        for label in labels {
            match self.breakdown.line_item(label) {
                Some(value) if value.is_finite() && value >= 0.0 => {}
                Some(value) => {
                    return Err(format!(
                        "breakdown.{} must be a non-negative amount, got {}",
                        label, value
                    ))
                }
                None => return Err(format!("breakdown.{} is missing or not a number", label)),
            }
        }
        Ok(())
    }
}

/// Round a currency amount to cents.
///
/// Rounds the exact binary value, so 0.46499999999999997 stays 0.46; exact
/// ties go to the even cent.
pub fn round_currency(amount: f64) -> f64 {
    // Scaling by 100 first can turn a value just under a half cent into a tie
    format!("{:.2}", amount).parse().unwrap_or(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PriceEstimate {
        PriceEstimate {
            base_price: 5.0,
            material_cost: 1.5,
            labor_cost: 2.0,
            rush_fee: 0.0,
            total_price: 5.0,
            breakdown: Breakdown {
                per_unit_cost: 0.05,
                ..Default::default()
            },
            confidence: "High".to_string(),
            estimated_delivery: "2026-10-23".to_string(),
        }
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(85.499999), 85.5);
        assert_eq!(round_currency(0.05 * 31.0 * 0.30), 0.46);
        assert_eq!(round_currency(0.465), 0.47);
        assert_eq!(round_currency(0.015), 0.01);
        assert_eq!(round_currency(2.675), 2.67);
        assert_eq!(round_currency(0.125), 0.12);
        assert_eq!(round_currency(2.0), 2.0);
    }

    #[test]
    fn test_validate_accepts_sane_estimate() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut estimate = sample();
        estimate.rush_fee = -1.0;
        let err = estimate.validate().unwrap_err();
        assert!(err.contains("rush_fee"));
    }

    #[test]
    fn test_validate_confidence_levels() {
        let mut estimate = sample();
        estimate.confidence = "medium".to_string();
        assert!(estimate.validate().is_ok());

        estimate.confidence = "High (Rule-based)".to_string();
        assert!(estimate.validate().is_ok());

        estimate.confidence = "banana".to_string();
        let err = estimate.validate().unwrap_err();
        assert!(err.contains("confidence"));
    }

    #[test]
    fn test_validate_line_items() {
        let mut estimate = sample();
        let err = estimate.validate_line_items(&["binding"]).unwrap_err();
        assert!(err.contains("binding"));

        estimate
            .breakdown
            .line_items
            .insert("binding".to_string(), serde_json::json!(3.0));
        assert!(estimate.validate_line_items(&["binding"]).is_ok());

        estimate
            .breakdown
            .line_items
            .insert("binding".to_string(), serde_json::json!("three dollars"));
        assert!(estimate.validate_line_items(&["binding"]).is_err());

        estimate
            .breakdown
            .line_items
            .insert("binding".to_string(), serde_json::json!(-3.0));
        assert!(estimate.validate_line_items(&["binding"]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let mut estimate = sample();
        estimate.estimated_delivery = "next tuesday".to_string();
        assert!(estimate.validate().is_err());
    }

    #[test]
    fn test_breakdown_keeps_extra_keys() {
        let breakdown: Breakdown = serde_json::from_value(serde_json::json!({
            "per_unit_cost": 1,
            "binding": 3.0,
            "reasoning": "spiral binding",
            "volume_discount_applied": true
        }))
        .unwrap();

        assert_eq!(breakdown.per_unit_cost, 1.0);
        assert!(breakdown.volume_discount_applied);
        assert_eq!(breakdown.reasoning.as_deref(), Some("spiral binding"));
        assert_eq!(breakdown.line_item("binding"), Some(3.0));
        assert!(!breakdown.line_items.contains_key("per_unit_cost"));
    }
}
