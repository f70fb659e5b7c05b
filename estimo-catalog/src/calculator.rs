use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use estimo_core::{
    round_currency, Breakdown, CoreError, CoreResult, PriceEstimate, Priceable,
    DELIVERY_DATE_FORMAT,
};

use crate::pricing::PricingCatalog;

/// Deterministic pricing from the static tables.
///
/// This is the system of record: every AI-assisted estimate falls back to it.
#[derive(Debug, Clone)]
pub struct RuleBasedCalculator {
    catalog: Arc<PricingCatalog>,
}

impl RuleBasedCalculator {
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Price an order with delivery counted from today's local date
    pub fn calculate<O: Priceable + ?Sized>(&self, order: &O) -> CoreResult<PriceEstimate> {
        self.calculate_on(order, Local::now().date_naive())
    }

    /// Price an order with delivery counted from `today`
    pub fn calculate_on<O: Priceable + ?Sized>(
        &self,
        order: &O,
        today: NaiveDate,
    ) -> CoreResult<PriceEstimate> {
        order.validate()?;

        let table = self.catalog.table_for(order.variant());
        let s = order.selections();
        let quantity = s.quantity as f64;

        // Per-unit cost from stock, size, colour and (print only) sides
        let mut per_unit = table.base_cost.cost_or_first(s.base)
            * table.size_multiplier.multiplier(s.size)
            * table.color_multiplier.multiplier(s.color);
        if let (Some(sides_table), Some(sides)) = (&table.sides_multiplier, s.sides) {
            per_unit *= sides_table.multiplier(sides);
        }

        let mut base_price = per_unit * quantity;
        let discount = table.volume_discount(s.quantity);
        if let Some(tier) = discount {
            base_price *= 1.0 - tier.fraction;
        }

        let primary = table.primary_addon.charge(s.primary_addon, s.quantity);
        let secondary = table.secondary_addon.charge(s.secondary_addon, s.quantity);
        let features: Option<f64> = table.feature_cost.as_ref().map(|addon| {
            s.features
                .iter()
                .map(|feature| addon.charge(Some(feature), s.quantity))
                .sum()
        });

        let turnaround_multiplier = table.turnaround_multiplier.multiplier(s.turnaround);
        let rush_fee = base_price * (turnaround_multiplier - 1.0);

        let material_cost = base_price * table.material_share;
        let mut labor_cost = base_price * table.labor_share;
        if table.labor_includes_primary_addon {
            labor_cost += primary;
        }

        let total = base_price + primary + secondary + features.unwrap_or(0.0) + rush_fee;

        if !total.is_finite() {
            return Err(CoreError::ComputationFailed(format!(
                "non-finite total {} for {} order",
                total,
                order.variant()
            )));
        }

        let per_unit_cost = total / quantity;

        tracing::debug!(
            variant = %order.variant(),
            quantity = s.quantity,
            per_unit,
            discount = discount.map(|t| t.fraction).unwrap_or(0.0),
            total,
            "Rule-based price computed"
        );

        let mut line_items = BTreeMap::new();
        line_items.insert(
            table.primary_addon.label.clone(),
            serde_json::json!(round_currency(primary)),
        );
        line_items.insert(
            table.secondary_addon.label.clone(),
            serde_json::json!(round_currency(secondary)),
        );
        if let (Some(addon), Some(cost)) = (&table.feature_cost, features) {
            line_items.insert(addon.label.clone(), serde_json::json!(round_currency(cost)));
        }

        let delivery = today + Duration::days(table.lead_times.days(s.turnaround));

        Ok(PriceEstimate {
            base_price: round_currency(base_price),
            material_cost: round_currency(material_cost),
            labor_cost: round_currency(labor_cost),
            rush_fee: round_currency(rush_fee),
            total_price: round_currency(total),
            breakdown: Breakdown {
                per_unit_cost: round_currency(per_unit_cost),
                volume_discount_applied: discount.is_some(),
                reasoning: None,
                line_items,
            },
            confidence: table.confidence_label.clone(),
            estimated_delivery: delivery.format(DELIVERY_DATE_FORMAT).to_string(),
        })
    }
}
