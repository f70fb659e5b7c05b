use std::sync::Arc;

use chrono::Local;
use estimo_catalog::{PricingCatalog, RuleBasedCalculator};
use estimo_core::{CoreResult, Order, PriceEstimate, Priceable};
use serde::Serialize;

use crate::client::{AiSettings, AnthropicClient, CompletionClient, CompletionRequest};
use crate::prompt::build_prompt;
use crate::response::parse_estimate;
use crate::AiError;

/// Result of one attempt at an AI-derived estimate
#[derive(Debug)]
pub enum AiOutcome {
    Succeeded(PriceEstimate),
    /// No credential configured; the model was never called
    CredentialMissing,
    Failed(AiError),
}

/// Which path produced the estimate handed back to the caller
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    Ai,
    RuleBased,
}

impl EstimateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateSource::Ai => "ai",
            EstimateSource::RuleBased => "rule_based",
        }
    }
}

/// AI-assisted estimator with a rule-based fallback.
///
/// An estimate is either entirely the model's or entirely the calculator's.
pub struct Estimator {
    calculator: RuleBasedCalculator,
    client: Option<Arc<dyn CompletionClient>>,
    model: String,
    max_tokens: u32,
}

impl Estimator {
    /// Estimator that never calls the model
    pub fn rule_based_only(catalog: Arc<PricingCatalog>) -> Self {
        let settings = AiSettings::default();
        Self {
            calculator: RuleBasedCalculator::new(catalog),
            client: None,
            model: settings.model,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_client(
        catalog: Arc<PricingCatalog>,
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            calculator: RuleBasedCalculator::new(catalog),
            client: Some(client),
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_settings(catalog: Arc<PricingCatalog>, settings: &AiSettings) -> Result<Self, AiError> {
        match AnthropicClient::from_settings(settings)? {
            Some(client) => {
                tracing::info!(
                    "AI pricing enabled with model {} at {}",
                    settings.model,
                    client.endpoint()
                );
                Ok(Self::with_client(
                    catalog,
                    Arc::new(client),
                    settings.model.clone(),
                    settings.max_tokens,
                ))
            }
            None => {
                tracing::info!("No model service credential configured, using rule-based pricing");
                Ok(Self::rule_based_only(catalog))
            }
        }
    }

    #[cfg(test)]
    fn calculator(&self) -> &RuleBasedCalculator {
        &self.calculator
    }

    pub fn ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// One call to the model, no retry
    pub async fn attempt_ai(&self, order: &Order) -> AiOutcome {
        let Some(client) = &self.client else {
            return AiOutcome::CredentialMissing;
        };

        let table = self.calculator.catalog().table_for(order.variant());
        let request = CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            prompt: build_prompt(order, table, Local::now().date_naive()),
        };

        let text = match client.complete(&request).await {
            Ok(text) => text,
            Err(e) => return AiOutcome::Failed(e),
        };

        match parse_estimate(&text, table) {
            Ok(estimate) => AiOutcome::Succeeded(estimate),
            Err(e) => AiOutcome::Failed(e),
        }
    }

    pub async fn estimate(&self, order: &Order) -> CoreResult<PriceEstimate> {
        self.estimate_with_source(order).await.map(|(estimate, _)| estimate)
    }

    /// Estimate an order, falling back to the calculator whenever the model
    /// cannot produce a valid estimate. Only calculator errors reach the caller.
    pub async fn estimate_with_source(
        &self,
        order: &Order,
    ) -> CoreResult<(PriceEstimate, EstimateSource)> {
        order.validate()?;

        match self.attempt_ai(order).await {
            AiOutcome::Succeeded(estimate) => {
                tracing::info!(
                    variant = %order.variant(),
                    total = estimate.total_price,
                    "AI estimate accepted"
                );
                Ok((estimate, EstimateSource::Ai))
            }
            AiOutcome::CredentialMissing => {
                let estimate = self.calculator.calculate(order)?;
                Ok((estimate, EstimateSource::RuleBased))
            }
            AiOutcome::Failed(err) => {
                tracing::warn!(
                    variant = %order.variant(),
                    "AI pricing failed: {}, falling back to rule-based",
                    err
                );
                let estimate = self.calculator.calculate(order)?;
                Ok((estimate, EstimateSource::RuleBased))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use estimo_core::{CoreError, NameplateOrder, PrintJob};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned model reply, counting calls and keeping the last prompt
    struct FakeClient {
        reply: Result<String, String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl FakeClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone().map_err(AiError::Service)
        }
    }

    const AI_REPLY: &str = r#"Based on current market rates, here is my estimate:

{
    "base_price": 4.5,
    "material_cost": 1.35,
    "labor_cost": 1.8,
    "rush_fee": 0,
    "total_price": 4.5,
    "breakdown": {
        "per_unit_cost": 0.045,
        "binding": 0,
        "lamination": 0,
        "volume_discount_applied": false,
        "reasoning": "Simple monochrome job, priced slightly under list"
    },
    "confidence": "Medium",
    "estimated_delivery": "2026-10-24"
}

Let me know if you need anything else."#;

    fn catalog() -> Arc<PricingCatalog> {
        Arc::new(PricingCatalog::standard())
    }

    fn print_order(quantity: i64) -> Order {
        Order::Print(PrintJob {
            paper_type: "standard".to_string(),
            paper_size: "A4".to_string(),
            color_type: "bw".to_string(),
            quantity,
            sides: "single".to_string(),
            binding: None,
            lamination: None,
            turnaround: "standard".to_string(),
            custom_width: None,
            custom_height: None,
            additional_notes: None,
        })
    }

    fn nameplate_order() -> Order {
        Order::Nameplate(NameplateOrder {
            product_type: "label".to_string(),
            material: "polyester".to_string(),
            size: "1x1".to_string(),
            quantity: 200,
            colors: "full_color".to_string(),
            finish: None,
            adhesive: None,
            special_features: Vec::new(),
            turnaround: "standard".to_string(),
            custom_width: None,
            custom_height: None,
            additional_notes: None,
        })
    }

    #[tokio::test]
    async fn test_missing_credential_matches_rule_based() {
        let estimator = Estimator::rule_based_only(catalog());
        let order = nameplate_order();

        assert!(matches!(estimator.attempt_ai(&order).await, AiOutcome::CredentialMissing));

        let (estimate, source) = estimator.estimate_with_source(&order).await.unwrap();
        let expected = estimator.calculator().calculate(&order).unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
        assert_eq!(estimate, expected);
        assert_eq!(estimate.total_price, 85.5);
    }

    #[tokio::test]
    async fn test_prose_wrapped_reply_is_returned_verbatim() {
        let client = FakeClient::replying(AI_REPLY);
        let estimator = Estimator::with_client(catalog(), client.clone(), "test-model", 1000);

        let (estimate, source) = estimator.estimate_with_source(&print_order(100)).await.unwrap();

        assert_eq!(source, EstimateSource::Ai);
        assert_eq!(estimate.total_price, 4.5);
        assert_eq!(estimate.breakdown.per_unit_cost, 0.045);
        assert_eq!(estimate.confidence, "Medium");
        assert_eq!(estimate.estimated_delivery, "2026-10-24");
        assert_eq!(
            estimate.breakdown.reasoning.as_deref(),
            Some("Simple monochrome job, priced slightly under list")
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, 1000);
        assert!(request.prompt.contains("- Quantity: 100"));
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back() {
        let client = FakeClient::replying("{\"base_price\": 4.5, \"total_price\": oops}");
        let estimator = Estimator::with_client(catalog(), client.clone(), "test-model", 1000);
        let order = print_order(100);

        assert!(matches!(
            estimator.attempt_ai(&order).await,
            AiOutcome::Failed(AiError::MalformedJson(_))
        ));

        let (estimate, source) = estimator.estimate_with_source(&order).await.unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
        assert_eq!(estimate, estimator.calculator().calculate(&order).unwrap());
    }

    #[tokio::test]
    async fn test_missing_required_field_falls_back() {
        let reply = AI_REPLY.replace("\"confidence\": \"Medium\",", "");
        let client = FakeClient::replying(&reply);
        let estimator = Estimator::with_client(catalog(), client, "test-model", 1000);
        let order = print_order(100);

        let (estimate, source) = estimator.estimate_with_source(&order).await.unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
        assert_eq!(estimate.confidence, "High (Rule-based)");
        assert_eq!(estimate.total_price, 5.0);
    }

    #[tokio::test]
    async fn test_missing_line_item_falls_back() {
        let reply = AI_REPLY.replace("\"lamination\": 0,", "");
        let client = FakeClient::replying(&reply);
        let estimator = Estimator::with_client(catalog(), client, "test-model", 1000);
        let order = print_order(100);

        assert!(matches!(
            estimator.attempt_ai(&order).await,
            AiOutcome::Failed(AiError::InvalidEstimate(_))
        ));
        let (estimate, source) = estimator.estimate_with_source(&order).await.unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
        assert_eq!(estimate.breakdown.line_item("lamination"), Some(0.0));
    }

    #[tokio::test]
    async fn test_unknown_confidence_falls_back() {
        let client = FakeClient::replying(
            r#"{"base_price": 5, "material_cost": 1.5, "labor_cost": 2, "rush_fee": 0,
                "total_price": 5, "breakdown": {"per_unit_cost": 0.05, "binding": 0, "lamination": 0},
                "confidence": "banana", "estimated_delivery": "2026-10-23"}"#,
        );
        let estimator = Estimator::with_client(catalog(), client, "test-model", 1000);

        let (estimate, source) = estimator.estimate_with_source(&print_order(100)).await.unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
        assert_eq!(estimate.confidence, "High (Rule-based)");
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let client = FakeClient::failing("529 Overloaded");
        let estimator = Estimator::with_client(catalog(), client.clone(), "test-model", 1000);
        let order = nameplate_order();

        let estimate = estimator.estimate(&order).await.unwrap();
        assert_eq!(estimate, estimator.calculator().calculate(&order).unwrap());
        // single attempt, no retry
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prose_only_reply_falls_back() {
        let client = FakeClient::replying("I'm sorry, I can't provide a quote for that.");
        let estimator = Estimator::with_client(catalog(), client, "test-model", 1000);

        let (_, source) = estimator.estimate_with_source(&print_order(10)).await.unwrap();
        assert_eq!(source, EstimateSource::RuleBased);
    }

    #[tokio::test]
    async fn test_invalid_quantity_never_reaches_model() {
        let client = FakeClient::replying(AI_REPLY);
        let estimator = Estimator::with_client(catalog(), client.clone(), "test-model", 1000);

        let err = estimator.estimate(&print_order(0)).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(0)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_settings_without_key() {
        let estimator = Estimator::from_settings(catalog(), &AiSettings::default()).unwrap();
        assert!(!estimator.ai_enabled());
    }
}
