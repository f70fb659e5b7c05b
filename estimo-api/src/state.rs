use std::sync::Arc;

use estimo_ai::Estimator;
use estimo_catalog::PricingCatalog;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PricingCatalog>,
    pub estimator: Arc<Estimator>,
}

impl AppState {
    pub fn new(catalog: Arc<PricingCatalog>, estimator: Estimator) -> Self {
        Self {
            catalog,
            estimator: Arc::new(estimator),
        }
    }

    /// Rule-based pricing only, no model service
    pub fn rule_based(catalog: Arc<PricingCatalog>) -> Self {
        let estimator = Estimator::rule_based_only(catalog.clone());
        Self::new(catalog, estimator)
    }
}
