use std::collections::BTreeMap;

use estimo_core::ProductVariant;
use serde::Serialize;

use crate::pricing::{PricingCatalog, PricingTable};

/// Enumerated choices a client may offer for one product variant
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionSets {
    pub variant: ProductVariant,
    #[serde(flatten)]
    pub options: BTreeMap<String, Vec<String>>,
}

impl OptionSets {
    pub fn from_table(table: &PricingTable) -> Self {
        let mut options: BTreeMap<String, Vec<String>> = table
            .option_tables()
            .into_iter()
            .map(|rates| (rates.name.clone(), rates.options()))
            .collect();
        if !table.product_types.is_empty() {
            options.insert("product_types".to_string(), table.product_types.clone());
        }
        Self {
            variant: table.variant,
            options,
        }
    }
}

impl PricingCatalog {
    pub fn option_sets(&self, variant: ProductVariant) -> OptionSets {
        OptionSets::from_table(self.table_for(variant))
    }

    pub fn all_option_sets(&self) -> Vec<OptionSets> {
        ProductVariant::ALL
            .iter()
            .map(|variant| self.option_sets(*variant))
            .collect()
    }
}
