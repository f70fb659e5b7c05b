pub mod pricing;
pub mod calculator;
pub mod options;

pub use pricing::{AddonTable, ChargeBasis, DiscountTier, LeadTimes, PricingCatalog, PricingTable, RateTable};
pub use calculator::RuleBasedCalculator;
pub use options::OptionSets;
