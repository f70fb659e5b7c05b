pub mod order;
pub mod estimate;

pub use order::{NameplateOrder, Order, Priceable, PrintJob, ProductVariant, Selections};
pub use estimate::{round_currency, Breakdown, PriceEstimate, CONFIDENCE_LEVELS, DELIVERY_DATE_FORMAT};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid quantity: {0} (must be a positive integer)")]
    InvalidQuantity(i64),
    #[error("Price computation failed: {0}")]
    ComputationFailed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
