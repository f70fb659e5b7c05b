use estimo_catalog::PricingTable;
use estimo_core::PriceEstimate;

use crate::AiError;

/// Slice from the first `{` to the last `}`, ignoring any prose around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and validate a model reply against the variant's table.
/// Values are kept exactly as the model sent them.
pub fn parse_estimate(text: &str, table: &PricingTable) -> Result<PriceEstimate, AiError> {
    let json = extract_json_object(text).ok_or(AiError::NoJsonObject)?;
    let estimate: PriceEstimate = serde_json::from_str(json)?;
    estimate.validate().map_err(AiError::InvalidEstimate)?;
    estimate
        .validate_line_items(&table.line_item_labels())
        .map_err(AiError::InvalidEstimate)?;
    Ok(estimate)
}
