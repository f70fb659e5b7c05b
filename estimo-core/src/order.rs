use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Product lines the estimator knows how to price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductVariant {
    Print,
    Nameplate,
}

impl ProductVariant {
    pub const ALL: [ProductVariant; 2] = [ProductVariant::Print, ProductVariant::Nameplate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductVariant::Print => "print",
            ProductVariant::Nameplate => "nameplate",
        }
    }
}

impl fmt::Display for ProductVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "print" => Ok(ProductVariant::Print),
            "nameplate" => Ok(ProductVariant::Nameplate),
            other => Err(format!("Unknown product variant: {}", other)),
        }
    }
}

/// A commercial print job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintJob {
    pub paper_type: String,
    pub paper_size: String,
    pub color_type: String,
    pub quantity: i64,
    pub sides: String,
    #[serde(default)]
    pub binding: Option<String>,
    #[serde(default)]
    pub lamination: Option<String>,
    pub turnaround: String,
    #[serde(default)]
    pub custom_width: Option<f64>,
    #[serde(default)]
    pub custom_height: Option<f64>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

/// An industrial nameplate, label, decal or asset tag order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameplateOrder {
    #[serde(default = "default_product_type")]
    pub product_type: String,
    pub material: String,
    pub size: String,
    pub quantity: i64,
    pub colors: String,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default)]
    pub adhesive: Option<String>,
    #[serde(default)]
    pub special_features: Vec<String>,
    pub turnaround: String,
    #[serde(default)]
    pub custom_width: Option<f64>,
    #[serde(default)]
    pub custom_height: Option<f64>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

fn default_product_type() -> String {
    "label".to_string()
}

/// Either order shape, tagged by `variant` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Order {
    Print(PrintJob),
    Nameplate(NameplateOrder),
}

impl Order {
    pub fn quantity(&self) -> i64 {
        self.selections().quantity
    }
}

/// Variant-independent view of an order.
///
/// The rule-based calculator only ever sees this projection, so both order
/// shapes share one pricing routine.
#[derive(Debug, Clone, Copy)]
pub struct Selections<'a> {
    /// Material or paper stock (absolute per-unit cost)
    pub base: &'a str,
    pub size: &'a str,
    pub color: &'a str,
    /// Only print jobs are priced by sides
    pub sides: Option<&'a str>,
    /// Binding (print) or finish (nameplate)
    pub primary_addon: Option<&'a str>,
    /// Lamination (print) or adhesive (nameplate)
    pub secondary_addon: Option<&'a str>,
    pub features: &'a [String],
    pub turnaround: &'a str,
    pub quantity: i64,
}

/// Anything the pricing engine can quote
pub trait Priceable {
    fn variant(&self) -> ProductVariant;

    fn selections(&self) -> Selections<'_>;

    /// Quantity must be a positive integer; nothing else on an order is ever rejected.
    fn validate(&self) -> CoreResult<()> {
        let quantity = self.selections().quantity;
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        Ok(())
    }
}

impl Priceable for PrintJob {
    fn variant(&self) -> ProductVariant {
        ProductVariant::Print
    }

    fn selections(&self) -> Selections<'_> {
        Selections {
            base: &self.paper_type,
            size: &self.paper_size,
            color: &self.color_type,
            sides: Some(&self.sides),
            primary_addon: self.binding.as_deref(),
            secondary_addon: self.lamination.as_deref(),
            features: &[],
            turnaround: &self.turnaround,
            quantity: self.quantity,
        }
    }
}

impl Priceable for NameplateOrder {
    fn variant(&self) -> ProductVariant {
        ProductVariant::Nameplate
    }

    fn selections(&self) -> Selections<'_> {
        Selections {
            base: &self.material,
            size: &self.size,
            color: &self.colors,
            sides: None,
            primary_addon: self.finish.as_deref(),
            secondary_addon: self.adhesive.as_deref(),
            features: &self.special_features,
            turnaround: &self.turnaround,
            quantity: self.quantity,
        }
    }
}

impl Priceable for Order {
    fn variant(&self) -> ProductVariant {
        match self {
            Order::Print(job) => job.variant(),
            Order::Nameplate(order) => order.variant(),
        }
    }

    fn selections(&self) -> Selections<'_> {
        match self {
            Order::Print(job) => job.selections(),
            Order::Nameplate(order) => order.selections(),
        }
    }
}

impl From<PrintJob> for Order {
    fn from(job: PrintJob) -> Self {
        Order::Print(job)
    }
}

impl From<NameplateOrder> for Order {
    fn from(order: NameplateOrder) -> Self {
        Order::Nameplate(order)
    }
}
