use estimo_core::ProductVariant;
use serde::{Deserialize, Serialize};

/// Ordered option -> value table.
///
/// The first entry doubles as the default for absolute-cost lookups, and the
/// entry order is the order options are published in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    /// Key the option list is published under (e.g. "paper_types")
    pub name: String,
    pub entries: Vec<(String, f64)>,
}

impl RateTable {
    pub fn new(name: &str, entries: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            entries: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    pub fn get(&self, option: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == option)
            .map(|(_, v)| *v)
    }

    /// Unknown options are neutral.
    pub fn multiplier(&self, option: &str) -> f64 {
        self.get(option).unwrap_or(1.0)
    }

    /// Unknown options cost the same as the first-listed option.
    pub fn cost_or_first(&self, option: &str) -> f64 {
        self.get(option)
            .or_else(|| self.entries.first().map(|(_, v)| *v))
            .unwrap_or(0.0)
    }

    /// Unknown options are free.
    pub fn cost_or_zero(&self, option: &str) -> f64 {
        self.get(option).unwrap_or(0.0)
    }

    pub fn options(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChargeBasis {
    /// Flat amount per job
    PerJob,
    /// Rate multiplied by quantity
    PerUnit,
}

/// Optional extras priced on top of the base price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonTable {
    /// Line item name in the estimate breakdown
    pub label: String,
    pub basis: ChargeBasis,
    pub rates: RateTable,
}

impl AddonTable {
    pub fn new(label: &str, basis: ChargeBasis, rates: RateTable) -> Self {
        Self {
            label: label.to_string(),
            basis,
            rates,
        }
    }

    /// No selection and unknown selections both charge nothing.
    pub fn charge(&self, option: Option<&str>, quantity: i64) -> f64 {
        let rate = option.map(|o| self.rates.cost_or_zero(o)).unwrap_or(0.0);
        match self.basis {
            ChargeBasis::PerJob => rate,
            ChargeBasis::PerUnit => rate * quantity as f64,
        }
    }
}

/// Quantity strictly above `above` earns `fraction` off the base price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiscountTier {
    pub above: i64,
    pub fraction: f64,
}

/// Turnaround tier -> days until delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimes(pub Vec<(String, i64)>);

impl LeadTimes {
    pub fn new(entries: &[(&str, i64)]) -> Self {
        Self(entries.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    /// Unknown tiers ship today.
    pub fn days(&self, turnaround: &str) -> i64 {
        self.0
            .iter()
            .find(|(k, _)| k == turnaround)
            .map(|(_, d)| *d)
            .unwrap_or(0)
    }
}

/// Everything that makes one product variant's pricing different from another's
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTable {
    pub variant: ProductVariant,

    /// Informational product kinds, not priced
    pub product_types: Vec<String>,

    /// Per-unit material or paper cost
    pub base_cost: RateTable,
    pub size_multiplier: RateTable,
    pub color_multiplier: RateTable,
    pub sides_multiplier: Option<RateTable>,

    /// Binding or finish
    pub primary_addon: AddonTable,
    /// Lamination or adhesive
    pub secondary_addon: AddonTable,
    pub feature_cost: Option<AddonTable>,

    pub turnaround_multiplier: RateTable,
    pub lead_times: LeadTimes,
    pub volume_discounts: Vec<DiscountTier>,

    /// Share of the base price reported as material cost
    pub material_share: f64,
    /// Share of the base price reported as labor cost
    pub labor_share: f64,
    /// Labor also carries the primary add-on (print binding is manual work)
    pub labor_includes_primary_addon: bool,

    pub confidence_label: String,
}

impl PricingTable {
    /// Largest tier whose threshold the quantity exceeds. Tiers never stack.
    pub fn volume_discount(&self, quantity: i64) -> Option<DiscountTier> {
        self.volume_discounts
            .iter()
            .filter(|tier| quantity > tier.above)
            .max_by_key(|tier| tier.above)
            .copied()
    }

    /// Breakdown line items every estimate for this variant must itemize
    pub fn line_item_labels(&self) -> Vec<&str> {
        let mut labels = vec![
            self.primary_addon.label.as_str(),
            self.secondary_addon.label.as_str(),
        ];
        if let Some(features) = &self.feature_cost {
            labels.push(features.label.as_str());
        }
        labels
    }

    /// Rate tables in publication order
    pub fn option_tables(&self) -> Vec<&RateTable> {
        let mut tables = vec![&self.base_cost, &self.size_multiplier, &self.color_multiplier];
        if let Some(sides) = &self.sides_multiplier {
            tables.push(sides);
        }
        tables.push(&self.primary_addon.rates);
        tables.push(&self.secondary_addon.rates);
        if let Some(features) = &self.feature_cost {
            tables.push(&features.rates);
        }
        tables.push(&self.turnaround_multiplier);
        tables
    }

    /// Commercial print jobs
    pub fn print() -> Self {
        Self {
            variant: ProductVariant::Print,
            product_types: Vec::new(),
            base_cost: RateTable::new(
                "paper_types",
                &[("standard", 0.05), ("glossy", 0.12), ("matte", 0.10), ("cardstock", 0.20)],
            ),
            size_multiplier: RateTable::new(
                "paper_sizes",
                &[("A4", 1.0), ("Letter", 1.0), ("A3", 1.8), ("Legal", 1.2), ("Custom", 1.5)],
            ),
            color_multiplier: RateTable::new("color_types", &[("bw", 1.0), ("color", 2.5)]),
            sides_multiplier: Some(RateTable::new("sides", &[("single", 1.0), ("double", 1.6)])),
            primary_addon: AddonTable::new(
                "binding",
                ChargeBasis::PerJob,
                RateTable::new(
                    "binding_options",
                    &[("none", 0.0), ("staple", 0.50), ("spiral", 3.00), ("perfect", 5.00)],
                ),
            ),
            secondary_addon: AddonTable::new(
                "lamination",
                ChargeBasis::PerUnit,
                RateTable::new(
                    "lamination_options",
                    &[("none", 0.0), ("glossy", 1.50), ("matte", 1.50)],
                ),
            ),
            feature_cost: None,
            turnaround_multiplier: RateTable::new(
                "turnaround_options",
                &[("standard", 1.0), ("express", 1.5), ("same_day", 2.0)],
            ),
            lead_times: LeadTimes::new(&[("standard", 5), ("express", 2), ("same_day", 0)]),
            volume_discounts: vec![
                DiscountTier { above: 1000, fraction: 0.15 },
                DiscountTier { above: 500, fraction: 0.10 },
                DiscountTier { above: 100, fraction: 0.05 },
            ],
            material_share: 0.30,
            labor_share: 0.40,
            labor_includes_primary_addon: true,
            confidence_label: "High (Rule-based)".to_string(),
        }
    }

    /// Industrial nameplates, labels, decals and asset tags
    pub fn nameplate() -> Self {
        Self {
            variant: ProductVariant::Nameplate,
            product_types: ["label", "nameplate", "decal", "asset_tag", "overlay"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            base_cost: RateTable::new(
                "materials",
                &[
                    ("polyester", 0.25),
                    ("vinyl", 0.15),
                    ("polycarbonate", 0.35),
                    ("aluminum", 0.85),
                    ("anodized_aluminum", 1.10),
                    ("stainless_steel", 1.50),
                    ("brass", 2.00),
                ],
            ),
            size_multiplier: RateTable::new(
                "sizes",
                &[
                    ("1x1", 1.0),
                    ("1x2", 1.4),
                    ("2x2", 1.8),
                    ("2x4", 2.6),
                    ("3x5", 3.5),
                    ("4x6", 4.5),
                    ("custom", 3.0),
                ],
            ),
            color_multiplier: RateTable::new(
                "colors",
                &[("1_color", 1.0), ("2_color", 1.3), ("full_color", 1.8)],
            ),
            sides_multiplier: None,
            primary_addon: AddonTable::new(
                "finish",
                ChargeBasis::PerUnit,
                RateTable::new(
                    "finishes",
                    &[
                        ("none", 0.0),
                        ("matte", 0.03),
                        ("gloss", 0.03),
                        ("brushed", 0.08),
                        ("domed", 0.35),
                    ],
                ),
            ),
            secondary_addon: AddonTable::new(
                "adhesive",
                ChargeBasis::PerUnit,
                RateTable::new(
                    "adhesives",
                    &[
                        ("standard", 0.0),
                        ("high_tack", 0.05),
                        ("removable", 0.04),
                        ("magnetic", 0.35),
                        ("none", 0.0),
                    ],
                ),
            ),
            feature_cost: Some(AddonTable::new(
                "special_features",
                ChargeBasis::PerUnit,
                RateTable::new(
                    "special_features",
                    &[
                        ("serialization", 0.10),
                        ("barcode", 0.12),
                        ("qr_code", 0.12),
                        ("variable_data", 0.15),
                        ("embossing", 0.25),
                        ("mounting_holes", 0.08),
                        ("rounded_corners", 0.03),
                    ],
                ),
            )),
            turnaround_multiplier: RateTable::new(
                "turnaround_options",
                &[("standard", 1.0), ("rush", 1.25), ("express", 1.5)],
            ),
            lead_times: LeadTimes::new(&[("standard", 10), ("rush", 5), ("express", 2)]),
            volume_discounts: vec![
                DiscountTier { above: 5000, fraction: 0.20 },
                DiscountTier { above: 1000, fraction: 0.15 },
                DiscountTier { above: 500, fraction: 0.10 },
                DiscountTier { above: 100, fraction: 0.05 },
            ],
            material_share: 0.35,
            labor_share: 0.45,
            labor_includes_primary_addon: false,
            confidence_label: "High (Rule-based)".to_string(),
        }
    }
}

/// One pricing table per product variant.
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub print: PricingTable,
    pub nameplate: PricingTable,
}

impl PricingCatalog {
    pub fn standard() -> Self {
        Self {
            print: PricingTable::print(),
            nameplate: PricingTable::nameplate(),
        }
    }

    pub fn table_for(&self, variant: ProductVariant) -> &PricingTable {
        match variant {
            ProductVariant::Print => &self.print,
            ProductVariant::Nameplate => &self.nameplate,
        }
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
