use chrono::NaiveDate;
use estimo_catalog::{AddonTable, ChargeBasis, PricingTable, RateTable};
use estimo_core::{Order, ProductVariant, DELIVERY_DATE_FORMAT};

/// Build the pricing prompt for one order.
///
/// The guidelines are rendered from the same table the rule-based calculator
/// uses, so both paths quote from one set of numbers.
pub fn build_prompt(order: &Order, table: &PricingTable, today: NaiveDate) -> String {
    let mut lines = Vec::new();

    lines.push(match table.variant {
        ProductVariant::Print => {
            "You are an expert pricing analyst for a commercial printing company.".to_string()
        }
        ProductVariant::Nameplate => "You are an expert pricing analyst for a manufacturer of \
             industrial nameplates, labels, decals and asset tags."
            .to_string(),
    });
    lines.push("Analyze this order and provide a detailed price breakdown.".to_string());
    lines.push(String::new());

    lines.push("Order Details:".to_string());
    for (field, value) in order_details(order) {
        lines.push(format!("- {}: {}", field, value));
    }
    lines.push(String::new());

    lines.push("Base Pricing Guidelines:".to_string());
    lines.extend(guidelines(table));
    lines.push(String::new());

    lines.push(format!(
        "Today's date is {}. Provide a JSON response with this exact structure:",
        today.format(DELIVERY_DATE_FORMAT)
    ));
    lines.push(response_shape(table));
    lines.push(String::new());
    lines.push(
        "Consider market rates, complexity, and provide competitive but profitable pricing."
            .to_string(),
    );

    lines.join("\n")
}

fn or_none(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "none".to_string())
}

fn order_details(order: &Order) -> Vec<(&'static str, String)> {
    let (mut details, width, height, notes) = match order {
        Order::Print(job) => (
            vec![
                ("Paper Type", job.paper_type.clone()),
                ("Paper Size", job.paper_size.clone()),
                ("Color", job.color_type.clone()),
                ("Quantity", job.quantity.to_string()),
                ("Sides", job.sides.clone()),
                ("Binding", or_none(&job.binding)),
                ("Lamination", or_none(&job.lamination)),
                ("Turnaround", job.turnaround.clone()),
            ],
            job.custom_width,
            job.custom_height,
            &job.additional_notes,
        ),
        Order::Nameplate(plate) => (
            vec![
                ("Product Type", plate.product_type.clone()),
                ("Material", plate.material.clone()),
                ("Size (inches)", plate.size.clone()),
                ("Colors", plate.colors.clone()),
                ("Quantity", plate.quantity.to_string()),
                ("Finish", or_none(&plate.finish)),
                ("Adhesive", or_none(&plate.adhesive)),
                (
                    "Special Features",
                    if plate.special_features.is_empty() {
                        "none".to_string()
                    } else {
                        plate.special_features.join(", ")
                    },
                ),
                ("Turnaround", plate.turnaround.clone()),
            ],
            plate.custom_width,
            plate.custom_height,
            &plate.additional_notes,
        ),
    };

    if width.is_some() || height.is_some() {
        let dim = |v: Option<f64>| v.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string());
        details.push(("Custom Dimensions", format!("{} x {}", dim(width), dim(height))));
    }
    details.push(("Additional Notes", or_none(notes)));
    details
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

fn list_costs(rates: &RateTable, suffix: &str) -> String {
    rates
        .entries
        .iter()
        .filter(|(_, cost)| *cost > 0.0)
        .map(|(option, cost)| format!("{} {}{}", option, money(*cost), suffix))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_multipliers(rates: &RateTable) -> String {
    rates
        .entries
        .iter()
        .map(|(option, m)| format!("{} x{}", option, m))
        .collect::<Vec<_>>()
        .join(", ")
}

fn addon_line(name: &str, addon: &AddonTable) -> String {
    let suffix = match addon.basis {
        ChargeBasis::PerJob => " per job",
        ChargeBasis::PerUnit => " per unit",
    };
    format!("- {}: {}", name, list_costs(&addon.rates, suffix))
}

fn guidelines(table: &PricingTable) -> Vec<String> {
    let (base_name, primary_name, secondary_name) = match table.variant {
        ProductVariant::Print => ("Paper cost", "Binding", "Lamination"),
        ProductVariant::Nameplate => ("Material cost", "Finish", "Adhesive"),
    };

    let mut lines = vec![
        format!("- {}: {}", base_name, list_costs(&table.base_cost, "/unit")),
        format!("- Size multipliers: {}", list_multipliers(&table.size_multiplier)),
        format!("- Color multipliers: {}", list_multipliers(&table.color_multiplier)),
    ];
    if let Some(sides) = &table.sides_multiplier {
        lines.push(format!("- Sides multipliers: {}", list_multipliers(sides)));
    }

    let mut tiers = table.volume_discounts.clone();
    tiers.sort_by_key(|tier| tier.above);
    let discounts = tiers
        .iter()
        .map(|tier| format!("{} for more than {} units", percent(tier.fraction), tier.above))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!(
        "- Volume discounts (off the base price, highest tier only): {}",
        discounts
    ));

    lines.push(addon_line(primary_name, &table.primary_addon));
    lines.push(addon_line(secondary_name, &table.secondary_addon));
    if let Some(features) = &table.feature_cost {
        lines.push(addon_line("Special features", features));
    }

    let rush = table
        .turnaround_multiplier
        .entries
        .iter()
        .filter(|(_, m)| *m > 1.0)
        .map(|(tier, m)| format!("{} +{}", tier, percent(m - 1.0)))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("- Rush fees (on the base price): {}", rush));

    let lead = table
        .lead_times
        .0
        .iter()
        .map(|(tier, days)| format!("{} {} days", tier, days))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("- Lead times: {}", lead));

    lines.push(format!(
        "- Material cost is about {} and labor about {} of the base price",
        percent(table.material_share),
        percent(table.labor_share)
    ));

    lines
}

fn response_shape(table: &PricingTable) -> String {
    let mut breakdown = vec!["        \"per_unit_cost\": <number>".to_string()];
    for label in table.line_item_labels() {
        breakdown.push(format!("        \"{}\": <number>", label));
    }
    breakdown.push("        \"volume_discount_applied\": <boolean>".to_string());
    breakdown.push("        \"reasoning\": \"<brief explanation>\"".to_string());

    format!(
        "{{\n    \"base_price\": <number>,\n    \"material_cost\": <number>,\n    \
         \"labor_cost\": <number>,\n    \"rush_fee\": <number>,\n    \
         \"total_price\": <number>,\n    \"breakdown\": {{\n{}\n    }},\n    \
         \"confidence\": \"<High/Medium/Low>\",\n    \
         \"estimated_delivery\": \"<YYYY-MM-DD>\"\n}}",
        breakdown.join(",\n")
    )
}
