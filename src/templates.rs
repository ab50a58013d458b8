use crate::models::CampaignInfo;

/// Source tag heading every matched-campaign body.
const SOURCE_TAG: &str = "📍 Origem: Google Ads Lead Form Extension";

/// Header introducing the feature bullet block.
const FEATURES_HEADER: &str = "✨ Destaques:";

/// Renders the human-readable message body for a lead.
///
/// With campaign info, produces the fixed-order labeled layout; without it,
/// a short fallback quoting the raw identifiers. Identical inputs always
/// produce byte-identical output.
pub fn render(campaign_id: &str, campaign_info: Option<&CampaignInfo>, lead_id: &str) -> String {
    match campaign_info {
        Some(info) => render_campaign(campaign_id, info),
        None => render_fallback(campaign_id, lead_id),
    }
}

/// Detailed body for a matched campaign.
///
/// Field order is data: each section is an ordered slice of (label, value)
/// pairs, so adding or reordering lines is an edit here, not new string
/// plumbing. Absent mapping fields arrive as empty strings and still get
/// their labeled line.
fn render_campaign(campaign_id: &str, info: &CampaignInfo) -> String {
    let property = &info.property;
    let details = &info.product_details;

    let header: [(&str, &str); 2] = [
        ("📢 Campanha", info.campaign_name.as_str()),
        ("🔑 Campaign ID", campaign_id),
    ];
    let listing: [(&str, &str); 6] = [
        ("🏢 Imóvel", details.building_name.as_str()),
        ("📌 Localização", property.neighbourhood.as_str()),
        ("📐 Área", details.area.as_str()),
        ("🛏️  Quartos", details.bedrooms.as_str()),
        ("🚗 Garagem", details.parking.as_str()),
        ("💰 Preço", property.price_display.as_str()),
    ];

    let mut lines = Vec::with_capacity(11 + details.features.len());
    lines.push(SOURCE_TAG.to_string());
    push_labeled(&mut lines, &header);
    lines.push(String::new());
    push_labeled(&mut lines, &listing);

    if !details.features.is_empty() {
        lines.push(String::new());
        lines.push(FEATURES_HEADER.to_string());
        for feature in &details.features {
            lines.push(format!("  • {}", feature));
        }
    }

    lines.join("\n")
}

fn push_labeled(lines: &mut Vec<String>, fields: &[(&str, &str)]) {
    for (label, value) in fields {
        lines.push(format!("{}: {}", label, value));
    }
}

/// Short body for an unmapped campaign: source label plus the raw
/// identifiers, nothing else.
fn render_fallback(campaign_id: &str, lead_id: &str) -> String {
    format!(
        "Lead Form do Google Ads\nCampaign ID: {}\nLead ID: {}",
        campaign_id, lead_id
    )
}
