use crate::domain::model::{Segment, SegmentInfo};

/// 每個顧客區隔對應的行銷策略
pub fn segment_info(segment: Segment) -> SegmentInfo {
    let (name, description, strategy, color) = match segment {
        Segment::PremiumLoyal => (
            "Premium Loyal",
            "VIP customers with high purchasing power and loyalty",
            "personalized_premium",
            "#ff6b6b",
        ),
        Segment::PremiumFocused => (
            "Premium Focused",
            "Customers who prefer high-end products",
            "quality_focused",
            "#4ecdc4",
        ),
        Segment::ExcellentLoyal => (
            "Excellent Loyal",
            "Customers with a steady purchasing pattern",
            "loyalty_balanced",
            "#45b7d1",
        ),
        Segment::ExcellentGeneral => (
            "Excellent General",
            "General customers with solid purchasing power",
            "balanced_general",
            "#96ceb4",
        ),
        Segment::GeneralValue => (
            "General Value",
            "Customers who care about value for money",
            "value_focused",
            "#ffeaa7",
        ),
        Segment::AtRisk => (
            "At Risk",
            "Customers whose purchase frequency is declining",
            "retention_focused",
            "#fd79a8",
        ),
        Segment::NewCustomer => (
            "New Customer",
            "Recently joined customers",
            "exploration_focused",
            "#a29bfe",
        ),
        Segment::Unknown => ("Unknown", "Undefined segment", "general", "#95a5a6"),
    };

    SegmentInfo {
        name: name.to_string(),
        description: description.to_string(),
        strategy: strategy.to_string(),
        color: color.to_string(),
    }
}
