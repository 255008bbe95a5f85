use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    PremiumLoyal,
    PremiumFocused,
    ExcellentLoyal,
    ExcellentGeneral,
    #[default]
    GeneralValue,
    AtRisk,
    NewCustomer,
    #[serde(other)]
    Unknown,
}

impl Segment {
    /// 已定義的區隔，不含 Unknown
    pub const ALL: [Segment; 7] = [
        Segment::PremiumLoyal,
        Segment::PremiumFocused,
        Segment::ExcellentLoyal,
        Segment::ExcellentGeneral,
        Segment::GeneralValue,
        Segment::AtRisk,
        Segment::NewCustomer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::PremiumLoyal => "premium_loyal",
            Segment::PremiumFocused => "premium_focused",
            Segment::ExcellentLoyal => "excellent_loyal",
            Segment::ExcellentGeneral => "excellent_general",
            Segment::GeneralValue => "general_value",
            Segment::AtRisk => "at_risk",
            Segment::NewCustomer => "new_customer",
            Segment::Unknown => "unknown",
        }
    }

    pub fn parse(label: &str) -> Segment {
        Segment::ALL
            .into_iter()
            .find(|segment| segment.as_str() == label.trim())
            .unwrap_or(Segment::Unknown)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub description: String,
    pub strategy: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: u64,
    pub segment: Segment,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub rfm_score: Option<f64>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub income: Option<String>,
    #[serde(default)]
    pub household_size: Option<String>,
}

impl Customer {
    pub fn new(customer_id: u64, segment: Segment) -> Self {
        Self {
            customer_id,
            segment,
            total_spent: 0.0,
            frequency: 0,
            total_transactions: 0,
            rfm_score: None,
            join_date: None,
            age: None,
            gender: None,
            city: None,
            income: None,
            household_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: u64,
    pub product_name: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_price")]
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

pub const DEFAULT_BRAND: &str = "Store Brand";
pub const DEFAULT_PRICE: f64 = 5.0;

fn default_brand() -> String {
    DEFAULT_BRAND.to_string()
}

fn default_price() -> f64 {
    DEFAULT_PRICE
}

impl Product {
    /// 建立 TF-IDF 索引用的文字
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.product_name, self.sub_category, self.category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_id: Option<u64>,
    pub customer_id: u64,
    pub product_id: u64,
    pub transaction_date: NaiveDate,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub basket_id: Option<u64>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub customers: usize,
    pub products: usize,
    pub transactions: usize,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            customers: self.customers.len(),
            products: self.products.len(),
            transactions: self.transactions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() && self.products.is_empty() && self.transactions.is_empty()
    }
}
