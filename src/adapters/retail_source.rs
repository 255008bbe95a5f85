use crate::adapters::sample_source::read_rows;
use crate::domain::model::{
    Customer, Dataset, Product, Segment, Transaction, DEFAULT_BRAND, DEFAULT_PRICE,
};
use crate::domain::ports::{DatasetSource, Storage};
use crate::utils::error::{RecsysError, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

pub const RETAIL_PRODUCTS_FILE: &str = "product.csv";
pub const RETAIL_TRANSACTIONS_FILE: &str = "transaction_data.csv";
pub const RETAIL_DEMOGRAPHICS_FILE: &str = "hh_demographic.csv";

/// DAY 欄位為 1 起算的日數，對應到此日期
pub static RETAIL_EPOCH: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2020, 1, 1).expect("2020-01-01 is a valid date"));

static INCOME_BOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*K").expect("income pattern is a valid regex"));

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(rename = "PRODUCT_ID")]
    product_id: u64,
    #[serde(rename = "COMMODITY_DESC", default)]
    commodity: Option<String>,
    #[serde(rename = "SUB_COMMODITY_DESC", default)]
    sub_commodity: Option<String>,
    #[serde(rename = "BRAND", default)]
    brand: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    household_key: u64,
    #[serde(rename = "BASKET_ID", default)]
    basket_id: Option<u64>,
    #[serde(rename = "DAY")]
    day: i64,
    #[serde(rename = "PRODUCT_ID")]
    product_id: u64,
    #[serde(rename = "QUANTITY", default)]
    quantity: Option<u32>,
    #[serde(rename = "SALES_VALUE")]
    sales_value: f64,
}

#[derive(Debug, Deserialize)]
struct RawHousehold {
    household_key: u64,
    #[serde(rename = "INCOME_DESC", default)]
    income: Option<String>,
    #[serde(rename = "HOUSEHOLD_SIZE_DESC", default)]
    household_size: Option<String>,
    #[serde(rename = "AGE_DESC", default)]
    age: Option<String>,
}

fn non_empty(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// 依收入級距指派區隔
pub fn segment_for_income(income: Option<&str>) -> Segment {
    let Some(income) = income.map(str::trim).filter(|s| !s.is_empty()) else {
        return Segment::NewCustomer;
    };

    if income.contains("High") {
        return Segment::PremiumLoyal;
    }
    if income.contains("Medium") {
        return Segment::ExcellentGeneral;
    }
    if income.contains("Low") {
        return Segment::GeneralValue;
    }

    // "Under 15K" 視為 0；其他取級距下限，例如 "50-74K" -> 50
    let lower_bound = if income.starts_with("Under") {
        Some(0)
    } else {
        income
            .split(['-', '+'])
            .next()
            .and_then(|first| first.trim().trim_end_matches('K').parse::<u32>().ok())
            .or_else(|| {
                INCOME_BOUND
                    .captures(income)
                    .and_then(|caps| caps[1].parse::<u32>().ok())
            })
    };

    match lower_bound {
        Some(bound) if bound >= 100 => Segment::PremiumLoyal,
        Some(bound) if bound >= 50 => Segment::ExcellentGeneral,
        Some(_) => Segment::GeneralValue,
        None => Segment::NewCustomer,
    }
}

/// 超出日期範圍的 DAY 視為資料錯誤
pub fn retail_day_to_date(day: i64) -> Result<NaiveDate> {
    Duration::try_days(day.max(1) - 1)
        .and_then(|offset| RETAIL_EPOCH.checked_add_signed(offset))
        .ok_or_else(|| RecsysError::DataLoadError {
            source_name: "retail".to_string(),
            message: format!("DAY value {} is out of the supported date range", day),
        })
}

/// 零售面板資料 (product.csv, transaction_data.csv, hh_demographic.csv)
pub struct RetailCsvSource<S: Storage> {
    storage: S,
}

impl<S: Storage> RetailCsvSource<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> DatasetSource for RetailCsvSource<S> {
    fn name(&self) -> &str {
        "retail"
    }

    async fn load(&self) -> Result<Dataset> {
        let raw_products: Vec<RawProduct> = read_rows(&self.storage, RETAIL_PRODUCTS_FILE).await?;
        let raw_transactions: Vec<RawTransaction> =
            read_rows(&self.storage, RETAIL_TRANSACTIONS_FILE).await?;
        let raw_households: Vec<RawHousehold> =
            read_rows(&self.storage, RETAIL_DEMOGRAPHICS_FILE).await?;

        assemble(raw_products, raw_transactions, raw_households)
    }
}

fn assemble(
    raw_products: Vec<RawProduct>,
    raw_transactions: Vec<RawTransaction>,
    raw_households: Vec<RawHousehold>,
) -> Result<Dataset> {
    // 商品價格 = 該商品交易金額平均
    let mut price_totals: HashMap<u64, (f64, usize)> = HashMap::new();
    for t in &raw_transactions {
        let entry = price_totals.entry(t.product_id).or_insert((0.0, 0));
        entry.0 += t.sales_value;
        entry.1 += 1;
    }

    let products: Vec<Product> = raw_products
        .into_iter()
        .map(|raw| {
            let commodity = raw.commodity.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
            let price = price_totals
                .get(&raw.product_id)
                .map(|(total, count)| total / *count as f64)
                .unwrap_or(DEFAULT_PRICE);
            Product {
                product_id: raw.product_id,
                product_name: commodity
                    .clone()
                    .unwrap_or_else(|| "Unknown Product".to_string()),
                category: commodity.unwrap_or_else(|| "Unknown Category".to_string()),
                sub_category: non_empty(raw.sub_commodity, "Unknown Sub-Category"),
                brand: non_empty(raw.brand, DEFAULT_BRAND),
                price,
                description: None,
                rating: None,
            }
        })
        .collect();

    let categories: HashMap<u64, &str> = products
        .iter()
        .map(|p| (p.product_id, p.category.as_str()))
        .collect();

    let mut household_totals: HashMap<u64, (f64, u64, HashSet<u64>)> = HashMap::new();
    let transactions: Vec<Transaction> = raw_transactions
        .into_iter()
        .map(|raw| {
            let totals = household_totals
                .entry(raw.household_key)
                .or_insert_with(|| (0.0, 0, HashSet::new()));
            totals.0 += raw.sales_value;
            totals.1 += 1;
            if let Some(basket) = raw.basket_id {
                totals.2.insert(basket);
            }

            Ok(Transaction {
                transaction_id: None,
                customer_id: raw.household_key,
                product_id: raw.product_id,
                transaction_date: retail_day_to_date(raw.day)?,
                quantity: raw.quantity.unwrap_or(1),
                amount: raw.sales_value,
                category: categories
                    .get(&raw.product_id)
                    .copied()
                    .unwrap_or("Unknown Category")
                    .to_string(),
                channel: None,
                basket_id: raw.basket_id,
            })
        })
        .collect::<Result<_>>()?;

    let customers: Vec<Customer> = raw_households
        .into_iter()
        .map(|raw| {
            let mut customer =
                Customer::new(raw.household_key, segment_for_income(raw.income.as_deref()));
            if let Some((spent, count, baskets)) = household_totals.get(&raw.household_key) {
                customer.total_spent = *spent;
                customer.total_transactions = *count;
                customer.frequency = baskets.len() as u32;
            }
            customer.income = raw.income;
            customer.household_size = raw.household_size;
            customer.age = raw
                .age
                .as_deref()
                .and_then(|age| age.split(['-', '+']).next())
                .and_then(|lower| lower.trim().parse().ok());
            customer
        })
        .collect();

    Ok(Dataset {
        customers,
        products,
        transactions,
    })
}
