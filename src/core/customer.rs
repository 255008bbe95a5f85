use crate::core::segments::segment_info;
use crate::domain::model::{Customer, Segment, SegmentInfo, Transaction};
use crate::utils::error::{RecsysError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_TRANSACTION_LIMIT: usize = 50;
pub const DEFAULT_SIMILAR_CUSTOMERS: usize = 5;
pub const DEFAULT_CUSTOMER_LIST_LIMIT: usize = 20;
const STATISTICS_WINDOW: usize = 1000;
const FAVORITE_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(flatten)]
    pub customer: Customer,
    pub segment_info: SegmentInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCategory {
    pub category: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseCadence {
    NoData,
    SinglePurchase,
    VeryFrequent,
    Frequent,
    Regular,
    Infrequent,
}

impl PurchaseCadence {
    fn from_average_gap(days: f64) -> Self {
        if days <= 7.0 {
            PurchaseCadence::VeryFrequent
        } else if days <= 30.0 {
            PurchaseCadence::Frequent
        } else if days <= 90.0 {
            PurchaseCadence::Regular
        } else {
            PurchaseCadence::Infrequent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFrequency {
    pub avg_days_between_purchases: f64,
    pub purchase_pattern: PurchaseCadence,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonalSpending {
    pub spring: f64,
    pub summer: f64,
    pub autumn: f64,
    pub winter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStatistics {
    pub total_transactions: usize,
    pub total_amount: f64,
    pub avg_transaction_amount: f64,
    pub last_transaction_date: Option<NaiveDate>,
    pub days_since_last_purchase: i64,
    pub favorite_categories: Vec<FavoriteCategory>,
    pub monthly_spending: BTreeMap<String, f64>,
    pub purchase_frequency: PurchaseFrequency,
    pub seasonal_patterns: SeasonalSpending,
}

impl CustomerStatistics {
    fn empty() -> Self {
        Self {
            total_transactions: 0,
            total_amount: 0.0,
            avg_transaction_amount: 0.0,
            last_transaction_date: None,
            days_since_last_purchase: 0,
            favorite_categories: Vec::new(),
            monthly_spending: BTreeMap::new(),
            purchase_frequency: PurchaseFrequency {
                avg_days_between_purchases: 0.0,
                purchase_pattern: PurchaseCadence::NoData,
            },
            seasonal_patterns: SeasonalSpending::default(),
        }
    }
}

/// 顧客檔案頁的購買摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub transaction_count: usize,
    pub avg_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
    pub category_distribution: Vec<CategoryCount>,
    pub daily_spending: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCustomer {
    pub customer_id: u64,
    pub segment: Segment,
    pub total_spent: f64,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOverview {
    pub segment: Segment,
    pub info: SegmentInfo,
    pub customer_count: usize,
}

pub struct CustomerManager {
    customers: Vec<Customer>,
    by_id: HashMap<u64, usize>,
    transactions: HashMap<u64, Vec<Transaction>>,
}

impl CustomerManager {
    pub fn new(customers: Vec<Customer>, transactions: Vec<Transaction>) -> Self {
        let by_id = customers
            .iter()
            .enumerate()
            .map(|(i, customer)| (customer.customer_id, i))
            .collect();

        let mut grouped: HashMap<u64, Vec<Transaction>> = HashMap::new();
        for transaction in transactions {
            grouped
                .entry(transaction.customer_id)
                .or_default()
                .push(transaction);
        }
        // 最近的交易在前；同日保持原始順序
        for list in grouped.values_mut() {
            list.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        }

        tracing::info!("✅ Customers loaded: {}", customers.len());
        tracing::info!(
            "✅ Transactions loaded: {}",
            grouped.values().map(Vec::len).sum::<usize>()
        );

        Self {
            customers,
            by_id,
            transactions: grouped,
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// 依區隔篩選 (None 為全部)，保持資料集順序
    pub fn list_customers(&self, segment: Option<Segment>, limit: usize) -> Vec<&Customer> {
        self.customers
            .iter()
            .filter(|customer| segment.map_or(true, |s| customer.segment == s))
            .take(limit)
            .collect()
    }

    pub fn customer(&self, customer_id: u64) -> Result<&Customer> {
        self.by_id
            .get(&customer_id)
            .map(|&i| &self.customers[i])
            .ok_or(RecsysError::CustomerNotFound { customer_id })
    }

    pub fn profile(&self, customer_id: u64) -> Result<CustomerProfile> {
        let customer = self.customer(customer_id)?;
        Ok(CustomerProfile {
            customer: customer.clone(),
            segment_info: segment_info(customer.segment),
        })
    }

    pub fn segment_info(&self, segment: Segment) -> SegmentInfo {
        segment_info(segment)
    }

    pub fn transactions(&self, customer_id: u64, limit: usize) -> &[Transaction] {
        self.transactions
            .get(&customer_id)
            .map(|list| &list[..limit.min(list.len())])
            .unwrap_or_default()
    }

    pub fn statistics(&self, customer_id: u64, today: NaiveDate) -> CustomerStatistics {
        let transactions = self.transactions(customer_id, STATISTICS_WINDOW);
        if transactions.is_empty() {
            return CustomerStatistics::empty();
        }

        let total_amount: f64 = transactions.iter().map(|t| t.amount).sum();
        let last_transaction_date = transactions.iter().map(|t| t.transaction_date).max();
        let days_since_last_purchase = last_transaction_date
            .map(|last| (today - last).num_days())
            .unwrap_or(0);

        CustomerStatistics {
            total_transactions: transactions.len(),
            total_amount,
            avg_transaction_amount: total_amount / transactions.len() as f64,
            last_transaction_date,
            days_since_last_purchase,
            favorite_categories: favorite_categories(transactions, FAVORITE_CATEGORIES),
            monthly_spending: monthly_spending(transactions),
            purchase_frequency: purchase_frequency(transactions),
            seasonal_patterns: seasonal_spending(transactions),
        }
    }

    pub fn spending_summary(&self, customer_id: u64) -> Option<SpendingSummary> {
        let transactions = self.transactions.get(&customer_id)?;
        if transactions.is_empty() {
            return None;
        }

        let amounts = transactions.iter().map(|t| t.amount);
        let total: f64 = amounts.clone().sum();
        let max_amount = amounts.clone().fold(f64::MIN, f64::max);
        let min_amount = amounts.fold(f64::MAX, f64::min);

        let mut categories: HashMap<&str, usize> = HashMap::new();
        let mut daily_spending: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for transaction in transactions {
            *categories.entry(transaction.category.as_str()).or_insert(0) += 1;
            *daily_spending
                .entry(transaction.transaction_date)
                .or_insert(0.0) += transaction.amount;
        }

        let mut category_distribution: Vec<CategoryCount> = categories
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        category_distribution
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        Some(SpendingSummary {
            transaction_count: transactions.len(),
            avg_amount: total / transactions.len() as f64,
            max_amount,
            min_amount,
            category_distribution,
            daily_spending,
        })
    }

    pub fn similar_customers(&self, customer_id: u64, top_n: usize) -> Vec<SimilarCustomer> {
        let Ok(target) = self.customer(customer_id) else {
            return Vec::new();
        };

        self.customers
            .iter()
            .filter(|c| c.segment == target.segment && c.customer_id != customer_id)
            .take(top_n)
            .map(|c| SimilarCustomer {
                customer_id: c.customer_id,
                segment: c.segment,
                total_spent: c.total_spent,
                frequency: c.frequency,
            })
            .collect()
    }

    pub fn segment_overview(&self) -> Vec<SegmentOverview> {
        let mut counts: BTreeMap<Segment, usize> = BTreeMap::new();
        for customer in &self.customers {
            *counts.entry(customer.segment).or_insert(0) += 1;
        }

        let mut segments: Vec<Segment> = Segment::ALL.to_vec();
        if counts.contains_key(&Segment::Unknown) {
            segments.push(Segment::Unknown);
        }

        segments
            .into_iter()
            .map(|segment| SegmentOverview {
                segment,
                info: segment_info(segment),
                customer_count: counts.get(&segment).copied().unwrap_or(0),
            })
            .collect()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn favorite_categories(transactions: &[Transaction], top_n: usize) -> Vec<FavoriteCategory> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for transaction in transactions {
        let entry = totals.entry(transaction.category.as_str()).or_insert((0.0, 0));
        entry.0 += transaction.amount;
        entry.1 += 1;
    }

    let mut categories: Vec<FavoriteCategory> = totals
        .into_iter()
        .map(|(category, (total, count))| FavoriteCategory {
            category: category.to_string(),
            total_spent: round_to(total, 2),
            purchase_count: count,
            avg_amount: round_to(total / count as f64, 2),
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories.truncate(top_n);
    categories
}

fn monthly_spending(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for transaction in transactions {
        *months
            .entry(transaction.transaction_date.format("%Y-%m").to_string())
            .or_insert(0.0) += transaction.amount;
    }
    months
}

fn purchase_frequency(transactions: &[Transaction]) -> PurchaseFrequency {
    let dates: BTreeSet<NaiveDate> = transactions.iter().map(|t| t.transaction_date).collect();
    if dates.len() < 2 {
        return PurchaseFrequency {
            avg_days_between_purchases: 0.0,
            purchase_pattern: if dates.is_empty() {
                PurchaseCadence::NoData
            } else {
                PurchaseCadence::SinglePurchase
            },
        };
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    let avg_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

    PurchaseFrequency {
        avg_days_between_purchases: round_to(avg_gap, 1),
        purchase_pattern: PurchaseCadence::from_average_gap(avg_gap),
    }
}

fn seasonal_spending(transactions: &[Transaction]) -> SeasonalSpending {
    let mut seasons = SeasonalSpending::default();
    for transaction in transactions {
        let slot = match transaction.transaction_date.month() {
            3..=5 => &mut seasons.spring,
            6..=8 => &mut seasons.summer,
            9..=11 => &mut seasons.autumn,
            _ => &mut seasons.winter,
        };
        *slot += transaction.amount;
    }
    seasons
}
