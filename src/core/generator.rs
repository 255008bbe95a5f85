use crate::domain::model::{Customer, Dataset, Product, Segment, Transaction};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{Duration, NaiveDate};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 42;
pub const SAMPLE_CUSTOMERS_FILE: &str = "customers.csv";
pub const SAMPLE_PRODUCTS_FILE: &str = "products.csv";
pub const SAMPLE_TRANSACTIONS_FILE: &str = "transactions.csv";

const CATEGORIES: [&str; 20] = [
    "ELECTRONICS",
    "CLOTHING",
    "FOOD & BEVERAGE",
    "HOME & GARDEN",
    "BOOKS",
    "SPORTS",
    "BEAUTY",
    "TOYS",
    "AUTOMOTIVE",
    "HEALTH",
    "GROCERY",
    "MEAT",
    "PRODUCE",
    "DAIRY",
    "BEVERAGES",
    "SNACKS",
    "FROZEN",
    "BAKERY",
    "PERSONAL CARE",
    "CLEANING",
];

const VARIANTS: [&str; 5] = ["Premium", "Standard", "Eco", "Luxury", "Basic"];
const BRANDS: [&str; 5] = ["Brand A", "Brand B", "Brand C", "Brand D", "Brand E"];
const CITIES: [&str; 7] = ["Seoul", "Busan", "Daegu", "Incheon", "Gwangju", "Daejeon", "Ulsan"];

/// 區隔分布，順序同 Segment::ALL
const SEGMENT_WEIGHTS: [f64; 7] = [0.05, 0.10, 0.15, 0.20, 0.25, 0.15, 0.10];
const QUANTITIES: [u32; 3] = [1, 2, 3];
const QUANTITY_WEIGHTS: [f64; 3] = [0.8, 0.15, 0.05];
const ONLINE_SHARE: f64 = 0.6;

fn product_templates(category: &str) -> Option<&'static [&'static str]> {
    let templates: &'static [&'static str] = match category {
        "ELECTRONICS" => &["Smartphone", "TV", "Laptop", "Tablet", "Earphones", "Speaker", "Camera"],
        "CLOTHING" => &["T-Shirt", "Jeans", "Sneakers", "Jacket", "Dress", "Pants", "Shirt"],
        "FOOD & BEVERAGE" => &["Coffee", "Tea", "Juice", "Water", "Milk", "Beer", "Wine"],
        "GROCERY" => &["Rice", "Noodles", "Bread", "Cereal", "Crackers", "Ramen", "Canned Food"],
        "MEAT" => &["Beef", "Pork", "Chicken", "Fish", "Shrimp", "Crab", "Squid"],
        "PRODUCE" => &["Apple", "Banana", "Orange", "Grape", "Strawberry", "Pear", "Kiwi"],
        "DAIRY" => &["Milk", "Yogurt", "Cheese", "Butter", "Cream", "Ice Cream"],
        "BEVERAGES" => &["Cola", "Cider", "Orange Juice", "Coffee", "Tea", "Water", "Energy Drink"],
        "PERSONAL CARE" => &["Shampoo", "Soap", "Toothpaste", "Lotion", "Perfume", "Cream"],
        "HOME & GARDEN" => &["Vacuum", "Washer", "Refrigerator", "Planter", "Furniture", "Lamp"],
        _ => return None,
    };
    Some(templates)
}

struct SegmentProfile {
    spending: (f64, f64),
    frequency: (u32, u32),
    rfm: (f64, f64),
}

fn segment_profile(segment: Segment) -> SegmentProfile {
    let (spending, frequency, rfm) = match segment {
        Segment::PremiumLoyal => ((100.0, 500.0), (20, 50), (10.0, 15.0)),
        Segment::PremiumFocused => ((80.0, 300.0), (5, 20), (8.0, 12.0)),
        Segment::ExcellentLoyal => ((50.0, 200.0), (15, 40), (8.0, 12.0)),
        Segment::ExcellentGeneral => ((50.0, 150.0), (10, 25), (6.0, 10.0)),
        Segment::GeneralValue => ((20.0, 100.0), (5, 20), (4.0, 8.0)),
        Segment::AtRisk => ((30.0, 120.0), (2, 10), (2.0, 6.0)),
        Segment::NewCustomer | Segment::Unknown => ((10.0, 80.0), (1, 8), (1.0, 5.0)),
    };
    SegmentProfile {
        spending,
        frequency,
        rfm,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 可重現的範例資料產生器
pub struct DataGenerator {
    rng: StdRng,
    today: NaiveDate,
    segment_dist: WeightedIndex<f64>,
    quantity_dist: WeightedIndex<f64>,
}

impl DataGenerator {
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
            segment_dist: WeightedIndex::new(SEGMENT_WEIGHTS)
                .expect("segment weights are positive constants"),
            quantity_dist: WeightedIndex::new(QUANTITY_WEIGHTS)
                .expect("quantity weights are positive constants"),
        }
    }

    pub fn generate_customers(&mut self, n_customers: usize) -> Vec<Customer> {
        (1..=n_customers as u64)
            .map(|customer_id| {
                let segment = Segment::ALL[self.segment_dist.sample(&mut self.rng)];
                let profile = segment_profile(segment);

                let mut customer = Customer::new(customer_id, segment);
                customer.total_spent =
                    round_to(self.rng.random_range(profile.spending.0..profile.spending.1), 2);
                customer.frequency = self.rng.random_range(profile.frequency.0..profile.frequency.1);
                customer.rfm_score = Some(round_to(
                    self.rng.random_range(profile.rfm.0..profile.rfm.1),
                    1,
                ));
                customer.join_date =
                    Some(self.today - Duration::days(self.rng.random_range(30..730)));
                customer.age = Some(self.rng.random_range(18..70));
                customer.gender = ["M", "F"].choose(&mut self.rng).map(|g| g.to_string());
                customer.city = CITIES.choose(&mut self.rng).map(|c| c.to_string());
                customer
            })
            .collect()
    }

    pub fn generate_products(&mut self, n_products: usize) -> Vec<Product> {
        (1..=n_products as u64)
            .map(|product_id| {
                let category = *CATEGORIES
                    .choose(&mut self.rng)
                    .expect("category list is not empty");

                let template = product_templates(category).and_then(|t| t.choose(&mut self.rng));
                let (product_name, sub_category) = match template {
                    Some(base) => {
                        let variant = VARIANTS.choose(&mut self.rng).copied().unwrap_or_default();
                        (format!("{} {}", variant, base), base.to_string())
                    }
                    None => (format!("Product {}", product_id), category.to_string()),
                };

                let price_range = match category {
                    "ELECTRONICS" => (50.0, 500.0),
                    "MEAT" | "PRODUCE" | "DAIRY" => (5.0, 50.0),
                    "GROCERY" => (2.0, 30.0),
                    _ => (10.0, 100.0),
                };
                let price = round_to(self.rng.random_range(price_range.0..price_range.1), 2);
                let brand = BRANDS
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or_default()
                    .to_string();

                Product {
                    product_id,
                    description: Some(format!(
                        "{} - {} product from {}",
                        product_name, category, brand
                    )),
                    product_name,
                    category: category.to_string(),
                    sub_category,
                    brand,
                    price,
                    rating: Some(round_to(self.rng.random_range(3.0..5.0), 1)),
                }
            })
            .collect()
    }

    pub fn generate_transactions(
        &mut self,
        customers: &[Customer],
        products: &[Product],
        n_transactions: usize,
    ) -> Vec<Transaction> {
        if customers.is_empty() || products.is_empty() {
            return Vec::new();
        }

        (1..=n_transactions as u64)
            .filter_map(|transaction_id| {
                let customer_id = customers.choose(&mut self.rng)?.customer_id;
                let product = products.choose(&mut self.rng)?;
                let days_ago = self.rng.random_range(1..365);
                let quantity = QUANTITIES[self.quantity_dist.sample(&mut self.rng)];
                let unit_price = product.price * self.rng.random_range(0.8..1.2);
                let channel = if self.rng.random::<f64>() < ONLINE_SHARE {
                    "online"
                } else {
                    "offline"
                };

                Some(Transaction {
                    transaction_id: Some(transaction_id),
                    customer_id,
                    product_id: product.product_id,
                    transaction_date: self.today - Duration::days(days_ago),
                    quantity,
                    amount: round_to(unit_price * quantity as f64, 2),
                    category: product.category.clone(),
                    channel: Some(channel.to_string()),
                    basket_id: None,
                })
            })
            .collect()
    }

    pub fn generate_dataset(
        &mut self,
        n_customers: usize,
        n_products: usize,
        n_transactions: usize,
    ) -> Dataset {
        let customers = self.generate_customers(n_customers);
        let products = self.generate_products(n_products);
        let transactions = self.generate_transactions(&customers, &products, n_transactions);
        Dataset {
            customers,
            products,
            transactions,
        }
    }
}

/// 將資料集寫成 customers.csv / products.csv / transactions.csv
pub async fn write_sample_files<S: Storage>(storage: &S, dataset: &Dataset) -> Result<()> {
    storage
        .write_file(SAMPLE_CUSTOMERS_FILE, &to_csv(&dataset.customers)?)
        .await?;
    storage
        .write_file(SAMPLE_PRODUCTS_FILE, &to_csv(&dataset.products)?)
        .await?;
    storage
        .write_file(SAMPLE_TRANSACTIONS_FILE, &to_csv(&dataset.transactions)?)
        .await?;

    tracing::info!("✅ Sample data generated:");
    tracing::info!("   - customers: {}", dataset.customers.len());
    tracing::info!("   - products: {}", dataset.products.len());
    tracing::info!("   - transactions: {}", dataset.transactions.len());
    Ok(())
}

pub fn to_csv<T: serde::Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::RecsysError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = DataGenerator::new(7, today()).generate_dataset(20, 30, 100);
        let b = DataGenerator::new(7, today()).generate_dataset(20, 30, 100);
        assert_eq!(a.customers, b.customers);
        assert_eq!(a.products, b.products);
        assert_eq!(a.transactions, b.transactions);
    }

    #[test]
    fn test_customers_follow_segment_ranges() {
        let customers = DataGenerator::new(DEFAULT_SEED, today()).generate_customers(200);
        assert_eq!(customers.len(), 200);
        for customer in &customers {
            let profile = segment_profile(customer.segment);
            assert!(customer.total_spent >= profile.spending.0);
            assert!(customer.total_spent <= profile.spending.1);
            assert!(customer.frequency >= profile.frequency.0);
            assert!(customer.frequency < profile.frequency.1);
            let joined = customer.join_date.unwrap();
            assert!((today() - joined).num_days() >= 30);
        }
        let segments: HashSet<Segment> = customers.iter().map(|c| c.segment).collect();
        assert!(segments.len() > 3);
        assert!(!segments.contains(&Segment::Unknown));
    }

    #[test]
    fn test_transactions_reference_generated_entities() {
        let dataset = DataGenerator::new(DEFAULT_SEED, today()).generate_dataset(10, 25, 300);
        let product_ids: HashSet<u64> = dataset.products.iter().map(|p| p.product_id).collect();

        for transaction in &dataset.transactions {
            assert!(transaction.customer_id >= 1 && transaction.customer_id <= 10);
            assert!(product_ids.contains(&transaction.product_id));
            assert!((1..=3).contains(&transaction.quantity));
            assert!(transaction.transaction_date < today());
            assert!(transaction.amount > 0.0);
            assert!(!transaction.category.is_empty());
        }
    }

    #[test]
    fn test_templated_products_carry_sub_category() {
        let products = DataGenerator::new(DEFAULT_SEED, today()).generate_products(100);
        for product in products {
            if product_templates(&product.category).is_some() {
                assert!(product.product_name.ends_with(&product.sub_category));
            } else {
                assert_eq!(product.product_name, format!("Product {}", product.product_id));
            }
        }
    }

    #[test]
    fn test_quantities_are_mostly_single_units() {
        let dataset = DataGenerator::new(DEFAULT_SEED, today()).generate_dataset(20, 40, 2000);
        let singles = dataset.transactions.iter().filter(|t| t.quantity == 1).count();
        let triples = dataset.transactions.iter().filter(|t| t.quantity == 3).count();
        // 權重 0.8 / 0.15 / 0.05
        assert!(singles > 1400 && singles < 1800);
        assert!(triples < 250);
    }

    #[test]
    fn test_segment_mix_favours_general_value() {
        let customers = DataGenerator::new(DEFAULT_SEED, today()).generate_customers(1000);
        let count = |segment: Segment| customers.iter().filter(|c| c.segment == segment).count();
        assert!(count(Segment::GeneralValue) > count(Segment::PremiumLoyal) * 2);
    }

    #[test]
    fn test_no_transactions_without_products() {
        let mut generator = DataGenerator::new(DEFAULT_SEED, today());
        let customers = generator.generate_customers(3);
        assert!(generator.generate_transactions(&customers, &[], 10).is_empty());
    }
}
