use crate::core::generator::DataGenerator;
use crate::domain::model::Dataset;
use crate::domain::ports::DatasetSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub const GENERATED_CUSTOMERS: usize = 100;
pub const GENERATED_PRODUCTS: usize = 500;
pub const GENERATED_TRANSACTIONS: usize = 5000;

/// 真實資料不可用時的後備資料
pub struct GeneratedSource {
    seed: u64,
    today: NaiveDate,
}

impl GeneratedSource {
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        Self { seed, today }
    }
}

#[async_trait]
impl DatasetSource for GeneratedSource {
    fn name(&self) -> &str {
        "generated"
    }

    async fn load(&self) -> Result<Dataset> {
        let mut generator = DataGenerator::new(self.seed, self.today);
        Ok(generator.generate_dataset(
            GENERATED_CUSTOMERS,
            GENERATED_PRODUCTS,
            GENERATED_TRANSACTIONS,
        ))
    }
}
