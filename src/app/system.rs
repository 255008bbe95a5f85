use crate::adapters::{
    FallbackSource, GeneratedSource, LocalStorage, RetailCsvSource, SampleCsvSource,
};
use crate::config::{DataConfig, DataSourceKind};
use crate::core::customer::{CustomerManager, CustomerStatistics};
use crate::core::recommendation::{
    Recommendation, RecommendationEngine, RecommendationRequest, RecommendationSettings,
};
use crate::domain::model::{Dataset, DatasetSummary};
use crate::domain::ports::DatasetSource;
use crate::utils::error::{RecsysError, Result};
use chrono::NaiveDate;

/// 依設定建立資料來源；auto 依序嘗試 retail -> sample -> generated
pub fn build_source(data: &DataConfig, today: NaiveDate) -> Box<dyn DatasetSource> {
    let retail = || -> Box<dyn DatasetSource> {
        Box::new(RetailCsvSource::new(LocalStorage::new(&data.dir)))
    };
    let sample = || -> Box<dyn DatasetSource> {
        Box::new(SampleCsvSource::new(LocalStorage::new(&data.dir)))
    };
    let generated = || -> Box<dyn DatasetSource> { Box::new(GeneratedSource::new(data.seed, today)) };

    match data.source {
        DataSourceKind::Retail => retail(),
        DataSourceKind::Sample => sample(),
        DataSourceKind::Generated => generated(),
        DataSourceKind::Auto => Box::new(FallbackSource::new(vec![
            retail(),
            sample(),
            generated(),
        ])),
    }
}

/// 計算統計時的「今天」；Local 每次呼叫重新取得日期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Local,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => chrono::Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

impl From<NaiveDate> for Clock {
    fn from(date: NaiveDate) -> Self {
        Clock::Fixed(date)
    }
}

/// 已載入資料並完成索引的推薦系統，CLI 與 API 共用
pub struct RecommendationSystem {
    source_name: String,
    summary: DatasetSummary,
    manager: CustomerManager,
    engine: RecommendationEngine,
    clock: Clock,
}

impl RecommendationSystem {
    pub async fn initialize(
        source: &dyn DatasetSource,
        settings: RecommendationSettings,
        clock: impl Into<Clock>,
    ) -> Result<Self> {
        tracing::info!("📂 Loading dataset from '{}' source", source.name());
        let dataset = source.load().await?;
        if dataset.products.is_empty() {
            return Err(RecsysError::DataLoadError {
                source_name: source.name().to_string(),
                message: "dataset contains no products".to_string(),
            });
        }

        Ok(Self::from_dataset(source.name(), dataset, settings, clock))
    }

    pub fn from_dataset(
        source_name: &str,
        dataset: Dataset,
        settings: RecommendationSettings,
        clock: impl Into<Clock>,
    ) -> Self {
        let summary = dataset.summary();
        let engine = RecommendationEngine::fit(&dataset, settings);
        let manager = CustomerManager::new(dataset.customers, dataset.transactions);

        tracing::info!(
            "✅ Recommendation system ready: {} customers, {} products, {} transactions",
            summary.customers,
            summary.products,
            summary.transactions
        );

        Self {
            source_name: source_name.to_string(),
            summary,
            manager,
            engine,
            clock: clock.into(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn summary(&self) -> DatasetSummary {
        self.summary
    }

    pub fn manager(&self) -> &CustomerManager {
        &self.manager
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn statistics(&self, customer_id: u64) -> CustomerStatistics {
        self.manager.statistics(customer_id, self.today())
    }

    /// 以顧客所屬區隔產生推薦；未知顧客回傳 CustomerNotFound
    pub fn recommend_for(
        &self,
        customer_id: u64,
        query: &str,
        n: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        if n == Some(0) {
            return Err(RecsysError::ValidationError {
                message: "number of recommendations must be at least 1".to_string(),
            });
        }
        let customer = self.manager.customer(customer_id)?;
        Ok(self.engine.recommend(&RecommendationRequest {
            customer_id,
            query,
            n,
            segment: customer.segment,
        }))
    }
}
