use crate::domain::model::Dataset;
use crate::domain::ports::DatasetSource;
use crate::utils::error::{RecsysError, Result};
use async_trait::async_trait;

/// 依序嘗試每個來源，第一個成功的即採用
pub struct FallbackSource {
    sources: Vec<Box<dyn DatasetSource>>,
}

impl FallbackSource {
    pub fn new(sources: Vec<Box<dyn DatasetSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl DatasetSource for FallbackSource {
    fn name(&self) -> &str {
        "auto"
    }

    async fn load(&self) -> Result<Dataset> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.load().await {
                Ok(dataset) if !dataset.products.is_empty() => {
                    tracing::info!("📂 Using {} dataset", source.name());
                    return Ok(dataset);
                }
                Ok(_) => {
                    tracing::warn!("⚠️ {} dataset has no products, trying next source", source.name());
                    failures.push(format!("{}: no products", source.name()));
                }
                Err(e) => {
                    tracing::warn!("⚠️ Failed to load {} dataset: {}", source.name(), e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        Err(RecsysError::DataLoadError {
            source_name: self.name().to_string(),
            message: if failures.is_empty() {
                "no sources configured".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}
