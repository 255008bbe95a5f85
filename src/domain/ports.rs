use crate::domain::model::Dataset;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> bool;
}

/// 資料來源：範例 CSV、零售面板 CSV 或產生器
#[async_trait]
pub trait DatasetSource: Send + Sync {
    fn name(&self) -> &str;
    async fn load(&self) -> Result<Dataset>;
}
