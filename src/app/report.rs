use crate::app::system::RecommendationSystem;
use crate::core::generator::to_csv;
use crate::core::recommendation::Recommendation;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const PROFILE_ENTRY: &str = "profile.json";
pub const STATISTICS_ENTRY: &str = "statistics.json";
pub const TRANSACTIONS_ENTRY: &str = "transactions.csv";
pub const RECOMMENDATIONS_ENTRY: &str = "recommendations.csv";

pub fn report_file_name(customer_id: u64) -> String {
    format!("customer_{}_report.zip", customer_id)
}

/// CSV 需要扁平欄位，reason 以文字呈現
#[derive(Debug, Serialize)]
struct RecommendationRow<'a> {
    product_id: u64,
    product_name: &'a str,
    category: &'a str,
    sub_category: &'a str,
    brand: &'a str,
    price: f64,
    reason: String,
    similarity_to_query: f64,
}

impl<'a> From<&'a Recommendation> for RecommendationRow<'a> {
    fn from(rec: &'a Recommendation) -> Self {
        Self {
            product_id: rec.product_id,
            product_name: &rec.product_name,
            category: &rec.category,
            sub_category: &rec.sub_category,
            brand: &rec.brand,
            price: rec.price,
            reason: rec.reason.label(),
            similarity_to_query: rec.similarity_to_query,
        }
    }
}

/// 產生顧客報告 ZIP 的內容；未知顧客回傳 CustomerNotFound
pub fn build_report_archive(
    system: &RecommendationSystem,
    customer_id: u64,
    query: &str,
) -> Result<Vec<u8>> {
    let manager = system.manager();
    let profile = manager.profile(customer_id)?;
    let statistics = system.statistics(customer_id);
    let transactions = manager.transactions(customer_id, usize::MAX);
    let recommendations = system.recommend_for(customer_id, query, None)?;
    let rows: Vec<RecommendationRow<'_>> = recommendations.iter().map(Into::into).collect();

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(PROFILE_ENTRY, FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&profile)?.as_bytes())?;

    zip.start_file::<_, ()>(STATISTICS_ENTRY, FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&statistics)?.as_bytes())?;

    zip.start_file::<_, ()>(TRANSACTIONS_ENTRY, FileOptions::default())?;
    zip.write_all(&to_csv(transactions)?)?;

    zip.start_file::<_, ()>(RECOMMENDATIONS_ENTRY, FileOptions::default())?;
    zip.write_all(&to_csv(&rows)?)?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// 寫出 customer_{id}_report.zip，回傳檔名
pub async fn export_customer_report<S: Storage>(
    storage: &S,
    system: &RecommendationSystem,
    customer_id: u64,
    query: &str,
) -> Result<String> {
    let zip_data = build_report_archive(system, customer_id, query)?;
    let file_name = report_file_name(customer_id);

    tracing::debug!("Writing report ({} bytes) to storage", zip_data.len());
    storage.write_file(&file_name, &zip_data).await?;

    tracing::info!("📁 Customer {} report saved as {}", customer_id, file_name);
    Ok(file_name)
}
