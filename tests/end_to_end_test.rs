use chrono::NaiveDate;
use customer_recsys::adapters::{FallbackSource, GeneratedSource, SampleCsvSource};
use customer_recsys::app::export_customer_report;
use customer_recsys::core::generator::{write_sample_files, DataGenerator};
use customer_recsys::core::inspector::{inspect_data_dir, FileInspection};
use customer_recsys::core::recommendation::RecommendationReason;
use customer_recsys::domain::ports::{DatasetSource, Storage};
use customer_recsys::{LocalStorage, RecommendationSettings, RecommendationSystem, RecsysError};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

async fn write_sample_dir(dir: &TempDir) -> LocalStorage {
    let storage = LocalStorage::new(dir.path());
    let dataset = DataGenerator::new(7, today()).generate_dataset(50, 200, 2000);
    write_sample_files(&storage, &dataset).await.unwrap();
    storage
}

#[tokio::test]
async fn test_generate_load_and_recommend() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let storage = write_sample_dir(&dir).await;

    let source = SampleCsvSource::new(storage);
    let system =
        RecommendationSystem::initialize(&source, RecommendationSettings::default(), today()).await?;
    assert_eq!(system.summary().customers, 50);
    assert_eq!(system.summary().products, 200);
    assert_eq!(system.source_name(), "sample");

    let customer_id = system.manager().customers()[0].customer_id;
    let recs = system.recommend_for(customer_id, "milk", Some(6))?;
    assert_eq!(recs.len(), 6);

    let matches: Vec<_> = recs
        .iter()
        .filter(|r| matches!(r.reason, RecommendationReason::QueryMatch { .. }))
        .collect();
    assert!(!matches.is_empty());
    assert!(matches
        .iter()
        .all(|r| r.similarity_to_query > RecommendationSettings::default().min_similarity));

    let mut ids: Vec<u64> = recs.iter().map(|r| r.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_statistics_for_generated_customer() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let storage = write_sample_dir(&dir).await;
    let system = RecommendationSystem::initialize(
        &SampleCsvSource::new(storage),
        RecommendationSettings::default(),
        today(),
    )
    .await?;

    let busiest = system
        .manager()
        .customers()
        .iter()
        .map(|c| c.customer_id)
        .max_by_key(|id| system.manager().transactions(*id, usize::MAX).len())
        .unwrap();

    let stats = system.statistics(busiest);
    assert!(stats.total_transactions > 0);
    assert!(stats.favorite_categories.len() <= 5);
    assert!(stats.days_since_last_purchase >= 0);
    let monthly_total: f64 = stats.monthly_spending.values().sum();
    assert!((monthly_total - stats.total_amount).abs() < 1e-6);
    Ok(())
}

#[tokio::test]
async fn test_fallback_skips_missing_files() -> anyhow::Result<()> {
    let empty = TempDir::new()?;
    let source = FallbackSource::new(vec![
        Box::new(SampleCsvSource::new(LocalStorage::new(empty.path()))),
        Box::new(GeneratedSource::new(42, today())),
    ]);

    let dataset = source.load().await?;
    assert_eq!(dataset.summary().products, 500);
    Ok(())
}

#[tokio::test]
async fn test_report_export_and_inspection() -> anyhow::Result<()> {
    let data_dir = TempDir::new()?;
    let storage = write_sample_dir(&data_dir).await;

    let files: Vec<String> = ["customers.csv", "products.csv", "hh_demographic.csv"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let inspections = inspect_data_dir(data_dir.path(), &files);
    assert!(matches!(&inspections[0], FileInspection::Found { total_rows: 50, .. }));
    assert!(matches!(&inspections[2], FileInspection::Missing { .. }));

    let system = RecommendationSystem::initialize(
        &SampleCsvSource::new(storage),
        RecommendationSettings::default(),
        today(),
    )
    .await?;

    let output = TempDir::new()?;
    let report_storage = LocalStorage::new(output.path().join("reports"));
    let customer_id = system.manager().customers()[3].customer_id;
    let file_name = export_customer_report(&report_storage, &system, customer_id, "coffee").await?;

    assert_eq!(file_name, format!("customer_{}_report.zip", customer_id));
    assert!(report_storage.exists(&file_name));
    let bytes = report_storage.read_file(&file_name).await?;
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "profile.json",
            "recommendations.csv",
            "statistics.json",
            "transactions.csv"
        ]
    );

    let missing = export_customer_report(&report_storage, &system, 999_999, "").await;
    assert!(matches!(missing, Err(RecsysError::CustomerNotFound { .. })));
    Ok(())
}
