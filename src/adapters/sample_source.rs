use crate::core::generator::{SAMPLE_CUSTOMERS_FILE, SAMPLE_PRODUCTS_FILE, SAMPLE_TRANSACTIONS_FILE};
use crate::domain::model::{Customer, Dataset, Product, Transaction};
use crate::domain::ports::{DatasetSource, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// 讀取產生器輸出的 customers.csv / products.csv / transactions.csv
pub struct SampleCsvSource<S: Storage> {
    storage: S,
}

impl<S: Storage> SampleCsvSource<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

pub(crate) async fn read_rows<S: Storage, T: DeserializeOwned>(
    storage: &S,
    file: &str,
) -> Result<Vec<T>> {
    let bytes = storage.read_file(file).await?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    tracing::debug!("Read {} rows from {}", rows.len(), file);
    Ok(rows)
}

#[async_trait]
impl<S: Storage> DatasetSource for SampleCsvSource<S> {
    fn name(&self) -> &str {
        "sample"
    }

    async fn load(&self) -> Result<Dataset> {
        let customers: Vec<Customer> = read_rows(&self.storage, SAMPLE_CUSTOMERS_FILE).await?;
        let products: Vec<Product> = read_rows(&self.storage, SAMPLE_PRODUCTS_FILE).await?;
        let transactions: Vec<Transaction> =
            read_rows(&self.storage, SAMPLE_TRANSACTIONS_FILE).await?;

        Ok(Dataset {
            customers,
            products,
            transactions,
        })
    }
}
