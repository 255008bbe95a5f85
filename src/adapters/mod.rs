// Adapters layer: concrete implementations for external systems (storage, dataset files).

pub mod fallback_source;
pub mod generated_source;
pub mod retail_source;
pub mod sample_source;
pub mod storage;

pub use fallback_source::FallbackSource;
pub use generated_source::GeneratedSource;
pub use retail_source::RetailCsvSource;
pub use sample_source::SampleCsvSource;
pub use storage::LocalStorage;
