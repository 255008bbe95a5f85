pub mod customer;
pub mod generator;
pub mod inspector;
pub mod recommendation;
pub mod segments;
pub mod tfidf;

pub use crate::domain::model::{Customer, Dataset, Product, Segment, Transaction};
pub use crate::domain::ports::{DatasetSource, Storage};
pub use crate::utils::error::Result;
