pub mod catalog_file;
pub mod dataset;

pub use catalog_file::{load_catalogs, parse_catalogs, CatalogFileError};
pub use dataset::{load_dataset, read_csv, read_json, DatasetError, ReloadDataset};
