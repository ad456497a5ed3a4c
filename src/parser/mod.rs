pub mod catalog_csv;
pub mod ram;

pub use ram::{parse_ram_gb, ram_bucket, ram_bucket_order, ram_value};
