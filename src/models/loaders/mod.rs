mod json_loader;
mod toml_loader;

pub use json_loader::{load_batch_request, write_batch_result};
pub use toml_loader::{load_place_table, parse_place_table};
