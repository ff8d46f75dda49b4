pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::{AppConfig, FileConfig};
pub use error::{ErrorKind, FetchError, FetchResult, ValidationError};
pub use text::{collapse_whitespace, truncate};
pub use types::*;
