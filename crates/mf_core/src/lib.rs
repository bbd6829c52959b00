pub mod config;
pub mod error;
pub mod fetch;
pub mod types;

pub use config::ExtractionConfig;
pub use error::Error;
pub use fetch::{PageFetcher, PdfTextSource};
pub use types::{ArticleRecord, BodySource};

pub type Result<T> = std::result::Result<T, Error>;
