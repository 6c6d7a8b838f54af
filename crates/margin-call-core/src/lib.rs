pub mod calendar;
pub mod config;
pub mod error;
pub mod generator;
pub mod random;
pub mod reader;
pub mod synthesis;
pub mod table;
pub mod types;
pub mod writer;

pub use error::MarginCallError;
pub use types::*;

/// Standard result type for all margin-call operations
pub type MarginCallResult<T> = Result<T, MarginCallError>;
