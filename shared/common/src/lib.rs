pub mod types;
pub mod error;
pub mod config;
pub mod signature;

pub use types::*;
pub use error::*;
pub use config::*;
pub use signature::{SignatureError, SignatureHeader};
