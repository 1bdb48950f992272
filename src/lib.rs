//! OCD item transformers
//!
//! Turns raw records harvested from OAI-PMH feeds into normalized index
//! documents. Each source feed has a stateless transformer; the
//! [`services::TransformService`] wraps one with its source definition.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod transformers;
pub mod xml;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::TransformService;
pub use transformers::ItemTransformer;
pub use xml::RawRecord;
