//! Transformation services

pub mod transform;

pub use transform::TransformService;
