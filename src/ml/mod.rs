//! Model training and inference

pub mod metrics;
pub mod training;
pub mod tree;
