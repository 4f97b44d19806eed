pub mod bbox;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod export;
pub mod image;
pub mod metrics;
pub mod my_types;
pub mod pipeline;
pub mod tracker;
