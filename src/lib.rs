// Library exports for testing
pub mod config;
pub mod conform;
pub mod constants;
pub mod generator;
pub mod logger;
pub mod rasterizer;
