pub mod artifacts;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod matrix;
pub mod model;
pub mod providers;
pub mod registry;
pub mod report;
pub mod storage;
