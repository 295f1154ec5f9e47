pub mod config;
pub mod zones;
