pub mod constants;
pub mod engine_config;
pub mod transcript;
