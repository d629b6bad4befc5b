pub mod config;
pub mod export;
pub mod filter;
pub mod input;
pub mod logging;
pub mod render;
