pub mod config;
pub mod curriculum;
pub mod filter;
pub mod view;
