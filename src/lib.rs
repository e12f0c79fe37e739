pub mod client;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod output;
