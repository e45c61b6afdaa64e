pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod filter;
pub mod pagination;
pub mod render;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;
