pub mod compiler;
pub mod config;
pub mod filter;
pub mod plan;
pub mod query;
pub mod schema;
