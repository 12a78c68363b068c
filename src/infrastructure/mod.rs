pub mod cache;
pub mod crypto;
pub mod llm;
pub mod observability;
pub mod persistence;
