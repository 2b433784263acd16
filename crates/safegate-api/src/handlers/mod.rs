//! HTTP request handlers

pub mod complete;
pub mod health;

pub use complete::complete;
pub use health::{health, live, ready, version};
