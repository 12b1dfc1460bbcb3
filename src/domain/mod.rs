//! Core domain types and logic.

pub mod price;
pub mod period;
pub mod catalog;
pub mod loader;
pub mod indicator;
pub mod strategy;
pub mod chart;
pub mod session;
pub mod error;
