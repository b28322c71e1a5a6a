//! Core domain types and logic.

pub mod instrument;
pub mod regime;
pub mod history;
pub mod simulator;
pub mod indicator;
pub mod indicator_helpers;
pub mod live_quote;
pub mod market_board;
pub mod alert;
pub mod analytics;
pub mod engine;
pub mod config;
pub mod error;
