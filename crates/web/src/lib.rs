//! Web front end for the used-car price predictor

pub mod api;
pub mod config;
pub mod page;
