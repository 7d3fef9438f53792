//! Absence rating engine for school-district substitute coverage.
//!
//! This crate cleans per-employee absence records, converts them into
//! working-day values, aggregates them per school year and employee, and
//! rates the result against a tiered deductible to produce an insurance
//! premium.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
