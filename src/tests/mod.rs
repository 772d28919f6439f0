//! Crate-level test suites.

mod property;
mod unit;
