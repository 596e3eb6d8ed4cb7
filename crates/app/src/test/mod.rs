//! Shared test fixtures for store and controller tests.

mod helpers;

pub(crate) use helpers::*;
