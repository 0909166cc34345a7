//! Cross-module tests for ranking and query answering.

pub mod support;
