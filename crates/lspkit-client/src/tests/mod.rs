//! Crate-level unit and BDD tests.

mod support;
