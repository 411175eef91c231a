//! Test fixtures for cemetery-nav.
//!
//! Provides a synthetic cemetery scenario: a square road loop with shared
//! corner nodes, plus matching store records.

pub mod square_cemetery;
