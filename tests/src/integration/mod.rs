//! Cross-crate integration tests for the dispatch boundary.

pub mod dispatch_contract;
pub mod domain_flows;
pub mod known_gaps;
