//! Integration tests - Descriptor, resolver and rewriter working together
//!
//! All tests run against the in-memory metadata store; no warehouse is needed.

mod resolution_pipeline_tests;
