//! Integration Tests Module
//!
//! End-to-end tests through the real router, the real Anthropic provider
//! (pointed at a local fake upstream) and the real workflow HTTP client.

// Fake upstream and server bootstrap
mod support;

// Idea-to-analysis workflow scenarios
mod workflow_test;

// Read, registration and health endpoints
mod endpoints_test;
