//! Integration tests for the publisher resolver
//!
//! These tests use wiremock to stand up mock providers, author pages and
//! identity services, and drive the real HTTP transport against them.

mod pipeline_tests;
