//! Shared fixtures for the integration tests

pub mod axum_mock_server;
pub mod test_setup;

pub use axum_mock_server::{MockGithub, MockUser};
pub use test_setup::{TestHarness, cookie_header};
