//! Shared fixtures for code-smash integration tests.

pub mod repo;
pub mod server;

pub use repo::TestRepo;
pub use server::{StubApi, TestServer};
