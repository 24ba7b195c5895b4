// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Storefront integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Messaging transport that records attempts and can be scripted to fail
//! - [`TestHarness`] - Temp SQLite storage seeded with a sample catalog

pub mod harness;
pub mod mock_transport;

pub use harness::{TestHarness, sample_catalog};
pub use mock_transport::{MockTransport, SendAttempt};
