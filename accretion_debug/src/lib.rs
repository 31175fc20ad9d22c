// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for accretion membership journals.
//!
//! This crate renders [`MembershipEvent`](accretion_core::events::MembershipEvent)
//! journals for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrinter`] — human-readable one-line-per-event output.
//! - [`json::export`] — a JSON array of event objects for external tooling.

pub mod json;
pub mod pretty;
