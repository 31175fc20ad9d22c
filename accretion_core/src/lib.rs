// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Membership registries and add/remove synchronization for clustered map
//! layers.
//!
//! `accretion_core` keeps three views of layer membership consistent: a
//! clustering container's own layer set, layer groups recruited as proxies,
//! and a host map's native add/remove path. Layers and groups can enter and
//! leave through any of the three; the protocol reconciles them, batches
//! high-frequency single operations, and structurally prevents recursion
//! between cooperating coordinators. It is `no_std` compatible (with
//! `alloc`).
//!
//! # Architecture
//!
//! All state lives behind one [`Switchboard`](switchboard::Switchboard):
//!
//! ```text
//!   application ──► Switchboard::{check_in, add_layer(s), ...}
//!                        │
//!        ┌───────────────┼──────────────────┐
//!        ▼               ▼                  ▼
//!     Roster        Coordinator        Surface table
//!   (ownership,   (singles, proxies,  (attachments +
//!    routing)      operation buffer)   the switch)
//!        │               │                  │
//!        ▼               ▼                  ▼
//!    queries      ClusterIndex         SurfaceHost
//!                 (collaborator)      (platform glue)
//! ```
//!
//! **[`id`]** — Identity handles (`LayerId`, `GroupId`, `CoordId`,
//! `SurfaceId`) and the [`Member`](id::Member) classification type.
//!
//! **[`time`]** — Abstract monotonic ticks. The host drives the clock; the
//! only deferred work is the operation-buffer flush.
//!
//! **[`roster`]** — Central membership registry: identity allocation,
//! ownership, cluster indexing, routing, and attachment state keyed by id.
//!
//! **[`cluster`]** — The [`ClusterIndex`](cluster::ClusterIndex) contract an
//! opaque clustering container implements, and the
//! [`MembershipCtx`](cluster::MembershipCtx) view passed to its callbacks.
//!
//! **[`surface`]** — The [`SurfaceHost`](surface::SurfaceHost) platform-glue
//! contract, original attach/detach entry points, and the public switched
//! entry points that redirect owned layers into their coordinator's cluster.
//!
//! **[`group`]** — Direct vs. proxied group routing.
//!
//! **[`bypass`]** — [`BypassGroup`](bypass::BypassGroup), the container
//! clustering engines use so their own surface traffic skips the switch.
//!
//! **[`flush`]** — The single-pending-deadline flush task.
//!
//! **[`coordinator`]** — Per-coordinator registries, buffering, and
//! [`CoordinatorConfig`](coordinator::CoordinatorConfig).
//!
//! **[`events`]** — The observable notification journal.
//!
//! **[`switchboard`]** — The orchestrator carrying every public operation.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bypass;
pub mod cluster;
pub mod coordinator;
pub mod events;
pub mod flush;
pub mod group;
pub mod id;
pub mod roster;
pub mod surface;
pub mod switchboard;
pub mod time;

/// Crate version, re-exported for host diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
