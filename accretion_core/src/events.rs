// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable membership notifications.
//!
//! Every externally observable transition appends a [`MembershipEvent`] to the
//! switchboard's journal. Callers drain the journal with
//! [`Switchboard::drain_events`](crate::switchboard::Switchboard::drain_events)
//! — there is no callback registration, mirroring the drain-changes reporting
//! used everywhere else in the crate. The `accretion_debug` crate renders
//! journals for humans and tooling.

use crate::id::{CoordId, GroupId, LayerId, SurfaceId};
use crate::time::HostTime;

/// A single observable membership transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipEvent {
    /// A bypassing container accepted a layer.
    LayerAdded {
        /// The container's identity.
        group: GroupId,
        /// The accepted layer.
        layer: LayerId,
    },
    /// A bypassing container released a layer.
    LayerRemoved {
        /// The container's identity.
        group: GroupId,
        /// The released layer.
        layer: LayerId,
    },
    /// A coordinator claimed ownership of a single layer.
    SingleClaimed {
        /// The claiming coordinator.
        coordinator: CoordId,
        /// The claimed layer.
        layer: LayerId,
    },
    /// A coordinator released ownership of a single layer.
    SingleReleased {
        /// The releasing coordinator.
        coordinator: CoordId,
        /// The released layer.
        layer: LayerId,
    },
    /// A coordinator recruited a group as its proxy.
    GroupRecruited {
        /// The recruiting coordinator.
        coordinator: CoordId,
        /// The recruited group.
        group: GroupId,
    },
    /// A coordinator dismissed a recruited group, restoring direct routing.
    GroupDismissed {
        /// The dismissing coordinator.
        coordinator: CoordId,
        /// The dismissed group.
        group: GroupId,
    },
    /// The add/remove switch was installed on a surface. Happens once per
    /// surface, at the first coordinator attach, and is never undone.
    SwitchInstalled {
        /// The surface that gained the switch.
        surface: SurfaceId,
    },
    /// A coordinator scheduled a buffered flush.
    FlushScheduled {
        /// The coordinator owning the buffer.
        coordinator: CoordId,
        /// When the flush becomes due.
        deadline: HostTime,
    },
    /// A coordinator's buffer was flushed.
    FlushCompleted {
        /// The coordinator owning the buffer.
        coordinator: CoordId,
        /// Number of same-kind batches the buffer coalesced into.
        batches: usize,
        /// Number of buffered operations consumed.
        operations: usize,
    },
}
