// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clustering-container contract.
//!
//! Accretion treats the clustering/spatial-indexing engine as an opaque
//! collaborator: each coordinator owns one [`ClusterIndex`] and delegates
//! batched single-layer membership to it. The engine decides how layers are
//! represented (clustered icons, individual markers, nothing at all) and
//! drives surfaces through the [`MembershipCtx`] it receives — typically by
//! holding its visible layers in a [`BypassGroup`](crate::bypass::BypassGroup)
//! so that representation changes never re-enter the switch.
//!
//! # Contract
//!
//! - [`add_layers`](ClusterIndex::add_layers) /
//!   [`remove_layers`](ClusterIndex::remove_layers) must tolerate layers that
//!   are already present / already absent; the protocol leans on idempotence
//!   instead of error signaling.
//! - [`on_attach`](ClusterIndex::on_attach) /
//!   [`on_detach`](ClusterIndex::on_detach) bracket the owning coordinator's
//!   surface lifecycle; implementations show and hide their current
//!   representation there.
//!
//! Application code wires its own engine in via
//! [`Switchboard::add_coordinator`](crate::switchboard::Switchboard::add_coordinator);
//! the `accretion_harness` crate ships a mirroring test double.

use alloc::vec::Vec;
use core::fmt;

use crate::events::MembershipEvent;
use crate::id::{LayerId, SurfaceId};
use crate::roster::Roster;
use crate::surface::{self, Surface};

/// An opaque clustering container consulted by one coordinator.
pub trait ClusterIndex {
    /// Indexes a batch of single layers. Already-indexed layers are a no-op.
    fn add_layers(&mut self, ctx: &mut MembershipCtx<'_>, layers: &[LayerId]);

    /// Drops a batch of single layers from the index. Unknown layers are a
    /// no-op.
    fn remove_layers(&mut self, ctx: &mut MembershipCtx<'_>, layers: &[LayerId]);

    /// The owning coordinator attached to `surface`; show the current
    /// representation.
    fn on_attach(&mut self, ctx: &mut MembershipCtx<'_>, surface: SurfaceId);

    /// The owning coordinator is detaching from `surface`; hide the current
    /// representation.
    fn on_detach(&mut self, ctx: &mut MembershipCtx<'_>, surface: SurfaceId);

    /// Returns whether `layer` is currently indexed.
    fn has_layer(&self, layer: LayerId) -> bool;
}

/// The slice of switchboard state handed to [`ClusterIndex`] callbacks.
///
/// Exposes the membership registry read-only plus the original surface entry
/// points for single layers, which is all an engine needs to drive its
/// representation. The coordinator table is deliberately absent, so engine
/// callbacks cannot recurse into coordinator operations.
pub struct MembershipCtx<'a> {
    pub(crate) roster: &'a mut Roster,
    pub(crate) surfaces: &'a mut Vec<Surface>,
    pub(crate) journal: &'a mut Vec<MembershipEvent>,
}

impl fmt::Debug for MembershipCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipCtx")
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}

impl<'a> MembershipCtx<'a> {
    pub(crate) fn new(
        roster: &'a mut Roster,
        surfaces: &'a mut Vec<Surface>,
        journal: &'a mut Vec<MembershipEvent>,
    ) -> Self {
        Self {
            roster,
            surfaces,
            journal,
        }
    }

    /// Read access to the membership registry.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        self.roster
    }

    /// Attaches `layer` as a direct child of `surface` through the original
    /// entry point, bypassing the switch.
    ///
    /// # Panics
    ///
    /// Panics if the surface or layer id is unknown.
    pub fn attach_single(&mut self, surface: SurfaceId, layer: LayerId) {
        assert!(
            (surface.0 as usize) < self.surfaces.len(),
            "unknown {surface:?}"
        );
        surface::attach_single(self.roster, self.surfaces, surface, layer);
    }

    /// Detaches `layer` from `surface` through the original entry point.
    /// No-op unless attached there.
    ///
    /// # Panics
    ///
    /// Panics if the surface or layer id is unknown.
    pub fn detach_single(&mut self, surface: SurfaceId, layer: LayerId) {
        assert!(
            (surface.0 as usize) < self.surfaces.len(),
            "unknown {surface:?}"
        );
        surface::detach_single(self.roster, self.surfaces, surface, layer);
    }

    pub(crate) fn emit(&mut self, event: MembershipEvent) {
        self.journal.push(event);
    }
}
