// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bypassing container.
//!
//! A [`BypassGroup`] holds single layers for a clustering container and talks
//! straight to a surface's *original* entry points, never the switch. The
//! switch would redirect owned layers back into the coordinator, and the
//! coordinator is exactly who is driving this container — routing through it
//! again would loop.
//!
//! The container keeps its own child registry (its identity comes from
//! [`Roster::reserve_group_id`](crate::roster::Roster::reserve_group_id), with
//! no roster-side group state) and journals a
//! [`LayerAdded`](crate::events::MembershipEvent::LayerAdded) /
//! [`LayerRemoved`](crate::events::MembershipEvent::LayerRemoved) notification
//! for every accepted mutation.

use alloc::collections::BTreeSet;

use crate::cluster::MembershipCtx;
use crate::events::MembershipEvent;
use crate::id::{GroupId, LayerId, SurfaceId};

/// A layer container whose surface traffic bypasses the add/remove switch.
#[derive(Debug)]
pub struct BypassGroup {
    id: GroupId,
    members: BTreeSet<LayerId>,
    surface: Option<SurfaceId>,
}

impl BypassGroup {
    /// Creates an empty container with the given identity.
    #[must_use]
    pub const fn new(id: GroupId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
            surface: None,
        }
    }

    /// Returns the container's identity.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Returns whether `layer` is held by this container.
    #[must_use]
    pub fn has_layer(&self, layer: LayerId) -> bool {
        self.members.contains(&layer)
    }

    /// Number of held layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the container holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates the held layers in id order.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.members.iter().copied()
    }

    /// Returns the surface this container is attached to, if any.
    #[must_use]
    pub const fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Adds a layer. No-op if already held; otherwise the layer is attached
    /// through the original entry point when the container is on a surface,
    /// and a `LayerAdded` notification is journaled.
    pub fn add_layer(&mut self, ctx: &mut MembershipCtx<'_>, layer: LayerId) -> &mut Self {
        if !self.members.insert(layer) {
            return self;
        }
        if let Some(surface) = self.surface {
            ctx.attach_single(surface, layer);
        }
        ctx.emit(MembershipEvent::LayerAdded {
            group: self.id,
            layer,
        });
        self
    }

    /// Removes a layer. No-op if absent; otherwise the layer is detached
    /// through the original entry point when the container is on a surface,
    /// and a `LayerRemoved` notification is journaled.
    pub fn remove_layer(&mut self, ctx: &mut MembershipCtx<'_>, layer: LayerId) -> &mut Self {
        if !self.members.remove(&layer) {
            return self;
        }
        if let Some(surface) = self.surface {
            ctx.detach_single(surface, layer);
        }
        ctx.emit(MembershipEvent::LayerRemoved {
            group: self.id,
            layer,
        });
        self
    }

    /// Attaches the container to `surface`, forwarding every held layer
    /// through the original attach entry point.
    pub fn on_add(&mut self, ctx: &mut MembershipCtx<'_>, surface: SurfaceId) {
        self.surface = Some(surface);
        for &layer in &self.members {
            ctx.attach_single(surface, layer);
        }
    }

    /// Detaches the container, forwarding every held layer through the
    /// original detach entry point.
    pub fn on_remove(&mut self, ctx: &mut MembershipCtx<'_>) {
        if let Some(surface) = self.surface.take() {
            for &layer in &self.members {
                ctx.detach_single(surface, layer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    use crate::id::Member;
    use crate::roster::Roster;
    use crate::surface::{Surface, SurfaceHost};

    use super::*;

    struct NullHost;

    impl SurfaceHost for NullHost {
        fn attach(&mut self, _member: Member) {}
        fn detach(&mut self, _member: Member) {}
    }

    struct World {
        roster: Roster,
        surfaces: Vec<Surface>,
        journal: Vec<MembershipEvent>,
    }

    impl World {
        fn new() -> Self {
            let mut surfaces = Vec::new();
            surfaces.push(Surface::new(Box::new(NullHost)));
            Self {
                roster: Roster::new(),
                surfaces,
                journal: Vec::new(),
            }
        }

        fn ctx(&mut self) -> MembershipCtx<'_> {
            MembershipCtx::new(&mut self.roster, &mut self.surfaces, &mut self.journal)
        }
    }

    #[test]
    fn add_is_idempotent_and_journaled() {
        let mut world = World::new();
        let id = world.roster.reserve_group_id();
        let l = world.roster.stamp_layer();
        let mut group = BypassGroup::new(id);

        group.add_layer(&mut world.ctx(), l);
        group.add_layer(&mut world.ctx(), l);

        assert!(group.has_layer(l));
        assert_eq!(group.len(), 1);
        assert_eq!(
            world.journal,
            [MembershipEvent::LayerAdded { group: id, layer: l }]
        );
    }

    #[test]
    fn remove_absent_layer_is_silent() {
        let mut world = World::new();
        let id = world.roster.reserve_group_id();
        let l = world.roster.stamp_layer();
        let mut group = BypassGroup::new(id);

        group.remove_layer(&mut world.ctx(), l);
        assert!(world.journal.is_empty());
    }

    #[test]
    fn attached_container_forwards_to_surface() {
        let mut world = World::new();
        let id = world.roster.reserve_group_id();
        let l = world.roster.stamp_layer();
        let mut group = BypassGroup::new(id);

        group.on_add(&mut world.ctx(), SurfaceId(0));
        group.add_layer(&mut world.ctx(), l);
        assert_eq!(world.roster.layer_surface(l), Some(SurfaceId(0)));

        group.remove_layer(&mut world.ctx(), l);
        assert_eq!(world.roster.layer_surface(l), None);
    }

    #[test]
    fn on_add_forwards_held_layers_and_on_remove_clears() {
        let mut world = World::new();
        let id = world.roster.reserve_group_id();
        let a = world.roster.stamp_layer();
        let b = world.roster.stamp_layer();
        let mut group = BypassGroup::new(id);

        group.add_layer(&mut world.ctx(), a);
        group.add_layer(&mut world.ctx(), b);
        assert_eq!(world.roster.layer_surface(a), None, "not attached yet");

        group.on_add(&mut world.ctx(), SurfaceId(0));
        assert_eq!(world.roster.layer_surface(a), Some(SurfaceId(0)));
        assert_eq!(world.roster.layer_surface(b), Some(SurfaceId(0)));

        group.on_remove(&mut world.ctx());
        assert_eq!(group.surface(), None);
        assert_eq!(world.roster.layer_surface(a), None);
        assert_eq!(world.roster.layer_surface(b), None);
        assert!(group.has_layer(a), "membership survives detach");
    }
}
