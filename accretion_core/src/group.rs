// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer-group routing.
//!
//! A group's add/remove calls either act on the surface directly
//! ([`GroupRouting::Direct`], the plain layer-group behavior) or are
//! forwarded to the coordinator that recruited the group as a proxy
//! ([`GroupRouting::Proxied`]). Recruitment flips the routing; dismissal
//! restores it. The routing value lives in the
//! [`Roster`](crate::roster::Roster), so "restoring the original behavior"
//! is a plain state transition rather than swapped function pointers.

use crate::id::{CoordId, GroupId, Member};
use crate::switchboard::Switchboard;
use crate::time::HostTime;

/// Where a group's add/remove calls route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupRouting {
    /// Plain behavior: children attach to and detach from whatever surface
    /// the group is on.
    Direct,
    /// Recruited as a proxy: membership calls are forwarded to the recruiting
    /// coordinator.
    Proxied(CoordId),
}

impl Switchboard {
    /// Adds `member` to `group`.
    ///
    /// The child is registered under the group either way. A direct group on
    /// a surface then attaches the child through the public surface path; a
    /// proxied group forwards to the recruiting coordinator —
    /// [`add_layer`](Self::add_layer) while the group is on a surface,
    /// [`check_in`](Self::check_in) while it is not (the member must cluster
    /// once the group shows, but nothing is visible yet).
    ///
    /// # Panics
    ///
    /// Panics if the group or member id is unknown.
    pub fn group_add(&mut self, group: GroupId, member: Member, now: HostTime) -> &mut Self {
        self.roster.insert_child(group, member);
        match self.roster.routing_of(group) {
            GroupRouting::Direct => {
                if let Some(surface) = self.roster.group_surface(group) {
                    self.surface_add(surface, member);
                }
            }
            GroupRouting::Proxied(coordinator) => {
                if self.roster.group_surface(group).is_some() {
                    self.add_layer(coordinator, member, now);
                } else {
                    self.check_in(coordinator, &[member]);
                }
            }
        }
        self
    }

    /// Removes `member` from `group`.
    ///
    /// A direct group detaches a present child from its surface; a proxied
    /// group forwards to the recruiting coordinator's
    /// [`remove_layer`](Self::remove_layer) and drops the child entry
    /// regardless of the forwarding outcome.
    ///
    /// # Panics
    ///
    /// Panics if the group or member id is unknown.
    pub fn group_remove(&mut self, group: GroupId, member: Member, now: HostTime) -> &mut Self {
        match self.roster.routing_of(group) {
            GroupRouting::Direct => {
                if self.roster.remove_child(group, member)
                    && let Some(surface) = self.roster.group_surface(group)
                {
                    self.surface_remove(surface, member);
                }
            }
            GroupRouting::Proxied(coordinator) => {
                self.remove_layer(coordinator, member, now);
                self.roster.remove_child(group, member);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use crate::cluster::{ClusterIndex, MembershipCtx};
    use crate::coordinator::CoordinatorConfig;
    use crate::id::{LayerId, SurfaceId};
    use crate::surface::SurfaceHost;

    use super::*;

    struct NullIndex;

    impl ClusterIndex for NullIndex {
        fn add_layers(&mut self, _ctx: &mut MembershipCtx<'_>, _layers: &[LayerId]) {}
        fn remove_layers(&mut self, _ctx: &mut MembershipCtx<'_>, _layers: &[LayerId]) {}
        fn on_attach(&mut self, _ctx: &mut MembershipCtx<'_>, _surface: SurfaceId) {}
        fn on_detach(&mut self, _ctx: &mut MembershipCtx<'_>, _surface: SurfaceId) {}
        fn has_layer(&self, _layer: LayerId) -> bool {
            false
        }
    }

    struct NullHost;

    impl SurfaceHost for NullHost {
        fn attach(&mut self, _member: Member) {}
        fn detach(&mut self, _member: Member) {}
    }

    #[test]
    fn direct_group_attaches_child_when_on_surface() {
        let mut board = Switchboard::new();
        let surface = board.add_surface(Box::new(NullHost));
        let group = board.stamp_group();
        let layer = board.stamp_layer();

        board.surface_add(surface, group.into());
        board.group_add(group, layer.into(), HostTime(0));

        assert!(board.roster().group_contains(group, layer.into()));
        assert_eq!(board.roster().layer_surface(layer), Some(surface));

        board.group_remove(group, layer.into(), HostTime(0));
        assert!(!board.roster().group_contains(group, layer.into()));
        assert_eq!(board.roster().layer_surface(layer), None);
    }

    #[test]
    fn detached_proxied_group_checks_members_in() {
        let mut board = Switchboard::new();
        let coordinator =
            board.add_coordinator(CoordinatorConfig::buffered(), Box::new(NullIndex));
        let group = board.stamp_group();
        let layer = board.stamp_layer();

        board.check_in(coordinator, &[group.into()]);
        board.group_add(group, layer.into(), HostTime(0));

        // Not on a surface: the member is stamped, not buffered.
        assert_eq!(board.roster().owner_of(layer), Some(coordinator));
        assert_eq!(board.pending_operations(coordinator), 0);
    }

    #[test]
    fn attached_proxied_group_buffers_through_coordinator() {
        let mut board = Switchboard::new();
        let surface = board.add_surface(Box::new(NullHost));
        let coordinator =
            board.add_coordinator(CoordinatorConfig::buffered(), Box::new(NullIndex));
        let group = board.stamp_group();
        let layer = board.stamp_layer();

        board.attach(coordinator, surface);
        board.add_layers(coordinator, &[group.into()]);
        board.group_add(group, layer.into(), HostTime(10));

        assert_eq!(board.pending_operations(coordinator), 1);

        board.poll(HostTime(200));
        assert_eq!(board.roster().owner_of(layer), Some(coordinator));
        assert_eq!(board.pending_operations(coordinator), 0);
    }

    #[test]
    fn proxied_group_remove_drops_child_even_when_unowned() {
        let mut board = Switchboard::new();
        let coordinator =
            board.add_coordinator(CoordinatorConfig::immediate(), Box::new(NullIndex));
        let group = board.stamp_group();
        let layer = board.stamp_layer();

        board.check_in(coordinator, &[group.into()]);
        board.roster.insert_child(group, layer.into());

        board.group_remove(group, layer.into(), HostTime(0));
        assert!(!board.roster().group_contains(group, layer.into()));
    }
}
