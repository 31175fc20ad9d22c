// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The central membership registry.
//!
//! A [`Roster`] mints identities and records, per entity, the state the
//! synchronization protocol needs to consult from any direction:
//!
//! - For a single layer: the owning coordinator (if claimed), the clustering
//!   container currently indexing it (if any), and the surface it is attached
//!   to as a direct child (if any).
//! - For a group: its children, its routing
//!   ([`GroupRouting::Direct`] or [`GroupRouting::Proxied`]), and its surface.
//!
//! Ownership and recruitment live here, keyed by id, rather than as fields on
//! host-owned layer objects. Mutation goes through the
//! [`Switchboard`](crate::switchboard::Switchboard); the setters are
//! crate-private so external code cannot break the single-owner and
//! single-recruiter guarantees.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::group::GroupRouting;
use crate::id::{CoordId, GroupId, LayerId, Member, SurfaceId};

/// Per-layer membership state.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LayerState {
    /// Coordinator that has claimed this layer, if any.
    pub(crate) owner: Option<CoordId>,
    /// Coordinator whose clustering container currently indexes this layer.
    pub(crate) cluster_parent: Option<CoordId>,
    /// Surface this layer is attached to as a direct child.
    pub(crate) surface: Option<SurfaceId>,
}

/// Per-group membership state.
#[derive(Clone, Debug)]
pub(crate) struct GroupState {
    /// Child members, in insertion order.
    pub(crate) children: Vec<Member>,
    /// Where the group's add/remove calls route.
    pub(crate) routing: GroupRouting,
    /// Surface this group is attached to.
    pub(crate) surface: Option<SurfaceId>,
}

/// Identity allocation and per-entity membership state.
#[derive(Debug, Default)]
pub struct Roster {
    layers: HashMap<LayerId, LayerState>,
    groups: HashMap<GroupId, GroupState>,
    next_id: u64,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Allocation API --

    /// Registers a new single layer and returns its handle.
    pub fn stamp_layer(&mut self) -> LayerId {
        let id = LayerId(self.bump());
        self.layers.insert(id, LayerState::default());
        id
    }

    /// Registers a new layer group and returns its handle.
    ///
    /// The group starts empty, routing directly, attached to nothing.
    pub fn stamp_group(&mut self) -> GroupId {
        let id = GroupId(self.bump());
        self.groups.insert(
            id,
            GroupState {
                children: Vec::new(),
                routing: GroupRouting::Direct,
                surface: None,
            },
        );
        id
    }

    /// Mints a group identity without registering group state.
    ///
    /// For containers that keep their own child registry and never participate
    /// in proxy routing (see [`BypassGroup`](crate::bypass::BypassGroup)).
    /// Passing a reserved id to an operation that requires a registered group
    /// panics like any other unknown id.
    pub fn reserve_group_id(&mut self) -> GroupId {
        GroupId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns whether `id` refers to a registered layer.
    #[must_use]
    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Returns whether `id` refers to a registered group.
    #[must_use]
    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Number of registered layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // -- Layer queries --

    /// Returns the coordinator that owns `layer`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn owner_of(&self, layer: LayerId) -> Option<CoordId> {
        self.layer(layer).owner
    }

    /// Returns the coordinator whose clustering container indexes `layer`.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn cluster_parent_of(&self, layer: LayerId) -> Option<CoordId> {
        self.layer(layer).cluster_parent
    }

    /// Returns the surface `layer` is directly attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn layer_surface(&self, layer: LayerId) -> Option<SurfaceId> {
        self.layer(layer).surface
    }

    // -- Group queries --

    /// Returns where `group`'s add/remove calls currently route.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn routing_of(&self, group: GroupId) -> GroupRouting {
        self.group(group).routing
    }

    /// Returns the coordinator that has recruited `group` as a proxy, if any.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn recruiter_of(&self, group: GroupId) -> Option<CoordId> {
        match self.group(group).routing {
            GroupRouting::Direct => None,
            GroupRouting::Proxied(c) => Some(c),
        }
    }

    /// Returns the surface `group` is attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn group_surface(&self, group: GroupId) -> Option<SurfaceId> {
        self.group(group).surface
    }

    /// Returns the children of `group` in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn group_children(&self, group: GroupId) -> &[Member] {
        &self.group(group).children
    }

    /// Returns whether `group` directly contains `member`.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown.
    #[must_use]
    pub fn group_contains(&self, group: GroupId, member: Member) -> bool {
        self.group(group).children.contains(&member)
    }

    // -- Crate-private mutation --

    pub(crate) fn set_owner(&mut self, layer: LayerId, owner: Option<CoordId>) {
        self.layer_mut(layer).owner = owner;
    }

    pub(crate) fn set_cluster_parent(&mut self, layer: LayerId, parent: Option<CoordId>) {
        self.layer_mut(layer).cluster_parent = parent;
    }

    pub(crate) fn set_layer_surface(&mut self, layer: LayerId, surface: Option<SurfaceId>) {
        self.layer_mut(layer).surface = surface;
    }

    pub(crate) fn set_routing(&mut self, group: GroupId, routing: GroupRouting) {
        self.group_mut(group).routing = routing;
    }

    pub(crate) fn set_group_surface(&mut self, group: GroupId, surface: Option<SurfaceId>) {
        self.group_mut(group).surface = surface;
    }

    /// Appends `member` to `group` unless already present. Returns whether the
    /// child was inserted.
    pub(crate) fn insert_child(&mut self, group: GroupId, member: Member) -> bool {
        let children = &mut self.group_mut(group).children;
        if children.contains(&member) {
            false
        } else {
            children.push(member);
            true
        }
    }

    /// Removes `member` from `group`. Returns whether the child was present.
    pub(crate) fn remove_child(&mut self, group: GroupId, member: Member) -> bool {
        let children = &mut self.group_mut(group).children;
        match children.iter().position(|&m| m == member) {
            Some(idx) => {
                children.remove(idx);
                true
            }
            None => false,
        }
    }

    // -- Internal helpers --

    fn layer(&self, id: LayerId) -> &LayerState {
        self.layers
            .get(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }

    fn layer_mut(&mut self, id: LayerId) -> &mut LayerState {
        self.layers
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }

    fn group(&self, id: GroupId) -> &GroupState {
        self.groups
            .get(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }

    fn group_mut(&mut self, id: GroupId) -> &mut GroupState {
        self.groups
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamped_ids_are_distinct() {
        let mut roster = Roster::new();
        let a = roster.stamp_layer();
        let b = roster.stamp_layer();
        let g = roster.stamp_group();
        assert_ne!(a, b);
        assert_ne!(a.value(), g.value());
        assert!(roster.contains_layer(a));
        assert!(roster.contains_group(g));
    }

    #[test]
    fn new_layer_has_no_bindings() {
        let mut roster = Roster::new();
        let l = roster.stamp_layer();
        assert_eq!(roster.owner_of(l), None);
        assert_eq!(roster.cluster_parent_of(l), None);
        assert_eq!(roster.layer_surface(l), None);
    }

    #[test]
    fn new_group_routes_directly() {
        let mut roster = Roster::new();
        let g = roster.stamp_group();
        assert_eq!(roster.routing_of(g), GroupRouting::Direct);
        assert_eq!(roster.recruiter_of(g), None);
        assert!(roster.group_children(g).is_empty());
    }

    #[test]
    fn child_insertion_dedupes() {
        let mut roster = Roster::new();
        let g = roster.stamp_group();
        let l = roster.stamp_layer();
        assert!(roster.insert_child(g, l.into()));
        assert!(!roster.insert_child(g, l.into()));
        assert_eq!(roster.group_children(g), &[Member::Single(l)]);
        assert!(roster.remove_child(g, l.into()));
        assert!(!roster.remove_child(g, l.into()));
        assert!(roster.group_children(g).is_empty());
    }

    #[test]
    fn reserved_group_id_is_unregistered() {
        let mut roster = Roster::new();
        let g = roster.reserve_group_id();
        assert!(!roster.contains_group(g));
    }

    #[test]
    #[should_panic(expected = "unknown GroupId")]
    fn reserved_group_id_panics_on_query() {
        let mut roster = Roster::new();
        let g = roster.reserve_group_id();
        let _ = roster.routing_of(g);
    }

    #[test]
    #[should_panic(expected = "unknown LayerId")]
    fn foreign_layer_id_panics() {
        let roster = Roster::new();
        let _ = roster.owner_of(LayerId(42));
    }
}
