// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The membership switchboard.
//!
//! A [`Switchboard`] owns everything the synchronization protocol touches:
//! the [`Roster`], the coordinator table (each coordinator paired with its
//! [`ClusterIndex`]), the surface table, and the event journal. Every public
//! operation is a method here, parameterized by [`CoordId`] — one mutable
//! owner means redirection between cooperating parties is a sequence of
//! plain calls rather than reentrant callbacks.
//!
//! # Operation flow
//!
//! ```text
//!   application ──► check_in / add_layer(s) ──► classify ──► claim + recruit
//!                                                  │
//!                      singles ◄──────────────────┴──────────────► groups
//!                        │                                           │
//!                        ▼                                           ▼
//!               ClusterIndex::add_layers                original surface attach
//!                        ▲                                           │
//!   map ──► surface_add ─┤ (owned)                     children re-enter the
//!                        └──────── (unowned) ──► direct attachment  switch
//! ```
//!
//! Single-member [`add_layer`](Switchboard::add_layer) /
//! [`remove_layer`](Switchboard::remove_layer) calls buffer into maximal
//! same-kind runs and flush when the host calls
//! [`poll`](Switchboard::poll) past the scheduled deadline.
//!
//! # Conflicts
//!
//! Claiming a layer or recruiting a group held by another coordinator first
//! checks it out of that coordinator, so at most one coordinator owns any
//! entity at any time. The same check ("is this already mine?") terminates
//! every redirect chain between cooperating coordinators.
//!
//! Classification walks nested groups recursively; a group graph with a
//! cycle is the host's bug and will not terminate.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::cluster::{ClusterIndex, MembershipCtx};
use crate::coordinator::{Coordinator, CoordinatorConfig, OpKind, PendingOp};
use crate::events::MembershipEvent;
use crate::group::GroupRouting;
use crate::id::{CoordId, GroupId, LayerId, Member, SurfaceId};
use crate::roster::Roster;
use crate::surface::{Surface, SurfaceHost};
use crate::time::HostTime;

/// One coordinator and the clustering container it delegates to.
pub(crate) struct CoordinatorSlot {
    pub(crate) coord: Coordinator,
    pub(crate) engine: Box<dyn ClusterIndex>,
}

impl fmt::Debug for CoordinatorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorSlot")
            .field("coord", &self.coord)
            .finish_non_exhaustive()
    }
}

/// Owner of the membership registries, coordinator and surface tables, and
/// the event journal.
#[derive(Debug, Default)]
pub struct Switchboard {
    pub(crate) roster: Roster,
    pub(crate) coordinators: Vec<CoordinatorSlot>,
    pub(crate) surfaces: Vec<Surface>,
    pub(crate) journal: Vec<MembershipEvent>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "coordinator and surface tables are far smaller than u32::MAX"
)]
const fn table_index(idx: usize) -> u32 {
    idx as u32
}

impl Switchboard {
    /// Creates an empty switchboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Registration --

    /// Registers a coordinator delegating to `engine` and returns its id.
    pub fn add_coordinator(
        &mut self,
        config: CoordinatorConfig,
        engine: Box<dyn ClusterIndex>,
    ) -> CoordId {
        let id = CoordId(table_index(self.coordinators.len()));
        self.coordinators.push(CoordinatorSlot {
            coord: Coordinator::new(config),
            engine,
        });
        id
    }

    /// Registers a map surface backed by `host` and returns its id.
    pub fn add_surface(&mut self, host: Box<dyn SurfaceHost>) -> SurfaceId {
        let id = SurfaceId(table_index(self.surfaces.len()));
        self.surfaces.push(Surface::new(host));
        id
    }

    /// Registers a new single layer.
    pub fn stamp_layer(&mut self) -> LayerId {
        self.roster.stamp_layer()
    }

    /// Registers a new layer group.
    pub fn stamp_group(&mut self) -> GroupId {
        self.roster.stamp_group()
    }

    /// Mints a group identity for a container that keeps its own registry
    /// (see [`BypassGroup`](crate::bypass::BypassGroup)).
    pub fn reserve_group_id(&mut self) -> GroupId {
        self.roster.reserve_group_id()
    }

    // -- Check-in / check-out --

    /// Stamps `members` as belonging to `coordinator` without touching any
    /// surface: groups are recruited as proxies, singles are claimed.
    /// Classification is recursive and the whole operation is idempotent per
    /// entity.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or a member id is unknown.
    pub fn check_in(&mut self, coordinator: CoordId, members: &[Member]) -> &mut Self {
        self.validate_coordinator(coordinator);
        let (groups, singles) = self.classify(members);
        for &group in &groups {
            self.recruit_group(coordinator, group);
        }
        for &layer in &singles {
            self.claim_single(coordinator, layer);
        }
        self
    }

    /// Un-stamps `members` from `coordinator`: owned singles are released and
    /// removed from the clustering container, recruited groups are dismissed
    /// (direct routing restored, surface detached if attached). Entities not
    /// checked in here are left alone.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or a member id is unknown.
    pub fn check_out(&mut self, coordinator: CoordId, members: &[Member]) -> &mut Self {
        self.validate_coordinator(coordinator);
        let (groups, singles) = self.classify(members);

        let mut released = Vec::new();
        for &layer in &singles {
            let removed = self.coordinators[coordinator.0 as usize]
                .coord
                .singles
                .remove(&layer);
            if removed {
                self.roster.set_owner(layer, None);
                self.journal
                    .push(MembershipEvent::SingleReleased { coordinator, layer });
                released.push(layer);
            }
        }
        self.cluster_remove_singles(coordinator, &released);

        for &group in &groups {
            self.dismiss_group(coordinator, group);
        }
        self
    }

    // -- Batch add/remove --

    /// Checks `members` in and adds them: singles go to the clustering
    /// container as one batch, groups are registered for forwarding and —
    /// when the coordinator is attached — added to the surface through the
    /// original entry point so their children re-enter the switch.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or a member id is unknown.
    pub fn add_layers(&mut self, coordinator: CoordId, members: &[Member]) -> &mut Self {
        self.validate_coordinator(coordinator);
        let (groups, singles) = self.classify(members);

        for &group in &groups {
            self.recruit_group(coordinator, group);
        }
        for &layer in &singles {
            self.claim_single(coordinator, layer);
        }
        self.cluster_add_singles(coordinator, &singles);

        for &group in &groups {
            let coord = &mut self.coordinators[coordinator.0 as usize].coord;
            coord.proxy_groups.insert(group);
            coord.pending_removal.remove(&group);
            let attached = coord.surface;
            if let Some(surface) = attached {
                self.original_attach(surface, Member::Group(group));
            }
        }
        self
    }

    /// Removes `members` without checking them out: singles leave the
    /// clustering container (ownership is retained), groups are unregistered
    /// and detached from the surface — or parked for detachment at the next
    /// attach when no surface is present.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or a member id is unknown.
    pub fn remove_layers(&mut self, coordinator: CoordId, members: &[Member]) -> &mut Self {
        self.validate_coordinator(coordinator);
        let (groups, singles) = self.classify(members);

        self.cluster_remove_singles(coordinator, &singles);

        for &group in &groups {
            self.coordinators[coordinator.0 as usize]
                .coord
                .proxy_groups
                .remove(&group);
            match self.coordinators[coordinator.0 as usize].coord.surface {
                Some(surface) => self.original_detach(surface, Member::Group(group)),
                None => {
                    self.coordinators[coordinator.0 as usize]
                        .coord
                        .pending_removal
                        .insert(group);
                }
            }
        }
        self
    }

    // -- Buffered single add/remove --

    /// Adds one member through the operation buffer. With a zero buffer delay
    /// this is [`add_layers`](Self::add_layers) of one member, applied
    /// synchronously.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or member id is unknown.
    pub fn add_layer(&mut self, coordinator: CoordId, member: Member, now: HostTime) -> &mut Self {
        self.buffer_single(coordinator, OpKind::Add, member, now)
    }

    /// Removes one member through the operation buffer. With a zero buffer
    /// delay this is [`remove_layers`](Self::remove_layers) of one member,
    /// applied synchronously.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or member id is unknown.
    pub fn remove_layer(
        &mut self,
        coordinator: CoordId,
        member: Member,
        now: HostTime,
    ) -> &mut Self {
        self.buffer_single(coordinator, OpKind::Remove, member, now)
    }

    fn buffer_single(
        &mut self,
        coordinator: CoordId,
        kind: OpKind,
        member: Member,
        now: HostTime,
    ) -> &mut Self {
        self.validate_coordinator(coordinator);
        let delay = self.coordinators[coordinator.0 as usize]
            .coord
            .config
            .single_buffer_delay;
        if delay.is_zero() {
            return match kind {
                OpKind::Add => self.add_layers(coordinator, &[member]),
                OpKind::Remove => self.remove_layers(coordinator, &[member]),
            };
        }

        let coord = &mut self.coordinators[coordinator.0 as usize].coord;
        coord.buffer.push(PendingOp { kind, member });
        let scheduled = coord.flush.schedule(now + delay);
        if let Some(deadline) = scheduled {
            self.journal.push(MembershipEvent::FlushScheduled {
                coordinator,
                deadline,
            });
        }
        self
    }

    /// Runs every flush whose deadline has been reached at `now`, applying
    /// each coordinator's buffer as maximal same-kind batches in original
    /// order. Returns the number of coordinators flushed.
    pub fn poll(&mut self, now: HostTime) -> usize {
        let mut flushed = 0;
        for idx in 0..self.coordinators.len() {
            if self.coordinators[idx].coord.flush.is_due(now) {
                self.flush_buffer(CoordId(table_index(idx)));
                flushed += 1;
            }
        }
        flushed
    }

    /// Returns the earliest pending flush deadline across all coordinators.
    #[must_use]
    pub fn next_flush_at(&self) -> Option<HostTime> {
        self.coordinators
            .iter()
            .filter_map(|slot| slot.coord.flush.deadline())
            .min()
    }

    fn flush_buffer(&mut self, coordinator: CoordId) {
        let runs = self.coordinators[coordinator.0 as usize].coord.take_runs();
        let batches = runs.len();
        let operations = runs.iter().map(|(_, members)| members.len()).sum();
        for (kind, members) in &runs {
            match kind {
                OpKind::Add => self.add_layers(coordinator, members),
                OpKind::Remove => self.remove_layers(coordinator, members),
            };
        }
        self.journal.push(MembershipEvent::FlushCompleted {
            coordinator,
            batches,
            operations,
        });
    }

    // -- Surface lifecycle --

    /// Attaches `coordinator` to `surface`:
    ///
    /// 1. Installs the add/remove switch on the surface if this is the first
    ///    coordinator attach there (permanent).
    /// 2. Detaches owned singles that are already direct surface children,
    ///    remembering them.
    /// 3. Notifies the clustering container.
    /// 4. Forwards every registered proxy group through the original attach
    ///    entry point.
    /// 5. Detaches and clears every parked group.
    /// 6. Re-adds the singles from step 2 through the public classifying
    ///    path, so they end up represented exactly once.
    ///
    /// A coordinator already attached elsewhere is detached first; attaching
    /// to the current surface is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator or surface id is unknown.
    pub fn attach(&mut self, coordinator: CoordId, surface: SurfaceId) -> &mut Self {
        self.validate_coordinator(coordinator);
        self.validate_surface(surface);

        let current = self.coordinators[coordinator.0 as usize].coord.surface;
        if current == Some(surface) {
            return self;
        }
        if current.is_some() {
            self.detach(coordinator);
        }

        if !self.surfaces[surface.0 as usize].switched {
            self.surfaces[surface.0 as usize].switched = true;
            self.journal.push(MembershipEvent::SwitchInstalled { surface });
        }

        let pre_attached: Vec<(SurfaceId, LayerId)> = self.coordinators
            [coordinator.0 as usize]
            .coord
            .singles
            .iter()
            .filter_map(|&layer| self.roster.layer_surface(layer).map(|s| (s, layer)))
            .collect();
        for &(s, layer) in &pre_attached {
            self.original_detach(s, Member::Single(layer));
        }

        self.coordinators[coordinator.0 as usize].coord.surface = Some(surface);
        self.engine_on_attach(coordinator, surface);

        let proxies: Vec<GroupId> = self.coordinators[coordinator.0 as usize]
            .coord
            .proxy_groups
            .iter()
            .copied()
            .collect();
        for group in proxies {
            self.original_attach(surface, Member::Group(group));
        }

        let parked = core::mem::take(
            &mut self.coordinators[coordinator.0 as usize]
                .coord
                .pending_removal,
        );
        for group in parked {
            self.original_detach(surface, Member::Group(group));
        }

        for (_, layer) in pre_attached {
            self.add_layers(coordinator, &[Member::Single(layer)]);
        }
        self
    }

    /// Detaches `coordinator` from its surface, notifying the clustering
    /// container. Registered proxy groups stay on the surface — they are
    /// independent surface children. No-op when not attached.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator id is unknown.
    pub fn detach(&mut self, coordinator: CoordId) -> &mut Self {
        self.validate_coordinator(coordinator);
        if let Some(surface) = self.coordinators[coordinator.0 as usize].coord.surface {
            self.engine_on_detach(coordinator, surface);
            self.coordinators[coordinator.0 as usize].coord.surface = None;
        }
        self
    }

    // -- Queries --

    /// Read access to the membership registry.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Read access to a coordinator's clustering container.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator id is unknown.
    #[must_use]
    pub fn cluster_index(&self, coordinator: CoordId) -> &dyn ClusterIndex {
        self.validate_coordinator(coordinator);
        &*self.coordinators[coordinator.0 as usize].engine
    }

    /// Returns whether `coordinator` tracks `member`: an owned single or a
    /// registered proxy group.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator id is unknown.
    #[must_use]
    pub fn has_layer(&self, coordinator: CoordId, member: Member) -> bool {
        self.validate_coordinator(coordinator);
        let coord = &self.coordinators[coordinator.0 as usize].coord;
        match member {
            Member::Single(layer) => coord.singles.contains(&layer),
            Member::Group(group) => coord.proxy_groups.contains(&group),
        }
    }

    /// Returns the surface `coordinator` is attached to, if any.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator id is unknown.
    #[must_use]
    pub fn attached_surface(&self, coordinator: CoordId) -> Option<SurfaceId> {
        self.validate_coordinator(coordinator);
        self.coordinators[coordinator.0 as usize].coord.surface
    }

    /// Number of operations waiting in `coordinator`'s buffer.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator id is unknown.
    #[must_use]
    pub fn pending_operations(&self, coordinator: CoordId) -> usize {
        self.validate_coordinator(coordinator);
        self.coordinators[coordinator.0 as usize].coord.buffer.len()
    }

    /// Returns whether the add/remove switch has been installed on `surface`.
    ///
    /// # Panics
    ///
    /// Panics if the surface id is unknown.
    #[must_use]
    pub fn is_switched(&self, surface: SurfaceId) -> bool {
        self.validate_surface(surface);
        self.surfaces[surface.0 as usize].switched
    }

    /// The journaled events since the last drain.
    #[must_use]
    pub fn events(&self) -> &[MembershipEvent] {
        &self.journal
    }

    /// Takes and returns the journaled events, leaving the journal empty.
    pub fn drain_events(&mut self) -> Vec<MembershipEvent> {
        core::mem::take(&mut self.journal)
    }

    // -- Classification --

    /// Separates members into groups and singles, recursing into group
    /// children: a group contributes itself *and* its children.
    fn classify(&self, members: &[Member]) -> (Vec<GroupId>, Vec<LayerId>) {
        let mut groups = Vec::new();
        let mut singles = Vec::new();
        self.classify_into(members, &mut groups, &mut singles);
        (groups, singles)
    }

    fn classify_into(
        &self,
        members: &[Member],
        groups: &mut Vec<GroupId>,
        singles: &mut Vec<LayerId>,
    ) {
        for &member in members {
            match member {
                Member::Single(layer) => {
                    assert!(self.roster.contains_layer(layer), "unknown {layer:?}");
                    singles.push(layer);
                }
                Member::Group(group) => {
                    groups.push(group);
                    let children = self.roster.group_children(group);
                    self.classify_into(children, groups, singles);
                }
            }
        }
    }

    // -- Claiming and recruitment --

    /// Claims a single layer for `coordinator`, checking it out of any other
    /// coordinator, stray cluster index, or direct surface attachment first.
    fn claim_single(&mut self, coordinator: CoordId, layer: LayerId) {
        match self.roster.owner_of(layer) {
            Some(owner) if owner == coordinator => return,
            Some(other) => {
                self.check_out(other, &[Member::Single(layer)]);
            }
            None => {
                if let Some(parent) = self.roster.cluster_parent_of(layer) {
                    self.cluster_remove_singles(parent, &[layer]);
                } else if let Some(surface) = self.roster.layer_surface(layer) {
                    self.original_detach(surface, Member::Single(layer));
                }
            }
        }
        self.roster.set_owner(layer, Some(coordinator));
        self.coordinators[coordinator.0 as usize]
            .coord
            .singles
            .insert(layer);
        self.journal
            .push(MembershipEvent::SingleClaimed { coordinator, layer });
    }

    /// Recruits a group as `coordinator`'s proxy, checking it out of another
    /// recruiter first. A plain group attached to a surface is detached — it
    /// will reappear through the coordinator once added.
    fn recruit_group(&mut self, coordinator: CoordId, group: GroupId) {
        match self.roster.routing_of(group) {
            GroupRouting::Proxied(recruiter) if recruiter == coordinator => return,
            GroupRouting::Proxied(other) => {
                self.check_out(other, &[Member::Group(group)]);
            }
            GroupRouting::Direct => {
                if let Some(surface) = self.roster.group_surface(group) {
                    self.original_detach(surface, Member::Group(group));
                }
            }
        }
        self.roster.set_routing(group, GroupRouting::Proxied(coordinator));
        self.journal
            .push(MembershipEvent::GroupRecruited { coordinator, group });
    }

    /// Dismisses a group recruited by `coordinator`: restores direct routing,
    /// unregisters it, detaches it from the surface if attached. No-op when
    /// recruited elsewhere or not at all.
    fn dismiss_group(&mut self, coordinator: CoordId, group: GroupId) {
        if self.roster.routing_of(group) != GroupRouting::Proxied(coordinator) {
            return;
        }
        self.roster.set_routing(group, GroupRouting::Direct);
        let coord = &mut self.coordinators[coordinator.0 as usize].coord;
        coord.proxy_groups.remove(&group);
        coord.pending_removal.remove(&group);
        if let Some(surface) = self.roster.group_surface(group) {
            self.original_detach(surface, Member::Group(group));
        }
        self.journal
            .push(MembershipEvent::GroupDismissed { coordinator, group });
    }

    // -- Clustering container delegation --

    /// Batches `singles` into `coordinator`'s clustering container and
    /// records it as their cluster parent.
    pub(crate) fn cluster_add_singles(&mut self, coordinator: CoordId, singles: &[LayerId]) {
        if singles.is_empty() {
            return;
        }
        for &layer in singles {
            self.roster.set_cluster_parent(layer, Some(coordinator));
        }
        let Self {
            roster,
            coordinators,
            surfaces,
            journal,
        } = self;
        let slot = &mut coordinators[coordinator.0 as usize];
        let mut ctx = MembershipCtx::new(roster, surfaces, journal);
        slot.engine.add_layers(&mut ctx, singles);
    }

    /// Batches `singles` out of `coordinator`'s clustering container,
    /// clearing the cluster-parent record for those it held.
    pub(crate) fn cluster_remove_singles(&mut self, coordinator: CoordId, singles: &[LayerId]) {
        if singles.is_empty() {
            return;
        }
        for &layer in singles {
            if self.roster.cluster_parent_of(layer) == Some(coordinator) {
                self.roster.set_cluster_parent(layer, None);
            }
        }
        let Self {
            roster,
            coordinators,
            surfaces,
            journal,
        } = self;
        let slot = &mut coordinators[coordinator.0 as usize];
        let mut ctx = MembershipCtx::new(roster, surfaces, journal);
        slot.engine.remove_layers(&mut ctx, singles);
    }

    fn engine_on_attach(&mut self, coordinator: CoordId, surface: SurfaceId) {
        let Self {
            roster,
            coordinators,
            surfaces,
            journal,
        } = self;
        let slot = &mut coordinators[coordinator.0 as usize];
        let mut ctx = MembershipCtx::new(roster, surfaces, journal);
        slot.engine.on_attach(&mut ctx, surface);
    }

    fn engine_on_detach(&mut self, coordinator: CoordId, surface: SurfaceId) {
        let Self {
            roster,
            coordinators,
            surfaces,
            journal,
        } = self;
        let slot = &mut coordinators[coordinator.0 as usize];
        let mut ctx = MembershipCtx::new(roster, surfaces, journal);
        slot.engine.on_detach(&mut ctx, surface);
    }

    // -- Validation --

    pub(crate) fn validate_coordinator(&self, coordinator: CoordId) {
        assert!(
            (coordinator.0 as usize) < self.coordinators.len(),
            "unknown {coordinator:?}"
        );
    }

    pub(crate) fn validate_surface(&self, surface: SurfaceId) {
        assert!(
            (surface.0 as usize) < self.surfaces.len(),
            "unknown {surface:?}"
        );
    }
}
