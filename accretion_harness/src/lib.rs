// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable test doubles and batching metrics for accretion demos.
//!
//! - [`RecordingHost`] — a [`SurfaceHost`] that records every attach/detach
//!   call, with shared handles so assertions can run after the host moves
//!   into a [`Switchboard`](accretion_core::switchboard::Switchboard).
//! - [`MirrorIndex`] — a [`ClusterIndex`] that performs no clustering at all:
//!   it mirrors its membership into a [`BypassGroup`], so every indexed layer
//!   shows individually. Useful wherever the protocol, not the spatial
//!   index, is under test.
//! - [`ChurnTracker`] — rolling coalescing metrics over flush results, with a
//!   letter grade for HUDs and demo output.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use accretion_core::bypass::BypassGroup;
use accretion_core::cluster::{ClusterIndex, MembershipCtx};
use accretion_core::events::MembershipEvent;
use accretion_core::id::{GroupId, LayerId, Member, SurfaceId};
use accretion_core::surface::SurfaceHost;

// ---------------------------------------------------------------------------
// RecordingHost
// ---------------------------------------------------------------------------

/// One recorded host invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCall {
    /// The member was shown.
    Attach(Member),
    /// The member was hidden.
    Detach(Member),
}

/// A [`SurfaceHost`] double that records every call.
///
/// Clones share the same log, so tests keep a clone and hand the original to
/// [`Switchboard::add_surface`](accretion_core::switchboard::Switchboard::add_surface).
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    /// Creates a host with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Returns whether `member` is currently shown (net of attach/detach).
    #[must_use]
    pub fn is_attached(&self, member: Member) -> bool {
        self.net_attached(member) > 0
    }

    /// Number of attach calls minus detach calls for `member`.
    ///
    /// A correctly synchronized run never drives this above one.
    #[must_use]
    pub fn net_attached(&self, member: Member) -> i64 {
        let mut net = 0;
        for call in self.calls.borrow().iter() {
            match *call {
                HostCall::Attach(m) if m == member => net += 1,
                HostCall::Detach(m) if m == member => net -= 1,
                _ => {}
            }
        }
        net
    }

    /// Number of members currently shown.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        let calls = self.calls.borrow();
        let mut visible: Vec<Member> = Vec::new();
        for call in calls.iter() {
            match *call {
                HostCall::Attach(m) => {
                    if !visible.contains(&m) {
                        visible.push(m);
                    }
                }
                HostCall::Detach(m) => visible.retain(|&v| v != m),
            }
        }
        visible.len()
    }
}

impl SurfaceHost for RecordingHost {
    fn attach(&mut self, member: Member) {
        self.calls.borrow_mut().push(HostCall::Attach(member));
    }

    fn detach(&mut self, member: Member) {
        self.calls.borrow_mut().push(HostCall::Detach(member));
    }
}

// ---------------------------------------------------------------------------
// MirrorIndex
// ---------------------------------------------------------------------------

/// A [`ClusterIndex`] that shows every indexed layer individually.
///
/// Membership is mirrored into a [`BypassGroup`], so representation drives
/// the surface through the original entry points exactly as a real
/// clustering container would, without any spatial math.
#[derive(Debug)]
pub struct MirrorIndex {
    container: BypassGroup,
}

impl MirrorIndex {
    /// Creates a mirror whose container uses the given identity.
    #[must_use]
    pub const fn new(container_id: GroupId) -> Self {
        Self {
            container: BypassGroup::new(container_id),
        }
    }

    /// Returns the backing container.
    #[must_use]
    pub fn container(&self) -> &BypassGroup {
        &self.container
    }
}

impl ClusterIndex for MirrorIndex {
    fn add_layers(&mut self, ctx: &mut MembershipCtx<'_>, layers: &[LayerId]) {
        for &layer in layers {
            self.container.add_layer(ctx, layer);
        }
    }

    fn remove_layers(&mut self, ctx: &mut MembershipCtx<'_>, layers: &[LayerId]) {
        for &layer in layers {
            self.container.remove_layer(ctx, layer);
        }
    }

    fn on_attach(&mut self, ctx: &mut MembershipCtx<'_>, surface: SurfaceId) {
        self.container.on_add(ctx, surface);
    }

    fn on_detach(&mut self, ctx: &mut MembershipCtx<'_>, _surface: SurfaceId) {
        self.container.on_remove(ctx);
    }

    fn has_layer(&self, layer: LayerId) -> bool {
        self.container.has_layer(layer)
    }
}

// ---------------------------------------------------------------------------
// ChurnTracker
// ---------------------------------------------------------------------------

/// Letter grade for batching efficiency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnGrade {
    /// Heavy coalescing: long same-kind runs per flush.
    A,
    /// Good coalescing.
    B,
    /// Modest coalescing.
    C,
    /// Buffering is barely earning its delay.
    D,
}

impl ChurnGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`ChurnTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct ChurnReport {
    /// Current grade, from the rolling mean operations-per-batch.
    pub grade: ChurnGrade,
    /// Rolling mean operations-per-batch over the history window.
    pub mean_ops_per_batch: f64,
    /// Total flushes observed.
    pub total_flushes: u64,
    /// Total buffered operations observed.
    pub total_operations: u64,
    /// Total batches those operations coalesced into.
    pub total_batches: u64,
}

/// Rolling batching-efficiency tracker with fixed-size flush history.
#[derive(Debug)]
pub struct ChurnTracker<const N: usize> {
    ratios: [f64; N],
    cursor: usize,
    total_flushes: u64,
    total_operations: u64,
    total_batches: u64,
}

impl<const N: usize> Default for ChurnTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ChurnTracker<N> {
    /// Creates a tracker with a prefilled neutral history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ratios: [1.0; N],
            cursor: 0,
            total_flushes: 0,
            total_operations: 0,
            total_batches: 0,
        }
    }

    /// Observes one flush result and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, batches: usize, operations: usize) -> ChurnReport {
        let ratio = if batches == 0 {
            1.0
        } else {
            operations as f64 / batches as f64
        };
        self.ratios[self.cursor % N] = ratio;
        self.cursor = (self.cursor + 1) % N;
        self.total_flushes = self.total_flushes.saturating_add(1);
        self.total_operations = self.total_operations.saturating_add(operations as u64);
        self.total_batches = self.total_batches.saturating_add(batches as u64);

        let mut sum = 0.0;
        let mut i = 0;
        while i < N {
            sum += self.ratios[i];
            i += 1;
        }
        let mean = sum / N as f64;

        ChurnReport {
            grade: grade_for(mean),
            mean_ops_per_batch: mean,
            total_flushes: self.total_flushes,
            total_operations: self.total_operations,
            total_batches: self.total_batches,
        }
    }

    /// Observes every [`FlushCompleted`](MembershipEvent::FlushCompleted)
    /// event in `journal` and returns the final report, if any flush was
    /// seen.
    pub fn observe_journal(&mut self, journal: &[MembershipEvent]) -> Option<ChurnReport> {
        let mut report = None;
        for event in journal {
            if let MembershipEvent::FlushCompleted {
                batches,
                operations,
                ..
            } = *event
            {
                report = Some(self.observe(batches, operations));
            }
        }
        report
    }

    /// Returns an ASCII sparkline over the ratio history, oldest→newest.
    #[must_use]
    pub fn sparkline_ascii(&self, min_ratio: f64, max_ratio: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            let v = self.ratios[idx].clamp(min_ratio, max_ratio);
            let t = (v - min_ratio) / (max_ratio - min_ratio);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
            i += 1;
        }
        out
    }
}

fn grade_for(mean_ops_per_batch: f64) -> ChurnGrade {
    if mean_ops_per_batch >= 8.0 {
        ChurnGrade::A
    } else if mean_ops_per_batch >= 4.0 {
        ChurnGrade::B
    } else if mean_ops_per_batch >= 2.0 {
        ChurnGrade::C
    } else {
        ChurnGrade::D
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use accretion_core::coordinator::CoordinatorConfig;
    use accretion_core::id::{CoordId, Member};
    use accretion_core::switchboard::Switchboard;
    use accretion_core::time::HostTime;

    use super::*;

    fn mirrored_board() -> (Switchboard, CoordId, RecordingHost) {
        let mut board = Switchboard::new();
        let host = RecordingHost::new();
        let surface = board.add_surface(Box::new(host.clone()));
        let container = board.reserve_group_id();
        let coordinator = board.add_coordinator(
            CoordinatorConfig::immediate(),
            Box::new(MirrorIndex::new(container)),
        );
        board.attach(coordinator, surface);
        (board, coordinator, host)
    }

    #[test]
    fn indexed_layers_show_individually() {
        let (mut board, coordinator, host) = mirrored_board();
        let a = board.stamp_layer();
        let b = board.stamp_layer();

        board.add_layers(coordinator, &[a.into(), b.into()]);

        assert!(host.is_attached(Member::Single(a)));
        assert!(host.is_attached(Member::Single(b)));
        assert_eq!(host.visible_count(), 2);
        assert!(board.cluster_index(coordinator).has_layer(a));
    }

    #[test]
    fn map_add_of_an_owned_layer_lands_in_the_index() {
        let (mut board, coordinator, host) = mirrored_board();
        let surface = board.attached_surface(coordinator).unwrap();
        let layer = board.stamp_layer();

        board.check_in(coordinator, &[layer.into()]);
        board.surface_add(surface, layer.into());

        assert!(board.cluster_index(coordinator).has_layer(layer));
        assert!(host.is_attached(Member::Single(layer)));
        assert_eq!(
            host.net_attached(Member::Single(layer)),
            1,
            "shown exactly once, through the container"
        );

        board.surface_remove(surface, layer.into());
        assert!(!host.is_attached(Member::Single(layer)));
        assert_eq!(
            board.roster().owner_of(layer),
            Some(coordinator),
            "map removal does not check out"
        );
    }

    #[test]
    fn attach_resync_shows_a_preattached_layer_exactly_once() {
        let mut board = Switchboard::new();
        let host = RecordingHost::new();
        let surface = board.add_surface(Box::new(host.clone()));
        let container = board.reserve_group_id();
        let coordinator = board.add_coordinator(
            CoordinatorConfig::immediate(),
            Box::new(MirrorIndex::new(container)),
        );
        let layer = board.stamp_layer();

        board.check_in(coordinator, &[layer.into()]);
        // Added straight to the not-yet-switched map.
        board.surface_add(surface, layer.into());
        assert_eq!(host.net_attached(Member::Single(layer)), 1);

        board.attach(coordinator, surface);

        assert_eq!(
            host.net_attached(Member::Single(layer)),
            1,
            "re-synchronized, not duplicated"
        );
        assert_eq!(board.roster().owner_of(layer), Some(coordinator));
        assert!(board.cluster_index(coordinator).has_layer(layer));
    }

    #[test]
    fn proxied_group_children_cluster_after_flush() {
        let mut board = Switchboard::new();
        let host = RecordingHost::new();
        let surface = board.add_surface(Box::new(host.clone()));
        let container = board.reserve_group_id();
        let coordinator = board.add_coordinator(
            CoordinatorConfig::buffered(),
            Box::new(MirrorIndex::new(container)),
        );
        board.attach(coordinator, surface);

        let group = board.stamp_group();
        let child = board.stamp_layer();
        board.add_layers(coordinator, &[group.into()]);
        assert!(host.is_attached(Member::Group(group)));

        board.group_add(group, child.into(), HostTime(0));
        assert!(
            !board.cluster_index(coordinator).has_layer(child),
            "buffered, not yet applied"
        );

        board.poll(HostTime(100));
        assert!(board.cluster_index(coordinator).has_layer(child));
        assert!(host.is_attached(Member::Single(child)));
    }

    #[test]
    fn detach_hides_the_mirrored_membership() {
        let (mut board, coordinator, host) = mirrored_board();
        let layer = board.stamp_layer();

        board.add_layers(coordinator, &[layer.into()]);
        assert!(host.is_attached(Member::Single(layer)));

        board.detach(coordinator);
        assert!(!host.is_attached(Member::Single(layer)));
        assert!(
            board.cluster_index(coordinator).has_layer(layer),
            "membership survives detach"
        );
    }

    #[test]
    fn churn_grades_reflect_coalescing() {
        let mut tracker = ChurnTracker::<4>::new();
        let first = tracker.observe(1, 12);
        assert_eq!(first.total_flushes, 1);
        assert!(first.mean_ops_per_batch > 3.0);

        // Saturate the window with heavy coalescing.
        let mut saturated = first;
        for _ in 0..3 {
            saturated = tracker.observe(1, 12);
        }
        assert_eq!(saturated.grade, ChurnGrade::A);
        assert_eq!(saturated.grade.as_str(), "A");

        // Degenerate one-op flushes drag the grade down.
        let mut degraded = saturated;
        for _ in 0..4 {
            degraded = tracker.observe(1, 1);
        }
        assert_eq!(degraded.grade, ChurnGrade::D);
    }

    #[test]
    fn churn_tracker_reads_journals() {
        let mut board = Switchboard::new();
        let container = board.reserve_group_id();
        let coordinator = board.add_coordinator(
            CoordinatorConfig::buffered(),
            Box::new(MirrorIndex::new(container)),
        );
        let a = board.stamp_layer();
        let b = board.stamp_layer();
        let c = board.stamp_layer();

        board
            .add_layer(coordinator, a.into(), HostTime(0))
            .add_layer(coordinator, b.into(), HostTime(1))
            .remove_layer(coordinator, c.into(), HostTime(2));
        board.poll(HostTime(200));

        let journal = board.drain_events();
        let mut tracker = ChurnTracker::<8>::new();
        let report = tracker.observe_journal(&journal).expect("one flush ran");
        assert_eq!(report.total_operations, 3);
        assert_eq!(report.total_batches, 2);
    }

    #[test]
    fn sparkline_has_window_width() {
        let mut tracker = ChurnTracker::<6>::new();
        let _ = tracker.observe(1, 10);
        let line = tracker.sparkline_ascii(1.0, 10.0);
        assert_eq!(line.len(), 6);
    }
}
