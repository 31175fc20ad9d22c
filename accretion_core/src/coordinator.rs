// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-coordinator registries, configuration, and the operation buffer.
//!
//! A coordinator tracks three registries, all ordered so attach-time
//! forwarding is deterministic:
//!
//! - `singles` — layers it owns and delegates to its clustering container.
//! - `proxy_groups` — recruited groups registered for surface forwarding.
//! - `pending_removal` — recruited groups whose surface detachment is parked
//!   until the coordinator next attaches.
//!
//! Single add/remove calls land in the operation buffer and are drained as
//! maximal same-kind runs, so interleaved churn becomes a handful of batch
//! calls without reordering adds relative to removes.

use alloc::vec;
use alloc::vec::Vec;

use alloc::collections::BTreeSet;

use crate::flush::FlushTask;
use crate::id::{GroupId, LayerId, Member, SurfaceId};
use crate::time::Duration;

/// The buffer delay applied by [`CoordinatorConfig::buffered`], in host ticks.
pub const DEFAULT_BUFFER_DELAY: Duration = Duration(100);

/// Configuration for a coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Delay before a buffered single add/remove flushes, in host ticks.
    /// Zero disables buffering: single operations apply synchronously.
    pub single_buffer_delay: Duration,
}

impl CoordinatorConfig {
    /// Default configuration: single operations coalesce for
    /// [`DEFAULT_BUFFER_DELAY`] ticks.
    #[must_use]
    pub const fn buffered() -> Self {
        Self {
            single_buffer_delay: DEFAULT_BUFFER_DELAY,
        }
    }

    /// Configuration with buffering disabled.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            single_buffer_delay: Duration::ZERO,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::buffered()
    }
}

/// Which batch operation a buffered entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpKind {
    Add,
    Remove,
}

/// One buffered single-member operation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingOp {
    pub(crate) kind: OpKind,
    pub(crate) member: Member,
}

/// Registries and buffering state for one coordinator.
#[derive(Debug)]
pub(crate) struct Coordinator {
    pub(crate) config: CoordinatorConfig,
    pub(crate) singles: BTreeSet<LayerId>,
    pub(crate) proxy_groups: BTreeSet<GroupId>,
    pub(crate) pending_removal: BTreeSet<GroupId>,
    pub(crate) buffer: Vec<PendingOp>,
    pub(crate) flush: FlushTask,
    pub(crate) surface: Option<SurfaceId>,
}

impl Coordinator {
    pub(crate) fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            singles: BTreeSet::new(),
            proxy_groups: BTreeSet::new(),
            pending_removal: BTreeSet::new(),
            buffer: Vec::new(),
            flush: FlushTask::new(),
            surface: None,
        }
    }

    /// Drains the buffer into maximal same-kind runs, preserving order, and
    /// clears the flush task.
    pub(crate) fn take_runs(&mut self) -> Vec<(OpKind, Vec<Member>)> {
        self.flush.clear();
        let mut runs: Vec<(OpKind, Vec<Member>)> = Vec::new();
        for op in self.buffer.drain(..) {
            match runs.last_mut() {
                Some((kind, members)) if *kind == op.kind => members.push(op.member),
                _ => runs.push((op.kind, vec![op.member])),
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use crate::id::LayerId;
    use crate::time::HostTime;

    use super::*;

    fn op(kind: OpKind, raw: u64) -> PendingOp {
        PendingOp {
            kind,
            member: Member::Single(LayerId(raw)),
        }
    }

    #[test]
    fn take_runs_partitions_same_kind_spans() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::buffered());
        coordinator.buffer.extend([
            op(OpKind::Add, 1),
            op(OpKind::Add, 2),
            op(OpKind::Remove, 3),
            op(OpKind::Add, 4),
        ]);

        let runs = coordinator.take_runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].0, OpKind::Add);
        assert_eq!(runs[0].1.len(), 2);
        assert_eq!(runs[1].0, OpKind::Remove);
        assert_eq!(runs[1].1, vec![Member::Single(LayerId(3))]);
        assert_eq!(runs[2].0, OpKind::Add);
        assert_eq!(runs[2].1, vec![Member::Single(LayerId(4))]);
    }

    #[test]
    fn take_runs_on_empty_buffer_is_empty() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::buffered());
        assert!(coordinator.take_runs().is_empty());
    }

    #[test]
    fn take_runs_clears_flush_task() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::buffered());
        coordinator.buffer.push(op(OpKind::Add, 1));
        coordinator.flush.schedule(HostTime(100));

        let _ = coordinator.take_runs();
        assert!(coordinator.buffer.is_empty());
        assert_eq!(coordinator.flush.deadline(), None);
    }

    #[test]
    fn config_presets() {
        assert_eq!(
            CoordinatorConfig::default().single_buffer_delay,
            DEFAULT_BUFFER_DELAY
        );
        assert!(CoordinatorConfig::immediate().single_buffer_delay.is_zero());
    }
}
