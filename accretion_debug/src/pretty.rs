// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable journal output.
//!
//! [`PrettyPrinter`] writes one line per [`MembershipEvent`] to a
//! [`Write`](std::io::Write) destination (default: stderr). Write errors are
//! discarded — diagnostics never fail the caller.

use std::io::Write;

use accretion_core::events::MembershipEvent;

/// Writes human-readable journal lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrinter<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrinter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrinter").finish_non_exhaustive()
    }
}

impl PrettyPrinter {
    /// Creates a printer that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a printer that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrinter<W> {
    /// Creates a printer that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one line for `event`.
    pub fn write_event(&mut self, event: &MembershipEvent) {
        let _ = match *event {
            MembershipEvent::LayerAdded { group, layer } => writeln!(
                self.writer,
                "[layeradd] group={} layer={}",
                group.value(),
                layer.value(),
            ),
            MembershipEvent::LayerRemoved { group, layer } => writeln!(
                self.writer,
                "[layerremove] group={} layer={}",
                group.value(),
                layer.value(),
            ),
            MembershipEvent::SingleClaimed { coordinator, layer } => writeln!(
                self.writer,
                "[claim] coordinator={} layer={}",
                coordinator.0,
                layer.value(),
            ),
            MembershipEvent::SingleReleased { coordinator, layer } => writeln!(
                self.writer,
                "[release] coordinator={} layer={}",
                coordinator.0,
                layer.value(),
            ),
            MembershipEvent::GroupRecruited { coordinator, group } => writeln!(
                self.writer,
                "[recruit] coordinator={} group={}",
                coordinator.0,
                group.value(),
            ),
            MembershipEvent::GroupDismissed { coordinator, group } => writeln!(
                self.writer,
                "[dismiss] coordinator={} group={}",
                coordinator.0,
                group.value(),
            ),
            MembershipEvent::SwitchInstalled { surface } => {
                writeln!(self.writer, "[switch] surface={}", surface.0)
            }
            MembershipEvent::FlushScheduled {
                coordinator,
                deadline,
            } => writeln!(
                self.writer,
                "[flush:scheduled] coordinator={} deadline={}t",
                coordinator.0,
                deadline.ticks(),
            ),
            MembershipEvent::FlushCompleted {
                coordinator,
                batches,
                operations,
            } => writeln!(
                self.writer,
                "[flush:done] coordinator={} batches={batches} operations={operations}",
                coordinator.0,
            ),
        };
    }

    /// Writes every event in `journal`, in order.
    pub fn write_all(&mut self, journal: &[MembershipEvent]) {
        for event in journal {
            self.write_event(event);
        }
    }
}
