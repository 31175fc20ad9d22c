// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON journal export.
//!
//! [`export`] writes a membership journal as a JSON array of event objects,
//! one per [`MembershipEvent`], for consumption by external tooling
//! (timeline viewers, log aggregation, test fixtures).

use std::io::{self, Write};

use serde_json::{Value, json};

use accretion_core::events::MembershipEvent;

/// Converts one event to its JSON object form.
#[must_use]
pub fn event_to_json(event: &MembershipEvent) -> Value {
    match *event {
        MembershipEvent::LayerAdded { group, layer } => json!({
            "event": "layeradd",
            "group": group.value(),
            "layer": layer.value(),
        }),
        MembershipEvent::LayerRemoved { group, layer } => json!({
            "event": "layerremove",
            "group": group.value(),
            "layer": layer.value(),
        }),
        MembershipEvent::SingleClaimed { coordinator, layer } => json!({
            "event": "claim",
            "coordinator": coordinator.0,
            "layer": layer.value(),
        }),
        MembershipEvent::SingleReleased { coordinator, layer } => json!({
            "event": "release",
            "coordinator": coordinator.0,
            "layer": layer.value(),
        }),
        MembershipEvent::GroupRecruited { coordinator, group } => json!({
            "event": "recruit",
            "coordinator": coordinator.0,
            "group": group.value(),
        }),
        MembershipEvent::GroupDismissed { coordinator, group } => json!({
            "event": "dismiss",
            "coordinator": coordinator.0,
            "group": group.value(),
        }),
        MembershipEvent::SwitchInstalled { surface } => json!({
            "event": "switch_installed",
            "surface": surface.0,
        }),
        MembershipEvent::FlushScheduled {
            coordinator,
            deadline,
        } => json!({
            "event": "flush_scheduled",
            "coordinator": coordinator.0,
            "deadline_ticks": deadline.ticks(),
        }),
        MembershipEvent::FlushCompleted {
            coordinator,
            batches,
            operations,
        } => json!({
            "event": "flush_completed",
            "coordinator": coordinator.0,
            "batches": batches,
            "operations": operations,
        }),
    }
}

/// Writes `journal` as a pretty-printed JSON array.
pub fn export(journal: &[MembershipEvent], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = journal.iter().map(event_to_json).collect();
    serde_json::to_writer_pretty(&mut *writer, &Value::Array(events))?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use accretion_core::id::CoordId;
    use accretion_core::roster::Roster;

    use super::*;

    #[test]
    fn export_writes_an_array_of_objects() {
        let mut roster = Roster::new();
        let layer = roster.stamp_layer();
        let group = roster.stamp_group();
        let journal = [
            MembershipEvent::SingleClaimed {
                coordinator: CoordId(0),
                layer,
            },
            MembershipEvent::GroupRecruited {
                coordinator: CoordId(0),
                group,
            },
        ];

        let mut out = Vec::new();
        export(&journal, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["event"], "claim");
        assert_eq!(array[1]["event"], "recruit");
        assert_eq!(array[1]["group"], group.value());
    }

    #[test]
    fn flush_event_round_trips_counts() {
        let value = event_to_json(&MembershipEvent::FlushCompleted {
            coordinator: CoordId(1),
            batches: 3,
            operations: 9,
        });
        assert_eq!(value["batches"], 3);
        assert_eq!(value["operations"], 9);
        assert_eq!(value["coordinator"], 1);
    }
}
