use std::collections::HashSet;
use tracing::debug;

use super::types::{Assignments, HardwareKind, Override};
use crate::roster::Person;

const OVERRIDE_ROLE: &str = "Override";

/// Person ids already placed on each hardware kind during one resolution pass
#[derive(Debug, Default, Clone)]
pub struct Occupancy {
    mics: HashSet<String>,
    monitors: HashSet<String>,
}

impl Occupancy {
    pub fn contains(&self, kind: HardwareKind, person_id: &str) -> bool {
        self.set(kind).contains(person_id)
    }

    pub fn insert(&mut self, kind: HardwareKind, person_id: &str) {
        match kind {
            HardwareKind::Mic => self.mics.insert(person_id.to_string()),
            HardwareKind::Monitor => self.monitors.insert(person_id.to_string()),
        };
    }

    fn set(&self, kind: HardwareKind) -> &HashSet<String> {
        match kind {
            HardwareKind::Mic => &self.mics,
            HardwareKind::Monitor => &self.monitors,
        }
    }
}

/// Writes manual overrides onto the channel arrays in list order.
///
/// Unknown person ids and slots outside the array are skipped. Two
/// overrides naming the same slot leave the later one in place.
pub fn apply_overrides(
    assignments: &mut Assignments,
    people: &[Person],
    overrides: &[Override],
    occupancy: &mut Occupancy,
) {
    for ov in overrides {
        let Some(person) = people.iter().find(|p| p.id == ov.person_id) else {
            debug!(person_id = %ov.person_id, "override references a person not on the plan");
            continue;
        };

        for kind in [HardwareKind::Mic, HardwareKind::Monitor] {
            let Some(slot) = ov.slot_for(kind) else {
                continue;
            };
            let channels = assignments.channels_mut(kind);
            if slot == 0 || slot as usize > channels.len() {
                debug!(%kind, slot, "override slot out of range");
                continue;
            }

            let channel = &mut channels[slot as usize - 1];
            channel.assigned_to = Some(person.name.clone());
            channel.role = Some(person.primary_role().unwrap_or(OVERRIDE_ROLE).to_string());
            channel.photo_url = person.photo_url.clone();
            occupancy.insert(kind, &person.id);
        }
    }
}
