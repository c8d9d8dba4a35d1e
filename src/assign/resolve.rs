use rand::Rng;
use tracing::debug;

use super::annotations::apply_annotations;
use super::overrides::{apply_overrides, Occupancy};
use super::slots::build_channels;
use super::types::{Assignments, HardwareKind};
use crate::roster::{consolidate, ServicePlan};
use crate::settings::AppSettings;

/// Baseline channels for both kinds, nothing assigned
pub fn baseline<R: Rng + ?Sized>(settings: &AppSettings, rng: &mut R) -> Assignments {
    Assignments {
        mics: build_channels(HardwareKind::Mic, settings.mic_count, &settings.mic_labels, rng),
        monitors: build_channels(HardwareKind::Monitor, settings.monitor_count, &settings.monitor_labels, rng),
    }
}

/// Turns a plan and the current settings into the final channel assignment.
///
/// Manual overrides are applied first, then note annotations fill whatever
/// they left open. Without a plan the baseline is returned as is.
pub fn resolve<R: Rng + ?Sized>(plan: Option<&ServicePlan>, settings: &AppSettings, rng: &mut R) -> Assignments {
    let mut assignments = baseline(settings, rng);

    let Some(plan) = plan else {
        return assignments;
    };

    let people = consolidate(&plan.people);
    let mut occupancy = Occupancy::default();

    apply_overrides(&mut assignments, &people, &settings.person_overrides, &mut occupancy);
    apply_annotations(
        &mut assignments,
        &people,
        plan.notes.iter().map(String::as_str),
        &mut occupancy,
    );

    debug!(
        plan_id = %plan.id,
        people = people.len(),
        mics = assignments.mics.iter().filter(|c| !c.is_spare()).count(),
        monitors = assignments.monitors.iter().filter(|c| !c.is_spare()).count(),
        "resolved assignments"
    );

    assignments
}
