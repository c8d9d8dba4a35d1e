use rand::Rng;
use std::collections::BTreeMap;

use super::types::{Channel, HardwareKind};

/// Formats the synthetic frequency for a slot, e.g. `591.425 MHz`
pub fn frequency_for(slot: u32, kind: HardwareKind) -> String {
    format!("{:.3} MHz", kind.base_frequency() + slot as f64 * 0.425)
}

/// Builds the baseline channel array for one hardware kind.
///
/// Slots are numbered 1..=count with no gaps. Labels come from `labels`
/// when a slot has one, otherwise the kind's generic label. Battery levels
/// are drawn from `rng` so callers control the telemetry source.
pub fn build_channels<R: Rng + ?Sized>(
    kind: HardwareKind,
    count: u32,
    labels: &BTreeMap<u32, String>,
    rng: &mut R,
) -> Vec<Channel> {
    let (low, high) = kind.battery_range();

    (1..=count)
        .map(|slot| Channel {
            slot,
            kind,
            label: labels
                .get(&slot)
                .filter(|label| !label.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| kind.default_label(slot)),
            assigned_to: None,
            role: None,
            photo_url: None,
            frequency: frequency_for(slot, kind),
            gain: kind.gain().to_string(),
            battery: rng.gen_range(low..=high),
        })
        .collect()
}
