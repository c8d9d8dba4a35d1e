use once_cell::sync::Lazy;
use regex::{CaptureMatches, Captures, Regex};
use tracing::debug;

use super::overrides::Occupancy;
use super::types::{Assignments, HardwareKind};
use crate::roster::Person;

static MIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[MIC\s*(\d+)\]\s*([^(\n\r]+)").expect("mic annotation pattern is valid")
});

static MONITOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(?:MON|IEM)\s*(\d+)\]\s*([^(\n\r]+)").expect("monitor annotation pattern is valid")
});

/// A `[MIC 3] Name` style fragment found in plan notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub kind: HardwareKind,
    /// `None` when the digits do not fit a slot number at all
    pub slot: Option<u32>,
    pub name: String,
}

/// Iterator over the annotations of a single note.
///
/// Each kind is scanned on its own, so a fragment of one kind never hides a
/// tag of the other. Mic tags come first, then monitor tags, each left to
/// right.
pub struct Annotations<'a> {
    mics: CaptureMatches<'static, 'a>,
    monitors: CaptureMatches<'static, 'a>,
}

fn annotation(kind: HardwareKind, caps: &Captures<'_>) -> Annotation {
    Annotation {
        kind,
        slot: caps[1].parse().ok(),
        name: caps[2].trim().to_string(),
    }
}

impl Iterator for Annotations<'_> {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        if let Some(caps) = self.mics.next() {
            return Some(annotation(HardwareKind::Mic, &caps));
        }
        let caps = self.monitors.next()?;
        Some(annotation(HardwareKind::Monitor, &caps))
    }
}

/// Scans one note for tagged hardware fragments.
/// `MIC` tags address microphones, `MON` and `IEM` address monitor packs.
pub fn annotations(note: &str) -> Annotations<'_> {
    Annotations {
        mics: MIC_PATTERN.captures_iter(note),
        monitors: MONITOR_PATTERN.captures_iter(note),
    }
}

/// Lower-cases and drops everything that is not a letter or digit
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Applies note annotations to channels not already claimed.
///
/// Tokens are taken in discovery order. A token is dropped when its slot is
/// out of range or already assigned, or when no unplaced person's name
/// contains the fragment. The first matching person in roster order wins;
/// a fragment with no letters or digits matches the first unplaced person.
pub fn apply_annotations<'n, I>(
    assignments: &mut Assignments,
    people: &[Person],
    notes: I,
    occupancy: &mut Occupancy,
) where
    I: IntoIterator<Item = &'n str>,
{
    let keys: Vec<String> = people.iter().map(|p| normalize(&p.name)).collect();

    for annotation in notes.into_iter().flat_map(annotations) {
        let kind = annotation.kind;
        let channels = assignments.channels_mut(kind);
        let Some(idx) = annotation
            .slot
            .filter(|slot| *slot >= 1 && *slot as usize <= channels.len())
            .map(|slot| slot as usize - 1)
        else {
            debug!(%kind, slot = ?annotation.slot, "annotation slot out of range");
            continue;
        };

        let channel = &mut channels[idx];
        if channel.assigned_to.is_some() {
            debug!(%kind, slot = channel.slot, "annotation targets an occupied slot");
            continue;
        }

        let fragment = normalize(&annotation.name);

        let found = people
            .iter()
            .zip(&keys)
            .find(|(person, key)| !occupancy.contains(kind, &person.id) && key.contains(&fragment));
        let Some((person, _)) = found else {
            debug!(%kind, slot = channel.slot, name = %annotation.name, "no unplaced person matches annotation");
            continue;
        };

        channel.assigned_to = Some(person.name.clone());
        channel.photo_url = person.photo_url.clone();
        if channel.role.is_none() {
            channel.role = person.primary_role().map(str::to_string);
        }
        occupancy.insert(kind, &person.id);
    }
}
