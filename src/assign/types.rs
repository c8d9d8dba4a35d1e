use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of stage hardware a channel can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareKind {
    Mic,
    Monitor,
}

impl HardwareKind {
    /// Base of the synthetic frequency plan in MHz
    pub fn base_frequency(self) -> f64 {
        match self {
            HardwareKind::Mic => 591.0,
            HardwareKind::Monitor => 471.0,
        }
    }

    pub fn gain(self) -> &'static str {
        match self {
            HardwareKind::Mic => "-12 dB",
            HardwareKind::Monitor => "0 dB",
        }
    }

    /// Inclusive battery percentage range used for synthetic telemetry
    pub fn battery_range(self) -> (u8, u8) {
        match self {
            HardwareKind::Mic => (85, 99),
            HardwareKind::Monitor => (80, 99),
        }
    }

    /// Label used when no per-slot label is configured
    pub fn default_label(self, slot: u32) -> String {
        match self {
            HardwareKind::Mic => format!("Mic {}", slot),
            HardwareKind::Monitor => format!("Pack {}", slot),
        }
    }
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareKind::Mic => write!(f, "Mic"),
            HardwareKind::Monitor => write!(f, "Monitor"),
        }
    }
}

/// One hardware slot and whoever ended up on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub slot: u32,
    pub kind: HardwareKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub frequency: String,
    pub gain: String,
    pub battery: u8,
}

impl Channel {
    pub fn is_spare(&self) -> bool {
        self.assigned_to.is_none()
    }
}

/// Final per-kind channel arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignments {
    pub mics: Vec<Channel>,
    pub monitors: Vec<Channel>,
}

impl Assignments {
    pub fn channels(&self, kind: HardwareKind) -> &[Channel] {
        match kind {
            HardwareKind::Mic => &self.mics,
            HardwareKind::Monitor => &self.monitors,
        }
    }

    pub fn channels_mut(&mut self, kind: HardwareKind) -> &mut [Channel] {
        match kind {
            HardwareKind::Mic => &mut self.mics,
            HardwareKind::Monitor => &mut self.monitors,
        }
    }
}

/// A user-declared forced mapping of a person onto hardware slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Override {
    pub person_id: String,
    #[serde(default)]
    pub mic_slot: Option<u32>,
    #[serde(default)]
    pub monitor_slot: Option<u32>,
}

impl Override {
    pub fn slot_for(&self, kind: HardwareKind) -> Option<u32> {
        match kind {
            HardwareKind::Mic => self.mic_slot,
            HardwareKind::Monitor => self.monitor_slot,
        }
    }
}
