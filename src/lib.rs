pub mod assign;
pub mod display;
pub mod error;
pub mod pco;
pub mod refresh;
pub mod roster;
pub mod settings;
pub mod web;

pub use assign::{resolve, Assignments, Channel, HardwareKind, Override};
pub use error::{PcoError, SettingsError};
pub use pco::{PcoClient, PlanSource, ServiceType};
pub use refresh::{BoardState, RefreshCoordinator, RefreshOutcome, SyncStatus};
pub use roster::{consolidate, Person, ServicePlan, TeamMember};
pub use settings::{AppSettings, SettingsStore};
