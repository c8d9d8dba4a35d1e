pub mod types;
pub mod slots;
pub mod overrides;
pub mod annotations;
pub mod resolve;

pub use types::{Assignments, Channel, HardwareKind, Override};
pub use slots::{build_channels, frequency_for};
pub use overrides::{apply_overrides, Occupancy};
pub use annotations::{annotations, apply_annotations, normalize, Annotation};
pub use resolve::{baseline, resolve};
