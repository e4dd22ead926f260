//! Dwell-time counting: turns "close to the camera" into a one-time visitor count.

mod counter;
mod state;

pub use counter::{DwellConfig, DwellCounter, DwellReport, IdentityStatus, VisitorStats};
pub use state::{DwellPhase, DwellState};
