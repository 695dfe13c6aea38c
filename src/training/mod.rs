pub mod schedule;
pub mod trainer;

pub use schedule::MilestoneLr;
pub use trainer::{EpochReport, EpochSummary, Trainer};
