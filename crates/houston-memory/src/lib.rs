mod commander;
mod tracker;

pub use commander::MemoryCommander;
pub use tracker::MemoryTracker;
