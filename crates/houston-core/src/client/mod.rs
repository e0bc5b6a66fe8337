mod commander;
mod segment;

pub use commander::HttpCommander;
pub use segment::SegmentTracker;
