//! Call flow infrastructure

mod entry_points;
mod frameworks;
mod noise;
mod tracer;

pub use entry_points::EntryPointDetector;
pub use frameworks::{active_patterns, ActivePattern, CallPattern, FrameworkDetector, FRAMEWORK_PATTERNS};
pub use noise::NoiseFilter;
pub use tracer::{BodyIndex, CallChainTracer};
