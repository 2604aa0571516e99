//! Minimizer indices and the operations that create and move them

pub mod builder;
pub mod device_index;
pub mod host_copy;
pub mod minimizer;
pub mod partition;

pub use builder::{check_range, IndexBuilder, MinimizerIndexBuilder};
pub use device_index::{DeviceIndex, IndexContents};
pub use host_copy::HostIndexCopy;
pub use minimizer::{sketch_read, Direction, Position, Representation, SketchElement};
pub use partition::partition_reads;
