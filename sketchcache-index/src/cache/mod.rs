//! Two-tier index cache with query and target roles
//!
//! [`HostIndexCache`] keeps host copies of built indices and hands out freshly
//! materialized device indices. [`DeviceIndexCache`] sits on top of a host
//! cache and keeps the device indices themselves. Both replace a role's
//! contents wholesale on update and can share entries between roles.

mod device;
mod generation;
mod host;
mod stats;

pub use device::DeviceIndexCache;
pub use host::HostIndexCache;
pub use stats::CacheStats;
