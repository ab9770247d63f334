pub mod config;
pub mod content;
pub mod hash;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "storage")]
pub mod storage;

#[cfg(feature = "chain")]
pub mod chain;
