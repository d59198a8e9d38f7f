//! Background Tasks Module
//!
//! Optional periodic expiry sweep for caches configured with
//! `Eviction::Periodic`.

mod sweep;

pub use sweep::spawn_sweep_task;
