//! Tick clock, coalescing command scheduler, and pulse runner.
//!
//! The scheduler lets host code say "run this action N seconds from now"
//! and have it execute on the right future tick of a single-threaded
//! event loop. Repeated requests for the same kind on the same tick are
//! coalesced into one entry with a repeat count.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter and seconds-to-ticks conversion.
//! - [`config`] -- Configuration loading from `hudtick-config.yaml`.
//! - [`dispatch`] -- [`CommandHandler`] trait and the [`ActionTable`]
//!   dispatch table of host callbacks.
//! - [`scheduler`] -- The tick-keyed pending-command table.
//! - [`shared`] -- Mutex-guarded handle for multi-threaded hosts.
//! - [`runner`] -- Async pulse loop driving a shared scheduler.
//! - [`warning`] -- The self-rescheduling full-inventory warning action.
//!
//! [`CommandHandler`]: dispatch::CommandHandler
//! [`ActionTable`]: dispatch::ActionTable

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod runner;
pub mod scheduler;
pub mod shared;
pub mod warning;
