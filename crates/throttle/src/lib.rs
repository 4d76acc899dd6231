#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `throttle` enforces transfer speed policy for the ebftpd workspace:
//! cumulative per-path rate caps shared by every concurrent transfer
//! matching a configured `speed_limit`, per-client ceilings and floors,
//! and per-user session/transfer slot accounting.
//!
//! # Design
//!
//! - [`SpeedInfo`] is one transfer's progress (duration + bytes) with
//!   add/subtract bookkeeping for joining and leaving aggregates.
//! - [`SpeedCounter`] keys shared aggregates by limit path pattern under
//!   a single mutex. `update` folds a transfer's progress in and returns
//!   the sleep needed to keep the aggregate under the tightest matching
//!   ceiling; `clear` withdraws a finished transfer and drops empty
//!   slots. The per-call sleep is capped at [`MAX_PACING_SLEEP`] so the
//!   control loop stays responsive.
//! - [`SpeedControl`] is the per-transfer RAII guard: called once per
//!   transferred chunk, it combines the personal ceiling with the shared
//!   limits, performs the sleep outside the lock, polices the
//!   minimum-speed floor, and unregisters on drop.
//! - [`SessionCounter`] tracks per-user login and simultaneous transfer
//!   slots for `max_users` and `sim_xfers` enforcement.
//!
//! # Concurrency
//!
//! Every transfer runs on its own thread and calls into the shared
//! counters at chunk granularity. Critical sections hold one mutex, do
//! no I/O, and never sleep; computed pauses are served by the caller
//! after the lock is released.

mod control;
mod counter;
mod session;
mod speed;

pub use crate::control::{MinimumSpeedError, SpeedControl};
pub use crate::counter::{
    MAX_PACING_SLEEP, SpeedCounter, download_speeds, sleep_for_limit, upload_speeds,
};
pub use crate::session::SessionCounter;
pub use crate::speed::SpeedInfo;
