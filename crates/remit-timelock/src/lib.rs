//! # remit-timelock
//!
//! **Authorization Gate**: the pause flag and the timelocked kill switch
//! that guard the irreversible termination of a remittance contract.
//!
//! ## Termination Flow
//!
//! ```text
//! start() ──▶ [wait period elapses] ──▶ is_ready() == true
//!                                          │
//!                      pause() ──▶ terminate() ──▶ TERMINATED
//!
//! stop() returns a pending process to IDLE at any point before terminate().
//! ```
//!
//! Both switches read the administrator from an explicit [`Ownership`]
//! passed into each call.
//!
//! [`Ownership`]: remit_types::Ownership

pub mod kill_switch;
pub mod pause;

pub use kill_switch::{KillProcess, KillSwitch};
pub use pause::PauseSwitch;
