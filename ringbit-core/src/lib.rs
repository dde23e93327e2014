//! Core driver for the ELECFREAKS Ring:bit car on no-std embedded platforms.
//!
//! For a host-side run against simulated peripherals, see `ringbit-app/mock-mcu`.
#![no_std]

pub mod utils;

pub use utils::controllers::ringbit::{Error, Ringbit};
