#![warn(missing_debug_implementations)]
#![deny(dead_code)]
#![deny(non_ascii_idents)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unit_bindings)]
#![warn(unused_qualifications)]

// Crate dependency used in the binary but not the library.
use tracing_subscriber as _;

pub mod grid;
pub mod planner;
pub mod verbosity;
