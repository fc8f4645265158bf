#![warn(missing_docs)]
//! flagsweep Core - Sweep Data Model
//!
//! Types shared by the runner and the report layer:
//! - [`FlagChoice`] / [`FlagGroup`] / [`Axes`]: the configuration table
//! - [`Combinations`]: lazy Cartesian product over the axes
//! - [`Measurement`]: the size/runtime record for one combination

mod axis;
mod combination;
mod measurement;

pub use axis::{Axes, AxesError, FlagChoice, FlagGroup, LABEL_SEPARATOR};
pub use combination::{Combination, Combinations};
pub use measurement::Measurement;
