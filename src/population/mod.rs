//! Population management
//!
//! A population is a fixed-size collection of individuals bound to a
//! problem, with champion and dominance bookkeeping kept consistent on
//! every write.

pub mod individual;
#[allow(clippy::module_inception)]
pub mod population;

pub use individual::{Champion, Individual};
pub use population::Population;
