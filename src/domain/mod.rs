//! Domain types for the promote workflow

pub mod step;

pub use step::Step;
