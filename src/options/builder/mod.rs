//! Build the objects used in a calculation from the options.

pub mod load;
pub mod model;
pub mod optimise;
