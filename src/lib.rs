//! ergo
//! A library of cumulative fatigue damage models for repetitive loading.

pub static COMMENT: &str = "#  ";

extern crate svg;
extern crate log;

#[macro_use]
extern crate lazy_static;

pub mod calibration;
pub mod damage;
pub mod load;
pub mod numbers;
pub mod plot;
pub mod solve;
pub mod special;
pub mod units;
