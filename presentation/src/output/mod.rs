//! Terminal output of runs

pub mod console;
