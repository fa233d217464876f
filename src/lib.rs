mod exports;
pub use exports::*;

pub mod jagged;
pub mod event;
pub mod matching;
pub mod pairs;
pub mod triggers;
pub mod histograms;
pub mod lumimask;
pub mod run;
pub mod tnp;
pub mod io;
pub mod config;
pub mod utils;
