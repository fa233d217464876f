pub use crate::event::{Electron, Events, TrigObj};
pub use crate::histograms::TnpHistograms;
pub use crate::jagged::Jagged;
pub use crate::lumimask::LumiMask;
pub use crate::run::{Deferred, RunReport, Scheduler};
pub use crate::tnp::{ProbeArrays, TagAndProbe};
pub use crate::triggers::{Probe, ProbeArms, Trigger};
