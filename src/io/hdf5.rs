//! Event and histogram tables in HDF5
//!
//! Events are stored NanoAOD-style: flat per-object columns plus per-event
//! counts, all under one `events` group:
//!
//! ```text
//! events/run, events/luminosityBlock            -- one entry per event
//! events/nElectron, events/Electron_pt, ...     -- jagged electron columns
//! events/nTrigObj,  events/TrigObj_pt,  ...     -- jagged trigger-object columns
//! ```
//!
//! The reader reassembles the jagged structure and refuses files whose
//! counts and column lengths disagree.

use std::error::Error;
use std::path::Path;

use ndhistogram::{axis::Axis, Histogram};

use crate::event::{Electron, Events, TrigObj};
use crate::histograms::{ProbeHist, TnpHistograms};
use crate::jagged::Jagged;

pub const EVENTS_GROUP: &str = "events";

type IoError = Box<dyn Error + Send + Sync>;

pub fn read_column<T: hdf5::H5Type>(file: &hdf5::File, column: &str) -> hdf5::Result<Vec<T>> {
    file.dataset(&format!("{EVENTS_GROUP}/{column}"))?.read_raw::<T>()
}

pub fn read_events(filename: &dyn AsRef<Path>) -> Result<Events, IoError> {
    let file = hdf5::File::open(filename)?;

    let run: Vec<u32> = read_column(&file, "run")?;
    let luminosity_block: Vec<u32> = read_column(&file, "luminosityBlock")?;

    let n_electron: Vec<u32> = read_column(&file, "nElectron")?;
    let counts: Vec<usize> = n_electron.iter().map(|&n| n as usize).collect();
    let pt:  Vec<f32> = read_column(&file, "Electron_pt")?;
    let eta: Vec<f32> = read_column(&file, "Electron_eta")?;
    let phi: Vec<f32> = read_column(&file, "Electron_phi")?;
    let charge:    Vec<i32> = read_column(&file, "Electron_charge")?;
    let cut_based: Vec<i32> = read_column(&file, "Electron_cutBased")?;
    let flat: Vec<Electron> = itertools::izip!(pt, eta, phi, charge, cut_based)
        .map(|(pt, eta, phi, charge, cut_based)| Electron { pt, eta, phi, charge, cut_based })
        .collect();
    let electrons = Jagged::from_flat(&counts, flat)?;

    let n_trigobj: Vec<u32> = read_column(&file, "nTrigObj")?;
    let counts: Vec<usize> = n_trigobj.iter().map(|&n| n as usize).collect();
    let pt:  Vec<f32> = read_column(&file, "TrigObj_pt")?;
    let eta: Vec<f32> = read_column(&file, "TrigObj_eta")?;
    let phi: Vec<f32> = read_column(&file, "TrigObj_phi")?;
    let id:          Vec<i32> = read_column(&file, "TrigObj_id")?;
    let filter_bits: Vec<i32> = read_column(&file, "TrigObj_filterBits")?;
    let flat: Vec<TrigObj> = itertools::izip!(pt, eta, phi, id, filter_bits)
        .map(|(pt, eta, phi, id, filter_bits)| TrigObj { pt, eta, phi, id, filter_bits })
        .collect();
    let trig_objs = Jagged::from_flat(&counts, flat)?;

    if run.len() != luminosity_block.len()
        || run.len() != electrons.n_events()
        || run.len() != trig_objs.n_events()
    {
        return Err(format!(
            "event columns disagree on the number of events in {}",
            filename.as_ref().display()).into());
    }
    Ok(Events { run, luminosity_block, electrons, trig_objs })
}

/// Write events in the layout `read_events` expects. Used for fixtures and
/// for materializing derived event samples.
pub fn write_events(filename: &dyn AsRef<Path>, events: &Events) -> hdf5::Result<()> {
    let file = hdf5::File::create(filename)?;
    let group = file.create_group(EVENTS_GROUP)?;

    let write = |name: &str, data: &dyn WritableColumn| data.write_to(&group, name);
    write("run", &events.run)?;
    write("luminosityBlock", &events.luminosity_block)?;

    let counts: Vec<u32> = events.electrons.counts().map(|n| n as u32).collect();
    let flat = events.electrons.flatten();
    write("nElectron", &counts)?;
    write("Electron_pt",  &flat.iter().map(|e| e.pt ).collect::<Vec<f32>>())?;
    write("Electron_eta", &flat.iter().map(|e| e.eta).collect::<Vec<f32>>())?;
    write("Electron_phi", &flat.iter().map(|e| e.phi).collect::<Vec<f32>>())?;
    write("Electron_charge",   &flat.iter().map(|e| e.charge   ).collect::<Vec<i32>>())?;
    write("Electron_cutBased", &flat.iter().map(|e| e.cut_based).collect::<Vec<i32>>())?;

    let counts: Vec<u32> = events.trig_objs.counts().map(|n| n as u32).collect();
    let flat = events.trig_objs.flatten();
    write("nTrigObj", &counts)?;
    write("TrigObj_pt",  &flat.iter().map(|t| t.pt ).collect::<Vec<f32>>())?;
    write("TrigObj_eta", &flat.iter().map(|t| t.eta).collect::<Vec<f32>>())?;
    write("TrigObj_phi", &flat.iter().map(|t| t.phi).collect::<Vec<f32>>())?;
    write("TrigObj_id",          &flat.iter().map(|t| t.id         ).collect::<Vec<i32>>())?;
    write("TrigObj_filterBits",  &flat.iter().map(|t| t.filter_bits).collect::<Vec<i32>>())?;
    Ok(())
}

trait WritableColumn {
    fn write_to(&self, group: &hdf5::Group, name: &str) -> hdf5::Result<()>;
}

impl<T: hdf5::H5Type> WritableColumn for Vec<T> {
    fn write_to(&self, group: &hdf5::Group, name: &str) -> hdf5::Result<()> {
        group.new_dataset_builder().with_data(self).create(name)?;
        Ok(())
    }
}

/// Write the full histogram set: per histogram a group holding its bin
/// `edges` and its `values` including the flow bins (index 0 = underflow).
pub fn write_histograms(filename: &dyn AsRef<Path>, histograms: &TnpHistograms) -> hdf5::Result<()> {
    let file = hdf5::File::create(filename)?;
    let pairs = [
        ("pt",        &histograms.pt),
        ("pt_barrel", &histograms.pt_barrel),
        ("pt_endcap", &histograms.pt_endcap),
        ("eta",       &histograms.eta),
        ("phi",       &histograms.phi),
    ];
    for (name, pair) in pairs {
        let group = file.create_group(name)?;
        write_histogram(&group.create_group("passing")?, &pair.pass)?;
        write_histogram(&group.create_group("all")?,     &pair.all)?;
    }
    Ok(())
}

fn write_histogram(group: &hdf5::Group, h: &ProbeHist) -> hdf5::Result<()> {
    let values: Vec<f64> = h.values().copied().collect();
    let axis = &h.axes().as_tuple().0;
    let edges: Vec<f32> = (1..axis.num_bins() - 1)
        .filter_map(|i| axis.bin(i))
        .filter_map(|bin| bin.start())
        .chain(axis.bin(axis.num_bins() - 2).and_then(|bin| bin.end()))
        .collect();
    group.new_dataset_builder().with_data(&values).create("values")?;
    group.new_dataset_builder().with_data(&edges).create("edges")?;
    Ok(())
}
