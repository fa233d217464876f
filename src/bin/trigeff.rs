use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use trigeff::config::read_config_file;
use trigeff::histograms::sum_with_flow;
use trigeff::io::hdf5::write_histograms;
use trigeff::utils::group_digits;
use trigeff::{Scheduler, TagAndProbe, Trigger};

#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "trigeff",
    about = "Tag-and-Probe single-electron trigger efficiencies from NanoAOD-style event tables",
    version,
    subcommand_precedence_over_arg = true,
)]
pub struct Cli {
    /// HDF5 input files with event tables
    pub infiles: Vec<PathBuf>,

    /// HDF5 output file for the probe histograms
    #[clap(short, long, default_value = "histograms.h5")]
    pub out: PathBuf,

    /// Golden JSON of certified (run, luminosity block) ranges
    #[clap(long)]
    pub golden_json: Option<PathBuf>,

    /// Number of worker threads; omit to run single-threaded
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,

    /// Keep going when an input file fails to read; report failures at the end
    #[clap(long)]
    pub report: bool,

    #[clap(subcommand)]
    trigger: TriggerCli,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum TriggerCli {

    /// Single-leg CaloIdVT_GsfTrkIdT trigger
    Caloidvt {
        /// Nominal trigger pt in GeV
        #[clap(long, default_value = "115")]
        trigger_pt: f32,
    },

    /// Single-leg WPTight trigger
    Wptight {
        /// Nominal trigger pt in GeV
        #[clap(long, default_value = "32")]
        trigger_pt: f32,

        /// Exclude tags in the ECAL barrel-endcap transition gap
        #[clap(long)]
        avoid_ecal_transition_tags: bool,

        /// Exclude probes in the ECAL barrel-endcap transition gap
        #[clap(long)]
        avoid_ecal_transition_probes: bool,
    },

    /// Take files, trigger and settings from a TOML run configuration
    Run {
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = Cli::parse();

    let (fileset, trigger, goldenjson, threads, out) = match args.trigger {
        TriggerCli::Caloidvt { trigger_pt } => (
            args.infiles,
            Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt },
            args.golden_json, args.threads, args.out,
        ),
        TriggerCli::Wptight { trigger_pt,
                              avoid_ecal_transition_tags,
                              avoid_ecal_transition_probes } => (
            args.infiles,
            Trigger::ElePtWPTightGsf {
                trigger_pt, avoid_ecal_transition_tags, avoid_ecal_transition_probes },
            args.golden_json, args.threads, args.out,
        ),
        TriggerCli::Run { config } => {
            let config = read_config_file(&config)?;
            (config.files, config.trigger.into(),
             config.goldenjson, config.threads,
             config.output.unwrap_or(args.out))
        }
    };

    // Before starting the potentially long computation, make sure that the
    // requested destination is writable.
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Can't write to {}: {e}", out.display()))?;
        }
    }

    let scheduler = threads.map_or(Scheduler::SingleThreaded, Scheduler::Threads);
    let tnp = TagAndProbe::new(fileset, trigger, goldenjson)?;
    let graph = tnp.histograms();
    println!("Selecting {} probes in {} files",
             tnp.trigger().hlt_path(), group_digits(graph.n_tasks()));

    let histograms = if args.report {
        let (histograms, report) = graph.compute_with_report(scheduler, true);
        let failed: Vec<_> = report.failures().collect();
        if !failed.is_empty() {
            println!("Warning: failed to read {} of {} files:",
                     group_digits(failed.len()), group_digits(graph.n_tasks()));
            for failure in &failed {
                println!("  {}: {}", failure.source.display(),
                         failure.error.as_deref().unwrap_or("unknown error"));
            }
        }
        histograms
    } else {
        graph.compute(scheduler, true)?
    };

    let n_pass = sum_with_flow(&histograms.pt.pass) as u64;
    let n_all  = sum_with_flow(&histograms.pt.all ) as u64;
    println!("{} / {} probes passing", group_digits(n_pass), group_digits(n_all));

    let mut progress = trigeff::utils::timing::Progress::new();
    progress.start(&format!("Writing histograms to {}", out.display()));
    write_histograms(&out, &histograms)?;
    progress.done();
    Ok(())
}
