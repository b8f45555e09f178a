// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulation configuration.
//!
//! The [`SimConfig`] is layered with `figment`, lowest priority first:
//!  1. [`SimConfig::default`]
//!  2. an optional TOML file
//!  3. environment variables prefixed with `NOC_` where `__` separates
//!     nested keys (for example `NOC_ROUTER__NUM_VCS=2`)
//!  4. the command-line options in [`Cli`]

use std::path::{Path, PathBuf};

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use noc_engine::sim_error;
use noc_engine::types::{SimError, SimResult};
use noc_router::config::RouterConfig;
use noc_router::route::RoutingAlgorithm;
use noc_router::switch_control::VcDequeue;
use noc_track::builder::{TrackerConfig, TrackersConfig};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read by [`load_config`].
pub const ENV_PREFIX: &str = "NOC_";

/// Control of the log output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub stdout: bool,
    pub stdout_level: log::Level,
    pub stdout_filter_regex: String,

    /// Write the log to this file as well.
    pub trace_file: Option<String>,
    pub trace_level: log::Level,
    pub trace_filter_regex: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            stdout: true,
            stdout_level: log::Level::Info,
            stdout_filter_regex: String::new(),
            trace_file: None,
            trace_level: log::Level::Trace,
            trace_filter_regex: String::new(),
        }
    }
}

impl TrackingConfig {
    #[must_use]
    pub fn trackers_config(&self) -> TrackersConfig<'_> {
        TrackersConfig {
            stdout: TrackerConfig {
                enable: self.stdout,
                level: self.stdout_level,
                filter_regex: &self.stdout_filter_regex,
                file: None,
            },
            file: TrackerConfig {
                enable: self.trace_file.is_some(),
                level: self.trace_level,
                filter_regex: &self.trace_filter_regex,
                file: self.trace_file.as_deref(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub router: RouterConfig,

    /// Probability that an idle source creates a packet in a cycle.
    pub injection_rate: f64,

    /// Number of packets sent by each source.
    pub packets_per_node: usize,

    /// Seed of the traffic generators.
    pub seed: u64,

    /// Number of cycles after which the simulation is declared deadlocked.
    pub max_cycles: u64,

    pub tracking: TrackingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            injection_rate: 0.1,
            packets_per_node: 100,
            seed: 1,
            max_cycles: 1_000_000,
            tracking: TrackingConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult {
        self.router.validate()?;
        if !(self.injection_rate > 0.0 && self.injection_rate <= 1.0) {
            return sim_error!(format!(
                "Injection rate ({}) must be in the range (0, 1]",
                self.injection_rate
            ));
        }
        if self.max_cycles == 0 {
            return sim_error!("Maximum cycles must be at least 1");
        }
        Ok(())
    }
}

/// Command-line arguments.
///
/// Every option overrides the matching value of the configuration file and
/// environment.
#[derive(Parser, Debug, Default)]
#[command(about = "2D mesh network-on-chip simulation")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of mesh columns (must be a power of two).
    #[arg(long)]
    pub num_columns: Option<u64>,

    /// Number of mesh rows (must be a power of two).
    #[arg(long)]
    pub num_rows: Option<u64>,

    /// Number of virtual channels per port.
    #[arg(long)]
    pub num_vcs: Option<usize>,

    /// Number of entries in each input buffer.
    #[arg(long)]
    pub buffer_depth: Option<usize>,

    /// Dimension order used to route packets.
    #[arg(long)]
    pub routing: Option<RoutingAlgorithm>,

    /// How the virtual channels of an input share the crossbar.
    #[arg(long)]
    pub vc_dequeue: Option<VcDequeue>,

    /// Probability that an idle source creates a packet in a cycle.
    #[arg(long)]
    pub injection_rate: Option<f64>,

    /// Number of packets sent by each source.
    #[arg(long)]
    pub packets_per_node: Option<usize>,

    /// Seed of the traffic generators.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of cycles after which the simulation is declared deadlocked.
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Level of log message to display.
    #[arg(long)]
    pub stdout_level: Option<log::Level>,

    /// Set a regular expression for which entities should have logging level
    /// set to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long)]
    pub stdout_filter_regex: Option<String>,

    /// Also write the log to this file.
    #[arg(long)]
    pub trace_file: Option<String>,

    /// Level of log message written to `--trace-file`.
    #[arg(long)]
    pub trace_level: Option<log::Level>,
}

fn set<T>(value: &mut T, over: &Option<T>)
where
    T: Clone,
{
    if let Some(over) = over {
        *value = over.clone();
    }
}

impl Cli {
    /// Apply the options that were given on the command line.
    pub fn merge_into(&self, config: &mut SimConfig) {
        set(&mut config.router.num_columns, &self.num_columns);
        set(&mut config.router.num_rows, &self.num_rows);
        set(&mut config.router.num_vcs, &self.num_vcs);
        set(&mut config.router.buffer_depth, &self.buffer_depth);
        set(&mut config.router.routing, &self.routing);
        set(&mut config.router.vc_dequeue, &self.vc_dequeue);
        set(&mut config.injection_rate, &self.injection_rate);
        set(&mut config.packets_per_node, &self.packets_per_node);
        set(&mut config.seed, &self.seed);
        set(&mut config.max_cycles, &self.max_cycles);
        set(&mut config.tracking.stdout_level, &self.stdout_level);
        set(
            &mut config.tracking.stdout_filter_regex,
            &self.stdout_filter_regex,
        );
        if self.trace_file.is_some() {
            config.tracking.trace_file = self.trace_file.clone();
        }
        set(&mut config.tracking.trace_level, &self.trace_level);
    }
}

/// Build the configuration from all sources and validate it.
pub fn load_config(conf_file: Option<&Path>, cli: &Cli) -> Result<SimConfig, SimError> {
    let mut figment = Figment::new().merge(Serialized::defaults(SimConfig::default()));
    if let Some(conf_file) = conf_file {
        if !conf_file.is_file() {
            return sim_error!(format!(
                "Configuration file {} not found",
                conf_file.display()
            ));
        }
        figment = figment.merge(Toml::file(conf_file));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: SimConfig = figment
        .extract()
        .map_err(|e| SimError(format!("Invalid configuration: {e}")))?;
    cli.merge_into(&mut config);
    config.validate()?;
    Ok(config)
}
