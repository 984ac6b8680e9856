//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation.
//!
//! ## Spec
//! - `struct Config` derives `clap::Parser`.
//! - Positional `files`: collision logs processed in order (stdin when empty).
//! - Geometry and capacity overrides keep their historical camelCase names
//!   (`--numIons`, `--numGrids`, `--spacing`, `--windowToWires`,
//!   `--windowToEnd`, `--numIsotopes`); kebab-case aliases are accepted.
//! - Report shape: `--groups`, `--pair`, `--report`, `--out`.
//! - Framing switches: `--strict-headers`, `--flush-trailing-record`.
//! - Diagnostics: `-v` (repeatable), `--profile`.
//!
//! ## Validation
//! - Geometry is physically consistent (see `DetectorGeometry::validate`)
//! - Capacity limits are positive and fit the ion index type
//! - Bin groups lie inside the region table and the pair names existing groups
//!
//! ## Example CLI
//! ```bash
//! trific COLLISON.txt --numGrids 21 --spacing 12.77 --pair 13 > pid.csv
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::data::geometry::{
    DetectorGeometry, DEFAULT_NUM_GRIDS, DEFAULT_SPACING_MM, DEFAULT_WINDOW_TO_END_MM,
    DEFAULT_WINDOW_TO_WIRES_MM,
};
use crate::error::{Result, TrificError};
use crate::io::InputSource;
use crate::model::aggregator::{AggregatorOptions, Capacity, DEFAULT_MAX_IONS, DEFAULT_MAX_ISOTOPES};
use crate::model::partition::{GroupPair, PartitionScheme};
use crate::model::reporter::{ReportKind, Reporter};

#[derive(Parser, Debug, Clone)]
#[command(name = "trific")]
#[command(about = "Simulated TRIFIC particle-identification spectra from SRIM collision logs")]
#[command(version)]
pub struct Config {
    /// SRIM collision logs (COLLISON.txt, optionally .gz); reads stdin when omitted
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Upper bound on global ion indices
    #[arg(long = "numIons", alias = "num-ions", default_value_t = DEFAULT_MAX_IONS)]
    pub num_ions: usize,

    /// Number of grids in the chamber
    #[arg(long = "numGrids", alias = "num-grids", default_value_t = DEFAULT_NUM_GRIDS)]
    pub num_grids: usize,

    /// Grid spacing (mm)
    #[arg(long, default_value_t = DEFAULT_SPACING_MM)]
    pub spacing: f64,

    /// Window to first wire plane (mm)
    #[arg(long = "windowToWires", alias = "window-to-wires", default_value_t = DEFAULT_WINDOW_TO_WIRES_MM)]
    pub window_to_wires: f64,

    /// Window to end of the chamber (mm)
    #[arg(long = "windowToEnd", alias = "window-to-end", default_value_t = DEFAULT_WINDOW_TO_END_MM)]
    pub window_to_end: f64,

    /// Maximum number of isotopes in one run
    #[arg(long = "numIsotopes", alias = "num-isotopes", default_value_t = DEFAULT_MAX_ISOTOPES)]
    pub num_isotopes: usize,

    /// Bin groups summed for the PID plot
    #[arg(long, default_value = "1-6,7-12,13-20")]
    pub groups: PartitionScheme,

    /// Groups plotted against each other, 1-based (`13` or `1,3`)
    #[arg(long, default_value = "13")]
    pub pair: GroupPair,

    /// Report to emit per isotope
    #[arg(long, value_enum, default_value_t = ReportKind::Pid)]
    pub report: ReportKind,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Reject ion records that precede every 'Ion Energy' header
    #[arg(long)]
    pub strict_headers: bool,

    /// Accumulate a record left open at end of stream instead of dropping it
    #[arg(long)]
    pub flush_trailing_record: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit span timing on stderr
    #[arg(long)]
    pub profile: bool,
}

impl Config {
    /// Parse from the process arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Parse from an explicit argument list (first item is the program name)
    pub fn try_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config =
            Self::try_parse_from(args).map_err(|e| TrificError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let geometry = self.geometry();
        geometry.validate()?;

        if self.num_ions == 0 || self.num_ions > u32::MAX as usize {
            return Err(TrificError::config(format!(
                "numIons must be between 1 and {}, got {}",
                u32::MAX,
                self.num_ions
            )));
        }
        if self.num_isotopes == 0 || self.num_isotopes > u16::MAX as usize {
            return Err(TrificError::config(format!(
                "numIsotopes must be between 1 and {}, got {}",
                u16::MAX,
                self.num_isotopes
            )));
        }

        self.groups.validate(geometry.n_bins())?;
        self.pair.validate(&self.groups)?;
        Ok(())
    }

    pub fn geometry(&self) -> DetectorGeometry {
        DetectorGeometry {
            num_grids: self.num_grids,
            spacing: self.spacing,
            window_to_wires: self.window_to_wires,
            window_to_end: self.window_to_end,
        }
    }

    pub fn capacity(&self) -> Capacity {
        Capacity {
            max_ions: self.num_ions,
            max_isotopes: self.num_isotopes,
        }
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            flush_trailing_record: self.flush_trailing_record,
            strict_headers: self.strict_headers,
        }
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.report, self.groups.clone(), self.pair)
    }

    pub fn sources(&self) -> Vec<InputSource> {
        InputSource::from_paths(&self.files)
    }
}
