//! Defines command-line interface options using `clap` for the TempoCube application.

use clap::Parser;
use std::path::PathBuf;

/// A CLI tool for time subsetting and temporal averaging of NetCDF variables
#[derive(Parser, Debug)]
#[command(
    version = "0.3.0",
    name = "TempoCube",
    about = "Time-axis subsetting and temporal averaging for NetCDF climate data"
)]
pub struct Args {
    /// Path to the NetCDF file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Variable to load as a cube
    #[arg(short, long)]
    pub var: String,

    /// Extract a time range, formatted as <Y-M-D:Y-M-D>. Boundaries are excluded.
    #[arg(long, value_parser = parse_time_range)]
    pub extract_time: Option<TimeRange>,

    /// Extract a season (DJF, MAM, JJA or SON)
    #[arg(long)]
    pub extract_season: Option<String>,

    /// Extract a month, as a number from 1 to 12
    #[arg(long)]
    pub extract_month: Option<u32>,

    /// Compute per-season means, dropping incomplete seasons
    #[arg(long, default_value_t = false)]
    pub seasonal_mean: bool,

    /// Compute per-year means
    #[arg(long, default_value_t = false)]
    pub annual_mean: bool,

    /// Group means by decade instead of year
    #[arg(long, default_value_t = false)]
    pub decadal: bool,

    /// Collapse the whole time axis to a bounds-weighted mean
    #[arg(long, default_value_t = false)]
    pub time_average: bool,

    /// Describe the variable's time coordinate and exit
    #[arg(long, default_value_t = false)]
    pub describe: bool,

    /// Path to save the result as NetCDF. If not set, prints a summary.
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

/// Start and end dates of a time-range extraction
#[derive(Debug, Clone)]
pub struct TimeRange {
    pub start: (i32, u32, u32),
    pub end: (i32, u32, u32),
}

fn parse_time_range(s: &str) -> Result<TimeRange, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| "Invalid format: Expected '<Y-M-D:Y-M-D>'.".to_string())?;
    Ok(TimeRange {
        start: parse_date(start)?,
        end: parse_date(end)?,
    })
}

fn parse_date(s: &str) -> Result<(i32, u32, u32), String> {
    let parts: Vec<&str> = s.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => {
            let year = year
                .parse::<i32>()
                .map_err(|_| format!("Invalid year '{}'", year))?;
            let month = month
                .parse::<u32>()
                .map_err(|_| format!("Invalid month '{}'", month))?;
            let day = day
                .parse::<u32>()
                .map_err(|_| format!("Invalid day '{}'", day))?;
            Ok((year, month, day))
        }
        _ => Err("Invalid format: Expected '<year>-<month>-<day>'.".to_string()),
    }
}
