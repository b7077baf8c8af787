//! TempoCube: time-axis subsetting and temporal aggregation for NetCDF climate data
//!
//! A Rust library for extracting sub-periods (date ranges, seasons, months) from
//! time-coordinated climate data and computing time-weighted or grouped averages
//! (overall mean, seasonal mean, annual and decadal mean) under calendar-aware
//! time coordinates, including non-standard calendars such as 360-day.
//!
//! ## Key Features
//!
//! - **Calendar Support**: standard, proleptic Gregorian, no-leap, all-leap and
//!   360-day CF calendars with exact date↔numeric conversion
//! - **Time Extraction**: date ranges (boundaries excluded), seasons, months
//! - **Temporal Averaging**: bounds-weighted time mean, seasonal means with
//!   incomplete-season filtering, annual and decadal means
//! - **Parallel Processing**: reductions use Rayon for multi-core processing
//! - **NetCDF Support**: load variables into cubes and write results back out
//!
//! ## Module Organization
//!
//! - [`cube`]: the cube data model (data array, time coordinate, categorical coordinates)
//! - [`calendar`]: CF calendar systems and units-string parsing
//! - [`categorize`]: derivation of season/year/month labels from time points
//! - [`aggregation`]: weighted collapse and group-by reductions
//! - [`time_ops`]: the time operations themselves
//! - [`cube_io`]: NetCDF file I/O for cubes
//! - [`metadata`]: cube inspection and summary output
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//! ```rust,no_run
//! use tempo_cube::prelude::*;
//! use netcdf::open;
//!
//! // Open a NetCDF file and load a variable as a cube
//! let file = open("data.nc").unwrap();
//! let mut cube = tempo_cube::cube_io::read_cube(&file, "temperature").unwrap();
//!
//! // Keep only winter data, then average each winter
//! let winters = tempo_cube::time_ops::extract_season(&mut cube, "DJF").unwrap();
//! ```
//!
//! Operations that derive categorical coordinates (seasons, years, decades)
//! attach them to the input cube in place; cubes are not immutable.

// Core modules
pub mod aggregation;
pub mod calendar;
pub mod categorize;
pub mod cli;
pub mod cube;
pub mod cube_io;
pub mod errors;
pub mod metadata;
pub mod parallel;
pub mod time_ops;

// Direct re-exports for the public API
pub use aggregation::*;
pub use calendar::*;
pub use cube::*;
pub use cube_io::*;
pub use errors::*;
pub use metadata::*;
pub use parallel::*;
pub use time_ops::*;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::aggregation::AggregatorKind;
    pub use crate::calendar::{CalDate, Calendar, TimeBase, TimeUnit};
    pub use crate::cube::{CategoricalCoord, CategoryValue, Cube, TimeCoordinate};
    pub use crate::cube_io::CubeWriter;
    pub use crate::errors::{Result, TempoCubeError};
    pub use crate::parallel::ParallelConfig;
    pub use crate::time_ops::{
        annual_mean, extract_month, extract_season, extract_time, get_time_weights,
        seasonal_mean, time_average,
    };
}
