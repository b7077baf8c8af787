//! The cube data model: an n-dimensional array with named dimensions and a
//! calendar-aware time coordinate
//!
//! A [`Cube`] owns its data as an `ndarray::ArrayD<f64>`, one name per axis,
//! a distinguished time coordinate with optional per-point bounds, and any
//! number of auxiliary categorical coordinates aligned one-to-one with the
//! time points (season labels, years, decades). Categorical coordinates are
//! attached in place; callers must not assume cubes are immutable.

use crate::calendar::TimeUnit;
use crate::categorize;
use crate::errors::{Result, TempoCubeError};
use ndarray::{ArrayD, Axis};
use std::fmt;

/// The ordered, bounded time coordinate of a cube
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCoordinate {
    pub name: String,
    /// Numeric time points in `units`, monotonically non-decreasing
    pub points: Vec<f64>,
    /// Per-point (lower, upper) interval each sample represents
    pub bounds: Option<Vec<(f64, f64)>>,
    pub units: TimeUnit,
}

impl TimeCoordinate {
    pub fn new(
        name: impl Into<String>,
        points: Vec<f64>,
        bounds: Option<Vec<(f64, f64)>>,
        units: TimeUnit,
    ) -> Self {
        Self {
            name: name.into(),
            points,
            bounds,
            units,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinate restricted to the given point indices.
    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            points: indices.iter().map(|&i| self.points[i]).collect(),
            bounds: self
                .bounds
                .as_ref()
                .map(|b| indices.iter().map(|&i| b[i]).collect()),
            units: self.units.clone(),
        }
    }
}

/// A single categorical label, one per time point
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryValue {
    Str(String),
    Int(i64),
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Str(s) => write!(f, "{}", s),
            CategoryValue::Int(i) => write!(f, "{}", i),
        }
    }
}

/// A derived labeling of the time points, used as a grouping or filter key
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalCoord {
    pub name: String,
    pub labels: Vec<CategoryValue>,
}

/// An n-dimensional data array with named dimensions and a time coordinate
#[derive(Debug, Clone)]
pub struct Cube {
    /// Variable name, carried through operations for output naming
    pub name: String,
    pub data: ArrayD<f64>,
    /// One name per data axis
    pub dim_names: Vec<String>,
    pub time: TimeCoordinate,
    pub aux_coords: Vec<CategoricalCoord>,
    /// Axis the time coordinate indexes; None once collapsed to scalar time
    time_dim: Option<usize>,
}

impl Cube {
    /// Build a cube whose time coordinate indexes one of the data axes.
    pub fn new(
        name: impl Into<String>,
        data: ArrayD<f64>,
        dim_names: Vec<String>,
        time: TimeCoordinate,
    ) -> Result<Self> {
        let name = name.into();
        if dim_names.len() != data.ndim() {
            return Err(TempoCubeError::Generic(format!(
                "Cube '{}' has {} dimension names for {} axes",
                name,
                dim_names.len(),
                data.ndim()
            )));
        }
        let time_dim = dim_names
            .iter()
            .position(|d| *d == time.name)
            .ok_or_else(|| TempoCubeError::CoordinateNotFound {
                coord: time.name.clone(),
            })?;
        if data.shape()[time_dim] != time.len() {
            return Err(TempoCubeError::Generic(format!(
                "Time coordinate '{}' has {} points but axis {} has length {}",
                time.name,
                time.len(),
                time_dim,
                data.shape()[time_dim]
            )));
        }
        Ok(Self {
            name,
            data,
            dim_names,
            time,
            aux_coords: Vec::new(),
            time_dim: Some(time_dim),
        })
    }

    /// Assemble a cube directly, bypassing the time-axis checks. Used by the
    /// aggregation engine and the selection primitive, which already maintain
    /// the invariants.
    pub(crate) fn from_parts(
        name: String,
        data: ArrayD<f64>,
        dim_names: Vec<String>,
        time: TimeCoordinate,
        aux_coords: Vec<CategoricalCoord>,
        time_dim: Option<usize>,
    ) -> Self {
        Self {
            name,
            data,
            dim_names,
            time,
            aux_coords,
            time_dim,
        }
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Axis index of the time dimension, or None when time is scalar.
    pub fn time_dim(&self) -> Option<usize> {
        self.time_dim
    }

    pub fn has_aux_coord(&self, name: &str) -> bool {
        self.aux_coords.iter().any(|c| c.name == name)
    }

    pub fn aux_coord(&self, name: &str) -> Option<&CategoricalCoord> {
        self.aux_coords.iter().find(|c| c.name == name)
    }

    /// Attach a categorical coordinate aligned with the time points.
    ///
    /// Duplicate names are rejected; callers test for presence first when
    /// they want add-if-absent behavior.
    pub fn add_aux_coord(&mut self, coord: CategoricalCoord) -> Result<()> {
        if self.has_aux_coord(&coord.name) {
            return Err(TempoCubeError::Generic(format!(
                "Coordinate '{}' already exists on cube '{}'",
                coord.name, self.name
            )));
        }
        if coord.labels.len() != self.time.len() {
            return Err(TempoCubeError::Generic(format!(
                "Coordinate '{}' has {} labels for {} time points",
                coord.name,
                coord.labels.len(),
                self.time.len()
            )));
        }
        self.aux_coords.push(coord);
        Ok(())
    }

    /// Derive a well-known categorical coordinate if it is not yet present.
    ///
    /// This is what makes filters like `month_number == 3` work without the
    /// caller attaching the coordinate beforehand.
    pub fn ensure_categorical(&mut self, name: &str) -> Result<()> {
        if self.has_aux_coord(name) {
            return Ok(());
        }
        match name {
            "month_number" => categorize::add_month_number(self, name),
            "year" => categorize::add_year(self, name),
            "clim_season" => categorize::add_season(self, name),
            "season_year" => categorize::add_season_year(self, name),
            _ => Err(TempoCubeError::CoordinateNotFound {
                coord: name.to_string(),
            }),
        }
    }

    /// Selection primitive: the sub-cube at the given time indices.
    ///
    /// Selecting exactly one point drops the time axis from the data and
    /// leaves a scalar time coordinate, mirroring the scalar-coordinate
    /// convention of cube libraries. An empty selection keeps the axis with
    /// length zero.
    pub fn select_time(&self, indices: &[usize]) -> Result<Cube> {
        let t = self.time_dim.ok_or_else(|| {
            TempoCubeError::Generic(format!(
                "Time dimension of cube '{}' has already been collapsed",
                self.name
            ))
        })?;

        let time = self.time.subset(indices);
        let aux_coords: Vec<CategoricalCoord> = self
            .aux_coords
            .iter()
            .map(|c| CategoricalCoord {
                name: c.name.clone(),
                labels: indices.iter().map(|&i| c.labels[i].clone()).collect(),
            })
            .collect();

        if indices.len() == 1 {
            let data = self.data.index_axis(Axis(t), indices[0]).to_owned();
            let dim_names = self
                .dim_names
                .iter()
                .enumerate()
                .filter_map(|(i, n)| if i != t { Some(n.clone()) } else { None })
                .collect();
            Ok(Cube::from_parts(
                self.name.clone(),
                data,
                dim_names,
                time,
                aux_coords,
                None,
            ))
        } else {
            let data = self.data.select(Axis(t), indices);
            Ok(Cube::from_parts(
                self.name.clone(),
                data,
                self.dim_names.clone(),
                time,
                aux_coords,
                Some(t),
            ))
        }
    }

    /// Keep the time steps whose numeric point satisfies the predicate.
    pub fn extract_where<F>(&self, predicate: F) -> Result<Cube>
    where
        F: Fn(f64) -> bool,
    {
        let indices: Vec<usize> = self
            .time
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| if predicate(p) { Some(i) } else { None })
            .collect();
        self.select_time(&indices)
    }

    /// Keep the time steps whose label on a categorical coordinate equals
    /// the given value. The coordinate is derived on demand when well-known.
    pub fn extract_where_label(&mut self, coord_name: &str, value: &CategoryValue) -> Result<Cube> {
        self.ensure_categorical(coord_name)?;
        let coord = self
            .aux_coord(coord_name)
            .ok_or_else(|| TempoCubeError::CoordinateNotFound {
                coord: coord_name.to_string(),
            })?;
        let indices: Vec<usize> = coord
            .labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| if label == value { Some(i) } else { None })
            .collect();
        self.select_time(&indices)
    }

    /// Keep the time steps whose (lower, upper) bounds satisfy the predicate.
    pub fn extract_where_bounds<F>(&self, predicate: F) -> Result<Cube>
    where
        F: Fn(f64, f64) -> bool,
    {
        let bounds = self
            .time
            .bounds
            .as_ref()
            .ok_or_else(|| TempoCubeError::MissingBounds {
                coord: self.time.name.clone(),
            })?;
        let indices: Vec<usize> = bounds
            .iter()
            .enumerate()
            .filter_map(|(i, &(lower, upper))| {
                if predicate(lower, upper) {
                    Some(i)
                } else {
                    None
                }
            })
            .collect();
        self.select_time(&indices)
    }
}
