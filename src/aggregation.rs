//! Reduction engine: collapse the time axis or aggregate by categorical keys
//!
//! This module provides the two reductions the time operations are built on:
//! collapsing the whole time dimension to one value per remaining coordinate
//! (optionally weighted), and grouping time steps by categorical coordinates
//! with one reduced value per group. Non-finite values are skipped; a lane
//! with no valid values yields NaN for mean/min/max and 0 for sum.

use crate::cube::{CategoricalCoord, CategoryValue, Cube, TimeCoordinate};
use crate::errors::{Result, TempoCubeError};
use ndarray::{concatenate, ArrayD, Axis, Zip};
use std::collections::HashMap;

/// Supported reduction operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorKind {
    Mean,
    Sum,
    Min,
    Max,
}

impl AggregatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregatorKind::Mean => "mean",
            AggregatorKind::Sum => "sum",
            AggregatorKind::Min => "minimum",
            AggregatorKind::Max => "maximum",
        }
    }
}

/// Reduce one lane of values, skipping NaN and infinities.
fn reduce_values<I>(kind: AggregatorKind, values: I) -> f64
where
    I: Iterator<Item = f64>,
{
    match kind {
        AggregatorKind::Mean => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for v in values {
                if v.is_finite() {
                    sum += v;
                    count += 1;
                }
            }
            if count > 0 {
                sum / count as f64
            } else {
                f64::NAN
            }
        }
        AggregatorKind::Sum => values.filter(|v| v.is_finite()).sum(),
        AggregatorKind::Min => {
            let min = values
                .filter(|v| v.is_finite())
                .fold(f64::INFINITY, f64::min);
            if min == f64::INFINITY {
                f64::NAN
            } else {
                min
            }
        }
        AggregatorKind::Max => {
            let max = values
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max);
            if max == f64::NEG_INFINITY {
                f64::NAN
            } else {
                max
            }
        }
    }
}

/// Collapse the entire time axis to a single value per remaining coordinate.
///
/// Weights must match the data shape and are only meaningful for `Mean`,
/// where each lane reduces to sum(w*x)/sum(w) over the finite values. The
/// result has the time axis removed; its time coordinate keeps one point (the
/// mean of the input points) with bounds spanning the input's full extent.
pub fn collapse_time(
    cube: &Cube,
    kind: AggregatorKind,
    weights: Option<&ArrayD<f64>>,
) -> Result<Cube> {
    let t = cube.time_dim().ok_or_else(|| {
        TempoCubeError::AggregationError(format!(
            "Time dimension of cube '{}' has already been collapsed",
            cube.name
        ))
    })?;
    if cube.time.is_empty() {
        return Err(TempoCubeError::AggregationError(
            "Cannot collapse an empty time coordinate".to_string(),
        ));
    }

    let axis = Axis(t);
    let reduced: ArrayD<f64> = match weights {
        Some(w) => {
            if w.shape() != cube.data.shape() {
                return Err(TempoCubeError::AggregationError(format!(
                    "Weights shape {:?} does not match data shape {:?}",
                    w.shape(),
                    cube.data.shape()
                )));
            }
            if kind != AggregatorKind::Mean {
                return Err(TempoCubeError::AggregationError(format!(
                    "Weights are not supported for {}",
                    kind.as_str()
                )));
            }
            Zip::from(cube.data.lanes(axis))
                .and(w.lanes(axis))
                .par_map_collect(|lane, weight_lane| {
                    let mut weighted_sum = 0.0;
                    let mut weight_total = 0.0;
                    for (&v, &wv) in lane.iter().zip(weight_lane.iter()) {
                        if v.is_finite() {
                            weighted_sum += wv * v;
                            weight_total += wv;
                        }
                    }
                    if weight_total > 0.0 {
                        weighted_sum / weight_total
                    } else {
                        f64::NAN
                    }
                })
        }
        None => Zip::from(cube.data.lanes(axis))
            .par_map_collect(|lane| reduce_values(kind, lane.iter().cloned())),
    };

    let points = &cube.time.points;
    let collapsed_point = points.iter().sum::<f64>() / points.len() as f64;
    let (lower, upper) = overall_extent(&cube.time);
    let time = TimeCoordinate::new(
        cube.time.name.clone(),
        vec![collapsed_point],
        Some(vec![(lower, upper)]),
        cube.time.units.clone(),
    );

    let dim_names: Vec<String> = cube
        .dim_names
        .iter()
        .enumerate()
        .filter_map(|(i, n)| if i != t { Some(n.clone()) } else { None })
        .collect();

    let name = format!("{}_{}_over_{}", cube.name, kind.as_str(), cube.time.name);
    Ok(Cube::from_parts(name, reduced, dim_names, time, Vec::new(), None))
}

/// Aggregate by one or more categorical coordinates.
///
/// Time steps sharing the same tuple of labels form a group; each group is
/// reduced along the time axis and the results are stacked back in order of
/// first appearance. Group time points are the member means and group bounds
/// span the members. Missing grouping coordinates are derived on demand when
/// well-known. Always unweighted.
pub fn aggregated_by(cube: &mut Cube, coord_names: &[&str], kind: AggregatorKind) -> Result<Cube> {
    let t = cube.time_dim().ok_or_else(|| {
        TempoCubeError::AggregationError(format!(
            "Time dimension of cube '{}' has already been collapsed",
            cube.name
        ))
    })?;
    if cube.time.is_empty() {
        return Err(TempoCubeError::AggregationError(
            "Cannot aggregate an empty time coordinate".to_string(),
        ));
    }
    for name in coord_names {
        cube.ensure_categorical(name)?;
    }
    let label_sets: Vec<Vec<CategoryValue>> = coord_names
        .iter()
        .map(|name| {
            cube.aux_coord(name)
                .map(|c| c.labels.clone())
                .ok_or_else(|| TempoCubeError::CoordinateNotFound {
                    coord: name.to_string(),
                })
        })
        .collect::<Result<_>>()?;

    // Group membership in order of first appearance along the time axis
    let mut group_of: HashMap<Vec<CategoryValue>, usize> = HashMap::new();
    let mut group_keys: Vec<Vec<CategoryValue>> = Vec::new();
    let mut group_members: Vec<Vec<usize>> = Vec::new();
    for i in 0..cube.time.len() {
        let key: Vec<CategoryValue> = label_sets.iter().map(|labels| labels[i].clone()).collect();
        let group = *group_of.entry(key.clone()).or_insert_with(|| {
            group_keys.push(key);
            group_members.push(Vec::new());
            group_keys.len() - 1
        });
        group_members[group].push(i);
    }

    let axis = Axis(t);
    let mut group_results: Vec<ArrayD<f64>> = Vec::with_capacity(group_members.len());
    let mut points: Vec<f64> = Vec::with_capacity(group_members.len());
    let mut bounds: Vec<(f64, f64)> = Vec::with_capacity(group_members.len());
    for members in &group_members {
        let sub = cube.data.select(axis, members);
        let reduced = Zip::from(sub.lanes(axis))
            .par_map_collect(|lane| reduce_values(kind, lane.iter().cloned()))
            .insert_axis(axis);
        group_results.push(reduced);

        let member_points: Vec<f64> = members.iter().map(|&i| cube.time.points[i]).collect();
        points.push(member_points.iter().sum::<f64>() / member_points.len() as f64);
        bounds.push(member_extent(&cube.time, members));
    }

    let views: Vec<_> = group_results.iter().map(|a| a.view()).collect();
    let data = concatenate(axis, &views)?;

    let aux_coords: Vec<CategoricalCoord> = coord_names
        .iter()
        .enumerate()
        .map(|(ci, name)| CategoricalCoord {
            name: name.to_string(),
            labels: group_keys.iter().map(|key| key[ci].clone()).collect(),
        })
        .collect();

    let time = TimeCoordinate::new(
        cube.time.name.clone(),
        points,
        Some(bounds),
        cube.time.units.clone(),
    );
    Ok(Cube::from_parts(
        cube.name.clone(),
        data,
        cube.dim_names.clone(),
        time,
        aux_coords,
        Some(t),
    ))
}

/// Full (lower, upper) extent of a time coordinate, from bounds when present
/// and from the points otherwise.
fn overall_extent(time: &TimeCoordinate) -> (f64, f64) {
    match &time.bounds {
        Some(bounds) => (
            bounds.iter().map(|b| b.0).fold(f64::INFINITY, f64::min),
            bounds.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max),
        ),
        None => (
            time.points.iter().cloned().fold(f64::INFINITY, f64::min),
            time.points
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max),
        ),
    }
}

/// Extent of the listed member indices of a time coordinate.
fn member_extent(time: &TimeCoordinate, members: &[usize]) -> (f64, f64) {
    match &time.bounds {
        Some(bounds) => (
            members
                .iter()
                .map(|&i| bounds[i].0)
                .fold(f64::INFINITY, f64::min),
            members
                .iter()
                .map(|&i| bounds[i].1)
                .fold(f64::NEG_INFINITY, f64::max),
        ),
        None => (
            members
                .iter()
                .map(|&i| time.points[i])
                .fold(f64::INFINITY, f64::min),
            members
                .iter()
                .map(|&i| time.points[i])
                .fold(f64::NEG_INFINITY, f64::max),
        ),
    }
}
