//! Time operations on cubes
//!
//! Selecting data subsets by time range, season or month, and constructing
//! time-weighted, seasonal, annual and decadal averages.
//!
//! Some operations attach derived categorical coordinates (season labels,
//! years, decades) to the input cube as a side effect; those coordinates
//! persist on the cube afterwards. Functions taking `&Cube` never mutate.

use crate::aggregation::{aggregated_by, collapse_time, AggregatorKind};
use crate::calendar::{CalDate, Calendar};
use crate::categorize;
use crate::cube::{CategoryValue, Cube};
use crate::errors::{Result, TempoCubeError};
use ndarray::{ArrayD, IxDyn};

/// Bound span of one complete aggregated season in native time units: three
/// 30-day months expressed in hours. Only correct for hour-based units under
/// the 360-day calendar; other calendars produce seasons of 89-92 days and
/// their incomplete-season filtering will drop everything.
const THREE_MONTH_SPAN: f64 = 2160.0;

/// Extract the time steps strictly between two calendar instants.
///
/// The boundaries are EXCLUDED: a time point exactly equal to the start or
/// end instant is not part of the result. Under the 360-day calendar, day
/// arguments above 30 are clamped to 30 before the range is computed, since
/// no month has a day 31 there.
///
/// If the selection leaves a single point and the underlying selection
/// primitive therefore drops the time axis, but the time coordinate itself
/// is unchanged, the original cube is returned as-is instead of the
/// rank-reduced slice.
pub fn extract_time(
    cube: &Cube,
    start_year: i32,
    start_month: u32,
    start_day: u32,
    end_year: i32,
    end_month: u32,
    end_day: u32,
) -> Result<Cube> {
    let units = &cube.time.units;
    let (start_day, end_day) = if units.calendar == Calendar::Day360 {
        (start_day.min(30), end_day.min(30))
    } else {
        (start_day, end_day)
    };

    let t_1 = units.date2num(&CalDate::new(start_year, start_month, start_day))?;
    let t_2 = units.date2num(&CalDate::new(end_year, end_month, end_day))?;

    let slice = cube.extract_where(|t| t_1 < t && t < t_2)?;

    // A lone selected point loses its time axis; if the coordinate did not
    // actually change, hand back the input untouched.
    if slice.ndim() != cube.ndim() && slice.time == cube.time {
        return Ok(cube.clone());
    }

    Ok(slice)
}

/// Extract only the data belonging to a season (DJF, MAM, JJA or SON,
/// case-insensitive).
///
/// Derives the `clim_season` and `season_year` coordinates on the input if
/// they are not yet present. The season code is not validated; an unknown
/// code simply selects no time steps.
pub fn extract_season(cube: &mut Cube, season: &str) -> Result<Cube> {
    if !cube.has_aux_coord("clim_season") {
        categorize::add_season(cube, "clim_season")?;
    }
    if !cube.has_aux_coord("season_year") {
        categorize::add_season_year(cube, "season_year")?;
    }
    cube.extract_where_label("clim_season", &CategoryValue::Str(season.to_lowercase()))
}

/// Extract only the data belonging to one month, given as a number from
/// 1 to 12.
pub fn extract_month(cube: &mut Cube, month: u32) -> Result<Cube> {
    if !(1..=12).contains(&month) {
        return Err(TempoCubeError::InvalidMonth { month });
    }
    cube.extract_where_label("month_number", &CategoryValue::Int(month as i64))
}

/// Compute the weighting of the time axis.
///
/// Each element's weight is the length of its time interval, `upper - lower`
/// from the coordinate bounds, broadcast to the full data shape. Weights are
/// non-negative; reversed bounds contribute their absolute span.
pub fn get_time_weights(cube: &Cube) -> Result<ArrayD<f64>> {
    let t = cube.time_dim().ok_or_else(|| {
        TempoCubeError::Generic(format!(
            "Time dimension of cube '{}' has already been collapsed",
            cube.name
        ))
    })?;
    let bounds = cube
        .time
        .bounds
        .as_ref()
        .ok_or_else(|| TempoCubeError::MissingBounds {
            coord: cube.time.name.clone(),
        })?;

    let thickness: Vec<f64> = bounds.iter().map(|&(lower, upper)| (upper - lower).abs()).collect();

    // The weights need to match the dimensionality of the cube: singleton
    // axes everywhere except the time axis, then broadcast against ones.
    let mut shape = vec![1; cube.ndim()];
    shape[t] = thickness.len();
    let thickness = ndarray::Array::from_vec(thickness).into_shape(IxDyn(&shape))?;
    let ones = ArrayD::<f64>::ones(cube.data.raw_dim());
    Ok(&ones * &thickness)
}

/// Compute the time average over the entire cube, weighted by the bounds of
/// the time coordinate.
pub fn time_average(cube: &Cube) -> Result<Cube> {
    let weights = get_time_weights(cube)?;
    collapse_time(cube, AggregatorKind::Mean, Some(&weights))
}

/// Compute means over three-month seasons.
///
/// Groups time steps by (season, season year) and takes the unweighted mean
/// of each group, so uneven sub-periods inside a season count equally.
/// Incomplete seasons at the edges of the time axis are dropped: only groups
/// whose bound span is exactly three months survive.
pub fn seasonal_mean(cube: &mut Cube) -> Result<Cube> {
    if !cube.has_aux_coord("clim_season") {
        categorize::add_season(cube, "clim_season")?;
    }
    if !cube.has_aux_coord("season_year") {
        categorize::add_season_year(cube, "season_year")?;
    }
    let aggregated = aggregated_by(cube, &["clim_season", "season_year"], AggregatorKind::Mean)?;

    // Bound spans are exact whole-hour values, so this is an exact match.
    aggregated.extract_where_bounds(|lower, upper| upper - lower == THREE_MONTH_SPAN)
}

/// Compute annual or decadal means.
///
/// Groups by calendar year, or by decade (`year - year % 10`) when `decadal`
/// is set. The mean is unweighted: uneven time periods inside a year or
/// decade are treated equally.
pub fn annual_mean(cube: &mut Cube, decadal: bool) -> Result<Cube> {
    if decadal {
        if !cube.has_aux_coord("decade") {
            categorize::add_categorised_coord(cube, "decade", |units, point| {
                let date = units.num2date(point)?;
                Ok(CategoryValue::Int(
                    (date.year - date.year.rem_euclid(10)) as i64,
                ))
            })?;
        }
        return aggregated_by(cube, &["decade"], AggregatorKind::Mean);
    }

    aggregated_by(cube, &["year"], AggregatorKind::Mean)
}
