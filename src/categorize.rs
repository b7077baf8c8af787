//! Categorical coordinate derivation
//!
//! Helpers that tag every time point of a cube with a label computed from its
//! calendar date: meteorological season, season year, calendar year, month
//! number, or anything a custom rule produces. The label coordinate is
//! attached to the cube in place and persists afterwards.
//!
//! Attaching over an existing name is an error at this layer; callers check
//! for presence first when they want add-if-absent semantics.

use crate::calendar::TimeUnit;
use crate::cube::{CategoricalCoord, CategoryValue, Cube};
use crate::errors::Result;

/// Attach a categorical coordinate computed per time point by `rule`.
pub fn add_categorised_coord<F>(cube: &mut Cube, name: &str, rule: F) -> Result<()>
where
    F: Fn(&TimeUnit, f64) -> Result<CategoryValue>,
{
    let units = cube.time.units.clone();
    let labels: Vec<CategoryValue> = cube
        .time
        .points
        .iter()
        .map(|&point| rule(&units, point))
        .collect::<Result<_>>()?;
    cube.add_aux_coord(CategoricalCoord {
        name: name.to_string(),
        labels,
    })
}

/// Three-month meteorological season for a month number.
fn season_of_month(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "djf",
        3..=5 => "mam",
        6..=8 => "jja",
        _ => "son",
    }
}

/// Attach lowercase season labels (djf, mam, jja, son).
pub fn add_season(cube: &mut Cube, name: &str) -> Result<()> {
    add_categorised_coord(cube, name, |units, point| {
        let date = units.num2date(point)?;
        Ok(CategoryValue::Str(season_of_month(date.month).to_string()))
    })
}

/// Attach the year each season belongs to. December counts into the
/// following year, so Dec 2000 carries season_year 2001 with that DJF.
pub fn add_season_year(cube: &mut Cube, name: &str) -> Result<()> {
    add_categorised_coord(cube, name, |units, point| {
        let date = units.num2date(point)?;
        let year = if date.month == 12 {
            date.year + 1
        } else {
            date.year
        };
        Ok(CategoryValue::Int(year as i64))
    })
}

/// Attach the calendar year of each time point.
pub fn add_year(cube: &mut Cube, name: &str) -> Result<()> {
    add_categorised_coord(cube, name, |units, point| {
        let date = units.num2date(point)?;
        Ok(CategoryValue::Int(date.year as i64))
    })
}

/// Attach the month number (1-12) of each time point.
pub fn add_month_number(cube: &mut Cube, name: &str) -> Result<()> {
    add_categorised_coord(cube, name, |units, point| {
        let date = units.num2date(point)?;
        Ok(CategoryValue::Int(date.month as i64))
    })
}
