//! NetCDF I/O: loading variables into cubes and writing result cubes
//!
//! Reading locates the time coordinate among a variable's dimensions (the
//! coordinate variable carrying a "<base> since ..." units attribute, or a
//! dimension named "time"), together with its calendar attribute and bounds
//! variable. Writing produces a new file with the time coordinate, its
//! bounds, any integer-valued categorical coordinates, and the data variable
//! with attributes copied from the source variable.

use crate::calendar::{Calendar, TimeUnit};
use crate::cube::{CategoryValue, Cube, TimeCoordinate};
use crate::errors::{Result, TempoCubeError};
use chrono::Utc;
use ndarray::{Array1, Array2, ArrayD};
use netcdf::{create, AttributeValue, File, Variable};
use std::{fs, path::Path};

/// String attribute of a variable, if present and string-typed.
fn string_attr(var: &Variable, name: &str) -> Option<String> {
    var.attribute(name).and_then(|attr| match attr.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    })
}

/// Locate the time dimension of a variable: the first dimension whose
/// coordinate variable has "<base> since <date>" units, else one named
/// "time".
fn find_time_dimension(file: &File, dim_names: &[String]) -> Result<String> {
    for name in dim_names {
        if let Some(coord_var) = file.variable(name) {
            if let Some(units) = string_attr(&coord_var, "units") {
                if units.contains(" since ") {
                    return Ok(name.clone());
                }
            }
        }
    }
    if dim_names.iter().any(|d| d == "time") {
        return Ok("time".to_string());
    }
    Err(TempoCubeError::CoordinateNotFound {
        coord: "time".to_string(),
    })
}

/// Load a variable and its time coordinate from a NetCDF file into a cube.
pub fn read_cube(file: &File, var_name: &str) -> Result<Cube> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| TempoCubeError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let dim_names: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let data_vec = var.get_values::<f64, _>(..)?;
    println!("🚀 Loading '{}' with shape {:?}", var_name, shape);
    let data = ArrayD::from_shape_vec(shape, data_vec)?;

    let time_name = find_time_dimension(file, &dim_names)?;
    let time_var = file
        .variable(&time_name)
        .ok_or_else(|| TempoCubeError::CoordinateNotFound {
            coord: time_name.clone(),
        })?;

    let units_attr = string_attr(&time_var, "units").ok_or_else(|| {
        TempoCubeError::UnitParse(format!(
            "Time coordinate '{}' has no units attribute",
            time_name
        ))
    })?;
    let calendar = match string_attr(&time_var, "calendar") {
        Some(name) => Calendar::parse(&name)?,
        None => Calendar::Standard,
    };
    let units = TimeUnit::parse(&units_attr, calendar)?;

    let points: Vec<f64> = time_var.get_values::<f64, _>(..)?;

    let bounds = match string_attr(&time_var, "bounds") {
        Some(bounds_name) => match file.variable(&bounds_name) {
            Some(bounds_var) => {
                let flat: Vec<f64> = bounds_var.get_values::<f64, _>(..)?;
                let pairs = Array2::from_shape_vec((points.len(), 2), flat)?;
                Some(
                    pairs
                        .rows()
                        .into_iter()
                        .map(|row| (row[0], row[1]))
                        .collect(),
                )
            }
            None => None,
        },
        None => None,
    };

    let time = TimeCoordinate::new(time_name, points, bounds, units);
    Cube::new(var_name, data, dim_names, time)
}

/// Writer for result cubes, optionally copying variable attributes from the
/// file the input was read from
pub struct CubeWriter<'a> {
    input_file: Option<&'a File>,
    output_path: &'a Path,
}

impl<'a> CubeWriter<'a> {
    /// Writer without a source file; no attributes are copied.
    pub fn new(output_path: &'a Path) -> Self {
        Self {
            input_file: None,
            output_path,
        }
    }

    /// Writer that copies data-variable attributes from `input_file`.
    pub fn with_source(input_file: &'a File, output_path: &'a Path) -> Self {
        Self {
            input_file: Some(input_file),
            output_path,
        }
    }

    /// Write a cube to a new NetCDF file.
    ///
    /// `source_var` names the variable in the source file whose attributes
    /// are copied onto the output data variable.
    pub fn write(&self, cube: &Cube, source_var: Option<&str>) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;

        // Define data dimensions (the time dimension is among them unless
        // the cube was collapsed to scalar time)
        for (dim_name, &dim_len) in cube.dim_names.iter().zip(cube.shape()) {
            file.add_dimension(dim_name, dim_len)?;
        }

        let time_name = cube.time.name.clone();
        let has_time_axis = cube.time_dim().is_some();
        let bounds_name = format!("{}_bnds", time_name);
        if cube.time.bounds.is_some() {
            file.add_dimension("bnds", 2)?;
        }

        // Time coordinate variable, scalar once the axis is collapsed
        {
            let time_dims: Vec<&str> = if has_time_axis {
                vec![time_name.as_str()]
            } else {
                vec![]
            };
            let mut time_var = file.add_variable::<f64>(&time_name, &time_dims)?;
            time_var.put_attribute("units", cube.time.units.units_string())?;
            time_var.put_attribute("calendar", cube.time.units.calendar.as_str())?;
            if cube.time.bounds.is_some() {
                time_var.put_attribute("bounds", bounds_name.clone())?;
            }
            if has_time_axis {
                let points = Array1::from(cube.time.points.clone());
                time_var.put(points.view(), ..)?;
            } else {
                let point = ArrayD::from_shape_vec(vec![], vec![cube.time.points[0]])?;
                time_var.put(point.view(), ..)?;
            }
        }

        if let Some(bounds) = &cube.time.bounds {
            let flat: Vec<f64> = bounds.iter().flat_map(|&(lo, hi)| [lo, hi]).collect();
            let bounds_dims: Vec<&str> = if has_time_axis {
                vec![time_name.as_str(), "bnds"]
            } else {
                vec!["bnds"]
            };
            let mut bounds_var = file.add_variable::<f64>(&bounds_name, &bounds_dims)?;
            if has_time_axis {
                let pairs = Array2::from_shape_vec((bounds.len(), 2), flat)?;
                bounds_var.put(pairs.view(), ..)?;
            } else {
                let pair = Array1::from(flat);
                bounds_var.put(pair.view(), ..)?;
            }
        }

        // Integer categorical coordinates ride along; string-valued ones
        // have no clean NetCDF encoding here
        if has_time_axis {
            for coord in &cube.aux_coords {
                let values: Option<Vec<i64>> = coord
                    .labels
                    .iter()
                    .map(|label| match label {
                        CategoryValue::Int(i) => Some(*i),
                        CategoryValue::Str(_) => None,
                    })
                    .collect();
                match values {
                    Some(values) => {
                        let mut coord_var =
                            file.add_variable::<i64>(&coord.name, &[time_name.as_str()])?;
                        coord_var.put(Array1::from(values).view(), ..)?;
                    }
                    None => {
                        println!("⚠ Skipped string-valued coordinate '{}'", coord.name);
                    }
                }
            }
        }

        // Extract `_FillValue` from the source variable; it must be set
        // before any data is written
        let source = match (self.input_file, source_var) {
            (Some(input), Some(name)) => input.variable(name),
            _ => None,
        };
        let fill_value = source.as_ref().and_then(|var| {
            var.attribute("_FillValue")
                .and_then(|attr| match attr.value().ok()? {
                    AttributeValue::Float(v) => Some(v as f64),
                    AttributeValue::Double(v) => Some(v),
                    AttributeValue::Short(v) => Some(v as f64),
                    _ => None,
                })
        });

        let dim_refs: Vec<&str> = cube.dim_names.iter().map(|s| s.as_str()).collect();
        let mut data_var = file.add_variable::<f64>(&cube.name, &dim_refs)?;

        if let Some(fv) = fill_value {
            data_var.put_attribute("_FillValue", fv)?;
        }

        data_var.put(cube.data.view(), ..)?;

        // Copy remaining attributes excluding _FillValue
        if let Some(var) = &source {
            for attr in var.attributes().filter(|a| a.name() != "_FillValue") {
                match attr.value()? {
                    AttributeValue::Str(val) => {
                        data_var.put_attribute(attr.name(), val)?;
                    }
                    AttributeValue::Strs(vals) => {
                        data_var.put_attribute(attr.name(), vals)?;
                    }
                    AttributeValue::Float(val) => {
                        data_var.put_attribute(attr.name(), val)?;
                    }
                    AttributeValue::Floats(vals) => {
                        data_var.put_attribute(attr.name(), vals)?;
                    }
                    AttributeValue::Double(val) => {
                        data_var.put_attribute(attr.name(), val)?;
                    }
                    AttributeValue::Doubles(vals) => {
                        data_var.put_attribute(attr.name(), vals)?;
                    }
                    AttributeValue::Int(val) => {
                        data_var.put_attribute(attr.name(), val)?;
                    }
                    AttributeValue::Ints(vals) => {
                        data_var.put_attribute(attr.name(), vals)?;
                    }
                    AttributeValue::Short(val) => {
                        data_var.put_attribute(attr.name(), val)?;
                    }
                    AttributeValue::Shorts(vals) => {
                        data_var.put_attribute(attr.name(), vals)?;
                    }
                    _ => {
                        println!("⚠ Skipped unsupported attribute type for '{}'", attr.name());
                    }
                }
            }
        }

        // Add history attribute
        file.add_attribute(
            "history",
            format!("Created by TempoCube on {}", Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }
}

/// Write a cube to a new NetCDF file, copying attributes from the source
/// variable it was computed from.
pub fn write_cube_to_netcdf(
    cube: &Cube,
    source_var: &str,
    input_file: &File,
    output_path: &Path,
) -> Result<()> {
    let writer = CubeWriter::with_source(input_file, output_path);
    writer.write(cube, Some(source_var))
}
