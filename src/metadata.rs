//! Cube inspection and summary output
//!
//! Terminal-facing descriptions of a cube's shape, time coordinate and data
//! range, used by the CLI before and after applying operations.

use crate::cube::Cube;
use crate::errors::Result;

/// Prints shape, dimensions, time coordinate and quick data statistics.
pub fn print_cube_summary(cube: &Cube) -> Result<()> {
    println!("\n Cube: {}", cube.name);
    println!("={}", "=".repeat(cube.name.len() + 7));

    if cube.dim_names.is_empty() {
        println!(" Shape: (scalar)");
    } else {
        let shape: Vec<String> = cube.shape().iter().map(|s| s.to_string()).collect();
        println!(
            " Shape: [{}] = ({})",
            cube.dim_names.join(", "),
            shape.join(" × ")
        );
    }

    describe_time_coordinate(cube)?;

    let valid: Vec<f64> = cube.data.iter().cloned().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        println!("\n⚠ No valid (finite) data in cube");
    } else {
        let min = valid.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = valid.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        println!("\n Data statistics:");
        println!("    Min: {:.4}", min);
        println!("    Max: {:.4}", max);
        println!("    Mean: {:.4}", mean);
        println!(
            "    Valid elements: {} / {}",
            valid.len(),
            cube.data.len()
        );
    }

    Ok(())
}

/// Prints the time coordinate: units, calendar, span and attached
/// categorical coordinates.
pub fn describe_time_coordinate(cube: &Cube) -> Result<()> {
    let time = &cube.time;
    println!("\n Time coordinate '{}':", time.name);
    println!("    Units: {}", time.units.units_string());
    println!("    Calendar: {}", time.units.calendar);
    match cube.time_dim() {
        Some(axis) => println!("    Points: {} (axis {})", time.len(), axis),
        None => println!("    Points: {} (scalar, axis collapsed)", time.len()),
    }

    if let (Some(&first), Some(&last)) = (time.points.first(), time.points.last()) {
        let start = time.units.num2date(first)?;
        let end = time.units.num2date(last)?;
        println!("    Span: {} .. {}", start, end);
    }
    println!(
        "    Bounds: {}",
        if time.bounds.is_some() {
            "present"
        } else {
            "absent"
        }
    );

    if !cube.aux_coords.is_empty() {
        let names: Vec<&str> = cube.aux_coords.iter().map(|c| c.name.as_str()).collect();
        println!("    Categorical coordinates: [{}]", names.join(", "));
    }

    Ok(())
}
