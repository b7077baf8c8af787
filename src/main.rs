//! Entry point for the TempoCube application.
//! Handles CLI parsing, cube loading, and dispatches time operations in a
//! fixed order: extractions first, then aggregation.

use clap::Parser;
use netcdf::open;

use tempo_cube::cli::Args;
use tempo_cube::cube_io::{read_cube, write_cube_to_netcdf};
use tempo_cube::metadata::{describe_time_coordinate, print_cube_summary};
use tempo_cube::parallel::ParallelConfig;
use tempo_cube::time_ops::{
    annual_mean, extract_month, extract_season, extract_time, seasonal_mean, time_average,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    println!(
        r#"
------------------------------------------------------------------
         _____                          ___      _
        |_   _|__ _ __ ___  _ __   ___ / __\_   _| |__   ___
          | |/ _ \ '_ ` _ \| '_ \ / _ \ /  | | | | '_ \ / _ \
          | |  __/ | | | | | |_) | (_) / /__| |_| | |_) |  __/
          |_|\___|_| |_| |_| .__/ \___/\____/\__,_|_.__/ \___|
                           |_|
            Time preprocessing for NetCDF climate data
------------------------------------------------------------------
"#
    );

    ParallelConfig::new(args.threads).setup_global_pool()?;

    // Open NetCDF file
    let file = open(&args.file)?;
    println!("Successfully opened NetCDF file: {}", args.file.display());

    let mut cube = read_cube(&file, &args.var)?;

    if args.describe {
        describe_time_coordinate(&cube)?;
        return Ok(());
    }

    if let Some(range) = &args.extract_time {
        cube = extract_time(
            &cube,
            range.start.0,
            range.start.1,
            range.start.2,
            range.end.0,
            range.end.1,
            range.end.2,
        )?;
        println!("✅ Extracted time range: {} time steps remain", cube.time.len());
    }

    if let Some(season) = &args.extract_season {
        cube = extract_season(&mut cube, season)?;
        println!(
            "✅ Extracted season {}: {} time steps remain",
            season,
            cube.time.len()
        );
    }

    if let Some(month) = args.extract_month {
        cube = extract_month(&mut cube, month)?;
        println!(
            "✅ Extracted month {}: {} time steps remain",
            month,
            cube.time.len()
        );
    }

    if args.seasonal_mean {
        println!("⚡ Computing seasonal means");
        cube = seasonal_mean(&mut cube)?;
    }

    if args.annual_mean || args.decadal {
        println!(
            "⚡ Computing {} means",
            if args.decadal { "decadal" } else { "annual" }
        );
        cube = annual_mean(&mut cube, args.decadal)?;
    }

    if args.time_average {
        println!("⚡ Computing bounds-weighted time average");
        cube = time_average(&cube)?;
    }

    if let Some(output_path) = &args.output_netcdf {
        write_cube_to_netcdf(&cube, &args.var, &file, output_path)?;
        println!("✅ Saved result to {}", output_path.display());
    } else {
        print_cube_summary(&cube)?;
    }

    Ok(())
}
