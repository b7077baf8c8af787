use ndarray::{Array2, Array3};
use netcdf::{create, open};
use tempfile::tempdir;
use tempo_cube::calendar::Calendar;
use tempo_cube::cube_io::{read_cube, write_cube_to_netcdf};
use tempo_cube::time_ops::{annual_mean, extract_season, time_average};

const HOURS_PER_MONTH: f64 = 720.0;

/// Writes a NetCDF file with two years of monthly data on a 360-day
/// calendar: temperature(time, lat, lon) with time bounds, where every
/// element of month `t` has the value `t`.
fn write_test_file(path: &std::path::Path) {
    let n_time = 24;
    let n_lat = 2;
    let n_lon = 3;

    let mut file = create(path).expect("Failed to create NetCDF file");

    file.add_dimension("time", n_time)
        .expect("Failed to add dimension time");
    file.add_dimension("bnds", 2)
        .expect("Failed to add dimension bnds");
    file.add_dimension("lat", n_lat)
        .expect("Failed to add dimension lat");
    file.add_dimension("lon", n_lon)
        .expect("Failed to add dimension lon");

    {
        let mut time_var = file
            .add_variable::<f64>("time", &["time"])
            .expect("Failed to add time variable");
        time_var
            .put_attribute("units", "hours since 2000-01-01")
            .expect("Failed to set units");
        time_var
            .put_attribute("calendar", "360_day")
            .expect("Failed to set calendar");
        time_var
            .put_attribute("bounds", "time_bnds")
            .expect("Failed to set bounds attribute");
        let points: Vec<f64> = (0..n_time)
            .map(|i| i as f64 * HOURS_PER_MONTH + HOURS_PER_MONTH / 2.0)
            .collect();
        time_var
            .put(ndarray::Array1::from(points).view(), ..)
            .expect("Failed to write time points");
    }

    {
        let mut bounds_var = file
            .add_variable::<f64>("time_bnds", &["time", "bnds"])
            .expect("Failed to add bounds variable");
        let flat: Vec<f64> = (0..n_time)
            .flat_map(|i| {
                [
                    i as f64 * HOURS_PER_MONTH,
                    (i + 1) as f64 * HOURS_PER_MONTH,
                ]
            })
            .collect();
        let pairs = Array2::from_shape_vec((n_time, 2), flat).expect("Failed to shape bounds");
        bounds_var
            .put(pairs.view(), ..)
            .expect("Failed to write bounds");
    }

    {
        let mut var = file
            .add_variable::<f64>("temperature", &["time", "lat", "lon"])
            .expect("Failed to add temperature variable");
        var.put_attribute("units", "K").expect("Failed to set units");
        var.put_attribute("long_name", "Near-surface air temperature")
            .expect("Failed to set long_name");
        let values: Vec<f64> = (0..n_time)
            .flat_map(|t| std::iter::repeat(t as f64).take(n_lat * n_lon))
            .collect();
        let data = Array3::from_shape_vec((n_time, n_lat, n_lon), values)
            .expect("Failed to shape temperature data");
        var.put(data.view(), ..).expect("Failed to write temperature");
    }
}

#[test]
fn test_read_cube_from_netcdf() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test_data.nc");
    write_test_file(&file_path);

    let file = open(&file_path).expect("Failed to open NetCDF file");
    let cube = read_cube(&file, "temperature").expect("Failed to read cube");

    assert_eq!(cube.shape(), &[24, 2, 3]);
    assert_eq!(cube.dim_names, vec!["time", "lat", "lon"]);
    assert_eq!(cube.time_dim(), Some(0));
    assert_eq!(cube.time.len(), 24);
    assert_eq!(cube.time.points[0], 360.0);
    assert_eq!(cube.time.units.calendar, Calendar::Day360);

    let bounds = cube.time.bounds.as_ref().expect("Bounds missing");
    assert_eq!(bounds[0], (0.0, 720.0));
    assert_eq!(bounds[23], (23.0 * 720.0, 24.0 * 720.0));

    // Reading a missing variable fails cleanly
    assert!(read_cube(&file, "pressure").is_err());
}

#[test]
fn test_time_average_roundtrip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("test_data.nc");
    let output_path = temp_dir.path().join("test_mean.nc");
    write_test_file(&input_path);

    let file = open(&input_path).expect("Failed to open NetCDF file");
    let cube = read_cube(&file, "temperature").expect("Failed to read cube");

    // Uniform monthly weights: the weighted mean of 0..=23 is 11.5
    let mean = time_average(&cube).expect("Failed to compute time average");
    assert_eq!(mean.shape(), &[2, 3]);
    assert!(mean.data.iter().all(|&v| v == 11.5));

    write_cube_to_netcdf(&mean, "temperature", &file, &output_path)
        .expect("Failed to write result");

    let output = open(&output_path).expect("Failed to reopen output");
    let var = output
        .variable("temperature_mean_over_time")
        .expect("Result variable missing");
    assert_eq!(var.dimensions().len(), 2);
    assert_eq!(var.dimensions()[0].name(), "lat");
    assert_eq!(var.dimensions()[1].name(), "lon");
    let values: Vec<f64> = var.get_values::<f64, _>(..).expect("Failed to read result");
    assert!(values.iter().all(|&v| v == 11.5));

    // Attributes were copied from the source variable
    let units = var.attribute("units").expect("units attribute missing");
    match units.value().expect("Failed to read units") {
        netcdf::AttributeValue::Str(s) => assert_eq!(s, "K"),
        other => panic!("Unexpected units attribute type: {:?}", other),
    }

    // The collapsed time coordinate is written as a scalar with full-extent bounds
    let time_var = output.variable("time").expect("time variable missing");
    assert_eq!(time_var.dimensions().len(), 0);
    let bnds_var = output.variable("time_bnds").expect("time_bnds missing");
    let bnds: Vec<f64> = bnds_var.get_values::<f64, _>(..).expect("Failed to read bounds");
    assert_eq!(bnds, vec![0.0, 24.0 * 720.0]);
}

#[test]
fn test_extract_and_write_roundtrip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("test_data.nc");
    let output_path = temp_dir.path().join("test_djf.nc");
    write_test_file(&input_path);

    let file = open(&input_path).expect("Failed to open NetCDF file");
    let mut cube = read_cube(&file, "temperature").expect("Failed to read cube");

    // Jan/Feb/Dec of both years
    let winter = extract_season(&mut cube, "DJF").expect("Failed to extract season");
    assert_eq!(winter.time.len(), 6);

    write_cube_to_netcdf(&winter, "temperature", &file, &output_path)
        .expect("Failed to write extraction");

    let output = open(&output_path).expect("Failed to reopen output");
    let reread = read_cube(&output, "temperature").expect("Failed to re-read cube");

    assert_eq!(reread.shape(), winter.shape());
    assert_eq!(reread.time.points, winter.time.points);
    assert_eq!(reread.time.bounds, winter.time.bounds);
    assert_eq!(reread.time.units, winter.time.units);
    assert_eq!(reread.data, winter.data);

    // The integer-valued season_year coordinate rides along in the file
    let season_year = output
        .variable("season_year")
        .expect("season_year variable missing");
    let years: Vec<i64> = season_year
        .get_values::<i64, _>(..)
        .expect("Failed to read season_year");
    assert_eq!(years, vec![2000, 2000, 2001, 2001, 2001, 2002]);
}

#[test]
fn test_annual_mean_roundtrip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("test_data.nc");
    let output_path = temp_dir.path().join("test_annual.nc");
    write_test_file(&input_path);

    let file = open(&input_path).expect("Failed to open NetCDF file");
    let mut cube = read_cube(&file, "temperature").expect("Failed to read cube");

    let annual = annual_mean(&mut cube, false).expect("Failed to compute annual mean");
    assert_eq!(annual.time.len(), 2);
    assert!(annual.data.index_axis(ndarray::Axis(0), 0).iter().all(|&v| v == 5.5));
    assert!(annual.data.index_axis(ndarray::Axis(0), 1).iter().all(|&v| v == 17.5));

    write_cube_to_netcdf(&annual, "temperature", &file, &output_path)
        .expect("Failed to write result");

    let output = open(&output_path).expect("Failed to reopen output");
    let year_var = output.variable("year").expect("year variable missing");
    let years: Vec<i64> = year_var.get_values::<i64, _>(..).expect("Failed to read years");
    assert_eq!(years, vec![2000, 2001]);
}
