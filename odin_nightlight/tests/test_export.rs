/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::sync::Arc;
use geo::{MultiPolygon, polygon};
use odin_nightlight::{
    NightlightConfig, OdinNightlightError,
    export::{DryRunExportService, ExportJob, ExportService, JobStatus, LocalExportService, execute_export, resample_row},
    raster::{GeoTransform, Raster, EPSG_4326, METERS_PER_DEGREE},
    region::Region,
};

// run with "cargo test test_xx -- --nocapture"

/// the 1x1 deg square [80,81]x[6,7]
fn region ()->Arc<Region> {
    let poly = polygon![ (x: 80.0, y: 6.0), (x: 81.0, y: 6.0), (x: 81.0, y: 7.0), (x: 80.0, y: 7.0), (x: 80.0, y: 6.0)];
    Arc::new( Region::new( "FAO/GAUL/2015/level0", "ADM0_NAME", "Sri Lanka", MultiPolygon::new( vec![poly])).unwrap())
}

fn job (scale_m: f64)->ExportJob {
    let mut job = NightlightConfig::default().export.job( 2021, region());
    job.pixel_scale_m = scale_m;
    job
}

#[test]
fn test_output_grid() {
    // 1/8 deg pixels
    let grid = job( METERS_PER_DEGREE * 0.125).output_grid().unwrap();
    println!("{grid:?}");
    assert_eq!( (grid.width, grid.height), (8,8));
    assert_eq!( grid.transform, GeoTransform::north_up( 80.0, 7.0, 0.125));
    assert_eq!( grid.pixel_count(), 64);

    // the stock 500m scale
    let grid = job( 500.0).output_grid().unwrap();
    assert_eq!( (grid.width, grid.height), (223,223));
}

#[test]
fn test_output_grid_failures() {
    let mut j = job( 500.0);
    j.max_pixel_count = 223 * 223 - 1;
    match j.output_grid() {
        Err(OdinNightlightError::MaxPixelsExceeded { width, height, max_pixels }) => {
            assert_eq!( (width, height, max_pixels), (223, 223, 223 * 223 - 1));
        }
        other => panic!("unexpected result {other:?}")
    }

    // the pixel count saturates instead of wrapping around
    let res = job( 1e-9).output_grid();
    assert!( matches!( res, Err(OdinNightlightError::MaxPixelsExceeded {..})));

    let mut j = job( 500.0);
    j.crs_code = "EPSG:3857".into();
    assert!( matches!( j.output_grid(), Err(OdinNightlightError::UnsupportedCrs(_))));

    assert!( job( 0.0).output_grid().is_err());
    assert!( job( f64::NAN).output_grid().is_err());
}

#[test]
fn test_resample_row() {
    // 2x2 source with 0.5 deg pixels, target with 0.25 deg pixels that starts half a degree further north
    let src = Raster::new( GeoTransform::north_up( 80.0, 7.0, 0.5), EPSG_4326, ndarray::array![[1.0, 2.0], [3.0, 4.0]]);
    let mut j = job( METERS_PER_DEGREE * 0.25);
    j.region = Arc::new( Region::new( "x", "y", "z", MultiPolygon::new( vec![
        polygon![ (x: 80.0, y: 6.0), (x: 81.0, y: 6.0), (x: 81.0, y: 7.5), (x: 80.0, y: 6.0)]
    ])).unwrap());
    let grid = j.output_grid().unwrap();
    assert_eq!( (grid.width, grid.height), (4,6));

    let mut out = vec![ 0.0f32; grid.width];
    resample_row( &src, &grid, 0, &mut out);
    assert!( out.iter().all( |v| v.is_nan()));

    resample_row( &src, &grid, 2, &mut out);
    assert_eq!( out, vec![1.0, 1.0, 2.0, 2.0]);

    resample_row( &src, &grid, 5, &mut out);
    assert_eq!( out, vec![3.0, 3.0, 4.0, 4.0]);
}

#[test]
fn test_execute_export() {
    let dir = tempfile::tempdir().unwrap();
    let j = job( METERS_PER_DEGREE * 0.25);
    let src = Raster::filled( 2, 2, GeoTransform::north_up( 80.0, 7.0, 0.5), EPSG_4326, 12.5);

    let path = execute_export( dir.path(), &j, &src).unwrap();
    assert_eq!( path, dir.path().join("GEE_Exports/VIIRS_2021_SriLanka.tif"));

    let exported = Raster::open( &path).unwrap();
    assert_eq!( exported.dimensions(), (4,4));
    assert_eq!( exported.valid_count(), 16);
    assert_eq!( exported.get( 3, 3), Some(12.5));

    let descriptor: serde_json::Value = serde_json::from_str( &std::fs::read_to_string( j.descriptor_path( dir.path())).unwrap()).unwrap();
    println!("{descriptor:#}");
    assert_eq!( descriptor["grid"]["width"], 4);
    assert_eq!( descriptor["valid_pixels"], 16);

    let utm = Raster::filled( 2, 2, GeoTransform::north_up( 500000.0, 800000.0, 500.0), "EPSG:32644", 1.0);
    assert!( matches!( execute_export( dir.path(), &j, &utm), Err(OdinNightlightError::UnsupportedCrs(_))));
}

#[test]
fn test_job_descriptor() {
    let json: serde_json::Value = serde_json::from_str( &job( 500.0).to_json().unwrap()).unwrap();
    println!("{json:#}");
    assert_eq!( json["job_name"], "VIIRS_2021_SriLanka");
    assert_eq!( json["destination_folder"], "GEE_Exports");
    assert_eq!( json["pixel_scale_m"], 500.0);
    assert_eq!( json["crs_code"], "EPSG:4326");
    assert_eq!( json["max_pixel_count"], 10_000_000_000_000u64);
    assert_eq!( json["region_geometry"]["type"], "MultiPolygon");
}

#[test]
fn test_dry_run() {
    let service = DryRunExportService::new();
    let raster = Raster::filled( 2, 2, GeoTransform::north_up( 80.0, 7.0, 0.5), EPSG_4326, 1.0);
    let id = service.submit( job( 500.0), raster.clone()).unwrap();

    assert_eq!( service.status( id), Some(JobStatus::Submitted));
    assert_eq!( service.jobs().len(), 1);
    assert_eq!( service.jobs()[0].job_name, "VIIRS_2021_SriLanka");

    let other = DryRunExportService::new();
    other.submit( job( 500.0), raster.clone()).unwrap();
    let unknown = other.submit( job( 500.0), raster).unwrap();
    assert_eq!( service.status( unknown), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_export_fails() {
    let dir = tempfile::tempdir().unwrap();
    let service = LocalExportService::new( dir.path()).unwrap();
    let raster = Raster::filled( 2, 2, GeoTransform::north_up( 80.0, 7.0, 0.5), EPSG_4326, 1.0);

    // a scale that yields more pixels than u64 can count has to end as a failed job, not as a dead task
    let big = job( 1e-9);
    let id = service.submit( big.clone(), raster.clone()).unwrap();
    let ok_id = service.submit( job( METERS_PER_DEGREE * 0.125), raster).unwrap();
    service.join().await;

    let status = service.status( id).unwrap();
    println!("{id}: {status:?}");
    assert!( status.is_done());
    match status {
        JobStatus::Failed(msg) => assert!( msg.contains("exceeds max pixel count")),
        other => panic!("unexpected status {other:?}")
    }
    assert!( !big.tif_path( dir.path()).exists());

    assert!( matches!( service.status( ok_id), Some(JobStatus::Succeeded(_))));
    assert!( service.statuses().iter().all( |(_,s)| s.is_done()));
}
