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

use geo::{MultiPolygon, polygon};
use odin_nightlight::{
    OdinNightlightError,
    clip::clip,
    raster::{GeoTransform, Raster, EPSG_4326},
    region::Region,
};

// run with "cargo test test_xx -- --nocapture"

/// covers the pixel centers of cols/rows 1..=2 of a 4x4 grid with 0.25deg pixels at (80,7)
fn region ()->Region {
    let poly = polygon![ (x: 80.2, y: 6.8), (x: 80.8, y: 6.8), (x: 80.8, y: 6.2), (x: 80.2, y: 6.2), (x: 80.2, y: 6.8)];
    Region::new( "FAO/GAUL/2015/level0", "ADM0_NAME", "Sri Lanka", MultiPolygon::new( vec![poly])).unwrap()
}

#[test]
fn test_clip() {
    let raster = Raster::filled( 4, 4, GeoTransform::north_up( 80.0, 7.0, 0.25), EPSG_4326, 5.0);
    let clipped = clip( &raster, &region()).unwrap();
    println!("{:?}", clipped.data());

    assert!( clipped.is_same_grid( &raster));
    assert_eq!( clipped.valid_count(), 4);
    assert_eq!( clipped.get( 1, 1), Some(5.0));
    assert_eq!( clipped.get( 2, 2), Some(5.0));
    assert_eq!( clipped.get( 0, 0), None);
    assert_eq!( clipped.get( 3, 1), None);
    assert_eq!( raster.valid_count(), 16); // input is not modified
}

#[test]
fn test_clip_requires_geographic() {
    let raster = Raster::filled( 4, 4, GeoTransform::north_up( 500000.0, 800000.0, 500.0), "EPSG:32644", 5.0);
    assert!( matches!( clip( &raster, &region()), Err(OdinNightlightError::UnsupportedCrs(_))));
}
