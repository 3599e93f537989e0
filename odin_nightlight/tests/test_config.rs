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

use std::path::Path;
use odin_nightlight::{NightlightConfig, expand_year_template, load_config, reducer::Reducer};

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_stock_config() {
    let path = Path::new( env!("CARGO_MANIFEST_DIR")).join("configs/nightlight.ron");
    let config = load_config( &path).unwrap();
    println!("{config:#?}");

    assert_eq!( config, NightlightConfig::default());
    assert_eq!( config.years, vec![2021, 2022]);
    assert_eq!( config.export.scale_m, 500.0);
    assert_eq!( config.export.max_pixels, 10_000_000_000_000);
    assert_eq!( config.export.folder, "GEE_Exports");
}

#[test]
fn test_year_templates() {
    let config = NightlightConfig::default();
    assert_eq!( expand_year_template( "VIIRS_{year}_{year}", 2021), "VIIRS_2021_2021");
    assert_eq!( config.export.job_name( 2022), "VIIRS_2022_SriLanka");
    assert_eq!( config.display.label( 2021), "VIIRS 2021");

    let vis = config.display.vis_params();
    assert_eq!( (vis.min, vis.max), (0.0, 60.0));
    assert_eq!( vis.palette, vec!["black", "yellow", "white"]);
}

#[test]
fn test_reducer_default() {
    let cc: odin_nightlight::CollectionConfig = ron::from_str(
        r#"( id: "NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG", path: "viirs", band: "avg_rad" )"#
    ).unwrap();
    assert_eq!( cc.reducer, Reducer::Mean);

    let cc: odin_nightlight::CollectionConfig = ron::from_str(
        r#"( id: "x", path: "viirs", band: "avg_rad", reducer: Median )"#
    ).unwrap();
    assert_eq!( cc.reducer, Reducer::Median);

    let missing = load_config( Path::new("no/such/nightlight.ron"));
    assert!( missing.is_err());
}
