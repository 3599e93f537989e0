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

//! nighttime light (VIIRS DNB) composites for administrative regions.
//!
//! For each target year this runs a linear pipeline over local data:
//! region selection -> collection filter (date range, single band) -> temporal reduction ->
//! clipping to the region -> map display -> export job submission.
//! Yearly runs don't share any mutable state and can be executed concurrently.

use std::{path::{Path,PathBuf}, sync::Arc};
use serde::{Serialize,Deserialize};
use odin_common::ron::load_ron_file;

pub mod errors;
pub use errors::{Result,OdinNightlightError};

pub mod raster;
pub mod region;
pub mod collection;
pub mod reducer;
pub mod clip;
pub mod display;
pub mod export;
pub mod pipeline;

use display::VisParams;
use export::ExportJob;
use reducer::Reducer;
use region::Region;

pub const YEAR_PLACEHOLDER: &str = "{year}";

/// replace all `{year}` placeholders in `template`
pub fn expand_year_template (template: &str, year: i32)->String {
    template.replace( YEAR_PLACEHOLDER, &year.to_string())
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct BoundaryConfig {
    pub id: String,
    pub path: PathBuf,
    pub attribute: String,
    pub value: String,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct CollectionConfig {
    pub id: String,
    pub path: PathBuf, // directory with collection.ron catalog
    pub band: String,
    #[serde(default)]
    pub reducer: Reducer,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct DisplayConfig {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
    pub label_template: String,
    pub zoom: u8,
}

impl DisplayConfig {
    pub fn vis_params (&self)->VisParams {
        VisParams { min: self.min, max: self.max, palette: self.palette.clone() }
    }

    pub fn label (&self, year: i32)->String {
        expand_year_template( &self.label_template, year)
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ExportConfig {
    pub name_template: String,
    pub folder: String,
    pub scale_m: f64,
    pub crs: String,
    pub max_pixels: u64,
}

impl ExportConfig {
    pub fn job_name (&self, year: i32)->String {
        expand_year_template( &self.name_template, year)
    }

    /// the export descriptor for `year`. Only name (and region) depend on input, all other fields are constant
    pub fn job (&self, year: i32, region: Arc<Region>)->ExportJob {
        ExportJob {
            job_name: self.job_name( year),
            destination_folder: self.folder.clone(),
            pixel_scale_m: self.scale_m,
            region,
            crs_code: self.crs.clone(),
            max_pixel_count: self.max_pixels,
        }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct NightlightConfig {
    pub boundaries: BoundaryConfig,
    pub collection: CollectionConfig,
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub years: Vec<i32>,
}

/// mean annual VIIRS radiance for Sri Lanka in 2021 and 2022, exported at 500m in EPSG:4326
impl Default for NightlightConfig {
    fn default ()->Self {
        NightlightConfig {
            boundaries: BoundaryConfig {
                id: "FAO/GAUL/2015/level0".into(),
                path: PathBuf::from("data/gaul_level0.geojson"),
                attribute: "ADM0_NAME".into(),
                value: "Sri Lanka".into(),
            },
            collection: CollectionConfig {
                id: "NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG".into(),
                path: PathBuf::from("data/viirs_dnb_monthly"),
                band: "avg_rad".into(),
                reducer: Reducer::Mean,
            },
            display: DisplayConfig {
                min: 0.0,
                max: 60.0,
                palette: vec!["black".into(), "yellow".into(), "white".into()],
                label_template: "VIIRS {year}".into(),
                zoom: 7,
            },
            export: ExportConfig {
                name_template: "VIIRS_{year}_SriLanka".into(),
                folder: "GEE_Exports".into(),
                scale_m: 500.0,
                crs: raster::EPSG_4326.into(),
                max_pixels: 10_000_000_000_000,
            },
            years: vec![2021, 2022],
        }
    }
}

pub fn load_config<P> (path: P)->Result<NightlightConfig> where P: AsRef<Path> {
    Ok( load_ron_file( path)? )
}
