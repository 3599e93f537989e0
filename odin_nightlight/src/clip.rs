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

use tracing::debug;
use crate::{
    raster::{Raster, is_epsg_4326}, region::Region,
    errors::{Result,OdinNightlightError}
};

/// return a copy of `raster` in which all pixels whose center lies outside of `region` are no-data.
/// Region geometries are in lon/lat degrees, hence this requires an EPSG:4326 raster
pub fn clip (raster: &Raster, region: &Region)->Result<Raster> {
    if !is_epsg_4326( raster.crs()) {
        return Err( OdinNightlightError::UnsupportedCrs( raster.crs().to_string()))
    }

    let mut clipped = raster.clone();
    let transform = *raster.transform();
    let mut n_masked = 0;

    for ((row,col), v) in clipped.data_mut().indexed_iter_mut() {
        let (x,y) = transform.pixel_center( col, row);
        if !region.contains( x, y) {
            *v = f32::NAN;
            n_masked += 1;
        }
    }

    debug!("clipped {} to {}: {} of {} pixels masked", raster.crs(), region.name, n_masked, raster.pixel_count());
    Ok(clipped)
}
