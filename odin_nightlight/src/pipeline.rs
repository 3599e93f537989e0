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

//! the per-year composite pipeline. Each step is a separate function so that it can be tested in isolation,
//! [`NightlightPipeline::run_year`] just chains them and hands the result to the display and export collaborators.

use std::sync::Arc;
use tracing::{debug,info};
use odin_common::datetime::DateRange;
use crate::{
    NightlightConfig,
    collection::{CollectionView, ImageCollection},
    region::{BoundaryDataset, Region},
    raster::Raster,
    clip::clip,
    display::MapDisplay,
    export::{ExportJob, ExportService, JobId},
    errors::{Result,OdinNightlightError}
};

/// what a single year run did. The region is shared with the export job
#[derive(Debug,Clone)]
pub struct YearRun {
    pub year: i32,
    pub date_range: DateRange,
    pub band: String,
    pub n_scenes: usize,
    pub region: Arc<Region>,
    pub job: ExportJob,
    pub job_id: JobId,
}

/// the inclusive calendar year [YYYY-01-01, YYYY-12-31]
pub fn year_range (year: i32)->Result<DateRange> {
    DateRange::for_year( year).ok_or_else( || OdinNightlightError::InvalidDateRange( format!("year {year}")))
}

pub fn select_region (config: &NightlightConfig, boundaries: &BoundaryDataset)->Result<Arc<Region>> {
    if boundaries.id != config.boundaries.id {
        return Err( OdinNightlightError::NoMatchingRegion( format!("boundary dataset {} is not {}", boundaries.id, config.boundaries.id)))
    }
    boundaries.select( &config.boundaries.attribute, &config.boundaries.value)
}

pub fn filter_collection<'a> (config: &NightlightConfig, collection: &'a ImageCollection, range: &DateRange)->Result<CollectionView<'a>> {
    if collection.id != config.collection.id {
        return Err( OdinNightlightError::CollectionNotFound( format!("expected {} but got {}", config.collection.id, collection.id)))
    }
    Ok( collection.filter_date( range).select( &config.collection.band) )
}

/// reduce `view` and clip the composite to `region`
pub fn composite (config: &NightlightConfig, view: &CollectionView, region: &Region)->Result<Raster> {
    let reduced = config.collection.reducer.reduce( view)?;
    clip( &reduced, region)
}

/// the pipeline for one configuration and one set of inputs and collaborators. This does not own
/// anything, it can be created per year
pub struct NightlightPipeline<'a> {
    config: &'a NightlightConfig,
    boundaries: &'a BoundaryDataset,
    collection: &'a ImageCollection,
    display: &'a dyn MapDisplay,
    exporter: &'a dyn ExportService,
}

impl<'a> NightlightPipeline<'a> {
    pub fn new (config: &'a NightlightConfig, boundaries: &'a BoundaryDataset, collection: &'a ImageCollection,
                display: &'a dyn MapDisplay, exporter: &'a dyn ExportService)->Self {
        NightlightPipeline { config, boundaries, collection, display, exporter }
    }

    /// compute the clipped composite for `year`, show it and submit its export.
    /// This returns as soon as the export is submitted, it does not wait for its completion
    pub fn run_year (&self, year: i32)->Result<YearRun> {
        let config = self.config;
        let date_range = year_range( year)?;
        let region = select_region( config, self.boundaries)?;

        let view = filter_collection( config, self.collection, &date_range)?;
        let n_scenes = view.len();
        debug!("{} scenes of {}: {:?}", year, view, view.dates());
        let raster = composite( config, &view, &region)?;

        self.display.center_object( &region, config.display.zoom);
        self.display.add_layer( &raster, &config.display.vis_params(), &config.display.label( year))?;

        let job = config.export.job( year, region.clone());
        let job_id = self.exporter.submit( job.clone(), raster)?;
        info!("{} composite of {} scenes ({}) submitted as {}", year, n_scenes, date_range, job_id);

        Ok( YearRun { year, date_range, band: config.collection.band.clone(), n_scenes, region, job, job_id } )
    }

    /// run all configured years sequentially, stopping at the first failure
    pub fn run_all (&self)->Result<Vec<YearRun>> {
        self.config.years.iter().map( |year| self.run_year( *year)).collect()
    }
}
