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

//! export jobs and the services that execute them.
//! Submission is fire-and-forget: `ExportService::submit` returns a `JobId` right away and the job
//! goes through `Submitted -> Running -> Succeeded|Failed` on its own. Pixel ceiling and CRS checks
//! are part of job execution, i.e. they show up as failed jobs and not as submission errors.

use std::{fmt, fs::File, io::Write, path::{Path,PathBuf}, sync::{Arc, Mutex, atomic::{AtomicU64,Ordering}}};
use dashmap::DashMap;
use serde::{Serialize,Deserialize};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug,info,warn};
use odin_common::fs::ensure_writable_dir;
use crate::{
    raster::{GeoTransform, Raster, METERS_PER_DEGREE, is_epsg_4326, write_geotiff_rows},
    region::Region,
    errors::{Result,OdinNightlightError,op_failed}
};

/// the descriptor of an export request. The raster itself is passed separately to `ExportService::submit`
#[derive(Debug,Clone,Serialize)]
pub struct ExportJob {
    pub job_name: String,
    pub destination_folder: String,
    pub pixel_scale_m: f64,
    #[serde(rename="region_geometry")]
    pub region: Arc<Region>,
    pub crs_code: String,
    pub max_pixel_count: u64,
}

/// target grid of an export
#[derive(Debug,Clone,Copy,PartialEq,Serialize)]
pub struct OutputGrid {
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
}

impl OutputGrid {
    pub fn pixel_count (&self)->u64 { (self.width as u64).saturating_mul( self.height as u64) }
}

impl ExportJob {
    /// the north-up grid that covers the region bounds with pixels of `pixel_scale_m`.
    /// Fails if the pixel count exceeds `max_pixel_count`
    pub fn output_grid (&self)->Result<OutputGrid> {
        if !is_epsg_4326( &self.crs_code) {
            return Err( OdinNightlightError::UnsupportedCrs( self.crs_code.clone()))
        }
        if !(self.pixel_scale_m > 0.0) {
            return Err( op_failed!("invalid pixel scale {}", self.pixel_scale_m))
        }

        let pixel_size = self.pixel_scale_m / METERS_PER_DEGREE;
        let bb = self.region.bounds();
        let width = (((bb.east - bb.west) / pixel_size).ceil() as usize).max(1);
        let height = (((bb.north - bb.south) / pixel_size).ceil() as usize).max(1);

        let grid = OutputGrid { transform: GeoTransform::north_up( bb.west, bb.north, pixel_size), width, height };
        if grid.pixel_count() > self.max_pixel_count {
            Err( OdinNightlightError::MaxPixelsExceeded { width, height, max_pixels: self.max_pixel_count })
        } else {
            Ok(grid)
        }
    }

    pub fn tif_path (&self, root: &Path)->PathBuf {
        root.join( &self.destination_folder).join( format!("{}.tif", self.job_name))
    }

    pub fn descriptor_path (&self, root: &Path)->PathBuf {
        root.join( &self.destination_folder).join( format!("{}.json", self.job_name))
    }

    pub fn to_json (&self)->Result<String> {
        Ok( serde_json::to_string( self)? )
    }
}

/// nearest neighbour sampling of `raster` for one row of `grid`. Target pixels outside of the source are no-data
pub fn resample_row (raster: &Raster, grid: &OutputGrid, row: usize, out: &mut [f32]) {
    let src_t = raster.transform();
    let (w,h) = (raster.width() as i64, raster.height() as i64);

    for (col, v) in out.iter_mut().enumerate() {
        let (x,y) = grid.transform.pixel_center( col, row);
        let (sc,sr) = src_t.pixel_of( x, y);
        *v = if sc >= 0 && sc < w && sr >= 0 && sr < h {
            raster.data()[(sr as usize, sc as usize)]
        } else {
            f32::NAN
        };
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "job-{}", self.0)
    }
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub enum JobStatus {
    Submitted,
    Running,
    Succeeded(PathBuf),
    Failed(String),
}

impl JobStatus {
    pub fn is_done (&self)->bool {
        matches!( self, JobStatus::Succeeded(_) | JobStatus::Failed(_))
    }
}

/// the asynchronous export collaborator of the pipeline
pub trait ExportService: Send + Sync {
    fn submit (&self, job: ExportJob, raster: Raster)->Result<JobId>;
    fn status (&self, id: JobId)->Option<JobStatus>;
}

/// what we store next to the exported GeoTIFF
#[derive(Serialize)]
struct ExportRecord<'a> {
    job: &'a ExportJob,
    grid: &'a OutputGrid,
    valid_pixels: u64,
}

/// synchronously run an export job, returning the path of the written GeoTIFF
pub fn execute_export (root: &Path, job: &ExportJob, raster: &Raster)->Result<PathBuf> {
    let grid = job.output_grid()?;
    if !is_epsg_4326( raster.crs()) {
        return Err( OdinNightlightError::UnsupportedCrs( raster.crs().to_string()))
    }

    let dir = root.join( &job.destination_folder);
    ensure_writable_dir( &dir)?;

    // the output grid can be much larger than the composite, we never hold it in memory as a whole
    let tif_path = job.tif_path( root);
    let mut valid_pixels: u64 = 0;
    write_geotiff_rows( &tif_path, &grid.transform, &job.crs_code, grid.width, grid.height, |row, out| {
        resample_row( raster, &grid, row, out);
        valid_pixels += out.iter().filter( |v| !v.is_nan()).count() as u64;
    })?;

    let record = ExportRecord { job, grid: &grid, valid_pixels };
    let mut file = File::create( job.descriptor_path( root))?;
    file.write_all( serde_json::to_string_pretty( &record)?.as_bytes())?;

    Ok(tif_path)
}

/// export service that executes jobs as blocking tasks of a tokio runtime and writes results
/// into `<root>/<destination_folder>/`
pub struct LocalExportService {
    root: PathBuf,
    runtime: Handle,
    next_id: AtomicU64,
    jobs: Arc<DashMap<JobId,JobStatus>>,
    tasks: Mutex<Vec<(JobId,JoinHandle<()>)>>,
}

impl LocalExportService {
    /// this has to be called from within a tokio runtime
    pub fn new (root: impl AsRef<Path>)->Result<Self> {
        let runtime = Handle::try_current().map_err( |e| op_failed!("no tokio runtime: {}", e))?;
        Ok( Self::with_runtime( root, runtime) )
    }

    pub fn with_runtime (root: impl AsRef<Path>, runtime: Handle)->Self {
        LocalExportService {
            root: root.as_ref().to_path_buf(),
            runtime,
            next_id: AtomicU64::new(1),
            jobs: Arc::new( DashMap::new()),
            tasks: Mutex::new( Vec::new()),
        }
    }

    /// wait for all jobs submitted so far. This is not used by the pipeline, which never waits
    /// on its exports, but by applications that have to stay alive until jobs are done.
    /// Jobs whose task did not terminate normally are set to `Failed`
    pub async fn join (&self) {
        let tasks: Vec<(JobId,JoinHandle<()>)> = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take( &mut *tasks),
            Err(_) => Vec::new()
        };
        for (id, task) in tasks {
            if let Err(e) = task.await {
                warn!("export task {id} terminated abnormally: {e}");
                self.jobs.insert( id, JobStatus::Failed( format!("export task aborted: {e}")));
            }
        }
    }

    pub fn statuses (&self)->Vec<(JobId,JobStatus)> {
        let mut list: Vec<(JobId,JobStatus)> = self.jobs.iter().map( |e| (*e.key(), e.value().clone())).collect();
        list.sort_by_key( |(id,_)| *id);
        list
    }
}

impl ExportService for LocalExportService {
    fn submit (&self, job: ExportJob, raster: Raster)->Result<JobId> {
        let id = JobId( self.next_id.fetch_add( 1, Ordering::Relaxed));
        self.jobs.insert( id, JobStatus::Submitted);
        info!("submitted export {} as {}", job.job_name, id);

        let jobs = self.jobs.clone();
        let root = self.root.clone();
        let task = self.runtime.spawn_blocking( move || {
            jobs.insert( id, JobStatus::Running);
            let status = match execute_export( &root, &job, &raster) {
                Ok(path) => {
                    info!("{} ({}) succeeded: {:?}", id, job.job_name, path);
                    JobStatus::Succeeded(path)
                }
                Err(e) => {
                    warn!("{} ({}) failed: {}", id, job.job_name, e);
                    JobStatus::Failed( e.to_string())
                }
            };
            jobs.insert( id, status);
        });

        self.tasks.lock().map_err( |_| op_failed!("export task list poisoned"))?.push( (id, task));
        Ok(id)
    }

    fn status (&self, id: JobId)->Option<JobStatus> {
        self.jobs.get( &id).map( |s| s.value().clone())
    }
}

/// export service that only records job descriptors
#[derive(Default)]
pub struct DryRunExportService {
    jobs: Mutex<Vec<ExportJob>>,
}

impl DryRunExportService {
    pub fn new ()->Self { Self::default() }

    pub fn jobs (&self)->Vec<ExportJob> {
        self.jobs.lock().map( |jobs| jobs.clone()).unwrap_or_default()
    }
}

impl ExportService for DryRunExportService {
    fn submit (&self, job: ExportJob, raster: Raster)->Result<JobId> {
        let mut jobs = self.jobs.lock().map_err( |_| op_failed!("dry run job list poisoned"))?;
        debug!("dry run export {} of {}x{} raster", job.job_name, raster.width(), raster.height());
        jobs.push( job);
        Ok( JobId( jobs.len() as u64) )
    }

    fn status (&self, id: JobId)->Option<JobStatus> {
        let n = self.jobs.lock().map( |jobs| jobs.len() as u64).unwrap_or(0);
        if id.0 >= 1 && id.0 <= n { Some(JobStatus::Submitted) } else { None }
    }
}
