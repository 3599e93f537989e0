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

use std::{path::PathBuf, sync::Arc};
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use odin_nightlight::{
    load_config, NightlightConfig,
    collection::ImageCollection,
    region::BoundaryDataset,
    reducer::Reducer,
    display::{MapDisplay, PngMapDisplay},
    export::{DryRunExportService, ExportService, JobStatus, LocalExportService},
    pipeline::NightlightPipeline,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "compute, display and export annual nighttime light composites")]
pub struct Args {
    /// RON config file (stock Sri Lanka VIIRS config if not set)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// years to process (overrides configured years)
    #[arg(short,long, num_args=1..)]
    pub years: Vec<i32>,

    /// temporal reducer (overrides configured reducer)
    #[arg(short,long, value_enum)]
    pub reducer: Option<Reducer>,

    /// root dir for export folders
    #[arg(short,long, default_value="exports")]
    pub output_dir: PathBuf,

    /// dir for rendered map layers
    #[arg(short,long, default_value="display")]
    pub display_dir: PathBuf,

    /// only print export descriptors, don't write any exports
    #[arg(long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config( path)?,
        None => NightlightConfig::default()
    };
    if !args.years.is_empty() { config.years = args.years.clone(); }
    if let Some(reducer) = args.reducer { config.collection.reducer = reducer; }

    let config = Arc::new( config);
    let boundaries = Arc::new( BoundaryDataset::open( &config.boundaries.id, &config.boundaries.path)?);
    let collection = Arc::new( ImageCollection::open_checked( &config.collection.id, &config.collection.path)?);
    let display: Arc<dyn MapDisplay> = Arc::new( PngMapDisplay::new( &args.display_dir)?);

    let (local, dry_run) = if args.dry_run {
        (None, Some( Arc::new( DryRunExportService::new())))
    } else {
        (Some( Arc::new( LocalExportService::new( &args.output_dir)?)), None)
    };
    let exporter: Arc<dyn ExportService> = match (&local, &dry_run) {
        (Some(svc), _) => svc.clone() as Arc<dyn ExportService>,
        (_, Some(svc)) => svc.clone() as Arc<dyn ExportService>,
        _ => return Err( anyhow!("no export service"))
    };

    let mut tasks = Vec::with_capacity( config.years.len());
    for year in config.years.iter().copied() {
        let (config, boundaries, collection) = (config.clone(), boundaries.clone(), collection.clone());
        let (display, exporter) = (display.clone(), exporter.clone());

        let task = tokio::task::spawn_blocking( move || {
            NightlightPipeline::new( &config, &boundaries, &collection, display.as_ref(), exporter.as_ref()).run_year( year)
        });
        tasks.push( (year, task));
    }

    let mut n_failed = 0;
    for (year, task) in tasks {
        match task.await {
            Ok(Ok(run)) => info!("{}: {} -> {}/{} ({})", year, run.region.name, run.job.destination_folder, run.job.job_name, run.job_id),
            Ok(Err(e)) => { error!("{} failed: {}", year, e); n_failed += 1; }
            Err(e) => { error!("{} aborted: {}", year, e); n_failed += 1; }
        }
    }

    if let Some(svc) = &local {
        svc.join().await;
        for (id, status) in svc.statuses() {
            match status {
                JobStatus::Succeeded(path) => println!("{id}: {path:?}"),
                JobStatus::Failed(msg) => { println!("{id}: FAILED {msg}"); n_failed += 1; }
                other => { println!("{id}: not finished ({other:?})"); n_failed += 1; }
            }
        }
    }

    if let Some(svc) = &dry_run {
        for job in svc.jobs() {
            println!("{}", job.to_json()?);
        }
    }

    if n_failed > 0 { Err( anyhow!("{n_failed} failed runs or exports")) } else { Ok(()) }
}
