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

//! time indexed image collections stored as a directory of single band GeoTIFFs plus a RON catalog:
//! ```ron
//! CollectionCatalog(
//!     id: "NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG",
//!     scenes: [
//!         ( id: "20210101", date: "2021-01-01", bands: { "avg_rad": "20210101_avg_rad.tif" } ),
//!         ...
//!     ]
//! )
//! ```
//! Filtering never modifies the collection, it only creates new (borrowed) views.

use std::{collections::BTreeMap, fmt, path::{Path,PathBuf}};
use chrono::NaiveDate;
use serde::{Serialize,Deserialize};
use tracing::debug;
use odin_common::{datetime::DateRange, ron::load_ron_file};
use crate::{raster::Raster, errors::{Result,OdinNightlightError}};

pub const CATALOG_FILENAME: &str = "collection.ron";

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct Scene {
    pub id: String,
    pub date: NaiveDate,
    pub bands: BTreeMap<String,PathBuf>, // band name -> path relative to collection root
}

impl Scene {
    pub fn has_band (&self, band: &str)->bool { self.bands.contains_key(band) }
}

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct CollectionCatalog {
    pub id: String,
    pub scenes: Vec<Scene>,
}

#[derive(Debug)]
pub struct ImageCollection {
    pub id: String,
    pub root: PathBuf,
    scenes: Vec<Scene>, // sorted by date
}

impl ImageCollection {
    pub fn new (id: impl ToString, root: impl AsRef<Path>, mut scenes: Vec<Scene>)->Self {
        scenes.sort_by( |a,b| a.date.cmp(&b.date).then_with( || a.id.cmp(&b.id)));
        ImageCollection { id: id.to_string(), root: root.as_ref().to_path_buf(), scenes }
    }

    /// open the collection stored in `dir`, which has to contain a `collection.ron` catalog
    pub fn open<P> (dir: P)->Result<Self> where P: AsRef<Path> {
        let dir = dir.as_ref();
        let catalog_path = dir.join( CATALOG_FILENAME);
        if !catalog_path.is_file() {
            return Err( OdinNightlightError::CollectionNotFound( format!("no catalog in {dir:?}")))
        }

        let catalog: CollectionCatalog = load_ron_file( &catalog_path)?;
        debug!("loaded catalog of {} with {} scenes", catalog.id, catalog.scenes.len());
        Ok( ImageCollection::new( catalog.id, dir, catalog.scenes) )
    }

    /// open the collection in `dir` and make sure it is the one identified by `id`
    pub fn open_checked<P> (id: &str, dir: P)->Result<Self> where P: AsRef<Path> {
        let coll = Self::open( dir)?;
        if coll.id == id {
            Ok(coll)
        } else {
            Err( OdinNightlightError::CollectionNotFound( format!("expected {id} but found {}", coll.id)))
        }
    }

    pub fn len (&self)->usize { self.scenes.len() }
    pub fn is_empty (&self)->bool { self.scenes.is_empty() }

    /// unfiltered view of all scenes and bands
    pub fn view (&self)->CollectionView<'_> {
        CollectionView { collection: self, scenes: self.scenes.iter().collect(), band: None }
    }

    pub fn filter_date (&self, range: &DateRange)->CollectionView<'_> {
        self.view().filter_date( range)
    }

    pub fn scene_path (&self, scene: &Scene, band: &str)->Option<PathBuf> {
        scene.bands.get(band).map( |p| self.root.join(p))
    }
}

/// a non-destructive subset of an ImageCollection
#[derive(Clone)]
pub struct CollectionView<'a> {
    collection: &'a ImageCollection,
    scenes: Vec<&'a Scene>,
    band: Option<String>,
}

impl<'a> CollectionView<'a> {
    pub fn len (&self)->usize { self.scenes.len() }
    pub fn is_empty (&self)->bool { self.scenes.is_empty() }

    /// the single band this view was narrowed to (if any)
    pub fn band (&self)->Option<&str> { self.band.as_deref() }

    pub fn dates (&self)->Vec<NaiveDate> {
        self.scenes.iter().map( |s| s.date).collect()
    }

    /// keep scenes with `range.start <= date <= range.end`
    pub fn filter_date (&self, range: &DateRange)->CollectionView<'a> {
        let scenes = self.scenes.iter().copied().filter( |s| range.contains( &s.date)).collect();
        CollectionView { collection: self.collection, scenes, band: self.band.clone() }
    }

    /// narrow to a single band. Scenes that don't have this band are dropped
    pub fn select (&self, band: &str)->CollectionView<'a> {
        let scenes = self.scenes.iter().copied().filter( |s| s.has_band(band)).collect();
        CollectionView { collection: self.collection, scenes, band: Some(band.to_string()) }
    }

    /// the file paths of the selected band, in date order
    pub fn band_paths (&self)->Result<Vec<PathBuf>> {
        let band = self.band.as_deref().ok_or_else( || OdinNightlightError::NoBandSelected( self.collection.id.clone()))?;
        Ok( self.scenes.iter().filter_map( |s| self.collection.scene_path( s, band)).collect() )
    }

    /// lazily load the rasters of the selected band
    pub fn rasters (&self)->Result<impl Iterator<Item=Result<Raster>>> {
        let paths = self.band_paths()?;
        Ok( paths.into_iter().map( |p| Raster::open(p)) )
    }
}

impl<'a> fmt::Display for CollectionView<'a> {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{}[{}]({} scenes)", self.collection.id, self.band.as_deref().unwrap_or("*"), self.scenes.len())
    }
}
