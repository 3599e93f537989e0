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

//! administrative boundary datasets and the regions we select from them

use std::{path::Path, sync::Arc};
use geo::{BoundingRect, Centroid, Contains, Geometry, MultiPolygon, Point, Rect};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use tracing::{debug,warn};
use odin_common::{BoundingBox, fs::filepath_contents_as_string};
use crate::errors::{Result,OdinNightlightError};

/// a named boundary geometry. Regions are immutable and shared as `Arc<Region>` between the
/// pipeline stages that need them (display, clip and export)
#[derive(Debug,Clone)]
pub struct Region {
    pub dataset_id: String,
    pub attribute: String,
    pub name: String,
    geometry: MultiPolygon<f64>,
    bbox: Rect<f64>,
}

impl Region {
    pub fn new (dataset_id: impl ToString, attribute: impl ToString, name: impl ToString, geometry: MultiPolygon<f64>)->Result<Self> {
        let name = name.to_string();
        let bbox = geometry.bounding_rect()
            .ok_or_else( || OdinNightlightError::InvalidGeometry( format!("empty geometry for region {name}")))?;

        Ok( Region { dataset_id: dataset_id.to_string(), attribute: attribute.to_string(), name, geometry, bbox } )
    }

    pub fn geometry (&self)->&MultiPolygon<f64> { &self.geometry }

    pub fn bounds (&self)->BoundingBox<f64> {
        BoundingBox::from( self.bbox)
    }

    /// is (lon,lat) inside the region
    pub fn contains (&self, x: f64, y: f64)->bool {
        if x < self.bbox.min().x || x > self.bbox.max().x || y < self.bbox.min().y || y > self.bbox.max().y {
            false
        } else {
            self.geometry.contains( &Point::new(x,y))
        }
    }

    /// the (lon,lat) centroid, or the bbox center if the centroid can't be computed
    pub fn center (&self)->(f64,f64) {
        match self.geometry.centroid() {
            Some(p) => (p.x(), p.y()),
            None => self.bounds().center()
        }
    }

    pub fn to_geojson_geometry (&self)->geojson::Geometry {
        geojson::Geometry::new( geojson::Value::from( &self.geometry))
    }
}

impl PartialEq for Region {
    fn eq (&self, other: &Self)->bool {
        self.dataset_id == other.dataset_id && self.name == other.name && self.geometry == other.geometry
    }
}

/// serialize only the geometry (as GeoJSON)
impl Serialize for Region {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> where S: serde::Serializer {
        self.to_geojson_geometry().serialize( serializer)
    }
}

/// a read-only reference set of boundary features
pub struct BoundaryDataset {
    pub id: String,
    features: Vec<Feature>,
}

impl BoundaryDataset {
    pub fn open<P> (id: impl ToString, path: P)->Result<Self> where P: AsRef<Path> {
        let contents = filepath_contents_as_string( &path)?;
        let ds = Self::from_geojson_str( id, &contents)?;
        debug!("loaded {} boundary features from {:?}", ds.len(), path.as_ref());
        Ok(ds)
    }

    pub fn from_geojson_str (id: impl ToString, s: &str)->Result<Self> {
        let geojson: GeoJson = s.parse()?;
        let fc = FeatureCollection::try_from( geojson)?;
        Ok( BoundaryDataset { id: id.to_string(), features: fc.features } )
    }

    pub fn len (&self)->usize { self.features.len() }
    pub fn is_empty (&self)->bool { self.features.is_empty() }

    /// resolve the single feature for which `attribute == value`.
    /// Zero or multiple matches are errors since there is no meaningful region to clip and export
    pub fn select (&self, attribute: &str, value: &str)->Result<Arc<Region>> {
        let query = format!("{attribute} == '{value}' in {}", self.id);

        let matches: Vec<&Feature> = self.features.iter()
            .filter( |f| f.property(attribute).and_then( |v| v.as_str()) == Some(value))
            .collect();

        match matches.len() {
            0 => Err( OdinNightlightError::NoMatchingRegion( query)),
            1 => {
                let geometry = feature_multi_polygon( matches[0], value)?;
                Ok( Arc::new( Region::new( &self.id, attribute, value, geometry)?) )
            }
            n => Err( OdinNightlightError::AmbiguousRegion( query, n))
        }
    }
}

fn feature_multi_polygon (feature: &Feature, name: &str)->Result<MultiPolygon<f64>> {
    let geom = feature.geometry.clone()
        .ok_or_else( || OdinNightlightError::InvalidGeometry( format!("feature {name} has no geometry")))?;

    match Geometry::<f64>::try_from( geom)? {
        Geometry::Polygon(p) => Ok( MultiPolygon::new( vec![p])),
        Geometry::MultiPolygon(mp) => Ok( mp),
        Geometry::GeometryCollection(gc) => {
            let mut polys = Vec::new();
            for g in gc {
                match g {
                    Geometry::Polygon(p) => polys.push(p),
                    Geometry::MultiPolygon(mp) => polys.extend( mp),
                    other => warn!("ignoring non-areal geometry in {name}: {other:?}")
                }
            }
            if polys.is_empty() {
                Err( OdinNightlightError::InvalidGeometry( format!("no polygons in {name}")))
            } else {
                Ok( MultiPolygon::new( polys))
            }
        }
        _ => Err( OdinNightlightError::InvalidGeometry( format!("{name} is not a polygon")))
    }
}
