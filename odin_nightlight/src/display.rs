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

//! human visualization of composites. This is not a contract beyond accepting a raster, a value range,
//! a color ramp and a label - the `PngMapDisplay` just renders each layer into a PNG file

use std::{path::{Path,PathBuf}, sync::Mutex};
use image::{Rgba, RgbaImage};
use serde::{Serialize,Deserialize};
use tracing::info;
use odin_common::fs::ensure_writable_dir;
use crate::{
    raster::Raster, region::Region,
    errors::{Result,OdinNightlightError,op_failed}
};

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>, // CSS color names or (optionally '#' prefixed) 6 digit hex rgb
}

impl VisParams {
    pub fn color_ramp (&self)->Result<ColorRamp> {
        ColorRamp::new( self.min, self.max, &self.palette)
    }
}

/// linear interpolation between palette stops that are evenly spaced over [min,max]
#[derive(Debug,Clone)]
pub struct ColorRamp {
    min: f64,
    max: f64,
    stops: Vec<[u8;3]>,
}

impl ColorRamp {
    pub fn new (min: f64, max: f64, palette: &[String])->Result<Self> {
        if !(max > min) {
            return Err( op_failed!("invalid display range [{},{}]", min, max))
        }
        if palette.is_empty() {
            return Err( OdinNightlightError::InvalidColor("empty palette".into()))
        }
        let stops = palette.iter().map( |c| parse_color(c)).collect::<Result<Vec<[u8;3]>>>()?;
        Ok( ColorRamp { min, max, stops } )
    }

    /// map a value to a color. No-data maps to fully transparent, out-of-range values are clamped
    pub fn color (&self, v: f32)->Rgba<u8> {
        if v.is_nan() { return Rgba([0,0,0,0]) }

        let t = ((v as f64 - self.min) / (self.max - self.min)).clamp( 0.0, 1.0);
        let n = self.stops.len();
        if n == 1 {
            let [r,g,b] = self.stops[0];
            return Rgba([r,g,b,255])
        }

        let pos = t * (n - 1) as f64;
        let i = (pos.floor() as usize).min( n - 2);
        let frac = pos - i as f64;
        let (c0,c1) = (self.stops[i], self.stops[i+1]);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

        Rgba([ lerp(c0[0],c1[0]), lerp(c0[1],c1[1]), lerp(c0[2],c1[2]), 255 ])
    }
}

pub fn parse_color (spec: &str)->Result<[u8;3]> {
    let spec = spec.trim();
    let rgb = match spec.to_ascii_lowercase().as_str() {
        "black" => [0,0,0],
        "white" => [255,255,255],
        "red" => [255,0,0],
        "green" => [0,128,0],
        "lime" => [0,255,0],
        "blue" => [0,0,255],
        "yellow" => [255,255,0],
        "cyan" => [0,255,255],
        "magenta" => [255,0,255],
        "orange" => [255,165,0],
        "purple" => [128,0,128],
        "gray" | "grey" => [128,128,128],
        _ => {
            let hex = spec.strip_prefix('#').unwrap_or(spec);
            if hex.len() != 6 {
                return Err( OdinNightlightError::InvalidColor( spec.to_string()))
            }
            let v = u32::from_str_radix( hex, 16).map_err( |_| OdinNightlightError::InvalidColor( spec.to_string()))?;
            [ (v >> 16) as u8, (v >> 8 & 0xff) as u8, (v & 0xff) as u8 ]
        }
    };
    Ok(rgb)
}

/// where and how close the map is centered
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct MapView {
    pub region: String,
    pub center: (f64,f64),
    pub zoom: u8,
}

/// the map display collaborator of the pipeline
pub trait MapDisplay: Send + Sync {
    fn center_object (&self, region: &Region, zoom: u8);
    fn add_layer (&self, raster: &Raster, vis: &VisParams, label: &str)->Result<()>;
}

/// a display that renders each layer as `<dir>/<label>.png`
pub struct PngMapDisplay {
    dir: PathBuf,
    views: Mutex<Vec<MapView>>,
}

impl PngMapDisplay {
    pub fn new (dir: impl AsRef<Path>)->Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_writable_dir( &dir)?;
        Ok( PngMapDisplay { dir, views: Mutex::new( Vec::new()) } )
    }

    pub fn layer_path (&self, label: &str)->PathBuf {
        let name: String = label.chars().map( |c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' }).collect();
        self.dir.join( format!("{name}.png"))
    }

    pub fn views (&self)->Vec<MapView> {
        self.views.lock().map( |v| v.clone()).unwrap_or_default()
    }
}

impl MapDisplay for PngMapDisplay {
    fn center_object (&self, region: &Region, zoom: u8) {
        let view = MapView { region: region.name.clone(), center: region.center(), zoom };
        info!("map centered on {} at {:?} (zoom {})", view.region, view.center, zoom);
        if let Ok(mut views) = self.views.lock() {
            views.push( view);
        }
    }

    fn add_layer (&self, raster: &Raster, vis: &VisParams, label: &str)->Result<()> {
        let ramp = vis.color_ramp()?;
        let (w,h) = raster.dimensions();

        let mut img = RgbaImage::new( w as u32, h as u32);
        for ((row,col), v) in raster.data().indexed_iter() {
            img.put_pixel( col as u32, row as u32, ramp.color( *v));
        }

        let path = self.layer_path( label);
        img.save( &path)?;
        info!("added layer '{}' -> {:?}", label, path);
        Ok(())
    }
}
