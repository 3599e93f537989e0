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

//! single band f32 rasters in geographic (lon/lat) coordinates, with GeoTIFF I/O based on the `tiff` crate.
//! No-data pixels are stored as `NaN`. On input we map the GDAL_NODATA value of the file to `NaN`, on output
//! we always write a "nan" GDAL_NODATA tag.

use std::{fs::File, io::BufReader, path::Path};
use ndarray::Array2;
use serde::{Serialize,Deserialize};
use tiff::{
    decoder::{Decoder,DecodingResult},
    encoder::{colortype::Gray32Float, Compression as TiffCompression, DeflateLevel, TiffEncoder},
    tags::Tag,
};
use odin_common::fs::extension;
use crate::errors::{Result,OdinNightlightError};

pub const EPSG_4326: &str = "EPSG:4326";

/// length of one degree of longitude at the equator (WGS84), used to convert meter scales to EPSG:4326 pixel sizes
pub const METERS_PER_DEGREE: f64 = 111_319.490793;

// GeoTIFF / GDAL private tags
const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const GEO_KEY_DIRECTORY_TAG: u16 = 34735;
const GDAL_NODATA_TAG: u16 = 42113;

/// approximate size of GeoTIFF strips we write
pub const STRIP_BYTES: usize = 1 << 20;

// GeoKey ids
const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

#[inline]
fn geotiff_tag (code: u16)->Tag { Tag::from_u16_exhaustive(code) }

/// affine transform of a north-up grid. `pixel_height` is negative if rows go from north to south
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoTransform {
    pub x_origin: f64,
    pub pixel_width: f64,
    pub y_origin: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new (x_origin: f64, pixel_width: f64, y_origin: f64, pixel_height: f64)->Self {
        GeoTransform { x_origin, pixel_width, y_origin, pixel_height }
    }

    /// transform for a north-up grid with square pixels that has its upper left corner at (west,north)
    pub fn north_up (west: f64, north: f64, pixel_size: f64)->Self {
        GeoTransform { x_origin: west, pixel_width: pixel_size, y_origin: north, pixel_height: -pixel_size }
    }

    /// (x,y) of the pixel center
    pub fn pixel_center (&self, col: usize, row: usize)->(f64,f64) {
        ( self.x_origin + (col as f64 + 0.5) * self.pixel_width,
          self.y_origin + (row as f64 + 0.5) * self.pixel_height )
    }

    /// (col,row) of the pixel containing (x,y). Can be negative or out of grid bounds
    pub fn pixel_of (&self, x: f64, y: f64)->(i64,i64) {
        ( ((x - self.x_origin) / self.pixel_width).floor() as i64,
          ((y - self.y_origin) / self.pixel_height).floor() as i64 )
    }
}

#[derive(Debug,Clone)]
pub struct Raster {
    transform: GeoTransform,
    crs: String,
    data: Array2<f32>, // (rows,cols)
}

impl Raster {
    pub fn new (transform: GeoTransform, crs: impl ToString, data: Array2<f32>)->Self {
        Raster { transform, crs: crs.to_string(), data }
    }

    pub fn filled (width: usize, height: usize, transform: GeoTransform, crs: impl ToString, value: f32)->Self {
        Raster::new( transform, crs, Array2::from_elem( (height,width), value))
    }

    /// a raster of the same grid with all pixels set to no-data
    pub fn empty_like (other: &Raster)->Self {
        Raster::filled( other.width(), other.height(), other.transform, &other.crs, f32::NAN)
    }

    pub fn width (&self)->usize { self.data.ncols() }
    pub fn height (&self)->usize { self.data.nrows() }
    pub fn dimensions (&self)->(usize,usize) { (self.width(), self.height()) }
    pub fn pixel_count (&self)->usize { self.data.len() }

    pub fn transform (&self)->&GeoTransform { &self.transform }
    pub fn crs (&self)->&str { self.crs.as_str() }
    pub fn data (&self)->&Array2<f32> { &self.data }
    pub fn data_mut (&mut self)->&mut Array2<f32> { &mut self.data }

    /// the value at given pixel, None if no-data or outside of grid
    pub fn get (&self, col: usize, row: usize)->Option<f32> {
        self.data.get( (row,col)).copied().filter( |v| !v.is_nan())
    }

    /// do we have the same dimensions, transform and CRS as `other`
    pub fn is_same_grid (&self, other: &Raster)->bool {
        self.dimensions() == other.dimensions() && self.transform == other.transform && self.crs == other.crs
    }

    pub fn valid_count (&self)->usize {
        self.data.iter().filter( |v| !v.is_nan()).count()
    }

    pub fn open<P> (path: P)->Result<Self> where P: AsRef<Path> {
        check_path( &path)?;
        let file = File::open( path.as_ref())?;
        let mut decoder = Decoder::new( BufReader::new(file))?;

        let (w,h) = decoder.dimensions()?;
        let (width,height) = (w as usize, h as usize);

        let scale = decoder.get_tag_f64_vec( geotiff_tag(MODEL_PIXEL_SCALE_TAG))?;
        let tiepoint = decoder.get_tag_f64_vec( geotiff_tag(MODEL_TIEPOINT_TAG))?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err( OdinNightlightError::InvalidRaster( format!("incomplete georeference in {:?}", path.as_ref())))
        }
        // tiepoint is (i,j,k, x,y,z) and maps raster position (i,j) to model coordinate (x,y)
        let transform = GeoTransform::new(
            tiepoint[3] - tiepoint[0] * scale[0], scale[0],
            tiepoint[4] + tiepoint[1] * scale[1], -scale[1]
        );

        let geo_keys = decoder.get_tag_u16_vec( geotiff_tag(GEO_KEY_DIRECTORY_TAG))?;
        let crs = crs_from_geo_keys( &geo_keys).ok_or_else( || {
            OdinNightlightError::InvalidRaster( format!("no EPSG code in {:?}", path.as_ref()))
        })?;

        let no_data: Option<f32> = match decoder.find_tag( geotiff_tag(GDAL_NODATA_TAG))? {
            Some(v) => v.into_string()?.trim_matches(char::from(0)).trim().parse().ok(),
            None => None
        };

        let mut values = decoding_result_to_f32( decoder.read_image()?)?;
        if let Some(nd) = no_data {
            if !nd.is_nan() {
                for v in values.iter_mut() {
                    if *v == nd { *v = f32::NAN }
                }
            }
        }

        let data = Array2::from_shape_vec( (height,width), values).map_err( |e| {
            OdinNightlightError::InvalidRaster( format!("unexpected data size in {:?}: {}", path.as_ref(), e))
        })?;

        Ok( Raster { transform, crs, data } )
    }

    /// write as deflate compressed 32bit float GeoTIFF. Only geographic (EPSG:4326) rasters are supported
    pub fn save<P> (&self, path: P)->Result<()> where P: AsRef<Path> {
        write_geotiff_rows( path, &self.transform, &self.crs, self.width(), self.height(), |row, out| {
            for (o,v) in out.iter_mut().zip( self.data.row(row)) { *o = *v }
        })
    }
}

/// write a deflate compressed 32bit float GeoTIFF of `width` x `height` pixels, with values that are
/// computed one row at a time by `fill_row`. Only strips of about `STRIP_BYTES` are kept in memory,
/// which means the grid can be much larger than what would fit into a `Raster`.
/// No-data values have to be `NaN`, the GDAL_NODATA tag is always "nan"
pub fn write_geotiff_rows<P,F> (path: P, transform: &GeoTransform, crs: &str, width: usize, height: usize, mut fill_row: F)->Result<()>
    where P: AsRef<Path>, F: FnMut(usize,&mut [f32])
{
    check_path( &path)?;
    let epsg = epsg_code( crs)?;
    if epsg != 4326 {
        return Err( OdinNightlightError::UnsupportedCrs( crs.to_string()))
    }
    let (w,h) = match (u32::try_from( width), u32::try_from( height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w,h),
        _ => return Err( OdinNightlightError::InvalidRaster( format!("unsupported GeoTIFF dimensions {width}x{height}")))
    };
    let rows_per_strip = (STRIP_BYTES / (width * size_of::<f32>())).clamp( 1, height);

    let mut out_file = File::create( path.as_ref())?;
    let mut enc = TiffEncoder::new( &mut out_file)?.with_compression( TiffCompression::Deflate(DeflateLevel::Balanced));
    let mut img = enc.new_image::<Gray32Float>( w, h)?;
    img.rows_per_strip( rows_per_strip as u32)?;

    let scale = [transform.pixel_width, -transform.pixel_height, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, transform.x_origin, transform.y_origin, 0.0];
    let geo_keys: [u16;16] = [
        1, 1, 0, 3, // version, revision, minor, number of keys
        GT_MODEL_TYPE_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC,
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
        GEOGRAPHIC_TYPE_KEY, 0, 1, epsg
    ];

    let dir = img.encoder();
    dir.write_tag( geotiff_tag(MODEL_PIXEL_SCALE_TAG), &scale[..])?;
    dir.write_tag( geotiff_tag(MODEL_TIEPOINT_TAG), &tiepoint[..])?;
    dir.write_tag( geotiff_tag(GEO_KEY_DIRECTORY_TAG), &geo_keys[..])?;
    dir.write_tag( geotiff_tag(GDAL_NODATA_TAG), "nan")?;

    let mut strip: Vec<f32> = vec![ f32::NAN; rows_per_strip * width];
    let mut row = 0;
    while row < height {
        let n = rows_per_strip.min( height - row);
        let samples = &mut strip[..n * width];
        for (i, row_samples) in samples.chunks_exact_mut( width).enumerate() {
            fill_row( row + i, row_samples);
        }
        img.write_strip( samples)?;
        row += n;
    }
    img.finish()?;
    Ok(())
}

fn check_path<P> (path: &P)->Result<()> where P: AsRef<Path> {
    match extension( path) {
        Some(ext) if ext.ends_with("tif") || ext.ends_with("tiff") => Ok(()),
        _ => Err( OdinNightlightError::InvalidRaster( format!("not a GeoTIFF path {:?}", path.as_ref())))
    }
}

/// parse "EPSG:<code>" (case insensitive)
pub fn epsg_code (crs: &str)->Result<u16> {
    let (auth,code) = crs.split_once(':').ok_or_else( || OdinNightlightError::UnsupportedCrs(crs.to_string()))?;
    if auth.eq_ignore_ascii_case("epsg") {
        code.trim().parse().map_err( |_| OdinNightlightError::UnsupportedCrs(crs.to_string()))
    } else {
        Err( OdinNightlightError::UnsupportedCrs(crs.to_string()))
    }
}

/// check if given CRS is geographic WGS84
pub fn is_epsg_4326 (crs: &str)->bool {
    matches!( epsg_code(crs), Ok(4326))
}

fn crs_from_geo_keys (keys: &[u16])->Option<String> {
    if keys.len() < 4 { return None }
    let n_keys = keys[3] as usize;

    keys[4..].chunks_exact(4).take(n_keys)
        .find( |k| (k[0] == GEOGRAPHIC_TYPE_KEY || k[0] == PROJECTED_CS_TYPE_KEY) && k[1] == 0)
        .map( |k| format!("EPSG:{}", k[3]))
}

fn decoding_result_to_f32 (res: DecodingResult)->Result<Vec<f32>> {
    let values = match res {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::U16(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::U32(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map( |x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map( |x| x as f32).collect(),
        _ => return Err( OdinNightlightError::InvalidRaster("unsupported sample format".into()))
    };
    Ok(values)
}
