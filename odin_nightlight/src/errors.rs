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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinNightlightError>;

#[derive(Error,Debug)]
pub enum OdinNightlightError {

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("tiff error {0}")]
    TiffError( #[from] tiff::TiffError),

    #[error("image error {0}")]
    ImageError( #[from] image::ImageError),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("RON error {0}")]
    RonError( #[from] odin_common::ron::RonFileError),

    #[error("GeoJSON error {0}")]
    GeoJsonError( #[from] geojson::Error),

    #[error("no region with {0}")]
    NoMatchingRegion(String),

    #[error("ambiguous region query {0}: {1} matches")]
    AmbiguousRegion(String, usize),

    #[error("invalid geometry {0}")]
    InvalidGeometry(String),

    #[error("collection not found {0}")]
    CollectionNotFound(String),

    #[error("empty collection {0}")]
    EmptyCollection(String),

    #[error("no single band selected in {0}")]
    NoBandSelected(String),

    #[error("raster grids do not match: {0}")]
    GridMismatch(String),

    #[error("invalid date range {0}")]
    InvalidDateRange(String),

    #[error("unsupported CRS {0}")]
    UnsupportedCrs(String),

    #[error("export of {width}x{height} pixels exceeds max pixel count {max_pixels}")]
    MaxPixelsExceeded { width: usize, height: usize, max_pixels: u64 },

    #[error("invalid raster {0}")]
    InvalidRaster(String),

    #[error("invalid color {0}")]
    InvalidColor(String),

    #[error("operation failed {0}")]
    OpFailedError(String),
}

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinNightlightError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
