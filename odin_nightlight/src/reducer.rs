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

use ndarray::{Array2, Zip};
use serde::{Serialize,Deserialize};
use clap::ValueEnum;
use tracing::{debug,info};
use crate::{
    collection::CollectionView, raster::Raster,
    errors::{Result,OdinNightlightError}
};

/// per-pixel statistic used to collapse a time series of rasters into a composite.
/// No-data values never contribute. Pixels without any valid contribution are no-data in the result
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize,ValueEnum)]
pub enum Reducer {
    #[default]
    Mean,
    Median,
    Min,
    Max,
}

impl Reducer {

    /// reduce all rasters of the selected band of `view`
    pub fn reduce (&self, view: &CollectionView)->Result<Raster> {
        if view.band().is_none() {
            return Err( OdinNightlightError::NoBandSelected( view.to_string()))
        }
        if view.is_empty() {
            return Err( OdinNightlightError::EmptyCollection( view.to_string()))
        }

        let composite = self.reduce_rasters( view.rasters()?)?;
        info!("reduced {} with {:?} -> {}x{} composite", view, self, composite.width(), composite.height());
        Ok(composite)
    }

    /// reduce a sequence of rasters that all have to be on the same grid
    pub fn reduce_rasters<I> (&self, rasters: I)->Result<Raster> where I: IntoIterator<Item=Result<Raster>> {
        match self {
            Reducer::Mean => reduce_mean( rasters),
            Reducer::Min => reduce_fold( rasters, f32::min),
            Reducer::Max => reduce_fold( rasters, f32::max),
            Reducer::Median => reduce_median( rasters),
        }
    }
}

fn check_grid (reference: &Raster, r: &Raster)->Result<()> {
    if reference.is_same_grid( r) {
        Ok(())
    } else {
        Err( OdinNightlightError::GridMismatch(
            format!("{}x{} {} {:?} vs {}x{} {} {:?}",
                reference.width(), reference.height(), reference.crs(), reference.transform(),
                r.width(), r.height(), r.crs(), r.transform())
        ))
    }
}

// we accumulate in f64 to avoid precision loss over long series
fn reduce_mean<I> (rasters: I)->Result<Raster> where I: IntoIterator<Item=Result<Raster>> {
    let mut it = rasters.into_iter();
    let first = it.next().ok_or_else( || OdinNightlightError::EmptyCollection("no rasters to reduce".into()))??;

    let shape = first.data().raw_dim();
    let mut sum: Array2<f64> = Array2::zeros( shape);
    let mut count: Array2<u32> = Array2::zeros( shape);
    let mut n = 0;

    let mut accumulate = |r: &Raster| {
        Zip::from( &mut sum).and( &mut count).and( r.data()).for_each( |s, c, &v| {
            if !v.is_nan() {
                *s += v as f64;
                *c += 1;
            }
        });
        n += 1;
    };

    accumulate( &first);
    for r in it {
        let r = r?;
        check_grid( &first, &r)?;
        accumulate( &r);
    }
    debug!("averaged {n} rasters");

    let mut result = Raster::empty_like( &first);
    Zip::from( result.data_mut()).and( &sum).and( &count).for_each( |out, &s, &c| {
        if c > 0 { *out = (s / c as f64) as f32 }
    });
    Ok(result)
}

fn reduce_fold<I,F> (rasters: I, f: F)->Result<Raster> where I: IntoIterator<Item=Result<Raster>>, F: Fn(f32,f32)->f32 {
    let mut it = rasters.into_iter();
    let mut acc = it.next().ok_or_else( || OdinNightlightError::EmptyCollection("no rasters to reduce".into()))??;

    for r in it {
        let r = r?;
        check_grid( &acc, &r)?;
        Zip::from( acc.data_mut()).and( r.data()).for_each( |a, &v| {
            if !v.is_nan() {
                *a = if a.is_nan() { v } else { f(*a, v) };
            }
        });
    }
    Ok(acc)
}

fn reduce_median<I> (rasters: I)->Result<Raster> where I: IntoIterator<Item=Result<Raster>> {
    let rasters: Vec<Raster> = rasters.into_iter().collect::<Result<Vec<Raster>>>()?;
    let first = rasters.first().ok_or_else( || OdinNightlightError::EmptyCollection("no rasters to reduce".into()))?;
    for r in &rasters[1..] { check_grid( first, r)? }

    let mut result = Raster::empty_like( first);
    let mut values: Vec<f32> = Vec::with_capacity( rasters.len());

    for ((row,col), out) in result.data_mut().indexed_iter_mut() {
        values.clear();
        values.extend( rasters.iter().map( |r| r.data()[(row,col)]).filter( |v| !v.is_nan()));
        if !values.is_empty() {
            values.sort_by( |a,b| a.total_cmp(b));
            let m = values.len() / 2;
            *out = if values.len() % 2 == 0 { (values[m-1] + values[m]) / 2.0 } else { values[m] };
        }
    }
    Ok(result)
}
