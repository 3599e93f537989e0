/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

//! common types and functions that are shared between ODIN crates

use serde::{Serialize,Deserialize};
use num::{Num,ToPrimitive};
use geo_types::{CoordNum, Rect};

pub mod macros;
pub mod fs;
pub mod datetime;
pub mod ron;

/// a generic bounding box without semantics for the coordinate type
#[derive(Debug,Copy,Clone,Serialize,Deserialize,PartialEq)]
pub struct BoundingBox <T: Num> {
    pub west: T,
    pub south: T,
    pub east: T,
    pub north: T
}

impl <T: Num + Copy + ToPrimitive> BoundingBox<T> {
    pub fn new(west: T, south: T, east: T, north: T)->Self {
        BoundingBox{ west, south, east, north}
    }

    pub fn center (&self) -> (f64,f64) {
        let c = |a: T, b: T| (a.to_f64().unwrap_or(f64::NAN) + b.to_f64().unwrap_or(f64::NAN)) / 2.0;
        ( c(self.west, self.east), c(self.south, self.north) )
    }
}

impl <T: Num + CoordNum> From<Rect<T>> for BoundingBox<T> {
    fn from (rect: Rect<T>)->Self {
        BoundingBox { west: rect.min().x, south: rect.min().y, east: rect.max().x, north: rect.max().y }
    }
}
