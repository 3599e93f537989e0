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

use chrono::NaiveDate;
use serde::{Serialize,Deserialize};
use std::fmt;

/// an inclusive calendar date interval `[start,end]`
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// returns None if `end` is before `start`
    pub fn new (start: NaiveDate, end: NaiveDate)->Option<Self> {
        if start <= end { Some( DateRange { start, end }) } else { None }
    }

    /// `[YYYY-01-01, YYYY-12-31]`, None if the year is outside of the chrono date range
    pub fn for_year (year: i32)->Option<Self> {
        Self::new( NaiveDate::from_ymd_opt( year, 1, 1)?, NaiveDate::from_ymd_opt( year, 12, 31)?)
    }

    pub fn contains (&self, date: &NaiveDate)->bool {
        *date >= self.start && *date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
