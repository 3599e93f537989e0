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

use odin_common::fs::{ensure_writable_dir, extension, filepath_contents_as_string};
use std::path::Path;

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_extension() {
    assert_eq!( extension( &Path::new("viirs/20210101_avg_rad.tif")), Some("tif"));
    assert_eq!( extension( &"collection.ron"), Some("ron"));
    assert_eq!( extension( &Path::new("GEE_Exports")), None);
}

#[test]
fn test_ensure_writable_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("exports/GEE_Exports");
    assert!( !dir.is_dir());

    ensure_writable_dir( &dir).unwrap();
    assert!( dir.is_dir());
    ensure_writable_dir( &dir).unwrap(); // existing dir is fine

    let path = dir.join("notes.txt");
    std::fs::write( &path, "VIIRS").unwrap();
    assert_eq!( filepath_contents_as_string( &path).unwrap(), "VIIRS");
    assert!( filepath_contents_as_string( &dir.join("missing.txt")).is_err());
}
