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

//! utility functions for RON config and catalog files

use std::path::{Path,PathBuf};
use serde::de::DeserializeOwned;
use thiserror::Error;
use crate::fs::filepath_contents_as_string;

#[derive(Error,Debug)]
pub enum RonFileError {
    #[error("IO error for {0:?}: {1}")]
    IOError( PathBuf, std::io::Error),

    #[error("RON syntax error in {0:?}: {1}")]
    SyntaxError( PathBuf, ron::error::SpannedError),
}

/// load and deserialize a RON file
pub fn load_ron_file<T,P> (path: P)->Result<T,RonFileError> where T: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();
    let contents = filepath_contents_as_string( &path).map_err( |e| RonFileError::IOError( path.to_path_buf(), e))?;
    ron::from_str( &contents).map_err( |e| RonFileError::SyntaxError( path.to_path_buf(), e))
}
