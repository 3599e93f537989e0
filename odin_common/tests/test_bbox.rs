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

use geo_types::Rect;
use odin_common::BoundingBox;

#[test]
fn test_bbox_from_rect() {
    let rect = Rect::new( (79.5, 5.9), (81.9, 9.9));
    let bbox = BoundingBox::from( rect);
    println!("{bbox:?}");
    assert_eq!( bbox, BoundingBox::<f64>::new( 79.5, 5.9, 81.9, 9.9));

    let (x,y) = bbox.center();
    assert!( (x - 80.7).abs() < 1e-9 && (y - 7.9).abs() < 1e-9);
}
