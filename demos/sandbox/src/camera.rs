// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An orbiting camera.

use prism_core::math::{degrees_to_radians, Mat3, Mat4, Vec3};
use std::time::Duration;

/// Degrees per second around the Z axis.
const ORBIT_SPEED_DEGREES: f32 = 90.0;
const FOV_Y_DEGREES: f32 = 70.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// A camera circling the origin, looking at it with Z up.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    position: Vec3,
    aspect_ratio: f32,
    world_view: Mat4,
    view_projection: Mat4,
}

impl OrbitCamera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position,
            aspect_ratio,
            world_view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        };
        camera.update(Duration::ZERO);
        camera
    }

    /// Rotates the camera by the angle covered in `dt` and refreshes both
    /// matrices.
    pub fn update(&mut self, dt: Duration) {
        let angle = degrees_to_radians(dt.as_secs_f32() * ORBIT_SPEED_DEGREES);
        self.position = Mat3::from_axis_angle(Vec3::Z, angle) * self.position;

        self.world_view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Z);
        self.view_projection =
            Mat4::perspective_rh_gl(degrees_to_radians(FOV_Y_DEGREES), self.aspect_ratio, Z_NEAR, Z_FAR);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world_view(&self) -> Mat4 {
        self.world_view
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }
}
