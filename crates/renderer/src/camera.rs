//! Lag-behind chase camera and projection.
//!
//! The camera trails its target through a ring buffer of past target poses:
//! it is placed relative to the oldest buffered pose and eased toward the
//! ideal distance from the newest one, so speed changes stretch and relax the
//! gap instead of snapping it.

use bytemuck::{Pod, Zeroable};
use engine_core::{
    ensure_non_empty, ensure_non_negative, ensure_positive, ensure_range, ensure_within,
    ConfigError, Easing, EasingCurve,
};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::sink::FrameView;

/// Pose snapshot the camera chases. The axes are always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl CameraTarget {
    /// Normalizes both axes. A zero-length (or non-finite) axis falls back to
    /// -Z forward / +Y up.
    pub fn new(position: Vec3, forward: Vec3, up: Vec3) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec3::NEG_Z),
            up: up.try_normalize().unwrap_or(Vec3::Y),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }
}

/// Chase tuning. Distances are unsigned, in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseCameraParams {
    /// Number of past target poses the camera lags behind.
    pub buffer_size: usize,
    pub ideal_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Deviation from the ideal distance that starts a new catch-up.
    pub chase_trigger_distance: f32,
    /// Seconds for one catch-up ramp.
    pub easing_duration: f32,
    pub easing_curve: EasingCurve,
}

impl Default for ChaseCameraParams {
    fn default() -> Self {
        Self {
            buffer_size: 20,
            ideal_distance: 13.0,
            min_distance: 11.0,
            max_distance: 15.0,
            chase_trigger_distance: 0.7,
            easing_duration: 2.6,
            easing_curve: EasingCurve::EaseInOutExpo,
        }
    }
}

impl ChaseCameraParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_empty("camera.buffer_size", self.buffer_size)?;
        ensure_positive("camera.ideal_distance", self.ideal_distance)?;
        ensure_non_negative("camera.chase_trigger_distance", self.chase_trigger_distance)?;
        ensure_range("camera.distance", self.min_distance, self.max_distance)?;
        ensure_within(
            "camera.ideal_distance",
            self.ideal_distance,
            self.min_distance,
            self.max_distance,
        )?;
        ensure_positive("camera.easing_duration", self.easing_duration)
    }
}

/// Camera that trails a [`CameraTarget`] with a delay and a soft distance
/// constraint.
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    params: ChaseCameraParams,
    forward_offset: f32,
    up_offset: f32,
    history: Vec<CameraTarget>,
    /// Slot holding the oldest target; overwritten on every update.
    index: usize,
    /// Signed distance from the oldest target toward the newest one.
    previous_compensated: f32,
    easing: Easing,
    position: Vec3,
    view: Mat4,
}

impl ChaseCamera {
    /// Place the camera `ideal_distance` behind `initial`, shifted by the
    /// fixed offsets along the target's forward and up axes.
    ///
    /// # Panics
    /// If `params` fails validation.
    pub fn new(
        initial: CameraTarget,
        params: ChaseCameraParams,
        forward_offset: f32,
        up_offset: f32,
    ) -> Self {
        if let Err(err) = params.validate() {
            panic!("invalid chase camera parameters: {err}");
        }

        let position = initial.position - params.ideal_distance * initial.forward
            + forward_offset * initial.forward
            + up_offset * initial.up;
        let view = Mat4::look_at_rh(position, position + initial.forward, initial.up);
        let easing = Easing::new(params.easing_curve, params.easing_duration);

        Self {
            history: vec![initial; params.buffer_size],
            params,
            forward_offset,
            up_offset,
            index: 0,
            previous_compensated: 0.0,
            easing,
            position,
            view,
        }
    }

    pub fn params(&self) -> &ChaseCameraParams {
        &self.params
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Oldest buffered target: the pose the camera is currently placed from.
    pub fn lagged_target(&self) -> CameraTarget {
        self.history[self.index]
    }

    /// Restart the catch-up ramp if the previous one has finished.
    pub fn chase_target(&mut self) {
        if self.easing.is_finished() {
            self.easing.reset();
        }
    }

    /// Recompute the view from the oldest buffered target and `latest`, then
    /// push `latest` into the history.
    ///
    /// The target must not move backwards relative to the oldest buffered
    /// pose; this is checked in debug builds.
    pub fn update_view_matrix(&mut self, latest: CameraTarget, dt: f32) {
        let current = self.history[self.index];

        let separation = latest.position - current.position;
        debug_assert!(
            separation.dot(current.forward) >= 0.0,
            "chase target moved backwards: separation {separation} against forward {}",
            current.forward
        );
        let distance = separation.length();
        let direction = if distance == 0.0 {
            current.forward
        } else {
            separation / distance
        };

        let before = current.position + self.previous_compensated * direction;
        let deviation = (latest.position - before).length() - self.params.ideal_distance;

        if deviation.abs() >= self.params.chase_trigger_distance && self.easing.is_finished() {
            log::trace!("chase camera catching up, deviation {deviation:.2}");
            self.easing.reset();
        }

        // Keeps the distance to `latest` inside [min_distance, max_distance].
        let compensated = (self.previous_compensated + deviation * self.easing.step(dt)).clamp(
            distance - self.params.max_distance,
            distance - self.params.min_distance,
        );
        self.previous_compensated = compensated;

        self.position = current.position
            + compensated * direction
            + self.forward_offset * current.forward
            + self.up_offset * current.up;
        self.view = Mat4::look_at_rh(self.position, self.position + current.forward, current.up);

        self.history[self.index] = latest;
        self.index = (self.index + 1) % self.history.len();
    }
}

/// Perspective projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 350_000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_within("projection.fov_degrees", self.fov_degrees, 1.0, 179.0)?;
        ensure_positive("projection.aspect", self.aspect)?;
        ensure_positive("projection.near", self.near)?;
        ensure_range("projection.near_far", self.near, self.far)
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn update(&mut self, frame: &FrameView) {
        self.view = frame.view.to_cols_array_2d();
        self.proj = frame.projection.to_cols_array_2d();
        self.view_proj = (frame.projection * frame.view).to_cols_array_2d();
        let pos = frame.camera_position;
        self.position = [pos.x, pos.y, pos.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
