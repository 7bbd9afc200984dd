//! Transform component and utilities for spatial positioning.
//!
//! Local frame convention: right = +X, up = +Y, forward = -Z.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Local axes of a rigid frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalAxis {
    Right,
    Up,
    Forward,
}

impl LocalAxis {
    /// Unit vector of this axis in the local frame.
    pub fn local_vector(self) -> Vec3 {
        match self {
            LocalAxis::Right => Vec3::X,
            LocalAxis::Up => Vec3::Y,
            LocalAxis::Forward => -Vec3::Z,
        }
    }
}

/// A 3D transform representing position, rotation, and scale.
///
/// Simulation code keeps `scale` at one; a non-unit scale is only attached
/// to the copy handed to the renderer (see [`Transform::with_scale`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Copy of this transform with a render scale attached.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Copy of this transform with scale removed and the rotation renormalized.
    pub fn without_scale(mut self) -> Self {
        self.scale = Vec3::ONE;
        self.renormalize();
        self
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// World-space direction of one of the local axes.
    pub fn axis(&self, axis: LocalAxis) -> Vec3 {
        self.rotation * axis.local_vector()
    }

    /// Orientation basis as matrix columns (right, up, backward).
    pub fn basis(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate by `angle` radians about one of this transform's own axes.
    pub fn rotate_local(&mut self, axis: LocalAxis, angle: f32) {
        if angle != 0.0 {
            self.rotation = self.rotation * Quat::from_axis_angle(axis.local_vector(), angle);
        }
    }

    /// Pull the orientation back onto the unit sphere after accumulated drift.
    pub fn renormalize(&mut self) {
        let len_sq = self.rotation.length_squared();
        if len_sq.is_finite() && len_sq > f32::EPSILON {
            self.rotation = self.rotation.normalize();
        } else {
            log::warn!("degenerate orientation {:?}, resetting to identity", self.rotation);
            self.rotation = Quat::IDENTITY;
        }
    }

    /// True when the orientation columns are unit length and pairwise orthogonal.
    pub fn is_orthonormal(&self, tolerance: f32) -> bool {
        let m = self.basis();
        let (x, y, z) = (m.x_axis, m.y_axis, m.z_axis);
        (x.length() - 1.0).abs() <= tolerance
            && (y.length() - 1.0).abs() <= tolerance
            && (z.length() - 1.0).abs() <= tolerance
            && x.dot(y).abs() <= tolerance
            && y.dot(z).abs() <= tolerance
            && z.dot(x).abs() <= tolerance
    }

    /// Blend from `previous` toward `current` by `alpha` in [0, 1].
    /// Position is lerped, rotation slerped, scale taken from `current`.
    pub fn interpolate(previous: &Transform, current: &Transform, alpha: f32) -> Transform {
        let alpha = alpha.clamp(0.0, 1.0);
        Transform {
            position: previous.position.lerp(current.position, alpha),
            rotation: previous.rotation.slerp(current.rotation, alpha).normalize(),
            scale: current.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_axes_follow_convention() {
        let t = Transform::default();
        assert!(approx(t.forward(), -Vec3::Z));
        assert!(approx(t.right(), Vec3::X));
        assert!(approx(t.up(), Vec3::Y));
        assert!(approx(t.axis(LocalAxis::Forward), t.forward()));
    }

    #[test]
    fn positive_pitch_raises_the_nose() {
        let mut t = Transform::default();
        t.rotate_local(LocalAxis::Right, FRAC_PI_2);
        assert!(approx(t.forward(), Vec3::Y));
    }

    #[test]
    fn local_rotation_uses_the_current_frame() {
        let mut t = Transform::default();
        // Yaw left a quarter turn, then pitch up: nose should point straight up
        // because pitch is about the rotated right axis.
        t.rotate_local(LocalAxis::Up, FRAC_PI_2);
        assert!(approx(t.forward(), -Vec3::X));
        t.rotate_local(LocalAxis::Right, FRAC_PI_2);
        assert!(approx(t.forward(), Vec3::Y));
    }

    #[test]
    fn without_scale_restores_unit_frame() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(0.016));
        t.rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
        let t = t.without_scale();
        assert_eq!(t.scale, Vec3::ONE);
        assert!(t.is_orthonormal(1e-5));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn renormalize_recovers_from_degenerate_rotation() {
        let mut t = Transform::default();
        t.rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        t.renormalize();
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn interpolate_blends_endpoints() {
        let a = Transform::from_position(Vec3::ZERO);
        let b = Transform::from_position_rotation(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_y(1.0));
        let start = Transform::interpolate(&a, &b, 0.0);
        let mid = Transform::interpolate(&a, &b, 0.5);
        let end = Transform::interpolate(&a, &b, 1.0);
        assert!(approx(start.position, a.position));
        assert!(approx(mid.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!(approx(end.position, b.position));
        assert!(end.rotation.angle_between(b.rotation) < 1e-4);
        assert!((mid.rotation.angle_between(a.rotation) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn model_matrix_carries_scale() {
        let t = Transform::from_position(Vec3::new(0.0, 0.0, -5.0)).with_scale(Vec3::splat(2.0));
        let model = t.to_matrix().to_cols_array_2d();
        assert_eq!(model[0][0], 2.0);
        assert_eq!(model[3][2], -5.0);
    }
}
