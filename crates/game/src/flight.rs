//! Kinematic flight model for the player craft.
//!
//! Intents nudge per-channel speeds; `update` integrates them into the pose
//! once per physics tick and lets every channel decay back toward its floor.
//! Speeds are clamped sign-aware: a non-negative value lives in
//! `[min, max]`, a negative one in `[-max, -min]`, and decay never flips the
//! sign.

use engine_core::{
    ensure_non_negative, ensure_range, ConfigError, LocalAxis, Transform, Vec3,
};
use input::PilotIntents;
use physics::{PhysicsWorld, RigidBodyHandle};
use renderer::CameraTarget;
use serde::{Deserialize, Serialize};

/// Tuning for one speed channel (absolute values).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelLimits {
    pub acceleration: f32,
    /// Passive decay per second.
    pub damping: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl ChannelLimits {
    pub const fn new(acceleration: f32, damping: f32, min_speed: f32, max_speed: f32) -> Self {
        Self {
            acceleration,
            damping,
            min_speed,
            max_speed,
        }
    }

    /// Sign-aware clamp into the channel's band.
    pub fn clamp(&self, speed: f32) -> f32 {
        if speed >= 0.0 {
            speed.clamp(self.min_speed, self.max_speed)
        } else {
            speed.clamp(-self.max_speed, -self.min_speed)
        }
    }

    /// Push `speed` toward zero by `damping * dt` without crossing zero.
    pub fn decay(&self, speed: f32, dt: f32) -> f32 {
        if speed >= 0.0 {
            (speed - self.damping * dt).clamp(self.min_speed, self.max_speed)
        } else {
            (speed + self.damping * dt).clamp(-self.max_speed, -self.min_speed)
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        ensure_non_negative(name, self.acceleration)?;
        ensure_non_negative(name, self.damping)?;
        ensure_range(name, self.min_speed, self.max_speed)
    }
}

/// Immutable motion tuning. Linear speeds in units/s, angular in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    pub linear: ChannelLimits,
    /// Active braking per second.
    pub deceleration: f32,
    /// About local right.
    pub pitch: ChannelLimits,
    /// About local up.
    pub yaw: ChannelLimits,
    /// About local forward.
    pub roll: ChannelLimits,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            linear: ChannelLimits::new(100.0, 5.0, 40.0, 400.0),
            deceleration: 30.0,
            pitch: ChannelLimits::new(11.0, 6.0, 0.0, 1.2),
            yaw: ChannelLimits::new(11.0, 6.0, 0.0, 1.2),
            roll: ChannelLimits::new(13.0, 7.0, 0.0, 1.5),
        }
    }
}

impl MotionProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.linear.validate("craft.motion.linear")?;
        ensure_non_negative("craft.motion.deceleration", self.deceleration)?;
        self.pitch.validate("craft.motion.pitch")?;
        self.yaw.validate("craft.motion.yaw")?;
        self.roll.validate("craft.motion.roll")
    }
}

/// Converts pilot intents into velocities and integrates the craft's pose.
#[derive(Debug, Clone)]
pub struct FlightController {
    profile: MotionProfile,
    linear_speed: f32,
    pitch_rate: f32,
    yaw_rate: f32,
    roll_rate: f32,
    intents: PilotIntents,
    previous: Transform,
    current: Transform,
    body: Option<RigidBodyHandle>,
}

impl FlightController {
    /// Start at `pose`, at minimum linear speed, not rotating.
    ///
    /// # Panics
    /// If `profile` fails validation.
    pub fn new(profile: MotionProfile, pose: Transform) -> Self {
        if let Err(err) = profile.validate() {
            panic!("invalid motion profile: {err}");
        }
        let pose = pose.without_scale();
        Self {
            linear_speed: profile.linear.min_speed,
            pitch_rate: profile.pitch.clamp(0.0),
            yaw_rate: profile.yaw.clamp(0.0),
            roll_rate: profile.roll.clamp(0.0),
            profile,
            intents: PilotIntents::default(),
            previous: pose,
            current: pose,
            body: None,
        }
    }

    /// Drive `body` (a kinematic body) from this controller's pose.
    pub fn attach_body(&mut self, body: RigidBodyHandle) {
        self.body = Some(body);
    }

    pub fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Latch the intents applied on every following tick.
    pub fn set_intents(&mut self, intents: PilotIntents) {
        self.intents = intents;
    }

    pub fn intents(&self) -> PilotIntents {
        self.intents
    }

    pub fn accelerate(&mut self, dt: f32) {
        let linear = &self.profile.linear;
        self.linear_speed =
            (self.linear_speed + linear.acceleration * dt).clamp(linear.min_speed, linear.max_speed);
    }

    pub fn decelerate(&mut self, dt: f32) {
        let linear = &self.profile.linear;
        self.linear_speed = (self.linear_speed - self.profile.deceleration * dt)
            .clamp(linear.min_speed, linear.max_speed);
    }

    /// Bank left while yawing left.
    pub fn turn_left(&mut self, dt: f32) {
        let (roll, yaw) = (self.profile.roll, self.profile.yaw);
        self.roll_rate = roll.clamp(self.roll_rate - roll.acceleration * dt);
        self.yaw_rate = yaw.clamp(self.yaw_rate + yaw.acceleration * dt);
    }

    /// Bank right while yawing right.
    pub fn turn_right(&mut self, dt: f32) {
        let (roll, yaw) = (self.profile.roll, self.profile.yaw);
        self.roll_rate = roll.clamp(self.roll_rate + roll.acceleration * dt);
        self.yaw_rate = yaw.clamp(self.yaw_rate - yaw.acceleration * dt);
    }

    pub fn pitch_up(&mut self, dt: f32) {
        let pitch = self.profile.pitch;
        self.pitch_rate = pitch.clamp(self.pitch_rate + pitch.acceleration * dt);
    }

    pub fn pitch_down(&mut self, dt: f32) {
        let pitch = self.profile.pitch;
        self.pitch_rate = pitch.clamp(self.pitch_rate - pitch.acceleration * dt);
    }

    fn apply_intents(&mut self, dt: f32) {
        let intents = self.intents;
        if intents.accelerate {
            self.accelerate(dt);
        }
        if intents.decelerate {
            self.decelerate(dt);
        }
        if intents.turn_left {
            self.turn_left(dt);
        }
        if intents.turn_right {
            self.turn_right(dt);
        }
        if intents.pitch_up {
            self.pitch_up(dt);
        }
        if intents.pitch_down {
            self.pitch_down(dt);
        }
    }

    /// One physics tick: apply latched intents, rotate (pitch, roll, yaw),
    /// decay angular rates, move forward, decay linear speed, then push the
    /// pose to the attached body.
    pub fn update(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        self.previous = self.current;
        self.apply_intents(dt);

        let pose = &mut self.current;
        pose.rotate_local(LocalAxis::Right, self.pitch_rate * dt);
        pose.rotate_local(LocalAxis::Forward, self.roll_rate * dt);
        pose.rotate_local(LocalAxis::Up, self.yaw_rate * dt);

        self.pitch_rate = self.profile.pitch.decay(self.pitch_rate, dt);
        self.roll_rate = self.profile.roll.decay(self.roll_rate, dt);
        self.yaw_rate = self.profile.yaw.decay(self.yaw_rate, dt);

        pose.renormalize();
        let forward = pose.forward();
        pose.translate(forward * self.linear_speed * dt);

        self.linear_speed = self.profile.linear.decay(self.linear_speed, dt);

        if let Some(body) = self.body {
            physics.set_kinematic_transform(body, &self.current);
        }
    }

    pub fn linear_speed(&self) -> f32 {
        self.linear_speed
    }

    pub fn pitch_rate(&self) -> f32 {
        self.pitch_rate
    }

    pub fn yaw_rate(&self) -> f32 {
        self.yaw_rate
    }

    pub fn roll_rate(&self) -> f32 {
        self.roll_rate
    }

    /// Pose before the last tick.
    pub fn previous(&self) -> &Transform {
        &self.previous
    }

    /// Pose after the last tick.
    pub fn current(&self) -> &Transform {
        &self.current
    }

    pub fn position(&self) -> Vec3 {
        self.current.position
    }

    /// Pose blended between the last two ticks.
    pub fn interpolated(&self, alpha: f32) -> Transform {
        Transform::interpolate(&self.previous, &self.current, alpha)
    }

    /// What the chase camera follows.
    pub fn camera_target(&self, alpha: f32) -> CameraTarget {
        let pose = self.interpolated(alpha);
        CameraTarget::new(pose.position, pose.forward(), pose.up())
    }
}
