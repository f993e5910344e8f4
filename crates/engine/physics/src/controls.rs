//! Player input and view orientation

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch limit just short of straight up/down
pub const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// How player input moves the viewpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Walking capsule driven by forces, gravity and collisions
    #[default]
    Simulated,
    /// Collision-free camera flight for inspecting terrain
    FreeFly,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Simulated => ControlMode::FreeFly,
            ControlMode::FreeFly => ControlMode::Simulated,
        }
    }
}

/// A charged throw released this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// How long the throw was held, in seconds
    pub charge_secs: f32,
    /// Throw direction, usually [`ViewPose::forward`]
    pub direction: Vec3,
}

/// Input sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlIntents {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fly_up: bool,
    pub fly_down: bool,
    pub toggle_mode: bool,
    /// Yaw and pitch deltas in radians
    pub look: Vec2,
    pub launch: Option<Launch>,
}

impl ControlIntents {
    /// Signed forward/back and right/left axes
    pub fn move_axes(&self) -> (f32, f32) {
        (axis(self.forward, self.back), axis(self.right, self.left))
    }

    pub fn vertical_axis(&self) -> f32 {
        axis(self.fly_up, self.fly_down)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Camera position and orientation, yaw applied before pitch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewPose {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Look direction; -Z at rest
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Forward projected onto the ground plane
    pub fn horizontal_forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(-sin, 0.0, -cos)
    }

    /// Right projected onto the ground plane
    pub fn horizontal_right(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Apply yaw/pitch deltas, keeping pitch inside +/- [`MAX_PITCH`]
    pub fn look(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.yaw += delta.x;
        self.pitch = (self.pitch + delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn reset_rotation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Move along the pose's own axes
    pub fn translate_local(&mut self, forward: f32, right: f32, up: f32) {
        let rotation = self.rotation();
        self.position += rotation * Vec3::new(right, up, -forward);
    }
}
