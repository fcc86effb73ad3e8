//! Look-at camera with coupled near/far planes and the five preset views.

use glam::{Mat4, Vec3};

/// Lowest value the near/far planes may take.
pub const MIN_CLIP: f32 = 0.1;
/// Highest value the near/far planes may take.
pub const MAX_CLIP: f32 = 20.0;
/// Minimum gap kept between the near and far planes.
pub const CLIP_GAP: f32 = 0.5;

/// A look-at camera with a perspective lens.
///
/// Eye, target and up vector are all world-space. `fovy` is the vertical field of view in
/// degrees. Near/far are edited through [`set_near`](Self::set_near) and
/// [`set_far`](Self::set_far) so the planes never cross.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
    pub fovy: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            at: Vec3::ZERO,
            up: Vec3::Y,
            fovy: 45.0,
            near: 0.1,
            far: 20.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Sets the near plane, keeping it at least [`CLIP_GAP`] in front of the far plane.
    pub fn set_near(&mut self, near: f32) {
        let near = near.clamp(MIN_CLIP, MAX_CLIP);
        self.near = near.min(self.far - CLIP_GAP).max(MIN_CLIP);
    }

    /// Sets the far plane, keeping it at least [`CLIP_GAP`] behind the near plane.
    pub fn set_far(&mut self, far: f32) {
        let far = far.clamp(MIN_CLIP, MAX_CLIP);
        self.far = far.max(self.near + CLIP_GAP);
    }

    /// Sets the vertical field of view in degrees, clamped to `[1, 100]`.
    pub fn set_fovy(&mut self, fovy: f32) {
        self.fovy = fovy.clamp(1.0, 100.0);
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.at, self.up)
    }

    /// Perspective projection for the given aspect ratio (wgpu depth range 0..1).
    pub fn perspective_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy.to_radians(), aspect, self.near, self.far)
    }

    /// Moves the camera to one of the fixed viewpoints, looking at the origin.
    pub fn apply_preset(&mut self, preset: ViewPreset) {
        let (eye, up) = preset.pose();
        self.eye = eye;
        self.at = Vec3::ZERO;
        self.up = up;
    }
}

/// Fixed camera viewpoints reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPreset {
    Front,
    Top,
    Profile,
    Axonometric,
    Back,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 5] = [
        ViewPreset::Front,
        ViewPreset::Top,
        ViewPreset::Profile,
        ViewPreset::Axonometric,
        ViewPreset::Back,
    ];

    /// Eye position and up vector for this preset.
    pub fn pose(self) -> (Vec3, Vec3) {
        match self {
            ViewPreset::Front => (Vec3::new(0.0, 0.0, 5.0), Vec3::Y),
            // Looking straight down: +Y can't be the up vector.
            ViewPreset::Top => (Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z),
            ViewPreset::Profile => (Vec3::new(5.0, 0.0, 0.0), Vec3::Y),
            ViewPreset::Axonometric => (Vec3::new(3.0, 3.0, 3.0), Vec3::Y),
            ViewPreset::Back => (Vec3::new(0.0, 0.0, -5.0), Vec3::Y),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewPreset::Front => "front",
            ViewPreset::Top => "top",
            ViewPreset::Profile => "profile",
            ViewPreset::Axonometric => "axonometric",
            ViewPreset::Back => "back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn near_stays_in_front_of_far() {
        let mut camera = Camera::new();
        camera.set_far(5.0);
        camera.set_near(10.0);
        assert_abs_diff_eq!(camera.near(), 4.5);
        assert_abs_diff_eq!(camera.far(), 5.0);
    }

    #[test]
    fn far_stays_behind_near() {
        let mut camera = Camera::new();
        camera.set_near(3.0);
        camera.set_far(1.0);
        assert_abs_diff_eq!(camera.far(), 3.5);
    }

    #[test]
    fn clip_planes_clamp_to_range() {
        let mut camera = Camera::new();
        camera.set_near(-4.0);
        assert_abs_diff_eq!(camera.near(), MIN_CLIP);
        camera.set_far(100.0);
        assert_abs_diff_eq!(camera.far(), MAX_CLIP);
    }

    #[test]
    fn fovy_is_clamped() {
        let mut camera = Camera::new();
        camera.set_fovy(500.0);
        assert_abs_diff_eq!(camera.fovy, 100.0);
        camera.set_fovy(0.0);
        assert_abs_diff_eq!(camera.fovy, 1.0);
    }

    #[test]
    fn presets_look_at_origin() {
        let mut camera = Camera::new();
        camera.at = Vec3::ONE;
        for preset in ViewPreset::ALL {
            camera.apply_preset(preset);
            assert_eq!(camera.at, Vec3::ZERO);
            // The eye lands on the view-space origin.
            let eye_in_view = camera.view_matrix().transform_point3(camera.eye);
            assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-5), "{}", preset.name());
        }
    }

    #[test]
    fn target_lies_on_negative_view_z() {
        let camera = Camera::new();
        let target = camera.view_matrix().transform_point3(camera.at);
        assert_abs_diff_eq!(target.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(target.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(target.z, -5.0, epsilon = 1e-5);
    }
}
