use crate::dirty::DirtyState;
use glam::{Mat4, Vec3};
use maze_common::look_at_is_degenerate;

/// Look-at camera: eye, target and up vector.
///
/// The pose given to [`new`](Self::new) is remembered as home for
/// [`reset`](Self::reset). Setters that would collapse the camera basis are
/// ignored, so the matrix stays finite.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    eye: Vec3,
    at: Vec3,
    up: Vec3,
    home: (Vec3, Vec3, Vec3),
    dirty: DirtyState,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y)
    }
}

impl ViewTransform {
    pub fn new(eye: Vec3, at: Vec3, up: Vec3) -> Self {
        Self {
            eye,
            at,
            up,
            home: (eye, at, up),
            dirty: DirtyState::Dirty,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn at(&self) -> Vec3 {
        self.at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.place(eye, self.at, self.up);
    }

    pub fn set_at(&mut self, at: Vec3) {
        self.place(self.eye, at, self.up);
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.place(self.eye, self.at, up);
    }

    /// Slide the eye by `delta`, keeping the target fixed.
    pub fn move_eye(&mut self, delta: Vec3) {
        self.set_eye(self.eye + delta);
    }

    /// Back to the pose the view was created with.
    pub fn reset(&mut self) {
        let (eye, at, up) = self.home;
        self.eye = eye;
        self.at = at;
        self.up = up;
        self.dirty.mark();
    }

    /// Right-handed look-at matrix. Clears the dirty flag.
    pub fn matrix(&mut self) -> Mat4 {
        self.dirty.consume();
        self.peek()
    }

    pub fn peek(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.at, self.up)
    }

    pub fn updated(&self) -> bool {
        self.dirty.is_dirty()
    }

    fn place(&mut self, eye: Vec3, at: Vec3, up: Vec3) {
        if look_at_is_degenerate(eye, at, up) {
            tracing::debug!("ignoring degenerate view eye={eye} at={at} up={up}");
            return;
        }
        self.eye = eye;
        self.at = at;
        self.up = up;
        self.dirty.mark();
    }
}
