use crate::dirty::DirtyState;
use glam::Mat4;

/// Perspective lens.
#[derive(Debug, Clone)]
pub struct ProjectionTransform {
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    dirty: DirtyState,
}

impl Default for ProjectionTransform {
    fn default() -> Self {
        Self::new(45.0_f32.to_radians(), 4.0 / 3.0, 0.1, 1000.0)
    }
}

impl ProjectionTransform {
    /// `fovy` is the vertical field of view in radians.
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fovy,
            aspect,
            near,
            far,
            dirty: DirtyState::Dirty,
        }
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_fovy(&mut self, fovy: f32) {
        self.fovy = fovy;
        self.dirty.mark();
    }

    /// Ignores degenerate ratios (zero-height windows while minimised).
    pub fn set_aspect(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            tracing::debug!("ignoring aspect ratio {aspect}");
            return;
        }
        self.aspect = aspect;
        self.dirty.mark();
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.dirty.mark();
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.dirty.mark();
    }

    /// Right-handed perspective with a 0..1 depth range. Clears the dirty flag.
    pub fn matrix(&mut self) -> Mat4 {
        self.dirty.consume();
        self.peek()
    }

    pub fn peek(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.near, self.far)
    }

    pub fn updated(&self) -> bool {
        self.dirty.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn setters_mark_dirty() {
        let mut proj = ProjectionTransform::default();
        proj.matrix();
        assert!(!proj.updated());

        proj.set_fovy(1.0);
        assert!(proj.updated());
        proj.matrix();

        proj.set_aspect(2.0);
        assert!(proj.updated());
        proj.matrix();

        proj.set_near(0.5);
        assert!(proj.updated());
        proj.matrix();

        proj.set_far(50.0);
        assert!(proj.updated());
    }

    #[test]
    fn degenerate_aspect_ignored() {
        let mut proj = ProjectionTransform::default();
        proj.matrix();
        proj.set_aspect(0.0);
        proj.set_aspect(f32::NAN);
        assert!(!proj.updated());
        assert_eq!(proj.aspect(), 4.0 / 3.0);
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let mut proj = ProjectionTransform::new(1.0, 1.0, 0.5, 100.0);
        let m = proj.matrix();
        let p = m.project_point3(Vec3::new(0.0, 0.0, -0.5));
        assert!(p.z.abs() < 1e-5);
        let q = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!((q.z - 1.0).abs() < 1e-4);
    }
}
