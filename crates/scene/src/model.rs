use crate::dirty::DirtyState;
use glam::{Mat4, Vec3};
use maze_common::Direction;

/// Model matrix with consume-on-read dirty tracking.
///
/// Every mutation pre-multiplies onto the current matrix:
/// `new = mutation * old`.
#[derive(Debug, Clone, Default)]
pub struct ModelTransform {
    matrix: Mat4,
    dirty: DirtyState,
}

impl ModelTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the model `amount` units in `direction`.
    pub fn translate(&mut self, direction: Direction, amount: f32) {
        let step = Mat4::from_translation(direction.unit() * amount);
        self.premultiply(step);
    }

    /// Rotate about `axis` by `radians`. A zero-length axis leaves the
    /// transform untouched.
    pub fn rotate(&mut self, axis: Vec3, radians: f32) {
        let Some(axis) = axis.try_normalize() else {
            tracing::debug!("ignoring rotation about a zero-length axis");
            return;
        };
        self.premultiply(Mat4::from_axis_angle(axis, radians));
    }

    /// Non-uniform scale.
    pub fn scale(&mut self, factors: Vec3) {
        self.premultiply(Mat4::from_scale(factors));
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        self.matrix = Mat4::IDENTITY;
        self.dirty.mark();
    }

    /// Current matrix. Clears the dirty flag.
    pub fn matrix(&mut self) -> Mat4 {
        self.dirty.consume();
        self.matrix
    }

    /// Current matrix without touching the dirty flag.
    pub fn peek(&self) -> Mat4 {
        self.matrix
    }

    pub fn updated(&self) -> bool {
        self.dirty.is_dirty()
    }

    fn premultiply(&mut self, mutation: Mat4) {
        self.matrix = mutation * self.matrix;
        self.dirty.mark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    fn clean() -> ModelTransform {
        let mut model = ModelTransform::new();
        model.matrix();
        model
    }

    #[test]
    fn matrix_consumes_dirty_flag() {
        let mut model = ModelTransform::new();
        assert!(model.updated());
        let first = model.matrix();
        assert!(!model.updated());
        let second = model.matrix();
        assert_eq!(first, second);
        assert!(!model.updated());
    }

    #[test]
    fn updated_is_a_pure_peek() {
        let model = ModelTransform::new();
        assert!(model.updated());
        assert!(model.updated());
    }

    #[test]
    fn translate_directions() {
        let mut model = clean();
        model.translate(Direction::Front, 2.0);
        assert!(model.updated());
        assert_eq!(model.matrix().w_axis, Vec4::new(0.0, 0.0, 2.0, 1.0));

        let mut model = clean();
        model.translate(Direction::Back, 2.0);
        assert_eq!(model.matrix().w_axis, Vec4::new(0.0, 0.0, -2.0, 1.0));

        let mut model = clean();
        model.translate(Direction::Left, 1.5);
        assert_eq!(model.matrix().w_axis, Vec4::new(-1.5, 0.0, 0.0, 1.0));

        let mut model = clean();
        model.translate(Direction::Right, 1.5);
        assert_eq!(model.matrix().w_axis, Vec4::new(1.5, 0.0, 0.0, 1.0));
    }

    #[test]
    fn every_mutator_sets_dirty() {
        let mut model = clean();
        model.rotate(Vec3::Y, 0.3);
        assert!(model.updated());

        let mut model = clean();
        model.scale(Vec3::new(1.0, 2.0, 3.0));
        assert!(model.updated());

        let mut model = clean();
        model.reset();
        assert!(model.updated());
    }

    #[test]
    fn mutations_premultiply() {
        let mut model = clean();
        model.translate(Direction::Right, 1.0);
        let before = model.peek();
        model.rotate(Vec3::Y, FRAC_PI_2);
        let expected = Mat4::from_axis_angle(Vec3::Y, FRAC_PI_2) * before;
        assert!(model.matrix().abs_diff_eq(expected, 1e-6));

        // Rotation applied after the translation swings the offset around Y.
        let moved = model.peek().transform_point3(Vec3::ZERO);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn scale_premultiplies() {
        let mut model = clean();
        model.translate(Direction::Front, 1.0);
        model.scale(Vec3::splat(2.0));
        let p = model.matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn zero_axis_rotation_is_noop() {
        let mut model = clean();
        model.rotate(Vec3::ZERO, 1.0);
        assert!(!model.updated());
        assert_eq!(model.peek(), Mat4::IDENTITY);
    }
}
