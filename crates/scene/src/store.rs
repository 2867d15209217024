use crate::model::ModelTransform;
use crate::projection::ProjectionTransform;
use crate::view::ViewTransform;
use glam::Mat4;
use maze_common::CameraConfig;

/// Model, view and projection transforms shared by every renderer.
#[derive(Debug, Clone, Default)]
pub struct TransformStore {
    pub model: ModelTransform,
    pub view: ViewTransform,
    pub projection: ProjectionTransform,
}

impl TransformStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera placed per `camera`, identity model.
    pub fn from_camera(camera: &CameraConfig, aspect: f32) -> Self {
        Self {
            model: ModelTransform::new(),
            view: ViewTransform::new(camera.eye, camera.at, camera.up),
            projection: ProjectionTransform::new(
                camera.fovy_degrees.to_radians(),
                aspect,
                camera.near,
                camera.far,
            ),
        }
    }

    /// Whether any of the three matrices changed since it was last read.
    pub fn updated(&self) -> bool {
        self.model.updated() || self.view.updated() || self.projection.updated()
    }

    /// `projection * view * model`. Consumes all three dirty flags.
    pub fn combined(&mut self) -> Mat4 {
        self.projection.matrix() * self.view.matrix() * self.model.matrix()
    }

    /// Same product as [`combined`](Self::combined) without consuming.
    pub fn peek_combined(&self) -> Mat4 {
        self.projection.peek() * self.view.peek() * self.model.peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use maze_common::Direction;

    #[test]
    fn fresh_store_is_updated() {
        let store = TransformStore::new();
        assert!(store.updated());
    }

    #[test]
    fn combined_consumes_all_flags() {
        let mut store = TransformStore::new();
        let first = store.combined();
        assert!(!store.updated());
        let second = store.combined();
        assert_eq!(first, second);
        assert!(!store.updated());
    }

    #[test]
    fn any_part_marks_store_updated() {
        let mut store = TransformStore::new();
        store.combined();

        store.model.translate(Direction::Left, 1.0);
        assert!(store.updated());
        store.combined();

        store.view.move_eye(Vec3::Y);
        assert!(store.updated());
        store.combined();

        store.projection.set_aspect(2.0);
        assert!(store.updated());
    }

    #[test]
    fn multiplication_order() {
        let mut store = TransformStore::new();
        store.model.scale(Vec3::new(2.0, 1.0, 1.0));
        let expected = store.projection.peek() * store.view.peek() * store.model.peek();
        assert_eq!(store.peek_combined(), expected);
        assert_eq!(store.combined(), expected);
    }

    #[test]
    fn from_camera_uses_config() {
        let camera = CameraConfig {
            eye: Vec3::new(1.0, 2.0, 3.0),
            fovy_degrees: 90.0,
            ..CameraConfig::default()
        };
        let store = TransformStore::from_camera(&camera, 2.0);
        assert_eq!(store.view.eye(), Vec3::new(1.0, 2.0, 3.0));
        assert!((store.projection.fovy() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(store.projection.aspect(), 2.0);
    }
}
