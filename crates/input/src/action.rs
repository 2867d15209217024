use glam::Vec3;
use maze_common::{Axis, Direction, StepConfig};
use maze_scene::TransformStore;

/// A high-level action any frontend can produce.
///
/// Frontends map raw input to actions; the scene only ever sees actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Translate the maze by one move step.
    MoveModel(Direction),
    /// Rotate the maze by one rotate step; `sign` picks the direction.
    RotateModel { axis: Axis, sign: f32 },
    /// Scale the maze up (`true`) or down by one scale step.
    ScaleModel(bool),
    /// Move the eye by `delta` eye steps.
    MoveEye(Vec3),
    /// Put the maze back to identity and the camera back to its start.
    ResetView,
    ToggleHelp,
    Quit,
    /// Unbound input.
    Noop,
}

impl Action {
    /// Apply a transform action. Returns whether `store` changed.
    pub fn apply(&self, store: &mut TransformStore, steps: &StepConfig) -> bool {
        match *self {
            Action::MoveModel(direction) => {
                store.model.translate(direction, steps.move_step);
            }
            Action::RotateModel { axis, sign } => {
                let radians = steps.rotate_step_degrees.to_radians() * sign.signum();
                store.model.rotate(axis.unit(), radians);
            }
            Action::ScaleModel(grow) => {
                let factor = if grow {
                    steps.scale_step
                } else {
                    steps.scale_step.recip()
                };
                store.model.scale(Vec3::splat(factor));
            }
            Action::MoveEye(delta) => {
                store.view.move_eye(delta * steps.eye_step);
            }
            Action::ResetView => {
                store.model.reset();
                store.view.reset();
            }
            Action::ToggleHelp | Action::Quit | Action::Noop => return false,
        }
        tracing::debug!("applied {self:?}");
        true
    }

    pub fn is_transform(&self) -> bool {
        !matches!(self, Action::ToggleHelp | Action::Quit | Action::Noop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec4};

    fn clean_store() -> TransformStore {
        let mut store = TransformStore::new();
        store.combined();
        store
    }

    #[test]
    fn move_model_translates_by_step() {
        let mut store = clean_store();
        let steps = StepConfig::default();
        assert!(Action::MoveModel(Direction::Right).apply(&mut store, &steps));
        assert!(store.model.updated());
        let moved = store.model.peek() * Vec4::W;
        assert_eq!(moved, Vec4::new(steps.move_step, 0.0, 0.0, 1.0));
    }

    #[test]
    fn scale_down_inverts_scale_up() {
        let mut store = clean_store();
        let steps = StepConfig::default();
        Action::ScaleModel(true).apply(&mut store, &steps);
        Action::ScaleModel(false).apply(&mut store, &steps);
        assert!(store.model.peek().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn rotate_sign_picks_direction() {
        let mut store = clean_store();
        let steps = StepConfig::default();
        Action::RotateModel { axis: Axis::Y, sign: 1.0 }.apply(&mut store, &steps);
        Action::RotateModel { axis: Axis::Y, sign: -1.0 }.apply(&mut store, &steps);
        assert!(store.model.peek().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn move_eye_marks_view() {
        let mut store = clean_store();
        let eye = store.view.eye();
        assert!(Action::MoveEye(Vec3::Y).apply(&mut store, &StepConfig::default()));
        assert!(store.view.updated());
        assert!(!store.model.updated());
        assert_eq!(store.view.eye(), eye + Vec3::Y * StepConfig::default().eye_step);
    }

    #[test]
    fn reset_restores_identity() {
        let mut store = clean_store();
        let steps = StepConfig::default();
        Action::MoveModel(Direction::Front).apply(&mut store, &steps);
        store.combined();
        assert!(Action::ResetView.apply(&mut store, &steps));
        assert!(store.updated());
        assert_eq!(store.model.peek(), Mat4::IDENTITY);
    }

    #[test]
    fn reset_restores_camera() {
        let mut store = clean_store();
        let start = store.view.eye();
        let steps = StepConfig::default();
        Action::MoveEye(Vec3::X).apply(&mut store, &steps);
        Action::MoveEye(Vec3::NEG_Z).apply(&mut store, &steps);
        assert_ne!(store.view.eye(), start);
        store.combined();

        assert!(Action::ResetView.apply(&mut store, &steps));
        assert!(store.view.updated());
        assert_eq!(store.view.eye(), start);
    }

    #[test]
    fn non_transform_actions_leave_store_clean() {
        let mut store = clean_store();
        for action in [Action::ToggleHelp, Action::Quit, Action::Noop] {
            assert!(!action.apply(&mut store, &StepConfig::default()));
            assert!(!action.is_transform());
        }
        assert!(!store.updated());
    }
}
