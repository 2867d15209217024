use glam::Vec3;
use maze_common::{Axis, Direction};
use maze_input::Action;
use winit::keyboard::KeyCode;

/// Key bindings shown in the help panel, in display order.
pub const HELP: &[(&str, &str)] = &[
    ("Arrows", "move the maze"),
    ("W/A/S/D", "move the eye"),
    ("Space/Ctrl", "eye up/down"),
    ("Q/E", "rotate the maze"),
    ("Z/X", "scale up/down"),
    ("Home", "reset the maze and camera"),
    ("F1/H", "toggle this panel"),
    ("Esc", "quit"),
];

pub fn action_for(key: KeyCode) -> Action {
    match key {
        KeyCode::ArrowUp => Action::MoveModel(Direction::Back),
        KeyCode::ArrowDown => Action::MoveModel(Direction::Front),
        KeyCode::ArrowLeft => Action::MoveModel(Direction::Left),
        KeyCode::ArrowRight => Action::MoveModel(Direction::Right),
        KeyCode::KeyW => Action::MoveEye(Vec3::NEG_Z),
        KeyCode::KeyS => Action::MoveEye(Vec3::Z),
        KeyCode::KeyA => Action::MoveEye(Vec3::NEG_X),
        KeyCode::KeyD => Action::MoveEye(Vec3::X),
        KeyCode::Space => Action::MoveEye(Vec3::Y),
        KeyCode::ControlLeft | KeyCode::ControlRight => Action::MoveEye(Vec3::NEG_Y),
        KeyCode::KeyQ => Action::RotateModel {
            axis: Axis::Y,
            sign: 1.0,
        },
        KeyCode::KeyE => Action::RotateModel {
            axis: Axis::Y,
            sign: -1.0,
        },
        KeyCode::KeyZ => Action::ScaleModel(true),
        KeyCode::KeyX => Action::ScaleModel(false),
        KeyCode::Home => Action::ResetView,
        KeyCode::F1 | KeyCode::KeyH => Action::ToggleHelp,
        KeyCode::Escape => Action::Quit,
        _ => Action::Noop,
    }
}
