//! Keyboard bindings.
//!
//! Character bindings are matched on the typed character so they follow the keyboard
//! layout; panel navigation uses physical arrow keys.

use winit::keyboard::KeyCode;

use crate::camera::ViewPreset;
use crate::input::Input;
use crate::panel::Panel;
use crate::scene::{RasterMode, RenderState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    Wireframe,
    Filled,
    Preset(ViewPreset),
    AddLight,
    ToggleProjection,
    TogglePanel,
    CursorUp,
    CursorDown,
    Adjust { delta: i32, coarse: bool },
    Activate,
}

/// Maps a typed character to its command. Letters are case-insensitive.
pub fn command_for_char(c: char) -> Option<Command> {
    let command = match c.to_ascii_lowercase() {
        '+' | '=' => Command::ZoomIn,
        '-' => Command::ZoomOut,
        'w' => Command::Wireframe,
        's' => Command::Filled,
        '1' => Command::Preset(ViewPreset::Front),
        '2' => Command::Preset(ViewPreset::Top),
        '3' => Command::Preset(ViewPreset::Profile),
        '4' => Command::Preset(ViewPreset::Axonometric),
        '5' => Command::Preset(ViewPreset::Back),
        'l' => Command::AddLight,
        'p' => Command::ToggleProjection,
        'h' => Command::TogglePanel,
        _ => return None,
    };
    Some(command)
}

/// Commands triggered this frame, characters first, then navigation keys.
///
/// Navigation is ignored while the panel is hidden.
pub fn commands(input: &Input, panel_visible: bool) -> Vec<Command> {
    let mut commands: Vec<Command> = input
        .typed()
        .iter()
        .filter_map(|&c| command_for_char(c))
        .collect();

    if !panel_visible {
        return commands;
    }

    let coarse = input.shift_down();
    if input.key_pressed(KeyCode::ArrowUp) {
        commands.push(Command::CursorUp);
    }
    if input.key_pressed(KeyCode::ArrowDown) {
        commands.push(Command::CursorDown);
    }
    if input.key_pressed(KeyCode::ArrowLeft) {
        commands.push(Command::Adjust { delta: -1, coarse });
    }
    if input.key_pressed(KeyCode::ArrowRight) {
        commands.push(Command::Adjust { delta: 1, coarse });
    }
    if input.key_pressed(KeyCode::Enter) || input.key_pressed(KeyCode::NumpadEnter) {
        commands.push(Command::Activate);
    }
    commands
}

pub fn apply(command: Command, state: &mut RenderState, panel: &mut Panel) {
    match command {
        Command::ZoomIn => state.zoom_in(),
        Command::ZoomOut => state.zoom_out(),
        Command::Wireframe | Command::Filled => {
            let mode = if command == Command::Wireframe {
                RasterMode::Wireframe
            } else {
                RasterMode::Filled
            };
            if state.raster != mode {
                state.raster = mode;
                log::info!("raster mode: {}", mode.name());
            }
        }
        Command::Preset(preset) => {
            state.camera.apply_preset(preset);
            log::info!("view: {}", preset.name());
        }
        Command::AddLight => {
            let _ = state.add_light();
        }
        Command::ToggleProjection => {
            state.projection = state.projection.toggled();
            log::info!("projection: {}", state.projection.name());
        }
        Command::TogglePanel => panel.visible = !panel.visible,
        Command::CursorUp => panel.move_cursor(state, -1),
        Command::CursorDown => panel.move_cursor(state, 1),
        Command::Adjust { delta, coarse } => panel.adjust(state, delta, coarse),
        Command::Activate => panel.activate(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MAX_VP_DISTANCE, MIN_VP_DISTANCE, ProjectionMode};
    use approx::assert_abs_diff_eq;

    #[test]
    fn letters_ignore_case() {
        assert_eq!(command_for_char('W'), Some(Command::Wireframe));
        assert_eq!(command_for_char('w'), Some(Command::Wireframe));
        assert_eq!(command_for_char('S'), Some(Command::Filled));
        assert_eq!(command_for_char('='), Some(Command::ZoomIn));
        assert_eq!(command_for_char('+'), Some(Command::ZoomIn));
        assert_eq!(command_for_char('x'), None);
    }

    #[test]
    fn digits_select_presets() {
        let presets: Vec<_> = ('1'..='5').filter_map(command_for_char).collect();
        let expected: Vec<_> = ViewPreset::ALL.into_iter().map(Command::Preset).collect();
        assert_eq!(presets, expected);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut state = RenderState::default();
        let mut panel = Panel::default();
        for _ in 0..20 {
            apply(Command::ZoomIn, &mut state, &mut panel);
        }
        assert_abs_diff_eq!(state.vp_distance, MIN_VP_DISTANCE);
        for _ in 0..20 {
            apply(Command::ZoomOut, &mut state, &mut panel);
        }
        assert_abs_diff_eq!(state.vp_distance, MAX_VP_DISTANCE);
    }

    #[test]
    fn raster_and_projection_switch() {
        let mut state = RenderState::default();
        let mut panel = Panel::default();
        apply(Command::Wireframe, &mut state, &mut panel);
        assert_eq!(state.raster, RasterMode::Wireframe);
        apply(Command::Filled, &mut state, &mut panel);
        assert_eq!(state.raster, RasterMode::Filled);

        apply(Command::ToggleProjection, &mut state, &mut panel);
        assert_eq!(state.projection, ProjectionMode::Orthographic);
    }

    #[test]
    fn add_light_key_respects_the_cap() {
        let mut state = RenderState::default();
        let mut panel = Panel::default();
        for _ in 0..9 {
            apply(Command::AddLight, &mut state, &mut panel);
        }
        assert_eq!(state.lights.len(), 8);
    }

    #[test]
    fn navigation_needs_a_visible_panel() {
        let mut input = Input::new();
        input.press(KeyCode::ShiftLeft, false);
        input.press(KeyCode::ArrowRight, false);
        input.type_char('h');

        assert_eq!(
            commands(&input, true),
            vec![
                Command::TogglePanel,
                Command::Adjust {
                    delta: 1,
                    coarse: true
                }
            ]
        );
        assert_eq!(commands(&input, false), vec![Command::TogglePanel]);
    }

    #[test]
    fn preset_moves_the_camera() {
        let mut state = RenderState::default();
        let mut panel = Panel::default();
        apply(Command::Preset(ViewPreset::Top), &mut state, &mut panel);
        let (eye, up) = ViewPreset::Top.pose();
        assert_eq!(state.camera.eye, eye);
        assert_eq!(state.camera.up, up);
    }
}
