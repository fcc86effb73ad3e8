//! On-screen parameter panel.
//!
//! The panel is a flat list of [`Row`]s generated from collapsible [`Folder`]s over the
//! live [`RenderState`]. One row is under the cursor; it can be adjusted up or down by its
//! step (ten steps when coarse) or activated, which toggles folders and switches, cycles
//! the shape, or runs the "add light" action.

use std::collections::HashSet;

use glam::Vec3;

use crate::assets::FontAtlas;
use crate::overlay::{Color, Overlay};
use crate::scene::{LightRecord, Material, RenderState, Shape};

const AXES: [&str; 3] = ["x", "y", "z"];
const CHANNELS: [&str; 3] = ["r", "g", "b"];

const COLOR_STEP: f32 = 5.0 / 255.0;
const SHININESS_STEP: f32 = 1.0;
const FOVY_STEP: f32 = 1.0;
const CLIP_STEP: f32 = 0.1;
const CAMERA_VECTOR_STEP: f32 = 0.05;
const LIGHT_POSITION_STEP: f32 = 0.1;
const COARSE_FACTOR: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Folder {
    Object,
    Material,
    Options,
    Camera,
    Eye,
    At,
    Up,
    Lights,
    Light(usize),
}

impl Folder {
    pub fn title(self) -> String {
        match self {
            Folder::Object => "Object".to_string(),
            Folder::Material => "Material".to_string(),
            Folder::Options => "Options".to_string(),
            Folder::Camera => "Camera".to_string(),
            Folder::Eye => "Eye".to_string(),
            Folder::At => "At".to_string(),
            Folder::Up => "Up".to_string(),
            Folder::Lights => "Lights".to_string(),
            Folder::Light(i) => format!("Light{}", i + 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSlot {
    Ambient,
    Diffuse,
    Specular,
}

impl ColorSlot {
    pub const ALL: [ColorSlot; 3] = [ColorSlot::Ambient, ColorSlot::Diffuse, ColorSlot::Specular];

    fn material_label(self) -> &'static str {
        match self {
            ColorSlot::Ambient => "Ka",
            ColorSlot::Diffuse => "Kd",
            ColorSlot::Specular => "Ks",
        }
    }

    fn light_label(self) -> &'static str {
        match self {
            ColorSlot::Ambient => "ambient",
            ColorSlot::Diffuse => "diffuse",
            ColorSlot::Specular => "specular",
        }
    }

    fn material_color(self, material: &Material) -> Vec3 {
        match self {
            ColorSlot::Ambient => material.ambient,
            ColorSlot::Diffuse => material.diffuse,
            ColorSlot::Specular => material.specular,
        }
    }

    fn light_color(self, light: &LightRecord) -> Vec3 {
        match self {
            ColorSlot::Ambient => light.ambient,
            ColorSlot::Diffuse => light.diffuse,
            ColorSlot::Specular => light.specular,
        }
    }

    fn of_material(self, material: &mut Material) -> &mut Vec3 {
        match self {
            ColorSlot::Ambient => &mut material.ambient,
            ColorSlot::Diffuse => &mut material.diffuse,
            ColorSlot::Specular => &mut material.specular,
        }
    }

    fn of_light(self, light: &mut LightRecord) -> &mut Vec3 {
        match self {
            ColorSlot::Ambient => &mut light.ambient,
            ColorSlot::Diffuse => &mut light.diffuse,
            ColorSlot::Specular => &mut light.specular,
        }
    }
}

/// An editable value. Indices are axis / channel (0..3) and light index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Shape,
    MaterialColor(ColorSlot, usize),
    Shininess,
    BackfaceCulling,
    DepthTest,
    ShowLights,
    Fovy,
    Near,
    Far,
    Eye(usize),
    At(usize),
    Up(usize),
    LightPosition(usize, usize),
    LightColor(usize, ColorSlot, usize),
    LightDirectional(usize),
    LightActive(usize),
}

impl Field {
    fn step(self) -> f32 {
        match self {
            Field::MaterialColor(..) | Field::LightColor(..) => COLOR_STEP,
            Field::Shininess => SHININESS_STEP,
            Field::Fovy => FOVY_STEP,
            Field::Near | Field::Far => CLIP_STEP,
            Field::Eye(_) | Field::At(_) | Field::Up(_) => CAMERA_VECTOR_STEP,
            Field::LightPosition(..) => LIGHT_POSITION_STEP,
            _ => 0.0,
        }
    }

    fn is_switch(self) -> bool {
        matches!(
            self,
            Field::BackfaceCulling
                | Field::DepthTest
                | Field::ShowLights
                | Field::LightDirectional(_)
                | Field::LightActive(_)
        )
    }

    fn number(self, state: &RenderState) -> Option<f32> {
        let camera = &state.camera;
        Some(match self {
            Field::MaterialColor(slot, c) => slot.material_color(&state.material)[c],
            Field::Shininess => state.material.shininess,
            Field::Fovy => camera.fovy,
            Field::Near => camera.near(),
            Field::Far => camera.far(),
            Field::Eye(a) => camera.eye[a],
            Field::At(a) => camera.at[a],
            Field::Up(a) => camera.up[a],
            Field::LightPosition(i, a) => state.lights.get(i)?.position[a],
            Field::LightColor(i, slot, c) => slot.light_color(state.lights.get(i)?)[c],
            _ => return None,
        })
    }

    /// Writes a numeric value through the same clamps and hooks the panel applies.
    fn set_number(self, state: &mut RenderState, value: f32) {
        match self {
            Field::MaterialColor(slot, c) => {
                slot.of_material(&mut state.material)[c] = value.clamp(0.0, 1.0)
            }
            Field::Shininess => state.material.shininess = value.max(1.0),
            Field::Fovy => state.camera.set_fovy(value),
            Field::Near => state.camera.set_near(value),
            Field::Far => state.camera.set_far(value),
            Field::Eye(a) => state.camera.eye[a] = value,
            Field::At(a) => state.camera.at[a] = value,
            Field::Up(a) => state.camera.up[a] = value,
            Field::LightPosition(i, a) => {
                if let Some(light) = state.lights.get_mut(i) {
                    light.position[a] = value;
                }
            }
            Field::LightColor(i, slot, c) => {
                if let Some(light) = state.lights.get_mut(i) {
                    slot.of_light(light)[c] = value.clamp(0.0, 1.0);
                }
            }
            _ => {}
        }
    }

    fn flag(self, state: &RenderState) -> Option<bool> {
        match self {
            Field::BackfaceCulling => Some(state.options.backface_culling),
            Field::DepthTest => Some(state.options.depth_test),
            Field::ShowLights => Some(state.options.show_lights),
            Field::LightDirectional(i) => state.lights.get(i).map(|l| l.directional),
            Field::LightActive(i) => state.lights.get(i).map(|l| l.active),
            _ => None,
        }
    }

    fn switch(self, state: &mut RenderState) -> Option<&mut bool> {
        match self {
            Field::BackfaceCulling => Some(&mut state.options.backface_culling),
            Field::DepthTest => Some(&mut state.options.depth_test),
            Field::ShowLights => Some(&mut state.options.show_lights),
            Field::LightDirectional(i) => state.lights.get_mut(i).map(|l| &mut l.directional),
            Field::LightActive(i) => state.lights.get_mut(i).map(|l| &mut l.active),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Folder(Folder),
    Field(Field),
    AddLight,
}

impl Row {
    /// Indentation level.
    pub fn depth(self) -> usize {
        match self {
            Row::Folder(Folder::Light(_)) => 1,
            Row::Folder(_) => 0,
            Row::Field(
                Field::LightPosition(..)
                | Field::LightColor(..)
                | Field::LightDirectional(_)
                | Field::LightActive(_),
            ) => 2,
            Row::Field(_) | Row::AddLight => 1,
        }
    }
}

fn material_fields() -> impl Iterator<Item = Field> {
    ColorSlot::ALL
        .into_iter()
        .flat_map(|slot| (0..3).map(move |c| Field::MaterialColor(slot, c)))
        .chain(std::iter::once(Field::Shininess))
}

fn light_fields(i: usize) -> impl Iterator<Item = Field> {
    (0..3)
        .map(move |a| Field::LightPosition(i, a))
        .chain(
            ColorSlot::ALL
                .into_iter()
                .flat_map(move |slot| (0..3).map(move |c| Field::LightColor(i, slot, c))),
        )
        .chain([Field::LightDirectional(i), Field::LightActive(i)])
}

/// Cursor, folder state and visibility of the parameter panel.
#[derive(Clone, Debug)]
pub struct Panel {
    pub visible: bool,
    cursor: usize,
    collapsed: HashSet<Folder>,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            visible: true,
            cursor: 0,
            collapsed: [Folder::Eye, Folder::At, Folder::Up].into_iter().collect(),
        }
    }
}

impl Panel {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            ..Default::default()
        }
    }

    pub fn is_open(&self, folder: Folder) -> bool {
        !self.collapsed.contains(&folder)
    }

    pub fn set_open(&mut self, folder: Folder, open: bool) {
        if open {
            self.collapsed.remove(&folder);
        } else {
            self.collapsed.insert(folder);
        }
    }

    fn section(&self, rows: &mut Vec<Row>, folder: Folder, fields: impl IntoIterator<Item = Field>) {
        rows.push(Row::Folder(folder));
        if self.is_open(folder) {
            rows.extend(fields.into_iter().map(Row::Field));
        }
    }

    /// The visible rows, top to bottom.
    pub fn rows(&self, state: &RenderState) -> Vec<Row> {
        let mut rows = Vec::new();
        self.section(&mut rows, Folder::Object, [Field::Shape]);
        self.section(&mut rows, Folder::Material, material_fields());
        self.section(
            &mut rows,
            Folder::Options,
            [Field::BackfaceCulling, Field::DepthTest, Field::ShowLights],
        );
        self.section(&mut rows, Folder::Camera, [Field::Fovy, Field::Near, Field::Far]);
        self.section(&mut rows, Folder::Eye, (0..3).map(Field::Eye));
        self.section(&mut rows, Folder::At, (0..3).map(Field::At));
        self.section(&mut rows, Folder::Up, (0..3).map(Field::Up));

        rows.push(Row::Folder(Folder::Lights));
        if self.is_open(Folder::Lights) {
            rows.push(Row::AddLight);
            for i in 0..state.lights.len() {
                self.section(&mut rows, Folder::Light(i), light_fields(i));
            }
        }
        rows
    }

    /// Cursor position, clamped to the current rows.
    pub fn cursor(&self, state: &RenderState) -> usize {
        self.cursor.min(self.rows(state).len().saturating_sub(1))
    }

    pub fn current_row(&self, state: &RenderState) -> Option<Row> {
        self.rows(state).get(self.cursor(state)).copied()
    }

    pub fn move_cursor(&mut self, state: &RenderState, delta: i32) {
        let last = self.rows(state).len().saturating_sub(1) as i64;
        let next = (self.cursor(state) as i64 + delta as i64).clamp(0, last);
        self.cursor = next as usize;
    }

    /// Nudges the row under the cursor by `delta` steps.
    ///
    /// Folders open on a positive delta and close on a negative one; switches toggle; the
    /// shape cycles.
    pub fn adjust(&mut self, state: &mut RenderState, delta: i32, coarse: bool) {
        if delta == 0 {
            return;
        }
        let Some(row) = self.current_row(state) else {
            return;
        };

        match row {
            Row::Folder(folder) => self.set_open(folder, delta > 0),
            Row::AddLight => {
                if delta > 0 {
                    let _ = state.add_light();
                }
            }
            Row::Field(Field::Shape) => {
                let shape = state.material.shape.map(|s| if delta > 0 { s.next() } else { s.prev() });
                state.material.shape = shape.or(Some(Shape::ALL[0]));
                log::info!("shape: {}", describe_shape(state));
            }
            Row::Field(field) if field.is_switch() => {
                if let Some(flag) = field.switch(state) {
                    *flag = !*flag;
                }
            }
            Row::Field(field) => {
                let factor = if coarse { COARSE_FACTOR } else { 1.0 };
                if let Some(value) = field.number(state) {
                    field.set_number(state, value + delta as f32 * field.step() * factor);
                }
            }
        }
    }

    /// Enter on the row under the cursor.
    pub fn activate(&mut self, state: &mut RenderState) {
        let Some(row) = self.current_row(state) else {
            return;
        };
        match row {
            Row::Folder(folder) => {
                let open = self.is_open(folder);
                self.set_open(folder, !open);
            }
            Row::AddLight => {
                if let Ok(index) = state.add_light() {
                    self.set_open(Folder::Light(index), true);
                }
            }
            Row::Field(_) => self.adjust(state, 1, false),
        }
    }

    /// Label and value text of a row.
    pub fn describe(&self, row: Row, state: &RenderState) -> (String, String) {
        match row {
            Row::Folder(folder) => {
                let marker = if self.is_open(folder) { "-" } else { "+" };
                (folder.title(), marker.to_string())
            }
            Row::AddLight => (
                "add light".to_string(),
                format!("{}/{}", state.lights.len(), state.lights.max()),
            ),
            Row::Field(field) => {
                let label = field_label(field);
                let value = match field {
                    Field::Shape => describe_shape(state),
                    Field::MaterialColor(..) | Field::LightColor(..) => {
                        let v = field.number(state).unwrap_or(0.0);
                        format!("{}", (v * 255.0).round() as i32)
                    }
                    Field::Shininess | Field::Fovy => {
                        format!("{:.0}", field.number(state).unwrap_or(0.0))
                    }
                    f if f.is_switch() => match f.flag(state) {
                        Some(true) => "on".to_string(),
                        _ => "off".to_string(),
                    },
                    f => format!("{:.2}", f.number(state).unwrap_or(0.0)),
                };
                (label, value)
            }
        }
    }

    /// Bar fill in `[0, 1]` for rows that have one.
    fn fraction(row: Row, state: &RenderState) -> Option<f32> {
        let Row::Field(field) = row else {
            return None;
        };
        if field.is_switch() {
            return field.flag(state).map(|on| if on { 1.0 } else { 0.0 });
        }
        let value = field.number(state)?;
        let max = match field {
            Field::MaterialColor(..) | Field::LightColor(..) => 1.0,
            Field::Shininess => 200.0,
            Field::Fovy => 100.0,
            Field::Near | Field::Far => crate::camera::MAX_CLIP,
            _ => return None,
        };
        Some((value / max).clamp(0.0, 1.0))
    }

    /// Draws the panel into `overlay`. Without a font only the value bars are drawn.
    pub fn render(
        &self,
        overlay: &mut Overlay,
        font: Option<&FontAtlas>,
        state: &RenderState,
        screen_height: f32,
    ) {
        if !self.visible {
            return;
        }

        const X: f32 = 10.0;
        const Y: f32 = 10.0;
        const WIDTH: f32 = 300.0;
        const INDENT: f32 = 12.0;
        const BAR_WIDTH: f32 = 90.0;

        let row_height = font.map_or(18.0, |f| f.line_height().ceil() + 2.0);
        let rows = self.rows(state);
        let cursor = self.cursor(state);

        let available = (screen_height - 2.0 * Y - row_height).max(row_height);
        let visible = ((available / row_height) as usize).max(1);
        let first = (cursor + 1).saturating_sub(visible);
        let shown = &rows[first..rows.len().min(first + visible)];

        let height = row_height * (shown.len() + 1) as f32;
        overlay.rect(X, Y, WIDTH, height, Color::PANEL_BG);
        overlay.rect(X, Y, WIDTH, row_height, Color::PANEL_TITLE);
        if let Some(font) = font {
            let title = format!(
                "Parameters  {} / {}",
                state.projection.name(),
                state.raster.name()
            );
            overlay.text(font, X + 6.0, Y + 1.0, &title, Color::WHITE);
        }

        for (i, row) in shown.iter().enumerate() {
            let y = Y + row_height * (i + 1) as f32;
            if first + i == cursor {
                overlay.rect(X, y, WIDTH, row_height, Color::PANEL_CURSOR);
            }

            let indent = X + 6.0 + INDENT * row.depth() as f32;
            if let Some(fraction) = Self::fraction(*row, state) {
                let bar_x = X + WIDTH - BAR_WIDTH - 6.0;
                overlay.rect(bar_x, y + 3.0, BAR_WIDTH, row_height - 6.0, Color::PANEL_TITLE);
                let fill = match row {
                    Row::Field(Field::MaterialColor(slot, _)) => {
                        Color::from(slot.material_color(&state.material))
                    }
                    _ => Color::PANEL_MUTED,
                };
                overlay.rect(bar_x, y + 3.0, BAR_WIDTH * fraction, row_height - 6.0, fill);
            }

            if let Some(font) = font {
                let (label, value) = self.describe(*row, state);
                let color = match row {
                    Row::Folder(_) => Color::WHITE,
                    _ => Color::PANEL_TEXT,
                };
                overlay.text(font, indent, y + 1.0, &label, color);
                let value_x = X + WIDTH - 6.0 - BAR_WIDTH - 8.0 - font.measure(&value);
                overlay.text(font, value_x, y + 1.0, &value, Color::PANEL_MUTED);
            }
        }
    }
}

fn describe_shape(state: &RenderState) -> String {
    state
        .material
        .shape
        .map_or_else(|| "(none)".to_string(), |s| s.name().to_string())
}

fn field_label(field: Field) -> String {
    match field {
        Field::Shape => "shape".to_string(),
        Field::MaterialColor(slot, c) => format!("{} {}", slot.material_label(), CHANNELS[c]),
        Field::Shininess => "shininess".to_string(),
        Field::BackfaceCulling => "backface culling".to_string(),
        Field::DepthTest => "depth test".to_string(),
        Field::ShowLights => "show lights".to_string(),
        Field::Fovy => "fovy".to_string(),
        Field::Near => "near".to_string(),
        Field::Far => "far".to_string(),
        Field::Eye(a) | Field::At(a) | Field::Up(a) => AXES[a].to_string(),
        Field::LightPosition(_, a) => format!("position {}", AXES[a]),
        Field::LightColor(_, slot, c) => format!("{} {}", slot.light_label(), CHANNELS[c]),
        Field::LightDirectional(_) => "directional".to_string(),
        Field::LightActive(_) => "active".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn select(panel: &mut Panel, state: &RenderState, row: Row) {
        let index = panel
            .rows(state)
            .iter()
            .position(|r| *r == row)
            .expect("row not visible");
        panel.cursor = index;
    }

    #[test]
    fn default_rows_follow_folder_order() {
        let panel = Panel::default();
        let state = RenderState::default();
        let folders: Vec<Folder> = panel
            .rows(&state)
            .into_iter()
            .filter_map(|r| match r {
                Row::Folder(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(
            folders,
            vec![
                Folder::Object,
                Folder::Material,
                Folder::Options,
                Folder::Camera,
                Folder::Eye,
                Folder::At,
                Folder::Up,
                Folder::Lights,
                Folder::Light(0),
            ]
        );
    }

    #[test]
    fn collapsing_a_folder_hides_its_fields() {
        let mut panel = Panel::default();
        let state = RenderState::default();
        let before = panel.rows(&state).len();

        panel.set_open(Folder::Material, false);

        assert_eq!(panel.rows(&state).len(), before - 10);
        assert!(!panel.rows(&state).contains(&Row::Field(Field::Shininess)));
    }

    #[test]
    fn cursor_stays_in_range() {
        let mut panel = Panel::default();
        let state = RenderState::default();
        panel.move_cursor(&state, -5);
        assert_eq!(panel.cursor(&state), 0);
        panel.move_cursor(&state, 10_000);
        assert_eq!(panel.cursor(&state), panel.rows(&state).len() - 1);

        panel.set_open(Folder::Lights, false);
        assert_eq!(panel.cursor(&state), panel.rows(&state).len() - 1);
    }

    #[test]
    fn color_channels_step_by_five_of_255() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        select(&mut panel, &state, Row::Field(Field::MaterialColor(ColorSlot::Diffuse, 1)));

        panel.adjust(&mut state, 1, false);
        assert_abs_diff_eq!(state.material.diffuse.y, 105.0 / 255.0, epsilon = 1e-6);

        panel.adjust(&mut state, 1, true);
        assert_abs_diff_eq!(state.material.diffuse.y, 155.0 / 255.0, epsilon = 1e-6);

        let (label, value) = panel.describe(panel.current_row(&state).unwrap(), &state);
        assert_eq!(label, "Kd g");
        assert_eq!(value, "155");

        for _ in 0..10 {
            panel.adjust(&mut state, 1, true);
        }
        assert_abs_diff_eq!(state.material.diffuse.y, 1.0);
    }

    #[test]
    fn shininess_never_drops_below_one() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        select(&mut panel, &state, Row::Field(Field::Shininess));
        for _ in 0..10 {
            panel.adjust(&mut state, -1, true);
        }
        assert_abs_diff_eq!(state.material.shininess, 1.0);
    }

    #[test]
    fn near_far_go_through_camera_hooks() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        state.camera.set_far(2.0);
        select(&mut panel, &state, Row::Field(Field::Near));

        for _ in 0..10 {
            panel.adjust(&mut state, 1, true);
        }

        assert_abs_diff_eq!(state.camera.near(), 1.5, epsilon = 1e-5);
    }

    #[test]
    fn eye_moves_in_small_steps() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        panel.set_open(Folder::Eye, true);
        select(&mut panel, &state, Row::Field(Field::Eye(2)));
        panel.adjust(&mut state, -1, false);
        assert_abs_diff_eq!(state.camera.eye.z, 4.95, epsilon = 1e-6);
    }

    #[test]
    fn switches_toggle_on_activate() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        select(&mut panel, &state, Row::Field(Field::ShowLights));
        panel.activate(&mut state);
        assert!(state.options.show_lights);
        let (_, value) = panel.describe(Row::Field(Field::ShowLights), &state);
        assert_eq!(value, "on");
    }

    #[test]
    fn shape_cycles_both_ways() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        select(&mut panel, &state, Row::Field(Field::Shape));
        panel.adjust(&mut state, 1, false);
        assert_eq!(state.material.shape, Some(Shape::Pyramid));
        panel.adjust(&mut state, -1, false);
        panel.adjust(&mut state, -1, false);
        assert_eq!(state.material.shape, Some(Shape::Sphere));
    }

    #[test]
    fn unset_shape_is_selectable_from_the_panel() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        state.material.shape = None;
        assert_eq!(panel.describe(Row::Field(Field::Shape), &state).1, "(none)");
        select(&mut panel, &state, Row::Field(Field::Shape));
        panel.activate(&mut state);
        assert_eq!(state.material.shape, Some(Shape::Cube));
    }

    #[test]
    fn add_light_stops_at_the_cap() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        select(&mut panel, &state, Row::AddLight);

        for _ in 0..20 {
            panel.activate(&mut state);
        }

        assert_eq!(state.lights.len(), 8);
        assert!(panel.rows(&state).contains(&Row::Folder(Folder::Light(7))));
        assert_eq!(panel.describe(Row::AddLight, &state).1, "8/8");
    }

    #[test]
    fn light_fields_edit_the_right_light() {
        let mut panel = Panel::default();
        let mut state = RenderState::default();
        state.add_light().unwrap();
        panel.set_open(Folder::Light(1), true);

        select(&mut panel, &state, Row::Field(Field::LightPosition(1, 0)));
        panel.adjust(&mut state, 1, false);
        select(&mut panel, &state, Row::Field(Field::LightActive(1)));
        panel.activate(&mut state);

        let first = state.lights.get(0).unwrap();
        let second = state.lights.get(1).unwrap();
        assert_abs_diff_eq!(first.position.x, 0.0);
        assert_abs_diff_eq!(second.position.x, 0.1, epsilon = 1e-6);
        assert!(first.active);
        assert!(!second.active);
    }

    #[test]
    fn rows_indent_by_nesting() {
        assert_eq!(Row::Folder(Folder::Camera).depth(), 0);
        assert_eq!(Row::Field(Field::Fovy).depth(), 1);
        assert_eq!(Row::Folder(Folder::Light(2)).depth(), 1);
        assert_eq!(Row::Field(Field::LightActive(2)).depth(), 2);
    }
}
