//! Live parameter panel.
//!
//! Every wave and color parameter is exposed as a named, range-bounded control. Edits
//! are clamped to the range, snapped to the step and written straight into the live
//! parameters; the frame driver picks them up in its next snapshot.

use crate::frame::FrameSnapshot;
use crate::params::{ColorParameters, Rgb, WaveParameters, MAX_SMALL_ITERATIONS};

/// Identifies one panel control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    BigWavesElevation,
    BigWavesFrequencyX,
    BigWavesFrequencyY,
    BigWavesSpeed,
    SmallWavesElevation,
    SmallWavesFrequency,
    SmallWavesSpeed,
    SmallIterations,
    ColorOffset,
    ColorMultiplier,
    DepthColor,
    SurfaceColor,
}

/// Value domain of a control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, step: f32 },
    Color,
}

#[derive(Debug, Clone, Copy)]
pub struct Control {
    pub id: ControlId,
    pub name: &'static str,
    pub kind: ControlKind,
}

const fn slider(id: ControlId, name: &'static str, min: f32, max: f32, step: f32) -> Control {
    Control {
        id,
        name,
        kind: ControlKind::Slider { min, max, step },
    }
}

/// Panel layout, in display order
pub const CONTROLS: [Control; 12] = [
    slider(ControlId::BigWavesElevation, "uBigWavesElevation", 0.0, 1.0, 0.001),
    slider(ControlId::BigWavesFrequencyX, "uBigWavesFrequencyX", 0.0, 10.0, 0.001),
    slider(ControlId::BigWavesFrequencyY, "uBigWavesFrequencyY", 0.0, 10.0, 0.001),
    slider(ControlId::BigWavesSpeed, "uBigWavesSpeed", 0.0, 4.0, 0.001),
    slider(ControlId::SmallWavesElevation, "uSmallWavesElevation", 0.0, 1.0, 0.001),
    slider(ControlId::SmallWavesFrequency, "uSmallWavesFrequency", 0.0, 30.0, 0.001),
    slider(ControlId::SmallWavesSpeed, "uSmallWavesSpeed", 0.0, 4.0, 0.001),
    slider(
        ControlId::SmallIterations,
        "uSmallIterations",
        0.0,
        MAX_SMALL_ITERATIONS as f32,
        1.0,
    ),
    slider(ControlId::ColorOffset, "uColorOffset", 0.0, 1.0, 0.001),
    slider(ControlId::ColorMultiplier, "uColorMultiplier", 0.0, 10.0, 0.001),
    Control {
        id: ControlId::DepthColor,
        name: "depthColor",
        kind: ControlKind::Color,
    },
    Control {
        id: ControlId::SurfaceColor,
        name: "surfaceColor",
        kind: ControlKind::Color,
    },
];

impl Control {
    /// Look a control up by its panel name
    pub fn by_name(name: &str) -> Option<&'static Control> {
        CONTROLS.iter().find(|c| c.name == name)
    }

    pub fn by_id(id: ControlId) -> &'static Control {
        // CONTROLS lists every ControlId exactly once, in declaration order
        &CONTROLS[id as usize]
    }

    /// Clamp to range, then snap to the step grid
    pub fn quantize(&self, value: f32) -> f32 {
        match self.kind {
            ControlKind::Slider { min, max, step } => {
                if value.is_nan() {
                    return min;
                }
                // Snap in f64 and divide by the whole inverse step, so on-grid values such
                // as 0.95 land on the same f32 the literal produces
                let steps = ((value.clamp(min, max) - min) as f64 / step as f64).round();
                let offset = if step < 1.0 {
                    steps / (1.0 / step as f64).round()
                } else {
                    steps * step as f64
                };
                ((min as f64 + offset) as f32).clamp(min, max)
            }
            ControlKind::Color => value,
        }
    }
}

/// Current value of a control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Color(Rgb),
}

impl std::fmt::Display for ControlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlValue::Number(v) => write!(f, "{v:.3}"),
            ControlValue::Color(c) => write!(f, "{c}"),
        }
    }
}

/// Live parameters plus the panel's selection and text-entry state
pub struct ParameterPanel {
    wave: WaveParameters,
    color: ColorParameters,
    defaults: (WaveParameters, ColorParameters),
    selected: usize,
    hex_entry: String,
}

impl ParameterPanel {
    pub fn new(wave: WaveParameters, color: ColorParameters) -> Self {
        Self {
            wave,
            color,
            defaults: (wave, color),
            selected: 0,
            hex_entry: String::new(),
        }
    }

    pub fn wave(&self) -> &WaveParameters {
        &self.wave
    }

    pub fn color(&self) -> &ColorParameters {
        &self.color
    }

    /// Capture the live parameters for one frame
    pub fn snapshot(&self, time_s: f32) -> FrameSnapshot {
        FrameSnapshot::capture(time_s, &self.wave, &self.color)
    }

    pub fn selected(&self) -> &'static Control {
        &CONTROLS[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % CONTROLS.len();
        self.hex_entry.clear();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + CONTROLS.len() - 1) % CONTROLS.len();
        self.hex_entry.clear();
    }

    pub fn value(&self, id: ControlId) -> ControlValue {
        use ControlId::*;
        let w = &self.wave;
        let c = &self.color;
        match id {
            BigWavesElevation => ControlValue::Number(w.big_elevation),
            BigWavesFrequencyX => ControlValue::Number(w.big_frequency[0]),
            BigWavesFrequencyY => ControlValue::Number(w.big_frequency[1]),
            BigWavesSpeed => ControlValue::Number(w.big_speed),
            SmallWavesElevation => ControlValue::Number(w.small_elevation),
            SmallWavesFrequency => ControlValue::Number(w.small_frequency),
            SmallWavesSpeed => ControlValue::Number(w.small_speed),
            SmallIterations => ControlValue::Number(w.small_iterations as f32),
            ColorOffset => ControlValue::Number(c.color_offset),
            ColorMultiplier => ControlValue::Number(c.color_multiplier),
            DepthColor => ControlValue::Color(c.depth_color),
            SurfaceColor => ControlValue::Color(c.surface_color),
        }
    }

    /// Set a slider; returns the value actually stored after clamping and snapping
    ///
    /// Color controls ignore numeric input and return NaN.
    pub fn set(&mut self, id: ControlId, value: f32) -> f32 {
        use ControlId::*;
        let control = Control::by_id(id);
        let v = control.quantize(value);
        let w = &mut self.wave;
        let c = &mut self.color;
        match id {
            BigWavesElevation => w.big_elevation = v,
            BigWavesFrequencyX => w.big_frequency[0] = v,
            BigWavesFrequencyY => w.big_frequency[1] = v,
            BigWavesSpeed => w.big_speed = v,
            SmallWavesElevation => w.small_elevation = v,
            SmallWavesFrequency => w.small_frequency = v,
            SmallWavesSpeed => w.small_speed = v,
            SmallIterations => w.small_iterations = v as u32,
            ColorOffset => c.color_offset = v,
            ColorMultiplier => c.color_multiplier = v,
            DepthColor | SurfaceColor => return f32::NAN,
        }

        log::info!("{} = {:.3}", control.name, v);
        v
    }

    /// Set a color picker; sliders ignore it
    pub fn set_color(&mut self, id: ControlId, rgb: Rgb) {
        match id {
            ControlId::DepthColor => self.color.depth_color = rgb,
            ControlId::SurfaceColor => self.color.surface_color = rgb,
            _ => return,
        }
        log::info!("{} = {}", Control::by_id(id).name, rgb);
    }

    /// Step the selected control: coarse is 1% of its range, fine is one step
    pub fn nudge(&mut self, direction: i32, fine: bool) {
        let control = self.selected();
        let ControlKind::Slider { min, max, step } = control.kind else {
            return;
        };
        let ControlValue::Number(current) = self.value(control.id) else {
            return;
        };

        let amount = if fine {
            step
        } else {
            ((max - min) / 100.0).max(step)
        };
        self.set(control.id, current + amount * direction.signum() as f32);
    }

    /// Restore the selected control to its preset value
    pub fn reset_selected(&mut self) {
        let id = self.selected().id;
        let (wave, color) = self.defaults;
        let defaults = ParameterPanel::new(wave, color);
        match defaults.value(id) {
            ControlValue::Number(v) => {
                self.set(id, v);
            }
            ControlValue::Color(rgb) => self.set_color(id, rgb),
        }
        self.hex_entry.clear();
    }

    /// Restore every control to its preset value
    pub fn reset_all(&mut self) {
        (self.wave, self.color) = self.defaults;
        self.hex_entry.clear();
        log::info!("Panel reset to preset values");
    }

    /// Feed typed text while a color picker is selected
    pub fn type_text(&mut self, text: &str) {
        if self.selected().kind != ControlKind::Color {
            return;
        }
        for ch in text.chars().filter(|c| c.is_ascii_hexdigit() || *c == '#') {
            if ch == '#' {
                self.hex_entry.clear();
            } else if self.hex_entry.len() < 6 {
                self.hex_entry.push(ch.to_ascii_lowercase());
            }
        }
    }

    pub fn backspace_text(&mut self) -> bool {
        self.hex_entry.pop().is_some()
    }

    /// Apply the typed hex to the selected color picker
    pub fn commit_text(&mut self) {
        let id = self.selected().id;
        match Rgb::from_hex(&self.hex_entry) {
            Ok(rgb) => self.set_color(id, rgb),
            Err(e) => log::warn!("{}: {}", self.selected().name, e),
        }
        self.hex_entry.clear();
    }

    /// One-line description of the selected control (window title)
    pub fn status_line(&self) -> String {
        let control = self.selected();
        if !self.hex_entry.is_empty() {
            return format!("{}: #{}_", control.name, self.hex_entry);
        }
        format!("{} = {}", control.name, self.value(control.id))
    }

    /// All controls and their current values
    pub fn describe(&self) -> String {
        CONTROLS
            .iter()
            .map(|c| format!("  {:<22} {}", c.name, self.value(c.id)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
