//! Named configurations of the same ocean core.
//!
//! Both presets run identical kernels; they only differ in numeric constants and
//! renderer switches.

use clap::ValueEnum;

use super::{ColorParameters, DepthOfFieldConfig, OrbitConfig, RenderConfig, WaveParameters};

/// Preset selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Explorable sea: orbit controls on, no antialiasing, shallow focus
    #[default]
    Interactive,

    /// Framed shot: fixed camera, 4x MSAA, calmer swell, deeper focus, capturable frames
    Still,
}

/// Everything a preset decides
#[derive(Debug, Clone)]
pub struct PresetSettings {
    pub wave: WaveParameters,
    pub color: ColorParameters,
    pub render: RenderConfig,
    pub orbit: OrbitConfig,
    pub depth_of_field: DepthOfFieldConfig,

    /// Keep presented frames readable (surface gets COPY_SRC usage)
    pub preserve_buffer: bool,
}

impl Preset {
    pub fn settings(self) -> PresetSettings {
        match self {
            Preset::Interactive => PresetSettings {
                wave: WaveParameters::default(),
                color: ColorParameters::default(),
                render: RenderConfig::default(),
                orbit: OrbitConfig::default(),
                depth_of_field: DepthOfFieldConfig::default(),
                preserve_buffer: false,
            },
            Preset::Still => PresetSettings {
                wave: WaveParameters {
                    big_elevation: 0.2,
                    big_speed: 0.6,
                    ..WaveParameters::default()
                },
                color: ColorParameters::default(),
                render: RenderConfig {
                    msaa_samples: 4,
                    ..RenderConfig::default()
                },
                orbit: OrbitConfig {
                    enabled: false,
                    ..OrbitConfig::default()
                },
                depth_of_field: DepthOfFieldConfig {
                    focus_distance: 0.05,
                    focal_length: 0.04,
                    bokeh_scale: 3.0,
                },
                preserve_buffer: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_share_color_defaults() {
        let interactive = Preset::Interactive.settings();
        let still = Preset::Still.settings();
        assert_eq!(interactive.color, still.color);
        assert_eq!(
            interactive.wave.small_iterations,
            still.wave.small_iterations
        );
    }

    #[test]
    fn test_still_preset_switches() {
        let still = Preset::Still.settings();
        assert!(!still.orbit.enabled);
        assert!(still.preserve_buffer);
        assert_eq!(still.render.msaa_samples, 4);
        assert!(Preset::Interactive.settings().orbit.enabled);
    }
}
