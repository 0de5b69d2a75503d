//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use raging_sea::panel::{Control, ControlId, ParameterPanel};
use raging_sea::params::{Preset, RecordingConfig, Rgb};
use raging_sea::preview::{NoiseSource, PreviewConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "raging-sea")]
#[command(about = "Animated procedural ocean with depth of field", long_about = None)]
pub struct Args {
    /// Parameter preset
    #[arg(long, value_enum, default_value_t = Preset::Interactive)]
    pub preset: Preset,

    /// uBigWavesElevation override
    #[arg(long, value_name = "VALUE")]
    pub big_elevation: Option<f32>,

    /// uBigWavesFrequencyX override
    #[arg(long, value_name = "VALUE")]
    pub big_frequency_x: Option<f32>,

    /// uBigWavesFrequencyY override
    #[arg(long, value_name = "VALUE")]
    pub big_frequency_y: Option<f32>,

    /// uBigWavesSpeed override
    #[arg(long, value_name = "VALUE")]
    pub big_speed: Option<f32>,

    /// uSmallWavesElevation override
    #[arg(long, value_name = "VALUE")]
    pub small_elevation: Option<f32>,

    /// uSmallWavesFrequency override
    #[arg(long, value_name = "VALUE")]
    pub small_frequency: Option<f32>,

    /// uSmallWavesSpeed override
    #[arg(long, value_name = "VALUE")]
    pub small_speed: Option<f32>,

    /// uSmallIterations override (0-5)
    #[arg(long, value_name = "COUNT")]
    pub small_iterations: Option<u32>,

    /// uColorOffset override
    #[arg(long, value_name = "VALUE")]
    pub color_offset: Option<f32>,

    /// uColorMultiplier override
    #[arg(long, value_name = "VALUE")]
    pub color_multiplier: Option<f32>,

    /// Trough color as #rrggbb
    #[arg(long, value_name = "HEX")]
    pub depth_color: Option<Rgb>,

    /// Crest color as #rrggbb
    #[arg(long, value_name = "HEX")]
    pub surface_color: Option<Rgb>,

    /// Record frames to recording/frames at fixed fps (duration in seconds), then exit
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Render a top-down still on the CPU to this PNG and exit (no window)
    #[arg(long, value_name = "PATH")]
    pub preview: Option<PathBuf>,

    /// Preview width and height in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 512)]
    pub preview_size: u32,

    /// Preview time in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Noise source for the preview
    #[arg(long, value_enum, default_value_t = NoiseSource::Gradient)]
    pub noise: NoiseSource,

    /// Preview elevation as grayscale instead of color
    #[arg(long)]
    pub heightmap: bool,
}

impl Args {
    /// Write command-line overrides into the panel, clamped and snapped like panel edits
    pub fn apply_overrides(&self, panel: &mut ParameterPanel) {
        let sliders = [
            (ControlId::BigWavesElevation, self.big_elevation),
            (ControlId::BigWavesFrequencyX, self.big_frequency_x),
            (ControlId::BigWavesFrequencyY, self.big_frequency_y),
            (ControlId::BigWavesSpeed, self.big_speed),
            (ControlId::SmallWavesElevation, self.small_elevation),
            (ControlId::SmallWavesFrequency, self.small_frequency),
            (ControlId::SmallWavesSpeed, self.small_speed),
            (
                ControlId::SmallIterations,
                self.small_iterations.map(|n| n as f32),
            ),
            (ControlId::ColorOffset, self.color_offset),
            (ControlId::ColorMultiplier, self.color_multiplier),
        ];

        for (id, value) in sliders {
            let Some(requested) = value else { continue };
            let stored = panel.set(id, requested);
            if (stored - requested).abs() > 1e-4 {
                log::warn!(
                    "{} {} out of range or off-step, using {}",
                    Control::by_id(id).name,
                    requested,
                    stored
                );
            }
        }

        if let Some(rgb) = self.depth_color {
            panel.set_color(ControlId::DepthColor, rgb);
        }
        if let Some(rgb) = self.surface_color {
            panel.set_color(ControlId::SurfaceColor, rgb);
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> std::io::Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };

        let config = RecordingConfig::new(duration);
        std::fs::create_dir_all(config.frames_dir())?;
        Ok(Some(config))
    }

    pub fn preview_config(&self) -> PreviewConfig {
        PreviewConfig {
            size: self.preview_size.max(1),
            heightmap: self.heightmap,
            ..PreviewConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raging_sea::panel::ControlValue;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("raging-sea").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn panel_for(args: &Args) -> ParameterPanel {
        let settings = args.preset.settings();
        let mut panel = ParameterPanel::new(settings.wave, settings.color);
        args.apply_overrides(&mut panel);
        panel
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.preset, Preset::Interactive);
        assert_eq!(args.noise, NoiseSource::Gradient);
        assert!(args.record.is_none());
        assert!(args.preview.is_none());
        assert_eq!(args.preview_size, 512);
    }

    #[test]
    fn test_preset_and_noise_values() {
        let args = parse(&["--preset", "still", "--noise", "perlin"]);
        assert_eq!(args.preset, Preset::Still);
        assert_eq!(args.noise, NoiseSource::Perlin);
        assert!(Args::try_parse_from(["raging-sea", "--preset", "stormy"]).is_err());
    }

    #[test]
    fn test_overrides_clamp_through_panel() {
        let args = parse(&["--big-elevation", "3.5", "--small-iterations", "9"]);
        let panel = panel_for(&args);
        assert_eq!(panel.wave().big_elevation, 1.0);
        assert_eq!(panel.wave().small_iterations, 5);
    }

    #[test]
    fn test_hex_colors_parse() {
        let args = parse(&["--depth-color", "#ff0000"]);
        let panel = panel_for(&args);
        assert_eq!(
            panel.value(ControlId::DepthColor),
            ControlValue::Color(Rgb::from_hex("ff0000").unwrap())
        );
        assert!(Args::try_parse_from(["raging-sea", "--surface-color", "#12345"]).is_err());
    }

    #[test]
    fn test_preview_config() {
        let args = parse(&["--preview", "sea.png", "--preview-size", "64", "--heightmap"]);
        let config = args.preview_config();
        assert_eq!(config.size, 64);
        assert!(config.heightmap);
        assert_eq!(args.preview, Some(PathBuf::from("sea.png")));
    }
}
