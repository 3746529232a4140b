use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "liquidview",
    author,
    version,
    about = "Interactive liquid-distortion media viewer"
)]
pub struct Cli {
    /// Base image for the plane (PNG/JPEG). A procedural gradient is used
    /// when omitted.
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_window_size,
        default_value = "1280x720"
    )]
    pub size: (u32, u32),

    /// Spatial frequency of the distortion noise field.
    #[arg(long, value_name = "FACTOR", default_value_t = 2.0)]
    pub noise_scale: f32,

    /// Frequency of the ripple wave layered on the noise.
    #[arg(long, value_name = "FACTOR", default_value_t = 2.0)]
    pub ripple: f32,

    /// Overall displacement strength.
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub distortion: f32,

    /// Explicit vertical field of view in degrees; derived from the window
    /// height by default.
    #[arg(long, value_name = "DEGREES")]
    pub fov: Option<f32>,

    /// Camera distance from the plane, in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = 2000.0)]
    pub perspective: f32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_window_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width `{width}`"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height `{height}`"))?;
    if width == 0 || height == 0 {
        return Err(format!("window size must be non-zero, got `{value}`"));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sizes() {
        assert_eq!(parse_window_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_window_size("640X480"), Ok((640, 480)));
        assert_eq!(parse_window_size(" 800 x 600 "), Ok((800, 600)));
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert!(parse_window_size("1280").is_err());
        assert!(parse_window_size("axb").is_err());
        assert!(parse_window_size("0x720").is_err());
        assert!(parse_window_size("1280x0").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
