//! Standalone CLI: snapshot CSV in, glyph scene JSON out
//!
//! Run with: cargo run --bin nbody-cli -- -f run/data.007.csv

use clap::Parser;
use nbody_vis::core::{
    output_name, Camera, HeaderMode, JsonSceneWriter, MapError, MapResult, MapperConfig,
    NormalizationPolicy, ParticleRadiusMapper, PolicyKind, ScalarSource, Scene, SceneOptions,
    SceneSink, UniformMass, Vec3,
};
use nbody_vis::core::{image_name, scene::DEFAULT_MAGNIFICATION};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "Map N-body snapshot masses to glyph radii", long_about = None)]
struct Args {
    /// Snapshot CSV to read
    #[arg(short, long)]
    filename: PathBuf,

    /// Enable debug logging
    #[arg(short = 'g', long)]
    debug: bool,

    /// Show the center axes
    #[arg(long)]
    axes: bool,

    /// Location of the camera
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    eye: Option<Vec<f64>>,

    /// Location the camera focuses on
    #[arg(long = "ref", num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    focal_point: Option<Vec<f64>>,

    /// View "up" direction
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    vup: Option<Vec<f64>>,

    /// linear-to-max, linear-to-global-max-scaled or min-radius-offset
    #[arg(long)]
    policy: Option<PolicyKind>,

    /// linear-to-max: radius of the heaviest particle
    #[arg(long)]
    scale: Option<f64>,

    /// linear-to-global-max-scaled: divisor applied to the largest mass
    #[arg(long)]
    divisor: Option<f64>,

    /// min-radius-offset: radius of the lightest particle
    #[arg(long)]
    min_radius: Option<f64>,

    /// min-radius-offset: spread factor
    #[arg(long)]
    k: Option<f64>,

    /// Radius for every particle when all masses are equal (default: fail)
    #[arg(long)]
    uniform_radius: Option<f64>,

    /// Skip lines starting with this character instead of an `x,...` header
    #[arg(long)]
    comment: Option<char>,

    /// Fail when the snapshot has no mass column
    #[arg(long)]
    require_mass: bool,

    /// none, mass, radius or speed
    #[arg(long, default_value = "mass")]
    color_by: ScalarSource,

    /// Add a histogram of the color scalar with this many bins
    #[arg(long)]
    bins: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_MAGNIFICATION)]
    magnification: u32,

    /// Mapper config (JSON); flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene file to write, `-` for stdout [default: <basename>.json]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "info,nbody_vis=debug"
    } else {
        "info,nbody_vis=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!(error = %e, file = %args.filename.display(), "Snapshot mapping failed");
        return Err(e.into());
    }
    Ok(())
}

fn run(args: &Args) -> MapResult<()> {
    let config = mapper_config(args)?;
    info!(
        policy = %config.policy.kind(),
        header = ?config.header,
        "Mapping snapshot"
    );

    let mapper = ParticleRadiusMapper::new(config)?;
    let mapped = mapper.map_file(&args.filename)?;

    let options = scene_options(args)?;
    let scene = Scene::from_mapped(image_name(&args.filename), &mapped, &options)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_name(&args.filename, "json")));

    if output == Path::new("-") {
        JsonSceneWriter::new(std::io::stdout().lock()).present(&scene)
    } else {
        let file = BufWriter::new(File::create(&output)?);
        JsonSceneWriter::new(file).present(&scene)?;
        info!(path = %output.display(), image = %scene.image, "Done");
        Ok(())
    }
}

/// Config file (if any) with command-line flags layered on top
fn mapper_config(args: &Args) -> MapResult<MapperConfig> {
    let mut config = match &args.config {
        Some(path) => MapperConfig::from_json_file(path)?,
        None => MapperConfig::default(),
    };

    if let Some(marker) = args.comment {
        config.header = HeaderMode::CommentMarker { marker };
    }

    let mut policy = args
        .policy
        .map(PolicyKind::with_defaults)
        .unwrap_or(config.policy);

    match &mut policy {
        NormalizationPolicy::LinearToMax { scale } => {
            override_param(scale, args.scale);
        }
        NormalizationPolicy::LinearToGlobalMaxScaled { divisor } => {
            override_param(divisor, args.divisor);
        }
        NormalizationPolicy::MinRadiusOffset { min_radius, k } => {
            override_param(min_radius, args.min_radius);
            override_param(k, args.k);
        }
    }
    warn_unused_params(args, policy.kind());
    config.policy = policy;

    if let Some(radius) = args.uniform_radius {
        config.uniform_mass = UniformMass::Constant { radius };
    }
    if args.require_mass {
        config.require_mass = true;
    }

    Ok(config)
}

fn override_param(slot: &mut f64, value: Option<f64>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn warn_unused_params(args: &Args, kind: PolicyKind) {
    let given = [
        ("--scale", args.scale, PolicyKind::LinearToMax),
        ("--divisor", args.divisor, PolicyKind::LinearToGlobalMaxScaled),
        ("--min-radius", args.min_radius, PolicyKind::MinRadiusOffset),
        ("--k", args.k, PolicyKind::MinRadiusOffset),
    ];
    for (flag, value, owner) in given {
        if value.is_some() && owner != kind {
            warn!(flag, policy = %kind, "Flag does not apply to the selected policy, ignored");
        }
    }
}

fn scene_options(args: &Args) -> MapResult<SceneOptions> {
    let defaults = Camera::default();
    let camera = Camera {
        eye: vec3("--eye", args.eye.as_deref())?.unwrap_or(defaults.eye),
        focal_point: vec3("--ref", args.focal_point.as_deref())?.unwrap_or(defaults.focal_point),
        view_up: vec3("--vup", args.vup.as_deref())?.unwrap_or(defaults.view_up),
    };

    Ok(SceneOptions {
        camera,
        axes_visible: args.axes,
        magnification: args.magnification,
        color_by: args.color_by,
        histogram_bins: args.bins,
        ..SceneOptions::default()
    })
}

fn vec3(flag: &str, values: Option<&[f64]>) -> MapResult<Option<Vec3>> {
    values
        .map(|v| {
            <Vec3>::try_from(v).map_err(|_| {
                MapError::InvalidParameter(format!("{} takes 3 values, got {}", flag, v.len()))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["nbody-cli", "-f", "run/data.007.csv"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = mapper_config(&args).unwrap();
        assert_eq!(config, MapperConfig::default());

        let options = scene_options(&args).unwrap();
        assert_eq!(options.camera, Camera::default());
        assert!(!options.axes_visible);
        assert_eq!(options.color_by, ScalarSource::Mass);
    }

    #[test]
    fn test_policy_flags() {
        let args = parse(&["--policy", "min-radius-offset", "--k", "5", "--scale", "9"]);
        let config = mapper_config(&args).unwrap();
        assert_eq!(
            config.policy,
            NormalizationPolicy::MinRadiusOffset {
                min_radius: 100.0,
                k: 5.0
            }
        );

        let args = parse(&["--scale", "4"]);
        assert_eq!(
            mapper_config(&args).unwrap().policy,
            NormalizationPolicy::LinearToMax { scale: 4.0 }
        );
    }

    #[test]
    fn test_header_and_uniform_flags() {
        let args = parse(&["--comment", "#", "--uniform-radius", "0.25", "--require-mass"]);
        let config = mapper_config(&args).unwrap();
        assert_eq!(config.header, HeaderMode::CommentMarker { marker: '#' });
        assert_eq!(config.uniform_mass, UniformMass::Constant { radius: 0.25 });
        assert!(config.require_mass);
    }

    #[test]
    fn test_camera_flags() {
        let args = parse(&["--eye", "-1", "2", "-3", "--vup", "0", "0", "1", "--axes", "-g"]);
        assert!(args.debug);
        let options = scene_options(&args).unwrap();
        assert_eq!(options.camera.eye, [-1.0, 2.0, -3.0]);
        assert_eq!(options.camera.view_up, [0.0, 0.0, 1.0]);
        assert_eq!(options.camera.focal_point, Camera::default().focal_point);
        assert!(options.axes_visible);
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert!(Args::try_parse_from(["nbody-cli"]).is_err());
        assert!(Args::try_parse_from(["nbody-cli", "-f", "a.csv", "--policy", "cubic"]).is_err());
        assert!(Args::try_parse_from(["nbody-cli", "-f", "a.csv", "--eye", "1", "2"]).is_err());
    }

    #[test]
    fn test_run_writes_scene() {
        let dir = std::env::temp_dir().join(format!("nbody-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("data.007.csv");
        let output = dir.join("scene.json");
        std::fs::write(&input, "x,y,z,vx,vy,vz,mass\n1,2,3,0,0,0,10\n4,5,6,0,0,0,20\n").unwrap();

        let args = Args::try_parse_from([
            "nbody-cli",
            "-f",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--scale",
            "4",
            "--bins",
            "2",
        ])
        .unwrap();
        run(&args).unwrap();

        let scene: Scene = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(scene.image, "data.007.png");
        let radii: Vec<f64> = scene.particles.iter().map(|g| g.radius).collect();
        assert_eq!(radii, vec![2.0, 4.0]);
        assert_eq!(scene.histogram.unwrap().total(), 2);
    }

    #[test]
    fn test_run_fails_on_malformed_snapshot() {
        let dir = std::env::temp_dir().join(format!("nbody-cli-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("bad.csv");
        let output = dir.join("bad.json");
        std::fs::write(&input, "1,2,3,0,0,0,1\n1,2\n").unwrap();

        let args = Args::try_parse_from([
            "nbody-cli",
            "-f",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let result = run(&args);
        let wrote = output.exists();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(MapError::MalformedRecord { line: 2, .. })));
        assert!(!wrote);
    }
}
