use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "drape", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the initial placement of a garment over a photo as JSON.
    Place(PlaceArgs),
    /// Place a garment over a photo and write the flattened PNG.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Input photo.
    #[arg(long)]
    image: PathBuf,

    /// Keypoint list JSON (`[{"name": "nose", "x": .., "y": .., "score": ..}, ..]`).
    #[arg(long)]
    pose: Option<PathBuf>,

    /// Garment kind: jacket, hoodie or cap.
    #[arg(long)]
    clothing: String,

    /// Directory holding `<kind>.svg` (or png/jpg/webp) garment files.
    #[arg(long)]
    assets: PathBuf,

    /// Editor configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input photo.
    #[arg(long)]
    image: PathBuf,

    /// Keypoint list JSON. Without it placement uses the fallback rule.
    #[arg(long)]
    pose: Option<PathBuf>,

    /// Garment kind: jacket, hoodie or cap. Omit to export the photo alone.
    #[arg(long)]
    clothing: Option<String>,

    /// Directory holding `<kind>.svg` (or png/jpg/webp) garment files.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = BackgroundChoice::Transparent)]
    background: BackgroundChoice,

    /// Background colour (`#RGB`, `#RRGGBB` or `#RRGGBBAA`).
    #[arg(long)]
    color: Option<String>,

    /// Editor configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interaction mode applied before the nudges.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Transform delta JSON, e.g. `{"left": 10, "scale_x": 1.2}`. Repeatable.
    #[arg(long)]
    nudge: Vec<String>,

    /// Directory receiving the normalized upload. Kept in memory when omitted.
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackgroundChoice {
    Transparent,
    Solid,
    Custom,
}

impl From<BackgroundChoice> for drape::BackgroundKind {
    fn from(c: BackgroundChoice) -> Self {
        match c {
            BackgroundChoice::Transparent => Self::Transparent,
            BackgroundChoice::Solid => Self::Solid,
            BackgroundChoice::Custom => Self::Custom,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Locked,
    Move,
    Resize,
}

impl From<ModeChoice> for drape::InteractionMode {
    fn from(c: ModeChoice) -> Self {
        match c {
            ModeChoice::Locked => Self::Locked,
            ModeChoice::Move => Self::Move,
            ModeChoice::Resize => Self::Resize,
        }
    }
}

#[derive(Serialize)]
struct PlaceReport {
    kind: drape::ClothingKind,
    rule: drape::PlacementRule,
    transform: drape::Transform2D,
    canvas: drape::Canvas,
    base: drape::Transform2D,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Place(args) => cmd_place(args),
        Command::Compose(args) => cmd_compose(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<drape::EditorConfig> {
    match path {
        Some(p) => Ok(drape::EditorConfig::from_path(p)?),
        None => Ok(drape::EditorConfig::default()),
    }
}

fn estimator_for(pose: Option<&Path>) -> Box<dyn drape::PoseEstimator> {
    match pose {
        Some(p) => Box::new(drape::JsonPoseEstimator::new(p)),
        None => Box::new(drape::NoPoseEstimator),
    }
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut session = drape::OverlaySession::new(config)?;

    let mut assets = drape::PreparedAssetStore::new();
    let catalog = drape::DirCatalog::load(&args.assets, &mut assets)?;
    let kind: drape::ClothingKind = args.clothing.parse()?;

    let (width, height) = image::image_dimensions(&args.image)
        .with_context(|| format!("read image size '{}'", args.image.display()))?;
    let ticket = session.load_image(args.image.display().to_string(), width, height)?;

    let pose = match &args.pose {
        Some(p) => Some(drape::Pose::from_path(p)?),
        None => None,
    };
    session.complete_detection(ticket, pose);
    session.select_clothing(kind, &catalog)?;

    let (Some(placed), Some(base)) = (session.clothing(), session.base_image()) else {
        anyhow::bail!("placement produced no clothing (bug)");
    };
    let report = PlaceReport {
        kind,
        rule: placed.rule,
        transform: placed.transform,
        canvas: session.canvas(),
        base: base.display,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize placement")?
    );
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let limits = config.upload;
    let mut session = drape::OverlaySession::new(config)?;
    let mut assets = drape::PreparedAssetStore::new();

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let estimator = estimator_for(args.pose.as_deref());
    let mut images: Box<dyn drape::ImageStore> = match &args.store {
        Some(dir) => Box::new(drape::DirImageStore::new(dir, limits)),
        None => Box::new(drape::MemoryImageStore::new(limits)),
    };
    session.upload(&bytes, images.as_mut(), &mut assets, estimator.as_ref())?;

    session.set_background(args.background.into(), args.color.as_deref())?;

    if let Some(kind) = &args.clothing {
        let kind: drape::ClothingKind = kind.parse()?;
        let catalog = drape::DirCatalog::load(&args.assets, &mut assets)?;
        session.select_clothing(kind, &catalog)?;

        if let Some(mode) = args.mode {
            session.set_interaction_mode(mode.into());
        }
        for raw in &args.nudge {
            let delta: drape::TransformDelta = serde_json::from_str(raw)
                .with_context(|| format!("parse nudge '{raw}'"))?;
            let report = session.apply_user_transform_delta(delta)?;
            if !report.is_fully_applied() {
                eprintln!(
                    "nudge '{raw}': {:?} locked in {} mode",
                    report.rejected,
                    session.interaction_mode()
                );
            }
        }
    }

    let mut backend = drape::CpuBackend::new();
    let png = session.export_flattened(&mut backend, &assets)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
