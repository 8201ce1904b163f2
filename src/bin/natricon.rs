use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use natricon::{
    AvatarConfig, AvatarRequest, AvatarService, BadgeKind, ColorDeriver, FragmentCatalog,
    OutputFormat, Rgb, VanityTable, account_hash,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "natricon", version)]
struct Cli {
    /// Optional JSON config overriding derivation, composition and raster defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one avatar for a hash or a public key.
    Render(RenderArgs),
    /// Render SVG avatars for random hashes into a directory.
    Random(RandomArgs),
    /// Print summary statistics of derived colors.
    Distribution(DistributionArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["hash", "public_key"])))]
struct RenderArgs {
    /// Account hash (at least 40 hex characters).
    #[arg(long)]
    hash: Option<String>,

    /// Public key, hashed together with `--nonce` and `--seed`.
    #[arg(long)]
    public_key: Option<String>,

    #[arg(long, requires = "public_key")]
    nonce: Option<u64>,

    /// Server seed appended to the public key before hashing.
    #[arg(long, default_value = "")]
    seed: String,

    #[arg(long, default_value = "none")]
    badge: BadgeKind,

    #[arg(long)]
    outline: bool,

    /// `black`, `white` or a `#RRGGBB` hex color.
    #[arg(long, value_parser = parse_color)]
    outline_color: Option<Rgb>,

    #[arg(long, default_value = "svg")]
    format: OutputFormat,

    /// Raster edge length in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Catalog directory holding `catalog.json`.
    #[arg(long)]
    assets: PathBuf,

    /// Vanity table JSON keyed by public key.
    #[arg(long)]
    vanity: Option<PathBuf>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RandomArgs {
    #[arg(long, default_value_t = 10)]
    count: usize,

    #[arg(long)]
    assets: PathBuf,

    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct DistributionArgs {
    #[arg(value_enum)]
    kind: DistributionKind,

    #[arg(long, default_value_t = 10_000)]
    samples: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DistributionKind {
    Body,
    Hair,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AvatarConfig::from_json_path(path)?,
        None => AvatarConfig::default(),
    };
    match cli.cmd {
        Command::Render(args) => cmd_render(args, config),
        Command::Random(args) => cmd_random(args, config),
        Command::Distribution(args) => cmd_distribution(args, config),
    }
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "black" => Ok(Rgb::BLACK),
        "white" => Ok(Rgb::WHITE),
        other => Rgb::from_hex(other).map_err(|e| e.to_string()),
    }
}

fn load_service(assets: &Path, config: AvatarConfig) -> anyhow::Result<AvatarService> {
    let catalog = FragmentCatalog::load_dir(assets, config.derivation)
        .with_context(|| format!("load catalog '{}'", assets.display()))?;
    Ok(AvatarService::new(config, Arc::new(catalog))?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_render(args: RenderArgs, config: AvatarConfig) -> anyhow::Result<()> {
    let mut service = load_service(&args.assets, config)?.with_server_seed(args.seed);
    if let Some(path) = &args.vanity {
        service = service.with_vanities(VanityTable::from_json_path(path)?);
    }

    let request = AvatarRequest {
        badge: args.badge,
        outline: args.outline,
        outline_color: args.outline_color,
        format: args.format,
        size: args.size,
    };
    let avatar = match (&args.hash, &args.public_key) {
        (Some(hash), _) => service.generate_for_hash(hash, &request)?,
        (None, Some(key)) => service.generate_for_account(key, args.nonce, &request)?,
        (None, None) => anyhow::bail!("either --hash or --public-key is required"),
    };

    write_output(&args.out, &avatar.bytes)?;
    eprintln!("wrote {} ({})", args.out.display(), avatar.mime_type());
    Ok(())
}

fn cmd_random(args: RandomArgs, config: AvatarConfig) -> anyhow::Result<()> {
    let service = load_service(&args.assets, config)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_nanos();
    for i in 0..args.count {
        let hash = account_hash(&format!("{nanos}:{i}"), None, "");
        let avatar = service.generate_for_hash(&hash, &AvatarRequest::default())?;
        write_output(&args.out_dir.join(format!("{hash}.svg")), &avatar.bytes)?;
    }

    eprintln!("wrote {} avatars to {}", args.count, args.out_dir.display());
    Ok(())
}

/// Running min / mean / max.
#[derive(Default)]
struct Summary {
    min: f64,
    max: f64,
    sum: f64,
    n: usize,
}

impl Summary {
    fn add(&mut self, v: f64) {
        if self.n == 0 {
            self.min = v;
            self.max = v;
        } else {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
        self.sum += v;
        self.n += 1;
    }

    fn line(&self, label: &str) -> String {
        let mean = if self.n == 0 { 0.0 } else { self.sum / self.n as f64 };
        format!(
            "{label:<22} min {:>7.2}  mean {:>7.2}  max {:>7.2}",
            self.min, mean, self.max
        )
    }
}

fn cmd_distribution(args: DistributionArgs, config: AvatarConfig) -> anyhow::Result<()> {
    let deriver = ColorDeriver::new(config.derivation);
    let mut brightness = Summary::default();
    let mut saturation = Summary::default();
    let mut value = Summary::default();
    let mut joint_saturation = Summary::default();

    for i in 0..args.samples {
        let hash = account_hash(&i.to_string(), None, "distribution");
        let palette = deriver.palette(&hash)?;
        match args.kind {
            DistributionKind::Body => {
                let hsb = palette.body.to_hsb();
                brightness.add(palette.body.perceived_brightness());
                saturation.add(hsb.s * 100.0);
                value.add(hsb.b * 100.0);
            }
            DistributionKind::Hair => {
                let (body, hair) = (palette.body.to_hsb(), palette.hair.to_hsb());
                brightness.add(palette.hair.perceived_brightness());
                saturation.add(hair.s * 100.0);
                value.add(hair.b * 100.0);
                joint_saturation.add((body.s + hair.s) * 100.0);
            }
        }
    }

    println!("{:?} colors over {} samples", args.kind, args.samples);
    println!("{}", brightness.line("perceived brightness"));
    println!("{}", saturation.line("saturation"));
    println!("{}", value.line("brightness"));
    if joint_saturation.n > 0 {
        println!("{}", joint_saturation.line("body+hair saturation"));
    }
    Ok(())
}
