use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vhs_cover::{
    Background, BoardWrite, CoverError, EngineConfig, FitMode, OutputFormat, OverlayLayer,
    RenderRequest, RenderSource, Size,
};

#[derive(Parser, Debug)]
#[command(name = "vhs-cover", version)]
struct Cli {
    /// JSON config file (every field optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the sandboxed asset root.
    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,

    /// Override the board document path.
    #[arg(long, global = true)]
    board_path: Option<PathBuf>,

    /// Override the custom template catalog.
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the template catalog as JSON.
    Templates,
    /// Render one cover.
    Render(RenderArgs),
    /// Read or write boards.
    #[command(subcommand)]
    Board(BoardCommand),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Fetch the poster over HTTP(S).
    #[arg(long)]
    url: Option<String>,

    /// Poster path under the asset root, e.g. `/posters/603.jpg`.
    #[arg(long)]
    public_path: Option<String>,

    /// Poster file on local disk.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> anyhow::Result<RenderSource> {
        match (self.url, self.public_path, self.file) {
            (Some(u), None, None) => Ok(RenderSource::RemoteUrl(u)),
            (None, Some(p), None) => Ok(RenderSource::PublicPath(p)),
            (None, None, Some(f)) => Ok(RenderSource::LocalFile(f)),
            _ => anyhow::bail!("exactly one of --url, --public-path, --file is required"),
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file.
    #[arg(long)]
    out: PathBuf,

    /// Template id (unknown ids use the default template).
    #[arg(long)]
    template: Option<String>,

    /// Output size as WIDTHxHEIGHT.
    #[arg(long)]
    size: Option<Size>,

    /// How the poster fills its slot.
    #[arg(long, value_enum, default_value_t = FitChoice::Cover)]
    fit: FitChoice,

    /// `png` or `webp`.
    #[arg(long, default_value = "webp")]
    format: OutputFormat,

    /// Encoder quality (1..100).
    #[arg(long, default_value_t = 86)]
    quality: i64,

    /// `transparent`, `#rrggbb` or `#rrggbbaa`.
    #[arg(long, default_value = "transparent")]
    background: Background,

    /// Jitter seed, e.g. `603:vhs-classic`.
    #[arg(long)]
    seed: Option<String>,

    /// Extra overlay as `PUBLIC_PATH[,BLEND[,OPACITY]]` (repeatable).
    #[arg(long = "overlay", value_parser = parse_overlay)]
    overlays: Vec<OverlayLayer>,
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Print a board.
    Read(BoardIdArgs),
    /// Replace a board from a `{boardId?, movies, expectedVersion?}` JSON file.
    Replace(ReplaceArgs),
    /// Empty a board.
    Clear(BoardIdArgs),
    /// Print the top-ranked movies.
    Lineup(LineupArgs),
}

#[derive(Args, Debug)]
struct BoardIdArgs {
    /// Board name (default: `default`).
    #[arg(long)]
    board: Option<String>,
}

#[derive(Args, Debug)]
struct ReplaceArgs {
    /// Write payload JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Board name; overrides the payload's `boardId`.
    #[arg(long)]
    board: Option<String>,

    /// Expected version; overrides the payload's `expectedVersion`.
    #[arg(long)]
    expected_version: Option<u64>,
}

#[derive(Args, Debug)]
struct LineupArgs {
    /// Board name (default: `default`).
    #[arg(long)]
    board: Option<String>,

    /// How many movies to show.
    #[arg(long, default_value_t = 5)]
    count: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Cover,
    Contain,
}

impl From<FitChoice> for FitMode {
    fn from(choice: FitChoice) -> Self {
        match choice {
            FitChoice::Cover => FitMode::Cover,
            FitChoice::Contain => FitMode::Contain,
        }
    }
}

fn parse_overlay(s: &str) -> Result<OverlayLayer, String> {
    let mut parts = s.split(',');
    let path = parts.next().unwrap_or_default().trim();
    let blend = match parts.next() {
        Some(b) => b.parse().map_err(|e: CoverError| e.to_string())?,
        None => Default::default(),
    };
    let mut layer = OverlayLayer::new(path, blend);
    if let Some(o) = parts.next() {
        let opacity: f32 = o
            .trim()
            .parse()
            .map_err(|_| format!("invalid opacity '{o}'"))?;
        layer = layer.with_opacity(opacity);
    }
    if parts.next().is_some() {
        return Err("expected PUBLIC_PATH[,BLEND[,OPACITY]]".to_string());
    }
    Ok(layer)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoverError>() {
        Some(CoverError::Conflict { .. }) => 3,
        Some(CoverError::Validation(_)) => 2,
        _ => 1,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Templates => cmd_templates(&cfg),
        Command::Render(args) => cmd_render(&cfg, args).await,
        Command::Board(cmd) => cmd_board(&cfg, cmd).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(root) = &cli.asset_root {
        cfg.asset_root.clone_from(root);
    }
    if let Some(path) = &cli.board_path {
        cfg.board_path.clone_from(path);
    }
    if let Some(path) = &cli.templates {
        cfg.templates_path = Some(path.clone());
    }
    Ok(cfg)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("encode json output")?;
    println!("{json}");
    Ok(())
}

fn cmd_templates(cfg: &EngineConfig) -> anyhow::Result<()> {
    let registry = cfg.load_registry()?;
    print_json(&registry.listing())
}

async fn cmd_render(cfg: &EngineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let renderer = cfg.build_renderer()?;
    let req = RenderRequest {
        source: args.source.into_source()?,
        template_id: args.template,
        fit: args.fit.into(),
        size: args.size,
        overlays: args.overlays,
        format: args.format,
        quality: args.quality,
        background: args.background,
        random_seed: args.seed,
    };

    let image = renderer.render(&req).await?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    tokio::fs::write(&args.out, &image.bytes)
        .await
        .with_context(|| format!("write cover '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}, {} bytes)",
        args.out.display(),
        image.content_type,
        image.bytes.len()
    );
    Ok(())
}

async fn cmd_board(cfg: &EngineConfig, cmd: BoardCommand) -> anyhow::Result<()> {
    let store = cfg.board_store();
    match cmd {
        BoardCommand::Read(args) => print_json(&store.read(args.board.as_deref()).await?),
        BoardCommand::Replace(args) => {
            let bytes = tokio::fs::read(&args.in_path)
                .await
                .with_context(|| format!("read payload '{}'", args.in_path.display()))?;
            let mut write: BoardWrite = serde_json::from_slice(&bytes)
                .map_err(|e| CoverError::validation("payload", e.to_string()))?;
            if args.board.is_some() {
                write.board_id = args.board;
            }
            if args.expected_version.is_some() {
                write.expected_version = args.expected_version;
            }
            print_json(&store.apply(write).await?)
        }
        BoardCommand::Clear(args) => print_json(&store.clear(args.board.as_deref()).await?),
        BoardCommand::Lineup(args) => {
            let state = store.read(args.board.as_deref()).await?;
            print_json(&state.lineup(args.count))
        }
    }
}
