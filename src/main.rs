use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hexfog::camera::Point;
use hexfog::config::{ConfigError, EditorConfig};
use hexfog::engine::{Engine, EngineCore};
use hexfog::grid::{CellOutline, GridKind};
use hexfog::project::{ProjectData, ProjectError};
use hexfog::render::Layers;
use hexfog::replay::{self, ReplayError};
use hexfog::surface::{DisplayList, Op, RenderError};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hexfog", about = "Fog-of-war map grid tools")]
struct Cli {
    /// Editor config JSON (grid, fog, brush defaults).
    #[arg(long, env = "HEXFOG_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cell containing a world point.
    Locate {
        x: f64,
        y: f64,
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<GridKind>,
        #[arg(long)]
        size: Option<f64>,
        #[arg(long)]
        ratio: Option<f64>,
    },
    /// Summarize a saved project and what a full redraw of it costs.
    Inspect { project: PathBuf },
    /// Replay a JSON-lines session against headless layers.
    Replay {
        session: PathBuf,
        /// Project to load before the first step.
        #[arg(long)]
        project: Option<PathBuf>,
        /// Viewport size as `WIDTHxHEIGHT`, used by fit-to-window.
        #[arg(long, default_value = "1280x720", value_parser = parse_viewport)]
        viewport: (f64, f64),
        /// Write the resulting project here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Locate { x, y, kind, size, ratio } => run_locate(&config, Point::new(x, y), kind, size, ratio),
        Command::Inspect { project } => run_inspect(&config, &project),
        Command::Replay { session, project, viewport, out } => {
            run_replay(&config, &session, project.as_deref(), viewport, out.as_deref())
        }
    }
}

fn run_locate(
    config: &EditorConfig,
    at: Point,
    kind: Option<GridKind>,
    size: Option<f64>,
    ratio: Option<f64>,
) -> Result<(), CliError> {
    let mut core = EngineCore::with_config(config);
    if let Some(kind) = kind {
        core.set_grid_kind(kind);
    }
    if let Some(size) = size {
        core.set_cell_size(size);
    }
    if let Some(ratio) = ratio {
        core.set_aspect_ratio(ratio);
    }

    let key = core.grid.world_to_cell(at);
    let center = core.grid.cell_center(key);
    print_json(&json!({
        "cell": key,
        "center": center,
        "outline": outline_points(&core.grid.cell_outline(key, core.grid.size)),
        "grid": core.grid,
    }))
}

fn run_inspect(config: &EditorConfig, path: &Path) -> Result<(), CliError> {
    let data = ProjectData::from_json(&read(path)?)?;
    let mut engine = headless_engine(config);
    let report = engine.restore(&data);
    engine.render_full()?;

    let layers = engine.layers();
    print_json(&json!({
        "name": engine.core.name,
        "grid": engine.core.grid,
        "revealed": report.revealed,
        "skipped": report.skipped,
        "fog_ops": layers.fog.ops().len(),
        "hole_paths": count_fill_paths(&layers.fog),
        "grid_ops": layers.grid.ops().len(),
    }))
}

fn run_replay(
    config: &EditorConfig,
    session: &Path,
    project: Option<&Path>,
    viewport: (f64, f64),
    out: Option<&Path>,
) -> Result<(), CliError> {
    let steps = replay::parse_steps(&read(session)?)?;
    let mut engine = headless_engine(config);
    engine.set_viewport(viewport.0, viewport.1);
    engine.fit_to_window();
    if let Some(path) = project {
        let data = ProjectData::from_json(&read(path)?)?;
        engine.restore(&data);
    }
    engine.render_full()?;

    let summary = replay::replay(&mut engine, &steps)?;
    tracing::info!(steps = summary.steps, revealed = summary.final_revealed, "session replayed");

    if let Some(path) = out {
        let rendered = engine.snapshot().to_json()?;
        std::fs::write(path, rendered).map_err(|source| CliError::Write { path: path.display().to_string(), source })?;
    }
    print_json(&serde_json::to_value(summary)?)
}

fn headless_engine(config: &EditorConfig) -> Engine<DisplayList> {
    let layers = Layers { fog: DisplayList::default(), grid: DisplayList::default(), drawing: Some(DisplayList::default()) };
    Engine::with_config(layers, config)
}

fn count_fill_paths(list: &DisplayList) -> usize {
    list.count(|op| matches!(op, Op::FillPath))
}

fn outline_points(outline: &CellOutline) -> Value {
    match *outline {
        CellOutline::Rect { x, y, width, height } => json!({ "x": x, "y": y, "width": width, "height": height }),
        CellOutline::Hex(vertices) => json!(vertices),
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.display().to_string(), source })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn parse_kind(raw: &str) -> Result<GridKind, String> {
    match raw {
        "square" => Ok(GridKind::Square),
        "pointy" | "hex" => Ok(GridKind::Pointy),
        "flat" => Ok(GridKind::Flat),
        other => Err(format!("unknown grid type {other:?} (expected square, pointy, or flat)")),
    }
}

fn parse_viewport(raw: &str) -> Result<(f64, f64), String> {
    let (w, h) = raw.split_once('x').ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("invalid width in {raw:?}"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("invalid height in {raw:?}"))?;
    if w > 0.0 && h > 0.0 { Ok((w, h)) } else { Err(format!("viewport must be positive, got {raw:?}")) }
}
