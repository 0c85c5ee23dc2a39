pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod pixel;
pub mod script;
pub mod state;
pub use error::{AppError, AppResult};

use std::path::PathBuf;

use clap::Parser;

use crate::canvas::RasterCanvas;
use crate::editor::CanvasEditor;

/// Replay a JSON edit script on an image and write the result as PNG.
#[derive(Debug, Clone, Parser)]
#[command(name = "memedit", version, about)]
pub struct Cli {
    /// Source image (PNG or JPEG).
    pub input: PathBuf,
    /// Edit script to replay.
    pub script: PathBuf,
    /// Output PNG path.
    pub output: PathBuf,
    /// Config file; defaults to `$XDG_CONFIG_HOME/memedit/config.json`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Fail on the first rejected script step.
    #[arg(long)]
    pub strict: bool,
    /// Print the replay report as JSON on stdout.
    #[arg(long)]
    pub report: bool,
}

/// Entrypoint used by the `memedit` binary.
pub fn run() -> AppResult<()> {
    logging::init();
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> AppResult<()> {
    tracing::info!(input = ?cli.input, script = ?cli.script, "starting memedit");

    let config = match cli.config.as_deref() {
        Some(path) => config::load_editor_config_from(path),
        None => config::load_editor_config(),
    };
    let (width, height) = config.canvas_size().ok_or(AppError::CanvasSize {
        width: config.canvas_width,
        height: config.canvas_height,
        ratio: config.device_pixel_ratio,
    })?;

    let source = image::open(&cli.input)
        .map_err(|source| AppError::Image {
            path: cli.input.clone(),
            source,
        })?
        .to_rgba8();
    pixel::expected_len(source.width(), source.height())?;

    let contents = std::fs::read_to_string(&cli.script).map_err(|source| AppError::Io {
        path: cli.script.clone(),
        source,
    })?;
    let script = script::parse_script(&contents)?;

    let canvas = RasterCanvas::new(width, height).with_snapshot_limit(config.max_snapshot_pixels);
    let mut editor = CanvasEditor::with_options(canvas, config.editor_options());
    if !editor.load_image(source) {
        return Err(AppError::LoadRejected);
    }

    let report = script::run_script_with_debounce(&mut editor, &script, config.param_debounce());
    tracing::info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        history = report.history.total_count,
        "script replay finished"
    );
    if let Some(step) = report.rejected.first().filter(|_| cli.strict) {
        return Err(AppError::StepRejected {
            index: step.index,
            op: step.op,
        });
    }
    if cli.report {
        println!("{}", render_report(&report)?);
    }

    editor
        .into_surface()
        .into_image()
        .save(&cli.output)
        .map_err(|source| AppError::Image {
            path: cli.output.clone(),
            source,
        })?;
    tracing::info!(output = ?cli.output, width, height, "edited image written");
    Ok(())
}

fn render_report(report: &script::ScriptReport) -> AppResult<String> {
    serde_json::to_string_pretty(report).map_err(AppError::Report)
}
