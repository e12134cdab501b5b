//! Demo host for the caption editor.
//!
//! Reads line commands from stdin, forwards them to a mounted editor and
//! prints the session after every step. Close requests are honored.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use caption_edit::config::EditorConfig;
use caption_edit::fonts::FontdbLoader;
use caption_edit::outside::{InteractiveRegions, PointerHub, PointerRelease, Rect, RegionKind};
use caption_edit::surface::LineMetricsSurface;
use caption_edit::tasks::editor::EditorHandle;
use caption_edit::{
    CaptionEditor, ColorValue, EditorCallbacks, EditorCommand, PickerState, SessionSnapshot,
};
use clap::{ArgAction, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const LINE_HEIGHT: f32 = 43.0;
const TEXT_PADDING: f32 = 4.0;
const CANVAS_WIDTH: f32 = 400.0;

#[derive(Debug, Parser)]
#[command(name = "caption-edit", about = "Interactive caption editor demo host")]
struct Cli {
    /// Path to YAML config file (stock catalogs when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the select-all delay (ms)
    #[arg(long, value_name = "MILLIS")]
    select_all_delay_ms: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("caption_edit={level}").parse()?);
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// What the editor's callbacks tell the host.
#[derive(Debug)]
enum Notice {
    CloseRequested,
    Committed(String),
    FontsLoaded,
}

enum Input {
    Command(EditorCommand),
    Release(PointerRelease),
    Show,
    Quit,
}

fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let input = match verb {
        "open" => Input::Command(EditorCommand::SetOpen(true)),
        "close" => Input::Command(EditorCommand::SetOpen(false)),
        "type" => Input::Command(EditorCommand::Input(rest.replace("\\n", "\n"))),
        "blur" => Input::Command(EditorCommand::Blur),
        "color" if !rest.is_empty() => Input::Command(EditorCommand::PickColor(rest.into())),
        "font" if !rest.is_empty() => Input::Command(EditorCommand::PickFont(rest.to_string())),
        "toggle" => match rest {
            "color" => Input::Command(EditorCommand::ToggleColorPicker),
            "font" => Input::Command(EditorCommand::ToggleFontPicker),
            other => bail!("toggle expects color|font, got {other:?}"),
        },
        "release" => {
            let mut coords = rest.split_whitespace().map(str::parse::<f32>);
            match (coords.next(), coords.next()) {
                (Some(Ok(x)), Some(Ok(y))) => Input::Release(PointerRelease::at(x, y)),
                _ => bail!("release expects <x> <y>"),
            }
        }
        "show" | "" => Input::Show,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command {other:?}"),
    };
    Ok(input)
}

/// Toolbar on top, picker row under it, caption below; the caption grows
/// with the measured height.
fn layout_for(snapshot: &SessionSnapshot) -> InteractiveRegions {
    let mut regions =
        InteractiveRegions::new().with(RegionKind::Controls, Rect::new(100.0, 16.0, 200.0, 40.0));
    if snapshot.picker != PickerState::None {
        regions = regions.with(RegionKind::Controls, Rect::new(0.0, 72.0, CANVAS_WIDTH, 34.0));
    }
    let height = snapshot.height.unwrap_or(LINE_HEIGHT + TEXT_PADDING);
    regions.with(RegionKind::TextInput, Rect::new(0.0, 120.0, CANVAS_WIDTH, height))
}

fn paint(color: &ColorValue, text: &str) -> String {
    match color.to_srgba() {
        Some(c) => format!("\x1b[38;2;{};{};{}m{text}\x1b[0m", c.red, c.green, c.blue),
        None => text.to_string(),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, colors: &[ColorValue], fonts: &[String]) {
    let state = if snapshot.open { "open" } else { "closed" };
    println!(
        "[{state}] picker={:?} height={:?} fonts-ready={}",
        snapshot.picker, snapshot.height, snapshot.fonts_ready
    );
    match snapshot.picker {
        PickerState::ColorPicker => {
            let swatches: Vec<String> = colors
                .iter()
                .enumerate()
                .map(|(idx, c)| {
                    let mark = if snapshot.active_swatch == Some(idx) { "*" } else { " " };
                    format!("{mark}{}", paint(c, c.as_str()))
                })
                .collect();
            println!("  colors: {}", swatches.join(" "));
        }
        PickerState::FontPicker => {
            let tiles: Vec<String> = fonts
                .iter()
                .enumerate()
                .map(|(idx, f)| {
                    let mark = if snapshot.active_font == Some(idx) { "*" } else { " " };
                    format!("{mark}{f}")
                })
                .collect();
            println!("  fonts: {}", tiles.join(" |"));
        }
        PickerState::None => {}
    }
    let family = snapshot.style.font_family.as_deref().unwrap_or("default");
    for line in snapshot.text.split('\n') {
        println!("  {} ({family})", paint(&snapshot.style.color, line));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => EditorConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EditorConfig::default(),
    }
    .validated()
    .context("validating configuration")?;
    if let Some(ms) = cli.select_all_delay_ms {
        cfg.select_all_delay = Duration::from_millis(ms);
    }
    let catalog = Arc::new(cfg.catalog()?);
    info!(
        delay = %humantime::format_duration(cfg.select_all_delay),
        "loaded configuration"
    );

    let (notice_tx, mut notices) = mpsc::unbounded_channel::<Notice>();
    let callbacks = {
        let close = notice_tx.clone();
        let commit = notice_tx.clone();
        let loaded = notice_tx;
        EditorCallbacks::new()
            .on_close_modal(move || {
                let _ = close.send(Notice::CloseRequested);
            })
            .on_text_blur(move |text| {
                let _ = commit.send(Notice::Committed(text.to_string()));
            })
            .on_fonts_loaded(move || {
                let _ = loaded.send(Notice::FontsLoaded);
            })
    };

    let pointer = PointerHub::default();
    let loader = Arc::new(FontdbLoader::new(cfg.font_directory.clone(), cfg.system_fonts));
    let (editor, wakeups) = CaptionEditor::mount(
        cfg.props(),
        catalog.clone(),
        LineMetricsSurface::new(LINE_HEIGHT, TEXT_PADDING),
        callbacks,
        &pointer,
        loader,
        cfg.select_all_delay,
    );
    let handle = EditorHandle::spawn(editor, wakeups);
    let mut snapshots = handle.subscribe();

    let colors = catalog.colors().to_vec();
    let fonts: Vec<String> = catalog.fonts().iter().map(|f| f.family.clone()).collect();
    let mut layout = layout_for(&handle.snapshot());
    handle.send(EditorCommand::Layout(layout.clone())).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Input::Command(cmd)) => handle.send(cmd).await?,
                    Ok(Input::Release(release)) => {
                        let listeners = pointer.publish(release);
                        info!(listeners, "pointer release published");
                    }
                    Ok(Input::Show) => print_snapshot(&handle.snapshot(), &colors, &fonts),
                    Ok(Input::Quit) => break,
                    Err(err) => warn!(error = %err, "ignored input"),
                }
            }

            Some(notice) = notices.recv() => match notice {
                Notice::CloseRequested => {
                    if handle.snapshot().open {
                        info!("closing on request");
                        handle.send(EditorCommand::SetOpen(false)).await?;
                    }
                }
                Notice::Committed(text) => info!(%text, "caption committed"),
                Notice::FontsLoaded => info!("fonts loaded"),
            },

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(&snapshot, &colors, &fonts);
                let next = layout_for(&snapshot);
                if next != layout {
                    layout = next;
                    handle.send(EditorCommand::Layout(layout.clone())).await?;
                }
            }
        }
    }

    handle.unmount().await
}
