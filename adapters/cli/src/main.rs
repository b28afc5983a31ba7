#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one pathviz search and prints the result.

mod config;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use pathviz_core::{CellState, Update};
use pathviz_rendering::{Palette, RenderState, RenderingBackend, TextBackend};
use pathviz_system_runner::{RunReport, Runner};
use pathviz_system_search::Algorithm;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// How long the consumer waits for an update before checking the run thread.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Visualize A* and Dijkstra on a randomly walled grid.
#[derive(Debug, Parser)]
#[command(name = "pathviz", version)]
struct Args {
    /// Width of the world in cells (8..=400).
    #[arg(long)]
    width: Option<u32>,

    /// Height of the world in cells (8..=400).
    #[arg(long)]
    height: Option<u32>,

    /// Let coordinates outside the world read as empty instead of walls.
    #[arg(long)]
    no_boundary: bool,

    /// Pause per search step in milliseconds; 0 streams in batches.
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Cell changes per batch when the delay is 0.
    #[arg(long)]
    batch: Option<usize>,

    /// Algorithm index or name, see --list-algorithms.
    #[arg(long)]
    algorithm: Option<String>,

    /// Seed for wall and endpoint placement.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file providing defaults for the options above.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the algorithm registry and exit.
    #[arg(long)]
    list_algorithms: bool,

    /// Print each cell state with its glyph and fill color and exit.
    #[arg(long)]
    legend: bool,

    /// Print a frame after every cell update instead of only the last one.
    #[arg(long)]
    show_frames: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            width: self.width,
            height: self.height,
            boundary: self.no_boundary.then_some(false),
            delay_ms: self.delay_ms,
            batch: self.batch,
            algorithm: self.algorithm.clone(),
            seed: self.seed,
        }
    }
}

/// Entry point for the pathviz command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "pathviz=info"
                    .parse()
                    .context("invalid default log directive")?,
            ),
        )
        .init();

    let args = Args::parse();
    if args.list_algorithms {
        for algorithm in Algorithm::ALL {
            println!(
                "{}  {}  ({})",
                algorithm.index(),
                algorithm.short_name(),
                algorithm.long_name()
            );
        }
        return Ok(());
    }
    if args.legend {
        print_legend(&mut io::stdout().lock(), &Palette::default())?;
        return Ok(());
    }

    let file_settings = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            Settings::load(path)?
        }
        None => Settings::default(),
    };
    let request = args
        .settings()
        .or(file_settings)
        .into_request()
        .context("invalid run request")?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    let runner = Runner::new(sender);
    let mut state = RenderState::new(request.world_width, request.world_height);
    let mut backend = TextBackend::new(io::stdout().lock());
    if args.show_frames {
        backend = backend.with_separator("");
    }

    let Some(handle) = runner.submit(request)? else {
        bail!("runner refused the request while idle");
    };

    let ended = pump_updates(
        &receiver,
        || handle.is_finished(),
        |update| {
            state.apply(update);
            if args.show_frames && matches!(update, Update::Cell(_) | Update::Batch(_)) {
                backend.present(&state.frame())?;
            }
            Ok(())
        },
    )?;

    let report = handle.join().map_err(|_| anyhow!("run thread panicked"))?;
    if !ended {
        bail!("run thread exited without ending the run");
    }

    backend.present(&state.frame())?;
    let mut out = backend.into_inner();
    print_summary(&mut out, &report)?;
    Ok(())
}

/// Feeds updates to `on_update` until the run ends.
///
/// Returns `false` when the producer went away first, either by dropping
/// every sender or by exiting its thread without sending `RunEnded`.
fn pump_updates<D, F>(receiver: &Receiver<Update>, is_finished: D, mut on_update: F) -> Result<bool>
where
    D: Fn() -> bool,
    F: FnMut(&Update) -> Result<()>,
{
    loop {
        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(update) => {
                on_update(&update)?;
                if update == Update::RunEnded {
                    return Ok(true);
                }
            }
            Err(RecvTimeoutError::Timeout) if is_finished() => {
                for update in receiver.try_iter() {
                    on_update(&update)?;
                    if update == Update::RunEnded {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(false),
        }
    }
}

fn print_legend<W>(out: &mut W, palette: &Palette) -> Result<()>
where
    W: io::Write,
{
    for state in CellState::ALL {
        let [red, green, blue, alpha] = palette.color(state).to_rgba_u8();
        writeln!(
            out,
            "{}  {:<12}#{red:02x}{green:02x}{blue:02x}{alpha:02x}",
            state.glyph(),
            state.label()
        )?;
    }
    Ok(())
}

fn print_summary<W>(out: &mut W, report: &RunReport) -> Result<()>
where
    W: io::Write,
{
    writeln!(out)?;
    writeln!(out, "algorithm: {}", report.algorithm())?;
    writeln!(out, "seed: {}", report.seed())?;
    if let Some((start, goal)) = report.endpoints() {
        writeln!(out, "start: {start}  goal: {goal}")?;
    }
    let outcome = report.outcome();
    writeln!(
        out,
        "expanded: {}  evaluated: {}",
        outcome.expanded(),
        outcome.evaluated()
    )?;
    writeln!(out, "path ({}): {}", outcome.path().len(), outcome.path())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_settings() {
        let args = Args::try_parse_from([
            "pathviz",
            "--width",
            "40",
            "--no-boundary",
            "--delay-ms",
            "0",
            "--algorithm",
            "dijkstra",
        ])
        .expect("valid flags");

        let request = args.settings().into_request().expect("valid request");

        assert_eq!(request.world_width, 40);
        assert!(!request.has_boundary);
        assert!(!request.is_animated());
        assert_eq!(request.algorithm_index, 1);
    }

    #[test]
    fn boundary_is_left_to_lower_layers_when_flag_absent() {
        let args = Args::try_parse_from(["pathviz"]).expect("no flags");

        assert_eq!(args.settings().boundary, None);
        assert!(!args.list_algorithms);
        assert!(!args.legend);
        assert!(!args.show_frames);
    }

    #[test]
    fn pump_stops_at_run_end() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        for update in [Update::RunStarted, Update::MapReset, Update::RunEnded, Update::RunStarted] {
            sender.send(update).expect("receiver alive");
        }
        let mut seen = Vec::new();

        let ended = pump_updates(
            &receiver,
            || false,
            |update| {
                seen.push(update.clone());
                Ok(())
            },
        )
        .expect("no callback errors");

        assert!(ended);
        assert_eq!(seen, vec![Update::RunStarted, Update::MapReset, Update::RunEnded]);
        assert_eq!(receiver.len(), 1);
    }

    #[test]
    fn pump_returns_when_producer_thread_dies_with_sender_alive() {
        let (sender, receiver) = crossbeam_channel::unbounded::<Update>();
        sender.send(Update::RunStarted).expect("receiver alive");
        let mut seen = 0;

        let ended = pump_updates(
            &receiver,
            || true,
            |_| {
                seen += 1;
                Ok(())
            },
        )
        .expect("no callback errors");

        assert!(!ended);
        assert_eq!(seen, 1);
        drop(sender);
    }

    #[test]
    fn pump_drains_updates_that_race_the_thread_exit() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut seen = Vec::new();

        let ended = pump_updates(
            &receiver,
            || {
                let _ = sender.try_send(Update::RunEnded);
                true
            },
            |update| {
                seen.push(update.clone());
                Ok(())
            },
        )
        .expect("no callback errors");

        assert!(ended);
        assert_eq!(seen, vec![Update::RunEnded]);
    }

    #[test]
    fn legend_lists_every_state_with_its_color() {
        let mut out = Vec::new();

        print_legend(&mut out, &Palette::default()).expect("write to memory");

        let text = String::from_utf8(out).expect("utf8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), CellState::ALL.len());
        assert_eq!(lines[0], ".  Empty       #00000000");
        assert_eq!(lines[1], "#  Wall        #889f9fff");
        assert_eq!(lines[6], "*  Path        #dddd00ff");
    }

    #[test]
    fn flags_override_file_settings() {
        let args = Args::try_parse_from(["pathviz", "--batch", "3"]).expect("valid flags");
        let file = Settings {
            batch: Some(8),
            height: Some(20),
            ..Settings::default()
        };

        let merged = args.settings().or(file);

        assert_eq!(merged.batch, Some(3));
        assert_eq!(merged.height, Some(20));
    }
}
