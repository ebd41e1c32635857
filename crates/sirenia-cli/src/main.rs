#![forbid(unsafe_code)]

use futures::executor::block_on;
use serde::Serialize;
use sirenia::{
    DeterministicLabelMeasurer, ForceConfig, FrameQueue, GraphView, IngestReport,
    StaticConnectivity,
};
use std::io::Read;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_FRAMES: usize = 10_000;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(sirenia::Error),
    Json(serde_json::Error),
    EmptyCatalog,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::EmptyCatalog => write!(f, "catalog has no entities to expand"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<sirenia::Error> for CliError {
    fn from(value: sirenia::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Layout,
    Entities,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    expand: Vec<String>,
    max_frames: usize,
    measure_labels: bool,
}

fn usage() -> &'static str {
    "sirenia-cli\n\
\n\
USAGE:\n\
  sirenia-cli [layout] [--pretty] [--config <path>] [--expand <id>]... [--max-frames <n>] [--measure-labels] [<catalog>|-]\n\
  sirenia-cli entities [--pretty] [<catalog>|-]\n\
\n\
NOTES:\n\
  - If <catalog> is omitted or '-', the catalog is read from stdin.\n\
  - A catalog is {\"entities\": {\"<id>\": <connectivity response>, ...}}.\n\
  - layout expands each --expand id in order (default: the first catalog entry), letting the\n\
    layout settle after every expansion, and prints the final snapshot as JSON.\n\
  - --max-frames caps the frames pumped per expansion (default 10000).\n\
  - --measure-labels sizes label boxes by character count so overlapping labels separate.\n\
  - Set RUST_LOG (e.g. RUST_LOG=sirenia=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        max_frames: DEFAULT_MAX_FRAMES,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "entities" => args.command = Command::Entities,
            "--pretty" => args.pretty = true,
            "--measure-labels" => args.measure_labels = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--expand" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.expand.push(id.clone());
            }
            "--max-frames" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_frames = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
                if args.max_frames == 0 {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ForceConfig, CliError> {
    match path {
        None => Ok(ForceConfig::default()),
        Some(path) => Ok(ForceConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A global subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_layout(args: &Args, catalog: &StaticConnectivity) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let expand: Vec<String> = if args.expand.is_empty() {
        let first = catalog.entity_ids().next().ok_or(CliError::EmptyCatalog)?;
        vec![first.to_string()]
    } else {
        args.expand.clone()
    };

    let frames = FrameQueue::new();
    let mut view = GraphView::new(config, Rc::new(frames.clone()))?;
    let measurer = DeterministicLabelMeasurer::default();

    for id in &expand {
        let report: IngestReport = block_on(view.expand(catalog, id))?;
        if args.measure_labels && view.measure_labels(&measurer) > 0 && !view.is_running() {
            view.restart();
        }
        let pumped = frames.run_until_idle(args.max_frames);
        tracing::info!(
            entity = %id,
            nodes_added = report.nodes_added,
            arcs_added = report.arcs_added,
            skipped_arcs = report.skipped_arcs.len(),
            frames = pumped,
            "expanded"
        );
        if view.is_running() {
            tracing::warn!(
                entity = %id,
                max_frames = args.max_frames,
                "layout still moving after the frame cap; stopping it"
            );
            view.stop();
        }
    }

    write_json(&view.snapshot(), args.pretty)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let catalog = StaticConnectivity::from_json_str(&text)?;

    match args.command {
        Command::Layout => run_layout(&args, &catalog),
        Command::Entities => {
            let ids: Vec<&str> = catalog.entity_ids().collect();
            write_json(&ids, args.pretty)
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("sirenia-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_repeated_expand_flags_in_order() {
        let args = parse_args(&argv(&[
            "layout", "--expand", "a", "--expand", "b", "--pretty", "cat.json",
        ]))
        .unwrap();
        assert_eq!(args.command, Command::Layout);
        assert_eq!(args.expand, vec!["a", "b"]);
        assert!(args.pretty);
        assert_eq!(args.input.as_deref(), Some("cat.json"));
        assert_eq!(args.max_frames, DEFAULT_MAX_FRAMES);
    }

    #[test]
    fn rejects_bad_flags() {
        for bad in [
            &["--max-frames", "0"][..],
            &["--max-frames", "lots"],
            &["--expand"],
            &["--wat"],
            &["a.json", "b.json"],
        ] {
            assert!(
                matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn dash_means_stdin() {
        let args = parse_args(&argv(&["entities", "-"])).unwrap();
        assert_eq!(args.command, Command::Entities);
        assert_eq!(args.input.as_deref(), Some("-"));
    }
}
