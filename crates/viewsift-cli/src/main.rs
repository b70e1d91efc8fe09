/*!
Command-line front end for viewsift.

Reads hierarchy dumps (and optionally recognizer output) from disk, runs the
engine, and prints JSON on stdout. Logs go to stderr; set `RUST_LOG` to
change the level.
*/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use viewsift::fusion::{blocks_from_json, merge_nearby_blocks};
use viewsift::pipeline::{visibility_breakdown, VisibilityBreakdown};
use viewsift::{parse_hierarchy, Analyzer, EngineConfig, Element, HierarchyStats, PageDiff};

/// Sift UI hierarchy dumps for elements worth annotating.
#[derive(Debug, Parser)]
#[command(name = "viewsift")]
#[command(version)]
struct Cli {
  /// Engine configuration (TOML); unset keys keep their defaults
  #[arg(short, long, global = true, env = "VIEWSIFT_CONFIG")]
  config: Option<PathBuf>,

  /// Pretty-print the JSON output
  #[arg(long, global = true)]
  pretty: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Select elements to annotate and fuse recognized text
  Annotate {
    /// Hierarchy dump
    dump: PathBuf,

    /// Recognizer output: JSON array of {text, confidence, bounds}
    #[arg(short, long)]
    blocks: Option<PathBuf>,

    /// Merge recognized blocks closer than this many pixels first
    #[arg(long)]
    merge_distance: Option<i64>,
  },

  /// Element statistics and visibility breakdown of one dump
  Stats {
    /// Hierarchy dump
    dump: PathBuf,
  },

  /// Compare two dumps
  Compare {
    a: PathBuf,
    b: PathBuf,
  },
}

#[derive(Debug, Serialize)]
struct StatsReport {
  stats: HierarchyStats,
  visibility: VisibilityBreakdown,
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = Cli::parse();
  let config = load_config(cli.config.as_deref())?;

  match cli.command {
    Command::Annotate {
      dump,
      blocks,
      merge_distance,
    } => {
      let markup = read(&dump)?;
      let blocks = match blocks {
        Some(path) => {
          let blocks = blocks_from_json(&read(&path)?)
            .with_context(|| format!("Failed to decode text blocks from {}", path.display()))?;
          Some(match merge_distance {
            Some(distance) => merge_nearby_blocks(&blocks, distance),
            None => blocks,
          })
        }
        None => None,
      };
      let analyzer = Analyzer::new(config).context("Invalid engine configuration")?;
      let analysis = analyzer
        .analyze(&markup, blocks.as_deref())
        .with_context(|| format!("Failed to analyze {}", dump.display()))?;
      print_json(&analysis, cli.pretty)
    }
    Command::Stats { dump } => {
      let hierarchy = parse_hierarchy(&read(&dump)?)
        .with_context(|| format!("Failed to parse {}", dump.display()))?;
      let elements: Vec<&Element> = hierarchy.iter().collect();
      let report = StatsReport {
        stats: HierarchyStats::collect(&elements, hierarchy.screen()),
        visibility: visibility_breakdown(&hierarchy, &config),
      };
      print_json(&report, cli.pretty)
    }
    Command::Compare { a, b } => {
      let first = parse_hierarchy(&read(&a)?).with_context(|| format!("Failed to parse {}", a.display()))?;
      let second = parse_hierarchy(&read(&b)?).with_context(|| format!("Failed to parse {}", b.display()))?;
      let diff = PageDiff::between(&first, &second, &config);
      if diff.page_kind_changed() {
        log::warn!(
          "Page kind changed: {} -> {}",
          diff.page_kind_a.kind,
          diff.page_kind_b.kind
        );
      }
      print_json(&diff, cli.pretty)
    }
  }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
  let Some(path) = path else {
    return Ok(EngineConfig::default());
  };
  let raw = read(path)?;
  let config: EngineConfig =
    toml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))?;
  log::debug!("Loaded config from {}", path.display());
  Ok(config)
}

fn read(path: &Path) -> Result<String> {
  fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
  let json = if pretty {
    serde_json::to_string_pretty(value)
  } else {
    serde_json::to_string(value)
  }
  .context("Failed to serialize output")?;
  println!("{json}");
  Ok(())
}
