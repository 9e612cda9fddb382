// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use ragel_bitmap::{Options, Rewrite, config, replace_path, rewrite};

/// Replace the integer tables of Ragel-generated Ruby parsers with packed
/// bitmap constructors.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Ruby files to rewrite in place.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Constant path the bitmap classes live under.
    #[arg(long, env = "RAGEL_BITMAP_NAMESPACE", default_value = config::DEFAULT_NAMESPACE)]
    namespace: String,

    /// First character of table field names.
    #[arg(long, env = "RAGEL_BITMAP_PREFIX", default_value_t = config::DEFAULT_PREFIX)]
    prefix: char,

    /// Always use byte planes, never the flat offset variants.
    #[arg(long, env = "RAGEL_BITMAP_NO_OFFSET")]
    no_offset: bool,

    /// Print a JSON report instead of writing files.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn options(&self) -> Options {
        let opts = Options::default()
            .with_namespace(self.namespace.clone())
            .with_prefix(self.prefix);
        if self.no_offset {
            opts.with_flat_offsets(false)
        } else {
            opts
        }
    }
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a PathBuf,
    #[serde(flatten)]
    rewrite: &'a Rewrite,
}

fn process(path: &PathBuf, opts: &Options, dry_run: bool) -> Result<Rewrite> {
    if dry_run {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        rewrite(&source, opts).with_context(|| format!("rewriting {}", path.display()))
    } else {
        replace_path(path, opts).with_context(|| format!("rewriting {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::init();

    let opts = cli.options();
    let results: Vec<Result<Rewrite>> = cli
        .paths
        .par_iter()
        .map(|path| process(path, &opts, cli.dry_run))
        .collect();

    let mut failed = 0usize;
    let mut reports = Vec::new();
    for (path, result) in cli.paths.iter().zip(&results) {
        match result {
            Ok(rewrite) => reports.push(FileReport { path, rewrite }),
            Err(e) => {
                eprintln!("error: {e:#}");
                failed += 1;
            }
        }
    }

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            println!(
                "{}: {} replaced, {} skipped",
                r.path.display(),
                r.rewrite.replaced.len(),
                r.rewrite.skipped.len()
            );
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", cli.paths.len());
    }
    Ok(())
}
