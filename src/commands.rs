//! Command implementation for the csvdiff CLI

use crate::cli::Cli;
use crate::config::{DiffOptions, SourceOptions};
use crate::engine;
use crate::error::Result;
use crate::output::{self, FileDiff, PrettyPrinter};
use crate::pairing::{self, FilePair};
use crate::progress::ProgressReporter;
use crate::reader::SourceReader;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Execute a diff run and return the path of the written report
pub fn execute_command(cli: &Cli) -> Result<PathBuf> {
    let options = cli.diff_options()?;
    let source_options = cli.source_options()?;
    let format = cli.output_format()?;

    let pairing = pairing::resolve_pairs(&cli.from, &cli.to, &cli.file_filter())?;
    log::info!("Comparing {} file pair(s)", pairing.pairs.len());

    let diffs = diff_pairs(&pairing.pairs, &options, &source_options)?;

    let output_path = cli.output.clone().unwrap_or_else(|| {
        pairing::default_output_path(&cli.from, &cli.to, format.extension())
    });
    let writer = BufWriter::new(File::create(&output_path)?);
    output::render(format, &diffs, writer)?;

    for diff in &diffs {
        PrettyPrinter::print_file_summary(diff);
    }
    PrettyPrinter::print_unmatched(&pairing.unmatched);
    println!("📄 Report written to: {}", output_path.display());

    Ok(output_path)
}

/// Diff every pair in parallel, keeping pair order
pub fn diff_pairs(
    pairs: &[FilePair],
    options: &DiffOptions,
    source_options: &SourceOptions,
) -> Result<Vec<FileDiff>> {
    let key_spec = options.key_spec()?;
    let reader = SourceReader::new(source_options)?;
    let mut progress = ProgressReporter::for_pair_count(pairs.len());

    let diffs = pairs
        .par_iter()
        .map(|pair| -> Result<FileDiff> {
            let (left, right) = reader.load_pair(&pair.left, &pair.right, &key_spec)?;
            let report = engine::diff(&left, &right, options)?;
            progress.pair_done(&pair.left.display().to_string());
            Ok(FileDiff {
                left_path: pair.left.clone(),
                right_path: pair.right.clone(),
                report,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    progress.finish("Comparison complete");
    Ok(diffs)
}
