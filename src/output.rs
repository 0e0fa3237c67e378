//! Report rendering and console output

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::record::Record;
use crate::report::{ChangeKind, DiffEntry, DiffReport, DiffSummary};
use indexmap::IndexSet;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The diff of one file pair, as handed to renderers
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub left_path: PathBuf,
    pub right_path: PathBuf,
    pub report: DiffReport,
}

impl FileDiff {
    /// Short display name of the pair
    pub fn name(&self) -> String {
        file_name(&self.left_path)
    }
}

/// Render diffs in the requested format
pub fn render<W: Write>(format: OutputFormat, diffs: &[FileDiff], out: W) -> Result<()> {
    match format {
        OutputFormat::Text => TextRenderer::render(diffs, out),
        OutputFormat::Csv => CsvRenderer::render(diffs, out),
        OutputFormat::Html => HtmlRenderer::render(diffs, out),
        OutputFormat::Json => JsonFormatter::render(diffs, out),
    }
}

/// Pretty printer for console summaries
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the summary of one file pair
    pub fn print_file_summary(diff: &FileDiff) {
        let report = &diff.report;
        let summary = &report.summary;
        println!(
            "🔍 Diff: {} → {}",
            diff.left_path.display(),
            diff.right_path.display()
        );

        if !summary.has_changes() {
            println!("├─ ✅ No differences");
        } else {
            println!("├─ ➕ Added: {}", summary.added);
            println!("├─ ➖ Deleted: {}", summary.deleted);
            println!("├─ ✏️  Updated: {}", summary.updated);
            println!("├─ 🔀 Moved: {}", summary.moved);
        }
        println!("├─ Unchanged: {}", summary.unchanged);

        if report.warnings.is_empty() {
            println!(
                "└─ Records: {} → {}",
                report.left.record_count, report.right.record_count
            );
        } else {
            println!(
                "├─ Records: {} → {}",
                report.left.record_count, report.right.record_count
            );
            println!("└─ ⚠️  Warnings: {}", report.warnings.len());
            for (i, warning) in report.warnings.iter().take(5).enumerate() {
                let is_last = i == report.warnings.len().min(5) - 1;
                let prefix = if is_last { "   └─" } else { "   ├─" };
                println!("{} {}", prefix, warning);
            }
            if report.warnings.len() > 5 {
                println!("      ... and {} more", report.warnings.len() - 5);
            }
        }
    }

    /// Print left files that had no counterpart
    pub fn print_unmatched(paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        println!("🟡 Files without a counterpart:");
        for (i, path) in paths.iter().enumerate() {
            let prefix = if i == paths.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, path.display());
        }
    }
}

/// One displayed line of a change table
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeRow {
    diff: String,
    key: String,
    field: String,
    from: String,
    to: String,
}

impl ChangeRow {
    fn new(kind: Option<ChangeKind>, entry: &DiffEntry, field: &str, from: String, to: String) -> Self {
        Self {
            diff: kind.map(|k| k.label().to_string()).unwrap_or_default(),
            key: entry.key.to_string(),
            field: field.to_string(),
            from,
            to,
        }
    }

    fn cells(&self) -> [&str; 5] {
        [&self.diff, &self.key, &self.field, &self.from, &self.to]
    }
}

const TABLE_HEADER: [&str; 5] = ["Diff", "Key", "Field", "From", "To"];

/// Flatten a report into table rows, one per reported field
fn change_rows(report: &DiffReport) -> Vec<ChangeRow> {
    let mut rows = Vec::new();

    for entry in report {
        let kind = entry.kind();
        let mut label = Some(kind);
        let mut push = |field: &str, from: String, to: String| {
            rows.push(ChangeRow::new(label.take(), entry, field, from, to));
        };

        match kind {
            ChangeKind::Add => {
                let values = entry
                    .right()
                    .map(|r| summarize(r, &report.right.fields, &report.output_fields))
                    .unwrap_or_default();
                push("", String::new(), values);
            }
            ChangeKind::Delete => {
                let values = entry
                    .left()
                    .map(|r| summarize(r, &report.left.fields, &report.output_fields))
                    .unwrap_or_default();
                push("", values, String::new());
            }
            ChangeKind::Update => {
                for diff in entry.field_diffs() {
                    push(&diff.field, diff.left.clone(), diff.right.clone());
                }
                if entry.field_diffs().is_empty() {
                    push("", String::new(), String::new());
                }
            }
            ChangeKind::Match => push("", String::new(), String::new()),
            ChangeKind::Move => {}
        }

        if entry.moved {
            let (left_parent, right_parent) = (
                entry.left().and_then(Record::parent_key),
                entry.right().and_then(Record::parent_key),
            );
            if left_parent != right_parent {
                push(
                    "(parent)",
                    left_parent.map(|k| k.to_string()).unwrap_or_default(),
                    right_parent.map(|k| k.to_string()).unwrap_or_default(),
                );
            }
            push(
                "(position)",
                display_position(entry.from_position),
                display_position(entry.to_position),
            );
        }
    }

    rows
}

/// `name=value` pairs of the output fields of a record
fn summarize(record: &Record, fields: &[String], output: &[String]) -> String {
    fields
        .iter()
        .enumerate()
        .filter(|(_, name)| output.contains(name))
        .map(|(i, name)| format!("{}={}", name, record.value(i)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_position(position: Option<usize>) -> String {
    position.map(|p| format!("row {}", p + 1)).unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-line summary of counts
pub fn format_summary(summary: &DiffSummary) -> String {
    format!(
        "{} added, {} deleted, {} updated, {} moved, {} unchanged",
        summary.added, summary.deleted, summary.updated, summary.moved, summary.unchanged
    )
}

/// Plain text table renderer
pub struct TextRenderer;

impl TextRenderer {
    pub fn render<W: Write>(diffs: &[FileDiff], mut out: W) -> Result<()> {
        writeln!(out, "csvdiff report")?;
        writeln!(out, "Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;

        for diff in diffs {
            let report = &diff.report;
            writeln!(out)?;
            writeln!(out, "From: {}", diff.left_path.display())?;
            writeln!(out, "To:   {}", diff.right_path.display())?;
            writeln!(out, "Summary: {}", format_summary(&report.summary))?;
            for warning in &report.warnings {
                writeln!(out, "Warning: {}", warning)?;
            }

            let rows = change_rows(report);
            if rows.is_empty() {
                writeln!(out, "No differences.")?;
                continue;
            }
            writeln!(out)?;
            Self::write_table(&rows, &mut out)?;
        }

        out.flush()?;
        Ok(())
    }

    fn write_table<W: Write>(rows: &[ChangeRow], out: &mut W) -> Result<()> {
        let mut widths = TABLE_HEADER.map(|h| h.chars().count());
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row.cells()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |cells: [&str; 5]| -> String {
            cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(out, "{}", line(TABLE_HEADER))?;
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        writeln!(out, "{}", rule.join("  "))?;
        for row in rows {
            writeln!(out, "{}", line(row.cells()))?;
        }
        Ok(())
    }
}

/// Delimited export: one row per reported entry
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn render<W: Write>(diffs: &[FileDiff], out: W) -> Result<()> {
        let fields: IndexSet<&str> = diffs
            .iter()
            .flat_map(|d| d.report.output_fields.iter().map(String::as_str))
            .collect();

        let mut writer = csv::Writer::from_writer(out);
        let mut header = vec!["File", "Diff", "Key", "Moved", "From Row", "To Row"];
        header.extend(fields.iter().copied());
        writer.write_record(&header)?;

        for diff in diffs {
            let name = diff.name();
            let report = &diff.report;
            for entry in report {
                let mut record = vec![
                    name.clone(),
                    entry.kind().label().to_string(),
                    entry.key.to_string(),
                    entry.moved.to_string(),
                    entry.from_position.map(|p| (p + 1).to_string()).unwrap_or_default(),
                    entry.to_position.map(|p| (p + 1).to_string()).unwrap_or_default(),
                ];
                record.extend(fields.iter().map(|field| Self::cell(report, entry, field)));
                writer.write_record(&record)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Value of a field for an entry; updated fields show `from -> to`
    fn cell(report: &DiffReport, entry: &DiffEntry, field: &str) -> String {
        if let Some(diff) = entry.field_diffs().iter().find(|d| d.field == field) {
            return format!("{} -> {}", diff.left, diff.right);
        }
        let lookup = |record: &Record, fields: &[String]| {
            fields
                .iter()
                .position(|f| f == field)
                .map(|i| record.value(i).to_string())
        };
        entry
            .right()
            .and_then(|r| lookup(r, &report.right.fields))
            .or_else(|| entry.left().and_then(|l| lookup(l, &report.left.fields)))
            .unwrap_or_default()
    }
}

/// Self-contained HTML document renderer
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render<W: Write>(diffs: &[FileDiff], mut out: W) -> Result<()> {
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">")?;
        writeln!(out, "<title>csvdiff report</title>")?;
        writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE)?;
        writeln!(out, "<h1>csvdiff report</h1>")?;
        writeln!(
            out,
            "<p>Generated {}</p>",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        writeln!(out, "<h2>Summary</h2>\n<table>")?;
        writeln!(
            out,
            "<tr><th>File</th><th>Added</th><th>Deleted</th><th>Updated</th><th>Moved</th><th>Unchanged</th></tr>"
        )?;
        for diff in diffs {
            let s = &diff.report.summary;
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&diff.name()),
                s.added,
                s.deleted,
                s.updated,
                s.moved,
                s.unchanged
            )?;
        }
        writeln!(out, "</table>")?;

        for diff in diffs {
            writeln!(out, "<h2>{}</h2>", escape_html(&diff.name()))?;
            writeln!(
                out,
                "<p>From <code>{}</code> to <code>{}</code></p>",
                escape_html(&diff.left_path.display().to_string()),
                escape_html(&diff.right_path.display().to_string())
            )?;
            for warning in &diff.report.warnings {
                writeln!(out, "<p class=\"warning\">{}</p>", escape_html(&warning.to_string()))?;
            }

            let rows = change_rows(&diff.report);
            if rows.is_empty() {
                writeln!(out, "<p>No differences.</p>")?;
                continue;
            }
            writeln!(out, "<table>")?;
            let header: String = TABLE_HEADER.iter().map(|h| format!("<th>{}</th>", h)).collect();
            writeln!(out, "<tr>{}</tr>", header)?;
            for row in &rows {
                let class = row.diff.to_lowercase();
                let cells: String = row
                    .cells()
                    .iter()
                    .map(|c| format!("<td>{}</td>", escape_html(c)))
                    .collect();
                writeln!(out, "<tr class=\"{}\">{}</tr>", class, cells)?;
            }
            writeln!(out, "</table>")?;
        }

        writeln!(out, "</body>\n</html>")?;
        out.flush()?;
        Ok(())
    }
}

const STYLE: &str = "body{font-family:sans-serif}table{border-collapse:collapse;margin-bottom:1em}\
th,td{border:1px solid #ccc;padding:2px 6px;text-align:left}\
tr.add{background:#e6ffe6}tr.delete{background:#ffe6e6}tr.update{background:#fff8e0}\
tr.move{background:#e6f0ff}.warning{color:#a60}";

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render<W: Write>(diffs: &[FileDiff], mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, diffs)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
