//! Export of exploration results: JSON, CSV, and Markdown.
//!
//! JSON artifacts carry a `schema_version` and newer versions are rejected on
//! load. CSV writes absent metrics as empty cells.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use stratlab_core::SimulatedSeries;

use crate::explorer::{Exploration, FamilyExploration, ParameterSet};

/// Current artifact schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ExplorationArtifact {
    schema_version: u32,
    exploration: Exploration,
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_exploration_json(exploration: &Exploration) -> Result<String> {
    let artifact = ExplorationArtifact {
        schema_version: SCHEMA_VERSION,
        exploration: exploration.clone(),
    };
    serde_json::to_string_pretty(&artifact).context("failed to serialize exploration to JSON")
}

/// Deserialize an exploration, rejecting unknown schema versions.
pub fn import_exploration_json(json: &str) -> Result<Exploration> {
    let artifact: ExplorationArtifact =
        serde_json::from_str(json).context("failed to deserialize exploration from JSON")?;
    if artifact.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            artifact.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(artifact.exploration)
}

// ─── CSV ────────────────────────────────────────────────────────────

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per grid point, in grid order.
///
/// Columns: family, window, threshold, sharpe_ratio, max_drawdown,
/// drawdown_duration, recovery_time, total_return, is_best, run_id
pub fn export_grid_csv(family: &FamilyExploration) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "family",
        "window",
        "threshold",
        "sharpe_ratio",
        "max_drawdown",
        "drawdown_duration",
        "recovery_time",
        "total_return",
        "is_best",
        "run_id",
    ])?;

    for (i, r) in family.results.iter().enumerate() {
        let m = &r.metrics;
        wtr.write_record([
            family.family.to_string(),
            r.parameters.window().to_string(),
            opt_cell(r.parameters.threshold()),
            opt_cell(m.sharpe_ratio),
            opt_cell(m.max_drawdown),
            opt_cell(m.drawdown_duration),
            opt_cell(m.recovery_time),
            opt_cell(m.total_return),
            (family.best == Some(i)).to_string(),
            r.run_id.clone(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per-period trace of one simulated series.
pub fn export_series_csv(series: &SimulatedSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close",
        "rolling_mean",
        "signal",
        "position_change",
        "portfolio_value",
        "in_market",
    ])?;
    for row in &series.rows {
        wtr.write_record([
            row.date.to_string(),
            format!("{:.6}", row.close),
            format!("{:.6}", row.rolling_mean),
            row.signal.value().to_string(),
            row.position_change.to_string(),
            format!("{:.6}", row.portfolio_value),
            row.in_market.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

fn sharpe_cell(sharpe: Option<f64>) -> String {
    match sharpe {
        Some(s) => format!("{s:.3}"),
        None => "n/a".to_string(),
    }
}

/// Sharpe ratios as a Markdown table: a window list for momentum, a
/// window × threshold pivot for mean reversion.
pub fn sharpe_table_markdown(family: &FamilyExploration) -> String {
    let mut md = String::with_capacity(512);
    md.push_str(&format!("## {} Sharpe Ratios\n\n", family.family));

    let mut windows: Vec<usize> = Vec::new();
    let mut thresholds: Vec<f64> = Vec::new();
    for r in &family.results {
        let window = r.parameters.window();
        if !windows.contains(&window) {
            windows.push(window);
        }
        if let Some(t) = r.parameters.threshold() {
            if !thresholds.contains(&t) {
                thresholds.push(t);
            }
        }
    }

    if thresholds.is_empty() {
        md.push_str("| Window | Sharpe |\n| --- | --- |\n");
        for r in &family.results {
            md.push_str(&format!(
                "| {} | {} |\n",
                r.parameters.window(),
                sharpe_cell(r.sharpe())
            ));
        }
    } else {
        md.push_str("| Window |");
        for t in &thresholds {
            md.push_str(&format!(" T={t:.3} |"));
        }
        md.push_str("\n| --- |");
        md.push_str(&" --- |".repeat(thresholds.len()));
        md.push('\n');

        for &window in &windows {
            md.push_str(&format!("| {window} |"));
            for &threshold in &thresholds {
                let sharpe = family
                    .results
                    .iter()
                    .find(|r| r.parameters == ParameterSet::MeanReversion { window, threshold })
                    .and_then(|r| r.sharpe());
                md.push_str(&format!(" {} |", sharpe_cell(sharpe)));
            }
            md.push('\n');
        }
    }

    match family.best() {
        Some(best) => md.push_str(&format!(
            "\nBest: {} (Sharpe {:.3})\n",
            best.parameters,
            best.sharpe().unwrap_or(f64::NAN)
        )),
        None => md.push_str("\nBest: none (no defined Sharpe ratio)\n"),
    }
    md
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write `contents` to `path`, creating parent directories.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Save the full artifact set for one exploration.
///
/// Creates `{symbol}_{hash prefix}/` under `output_dir` containing:
/// - `exploration.json`
/// - `momentum_grid.csv` and `mean_reversion_grid.csv`
/// - `sharpe.md`
/// - `preferred_series.csv` when a preferred parameterization exists
pub fn save_artifacts(exploration: &Exploration, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = exploration.dataset_hash.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", exploration.symbol, prefix));

    write_artifact(
        &run_dir.join("exploration.json"),
        &export_exploration_json(exploration)?,
    )?;
    write_artifact(
        &run_dir.join("momentum_grid.csv"),
        &export_grid_csv(&exploration.momentum)?,
    )?;
    write_artifact(
        &run_dir.join("mean_reversion_grid.csv"),
        &export_grid_csv(&exploration.mean_reversion)?,
    )?;

    let mut md = format!("# {} Parameter Exploration\n\n", exploration.symbol);
    md.push_str(&format!(
        "Risk-free rate: {:.3}% ({})\n\n",
        exploration.risk_free.rate * 100.0,
        exploration.risk_free.source
    ));
    md.push_str(&sharpe_table_markdown(&exploration.momentum));
    md.push('\n');
    md.push_str(&sharpe_table_markdown(&exploration.mean_reversion));
    write_artifact(&run_dir.join("sharpe.md"), &md)?;

    if let Some(preferred) = exploration.preferred() {
        write_artifact(
            &run_dir.join("preferred_series.csv"),
            &export_series_csv(&preferred.series)?,
        )?;
    }

    tracing::info!(dir = %run_dir.display(), "saved exploration artifacts");
    Ok(run_dir)
}

/// Load an exploration from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<Exploration> {
    let path = dir.join("exploration.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_exploration_json(&json)
}
