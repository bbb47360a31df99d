// src/main.rs

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use reconcile_lib::config::{AliasTable, ReconcilerConfig};
use reconcile_lib::merging::executor::{EntityStore, MergeExecutor, MergeOutcome};
use reconcile_lib::models::core::Entity;
use reconcile_lib::pipeline::run_reconciliation_pass;
use reconcile_lib::report::ReviewDecision;
use reconcile_lib::utils::env::load_env;
use reconcile_lib::utils::progress::ProgressConfig;

/// Batch reconciliation over a catalog pool exported as JSON
#[derive(Debug, Parser)]
#[command(name = "reconcile")]
struct Args {
    /// Pool of entity records to reconcile (JSON array)
    #[arg(long)]
    input: PathBuf,

    /// Where to write the reconciliation report (JSON)
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Where to write the needs-review export (JSON)
    #[arg(long)]
    review_out: Option<PathBuf>,

    /// Where to write the updated pool after merges (JSON)
    #[arg(long)]
    pool_out: Option<PathBuf>,

    /// Human review decisions from a previous run (JSON)
    #[arg(long)]
    decisions: Option<PathBuf>,

    /// Alias table mapping name variants to canonical forms (JSON object)
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Apply auto-eligible (and approved) merges to the pool
    #[arg(long)]
    apply: bool,

    /// Temporal pre-filter window in years
    #[arg(long, default_value_t = 1)]
    year_window: i32,

    /// Coarse audit sweep: disable the temporal pre-filter entirely
    #[arg(long)]
    sweep: bool,
}

fn build_config(args: &Args) -> Result<ReconcilerConfig> {
    let mut config = ReconcilerConfig::new();
    config.year_window = if args.sweep {
        None
    } else {
        Some(args.year_window)
    };

    if let Some(path) = &args.aliases {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias table {}", path.display()))?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&raw).context("Alias table is not a JSON object of strings")?;
        let mut table = AliasTable::new();
        for (variant, canonical) in &entries {
            table.insert(variant, canonical);
        }
        config.aliases = table;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    info!("Starting catalog reconciliation run");
    let progress = ProgressConfig::from_env();
    let config = build_config(&args)?;

    // Phase 1: load the pool
    let phase1_start = Instant::now();
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read pool {}", args.input.display()))?;
    let pool: Vec<Entity> = serde_json::from_str(&raw).context("Pool is not a JSON entity array")?;
    let phase1_duration = phase1_start.elapsed();
    info!("Loaded {} records in {:.2?}", pool.len(), phase1_duration);

    let decisions: Vec<ReviewDecision> = match &args.decisions {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read decisions {}", path.display()))?;
            serde_json::from_str(&raw).context("Decisions file is not a JSON decision array")?
        }
        None => Vec::new(),
    };
    if !decisions.is_empty() {
        info!("Loaded {} review decisions", decisions.len());
    }

    // Phase 2: match and classify
    let phase2_start = Instant::now();
    let report = run_reconciliation_pass(&pool, &config, &progress)?;
    let phase2_duration = phase2_start.elapsed();

    let min_confidence = config.thresholds.auto_apply_min_confidence;
    let summary = report.summary(min_confidence);

    if let Some(path) = &args.report_out {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    if let Some(path) = &args.review_out {
        let items = report.review_export(min_confidence);
        fs::write(path, serde_json::to_string_pretty(&items)?)
            .with_context(|| format!("Failed to write review export {}", path.display()))?;
        info!("{} review items written to {}", items.len(), path.display());
    }

    // Phase 3: apply merges
    let phase3_start = Instant::now();
    let mut applied = 0;
    let mut skipped = 0;
    if args.apply {
        let mut store = EntityStore::from_entities(pool);
        let mut executor = MergeExecutor::new(&mut store, config.trust.clone());
        let mut outcomes = executor.apply_auto(&report, min_confidence);
        outcomes.extend(executor.apply_approved(&report, &decisions));
        for outcome in &outcomes {
            match outcome {
                MergeOutcome::Applied(_) => applied += 1,
                _ => skipped += 1,
            }
        }

        if let Some(path) = &args.pool_out {
            let entities = store.into_entities();
            fs::write(path, serde_json::to_string_pretty(&entities)?)
                .with_context(|| format!("Failed to write pool {}", path.display()))?;
            info!("Updated pool written to {}", path.display());
        }
    }

    info!("=== Run Summary ===");
    info!("Run ID: {}", report.run_id);
    info!("Candidate pairs classified: {}", summary.total);
    info!(
        "Verdicts: {} identical, {} same-entity, {} variant, {} ambiguous, {} distinct",
        summary.identical,
        summary.same_entity,
        summary.same_entity_variant,
        summary.ambiguous,
        summary.distinct
    );
    info!(
        "Buckets: {} auto-apply, {} needs review",
        summary.auto_apply, summary.needs_review
    );
    if args.apply {
        info!("Merges applied: {} ({} skipped)", applied, skipped);
    } else {
        info!("Dry run: no merges applied (pass --apply to merge)");
    }
    info!("=== Timing Breakdown ===");
    info!("Phase 1 (Load): {:.2?}", phase1_duration);
    info!("Phase 2 (Match & Classify): {:.2?}", phase2_duration);
    if args.apply {
        info!("Phase 3 (Merge): {:.2?}", phase3_start.elapsed());
    }

    info!("Reconciliation run completed successfully!");
    Ok(())
}
