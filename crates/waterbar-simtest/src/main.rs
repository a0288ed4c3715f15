//! Water Bar Headless Simulation Harness
//!
//! Validates the hydration model end-to-end and replays a day plan.
//! Runs entirely in-process with no storage or networking.
//!
//! Usage:
//!   cargo run -p waterbar-simtest
//!   cargo run -p waterbar-simtest -- --verbose
//!   cargo run -p waterbar-simtest -- --plan day.json --profile me.json --seed 7

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use waterbar_logic::apply::{apply_action, apply_action_checked};
use waterbar_logic::catalog::{negate, ActionCatalog, ActionId, CATALOG_JSON};
use waterbar_logic::compartment::CompartmentState;
use waterbar_logic::config::{validate_config, ModelConfig, QuantityPolicy};
use waterbar_logic::persistence::{load_timeline, save_timeline};
use waterbar_logic::profile::{
    daily_water_requirement_ml, estimate_total_body_water, initial_state_from_profile,
    BiologicalSex, UserProfile,
};
use waterbar_logic::scoring::{calculate_hydration_status, score_breakdown, HydrationBand};
use waterbar_logic::timeline::{time_slots, EventSource, NewEvent, TimeOfDay, Timeline};

// ── Default day plan (same JSON the tests use) ──────────────────────────
const PLAN_JSON: &str = include_str!("../../../data/example_plan.json");

#[derive(Debug, Parser)]
#[command(name = "waterbar-simtest", about = "Validate and replay the hydration model")]
struct Args {
    /// Print every check, not only failures
    #[arg(short, long)]
    verbose: bool,
    /// Model configuration JSON (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Action catalog JSON (builtin catalog when omitted)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Day plan JSON to replay (bundled example when omitted)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// User profile JSON used to seed the initial state
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Seed for the random action sweep
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of random actions in the sweep
    #[arg(long, default_value_t = 500)]
    steps: usize,
}

#[derive(Debug, Deserialize)]
struct PlanStep {
    time: TimeOfDay,
    action_id: ActionId,
    #[serde(default = "default_source")]
    source: EventSource,
    /// Confirm a provisional event right after recording it.
    #[serde(default)]
    confirm: bool,
}

fn default_source() -> EventSource {
    EventSource::User
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn instant(offset_secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(1_735_689_600 + offset_secs, 0)
        .single()
        .context("timestamp out of range")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match &args.config {
        Some(path) => read_json(path)?,
        None => ModelConfig::default(),
    };
    let owned_catalog = match &args.catalog {
        Some(path) => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Some(ActionCatalog::from_json(&text)?)
        }
        None => None,
    };
    let catalog = owned_catalog.as_ref().unwrap_or_else(|| ActionCatalog::builtin());
    let profile: Option<UserProfile> = args.profile.as_deref().map(read_json::<UserProfile>).transpose()?;
    let plan: Vec<PlanStep> = match &args.plan {
        Some(path) => read_json(path)?,
        None => serde_json::from_str(PLAN_JSON).context("parsing bundled plan")?,
    };

    println!("=== Water Bar Model Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog validation
    results.extend(validate_catalog(catalog));

    // 2. Configuration
    results.extend(validate_configuration(&config));

    // 3. Scorer reference scenarios
    results.extend(validate_scoring(catalog, &config));

    // 4. Applicator laws
    results.extend(validate_applicator(catalog));

    // 5. Timeline derivation
    results.extend(validate_timeline(catalog, &config)?);

    // 6. Profile initialization
    results.extend(validate_profile(profile.as_ref(), &config));

    // 7. Random action sweep
    results.extend(random_sweep(catalog, &config, args.seed, args.steps));

    // 8. Day plan replay
    let initial = match &profile {
        Some(p) => initial_state_from_profile(&CompartmentState::baseline(), p, &config)?,
        None => CompartmentState::baseline(),
    };
    results.extend(replay_plan(catalog, &config, initial, &plan, args.verbose)?);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &ActionCatalog) -> Vec<TestResult> {
    println!("--- Action Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !catalog.is_empty(),
        detail: format!("{} actions loaded", catalog.len()),
    });

    let bundled = ActionCatalog::from_json(CATALOG_JSON);
    results.push(TestResult {
        name: "catalog_bundled_json_parses".into(),
        passed: bundled.is_ok(),
        detail: match &bundled {
            Ok(c) => format!("{} actions in data/action_catalog.json", c.len()),
            Err(e) => format!("parse error: {}", e),
        },
    });

    let inert: Vec<_> = catalog
        .iter()
        .filter(|a| a.effects.values().all(|s| s.is_empty()) && a.hormones.is_empty())
        .map(|a| a.id.to_string())
        .collect();
    results.push(TestResult {
        name: "catalog_actions_have_effects".into(),
        passed: inert.is_empty(),
        detail: if inert.is_empty() {
            "every action changes something".into()
        } else {
            format!("actions with no effect: {}", inert.join(", "))
        },
    });

    let undocumented: Vec<_> = catalog
        .iter()
        .filter(|a| a.description.trim().is_empty() || a.name.trim().is_empty())
        .map(|a| a.id.to_string())
        .collect();
    results.push(TestResult {
        name: "catalog_actions_described".into(),
        passed: undocumented.is_empty(),
        detail: if undocumented.is_empty() {
            "all actions have a name and description".into()
        } else {
            format!("missing text: {}", undocumented.join(", "))
        },
    });

    let hydrating = catalog.iter().filter(|a| a.water_delta() > 0.0).count();
    results.push(TestResult {
        name: "catalog_has_hydrating_action".into(),
        passed: hydrating > 0,
        detail: format!("{} actions add water", hydrating),
    });

    results
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn validate_configuration(config: &ModelConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let errors = validate_config(config);
    vec![TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "quantity={:?}, hormones={:?}, tbw={:?}",
                config.quantity_policy, config.hormone_policy, config.tbw_formula
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    }]
}

// ── 3. Scoring ──────────────────────────────────────────────────────────

fn validate_scoring(catalog: &ActionCatalog, config: &ModelConfig) -> Vec<TestResult> {
    println!("--- Hydration Scorer ---");
    let mut results = Vec::new();
    let scoring = &config.scoring;

    let baseline = calculate_hydration_status(&CompartmentState::baseline(), scoring);
    results.push(TestResult {
        name: "score_baseline".into(),
        passed: baseline.score == 100 && baseline.band == HydrationBand::WellHydrated,
        detail: format!("baseline → {} ({})", baseline.score, baseline.status),
    });

    if let Some(exercise) = catalog.get("exercise") {
        let state = apply_action(&CompartmentState::baseline(), exercise);
        let b = score_breakdown(&state, scoring);
        let status = calculate_hydration_status(&state, scoring);
        results.push(TestResult {
            name: "score_after_exercise".into(),
            passed: (b.hydration_percent - 90.0).abs() < 1e-9 && status.score < baseline.score,
            detail: format!(
                "hydration {:.1}%, ratio {:.2}, electrolytes {:.1} → {} ({})",
                b.hydration_percent, b.ratio_score, b.electrolyte_score, status.score, status.status
            ),
        });
    }

    let dry = score_breakdown(&CompartmentState::empty(), scoring);
    results.push(TestResult {
        name: "score_zero_water".into(),
        passed: dry.hydration_percent == 0.0 && !dry.overall.is_nan(),
        detail: format!("empty state → overall {:.1}", dry.overall),
    });

    let bands = [20.0, 50.0, 70.0, 90.0].map(|s| HydrationBand::from_score(s, scoring));
    results.push(TestResult {
        name: "score_bands_ordered".into(),
        passed: bands.windows(2).all(|w| w[0] < w[1]),
        detail: format!("{:?}", bands),
    });

    results
}

// ── 4. Applicator ───────────────────────────────────────────────────────

fn validate_applicator(catalog: &ActionCatalog) -> Vec<TestResult> {
    println!("--- Action Applicator ---");
    let mut results = Vec::new();
    let base = CompartmentState::baseline();

    let not_restored: Vec<_> = catalog
        .iter()
        .filter(|a| {
            let back = apply_action(&apply_action(&base, a), &negate(a));
            !back.approx_eq(&base, 1e-9)
        })
        .map(|a| a.id.to_string())
        .collect();
    results.push(TestResult {
        name: "apply_inverse_round_trip".into(),
        passed: not_restored.is_empty(),
        detail: if not_restored.is_empty() {
            format!("{} actions undo cleanly", catalog.len())
        } else {
            format!("not restored: {}", not_restored.join(", "))
        },
    });

    let snapshot = base;
    for action in catalog.iter() {
        let _ = apply_action(&base, action);
    }
    results.push(TestResult {
        name: "apply_input_untouched".into(),
        passed: snapshot == base,
        detail: "applying every action leaves the input intact".into(),
    });

    results
}

// ── 5. Timeline ─────────────────────────────────────────────────────────

fn validate_timeline(catalog: &ActionCatalog, config: &ModelConfig) -> Result<Vec<TestResult>> {
    println!("--- Timeline ---");
    let mut results = Vec::new();

    let Some(first) = catalog.iter().find(|a| a.water_delta() > 0.0) else {
        return Ok(results);
    };

    let mut timeline = Timeline::default();
    let record = |timeline: &mut Timeline, time: &str, source: EventSource, offset: i64| -> Result<()> {
        timeline.record(
            catalog,
            config,
            NewEvent {
                time: time.parse()?,
                action_id: first.id.clone(),
                source,
                timestamp: instant(offset)?,
            },
        )?;
        Ok(())
    };
    record(&mut timeline, "08:00", EventSource::User, 0)?;
    record(&mut timeline, "10:00", EventSource::Ai, 1)?;
    record(&mut timeline, "09:00", EventSource::User, 2)?;

    let s3 = timeline.events()[2].state;
    let derived = timeline.state_at("09:30".parse()?);
    results.push(TestResult {
        name: "timeline_latest_confirmed".into(),
        passed: derived == s3,
        detail: "09:30 resolves to the confirmed 09:00 event".into(),
    });

    results.push(TestResult {
        name: "timeline_before_first_event".into(),
        passed: timeline.state_at("07:00".parse()?) == *timeline.initial(),
        detail: "07:00 resolves to the initial state".into(),
    });

    let mut bytes = Vec::new();
    save_timeline(&mut bytes, &timeline)?;
    let restored = load_timeline(bytes.as_slice())?;
    results.push(TestResult {
        name: "timeline_snapshot_round_trip".into(),
        passed: restored == timeline,
        detail: format!("{} events, {} bytes", restored.len(), bytes.len()),
    });

    Ok(results)
}

// ── 6. Profile ──────────────────────────────────────────────────────────

fn validate_profile(profile: Option<&UserProfile>, config: &ModelConfig) -> Vec<TestResult> {
    println!("--- Profile ---");
    let mut results = Vec::new();

    let sample = UserProfile {
        height_cm: Some(175.0),
        weight_kg: Some(70.0),
        age: Some(30),
        sex: Some(BiologicalSex::Male),
        ..UserProfile::default()
    };
    let profile = profile.unwrap_or(&sample);

    match estimate_total_body_water(profile, config.tbw_formula) {
        Ok(tbw) => {
            results.push(TestResult {
                name: "profile_tbw_plausible".into(),
                passed: (10.0..=80.0).contains(&tbw),
                detail: format!("estimated TBW {:.1} L", tbw),
            });
            match initial_state_from_profile(&CompartmentState::baseline(), profile, config) {
                Ok(state) => results.push(TestResult {
                    name: "profile_split_sums".into(),
                    passed: (state.total_water() - tbw).abs() <= 0.15,
                    detail: format!("split {:?}", state.water_split()),
                }),
                Err(e) => results.push(TestResult {
                    name: "profile_split_sums".into(),
                    passed: false,
                    detail: e.to_string(),
                }),
            }
        }
        Err(e) => results.push(TestResult {
            name: "profile_tbw_plausible".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    if let Ok(ml) = daily_water_requirement_ml(profile) {
        results.push(TestResult {
            name: "profile_daily_requirement".into(),
            passed: ml > 0,
            detail: format!("{} ml/day", ml),
        });
    }

    results
}

// ── 7. Random sweep ─────────────────────────────────────────────────────

fn random_sweep(
    catalog: &ActionCatalog,
    config: &ModelConfig,
    seed: u64,
    steps: usize,
) -> Vec<TestResult> {
    println!("--- Random Sweep (seed {}, {} steps) ---", seed, steps);
    let mut rng = StdRng::seed_from_u64(seed);
    let actions: Vec<_> = catalog.iter().collect();

    let mut state = CompartmentState::baseline();
    let mut rejected = 0usize;
    let mut out_of_range = 0usize;
    let mut min_score = i32::MAX;
    let mut max_score = i32::MIN;
    let mut first_negative = None;

    for _ in 0..steps {
        let Some(action) = actions.choose(&mut rng) else {
            break;
        };
        match apply_action_checked(&state, action, config) {
            Ok(next) => state = next,
            Err(_) => rejected += 1,
        }
        let status = calculate_hydration_status(&state, &config.scoring);
        if !(0..=100).contains(&status.score) {
            out_of_range += 1;
        }
        min_score = min_score.min(status.score);
        max_score = max_score.max(status.score);
        if first_negative.is_none() {
            first_negative = state.lowest_negative();
        }
    }
    let negatives_allowed = config.quantity_policy == QuantityPolicy::Allow;

    log::info!(
        "sweep done: {} rejected, final total water {:.1} L",
        rejected,
        state.total_water()
    );

    vec![
        TestResult {
            name: "sweep_scores_in_range".into(),
            passed: out_of_range == 0,
            detail: format!(
                "scores {}..={}, {} out of range, {} rejected",
                min_score, max_score, out_of_range, rejected
            ),
        },
        TestResult {
            name: "sweep_quantities_non_negative".into(),
            passed: negatives_allowed || first_negative.is_none(),
            detail: match first_negative {
                Some((c, s, v)) => format!("{}.{} reached {:.2}", c, s, v),
                None => "no quantity went below zero".into(),
            },
        },
        TestResult {
            name: "sweep_state_finite".into(),
            passed: state.quantities().all(|(_, _, v)| v.is_finite())
                && state.hormones.iter().all(|(_, v)| v.is_finite()),
            detail: format!("final osmotic gradient {:.0}", state.osmotic_gradient()),
        },
    ]
}

// ── 8. Plan replay ──────────────────────────────────────────────────────

fn replay_plan(
    catalog: &ActionCatalog,
    config: &ModelConfig,
    initial: CompartmentState,
    plan: &[PlanStep],
    verbose: bool,
) -> Result<Vec<TestResult>> {
    println!("--- Day Plan ({} steps) ---", plan.len());
    let mut timeline = Timeline::new(initial);
    let mut failures = Vec::new();

    let unknown: Vec<_> = plan
        .iter()
        .filter(|step| !catalog.contains(step.action_id.as_str()))
        .map(|step| format!("{} at {}", step.action_id, step.time))
        .collect();

    for (i, step) in plan.iter().enumerate() {
        let recorded = timeline.record(
            catalog,
            config,
            NewEvent {
                time: step.time,
                action_id: step.action_id.clone(),
                source: step.source,
                timestamp: instant(i as i64)?,
            },
        );
        match recorded {
            Ok(event) => {
                let id = event.id;
                if step.confirm {
                    timeline.confirm(id)?;
                    if !timeline.get(id).is_some_and(|e| e.confirmed) {
                        failures.push(format!("{} at {}: not confirmed", step.action_id, step.time));
                    }
                }
            }
            Err(e) => {
                log::warn!("step {} ({} at {}): {}", i, step.action_id, step.time, e);
                failures.push(format!("{} at {}: {}", step.action_id, step.time, e));
            }
        }
    }

    println!("  time   score  status                total H2O  osm gap");
    for slot in time_slots() {
        let state = timeline.state_at(slot);
        let status = calculate_hydration_status(&state, &config.scoring);
        if verbose || slot.hour() % 3 == 0 {
            println!(
                "  {}  {:>5}  {:<20}  {:>8.1}  {:>7.0}",
                slot,
                status.score,
                status.status,
                state.total_water(),
                state.osmotic_gradient()
            );
        }
    }

    Ok(vec![
        TestResult {
            name: "plan_actions_known".into(),
            passed: unknown.is_empty(),
            detail: if unknown.is_empty() {
                "every plan step names a catalog action".into()
            } else {
                format!("unknown: {}", unknown.join(", "))
            },
        },
        TestResult {
            name: "plan_steps_recorded".into(),
            passed: failures.is_empty(),
            detail: if failures.is_empty() {
                format!(
                    "{} events, {} pending",
                    timeline.len(),
                    timeline.pending().count()
                )
            } else {
                failures.join("; ")
            },
        },
        TestResult {
            name: "plan_end_of_day_scored".into(),
            passed: {
                let end = timeline.state_at("23:59".parse()?);
                !score_breakdown(&end, &config.scoring).overall.is_nan()
            },
            detail: format!(
                "end of day: {}",
                calculate_hydration_status(&timeline.state_at("23:59".parse()?), &config.scoring)
                    .status
            ),
        },
    ])
}
