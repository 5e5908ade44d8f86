//! Command-line front end for cdag-core
//!
//! [`cli`] builds the argument parser and [`run`] executes a parsed command,
//! returning the rendered output so that callers (and tests) decide where it
//! goes.

use anyhow::{bail, Context};
use cdag_core::prelude::*;
use cdag_core::{classify, AdjustmentCheck, AdjustmentWarning};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Exit status when the effect is not identifiable from observed nodes
pub const EXIT_NOT_IDENTIFIABLE: i32 = 2;

/// Rendered result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Text or JSON destined for stdout
    pub body: String,
    /// Process exit status
    pub exit_code: i32,
}

impl Output {
    fn ok(body: String) -> Self {
        Self { body, exit_code: 0 }
    }
}

/// Argument parser for the `cdag` binary
pub fn cli() -> Command {
    let given = Arg::new("given")
        .long("given")
        .value_delimiter(',')
        .help("Conditioning set, comma separated");

    Command::new("cdag")
        .version(cdag_core::VERSION)
        .about("Path finding and adjustment sets for causal DAGs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("dag")
                .long("dag")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("DAG declaration file (.toml or .json)"),
        )
        .arg(
            Arg::new("exposure")
                .long("exposure")
                .global(true)
                .help("Override the exposure declared in the file"),
        )
        .arg(
            Arg::new("outcome")
                .long("outcome")
                .global(true)
                .help("Override the outcome declared in the file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log search and solver progress to stderr"),
        )
        .arg(
            Arg::new("max-paths")
                .long("max-paths")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum number of paths to enumerate"),
        )
        .arg(
            Arg::new("max-candidates")
                .long("max-candidates")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum adjustment candidates to search over"),
        )
        .subcommand(
            Command::new("paths")
                .about("List every path between exposure and outcome")
                .arg(given.clone()),
        )
        .subcommand(Command::new("adjust").about("Compute all minimal adjustment sets"))
        .subcommand(
            Command::new("check")
                .about("Evaluate a proposed adjustment set")
                .arg(given.required(true)),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify a node as fork, chain or collider between exposure and outcome")
                .arg(Arg::new("node").long("node").required(true).help("Middle node")),
        )
        .subcommand(Command::new("warnings").about("List nodes that must not be adjusted for"))
}

#[derive(Serialize)]
struct PathRow<'a> {
    path: &'a Path,
    rendered: String,
    kind: &'static str,
    open: bool,
}

#[derive(Serialize)]
struct PathsReport<'a> {
    exposure: &'a str,
    outcome: &'a str,
    given: &'a [String],
    paths: Vec<PathRow<'a>>,
}

#[derive(Serialize)]
struct AdjustReport<'a> {
    exposure: &'a str,
    outcome: &'a str,
    identifiable: bool,
    sets: Vec<AdjustmentSet>,
}

#[derive(Serialize)]
struct ClassifyReport<'a> {
    exposure: &'a str,
    node: &'a str,
    outcome: &'a str,
    junction: Junction,
}

/// Execute a parsed command line
pub fn run(matches: &ArgMatches) -> anyhow::Result<Output> {
    let dag = load(matches)?;
    let (exposure, outcome) = endpoints(&dag, matches)?;
    let json = matches.get_flag("json");
    let solver = AdjustmentSetSolver::new(&dag, &exposure, &outcome)
        .with_context(|| format!("cannot analyse {exposure} -> {outcome}"))?;

    match matches.subcommand() {
        Some(("paths", args)) => {
            let given = given(args);
            let rows = solver
                .finder()
                .collect_paths()?
                .iter()
                .map(|p| p.is_open(&dag, &given).map(|open| (p.clone(), open)))
                .collect::<Result<Vec<_>, _>>()?;
            let report = PathsReport {
                exposure: &exposure,
                outcome: &outcome,
                given: &given,
                paths: rows
                    .iter()
                    .map(|(path, open)| PathRow {
                        path,
                        rendered: path.to_string(),
                        kind: if path.is_causal() { "causal" } else { "backdoor" },
                        open: *open,
                    })
                    .collect(),
            };
            render(json, &report, render_paths)
        }
        Some(("adjust", _)) => match solver.find_adjustment_sets() {
            Ok(sets) => {
                info!(count = sets.len(), "adjustment sets");
                let report = AdjustReport {
                    exposure: &exposure,
                    outcome: &outcome,
                    identifiable: true,
                    sets,
                };
                render(json, &report, render_adjust)
            }
            Err(err @ AnalysisError::NoValidAdjustmentSet { .. }) => {
                debug!(%err, "not identifiable");
                let report = AdjustReport {
                    exposure: &exposure,
                    outcome: &outcome,
                    identifiable: false,
                    sets: Vec::new(),
                };
                let mut output = render(json, &report, render_adjust)?;
                output.exit_code = EXIT_NOT_IDENTIFIABLE;
                Ok(output)
            }
            Err(err) => Err(err).context("adjustment search failed"),
        },
        Some(("check", args)) => {
            let check = solver.check_adjustment(given(args))?;
            let mut output = render(json, &check, render_check)?;
            if !check.valid {
                output.exit_code = 1;
            }
            Ok(output)
        }
        Some(("classify", args)) => {
            let Some(node) = args.get_one::<String>("node") else {
                bail!("--node is required");
            };
            let junction = classify(&dag, &exposure, node, &outcome)?;
            let report = ClassifyReport {
                exposure: &exposure,
                node,
                outcome: &outcome,
                junction,
            };
            render(json, &report, |r| {
                format!("{} - {} - {}: {}\n", r.exposure, r.node, r.outcome, r.junction)
            })
        }
        Some(("warnings", _)) => {
            let warnings = solver.adjustment_warnings()?;
            render(json, warnings.as_slice(), render_warnings)
        }
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    }
}

fn load(matches: &ArgMatches) -> anyhow::Result<CausalDag> {
    let Some(path) = matches.get_one::<PathBuf>("dag") else {
        bail!("--dag <FILE> is required");
    };
    let mut file =
        DagFile::load(path).with_context(|| format!("failed to read {}", path.display()))?;

    if let Some(&max_paths) = matches.get_one::<usize>("max-paths") {
        file.limits.max_paths = max_paths;
    }
    if let Some(&max_candidates) = matches.get_one::<usize>("max-candidates") {
        file.limits.max_candidates = max_candidates;
    }

    let dag = file
        .build()
        .with_context(|| format!("invalid graph in {}", path.display()))?;
    debug!(
        nodes = dag.node_count(),
        edges = dag.edge_count(),
        "graph loaded"
    );
    Ok(dag)
}

fn endpoints(dag: &CausalDag, matches: &ArgMatches) -> anyhow::Result<(String, String)> {
    let pick = |flag: &str, declared: Option<&str>| {
        matches
            .get_one::<String>(flag)
            .map(String::as_str)
            .or(declared)
            .map(str::to_string)
            .with_context(|| format!("no {flag} declared; pass --{flag}"))
    };
    Ok((
        pick("exposure", dag.exposure())?,
        pick("outcome", dag.outcome())?,
    ))
}

fn given(args: &ArgMatches) -> Vec<String> {
    args.get_many::<String>("given")
        .map(|values| {
            values
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn render<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl Fn(&T) -> String,
) -> anyhow::Result<Output> {
    if json {
        let mut body = serde_json::to_string_pretty(value)?;
        body.push('\n');
        Ok(Output::ok(body))
    } else {
        Ok(Output::ok(text(value)))
    }
}

fn render_paths(report: &PathsReport<'_>) -> String {
    let mut out = format!("Paths from {} to {}", report.exposure, report.outcome);
    if !report.given.is_empty() {
        out.push_str(&format!(" given {{{}}}", report.given.join(", ")));
    }
    out.push('\n');
    for row in &report.paths {
        let status = if row.open { "open" } else { "blocked" };
        out.push_str(&format!("  {:<8} {:<7} {}\n", row.kind, status, row.rendered));
    }
    if report.paths.is_empty() {
        out.push_str("  (none)\n");
    }
    out
}

fn render_adjust(report: &AdjustReport<'_>) -> String {
    if !report.identifiable {
        return format!(
            "No observable adjustment set identifies the effect of {} on {}\n",
            report.exposure, report.outcome
        );
    }
    let mut out = format!(
        "Minimal adjustment sets for {} -> {}\n",
        report.exposure, report.outcome
    );
    for set in &report.sets {
        out.push_str(&format!("  {set}\n"));
    }
    out
}

fn render_check(check: &AdjustmentCheck) -> String {
    let verdict = if check.valid { "valid" } else { "invalid" };
    let mut out = format!("{} is {verdict}\n", check.set);
    for path in &check.open_backdoor_paths {
        out.push_str(&format!("  open backdoor: {path}\n"));
    }
    for path in &check.blocked_causal_paths {
        out.push_str(&format!("  blocked causal: {path}\n"));
    }
    for warning in &check.warnings {
        out.push_str(&format!("  {}: {}\n", warning.node, warning.kind));
    }
    out
}

fn render_warnings(warnings: &[AdjustmentWarning]) -> String {
    warnings
        .iter()
        .map(|w| format!("{}: {}\n", w.node, w.kind))
        .collect()
}
