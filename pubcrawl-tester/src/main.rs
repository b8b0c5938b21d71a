mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::catalog::catalog_scenarios;
use common::scenario::{DISTRIBUTION_KEY, get_scenario, list_scenarios};
use common::split_csv;
use logic::distribution::DEFAULT_TOLERANCE;
use logic::{
    CrawlTester, DistributionAggregate, LogicTester, aggregate_distribution, resolve_seed_inputs,
    run_distribution_analysis, validate_distribution,
};

#[derive(Debug, Parser)]
#[command(name = "pubcrawl-tester", version = "0.1.0")]
#[command(about = "Seeded QA for the pub crawl session logic and draw distribution")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Challenges drawn per seed by the distribution analysis
    #[arg(long, default_value_t = 10_000)]
    draws: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_tokens = split_csv(&args.seeds);
    let seeds = resolve_seed_inputs(&seed_tokens)?;
    let crawl_tester = CrawlTester::try_new(args.verbose);

    let all_results = run_logic_scenarios(&args, &scenarios, &seeds, &crawl_tester);
    let distribution = gather_distribution(&args, &scenarios, &seeds, &crawl_tester);

    write_reports(&args, &all_results, distribution.as_ref(), start_time)?;

    if let Some(aggregate) = distribution.as_ref() {
        validate_distribution(aggregate, DEFAULT_TOLERANCE)?;
    }

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🍻 Pub Crawl Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in catalog_scenarios()
            .iter()
            .map(|scenario| scenario.key)
            .chain(std::iter::once(DISTRIBUTION_KEY))
        {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    crawl_tester: &CrawlTester,
) -> Vec<logic::ScenarioResult> {
    let mut results: Vec<logic::ScenarioResult> = Vec::new();
    let logic_tester = LogicTester::new(crawl_tester.clone());

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    for scenario_name in scenarios {
        if scenario_name.eq_ignore_ascii_case(DISTRIBUTION_KEY) {
            continue;
        }
        if let Some(scenario) = get_scenario(scenario_name) {
            log::info!("running {} over {} seeds", scenario.name, seeds.len());
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn gather_distribution(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    crawl_tester: &CrawlTester,
) -> Option<DistributionAggregate> {
    if !scenarios
        .iter()
        .any(|s| s.eq_ignore_ascii_case(DISTRIBUTION_KEY))
    {
        return None;
    }
    println!("{}", "🎲 Sampling Challenge Draws".bright_magenta().bold());
    println!("{}", "-".repeat(30).magenta());
    let records = run_distribution_analysis(crawl_tester, seeds, args.draws);
    Some(aggregate_distribution(crawl_tester, &records))
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    distribution: Option<&DistributionAggregate>,
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let nothing_ran = results.is_empty() && distribution.is_none();

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results, distribution)?;
        }
        "markdown" => {
            if nothing_ran {
                writeln!(
                    &mut output_target,
                    "# Pub Crawl Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(
                    &mut output_target,
                    results,
                    distribution,
                )?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if nothing_ran {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    distribution,
                    duration,
                )?;
            }
        }
    }

    if args.report != "json" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ScenarioResult;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            draws: 200,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1337,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    fn temp(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pubcrawl-{label}-{}", std::process::id()))
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all,smoke");
        assert!(expanded.contains(&"smoke".to_string()));
        assert!(expanded.contains(&"undo-window".to_string()));
        assert!(expanded.contains(&DISTRIBUTION_KEY.to_string()));
        assert_eq!(
            expanded.iter().filter(|s| *s == "smoke").count(),
            1,
            "no duplicate runs"
        );
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("venue-walk,smoke");
        assert_eq!(
            expanded,
            vec!["venue-walk".to_string(), "smoke".to_string()]
        );
    }

    #[test]
    fn run_logic_scenarios_skips_unknown_and_distribution() {
        let tester = CrawlTester::try_new(false);
        let names = vec![
            "smoke".to_string(),
            "bogus".to_string(),
            DISTRIBUTION_KEY.to_string(),
        ];
        let results = run_logic_scenarios(&base_args(), &names, &[1, 2], &tester);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn distribution_runs_only_when_requested() {
        let tester = CrawlTester::try_new(false);
        let args = base_args();
        assert!(gather_distribution(&args, &["smoke".to_string()], &[1], &tester).is_none());
        let aggregate =
            gather_distribution(&args, &[DISTRIBUTION_KEY.to_string()], &[1, 2], &tester)
                .unwrap();
        assert_eq!(aggregate.draws, 400);
        assert_eq!(aggregate.seeds, 2);
    }

    #[test]
    fn write_reports_emits_json_output() {
        let path = temp("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], None, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["scenarios"], serde_json::json!([]));
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let path = temp("report-full.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], None, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let path = temp("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], None, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_emits_markdown_report() {
        let path = temp("report-full.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], None, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("# Pub Crawl Logic Test Results"));
        assert!(content.contains("failure"));
    }

    #[test]
    fn write_reports_console_with_nothing_run() {
        let path = temp("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], None, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No logic scenarios executed"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let path = temp("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("share-prompt-latch"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
