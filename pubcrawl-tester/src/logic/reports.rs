use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::distribution::DistributionAggregate;

#[derive(Serialize)]
struct JsonReport<'a> {
    scenarios: &'a [ScenarioResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution: Option<&'a DistributionAggregate>,
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    distribution: Option<&DistributionAggregate>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    // Overall stats
    writeln!(out, "Total scenario runs: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }

    if let Some(aggregate) = distribution {
        writeln!(out)?;
        write_console_distribution(out, aggregate)?;
    }
    Ok(())
}

fn write_console_distribution(
    out: &mut dyn Write,
    aggregate: &DistributionAggregate,
) -> Result<()> {
    writeln!(out, "{}", "🎲 Draw Distribution Summary".bright_magenta().bold())?;
    writeln!(out, "{}", "===========================".magenta())?;
    writeln!(
        out,
        "Seeds: {} | Draws: {} | Back-to-back repeats: {}",
        aggregate.seeds, aggregate.draws, aggregate.repeats
    )?;
    for share in &aggregate.shares {
        writeln!(
            out,
            "  {:<6} observed {:>5.1}% expected {:>5.1}% (±{:.1})",
            share.difficulty.to_string(),
            share.observed * 100.0,
            share.expected * 100.0,
            share.deviation() * 100.0
        )?;
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    distribution: Option<&DistributionAggregate>,
) -> Result<()> {
    let report = JsonReport {
        scenarios: results,
        distribution,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    distribution: Option<&DistributionAggregate>,
) -> Result<()> {
    writeln!(out, "# Pub Crawl Logic Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenario runs**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    if !results.is_empty() {
        writeln!(out, "## Detailed Results\n")?;
    }
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(out, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }

    if let Some(aggregate) = distribution {
        writeln!(out, "## Draw Distribution\n")?;
        writeln!(
            out,
            "{} draws over {} seeds, {} back-to-back repeats.\n",
            aggregate.draws, aggregate.seeds, aggregate.repeats
        )?;
        writeln!(out, "| Tier | Observed | Expected |")?;
        writeln!(out, "|------|----------|----------|")?;
        for share in &aggregate.shares {
            writeln!(
                out,
                "| {} | {:.1}% | {:.1}% |",
                share.difficulty,
                share.observed * 100.0,
                share.expected * 100.0
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::distribution::{TierCounts, TierShare};
    use pubcrawl_game::Difficulty;

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1337,
            passed,
            iterations_run: 2,
            successful_iterations: usize::from(passed) * 2,
            failures: if passed {
                Vec::new()
            } else {
                vec!["count stuck at 0".to_string(), "count stuck at 0".to_string()]
            },
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    fn sample_distribution() -> DistributionAggregate {
        DistributionAggregate {
            seeds: 1,
            draws: 100,
            counts: TierCounts {
                easy: 51,
                medium: 34,
                hard: 15,
            },
            repeats: 0,
            shares: vec![TierShare {
                difficulty: Difficulty::Easy,
                expected: 0.5,
                observed: 0.51,
            }],
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_lists_failures_and_distribution() {
        let results = [sample_result(true), sample_result(false)];
        let dist = sample_distribution();
        let text = render(|out| {
            generate_console_report(out, &results, Some(&dist), Duration::from_millis(9))
        });
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("count stuck at 0"));
        assert!(text.contains("Draw Distribution Summary"));
        assert!(text.contains("Performance Summary"));
    }

    #[test]
    fn json_nests_scenarios_and_distribution() {
        let results = [sample_result(true)];
        let dist = sample_distribution();
        let text = render(|out| generate_json_report(out, &results, Some(&dist)));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["scenarios"][0]["scenario_name"], "Smoke Test");
        assert_eq!(value["distribution"]["counts"]["easy"], 51);

        let text = render(|out| generate_json_report(out, &results, None));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("distribution").is_none());
    }

    #[test]
    fn markdown_has_table_rows() {
        let dist = sample_distribution();
        let text = render(|out| generate_markdown_report(out, &[sample_result(true)], Some(&dist)));
        assert!(text.starts_with("# Pub Crawl Logic Test Results"));
        assert!(text.contains("### ✅ Smoke Test (seed 1337)"));
        assert!(text.contains("| easy | 51.0% | 50.0% |"));
    }
}
