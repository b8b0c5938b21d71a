use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use pubcrawl_game::{Action, ActionOutcome, Effect, MachineState, SessionState};

use crate::common::scenario::TestScenario;
use crate::logic::{SimulationPlan, SimulationSummary, Step};

const OVERFLOW_TOAST: &str = "🎊 The Adventure Continues...";

#[derive(Debug, Clone)]
pub struct CatalogScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub plan: SimulationPlan,
}

impl CatalogScenario {
    fn new(key: &'static str, name: &'static str, plan: SimulationPlan) -> Self {
        Self { key, name, plan }
    }

    #[must_use]
    pub fn into_test_scenario(self) -> TestScenario {
        TestScenario::simulation(self.name, self.plan)
    }
}

pub fn catalog_scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "smoke",
            "Smoke Test",
            SimulationPlan::new()
                .press(Action::RequestChallenge)
                .press(Action::CompleteChallenge)
                .press(Action::RequestChallenge)
                .press(Action::SkipChallenge)
                .with_expectation(smoke_expectation),
        ),
        CatalogScenario::new(
            "complete-cycle",
            "Challenge Completion Cycle",
            SimulationPlan::new()
                .complete_rounds(6)
                .with_expectation(single_step_counts_expectation)
                .with_expectation(venue_pulse_expectation),
        ),
        CatalogScenario::new(
            "undo-window",
            "Undo Window",
            SimulationPlan::new()
                .press(Action::RequestChallenge)
                .press(Action::CompleteChallenge)
                .press(Action::Undo)
                .press(Action::RequestChallenge)
                .press(Action::CompleteChallenge)
                .wait(Duration::from_secs(3))
                .press(Action::Undo)
                .with_expectation(undo_window_expectation),
        ),
        CatalogScenario::new(
            "venue-walk",
            "Venue Walk",
            (0..5)
                .fold(SimulationPlan::new(), |plan, _| plan.press(Action::NextVenue))
                .press(Action::PreviousVenue)
                .press(Action::PreviousVenue)
                .press(Action::PreviousVenue)
                .press(Action::PreviousVenue)
                .press(Action::PreviousVenue)
                .press(Action::PreviousVenue)
                .with_expectation(venue_walk_expectation),
        ),
        CatalogScenario::new(
            "share-prompt-latch",
            "Share Prompt Latch",
            SimulationPlan::new()
                .complete_rounds(3)
                .press(Action::RequestChallenge)
                .press(Action::CompleteChallenge)
                .press(Action::Undo)
                .press(Action::CompleteChallenge)
                .complete_rounds(4)
                .wait(Duration::from_secs(2))
                .reload()
                .complete_rounds(1)
                .wait(Duration::from_secs(2))
                .press(Action::Reset)
                .complete_rounds(4)
                .wait(Duration::from_secs(2))
                .with_expectation(share_latch_expectation),
        ),
        CatalogScenario::new(
            "day-rollover",
            "Day Rollover",
            SimulationPlan::new()
                .complete_rounds(3)
                .press(Action::NextVenue)
                .press(Action::RequestChallenge)
                .reload()
                .next_day()
                .with_expectation(day_rollover_expectation),
        ),
        CatalogScenario::new(
            "input-debounce",
            "Input Debounce",
            SimulationPlan::new()
                .tap(Action::RequestChallenge)
                .tap(Action::CompleteChallenge)
                .wait(Duration::from_millis(600))
                .tap(Action::CompleteChallenge)
                .tap(Action::Undo)
                .with_expectation(debounce_expectation),
        ),
        CatalogScenario::new(
            "no-repeat-draws",
            "No Back-to-Back Repeats",
            (0..40)
                .fold(SimulationPlan::new(), |plan, _| {
                    plan.press(Action::RequestChallenge)
                        .press(Action::SkipChallenge)
                })
                .with_expectation(no_repeat_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<CatalogScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn outcomes_of(summary: &SimulationSummary) -> Vec<ActionOutcome> {
    summary
        .press_outcomes()
        .into_iter()
        .map(|(_, outcome)| outcome)
        .collect()
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        outcomes_of(summary)
            .iter()
            .all(|outcome| *outcome == ActionOutcome::Applied),
        "every spaced press should apply"
    );
    ensure!(state.challenge_count == 1, "expected one completion");
    ensure!(
        state.completed_challenge_log.len() == 1,
        "log should hold the completed challenge"
    );
    ensure!(state.is_idle(), "skip should leave the session idle");
    ensure!(!summary.storage_empty, "progress should be saved");
    Ok(())
}

fn single_step_counts_expectation(summary: &SimulationSummary) -> Result<()> {
    for pair in summary.records.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if after.step != Step::Press(Action::CompleteChallenge) {
            continue;
        }
        ensure!(
            after.outcome == Some(ActionOutcome::Applied),
            "completion was not applied"
        );
        ensure!(
            after.state.challenge_count == before.state.challenge_count + 1,
            "count moved from {} to {}",
            before.state.challenge_count,
            after.state.challenge_count
        );
        ensure!(
            after.state.completions_at_current_venue
                == before.state.completions_at_current_venue + 1,
            "venue completions did not advance by one"
        );
    }
    let state = &summary.final_state;
    ensure!(state.challenge_count == 6, "expected six completions");
    ensure!(
        state.completions_at_current_venue <= state.challenge_count,
        "venue completions exceed total"
    );
    ensure!(
        state.completed_challenge_log.len() == 6,
        "log length {} != 6",
        state.completed_challenge_log.len()
    );
    Ok(())
}

fn venue_pulse_expectation(summary: &SimulationSummary) -> Result<()> {
    let suggestions = summary.count_effects(|effect| matches!(effect, Effect::SuggestNextVenue(_)));
    ensure!(
        suggestions == 4,
        "expected a next-venue nudge from the third completion on, saw {suggestions}"
    );
    Ok(())
}

fn undo_window_expectation(summary: &SimulationSummary) -> Result<()> {
    let outcomes = outcomes_of(summary);
    ensure!(
        outcomes
            == [
                ActionOutcome::Applied,
                ActionOutcome::Applied,
                ActionOutcome::Applied,
                ActionOutcome::Applied,
                ActionOutcome::Applied,
                ActionOutcome::Ignored,
            ],
        "unexpected outcomes {outcomes:?}"
    );
    let undone = summary
        .records
        .iter()
        .find(|record| record.step == Step::Press(Action::Undo))
        .ok_or_else(|| anyhow!("no undo recorded"))?;
    ensure!(
        undone.state.challenge_count == 0,
        "undo should restore the count"
    );
    ensure!(
        undone.state.machine_state() == MachineState::Idle,
        "undo should leave the card cleared"
    );
    ensure!(
        summary.final_state.challenge_count == 1,
        "expired undo must not revert"
    );
    ensure!(!summary.final_view.undo_available, "undo window should be closed");
    Ok(())
}

fn venue_walk_expectation(summary: &SimulationSummary) -> Result<()> {
    let outcomes = outcomes_of(summary);
    ensure!(
        outcomes.last() == Some(&ActionOutcome::Ignored),
        "stepping back from the first venue should be ignored"
    );
    let furthest = summary
        .records
        .iter()
        .map(|record| record.state.current_venue_index)
        .max()
        .unwrap_or_default();
    ensure!(furthest == 6, "expected to walk past the route, reached {furthest}");
    let overflow_toasts = summary
        .count_effects(|effect| matches!(effect, Effect::Toast(text) if text == OVERFLOW_TOAST));
    ensure!(
        overflow_toasts == 2,
        "every stop past the route should get the overflow toast"
    );
    let state = &summary.final_state;
    ensure!(state.current_venue_index == 1, "should be back at the first venue");
    ensure!(
        state.completions_at_current_venue == 0,
        "venue completions should reset on every move"
    );
    Ok(())
}

fn share_latch_expectation(summary: &SimulationSummary) -> Result<()> {
    let prompts = summary.count_effects(|effect| matches!(effect, Effect::SharePrompt(_)));
    ensure!(
        prompts == 2,
        "expected one prompt per session lifetime, saw {prompts}"
    );
    let state = &summary.final_state;
    ensure!(state.challenge_count == 4, "reset should restart the count");
    ensure!(state.share_prompt_shown, "latch should be set again");
    Ok(())
}

fn day_rollover_expectation(summary: &SimulationSummary) -> Result<()> {
    let reloaded = summary
        .records
        .iter()
        .find(|record| record.step == Step::Reload)
        .ok_or_else(|| anyhow!("no reload recorded"))?;
    ensure!(
        reloaded.state.challenge_count == 3 && reloaded.state.current_venue_index == 2,
        "same-day reload lost progress"
    );
    ensure!(
        reloaded.state.active_challenge.is_some(),
        "same-day reload lost the active challenge"
    );
    ensure!(
        summary.final_state == SessionState::fresh(),
        "next day should start fresh"
    );
    ensure!(summary.storage_empty, "stale record should be cleared");
    Ok(())
}

fn debounce_expectation(summary: &SimulationSummary) -> Result<()> {
    let outcomes = outcomes_of(summary);
    ensure!(
        outcomes
            == [
                ActionOutcome::Applied,
                ActionOutcome::Suppressed,
                ActionOutcome::Applied,
                ActionOutcome::Suppressed,
            ],
        "unexpected outcomes {outcomes:?}"
    );
    ensure!(
        summary.final_state.challenge_count == 1,
        "exactly one completion expected"
    );
    ensure!(summary.final_view.input_locked, "guard should still be held");
    Ok(())
}

fn no_repeat_expectation(summary: &SimulationSummary) -> Result<()> {
    let reveals: Vec<&str> = summary
        .effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ChallengeRevealed(challenge) => Some(challenge.text.as_str()),
            _ => None,
        })
        .collect();
    ensure!(reveals.len() == 40, "expected 40 reveals, saw {}", reveals.len());
    if let Some(pair) = reveals.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(anyhow!("back-to-back repeat: {}", pair[0]));
    }
    ensure!(summary.final_state.is_idle(), "skips should leave the session idle");
    Ok(())
}
