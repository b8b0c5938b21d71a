use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use pubcrawl_game::{
    Action, ActionOutcome, ChallengeSession, Effect, ManualClock, ManualScheduler, MemoryStore,
    SessionData, SessionRng, SessionState, SessionStore, SessionView, seeded_rng,
};

type CrawlStore = SessionStore<MemoryStore, MemoryStore, ManualClock>;
type CrawlSession = ChallengeSession<SessionRng, ManualScheduler, CrawlStore, Vec<Effect>>;

/// Gap that comfortably clears the input guard between presses.
pub const PRESS_GAP: Duration = Duration::from_millis(600);

/// One scripted interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Button press through the debounced entry point.
    Press(Action),
    /// Virtual time passes; due timers fire.
    Wait(Duration),
    /// Page reload on the same day.
    Reload,
    /// Reload after the calendar day has rolled over.
    NextDay,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press(action) => write!(f, "press {action}"),
            Self::Wait(delay) => write!(f, "wait {}ms", delay.as_millis()),
            Self::Reload => f.write_str("reload"),
            Self::NextDay => f.write_str("next day"),
        }
    }
}

/// State observed after a step ran.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: Option<ActionOutcome>,
    pub state: SessionState,
}

/// Declarative script plus the checks run against its summary.
#[derive(Debug, Clone, Default)]
pub struct SimulationPlan {
    pub steps: Vec<Step>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Press `action`, then let the input guard lapse.
    #[must_use]
    pub fn press(mut self, action: Action) -> Self {
        self.steps.push(Step::Press(action));
        self.steps.push(Step::Wait(PRESS_GAP));
        self
    }

    /// Press `action` with no pause afterwards.
    #[must_use]
    pub fn tap(mut self, action: Action) -> Self {
        self.steps.push(Step::Press(action));
        self
    }

    #[must_use]
    pub fn wait(mut self, delay: Duration) -> Self {
        self.steps.push(Step::Wait(delay));
        self
    }

    #[must_use]
    pub fn reload(mut self) -> Self {
        self.steps.push(Step::Reload);
        self
    }

    #[must_use]
    pub fn next_day(mut self) -> Self {
        self.steps.push(Step::NextDay);
        self
    }

    /// Request then complete, `times` over.
    #[must_use]
    pub fn complete_rounds(self, times: usize) -> Self {
        (0..times).fold(self, |plan, _| {
            plan.press(Action::RequestChallenge)
                .press(Action::CompleteChallenge)
        })
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub records: Vec<StepRecord>,
    pub effects: Vec<Effect>,
    pub final_state: SessionState,
    pub final_view: SessionView,
    pub reloads: usize,
    pub storage_empty: bool,
}

impl SimulationSummary {
    /// Outcomes of every press, in order.
    #[must_use]
    pub fn press_outcomes(&self) -> Vec<(Action, ActionOutcome)> {
        self.records
            .iter()
            .filter_map(|record| match (record.step, record.outcome) {
                (Step::Press(action), Some(outcome)) => Some((action, outcome)),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count_effects(&self, matches: impl Fn(&Effect) -> bool) -> usize {
        self.effects.iter().filter(|effect| matches(effect)).count()
    }
}

/// Headless deterministic runner for the session logic.
#[derive(Clone)]
pub struct CrawlTester {
    verbose: bool,
    data: Arc<SessionData>,
}

impl CrawlTester {
    pub const fn new(data: Arc<SessionData>, verbose: bool) -> Self {
        Self { verbose, data }
    }

    pub fn try_new(verbose: bool) -> Self {
        Self::new(Arc::new(SessionData::load_from_static()), verbose)
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    fn open(
        &self,
        seed: u64,
        durable: &MemoryStore,
        scoped: &MemoryStore,
        clock: &ManualClock,
    ) -> CrawlSession {
        ChallengeSession::start(
            (*self.data).clone(),
            seeded_rng(seed),
            ManualScheduler::new(),
            SessionStore::new(durable.clone(), scoped.clone(), clock.clone()),
            Vec::new(),
        )
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        self.run_plan_at(plan, seed, Local::now())
    }

    pub fn run_plan_at(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        start: DateTime<Local>,
    ) -> SimulationSummary {
        let durable = MemoryStore::new();
        let scoped = MemoryStore::new();
        let clock = ManualClock::new(start);
        let mut session = self.open(seed, &durable, &scoped, &clock);
        let mut effects = Vec::new();
        let mut records = Vec::with_capacity(plan.steps.len());
        let mut reloads = 0_usize;

        for step in &plan.steps {
            let outcome = match *step {
                Step::Press(action) => Some(session.dispatch(action)),
                Step::Wait(delay) => {
                    session.advance_time(delay);
                    None
                }
                Step::Reload | Step::NextDay => {
                    if matches!(step, Step::NextDay) {
                        clock.advance(chrono::Duration::days(1));
                    }
                    effects.extend(session.take_effects());
                    reloads += 1;
                    let reseeded = seed.wrapping_add(u64::try_from(reloads).unwrap_or(u64::MAX));
                    log::debug!("{step} for seed {seed}; reopening with rng seed {reseeded}");
                    session = self.open(reseeded, &durable, &scoped, &clock);
                    None
                }
            };

            if self.verbose {
                log_step(*step, outcome, session.state());
            }
            records.push(StepRecord {
                step: *step,
                outcome,
                state: session.state().clone(),
            });
        }

        effects.extend(session.take_effects());
        SimulationSummary {
            seed,
            records,
            effects,
            final_state: session.state().clone(),
            final_view: session.view(),
            reloads,
            storage_empty: durable.is_empty() && scoped.is_empty(),
        }
    }
}

fn log_step(step: Step, outcome: Option<ActionOutcome>, state: &SessionState) {
    let label = match outcome {
        Some(ActionOutcome::Applied) => "applied".green(),
        Some(ActionOutcome::Ignored) => "ignored".yellow(),
        Some(ActionOutcome::Suppressed) => "suppressed".bright_black(),
        None => "-".normal(),
    };
    println!(
        "     ↳ {step:<24} {label:<10} count {} venue {} here {} {:?}",
        state.challenge_count,
        state.current_venue_index,
        state.completions_at_current_venue,
        state.machine_state()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pubcrawl_game::MachineState;

    fn tester() -> CrawlTester {
        CrawlTester::try_new(false)
    }

    #[test]
    fn plan_builders_append_steps() {
        let plan = SimulationPlan::new()
            .press(Action::RequestChallenge)
            .tap(Action::SkipChallenge)
            .reload();
        assert_eq!(
            plan.steps,
            vec![
                Step::Press(Action::RequestChallenge),
                Step::Wait(PRESS_GAP),
                Step::Press(Action::SkipChallenge),
                Step::Reload,
            ]
        );
        assert_eq!(SimulationPlan::new().complete_rounds(2).steps.len(), 8);
    }

    #[test]
    fn run_plan_records_each_step() {
        let plan = SimulationPlan::new().complete_rounds(2);
        let summary = tester().run_plan(&plan, 42);
        assert_eq!(summary.records.len(), plan.steps.len());
        assert_eq!(summary.final_state.challenge_count, 2);
        assert_eq!(summary.final_view.machine_state, MachineState::Idle);
        assert!(
            summary
                .press_outcomes()
                .iter()
                .all(|(_, outcome)| *outcome == ActionOutcome::Applied)
        );
    }

    #[test]
    fn reload_keeps_progress_and_next_day_clears_it() {
        let start = Local
            .with_ymd_and_hms(2025, 3, 1, 21, 0, 0)
            .single()
            .unwrap();
        let plan = SimulationPlan::new().complete_rounds(1).reload();
        let summary = tester().run_plan_at(&plan, 5, start);
        assert_eq!(summary.final_state.challenge_count, 1);
        assert_eq!(summary.reloads, 1);
        assert!(!summary.storage_empty);

        let plan = SimulationPlan::new().complete_rounds(1).next_day();
        let summary = tester().run_plan_at(&plan, 5, start);
        assert_eq!(summary.final_state, SessionState::fresh());
        assert!(summary.storage_empty);
    }

    #[test]
    fn same_seed_same_draws() {
        let plan = SimulationPlan::new().press(Action::RequestChallenge);
        let a = tester().run_plan(&plan, 77);
        let b = tester().run_plan(&plan, 77);
        assert_eq!(a.final_state.active_challenge, b.final_state.active_challenge);
    }

    #[test]
    fn step_labels() {
        assert_eq!(Step::Press(Action::Undo).to_string(), "press undo");
        assert_eq!(Step::Wait(PRESS_GAP).to_string(), "wait 600ms");
        assert_eq!(Step::NextDay.to_string(), "next day");
    }
}
