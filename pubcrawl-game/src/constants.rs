//! Centralized tuning constants for the challenge session.
//!
//! Timings and thresholds live here so the session state machine reads as a
//! set of transitions rather than a pile of magic numbers.

use std::time::Duration;

// Persistence ---------------------------------------------------------------
/// Key under which the session snapshot is written in both storage scopes.
pub const STORAGE_KEY: &str = "pubCrawlState";

// Challenge draws -------------------------------------------------------------
/// Percent weight of each difficulty tier when drawing a challenge.
pub const EASY_WEIGHT: u32 = 50;
pub const MEDIUM_WEIGHT: u32 = 35;
pub const HARD_WEIGHT: u32 = 15;
/// Re-draws allowed when a draw repeats the previously shown challenge.
pub const MAX_REDRAWS: usize = 10;

// Timers ----------------------------------------------------------------------
pub const UNDO_WINDOW: Duration = Duration::from_millis(3_000);
pub const SHARE_PROMPT_DELAY: Duration = Duration::from_millis(1_000);
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(500);

// Milestones ------------------------------------------------------------------
/// Completed challenges that trigger the one-shot share prompt.
pub const SHARE_PROMPT_THRESHOLD: u32 = 4;
/// Completions at a single venue before suggesting the next one.
pub const VENUE_PULSE_THRESHOLD: u32 = 3;
/// Completed challenges quoted in the share message.
pub const SHARE_LIST_LIMIT: usize = 4;

// Toasts ----------------------------------------------------------------------
pub(crate) const TOAST_COMPLETED: &str = "🎉 Challenge completed!";
pub(crate) const TOAST_SKIPPED: &str = "Skipped - Get a new one!";
pub(crate) const TOAST_UNDONE: &str = "↩ Challenge undone";
