//! Presentational components. Props in, markup out; no browser access.
pub mod action_bar;
pub mod challenge_card;
pub mod share_modal;
pub mod stats_bar;
pub mod toast;
pub mod venue_panel;

pub use action_bar::ActionBar;
pub use challenge_card::ChallengeCard;
pub use share_modal::ShareModal;
pub use stats_bar::StatsBar;
pub use toast::Toast;
pub use venue_panel::VenuePanel;
