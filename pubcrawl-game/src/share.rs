//! Share message for the messaging-app deep link.
//!
//! The text layout is consumed verbatim by the group chat, so it is kept
//! byte-for-byte stable.
use serde::{Deserialize, Serialize};

use crate::constants::SHARE_LIST_LIMIT;

const SHARE_BASE_URL: &str = "https://wa.me/?text=";
const SHARE_HEADER: &str = "🍻 KonnektTalexio Pub Crawl 2025! 🍻";
const SHARE_HASHTAG: &str = "#KTPubCrawl2025";

pub const PROMPT_TITLE: &str = "4 Challenges Completed!";
pub const PROMPT_BODY: &str = "Share your achievements with the team!";
pub const PROMPT_SHARE_LABEL: &str = "Share on WhatsApp";
pub const PROMPT_DISMISS_LABEL: &str = "Maybe Later";

/// Characters `encodeURIComponent` leaves alone but `urlencoding` escapes.
const COMPONENT_SAFE: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMessage {
    pub text: String,
}

impl ShareMessage {
    /// Build the share text from the session's progress.
    #[must_use]
    pub fn compose(challenge_count: u32, completed: &[String], venue_name: &str) -> Self {
        let mut text =
            format!("{SHARE_HEADER}\n\nI just completed {challenge_count} challenges:\n\n");
        for (idx, challenge) in completed.iter().take(SHARE_LIST_LIMIT).enumerate() {
            text.push_str(&format!("{}. {challenge}\n", idx + 1));
        }
        text.push_str(&format!("\n🎉 Join us at {venue_name}!\n{SHARE_HASHTAG}"));
        Self { text }
    }

    /// Deep link carrying the pre-filled message.
    #[must_use]
    pub fn whatsapp_url(&self) -> String {
        format!("{SHARE_BASE_URL}{}", encode_uri_component(&self.text))
    }
}

/// Percent-encode with the same unreserved set as JavaScript's `encodeURIComponent`.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    let mut encoded = urlencoding::encode(input).into_owned();
    for (escaped, literal) in COMPONENT_SAFE {
        encoded = encoded.replace(escaped, literal);
    }
    encoded
}
