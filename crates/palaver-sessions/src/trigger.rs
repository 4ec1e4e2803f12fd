use palaver_core::config::TriggeringConfig;

use crate::gateway::InboundMessage;

/// Markdown symbols stripped before trigger matching when
/// `ignore_modifiers` is set, so `**hey bot**` still triggers.
const FORMATTING_SYMBOLS: [char; 5] = ['*', '_', '~', '#', '`'];

pub fn strip_formatting(text: &str) -> String {
    text.chars()
        .filter(|c| !FORMATTING_SYMBOLS.contains(c))
        .collect()
}

/// Does this inbound message open a new session?
///
/// The content (optionally formatting-stripped and case-folded) must start
/// with one of the configured triggers, and bot accounts never trigger.
pub fn matches(config: &TriggeringConfig, msg: &InboundMessage) -> bool {
    if msg.author_is_bot {
        return false;
    }

    let mut candidate = msg.content.clone();
    if config.ignore_modifiers {
        candidate = strip_formatting(&candidate);
    }
    if config.ignore_case {
        candidate = candidate.to_lowercase();
    }

    config.triggers.iter().any(|trigger| {
        if config.ignore_case {
            candidate.starts_with(&trigger.to_lowercase())
        } else {
            candidate.starts_with(trigger.as_str())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::{ChannelId, ChannelKind, MessageId, UserId};

    fn msg(content: &str, bot: bool) -> InboundMessage {
        InboundMessage {
            id: MessageId(1),
            channel: ChannelId(10),
            channel_kind: ChannelKind::Guild,
            author: UserId(5),
            author_name: "alice".to_string(),
            author_is_bot: bot,
            content: content.to_string(),
            reply_to: None,
        }
    }

    fn config(triggers: &[&str], ignore_case: bool, ignore_modifiers: bool) -> TriggeringConfig {
        TriggeringConfig {
            triggers: triggers.iter().map(|s| s.to_string()).collect(),
            ignore_case,
            ignore_modifiers,
        }
    }

    #[test]
    fn prefix_match_opens_a_session() {
        let cfg = config(&["hey bot"], false, false);
        assert!(matches(&cfg, &msg("hey bot, hi", false)));
        assert!(!matches(&cfg, &msg("well hey bot", false)));
    }

    #[test]
    fn bots_never_trigger() {
        let cfg = config(&["hey bot"], true, true);
        assert!(!matches(&cfg, &msg("hey bot, hi", true)));
    }

    #[test]
    fn case_folding_applies_to_both_sides() {
        let cfg = config(&["Hey Bot"], true, false);
        assert!(matches(&cfg, &msg("HEY BOT hello", false)));
        let strict = config(&["Hey Bot"], false, false);
        assert!(!matches(&strict, &msg("HEY BOT hello", false)));
    }

    #[test]
    fn formatting_strip_lets_styled_triggers_through() {
        let cfg = config(&["hey bot"], false, true);
        assert!(matches(&cfg, &msg("**hey bot** hi", false)));
        let strict = config(&["hey bot"], false, false);
        assert!(!matches(&strict, &msg("**hey bot** hi", false)));
    }

    #[test]
    fn strip_formatting_removes_only_symbols() {
        assert_eq!(strip_formatting("*h_i~ `#there`"), "hi there");
    }
}
