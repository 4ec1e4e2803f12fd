//! Embedded directive grammar.
//!
//! A model reply may carry one directive the interpreter strips before
//! delivery: `START:command>param1>param2:END`. Field 0 is the
//! case-insensitive command name, the rest are positional parameters.
//!
//! Dispatch is a hook point. The shipped dispatcher is inert: it executes
//! nothing and appends nothing. Any real implementation reports its
//! outcome by appending a system-role turn (`DirectiveOutcome::apply`),
//! which is the one signal the session loop reads to run a single extra
//! completion round before delivering to the user.

use std::borrow::Cow;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use palaver_core::{Conversation, Turn, UserId};

fn directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Non-greedy: the first `:END` closes the directive.
    RE.get_or_init(|| Regex::new(r"START:(.*?):END").expect("directive regex"))
}

/// One parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Lowercased command name.
    pub command: String,
    pub params: Vec<String>,
}

/// Find the first directive in a reply and strip it.
///
/// Text with no directive is returned unchanged (borrowed). With one, the
/// exact matched substring, delimiters included, is removed and the
/// surrounding text is otherwise byte-preserved.
pub fn scan(text: &str) -> (Cow<'_, str>, Option<Directive>) {
    let Some(caps) = directive_re().captures(text) else {
        return (Cow::Borrowed(text), None);
    };

    let matched = caps.get(0).expect("whole match");
    let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");

    let mut fields = inner.split('>');
    let command = fields.next().unwrap_or("").to_lowercase();
    let params: Vec<String> = fields.map(str::to_string).collect();

    let mut stripped = String::with_capacity(text.len() - matched.len());
    stripped.push_str(&text[..matched.start()]);
    stripped.push_str(&text[matched.end()..]);

    debug!(command = %command, params = params.len(), "directive stripped from reply");
    (Cow::Owned(stripped), Some(Directive { command, params }))
}

/// Result of executing a directive, mapped onto the system-role turns the
/// session loop expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveOutcome {
    Completed,
    Failed(String),
    Denied(String),
}

impl DirectiveOutcome {
    /// Append the matching system-role acknowledgement to the conversation.
    ///
    /// The trailing system turn tells the session loop one more completion
    /// round is needed before handing the reply to the user.
    pub fn apply(self, conversation: &mut Conversation) {
        let content = match self {
            DirectiveOutcome::Completed => "operation complete".to_string(),
            DirectiveOutcome::Failed(e) => {
                format!("operation got an error: {e}. Relay this error to the user.")
            }
            DirectiveOutcome::Denied(reason) => reason,
        };
        conversation.push(Turn::system(content));
    }
}

/// Executes directives the model emits.
#[async_trait]
pub trait DirectiveDispatcher: Send + Sync {
    /// Execute `directive` on behalf of `author`, reporting the outcome by
    /// appending a system-role turn (`DirectiveOutcome::apply`). Appending
    /// nothing means nothing was executed and no extra round runs.
    async fn dispatch(&self, directive: &Directive, author: UserId, conversation: &mut Conversation);
}

/// The reference dispatcher: recognises the grammar, executes nothing.
pub struct InertDispatcher;

#[async_trait]
impl DirectiveDispatcher for InertDispatcher {
    async fn dispatch(
        &self,
        directive: &Directive,
        _author: UserId,
        _conversation: &mut Conversation,
    ) {
        debug!(command = %directive.command, "directive ignored by inert dispatcher");
    }
}
