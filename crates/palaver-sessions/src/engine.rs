//! The session engine: one multi-turn conversation per triggering message.
//!
//! State machine per session:
//! trigger match → mode selection → seed conversation → turn cycle →
//! bounded wait for the next user turn → (turn cycle | teardown).
//!
//! Sessions for different triggers run concurrently and independently;
//! nothing here serialises access to the shared documents (last-writer-wins
//! by contract). Termination is purely timeout-driven; no user-issued
//! stop command is recognised.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, instrument};

use palaver_agent::{
    scan, CompletionClient, ComposingIndicator, DirectiveDispatcher, PersonaResolver,
};
use palaver_core::config::{CONTINUATION_TIMEOUT_SECS, THREAD_AUTO_ARCHIVE_MINS};
use palaver_core::{
    interpolate, Conversation, DocumentStore, InteractionMethod, PalaverConfig, Role, Turn,
};
use palaver_transcript::{TranscriptDocument, TranscriptLog};
use palaver_users::{SettingsDocument, UserProfiles};

use crate::error::Result;
use crate::gateway::{ChatGateway, GatewayComposing, InboundMessage};
use crate::surface::{ConversationSurface, ReplySurface, ThreadSurface};
use crate::trigger;

/// How a `handle_message` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The message did not open a session (no trigger match, bot author,
    /// or no applicable interaction method).
    Ignored,
    /// A session ran and ended on the continuation timeout.
    TimedOut,
}

pub struct SessionEngine<PS, TS> {
    gateway: Arc<dyn ChatGateway>,
    indicator: Arc<dyn ComposingIndicator>,
    profiles: Arc<UserProfiles<PS>>,
    transcript: Arc<TranscriptLog<TS>>,
    personas: Arc<PersonaResolver>,
    completion: CompletionClient,
    dispatcher: Arc<dyn DirectiveDispatcher>,
    config: PalaverConfig,
}

impl<PS, TS> SessionEngine<PS, TS>
where
    PS: DocumentStore<SettingsDocument>,
    TS: DocumentStore<TranscriptDocument>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        profiles: Arc<UserProfiles<PS>>,
        transcript: Arc<TranscriptLog<TS>>,
        personas: Arc<PersonaResolver>,
        completion: CompletionClient,
        dispatcher: Arc<dyn DirectiveDispatcher>,
        config: PalaverConfig,
    ) -> Self {
        let indicator = Arc::new(GatewayComposing(Arc::clone(&gateway)));
        Self {
            gateway,
            indicator,
            profiles,
            transcript,
            personas,
            completion,
            dispatcher,
            config,
        }
    }

    /// Entry point for every inbound message event.
    ///
    /// Returns once the session has fully run its course (or immediately
    /// when the message does not open one); callers wanting concurrent
    /// sessions spawn a task per trigger.
    #[instrument(skip(self, msg), fields(msg = %msg.id, author = %msg.author))]
    pub async fn handle_message(&self, msg: InboundMessage) -> Result<SessionOutcome> {
        if !trigger::matches(&self.config.triggering, &msg) {
            return Ok(SessionOutcome::Ignored);
        }

        let Some(method) = self.select_method(&msg)? else {
            debug!("no applicable interaction method, ignoring trigger");
            return Ok(SessionOutcome::Ignored);
        };

        let persona = self.resolve_persona(&msg)?;
        let mut conversation: Conversation =
            vec![Turn::system(persona), Turn::user(msg.content.clone())];

        info!(method = %method, channel = %msg.channel, "session opened");
        let mut surface = self.open_surface(method, &msg).await?;
        self.run_session(surface.as_mut(), &mut conversation, &msg)
            .await
    }

    /// Thread-mode needs both the stored preference and a channel threads
    /// can live in; a direct channel forces reply-mode regardless of the
    /// preference.
    fn select_method(&self, msg: &InboundMessage) -> Result<Option<InteractionMethod>> {
        let stored = self.profiles.get(msg.author, "interaction_method")?;
        let preference: Option<InteractionMethod> =
            stored.as_str().and_then(|s| s.parse().ok());
        let direct = msg.channel_kind.is_direct();

        if preference == Some(InteractionMethod::Thread) && !direct {
            Ok(Some(InteractionMethod::Thread))
        } else if preference == Some(InteractionMethod::Reply) || direct {
            Ok(Some(InteractionMethod::Reply))
        } else {
            Ok(None)
        }
    }

    fn resolve_persona(&self, msg: &InboundMessage) -> Result<String> {
        let stored = self.profiles.get(msg.author, "personality")?;
        let name = stored.as_str().filter(|s| !s.is_empty()).map(str::to_string);
        Ok(self.personas.resolve(name.as_deref())?)
    }

    async fn open_surface(
        &self,
        method: InteractionMethod,
        msg: &InboundMessage,
    ) -> Result<Box<dyn ConversationSurface>> {
        match method {
            InteractionMethod::Thread => {
                let now = Local::now();
                let title = interpolate(
                    &self.config.formats.thread_title,
                    &[
                        ("user", &msg.author_name),
                        ("date", &now.format("%Y-%m-%d").to_string()),
                        ("time", &now.format("%H:%M:%S").to_string()),
                    ],
                );
                let thread = self
                    .gateway
                    .create_thread(msg.channel, msg.id, &title, THREAD_AUTO_ARCHIVE_MINS)
                    .await?;
                Ok(Box::new(ThreadSurface::new(
                    Arc::clone(&self.gateway),
                    thread,
                )))
            }
            InteractionMethod::Reply => Ok(Box::new(ReplySurface::new(
                Arc::clone(&self.gateway),
                msg.channel,
                msg.id,
            ))),
        }
    }

    async fn run_session(
        &self,
        surface: &mut dyn ConversationSurface,
        conversation: &mut Conversation,
        trigger_msg: &InboundMessage,
    ) -> Result<SessionOutcome> {
        self.turn_cycle(surface, conversation, trigger_msg).await?;

        let timeout = Duration::from_secs(CONTINUATION_TIMEOUT_SECS);
        loop {
            match surface.next_turn(timeout).await? {
                None => {
                    surface.teardown().await?;
                    info!(trigger = %trigger_msg.id, "session timed out");
                    return Ok(SessionOutcome::TimedOut);
                }
                Some(next) => {
                    // The wait predicate (the surface's) is deliberately
                    // broader than turn admission: a qualifying message
                    // from another author is received here and silently
                    // dropped, never added to the conversation.
                    if !admits_turn(trigger_msg, &next) {
                        debug!(author = %next.author, "dropping qualifying message from non-originating author");
                        continue;
                    }
                    conversation.push(Turn::user(next.content));
                    self.turn_cycle(surface, conversation, trigger_msg).await?;
                }
            }
        }
    }

    /// One completion round plus, when a directive execution left a
    /// trailing system turn, exactly one more: the "tool call, then final
    /// answer" shape, never an open-ended loop.
    async fn turn_cycle(
        &self,
        surface: &mut dyn ConversationSurface,
        conversation: &mut Conversation,
        trigger_msg: &InboundMessage,
    ) -> Result<()> {
        let reply = self
            .completion
            .complete(Arc::clone(&self.indicator), surface.channel(), conversation)
            .await?;
        conversation.push(Turn::assistant(reply.clone()));
        self.transcript
            .append(trigger_msg.id, trigger_msg.author, conversation)?;

        let (delivered, directive) = scan(&reply);
        if let Some(d) = &directive {
            self.dispatcher
                .dispatch(d, trigger_msg.author, conversation)
                .await;
        }
        surface.deliver(&delivered).await?;

        if conversation.last().map(|t| t.role) == Some(Role::System) {
            let reply = self
                .completion
                .complete(Arc::clone(&self.indicator), surface.channel(), conversation)
                .await?;
            conversation.push(Turn::assistant(reply.clone()));
            self.transcript
                .append(trigger_msg.id, trigger_msg.author, conversation)?;
            surface.deliver(&reply).await?;
        }
        Ok(())
    }
}

/// Turn admission: only the session's originating author may extend the
/// conversation. Kept separate from the surfaces' wait predicates on
/// purpose; the gap between the two is observable behaviour.
fn admits_turn(trigger_msg: &InboundMessage, candidate: &InboundMessage) -> bool {
    candidate.author == trigger_msg.author
}
