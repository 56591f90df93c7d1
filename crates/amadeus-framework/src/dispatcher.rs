//! First-match-wins dispatch over a [`Registry`].
//!
//! When a message is dispatched:
//!
//! 1. Responses are visited in registration order
//! 2. Disabled responses are skipped without evaluating their trigger
//! 3. The first response whose trigger matches is applied and dispatch stops
//!
//! Later responses are neither checked nor applied, even if they would also
//! match. Messages written by the bot itself are filtered out before they
//! reach the dispatcher.
//!
//! ```rust,ignore
//! use amadeus_framework::{Action, Dispatcher, Registry, Response, Trigger};
//!
//! let registry = Registry::new()
//!     .with(Response::new("nullpo", Trigger::contains(["nullpo"]), Action::send("gah!")))
//!     .with(Response::new("echo", Trigger::regex("^echo ")?, Action::echo()));
//!
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//! let fired = dispatcher.dispatch(&ctx).await;
//! ```

use std::sync::Arc;

use tracing::{Instrument, Level, debug, span, trace, warn};

use crate::context::EventContext;
use crate::registry::Registry;

/// Applies the first matching response of a shared registry.
///
/// `Dispatcher` is cheap to clone and `Send + Sync`; every clone sees the same
/// registry, so administrative changes are visible to the next dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Dispatches one message.
    ///
    /// # Returns
    ///
    /// The name of the response that matched, or `None`. A matched response
    /// whose effect failed is still reported; the failure is logged and not
    /// retried.
    pub async fn dispatch(&self, ctx: &EventContext) -> Option<String> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            channel = %ctx.channel_id,
            message = %ctx.message_id,
        );
        self.dispatch_inner(ctx).instrument(span).await
    }

    async fn dispatch_inner(&self, ctx: &EventContext) -> Option<String> {
        for response in self.registry.iter() {
            if !response.is_enabled() {
                trace!(response = response.name(), "Response disabled, skipping");
                continue;
            }
            if !response.check(ctx).await {
                continue;
            }

            debug!(
                response = response.name(),
                action = response.active_action().kind(),
                "Response matched, stopping dispatch"
            );
            if let Err(e) = response.apply(ctx).await {
                warn!(response = response.name(), error = %e, "Response action failed");
            }
            return Some(response.name().to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::action::{Action, bold};
    use crate::response::Response;
    use crate::testing::{BrokenBot, CHANNEL, Effect, RecordingBot, ctx_with, message};
    use crate::trigger::Trigger;
    use amadeus_core::{RichMessage, UserId};

    fn counting(calls: &Arc<AtomicUsize>, result: bool) -> Trigger {
        let calls = Arc::clone(calls);
        Trigger::predicate(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let later = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new()
            .with(Response::new(
                "first",
                Trigger::contains(["hello"]),
                Action::send("one"),
            ))
            .with(Response::new(
                "second",
                counting(&later, true),
                Action::send("two"),
            ));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let bot = RecordingBot::new();

        let fired = dispatcher.dispatch(&ctx_with(&bot, message("hello"))).await;

        assert_eq!(fired.as_deref(), Some("first"));
        assert_eq!(bot.effects(), vec![Effect::Text(CHANNEL, "one".into())]);
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_trigger_is_never_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new()
            .with(Response::new("off", counting(&calls, true), Action::send("off")).disabled())
            .with(Response::new(
                "on",
                Trigger::contains(["x"]),
                Action::send("on"),
            ));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let bot = RecordingBot::new();

        let fired = dispatcher.dispatch(&ctx_with(&bot, message("x"))).await;

        assert_eq!(fired.as_deref(), Some("on"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_match() {
        let registry = Registry::new().with(Response::new(
            "nullpo",
            Trigger::contains(["nullpo"]),
            Action::send("gah!"),
        ));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let bot = RecordingBot::new();

        assert_eq!(dispatcher.dispatch(&ctx_with(&bot, message("hi"))).await, None);
        assert!(bot.effects().is_empty());
    }

    #[tokio::test]
    async fn test_state_change_visible_to_next_dispatch() {
        let registry = Arc::new(Registry::new().with(Response::new(
            "nullpo",
            Trigger::contains(["nullpo"]),
            Action::send("gah!"),
        )));
        let dispatcher = Dispatcher::new(Arc::clone(&registry));
        let bot = RecordingBot::new();

        registry.set_enabled("NULLPO", false).unwrap();
        assert_eq!(dispatcher.dispatch(&ctx_with(&bot, message("nullpo"))).await, None);

        registry.set_enabled("nullpo", true).unwrap();
        assert!(dispatcher.dispatch(&ctx_with(&bot, message("nullpo"))).await.is_some());
    }

    #[tokio::test]
    async fn test_action_failure_is_contained() {
        let registry = Registry::new().with(Response::new(
            "nullpo",
            Trigger::contains(["nullpo"]),
            Action::send("gah!"),
        ));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let ctx = EventContext::new(message("nullpo"), Arc::new(BrokenBot));

        assert_eq!(dispatcher.dispatch(&ctx).await.as_deref(), Some("nullpo"));
    }

    #[tokio::test]
    async fn test_hug_end_to_end() {
        let templates = ["{0} hugs {1}", "{0} gives {1} a big hug"];
        let registry = Registry::new().with(Response::new(
            ".hug",
            Trigger::regex(r"^\.hug").unwrap(),
            Action::random_template(templates),
        ));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let bot = RecordingBot::new();
        let event = message(".hug @bob").with_mention(UserId(7), "bob");

        let fired = dispatcher.dispatch(&ctx_with(&bot, event)).await;
        assert_eq!(fired.as_deref(), Some(".hug"));

        let effects = bot.effects();
        assert_eq!(effects.len(), 1);
        let Effect::Rich(channel, rich) = &effects[0] else {
            panic!("expected a rich message, got {effects:?}");
        };
        assert_eq!(*channel, CHANNEL);

        let expected: Vec<RichMessage> = templates
            .iter()
            .map(|t| {
                RichMessage::action(
                    t.replace("{0}", &bold("okabe"))
                        .replace("{1}", &bold("bob")),
                )
            })
            .collect();
        assert!(expected.contains(rich), "unexpected message {rich:?}");
    }
}
