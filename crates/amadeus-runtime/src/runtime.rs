//! The event loop tying configuration, registry, bot and state together.
//!
//! ```rust,ignore
//! use amadeus_runtime::{AmadeusRuntime, config::load_config};
//!
//! let config = load_config()?;
//! let registry = Arc::new(default_registry(UserId(config.bot.id))?);
//! let runtime = AmadeusRuntime::from_config(&config, registry, bot)?;
//!
//! // Any adapter can feed the runtime through an mpsc channel.
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! tokio::spawn(adapter.forward_messages(tx));
//!
//! // Runs until the channel closes or Ctrl+C / SIGTERM.
//! runtime.run(rx).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use amadeus_core::{BoxedBot, MessageEvent, UserId};
use amadeus_framework::{Dispatcher, EventContext, Registry};

use crate::admin::Admin;
use crate::commands::{ClickBoard, Commands};
use crate::config::{AmadeusConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::persistence::{JsonStateStore, SavedState, StateStore};

/// Event counters, updated as events flow through the runtime.
#[derive(Debug, Default)]
pub struct RuntimeStats {
    received: AtomicU64,
    ignored: AtomicU64,
    fired: AtomicU64,
}

impl RuntimeStats {
    /// Events handed to the runtime.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Events dropped before dispatch (the bot's own messages).
    pub fn ignored(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }

    /// Dispatches in which a response matched.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

/// The Amadeus runtime.
///
/// Every accepted event is dispatched on its own task, so a slow history
/// lookup or send in one channel never holds up another. Shutdown stops
/// accepting events and waits for dispatches already in flight.
pub struct AmadeusRuntime {
    config: AmadeusConfig,
    bot: BoxedBot,
    dispatcher: Dispatcher,
    admin: Admin,
    commands: Commands,
    store: Arc<dyn StateStore>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    stats: Arc<RuntimeStats>,
}

impl AmadeusRuntime {
    /// Creates a runtime storing state in the configured JSON file.
    ///
    /// Validates `config` and initializes logging from it.
    pub fn from_config(
        config: &AmadeusConfig,
        registry: Arc<Registry>,
        bot: BoxedBot,
    ) -> RuntimeResult<Self> {
        let store = Arc::new(JsonStateStore::new(&config.state.path));
        Self::with_store(config, registry, bot, store)
    }

    /// Creates a runtime with a custom state store.
    pub fn with_store(
        config: &AmadeusConfig,
        registry: Arc<Registry>,
        bot: BoxedBot,
        store: Arc<dyn StateStore>,
    ) -> RuntimeResult<Self> {
        validate_config(config)?;
        logging::init_from_config(&config.logging);

        let clicks = Arc::new(ClickBoard::new());
        let (admin, commands) = if config.state.save_on_change {
            (
                Admin::new(Arc::clone(&registry), Arc::clone(&store)),
                Commands::new(Arc::clone(&registry), Arc::clone(&clicks), Arc::clone(&store)),
            )
        } else {
            (
                Admin::unpersisted(Arc::clone(&registry)),
                Commands::unpersisted(Arc::clone(&registry), Arc::clone(&clicks)),
            )
        };
        let admin = admin
            .with_clicks(clicks)
            .with_owner(config.bot.owner_id.map(UserId));

        if bot.id() != UserId(config.bot.id) {
            warn!(
                configured = config.bot.id,
                actual = %bot.id(),
                "Configured bot id differs from the connected bot"
            );
        }

        info!(
            responses = registry.len(),
            log_level = %config.logging.level,
            state_path = %config.state.path.display(),
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            bot,
            dispatcher: Dispatcher::new(registry),
            admin,
            commands,
            store,
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            stats: Arc::new(RuntimeStats::default()),
        })
    }

    pub fn config(&self) -> &AmadeusConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.dispatcher.registry()
    }

    /// The administrative service bound to this runtime's registry.
    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    /// The user commands, sharing this runtime's state store.
    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Cancelling this token stops [`run`](Self::run) gracefully.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Seeds the registry and click counts from the state store.
    ///
    /// A missing or unreadable saved state leaves the registry at its
    /// built-in defaults. Returns whether anything was restored.
    pub async fn restore(&self) -> bool {
        let saved = match self.store.load().await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                info!("No saved response state, using defaults");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Restoring response state failed, using defaults");
                return false;
            }
        };

        saved.restore_clicks(self.commands.clicks());
        let (states, enabled) = saved.apply(self.registry());
        for skipped in states.skipped.iter().chain(&enabled.skipped) {
            debug!(response = %skipped.name, reason = %skipped.reason, "Saved entry not restored");
        }
        info!(
            states = states.applied.len(),
            enabled = enabled.applied.len(),
            skipped = states.skipped.len() + enabled.skipped.len(),
            clicked_members = saved.click_db.len(),
            "Restored response state"
        );
        true
    }

    /// Saves the registry's current state and the click counts.
    pub async fn save(&self) -> RuntimeResult<()> {
        self.store
            .save(&SavedState::capture(self.registry(), self.commands.clicks()))
            .await
            .map_err(RuntimeError::from)
    }

    /// Accepts one event and dispatches it on a tracked task.
    ///
    /// Returns `false` if the event was dropped because the bot wrote it.
    pub fn handle(&self, event: MessageEvent) -> bool {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let ctx = EventContext::new(event, Arc::clone(&self.bot));
        if ctx.is_self_authored() {
            self.stats.ignored.fetch_add(1, Ordering::Relaxed);
            trace!(message = %ctx.message_id, "Ignoring own message");
            return false;
        }

        let dispatcher = self.dispatcher.clone();
        let stats = Arc::clone(&self.stats);
        self.tracker.spawn(async move {
            if dispatcher.dispatch(&ctx).await.is_some() {
                stats.fired.fetch_add(1, Ordering::Relaxed);
            }
        });
        true
    }

    /// Runs until `events` closes, the shutdown token is cancelled, or
    /// Ctrl+C / SIGTERM arrives.
    pub async fn run(&self, events: mpsc::Receiver<MessageEvent>) -> RuntimeResult<()> {
        let signal = ShutdownSignal::install()?;
        self.run_until(events, signal.recv()).await
    }

    /// Runs until `events` closes, the shutdown token is cancelled, or
    /// `shutdown` completes.
    pub async fn run_until<F>(
        &self,
        mut events: mpsc::Receiver<MessageEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        if self.config.state.restore_on_start {
            self.restore().await;
        }

        info!(bot = self.bot.name(), "Amadeus runtime is now running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event);
                    }
                    None => {
                        info!("Event source closed, shutting down");
                        break;
                    }
                },
                _ = &mut shutdown => break,
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.stop().await;
        Ok(())
    }

    /// Waits for in-flight dispatches to finish.
    async fn stop(&self) {
        self.tracker.close();
        if !self.tracker.is_empty() {
            info!(in_flight = self.tracker.len(), "Waiting for in-flight dispatches");
        }
        self.tracker.wait().await;

        info!(
            received = self.stats.received(),
            ignored = self.stats.ignored(),
            fired = self.stats.fired(),
            "Runtime stopped"
        );
    }
}

impl std::fmt::Debug for AmadeusRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusRuntime")
            .field("bot", &self.bot.id())
            .field("responses", &self.registry().len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Ctrl+C, plus SIGTERM on unix.
struct ShutdownSignal {
    #[cfg(unix)]
    sigterm: signal::unix::Signal,
}

impl ShutdownSignal {
    fn install() -> RuntimeResult<Self> {
        Ok(Self {
            #[cfg(unix)]
            sigterm: signal::unix::signal(signal::unix::SignalKind::terminate())
                .map_err(RuntimeError::Signal)?,
        })
    }

    async fn recv(mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = ctrl_c() => info!("Received Ctrl+C, shutting down"),
                _ = self.sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
        }
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
