//! Administrative surface over the shared registry.
//!
//! [`Admin`] backs the `/responses get|set|enable|disable` commands of a
//! frontend: it checks the caller, applies the change to the live registry,
//! saves a snapshot and returns a line to show the caller. Targets are a
//! response name or the keyword [`ALL`].

use std::sync::Arc;

use tracing::{debug, info};

use amadeus_core::{RichMessage, UserId};
use amadeus_framework::{Registry, ReplyMode, ResponseSummary};

use crate::commands::ClickBoard;
use crate::error::{AdminError, AdminResult};
use crate::persistence::{SavedState, StateStore};

/// Target keyword addressing every response.
pub const ALL: &str = "all";

/// Name suggestions returned besides [`ALL`].
pub const COMPLETION_LIMIT: usize = 24;

/// Administrative operations on a registry.
#[derive(Clone)]
pub struct Admin {
    registry: Arc<Registry>,
    store: Option<Arc<dyn StateStore>>,
    clicks: Arc<ClickBoard>,
    owner: Option<UserId>,
}

impl Admin {
    /// Creates an admin service that saves after every change.
    pub fn new(registry: Arc<Registry>, store: Arc<dyn StateStore>) -> Self {
        Self {
            registry,
            store: Some(store),
            clicks: Arc::default(),
            owner: None,
        }
    }

    /// Creates an admin service whose changes only live in memory.
    pub fn unpersisted(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            store: None,
            clicks: Arc::default(),
            owner: None,
        }
    }

    /// Restricts every command to `owner`. `None` allows everyone.
    pub fn with_owner(mut self, owner: Option<UserId>) -> Self {
        self.owner = owner;
        self
    }

    /// Shares the click counts saved alongside the registry, so a save
    /// from here keeps them.
    pub fn with_clicks(mut self, clicks: Arc<ClickBoard>) -> Self {
        self.clicks = clicks;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn authorize(&self, user: UserId) -> AdminResult<()> {
        match self.owner {
            Some(owner) if owner != user => Err(AdminError::NotOwner),
            _ => Ok(()),
        }
    }

    pub fn list(&self) -> Vec<ResponseSummary> {
        self.registry.summaries()
    }

    /// Plain-text table of every response.
    pub fn render_table(&self) -> String {
        let rows: Vec<[String; 3]> = self
            .list()
            .into_iter()
            .map(|s| [s.name, s.enabled.to_string(), s.state])
            .collect();
        render_table(["Response", "Enabled", "Status"], &rows)
    }

    /// The listing as a rich message.
    pub fn listing(&self) -> RichMessage {
        RichMessage::new("Responses", format!("```\n{}\n```", self.render_table()))
    }

    /// Sets one response's state, or tries it on all of them.
    pub async fn set_state(&self, target: &str, state: &str) -> AdminResult<String> {
        let message = if is_all(target) {
            let report = self.registry.set_all_states(state);
            debug!(
                applied = report.applied.len(),
                skipped = report.skipped.len(),
                "Applied state to all responses"
            );
            format!("Set all responses to state {state}")
        } else {
            self.registry.set_state(target, state)?;
            format!("Successfully set response {target} to state {state}")
        };

        info!(response = target, state, "Response state changed");
        self.persist().await?;
        Ok(message)
    }

    pub async fn enable(&self, target: &str) -> AdminResult<String> {
        self.set_enabled(target, true).await
    }

    pub async fn disable(&self, target: &str) -> AdminResult<String> {
        self.set_enabled(target, false).await
    }

    async fn set_enabled(&self, target: &str, enabled: bool) -> AdminResult<String> {
        let verb = if enabled { "Enabled" } else { "Disabled" };
        let message = if is_all(target) {
            self.registry.set_all_enabled(enabled);
            format!("{verb} all responses")
        } else {
            self.registry.set_enabled(target, enabled)?;
            format!("{verb} response {target}")
        };

        info!(response = target, enabled, "Response toggled");
        self.persist().await?;
        Ok(message)
    }

    /// Autocomplete for targets: the first [`COMPLETION_LIMIT`] names plus
    /// [`ALL`], filtered by case-insensitive substring.
    pub fn complete_names(&self, current: &str) -> Vec<String> {
        let needle = current.to_lowercase();
        self.registry
            .names()
            .take(COMPLETION_LIMIT)
            .chain(std::iter::once(ALL))
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(str::to_string)
            .collect()
    }

    /// Autocomplete for reply modes.
    pub fn complete_states(current: &str) -> Vec<&'static str> {
        let needle = current.to_lowercase();
        [ReplyMode::React, ReplyMode::Message]
            .iter()
            .map(ReplyMode::as_str)
            .filter(|s| s.contains(&needle))
            .collect()
    }

    async fn persist(&self) -> AdminResult<()> {
        if let Some(store) = &self.store {
            store
                .save(&SavedState::capture(&self.registry, &self.clicks))
                .await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("responses", &self.registry.len())
            .field("persisted", &self.store.is_some())
            .field("owner", &self.owner)
            .finish()
    }
}

/// Turns a command outcome into the message shown to the caller.
pub fn outcome_message(result: &AdminResult<String>) -> RichMessage {
    match result {
        Ok(text) => RichMessage::success(text.clone()),
        Err(AdminError::NotOwner) => {
            RichMessage::error("Hey, only the owner of this bot can use this command!")
        }
        Err(e) => RichMessage::error(e.to_string()),
    }
}

fn is_all(target: &str) -> bool {
    target.eq_ignore_ascii_case(ALL)
}

fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; N]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule = widths.map(|width| "-".repeat(width));
    let mut out = vec![line(headers), line(rule.each_ref().map(String::as_str))];
    out.extend(rows.iter().map(|row| line(row.each_ref().map(String::as_str))));
    out.join("\n")
}
