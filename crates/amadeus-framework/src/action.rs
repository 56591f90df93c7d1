//! Actions: the effect a response produces.
//!
//! An [`Action`] runs against the same [`EventContext`] its trigger matched
//! and performs a single send or react call through the bot. Randomness is
//! resolved before the call is made, so no RNG state is held across an await.

use std::sync::Arc;

use rand::RngExt;
use regex::Regex;
use tracing::debug;

use amadeus_core::{ApiResult, EmojiId, RichMessage};

use crate::context::EventContext;
use crate::error::BuildResult;
use crate::trigger::default_regex;

/// Produces text from the context (e.g. the author's nickname).
pub type TextFn = Arc<dyn Fn(&EventContext) -> String + Send + Sync>;

/// Decorates a user name before it is placed into a template.
pub type NameFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Wraps a name in Markdown bold.
pub fn bold(name: &str) -> String {
    format!("**{name}**")
}

/// One option of a [`Action::RandomLiteral`].
#[derive(Clone)]
pub enum Candidate {
    Literal(String),
    Computed(TextFn),
}

impl Candidate {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&EventContext) -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    fn render(&self, ctx: &EventContext) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Computed(f) => f(ctx),
        }
    }
}

impl From<&str> for Candidate {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for Candidate {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// Regex substitution over the triggering text.
#[derive(Debug, Clone)]
pub struct RegexSend {
    regex: Regex,
    replacement: String,
}

impl RegexSend {
    /// `replacement` uses `$1` / `${name}` group references.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> BuildResult<Self> {
        Ok(Self {
            regex: default_regex(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Replaces every match in `text`.
    ///
    /// When nothing matches, the replacement template itself is returned
    /// with its group references unresolved.
    pub fn render(&self, text: &str) -> String {
        if self.regex.is_match(text) {
            self.regex
                .replace_all(text, self.replacement.as_str())
                .into_owned()
        } else {
            self.replacement.clone()
        }
    }
}

/// Roleplay message built from `{0}` (actor) / `{1}` (target) templates.
#[derive(Clone)]
pub struct RandomTemplate {
    templates: Vec<String>,
    formatter: NameFormatter,
}

impl RandomTemplate {
    /// Names are formatted with [`bold`].
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            formatter: Arc::new(bold),
        }
    }

    pub fn with_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(f);
        self
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Targets, in precedence order: mentioned users, then the words after
    /// the command, then the bot itself.
    pub fn targets(ctx: &EventContext) -> Vec<String> {
        if !ctx.mentions.is_empty() {
            return ctx.mentions.iter().map(|m| m.name.clone()).collect();
        }

        let words: Vec<String> = ctx
            .text
            .split_whitespace()
            .skip(1)
            .map(str::to_string)
            .collect();
        if !words.is_empty() {
            return words;
        }

        vec![ctx.bot().name().to_string()]
    }

    /// One independently chosen template per target, joined by blank lines.
    pub fn render(&self, ctx: &EventContext) -> Option<String> {
        if self.templates.is_empty() {
            return None;
        }

        let actor = (self.formatter)(&ctx.author.name);
        let mut rng = rand::rng();
        let lines: Vec<String> = Self::targets(ctx)
            .iter()
            .map(|target| {
                let template = &self.templates[rng.random_range(0..self.templates.len())];
                let target = (self.formatter)(target);
                format_template(template, &[actor.as_str(), target.as_str()])
            })
            .collect();

        Some(lines.join("\n\n"))
    }
}

/// An effect run against a matched message.
#[derive(Clone)]
pub enum Action {
    /// Sends fixed text.
    LiteralSend(String),
    /// Sends a regex substitution of the message text.
    RegexSend(RegexSend),
    /// Sends one candidate chosen uniformly at random.
    RandomLiteral(Vec<Candidate>),
    /// Reacts to the message with a custom emoji.
    React(EmojiId),
    /// Sends a rich roleplay message.
    RandomTemplate(RandomTemplate),
}

impl Action {
    pub fn send(text: impl Into<String>) -> Self {
        Self::LiteralSend(text.into())
    }

    pub fn regex_send(pattern: &str, replacement: impl Into<String>) -> BuildResult<Self> {
        Ok(Self::RegexSend(RegexSend::new(pattern, replacement)?))
    }

    pub fn random<I, C>(candidates: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self::RandomLiteral(candidates.into_iter().map(Into::into).collect())
    }

    /// Sends the triggering text back unchanged.
    pub fn echo() -> Self {
        Self::RandomLiteral(vec![Candidate::computed(|ctx| ctx.text.clone())])
    }

    pub fn react(emoji: impl Into<EmojiId>) -> Self {
        Self::React(emoji.into())
    }

    pub fn random_template<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RandomTemplate(RandomTemplate::new(templates))
    }

    /// Runs the action.
    ///
    /// Send failures are returned to the caller and never retried.
    pub async fn apply(&self, ctx: &EventContext) -> ApiResult<()> {
        let bot = ctx.bot();
        match self {
            Self::LiteralSend(text) => {
                bot.send_text(ctx.channel_id, text).await?;
            }
            Self::RegexSend(sub) => {
                bot.send_text(ctx.channel_id, &sub.render(&ctx.text)).await?;
            }
            Self::RandomLiteral(candidates) => {
                let Some(text) = pick(candidates).map(|c| c.render(ctx)) else {
                    debug!("Random literal action has no candidates");
                    return Ok(());
                };
                bot.send_text(ctx.channel_id, &text).await?;
            }
            Self::React(id) => {
                let Some(emoji) = bot.resolve_emoji(*id) else {
                    debug!(emoji = %id, "Emoji could not be resolved, skipping reaction");
                    return Ok(());
                };
                bot.react(ctx.channel_id, ctx.message_id, &emoji).await?;
            }
            Self::RandomTemplate(template) => {
                let Some(text) = template.render(ctx) else {
                    debug!("Template action has no templates");
                    return Ok(());
                };
                bot.send_rich(ctx.channel_id, &RichMessage::action(text))
                    .await?;
            }
        }
        Ok(())
    }

    /// Short variant label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LiteralSend(_) => "literal_send",
            Self::RegexSend(_) => "regex_send",
            Self::RandomLiteral(_) => "random_literal",
            Self::React(_) => "react",
            Self::RandomTemplate(_) => "random_template",
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiteralSend(text) => f.debug_tuple("LiteralSend").field(text).finish(),
            Self::RegexSend(sub) => f.debug_tuple("RegexSend").field(sub).finish(),
            Self::RandomLiteral(c) => write!(f, "RandomLiteral({} candidates)", c.len()),
            Self::React(id) => f.debug_tuple("React").field(id).finish(),
            Self::RandomTemplate(t) => write!(f, "RandomTemplate({} templates)", t.templates.len()),
        }
    }
}

fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(rand::rng().random_range(0..items.len()))
}

/// Substitutes positional `{N}` placeholders. `{{` and `}}` escape braces;
/// placeholders without a matching argument are kept as written.
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{')
            && let Some(end) = tail.find('}')
            && let Ok(index) = tail[1..end].parse::<usize>()
            && let Some(arg) = args.get(index)
        {
            out.push_str(arg);
            rest = &tail[end + 1..];
            continue;
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
