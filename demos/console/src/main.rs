//! Console Example
//!
//! Runs the built-in responses against lines typed on stdin. Every line is a
//! message from the console user; the bot's replies and reactions are printed
//! back.
//!
//! # Input
//!
//! ```text
//! good bot                        plain message
//! .hug @mayuri                    `@name` words become mentions
//! /responses get                  list responses
//! /responses set Dad Bot 1.0      set a response's state
//! /responses disable meow         enable / disable a response (or `all`)
//! /click @mayuri                  click someone
//! /rate upa                       rate something
//! /convert ctof 37.5              convert a temperature (`ctof` / `ftoc`)
//! /wyr cake | pie                 would you rather
//! /ping                           pong
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package amadeus-console -- --config amadeus.toml
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use amadeus::core::{ApiResult, Emoji};
use amadeus::prelude::*;
use amadeus::responses::{COOL_EMOJI, CRY_EMOJI, THANKS_EMOJI, WAVE_EMOJI};
use amadeus::runtime::{pong, rate_today, would_you_rather};
use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(version, about = "Talk to the Amadeus response bot from a terminal")]
struct Args {
    /// Configuration file; the usual search paths are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channel the console messages are posted in.
    #[arg(long, default_value_t = 1)]
    channel: u64,

    /// User id of the console user.
    #[arg(long, default_value_t = 1)]
    user: u64,

    /// Display name of the console user.
    #[arg(long, default_value = "okabe")]
    name: String,
}

// ============================================================================
// Console Bot
// ============================================================================

/// A [`Bot`] that prints to stdout and keeps channel history in memory.
struct ConsoleBot {
    id: UserId,
    name: String,
    next_message: AtomicU64,
    history: Mutex<HashMap<ChannelId, Vec<(MessageId, UserId)>>>,
}

impl ConsoleBot {
    fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            next_message: AtomicU64::new(1),
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates an id for a message by `author` and appends it to history.
    fn record(&self, channel: ChannelId, author: UserId) -> MessageId {
        let id = MessageId(self.next_message.fetch_add(1, Ordering::Relaxed));
        self.history
            .lock()
            .entry(channel)
            .or_default()
            .push((id, author));
        id
    }
}

#[async_trait]
impl Bot for ConsoleBot {
    fn id(&self) -> UserId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn send_text(&self, channel: ChannelId, text: &str) -> ApiResult<MessageId> {
        println!("{}: {}", self.name, text);
        Ok(self.record(channel, self.id))
    }

    async fn send_rich(&self, channel: ChannelId, message: &RichMessage) -> ApiResult<MessageId> {
        print_rich(self, message);
        Ok(self.record(channel, self.id))
    }

    fn resolve_emoji(&self, id: EmojiId) -> Option<Emoji> {
        let name = match id {
            THANKS_EMOJI => "kurisuthumbsup",
            CRY_EMOJI => "kurisucry",
            COOL_EMOJI => "kurisucool",
            WAVE_EMOJI => "rinwave",
            _ => return None,
        };
        Some(Emoji {
            id,
            name: name.to_string(),
            animated: true,
        })
    }

    async fn react(&self, _channel: ChannelId, message: MessageId, emoji: &Emoji) -> ApiResult<()> {
        println!("{} reacted to #{} with {}", self.name, message, emoji);
        Ok(())
    }

    async fn preceding_author(
        &self,
        channel: ChannelId,
        before: MessageId,
    ) -> ApiResult<Option<UserId>> {
        let history = self.history.lock();
        let Some(messages) = history.get(&channel) else {
            return Ok(None);
        };
        Ok(messages
            .iter()
            .take_while(|(id, _)| *id != before)
            .last()
            .map(|(_, author)| *author))
    }
}

// ============================================================================
// Input
// ============================================================================

/// Reads stdin until EOF, forwarding messages and answering commands.
async fn read_console(
    args: Args,
    bot: Arc<ConsoleBot>,
    admin: Admin,
    commands: Commands,
    events: mpsc::Sender<MessageEvent>,
) -> Result<()> {
    let channel = ChannelId(args.channel);
    let user = UserId(args.user);
    let mut known_users: HashMap<String, UserId> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let received = Instant::now();
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix("/responses") {
            let reply = run_admin_command(&admin, user, command.trim()).await;
            print_rich(&bot, &reply);
            continue;
        }

        let mentions = parse_mentions(line, &bot, &mut known_users);

        if let Some(command) = line.strip_prefix('/') {
            let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
            let rest = rest.trim();
            match verb {
                "click" => match mentions.first() {
                    Some((id, name)) => match commands.click(&args.name, *id, name).await {
                        Ok(reply) => print_rich(&bot, &reply),
                        Err(e) => print_rich(&bot, &RichMessage::error(e.to_string())),
                    },
                    None => print_rich(&bot, &RichMessage::error("usage: /click @member")),
                },
                "rate" => print_rich(&bot, &rate_today(rest)),
                "convert" => match convert(rest) {
                    Ok(text) => println!("{}: {}", bot.name(), text),
                    Err(e) => print_rich(&bot, &RichMessage::error(e.to_string())),
                },
                "wyr" => match rest.split_once('|') {
                    Some((first, second)) => {
                        let question = would_you_rather(first.trim(), second.trim());
                        println!("{}: {}", bot.name(), question);
                    }
                    None => {
                        print_rich(&bot, &RichMessage::error("usage: /wyr <first> | <second>"));
                    }
                },
                "ping" => println!("{}: {}", bot.name(), pong(received.elapsed())),
                other => {
                    let reply = RichMessage::error(format!("unknown command `/{other}`"));
                    print_rich(&bot, &reply);
                }
            }
            continue;
        }

        let message_id = bot.record(channel, user);
        let mut event = MessageEvent::new(message_id, channel, Author::new(user, &args.name), line);
        for (id, name) in mentions {
            event = event.with_mention(id, name);
        }

        if events.send(event).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// `@name` words, resolved to the bot or to a stable made-up id.
fn parse_mentions(
    line: &str,
    bot: &ConsoleBot,
    known_users: &mut HashMap<String, UserId>,
) -> Vec<(UserId, String)> {
    line.split_whitespace()
        .filter_map(|word| word.strip_prefix('@'))
        .map(|name| name.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|name| !name.is_empty())
        .map(|name| {
            let id = if name.eq_ignore_ascii_case(bot.name()) {
                bot.id()
            } else {
                let next = UserId(1000 + known_users.len() as u64);
                *known_users.entry(name.to_lowercase()).or_insert(next)
            };
            (id, name.to_string())
        })
        .collect()
}

/// `ctof 37.5` / `ftoc 98.6`.
fn convert(args: &str) -> Result<String> {
    let (kind, temperature) = args
        .split_once(' ')
        .ok_or_else(|| anyhow::anyhow!("usage: /convert ctof|ftoc <temperature>"))?;
    let conversion: Conversion = kind.parse()?;
    let temperature: f64 = temperature.trim().parse()?;
    Ok(conversion.apply(temperature))
}

fn print_rich(bot: &ConsoleBot, message: &RichMessage) {
    if message.title.is_empty() {
        println!("{}: * {}", bot.name(), message.description);
    } else {
        println!("{}: [{}] {}", bot.name(), message.title, message.description);
    }
}

async fn run_admin_command(admin: &Admin, user: UserId, command: &str) -> RichMessage {
    if let Err(e) = admin.authorize(user) {
        return outcome_message(&Err(e));
    }

    let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    let result = match verb {
        "get" | "" => return admin.listing(),
        "set" => match rest.rsplit_once(' ') {
            Some((target, state)) => admin.set_state(target.trim(), state).await,
            None => return RichMessage::error("usage: /responses set <response|all> <state>"),
        },
        "enable" => admin.enable(rest).await,
        "disable" => admin.disable(rest).await,
        other => return RichMessage::error(format!("unknown subcommand `{other}`")),
    };
    outcome_message(&result)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };

    let bot = Arc::new(ConsoleBot::new(UserId(config.bot.id), &config.bot.name));
    let registry = Arc::new(default_registry(bot.id())?);
    let runtime = AmadeusRuntime::from_config(&config, registry, bot.clone())?;

    let (tx, rx) = mpsc::channel(64);
    let admin = runtime.admin().clone();
    let commands = runtime.commands().clone();
    let input = tokio::spawn(async move {
        if let Err(e) = read_console(args, bot, admin, commands, tx).await {
            error!(error = %e, "Reading stdin failed");
        }
    });

    runtime.run(rx).await?;
    input.abort();

    Ok(())
}
