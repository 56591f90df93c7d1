//! User commands offered next to the automatic responses.
//!
//! `/click` keeps a per-member counter that is saved with the response state.
//! The rest (`/rate`, `/convert`, `/wyr`, `/ping`) are stateless and only
//! format a reply.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;

use amadeus_core::{RichMessage, UserId};
use amadeus_framework::{Registry, bold};

use crate::error::{CommandError, CommandResult};
use crate::persistence::{SavedState, StateStore};

/// How often each member has been clicked.
#[derive(Debug, Default)]
pub struct ClickBoard {
    counts: RwLock<BTreeMap<UserId, u64>>,
}

impl ClickBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one click on `member` and returns the new total.
    pub fn click(&self, member: UserId) -> u64 {
        let mut counts = self.counts.write();
        let count = counts.entry(member).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, member: UserId) -> u64 {
        self.counts.read().get(&member).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<UserId, u64> {
        self.counts.read().clone()
    }

    /// Replaces every count with `counts`.
    pub fn restore(&self, counts: &BTreeMap<UserId, u64>) {
        *self.counts.write() = counts.clone();
    }
}

/// Stateful commands, sharing the registry's state store.
#[derive(Clone)]
pub struct Commands {
    registry: Arc<Registry>,
    clicks: Arc<ClickBoard>,
    store: Option<Arc<dyn StateStore>>,
}

impl Commands {
    /// Commands that save after every click.
    pub fn new(registry: Arc<Registry>, clicks: Arc<ClickBoard>, store: Arc<dyn StateStore>) -> Self {
        Self {
            registry,
            clicks,
            store: Some(store),
        }
    }

    pub fn unpersisted(registry: Arc<Registry>, clicks: Arc<ClickBoard>) -> Self {
        Self {
            registry,
            clicks,
            store: None,
        }
    }

    pub fn clicks(&self) -> &Arc<ClickBoard> {
        &self.clicks
    }

    /// `clicker` clicks `member`. The click is counted even if saving fails.
    pub async fn click(
        &self,
        clicker: &str,
        member: UserId,
        member_name: &str,
    ) -> CommandResult<RichMessage> {
        let times = self.clicks.click(member);
        debug!(member = %member, times, "Member clicked");

        if let Some(store) = &self.store {
            store
                .save(&SavedState::capture(&self.registry, &self.clicks))
                .await?;
        }

        let clicker = bold(clicker);
        let clickee = bold(member_name);
        let plural = if times == 1 { "" } else { "s" };
        Ok(RichMessage::action(format!(
            "{clicker} clicks {clickee}. {clickee} has been clicked {times} time{plural}."
        )))
    }
}

impl std::fmt::Debug for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commands")
            .field("clicks", &self.clicks)
            .field("persisted", &self.store.is_some())
            .finish()
    }
}

const INTROS: [&str; 4] = ["{}, eh?", "About {}?", "{}?", "What do I think about {}?"];

const COMMENTS: [[&str; 3]; 5] = [
    ["Not looking good.", "Not a big fan.", "It's... something."],
    ["I'm not sure about this.", "Feels a little bit off.", "Could use work"],
    ["Quite average", "Not much to say about it.", "It's alright,"],
    ["Not bad at all.", "Quite good.", "I like it."],
    ["Pretty damn good.", "I'm a big fan.", "Looks great."],
];

/// Rates `something`. The verdict is a pure function of the text and the
/// day, so asking twice on the same day gives the same answer.
pub fn rate(something: &str, day: NaiveDate) -> RichMessage {
    let digest = Sha256::digest(format!("{something}{}", day.format("%d%m%Y")).as_bytes());
    let text = render_rating(something, [digest[0], digest[1], digest[2], digest[3]]);
    RichMessage::new("", text)
}

/// [`rate`] for the local calendar day.
pub fn rate_today(something: &str) -> RichMessage {
    rate(something, Local::now().date_naive())
}

/// Byte 0 is the rating; bytes 1 to 3 choose the intro, scale and comment.
fn render_rating(something: &str, bytes: [u8; 4]) -> String {
    let rating = f64::from(bytes[0]) / 256.0;

    let intro = pick(&INTROS, bytes[1]).replace("{}", something);
    let scale = match *pick(&[0, 1, 2], bytes[2]) {
        0 => format!("{:.1} out of 5 stars.", rating * 5.0),
        1 => format!("{:.0}%.", rating * 100.0),
        _ => format!("{:.0} out of 10.", rating * 10.0),
    };
    let comment = pick(&COMMENTS[(rating * COMMENTS.len() as f64) as usize], bytes[3]);

    format!("{intro} {comment} {scale}")
}

fn pick<T>(items: &[T], byte: u8) -> &T {
    &items[usize::from(byte) * items.len() / 256]
}

/// A temperature conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    CelsiusToFahrenheit,
    FahrenheitToCelsius,
}

impl Conversion {
    /// Converts `temperature`, rounded to two decimals, and describes it.
    pub fn apply(self, temperature: f64) -> String {
        let (converted, from, to) = match self {
            Self::CelsiusToFahrenheit => (temperature * 9.0 / 5.0 + 32.0, "C", "F"),
            Self::FahrenheitToCelsius => ((temperature - 32.0) * 5.0 / 9.0, "F", "C"),
        };
        let converted = (converted * 100.0).round() / 100.0;
        format!(
            "{}°{from} is {}°{to}",
            format_temperature(temperature),
            format_temperature(converted)
        )
    }
}

impl FromStr for Conversion {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ctof" => Ok(Self::CelsiusToFahrenheit),
            "ftoc" => Ok(Self::FahrenheitToCelsius),
            other => Err(CommandError::UnknownConversion(other.to_string())),
        }
    }
}

/// Whole numbers print without a fractional part.
fn format_temperature(t: f64) -> String {
    // Adding zero folds -0 into 0.
    let t = t + 0.0;
    if t.fract() == 0.0 {
        format!("{t:.0}")
    } else {
        t.to_string()
    }
}

pub fn would_you_rather(first: &str, second: &str) -> String {
    format!(
        "would you rather have unlimited {first}, but no more {second}, or unlimited {second}, but no more {first}?"
    )
}

/// Reply to `/ping`, given the delay between the request and its handling.
pub fn pong(latency: Duration) -> String {
    format!("pong ({:.2}ms)", latency.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStateStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_click_counts_and_saves() {
        let store = Arc::new(MemoryStateStore::new());
        let commands = Commands::new(
            Arc::new(Registry::new()),
            Arc::new(ClickBoard::new()),
            store.clone(),
        );

        let first = commands.click("okabe", UserId(7), "mayuri").await.unwrap();
        assert_eq!(
            first.description,
            "**okabe** clicks **mayuri**. **mayuri** has been clicked 1 time."
        );

        let second = commands.click("daru", UserId(7), "mayuri").await.unwrap();
        assert!(second.description.ends_with("has been clicked 2 times."));

        assert_eq!(commands.clicks().count(UserId(7)), 2);
        assert_eq!(commands.clicks().count(UserId(8)), 0);
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.current().unwrap().click_db[&UserId(7)], 2);
    }

    #[test]
    fn test_click_board_restore_replaces_counts() {
        let board = ClickBoard::new();
        board.click(UserId(1));
        board.restore(&BTreeMap::from([(UserId(2), 5)]));

        assert_eq!(board.count(UserId(1)), 0);
        assert_eq!(board.click(UserId(2)), 6);
    }

    #[test]
    fn test_rating_extremes() {
        assert_eq!(
            render_rating("pizza", [0, 0, 0, 0]),
            "pizza, eh? Not looking good. 0.0 out of 5 stars."
        );
        assert_eq!(
            render_rating("pizza", [255, 255, 255, 255]),
            "What do I think about pizza? Looks great. 10 out of 10."
        );
        assert_eq!(
            render_rating("pizza", [128, 128, 128, 128]),
            "pizza? Not much to say about it. 50%."
        );
    }

    #[test]
    fn test_rating_is_stable_within_a_day() {
        let once = rate("steins;gate", day(1));
        assert_eq!(once, rate("steins;gate", day(1)));
        assert!(once.description.contains("steins;gate"));
        assert!(once.title.is_empty());
    }

    #[test]
    fn test_conversions() {
        let ctof: Conversion = "ctof".parse().unwrap();
        assert_eq!(ctof.apply(100.0), "100°C is 212°F");
        assert_eq!(ctof.apply(-40.0), "-40°C is -40°F");
        assert_eq!(ctof.apply(37.5), "37.5°C is 99.5°F");

        let ftoc: Conversion = "ftoc".parse().unwrap();
        assert_eq!(ftoc.apply(98.6), "98.6°F is 37°C");
        assert_eq!(ftoc.apply(32.0), "32°F is 0°C");
        assert_eq!(ftoc.apply(0.0), "0°F is -17.78°C");

        assert!(matches!(
            "ktoc".parse::<Conversion>(),
            Err(CommandError::UnknownConversion(s)) if s == "ktoc"
        ));
    }

    #[test]
    fn test_would_you_rather() {
        assert_eq!(
            would_you_rather("cake", "pie"),
            "would you rather have unlimited cake, but no more pie, or unlimited pie, but no more cake?"
        );
    }

    #[test]
    fn test_pong() {
        assert_eq!(pong(Duration::from_micros(12_500)), "pong (12.50ms)");
    }
}
