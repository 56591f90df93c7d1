//! The built-in response set.
//!
//! Order matters: dispatch applies the first enabled match, so the
//! compliment/insult detectors run before the chattier catch-alls.

use amadeus_core::{EmojiId, UserId};
use amadeus_framework::{
    Action, BuildResult, Candidate, DEFAULT_CHANCE, Registry, ReplyMode, Response, Trigger,
};

pub const THANKS_EMOJI: EmojiId = EmojiId(1127702351252303892);
pub const CRY_EMOJI: EmojiId = EmojiId(1127702202203521044);
pub const COOL_EMOJI: EmojiId = EmojiId(1127705480471519243);
pub const WAVE_EMOJI: EmojiId = EmojiId(1127698005034807420);

/// Matches "I'm X" anywhere in a message; group 2 is X.
pub const DAD_PATTERN: &str = r"^.*( |^)i['‘ʼ’]?m (.+)";

pub const HUG_TEMPLATES: &[&str] = &[
    "heheehehehe {0} hugs {1} < 3 < 3 <  ##<#,3,33<#3,#3,,3,3,#<...",
    "{0} squeezes {1} tightly.",
    "{0} wraps their arms around {1}'s",
    "{0} puts their arms around {1} and holds them tightly, because {0} likes {1} or is pleased to see {1}",
    "{0} holds {1} close to their body.",
    "{0} clasps {1} tightly in their arms.",
    "{0} wraps their arms around {1}'s back in a warm embrace",
    "{0} holds {1} close to their body, likely to show that they like, love, or value them.",
    "{0} squeezes {1} tightly, probably to express affection.",
    "{0} is trapped with {1}'s arms wrapped around their back.",
    "{0} sneaks up from behind {1} and puts their arms around {1}'s waist.",
];

pub const PAT_TEMPLATES: &[&str] = &[
    "{0} softly strokes {1}'s head as a sign of affection.",
    "{1} smiled, slightly blushing, as {0} playfully taps {1}'s head.",
    "{0} lets out a quiet purr as {1}'s fingers gently scratches {0}'s head.",
    "{1} timidly placed {0}'s hand on their head.",
    "{0} reaches over and lightly taps {1}'s head.",
    "{0} gently strokes {1}'s head.",
    "{0} moves their hand over to {1}'s head and gave it a pleasure feeling.",
    "{0} runs their finger through {1}'s hair, lightly scratches {1}'s head and caressing their hair strands.",
    "{1} timidly placed {0}'s hand on their head while blushing intensely.",
];

/// The message is aimed at the bot: it pings or replies to it, follows one
/// of its messages, or names it.
fn addressed_to(bot: UserId) -> Trigger {
    Trigger::or([
        Trigger::mentions(bot),
        Trigger::last_author(bot),
        Trigger::contains(["amadeus"]),
    ])
}

/// A send-or-react response for a compliment or insult aimed at the bot.
fn feedback(
    name: &str,
    phrases: &[&str],
    keywords: &[&str],
    bot: UserId,
    emoji_name: &str,
    emoji: EmojiId,
) -> Response {
    let trigger = Trigger::or([
        Trigger::contains(phrases.iter().copied()),
        Trigger::and([Trigger::contains(keywords.iter().copied()), addressed_to(bot)]),
    ]);
    Response::send_or_react(
        name,
        trigger,
        format!("<a:{emoji_name}:{emoji}>"),
        emoji,
        ReplyMode::Message,
    )
}

/// Builds the default registry for the bot account `bot`.
pub fn default_registry(bot: UserId) -> BuildResult<Registry> {
    let thanks = feedback(
        "Thanks Bot",
        &["thanks bot", "good bot"],
        &["thank"],
        bot,
        "kurisuthumbsup",
        THANKS_EMOJI,
    );
    let bad = feedback(
        "Bad Bot",
        &["bad bot", "stupid bot"],
        &["shut", "bad", "stupid", "kys"],
        bot,
        "kurisucry",
        CRY_EMOJI,
    );
    let cool = feedback(
        "Cool Bot",
        &["epic bot", "cool bot"],
        &["epic", "cool", "poggers"],
        bot,
        "kurisucool",
        COOL_EMOJI,
    );

    let dad = Response::random_chance(
        "Dad Bot",
        Trigger::regex(DAD_PATTERN)?,
        Action::regex_send(DAD_PATTERN, "Hi ${2}, I'm dad!")?,
        DEFAULT_CHANCE,
    )?;

    let nicu = Response::new(
        "Nicu",
        Trigger::contains(["nicu"]),
        Action::send("nicu nicu\nvery nicu shiza-chan"),
    );

    let nullpo = Response::new("Nullpo", Trigger::contains(["nullpo"]), Action::send("gah!"));

    let amadeus = Response::new(
        "Amadeus",
        Trigger::or([Trigger::regex("^amadeus*")?, Trigger::mentions(bot)]),
        Action::random([
            Candidate::from("uwu"),
            Candidate::from("?"),
            Candidate::from("hey"),
            Candidate::from("waddup"),
            Candidate::computed(|ctx| ctx.author.display_name().to_string()),
        ]),
    );

    let cyanide = Response::send_or_react(
        "Cyanide",
        Trigger::literals(["cyanide", "cyan", "cya", "see you", "see ya"], false, true),
        format!("cyanide <a:rinwave:{WAVE_EMOJI}>"),
        WAVE_EMOJI,
        ReplyMode::Message,
    );

    let hug = Response::new(
        ".hug",
        Trigger::regex(r"^\.hug*")?,
        Action::random_template(HUG_TEMPLATES.iter().copied()),
    );

    let pat = Response::new(
        ".pat",
        Trigger::regex(r"^\.pat*")?,
        Action::random_template(PAT_TEMPLATES.iter().copied()),
    );

    let meow = Response::random_chance(
        "meow",
        Trigger::cooldown(5, Trigger::regex("m[re]+o+w+~*")?),
        Action::echo(),
        DEFAULT_CHANCE,
    )?;

    Ok([
        thanks, bad, cool, dad, nicu, nullpo, amadeus, cyanide, hug, pat, meow,
    ]
    .into_iter()
    .collect())
}
