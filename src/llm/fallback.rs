//! Canned in-character replies for when the completion service is down.
//!
//! Every bucket is non-empty and every reply ends with a question, so a
//! fallback still reads like a normal turn.

use rand::seq::IndexedRandom;

use crate::model::character::Personality;

const FRIENDLY: &[&str] = &[
    "Mrrp, my whiskers got a little tangled just now. Could you say that again?",
    "*stretches and blinks slowly* Sorry, I drifted off for a second. What were you telling me?",
    "Purr... I lost my train of thought chasing a sunbeam. Mind repeating that?",
    "Oops, I batted my own thoughts right off the table! What was that again?",
];

const PLAYFUL: &[&str] = &[
    "*pounces on an invisible toy* Wait, wait, I got distracted! What did you say?",
    "Mew! A butterfly flew past and I HAD to chase it. Tell me again?",
    "*zooms around the room* Okay I'm back! What were we talking about?",
];

const SASSY: &[&str] = &[
    "*flicks tail* I was ignoring you on purpose. Fine, say it again?",
    "Hmph, I'm a cat, I don't have to listen the first time. Try again?",
    "*examines paw* Was that important? Go on then, will you repeat it?",
];

const SHY: &[&str] = &[
    "*peeks out from under the blanket* Um... sorry, could you say that once more?",
    "Mew... I got a little flustered. What did you mean?",
    "*hides behind a cushion* I didn't quite catch that... would you tell me again?",
];

const WISE: &[&str] = &[
    "*closes eyes thoughtfully* Even an old cat's mind wanders. What were you saying, friend?",
    "Patience is a cat's gift, but my thoughts slipped away. Could you share that again?",
    "Hmm. The answer is hiding like a mouse in the walls. Will you ask me once more?",
];

const GRUMPY: &[&str] = &[
    "*grumbles* I was napping. What do you want now?",
    "Ugh, my brain's full of hairballs today. Say that again, would you?",
    "*sighs heavily* Can't a cat get some peace? Fine, what was it?",
];

/// The fallback bucket for a personality.
pub fn bucket(personality: Personality) -> &'static [&'static str] {
    match personality {
        Personality::Friendly => FRIENDLY,
        Personality::Playful => PLAYFUL,
        Personality::Sassy => SASSY,
        Personality::Shy => SHY,
        Personality::Wise => WISE,
        Personality::Grumpy => GRUMPY,
    }
}

/// Uniformly pick a reply for the (resolved) personality label.
pub fn reply(personality: Option<&str>) -> &'static str {
    let options = bucket(Personality::resolve(personality));
    options.choose(&mut rand::rng()).copied().unwrap_or(FRIENDLY[0])
}
