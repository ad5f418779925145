//! Emoji catalog: built-in standard names plus workspace-custom emojis
//!
//! Symbols are opaque short names compared by exact string identity. Loading
//! preserves order (standard first, then custom) and de-duplicates keeping
//! the first occurrence, so a custom emoji shadowed by a standard name is
//! counted once.

use crate::slack::SlackClient;
use std::collections::HashSet;

/// Built-in standard emoji short names (Slack spelling, no colons).
///
/// A curated subset of the standard set covering the names that show up in
/// practice; workspace-custom emojis are fetched live via `emoji.list`.
const STANDARD_EMOJI_NAMES: &[&str] = &[
    "+1",
    "-1",
    "100",
    "alarm_clock",
    "angry",
    "apple",
    "arrow_down",
    "arrow_left",
    "arrow_right",
    "arrow_up",
    "art",
    "airplane",
    "baby",
    "balloon",
    "bank",
    "bar_chart",
    "beer",
    "beers",
    "bell",
    "bento",
    "bike",
    "birthday",
    "blue_heart",
    "blush",
    "boat",
    "bomb",
    "book",
    "bookmark",
    "books",
    "boom",
    "bow",
    "bowing_man",
    "brain",
    "bread",
    "briefcase",
    "broken_heart",
    "bug",
    "bulb",
    "bus",
    "cake",
    "calendar",
    "camera",
    "car",
    "cat",
    "chart_with_downwards_trend",
    "chart_with_upwards_trend",
    "checkered_flag",
    "cherry_blossom",
    "clap",
    "clipboard",
    "clock1",
    "cloud",
    "coffee",
    "cold_sweat",
    "computer",
    "confetti_ball",
    "confused",
    "construction",
    "cookie",
    "cool",
    "cry",
    "crying_cat_face",
    "curry",
    "dancer",
    "dart",
    "disappointed",
    "dizzy",
    "dog",
    "door",
    "droplet",
    "ear",
    "earth_asia",
    "eggplant",
    "eight_spoked_asterisk",
    "email",
    "exclamation",
    "eye",
    "eyes",
    "facepunch",
    "family",
    "fast_forward",
    "fearful",
    "fire",
    "fireworks",
    "fish",
    "fist",
    "flag-jp",
    "flag-us",
    "flushed",
    "folder",
    "football",
    "fork_and_knife",
    "four_leaf_clover",
    "gear",
    "gem",
    "ghost",
    "gift",
    "globe_with_meridians",
    "grin",
    "grinning",
    "guitar",
    "hammer",
    "hand",
    "handshake",
    "hatched_chick",
    "headphones",
    "heart",
    "heart_eyes",
    "heavy_check_mark",
    "heavy_plus_sign",
    "helicopter",
    "herb",
    "hourglass",
    "house",
    "hugging_face",
    "hushed",
    "ice_cream",
    "innocent",
    "jack_o_lantern",
    "japan",
    "joy",
    "key",
    "keyboard",
    "kiss",
    "knife",
    "laughing",
    "leaves",
    "lightning",
    "link",
    "lock",
    "loudspeaker",
    "mag",
    "mailbox",
    "man",
    "map",
    "mask",
    "medal",
    "mega",
    "memo",
    "microphone",
    "money_with_wings",
    "moneybag",
    "monkey",
    "moon",
    "mortar_board",
    "mount_fuji",
    "muscle",
    "musical_note",
    "neutral_face",
    "new",
    "no_entry",
    "no_entry_sign",
    "notebook",
    "o",
    "ocean",
    "octopus",
    "ok",
    "ok_hand",
    "older_man",
    "open_mouth",
    "owl",
    "package",
    "page_facing_up",
    "palm_tree",
    "panda_face",
    "paperclip",
    "parrot",
    "partly_sunny",
    "party_popper",
    "peace",
    "pencil2",
    "penguin",
    "pensive",
    "phone",
    "pig",
    "pill",
    "pizza",
    "point_down",
    "point_left",
    "point_right",
    "point_up",
    "poop",
    "pray",
    "present",
    "printer",
    "pushpin",
    "question",
    "rabbit",
    "racehorse",
    "rage",
    "rainbow",
    "raised_hand",
    "raised_hands",
    "ramen",
    "red_circle",
    "relieved",
    "repeat",
    "rice",
    "rice_ball",
    "robot_face",
    "rocket",
    "rotating_light",
    "round_pushpin",
    "runner",
    "sake",
    "salute",
    "satellite",
    "scream",
    "seedling",
    "shield",
    "ship",
    "shirt",
    "shrug",
    "signal_strength",
    "ski",
    "skull",
    "sleeping",
    "slightly_smiling_face",
    "smile",
    "smiley",
    "smirk",
    "snowflake",
    "snowman",
    "sob",
    "soccer",
    "sparkles",
    "speech_balloon",
    "star",
    "star-struck",
    "star2",
    "stopwatch",
    "sunflower",
    "sunglasses",
    "sunny",
    "sushi",
    "sweat",
    "sweat_drops",
    "sweat_smile",
    "syringe",
    "tada",
    "taco",
    "tangerine",
    "tea",
    "telephone",
    "thinking_face",
    "thought_balloon",
    "thumbsdown",
    "thumbsup",
    "ticket",
    "tiger",
    "toolbox",
    "tophat",
    "tornado",
    "traffic_light",
    "train",
    "triangular_flag_on_post",
    "trophy",
    "truck",
    "tulip",
    "turtle",
    "tv",
    "umbrella",
    "unamused",
    "unicorn_face",
    "upside_down_face",
    "v",
    "wave",
    "waving_white_flag",
    "wrench",
    "white_check_mark",
    "wink",
    "woman",
    "world_map",
    "worried",
    "writing_hand",
    "x",
    "yen",
    "yum",
    "zap",
    "zipper_mouth_face",
    "zzz",
];

/// Standard emoji names, sorted and de-duplicated.
pub fn get_standard_emojis() -> Vec<String> {
    let mut names: Vec<String> = STANDARD_EMOJI_NAMES.iter().map(|s| s.to_string()).collect();
    names.sort();
    names.dedup();
    log::info!("Loaded {} standard emojis", names.len());
    names
}

/// Workspace-custom emoji names, sorted. A failed or exhausted listing
/// degrades to an empty list rather than aborting the run.
pub async fn get_custom_emoji_names(client: &SlackClient) -> Vec<String> {
    match client.custom_emojis().await {
        Ok(custom) => {
            let mut names: Vec<String> = custom.into_iter().map(|e| e.name).collect();
            names.sort();
            log::info!("Loaded {} custom emojis", names.len());
            names
        }
        Err(e) => {
            log::error!("Failed to load custom emojis: {}", e);
            vec![]
        }
    }
}

/// Load the emoji catalog for a run: standard first, then custom, with
/// order-preserving de-duplication (first occurrence wins). Names that are
/// empty or contain whitespace are dropped.
pub async fn load_emojis(
    client: &SlackClient,
    include_standard: bool,
    include_custom: bool,
) -> Vec<String> {
    let mut all = Vec::new();

    if include_standard {
        log::info!("Loading standard emojis...");
        all.extend(get_standard_emojis());
    }

    if include_custom {
        log::info!("Loading custom emojis...");
        all.extend(get_custom_emoji_names(client).await);
    }

    let unique = dedup_preserving_order(validate_emoji_list(all));
    log::info!("Total emojis loaded: {}", unique.len());
    unique
}

/// Truncate the catalog for trial runs.
pub fn filter_emojis(emoji_list: Vec<String>, max_count: usize) -> Vec<String> {
    if emoji_list.len() <= max_count {
        return emoji_list;
    }
    log::info!(
        "Emoji list filtered from {} to {}",
        emoji_list.len(),
        max_count
    );
    emoji_list.into_iter().take(max_count).collect()
}

/// Drop names that cannot appear in a query: empty or whitespace-containing.
pub fn validate_emoji_list(emoji_list: Vec<String>) -> Vec<String> {
    let before = emoji_list.len();
    let valid: Vec<String> = emoji_list
        .into_iter()
        .filter(|name| {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                log::warn!("Skipping emoji with invalid name: {:?}", name);
                false
            } else {
                true
            }
        })
        .collect();

    let removed = before - valid.len();
    if removed > 0 {
        log::info!("Removed {} invalid emoji names", removed);
    }
    valid
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_emojis_sorted_unique() {
        let names = get_standard_emojis();
        assert!(!names.is_empty());
        for pair in names.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        assert!(names.contains(&"smile".to_string()));
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let names = vec![
            "smile".to_string(),
            "heart".to_string(),
            "smile".to_string(),
            "tada".to_string(),
        ];
        assert_eq!(dedup_preserving_order(names), vec!["smile", "heart", "tada"]);
    }

    #[test]
    fn test_validate_drops_invalid_names() {
        let names = vec![
            "smile".to_string(),
            "".to_string(),
            "bad name".to_string(),
            "tab\tname".to_string(),
            "heart".to_string(),
        ];
        assert_eq!(validate_emoji_list(names), vec!["smile", "heart"]);
    }

    #[test]
    fn test_filter_emojis_truncates() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(filter_emojis(names.clone(), 2), vec!["a", "b"]);
        assert_eq!(filter_emojis(names.clone(), 5), names);
    }
}
