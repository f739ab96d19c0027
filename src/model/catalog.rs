use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A read-only glyph catalog, mapping a snake_case symbolic name to the glyph it stands for.
///
/// Entries are kept in a fixed order, which is the iteration order used when listing and filtering them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    /// Pictographic emoji
    Emoji,
    /// Special characters: math symbols, arrows, typography and kaomoji
    Special,
}

impl Catalog {
    /// All the entries of this catalog, in iteration order
    pub fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Catalog::Emoji => EMOJI,
            Catalog::Special => SPECIAL_CHARS,
        }
    }

    /// Looks up the glyph for the given symbolic name
    pub fn glyph(self, name: &str) -> Option<&'static str> {
        self.entries().iter().find(|(n, _)| *n == name).map(|(_, g)| *g)
    }
}

const SPECIAL_CHARS: &[(&str, &str)] = &[
    ("airplane", "✈"),
    ("alpha", "α"),
    ("angle", "∠"),
    ("approximately_equal", "≈"),
    ("ballot_box", "☐"),
    ("ballot_box_checked", "☑"),
    ("beta", "β"),
    ("biohazard", "☣"),
    ("box_draw_cross", "┼"),
    ("box_draw_light_horizontal", "─"),
    ("box_draw_light_vertical", "│"),
    ("box_draw_t_down", "┬"),
    ("box_draw_t_left", "┤"),
    ("box_draw_t_right", "├"),
    ("box_draw_t_up", "┴"),
    ("bullet", "•"),
    ("cent", "¢"),
    ("check_mark", "✓"),
    ("cheers_face", "(*＾▽＾)／"),
    ("circle_black", "●"),
    ("circle_white", "○"),
    ("club", "♣"),
    ("copyright", "©"),
    ("cubic_root", "∛"),
    ("degree", "°"),
    ("delta", "δ"),
    ("diamond", "♦"),
    ("double_angle_left", "«"),
    ("double_angle_right", "»"),
    ("double_music_note", "♫"),
    ("down_arrow", "↓"),
    ("element_of", "∈"),
    ("ellipsis", "…"),
    ("em_dash", "—"),
    ("empty_set", "∅"),
    ("en_dash", "–"),
    ("envelope", "✉"),
    ("euro", "€"),
    ("for_all", "∀"),
    ("fourth_root", "∜"),
    ("gamma", "γ"),
    ("greater_equal", "≥"),
    ("happy_sparkles", "｡^‿^｡"),
    ("heart", "♥"),
    ("infinity", "∞"),
    ("integral", "∫"),
    ("left_arrow", "←"),
    ("left_right_arrow", "↔"),
    ("lenny_face", "( ͡° ͜ʖ ͡°)"),
    ("less_equal", "≤"),
    ("logical_and", "∧"),
    ("logical_or", "∨"),
    ("look_of_disapproval", "ಠ_ಠ"),
    ("micro", "µ"),
    ("middle_dot", "·"),
    ("music_note", "♪"),
    ("nabla", "∇"),
    ("not_element_of", "∉"),
    ("not_equal", "≠"),
    ("ohm", "Ω"),
    ("parallel", "∥"),
    ("partial", "∂"),
    ("peace", "☮"),
    ("perpendicular", "⊥"),
    ("phi", "φ"),
    ("pi", "π"),
    ("pilcrow", "¶"),
    ("plus_minus", "±"),
    ("pound", "£"),
    ("quotation_mark_left", "“"),
    ("quotation_mark_right", "”"),
    ("radioactive", "☢"),
    ("recycle", "♻"),
    ("registered", "®"),
    ("right_arrow", "→"),
    ("scissors", "✂"),
    ("section", "§"),
    ("shrug_kaomoji", r"¯\_(ツ)_/¯"),
    ("sigma", "σ"),
    ("single_quote_left", "‘"),
    ("single_quote_right", "’"),
    ("smiley_black", "☻"),
    ("smiley_japanese", "（＾▽＾）"),
    ("smiley_white", "☺"),
    ("spade", "♠"),
    ("square_root", "√"),
    ("star_black", "★"),
    ("star_white", "☆"),
    ("subset_eq", "⊆"),
    ("subset_of", "⊂"),
    ("superset_eq", "⊇"),
    ("superset_of", "⊃"),
    ("table_flip", "(╯°□°）╯︵ ┻━┻"),
    ("there_exists", "∃"),
    ("theta", "θ"),
    ("trademark", "™"),
    ("triangle_black_down", "▼"),
    ("triangle_black_up", "▲"),
    ("up_arrow", "↑"),
    ("up_down_arrow", "↕"),
    ("victory_hand", "✌"),
    ("warning", "⚠"),
    ("weary_face", "(×_×;）"),
    ("writing_hand", "✍"),
    ("x_mark", "✗"),
    ("yen", "¥"),
    ("yin_yang", "☯"),
];

const EMOJI: &[(&str, &str)] = &[
    ("alien", "👽"),
    ("anger_symbol", "💢"),
    ("angry", "😠"),
    ("artist", "🧑\u{200d}🎨"),
    ("astronaut", "🧑\u{200d}🚀"),
    ("baby", "👶"),
    ("baby_bottle", "🍼"),
    ("balloon", "🎈"),
    ("beer", "🍺"),
    ("beers", "🍻"),
    ("bento", "🍱"),
    ("black_heart", "🖤"),
    ("blue_heart", "💙"),
    ("blush", "😊"),
    ("bomb", "💣"),
    ("boom", "💥"),
    ("boy", "👦"),
    ("broken_heart", "💔"),
    ("burrito", "🌯"),
    ("cake", "🍰"),
    ("champagne", "🍾"),
    ("chocolate", "🍫"),
    ("clap", "👏"),
    ("clown", "🤡"),
    ("cocktail", "🍸"),
    ("coffee", "☕"),
    ("cold_sweat", "😰"),
    ("collision", "💥"),
    ("confetti_ball", "🎊"),
    ("confounded", "😖"),
    ("construction_worker", "👷"),
    ("cook", "🧑\u{200d}🍳"),
    ("cookie", "🍪"),
    ("cowboy", "🤠"),
    ("credit_card", "💳"),
    ("crown", "👑"),
    ("cry", "😢"),
    ("curry", "🍛"),
    ("dash", "💨"),
    ("disappointed", "😞"),
    ("dizzy", "😵"),
    ("dizzy_symbol", "💫"),
    ("dollar", "💵"),
    ("doughnut", "🍩"),
    ("ear", "👂"),
    ("elf", "🧝"),
    ("exploding_head", "🤯"),
    ("expressionless", "😑"),
    ("eye", "👁\u{fe0f}"),
    ("eyes", "👀"),
    ("eyes_look", "👀"),
    ("fairy", "🧚"),
    ("fearful", "😨"),
    ("fire", "🔥"),
    ("firefighter", "🧑\u{200d}🚒"),
    ("fries", "🍟"),
    ("gem", "💎"),
    ("genie", "🧞"),
    ("ghost", "👻"),
    ("gift", "🎁"),
    ("girl", "👧"),
    ("glowing_star", "🌟"),
    ("green_heart", "💚"),
    ("grinning", "😀"),
    ("guard", "💂"),
    ("hamburger", "🍔"),
    ("handshake", "🤝"),
    ("health_worker", "🧑\u{200d}⚕\u{fe0f}"),
    ("heart", "❤\u{fe0f}"),
    ("heart_eyes", "😍"),
    ("heartbeat", "💓"),
    ("heartpulse", "💗"),
    ("hole", "🕳\u{fe0f}"),
    ("hotdog", "🌭"),
    ("ice_cream", "🍨"),
    ("joy", "🤣"),
    ("kiss", "😘"),
    ("kiss_mark", "💋"),
    ("laugh", "😂"),
    ("lips", "👄"),
    ("mage", "🧙"),
    ("man", "👨"),
    ("man_in_suit", "🕴\u{fe0f}"),
    ("man_with_beard", "🧔"),
    ("mermaid", "🧜"),
    ("moneybag", "💰"),
    ("muscle", "💪"),
    ("nail_polish", "💅"),
    ("neutral", "😐"),
    ("ninja", "🥷"),
    ("nose", "👃"),
    ("ok_hand", "👌"),
    ("older_man", "👴"),
    ("older_woman", "👵"),
    ("orange_heart", "🧡"),
    ("party_popper", "🥳"),
    ("persevere", "😣"),
    ("pilot", "🧑\u{200d}✈\u{fe0f}"),
    ("pizza", "🍕"),
    ("police", "👮"),
    ("poop", "💩"),
    ("popcorn", "🍿"),
    ("pray", "🙏"),
    ("purple_heart", "💜"),
    ("rage", "😡"),
    ("raised_hand", "✋"),
    ("raised_hands", "🙌"),
    ("ramen", "🍜"),
    ("relieved", "😌"),
    ("revolving_hearts", "💞"),
    ("rice_ball", "🍙"),
    ("ring", "💍"),
    ("robot", "🤖"),
    ("scream", "😱"),
    ("selfie", "🤳"),
    ("shopping_cart", "🛒"),
    ("skull", "💀"),
    ("sleeping", "😴"),
    ("sleepy", "😪"),
    ("smile", "😊"),
    ("sob", "😭"),
    ("spaghetti", "🍝"),
    ("sparkling_heart", "💖"),
    ("star", "⭐"),
    ("student", "🧑\u{200d}🎓"),
    ("sunglasses", "😎"),
    ("superhero", "🦸"),
    ("supervillain", "🦹"),
    ("sushi", "🍣"),
    ("sweat_droplets", "💦"),
    ("sweat_smile", "😅"),
    ("taco", "🌮"),
    ("tada", "🎉"),
    ("tea", "🍵"),
    ("teacher", "🧑\u{200d}🏫"),
    ("thinking", "🤔"),
    ("thumbs_down", "👎"),
    ("thumbs_up", "👍"),
    ("tongue", "👅"),
    ("triumph", "😤"),
    ("troll", "🧌"),
    ("tropical_drink", "🍹"),
    ("two_hearts", "💕"),
    ("unamused", "😒"),
    ("vampire", "🧛"),
    ("vulcan_salute", "🖖"),
    ("wave", "👋"),
    ("white_heart", "🤍"),
    ("wine_glass", "🍷"),
    ("wink", "😉"),
    ("woman", "👩"),
    ("writing", "✍\u{fe0f}"),
    ("yellow_heart", "💛"),
    ("zombie", "🧟"),
    ("zzz", "💤"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_catalog_names_are_unique_snake_case() {
        for catalog in Catalog::iter() {
            let mut seen = HashSet::new();
            for (name, glyph) in catalog.entries() {
                assert!(seen.insert(*name), "duplicated name in {catalog}: {name}");
                assert!(
                    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                    "not snake_case: {name}"
                );
                assert!(!glyph.is_empty(), "empty glyph for {name}");
            }
        }
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(Catalog::Emoji.glyph("fire"), Some("🔥"));
        assert_eq!(Catalog::Special.glyph("pi"), Some("π"));
        assert_eq!(Catalog::Special.glyph("fire"), None);
    }

    #[test]
    fn test_catalog_storage_keys() {
        assert_eq!(Catalog::Emoji.to_string(), "emoji");
        assert_eq!(Catalog::Special.to_string(), "special");
        assert_eq!("special".parse::<Catalog>().unwrap(), Catalog::Special);
    }
}
