use regex::Regex;
use std::sync::LazyLock;

const INNINGS_SUFFIX: &str = " innings";

/// Characters after which a batter's name cell carries notes rather than the name:
/// dismissal/captaincy brackets and the wicket-keeper daggers.
const NAME_TERMINATORS: [char; 3] = ['(', '†', '‡'];

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("literal regex is valid"));

static TRAILING_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+\d+(st|nd|rd|th)$").expect("literal regex is valid"));

/// Collapses every whitespace run (non-breaking spaces included) to one space and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns an innings label such as "India 2nd Innings" into the team name "India".
pub fn strip_innings_suffix(label: &str) -> String {
    let label = normalize_whitespace(label);

    let without_suffix = label
        .len()
        .checked_sub(INNINGS_SUFFIX.len())
        .filter(|&at| {
            label
                .get(at..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(INNINGS_SUFFIX))
        })
        .map_or(label.as_str(), |at| &label[..at]);

    TRAILING_ORDINAL
        .replace(without_suffix, "")
        .trim()
        .to_string()
}

/// Player name from a name cell, e.g. "Rishabh Pant † (c)" -> "Rishabh Pant".
pub fn clean_player_name(cell_text: &str) -> String {
    let text = normalize_whitespace(cell_text);
    let end = text.find(NAME_TERMINATORS).unwrap_or(text.len());
    text[..end].trim().to_string()
}

/// Strict count parse used for batting figures: "12" parses, "12*" or "-" do not.
pub fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

/// Tolerant parse used for bowling figures: the first run of digits, or 0 when there is none.
pub fn first_number(text: &str) -> u32 {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Virat \n\t Kohli  "), "Virat Kohli");
        assert_eq!(normalize_whitespace("Josh\u{a0}Inglis"), "Josh Inglis");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_strip_innings_suffix() {
        assert_eq!(strip_innings_suffix("India Innings"), "India");
        assert_eq!(strip_innings_suffix("  Sydney Sixers   innings "), "Sydney Sixers");
        assert_eq!(strip_innings_suffix("England 2nd Innings"), "England");
        assert_eq!(strip_innings_suffix("Australia"), "Australia");
        assert_eq!(strip_innings_suffix("Innings"), "Innings");
    }

    #[test]
    fn test_clean_player_name() {
        assert_eq!(clean_player_name("Rohit Sharma (c)"), "Rohit Sharma");
        assert_eq!(clean_player_name("Ishan Kishan\u{a0}†"), "Ishan Kishan");
        assert_eq!(clean_player_name("MS Dhoni (c)†"), "MS Dhoni");
        assert_eq!(clean_player_name("Shubman Gill"), "Shubman Gill");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(" 45 "), Some(45));
        assert_eq!(parse_count("45*"), None);
        assert_eq!(parse_count("-"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("32"), 32);
        assert_eq!(first_number("2w"), 2);
        assert_eq!(first_number("—"), 0);
        assert_eq!(first_number("(4nb) 11"), 4);
    }
}
