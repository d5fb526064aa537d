//! Turns a pasted, free-text materials list into line items.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLineItem {
    pub quantity: f64,
    pub unit: Option<String>,
    pub description: String,
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s+").expect("static regex"))
}

// "10 x item", "10x item", "3m item", "2.5 metres of item", "1,000 item"
fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*(?:(m|metres?|meters?|kg|rolls?|boxes|box|packs?|lengths?)\b\s*(?:of\s+)?|x\s+|\s+)(.+)$",
        )
        .expect("static regex")
    })
}

// "item x 10", "item - 10"
fn trailing_quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)\s*(?:x|×|-)\s*(\d+(?:\.\d+)?)$").expect("static regex")
    })
}

fn normalise_unit(unit: &str) -> String {
    let unit = unit.to_lowercase();
    match unit.as_str() {
        "m" | "metre" | "metres" | "meter" | "meters" => "m".to_string(),
        "box" | "boxes" => "box".to_string(),
        "roll" | "rolls" => "roll".to_string(),
        "pack" | "packs" => "pack".to_string(),
        "length" | "lengths" => "length".to_string(),
        _ => unit,
    }
}

pub fn parse_line(line: &str) -> Option<MaterialLineItem> {
    let line = bullet_re().replace(line, "");
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = quantity_re().captures(line) {
        let quantity = caps[1].replace(',', "").parse::<f64>().ok().filter(|q| *q > 0.0);
        let description = caps[3].trim();
        if let (Some(quantity), false) = (quantity, description.is_empty()) {
            return Some(MaterialLineItem {
                quantity,
                unit: caps.get(2).map(|u| normalise_unit(u.as_str())),
                description: description.to_string(),
            });
        }
    }

    if let Some(caps) = trailing_quantity_re().captures(line) {
        if let Some(quantity) = caps[2].parse::<f64>().ok().filter(|q| *q > 0.0) {
            return Some(MaterialLineItem {
                quantity,
                unit: None,
                description: caps[1].trim().to_string(),
            });
        }
    }

    Some(MaterialLineItem {
        quantity: 1.0,
        unit: None,
        description: line.to_string(),
    })
}

/// Splits a one-line list on semicolons and on commas, except a comma
/// between two digits ("1,000").
fn split_inline(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let separator = match c {
            ';' => true,
            ',' => {
                let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
                let digit_after = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
                !(digit_before && digit_after)
            }
            _ => false,
        };
        if separator {
            parts.push(&text[start..i]);
            start = i + 1;
        }
    }
    parts.push(&text[start..]);
    parts
}

/// One item per non-blank line. Commas and semicolons also split items when
/// the whole list is on a single line.
pub fn parse_materials(text: &str) -> Vec<MaterialLineItem> {
    let lines: Vec<&str> = if text.trim().contains('\n') {
        text.lines().collect()
    } else {
        split_inline(text)
    };
    lines.into_iter().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, unit: Option<&str>, description: &str) -> MaterialLineItem {
        MaterialLineItem {
            quantity,
            unit: unit.map(str::to_string),
            description: description.to_string(),
        }
    }

    #[test]
    fn leading_quantities() {
        assert_eq!(
            parse_line("10 x 25mm stuffing glands"),
            Some(item(10.0, None, "25mm stuffing glands"))
        );
        assert_eq!(parse_line("4x double sockets"), Some(item(4.0, None, "double sockets")));
        assert_eq!(parse_line("6 back boxes"), Some(item(6.0, None, "back boxes")));
        assert_eq!(parse_line("50m 2.5mm T&E"), Some(item(50.0, Some("m"), "2.5mm T&E")));
        assert_eq!(parse_line("25mm glands"), Some(item(1.0, None, "25mm glands")));
        assert_eq!(
            parse_line("2 boxes of wago 221"),
            Some(item(2.0, Some("box"), "wago 221"))
        );
    }

    #[test]
    fn trailing_quantity_and_plain_lines() {
        assert_eq!(parse_line("RCBO 32A x 6"), Some(item(6.0, None, "RCBO 32A")));
        assert_eq!(parse_line("Consumer unit"), Some(item(1.0, None, "Consumer unit")));
    }

    #[test]
    fn bullets_and_blank_lines() {
        let text = "- 3 x fused spurs\n\n* 20m 20mm conduit\n1. Earth clamps x 4\n   \n";
        assert_eq!(
            parse_materials(text),
            vec![
                item(3.0, None, "fused spurs"),
                item(20.0, Some("m"), "20mm conduit"),
                item(4.0, None, "Earth clamps"),
            ]
        );
    }

    #[test]
    fn single_line_comma_list() {
        let items = parse_materials("2 x isolators, cable ties; 5 x grommets");
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], item(1.0, None, "cable ties"));
        assert_eq!(items[2].quantity, 5.0);
    }

    #[test]
    fn thousands_separator_is_not_a_split() {
        let items = parse_materials("1,000 cable clips, 2 x isolators,3 x grommets");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], item(1000.0, None, "cable clips"));
        assert_eq!(items[1], item(2.0, None, "isolators"));
        assert_eq!(items[2], item(3.0, None, "grommets"));
    }

    #[test]
    fn empty_text_has_no_items() {
        assert!(parse_materials("").is_empty());
        assert!(parse_materials("  \n \n").is_empty());
    }
}
