//! Toolbar text actions
//!
//! Each action has a deterministic local transform used in mock mode and a
//! prompt template used when the language model does the work.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ServiceError;

/// System turn sent with every live text action
pub const TEXT_EDITING_SYSTEM_PROMPT: &str = "You are a helpful text editing assistant.";

const LENGTHEN_SUFFIX: &str = " Additionally, this text has been expanded with more details and examples to illustrate the concept more thoroughly.";

const TABLE_TEMPLATE: &str = "| Column 1 | Column 2 |\n|---------|----------|\n| Data 1  | Data 2   |\n| Data 3  | Data 4   |";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAction {
    Shorten,
    Lengthen,
    Table,
    FixGrammar,
    Format,
    BulletList,
}

impl TextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAction::Shorten => "shorten",
            TextAction::Lengthen => "lengthen",
            TextAction::Table => "table",
            TextAction::FixGrammar => "fix-grammar",
            TextAction::Format => "format",
            TextAction::BulletList => "bullet-list",
        }
    }

    pub fn all() -> Vec<TextAction> {
        vec![
            TextAction::Shorten,
            TextAction::Lengthen,
            TextAction::Table,
            TextAction::FixGrammar,
            TextAction::Format,
            TextAction::BulletList,
        ]
    }

    /// Toolbar label
    pub fn display_name(&self) -> &'static str {
        match self {
            TextAction::Shorten => "Shorten",
            TextAction::Lengthen => "Lengthen",
            TextAction::Table => "Table",
            TextAction::FixGrammar => "Fix Grammar",
            TextAction::Format => "Format",
            TextAction::BulletList => "Bullet List",
        }
    }

    /// Instruction for the language model, quoting the input verbatim
    pub fn prompt(&self, text: &str) -> String {
        match self {
            TextAction::Shorten => {
                format!("Shorten this text while preserving its meaning: \"{}\"", text)
            }
            TextAction::Lengthen => format!("Expand this text with more details: \"{}\"", text),
            TextAction::Table => {
                format!("Convert this text into a well-formatted markdown table: \"{}\"", text)
            }
            TextAction::FixGrammar => {
                format!("Fix any grammar or spelling issues in this text: \"{}\"", text)
            }
            TextAction::Format => {
                format!("Reformat this text to make it more readable: \"{}\"", text)
            }
            TextAction::BulletList => {
                format!("Convert this text into a bullet point list: \"{}\"", text)
            }
        }
    }

    /// Deterministic offline transform
    pub fn apply_mock(&self, text: &str) -> String {
        match self {
            TextAction::Shorten => shorten(text),
            TextAction::Lengthen => format!("{}{}", text, LENGTHEN_SUFFIX),
            TextAction::Table => TABLE_TEMPLATE.to_string(),
            TextAction::FixGrammar => fix_grammar(text),
            TextAction::Format => sentence_segments(text).join(".\n\n"),
            TextAction::BulletList => sentence_segments(text)
                .iter()
                .map(|s| format!("- {}", s))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for TextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextAction {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shorten" => Ok(TextAction::Shorten),
            "lengthen" => Ok(TextAction::Lengthen),
            "table" => Ok(TextAction::Table),
            "fix-grammar" => Ok(TextAction::FixGrammar),
            "format" => Ok(TextAction::Format),
            "bullet-list" => Ok(TextAction::BulletList),
            other => Err(ServiceError::InvalidAction(other.to_string())),
        }
    }
}

fn shorten(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let keep = (words.len() / 2).max(3);
    let kept: Vec<&str> = words.into_iter().take(keep).collect();
    format!("{}...", kept.join(" "))
}

struct GrammarRules {
    lone_i: Regex,
    periods: Regex,
    whitespace: Regex,
}

fn grammar_rules() -> &'static GrammarRules {
    static RULES: OnceLock<GrammarRules> = OnceLock::new();
    RULES.get_or_init(|| GrammarRules {
        lone_i: Regex::new(r"\bi\b").unwrap(),
        periods: Regex::new(r"\.+").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
    })
}

fn fix_grammar(text: &str) -> String {
    let rules = grammar_rules();
    let fixed = rules.lone_i.replace_all(text, "I");
    let fixed = rules.periods.replace_all(&fixed, ".");
    rules.whitespace.replace_all(&fixed, " ").into_owned()
}

/// Non-empty, trimmed segments between periods
fn sentence_segments(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
