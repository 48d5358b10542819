//! Edit directive protocol
//!
//! An assistant response may carry an edit directive:
//!
//! ```text
//! [EDIT] instruction shown in chat
//! [START_EDIT]
//! replacement document
//! [END_EDIT]
//! ```
//!
//! Only the first `[EDIT]` and the first `[START_EDIT]`/`[END_EDIT]` span after
//! it are honored. Partial markers never fail; they degrade to an empty
//! replacement or a plain conversational reply.

pub const EDIT_MARKER: &str = "[EDIT]";
pub const START_EDIT_MARKER: &str = "[START_EDIT]";
pub const END_EDIT_MARKER: &str = "[END_EDIT]";

/// System turn prepended to every live chat request
pub const EDITOR_SYSTEM_PROMPT: &str = "You are an AI assistant in a collaborative text editor. \
You can either respond conversationally or perform edits on the text content. \
If you want to edit the text content, start your response with [EDIT] followed by instructions, \
then provide the edited text between [START_EDIT] and [END_EDIT] tags.";

/// An edit extracted from an assistant response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDirective {
    /// Human-readable description of the change, shown in chat
    pub instruction: String,
    /// Text to substitute for the document; empty means "do not touch it"
    pub replacement: String,
}

impl EditDirective {
    pub fn has_replacement(&self) -> bool {
        !self.replacement.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// No `[EDIT]` marker; the whole text is a chat reply
    Conversation(String),
    Edit(EditDirective),
}

impl ParsedResponse {
    /// Text the chat panel should display for this response
    pub fn chat_text(&self) -> &str {
        match self {
            ParsedResponse::Conversation(text) => text,
            ParsedResponse::Edit(directive) => &directive.instruction,
        }
    }

    pub fn directive(&self) -> Option<&EditDirective> {
        match self {
            ParsedResponse::Conversation(_) => None,
            ParsedResponse::Edit(directive) => Some(directive),
        }
    }
}

/// Split a raw assistant response into chat text and an optional edit.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let Some(edit_at) = raw.find(EDIT_MARKER) else {
        return ParsedResponse::Conversation(raw.to_string());
    };
    let after_edit = &raw[edit_at + EDIT_MARKER.len()..];

    let (instruction, replacement) = match after_edit.find(START_EDIT_MARKER) {
        Some(start_at) => {
            let body = &after_edit[start_at + START_EDIT_MARKER.len()..];
            let replacement = body
                .find(END_EDIT_MARKER)
                .map(|end_at| body[..end_at].trim())
                .unwrap_or("");
            (after_edit[..start_at].trim(), replacement)
        }
        None => (after_edit.trim(), ""),
    };

    ParsedResponse::Edit(EditDirective {
        instruction: instruction.to_string(),
        replacement: replacement.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(raw: &str) -> EditDirective {
        match parse_response(raw) {
            ParsedResponse::Edit(d) => d,
            other => panic!("expected edit, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_directive() {
        let d = edit("[EDIT]  Renamed the function. \n[START_EDIT]\nfn main() {}\n[END_EDIT]");
        assert_eq!(d.instruction, "Renamed the function.");
        assert_eq!(d.replacement, "fn main() {}");
        assert!(d.has_replacement());
    }

    #[test]
    fn test_text_before_edit_marker_is_ignored() {
        let d = edit("Sure thing! [EDIT] Done [START_EDIT]x[END_EDIT] trailing");
        assert_eq!(d.instruction, "Done");
        assert_eq!(d.replacement, "x");
    }

    #[test]
    fn test_plain_conversation() {
        let parsed = parse_response("Just chatting, no edits here.");
        assert_eq!(
            parsed,
            ParsedResponse::Conversation("Just chatting, no edits here.".to_string())
        );
        assert!(parsed.directive().is_none());
        assert_eq!(parsed.chat_text(), "Just chatting, no edits here.");
    }

    #[test]
    fn test_edit_without_span_keeps_instruction() {
        let d = edit("[EDIT] I would change the title, but here is no span.");
        assert_eq!(d.instruction, "I would change the title, but here is no span.");
        assert_eq!(d.replacement, "");
        assert!(!d.has_replacement());
    }

    #[test]
    fn test_start_without_end() {
        let d = edit("[EDIT] partial [START_EDIT] dangling text");
        assert_eq!(d.instruction, "partial");
        assert_eq!(d.replacement, "");
    }

    #[test]
    fn test_end_before_start_is_not_a_span() {
        let d = edit("[EDIT] odd [END_EDIT] x [START_EDIT] y");
        assert_eq!(d.instruction, "odd [END_EDIT] x");
        assert_eq!(d.replacement, "");
    }

    #[test]
    fn test_whitespace_only_replacement_is_empty() {
        let d = edit("[EDIT] nothing [START_EDIT]  \n\t [END_EDIT]");
        assert_eq!(d.replacement, "");
        assert!(!d.has_replacement());
    }

    #[test]
    fn test_first_span_wins() {
        let d = edit("[EDIT] a [START_EDIT]one[END_EDIT] [EDIT] b [START_EDIT]two[END_EDIT]");
        assert_eq!(d.instruction, "a");
        assert_eq!(d.replacement, "one");
    }

    #[test]
    fn test_markers_at_boundaries() {
        let d = edit("[EDIT]");
        assert_eq!(d.instruction, "");
        assert_eq!(d.replacement, "");

        let d = edit("[EDIT][START_EDIT][END_EDIT]");
        assert_eq!(d.instruction, "");
        assert_eq!(d.replacement, "");
    }

    #[test]
    fn test_start_marker_alone_is_conversation() {
        let parsed = parse_response("[START_EDIT]text[END_EDIT]");
        assert!(matches!(parsed, ParsedResponse::Conversation(_)));
    }

    #[test]
    fn test_multibyte_content() {
        let d = edit("[EDIT] Übersetzt ✓ [START_EDIT]héllo wörld[END_EDIT]");
        assert_eq!(d.instruction, "Übersetzt ✓");
        assert_eq!(d.replacement, "héllo wörld");
    }
}
