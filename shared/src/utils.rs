//! # Shared Utility Functions
//!
//! Common utility functions used by both the backend and the client.
//!
//! ## Message Previews
//!
//! Conversation list views show a one-line preview of the last message;
//! [`preview_text`] truncates on a character boundary and appends an
//! ellipsis so multi-byte text never splits mid-codepoint.
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::preview_text;
//!
//! assert_eq!(preview_text("Hola, ¿sigue disponible?", 10), "Hola, ¿sig…");
//! assert_eq!(preview_text("ok", 10), "ok");
//! ```

/// Truncate message text to at most `max_chars` characters for a preview.
///
/// Counts characters, not bytes, so accented text truncates cleanly. Text
/// short enough is returned unchanged, otherwise an ellipsis is appended.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", preview)
    } else {
        preview
    }
}
