//! Block content editor for signals.

mod debounce;
mod embed;
mod history;
mod inline;
mod session;

pub use debounce::Debounce;
pub use embed::{normalize_embed, Embed, EmbedProvider};
pub use history::History;
pub use inline::{apply_format, escape_html, render_inline, Format, Formatted, Selection};
pub use session::{EditorSession, EditorStatus, MoveDirection, SaveState, TickOutcome};
