//! Mentions: parsing while typing, rendering after sending.
//!
//! - `parser`: detects an in-progress `@`/`#` token at the cursor
//! - `linkify`: turns stored text into markup with resolved mentions and links

mod linkify;
mod parser;

pub use linkify::{Markup, escape_html, linkify, mentioned_uids};
pub use parser::{ActiveMention, MentionMatch, Trigger, parse_mention};
