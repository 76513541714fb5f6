//! Mention and link rendering.
//!
//! Stored message text is untrusted. Rendering splits it into literal
//! fragments and generated fragments; literals are always HTML-escaped and
//! every value interpolated into generated markup is escaped as an attribute
//! or text value. The resulting [`Markup`] therefore only contains tags this
//! module produced.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::parser::Trigger;
use crate::user::{Channel, Member};

/// Word limit for `@member` mentions.
const USER_MENTION_WORDS: usize = 2;
/// Word limit for `#channel` mentions.
const CHANNEL_MENTION_WORDS: usize = 3;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern must compile"));
static WWW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(www\.\S+)").expect("www pattern must compile"));

/// Rendered message markup.
///
/// Only [`linkify`] constructs this, so holding a `Markup` means the content
/// went through the escaping boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes text for use as HTML text content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

enum Segment<'a> {
    Literal(&'a str),
    Generated(String),
}

/// A mention found in literal text.
struct MentionToken<'a> {
    /// Byte range of trigger + name
    start: usize,
    end: usize,
    /// Identifier of the record it resolved to
    resolved: Option<&'a str>,
}

fn is_trailing_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?')
}

/// Byte offsets where each of the first `max_words` words ends.
///
/// Words are runs of alphabetic characters separated by a single space.
fn word_ends(name_part: &str, max_words: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = name_part.char_indices().peekable();

    while ends.len() < max_words {
        if !ends.is_empty() {
            // a further word needs " " followed by a letter
            let mut lookahead = chars.clone();
            match (lookahead.next(), lookahead.peek()) {
                (Some((_, ' ')), Some((_, c))) if c.is_alphabetic() => {
                    chars.next();
                }
                _ => break,
            }
        }

        let mut end = None;
        while let Some((i, c)) = chars.peek().copied() {
            if !c.is_alphabetic() {
                break;
            }
            end = Some(i + c.len_utf8());
            chars.next();
        }
        match end {
            Some(end) => ends.push(end),
            None => break,
        }
    }
    ends
}

/// Finds `trigger` mentions in `text`.
///
/// A mention starts at the beginning of `text` or after whitespace and must
/// be followed by whitespace, `.`, `,`, `!`, `?` or the end. Candidate
/// spans are tried longest first and the first one `resolve` knows wins;
/// when none is known the single-word span is reported unresolved.
fn scan_mentions<'a, F>(
    text: &'a str,
    trigger: Trigger,
    max_words: usize,
    resolve: &F,
) -> Vec<MentionToken<'a>>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let trigger_char = trigger.as_char();
    let mut tokens = Vec::new();
    let mut prev: Option<char> = None;
    let mut skip_until = 0;

    for (i, c) in text.char_indices() {
        let at_boundary = prev.is_none_or(char::is_whitespace);
        prev = Some(c);
        if i < skip_until || c != trigger_char || !at_boundary {
            continue;
        }

        let name_start = i + c.len_utf8();
        let name_part = &text[name_start..];
        let candidates: Vec<usize> = word_ends(name_part, max_words)
            .into_iter()
            .filter(|&end| name_part[end..].chars().next().is_none_or(is_trailing_boundary))
            .collect();
        let Some(&shortest) = candidates.first() else {
            continue;
        };

        let chosen = candidates
            .iter()
            .rev()
            .find_map(|&end| resolve(&name_part[..end]).map(|id| (end, Some(id))))
            .unwrap_or((shortest, None));

        let end = name_start + chosen.0;
        tokens.push(MentionToken {
            start: i,
            end,
            resolved: chosen.1,
        });
        skip_until = end;
    }
    tokens
}

/// Replaces matches in every literal segment, leaving generated ones alone.
fn rewrite_literals<'a, F>(segments: Vec<Segment<'a>>, mut split: F) -> Vec<Segment<'a>>
where
    F: FnMut(&'a str) -> Vec<Segment<'a>>,
{
    segments
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Literal(text) => split(text),
            generated => vec![generated],
        })
        .collect()
}

/// Splits `text` around byte ranges, rendering each range with `render`.
fn splice<'a, I, F>(text: &'a str, ranges: I, mut render: F) -> Vec<Segment<'a>>
where
    I: IntoIterator<Item = (usize, usize)>,
    F: FnMut(usize, usize) -> String,
{
    let mut out = Vec::new();
    let mut cursor = 0;
    for (start, end) in ranges {
        if start > cursor {
            out.push(Segment::Literal(&text[cursor..start]));
        }
        out.push(Segment::Generated(render(start, end)));
        cursor = end;
    }
    if cursor < text.len() {
        out.push(Segment::Literal(&text[cursor..]));
    }
    out
}

fn mention_pass<'a, F>(
    segments: Vec<Segment<'a>>,
    trigger: Trigger,
    max_words: usize,
    resolve: F,
    known_markup: fn(&str, &str) -> String,
) -> Vec<Segment<'a>>
where
    F: Fn(&str) -> Option<&'a str>,
{
    rewrite_literals(segments, |text| {
        let tokens = scan_mentions(text, trigger, max_words, &resolve);
        let mut resolved = tokens.iter();
        splice(
            text,
            tokens.iter().map(|t| (t.start, t.end)),
            |start, end| {
                let literal = &text[start..end];
                match resolved.next().and_then(|t| t.resolved) {
                    Some(id) => known_markup(id, literal),
                    None => format!(
                        r#"<span class="mention-unknown">{}</span>"#,
                        escape_html(literal)
                    ),
                }
            },
        )
    })
}

fn member_anchor(uid: &str, literal: &str) -> String {
    format!(
        r#"<a class="mention" data-uid="{}">{}</a>"#,
        escape_html(uid),
        escape_html(literal)
    )
}

fn channel_anchor(channel_id: &str, literal: &str) -> String {
    format!(
        r#"<a class="channel-mention" data-channel-id="{}">{}</a>"#,
        escape_html(channel_id),
        escape_html(literal)
    )
}

fn external_anchor(href: &str, label: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        escape_html(href),
        escape_html(label)
    )
}

/// Lowercased name to identifier.
///
/// When several records share a name (ignoring case) the first one in
/// directory order wins.
fn name_index<'a, T, F>(records: &'a [T], fields: F) -> HashMap<String, &'a str>
where
    F: Fn(&'a T) -> (&'a str, &'a str),
{
    let mut index = HashMap::new();
    for record in records {
        let (name, id) = fields(record);
        index.entry(name.to_lowercase()).or_insert(id);
    }
    index
}

fn member_index(members: &[Member]) -> HashMap<String, &str> {
    name_index(members, |m| (m.name.as_str(), m.uid.as_str()))
}

/// Renders message text into markup.
///
/// Passes run in a fixed order and later passes only see text earlier passes
/// left literal:
///
/// 1. `@name` (one or two words) against member names
/// 2. `#name` (up to three words) against channel names
/// 3. bare `http://` / `https://` URLs
/// 4. bare `www.` links, linked as `https://`
///
/// Name matching is case-insensitive. A mention that names no known record
/// stays visible as a `mention-unknown` span.
///
/// # Example
///
/// ```
/// use murmur_core::mention::linkify;
/// use murmur_core::user::Member;
///
/// let members = vec![Member::new("u-1", "Jordan", "jordan@example.com")];
/// let html = linkify("@Jordan please check #General", &members, &[]);
/// assert!(html.as_str().contains(r#"data-uid="u-1""#));
/// assert!(html.as_str().contains(r#"<span class="mention-unknown">#General</span>"#));
/// ```
pub fn linkify(text: &str, members: &[Member], channels: &[Channel]) -> Markup {
    let members_by_name = member_index(members);
    let channels_by_name = name_index(channels, |c| (c.name.as_str(), c.id.as_str()));

    let segments = vec![Segment::Literal(text)];
    let segments = mention_pass(
        segments,
        Trigger::User,
        USER_MENTION_WORDS,
        |name| members_by_name.get(&name.to_lowercase()).copied(),
        member_anchor,
    );
    let segments = mention_pass(
        segments,
        Trigger::Channel,
        CHANNEL_MENTION_WORDS,
        |name| channels_by_name.get(&name.to_lowercase()).copied(),
        channel_anchor,
    );
    let segments = rewrite_literals(segments, |text| {
        splice(
            text,
            URL_RE.find_iter(text).map(|m| (m.start(), m.end())),
            |start, end| external_anchor(&text[start..end], &text[start..end]),
        )
    });
    let segments = rewrite_literals(segments, |text| {
        let ranges = WWW_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(2))
            .map(|m| (m.start(), m.end()));
        splice(text, ranges, |start, end| {
            let label = &text[start..end];
            external_anchor(&format!("https://{label}"), label)
        })
    });

    let mut html = String::with_capacity(text.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => html.push_str(&escape_html(text)),
            Segment::Generated(markup) => html.push_str(&markup),
        }
    }
    Markup(html)
}

/// Identifiers of the members `text` mentions, in first-mention order.
///
/// Uses the same matching rules as [`linkify`]; unresolved mentions are
/// skipped. Suited to deciding whom to notify.
pub fn mentioned_uids(text: &str, members: &[Member]) -> Vec<String> {
    let members_by_name = member_index(members);
    let resolve = |name: &str| members_by_name.get(&name.to_lowercase()).copied();
    let mut seen = HashSet::new();

    scan_mentions(text, Trigger::User, USER_MENTION_WORDS, &resolve)
        .into_iter()
        .filter_map(|token| token.resolved)
        .filter(|uid| seen.insert(*uid))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<Member> {
        vec![
            Member::new("u-jordan", "Jordan", "jordan@example.com"),
            Member::new("u-ann-lee", "Ann Lee", "ann@example.com"),
        ]
    }

    fn channels() -> Vec<Channel> {
        vec![
            Channel::new("c-gen", "general"),
            Channel::new("c-rel", "release train ops"),
        ]
    }

    #[test]
    fn test_known_member_and_unknown_channel() {
        let html = linkify("@Jordan please check #General", &members(), &[]);
        let html = html.as_str();
        assert!(html.starts_with(r#"<a class="mention" data-uid="u-jordan">@Jordan</a>"#));
        assert!(html.contains(" please check "));
        assert!(html.ends_with(r#"<span class="mention-unknown">#General</span>"#));
    }

    #[test]
    fn test_channel_match_is_case_insensitive() {
        let html = linkify("see #General.", &[], &channels());
        assert_eq!(
            html.as_str(),
            r#"see <a class="channel-mention" data-channel-id="c-gen">#General</a>."#
        );
    }

    #[test]
    fn test_two_word_member_name() {
        let html = linkify("thanks @ann lee!", &members(), &[]);
        assert!(
            html.as_str()
                .contains(r#"<a class="mention" data-uid="u-ann-lee">@ann lee</a>!"#)
        );
    }

    #[test]
    fn test_three_word_channel_name() {
        let html = linkify("#release train ops is live", &[], &channels());
        assert!(
            html.as_str()
                .starts_with(r#"<a class="channel-mention" data-channel-id="c-rel">#release train ops</a>"#)
        );
    }

    #[test]
    fn test_unknown_member_flags_single_word() {
        let html = linkify("@Nobody here", &members(), &[]);
        assert_eq!(
            html.as_str(),
            r#"<span class="mention-unknown">@Nobody</span> here"#
        );
    }

    #[test]
    fn test_mention_requires_leading_boundary() {
        let html = linkify("mail jo@Jordan", &members(), &[]);
        assert_eq!(html.as_str(), "mail jo@Jordan");
    }

    #[test]
    fn test_mention_requires_trailing_boundary() {
        let html = linkify("@Jordan's turn", &members(), &[]);
        assert!(!html.as_str().contains("<a"));
        assert!(!html.as_str().contains("<span"));
    }

    #[test]
    fn test_bare_url() {
        let html = linkify("docs at https://example.com/a?b=1&c=2 now", &[], &[]);
        assert_eq!(
            html.as_str(),
            concat!(
                r#"docs at <a href="https://example.com/a?b=1&amp;c=2" target="_blank" rel="noopener noreferrer">"#,
                r#"https://example.com/a?b=1&amp;c=2</a> now"#
            )
        );
    }

    #[test]
    fn test_www_link_gets_https_href() {
        let html = linkify("go to www.example.com", &[], &[]);
        assert!(html.as_str().contains(r#"href="https://www.example.com""#));
        assert!(html.as_str().contains(">www.example.com</a>"));
    }

    #[test]
    fn test_www_inside_url_is_not_linked_twice() {
        let html = linkify("http://www.example.com", &[], &[]);
        assert_eq!(html.as_str().matches("<a ").count(), 1);
        assert!(!html.as_str().contains("https://www."));
    }

    #[test]
    fn test_hash_in_url_is_not_a_channel() {
        let html = linkify("https://example.com/#general", &[], &channels());
        assert!(!html.as_str().contains("channel-mention"));
    }

    #[test]
    fn test_untrusted_text_is_escaped() {
        let html = linkify(r#"<script>alert("x")</script> @Jordan"#, &members(), &[]);
        assert!(html.as_str().starts_with("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; "));
        assert!(!html.as_str().contains("<script>"));
    }

    #[test]
    fn test_hostile_names_are_escaped_in_attributes() {
        let members = vec![Member::new(r#"u"><img src=x>"#, "Eve", "eve@example.com")];
        let html = linkify("@Eve", &members, &[]);
        assert!(!html.as_str().contains("<img"));
        assert!(html.as_str().contains("&quot;&gt;&lt;img"));
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(linkify("hello world", &[], &[]).as_str(), "hello world");
        assert_eq!(linkify("", &[], &[]).as_str(), "");
    }

    #[test]
    fn test_mentioned_uids_dedupes_and_skips_unknown() {
        let uids = mentioned_uids("@Jordan @ghost and @ann lee, @jordan", &members());
        assert_eq!(uids, vec!["u-jordan".to_string(), "u-ann-lee".to_string()]);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_member() {
        let members = vec![
            Member::new("u-sam-1", "Sam", "sam@example.com"),
            Member::new("u-sam-2", "sam", "sam@corp.io"),
        ];
        let html = linkify("@SAM", &members, &[]);
        assert!(html.as_str().contains(r#"data-uid="u-sam-1""#));
        assert_eq!(mentioned_uids("@sam", &members), vec!["u-sam-1".to_string()]);
    }

    #[test]
    fn test_word_ends() {
        assert_eq!(word_ends("ann lee x", 2), vec![3, 7]);
        assert_eq!(word_ends("ann  lee", 2), vec![3]);
        assert!(word_ends("1ann", 2).is_empty());
    }
}
