//! Digest formatting: grouping, channel ordering, previews, and packing
//! sections into chat-sized payloads.

use recap_core::message::{ChannelId, CollectedMessage};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Payload size (characters) before the role tag is appended.
pub const MAX_PAYLOAD_CHARS: usize = 1900;

/// Longest preview kept from a message's first line.
pub const PREVIEW_CHARS: usize = 100;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}\s*").expect("valid heading regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));

/// Presentation inputs for one digest.
#[derive(Debug, Clone)]
pub struct DigestLayout<'a> {
    /// First line of the first payload.
    pub title: String,
    /// Priority channel order; listed channels come first in this order.
    pub priority: &'a [ChannelId],
    /// Mention appended to the last payload, e.g. `<@&123>`.
    pub role_tag: String,
    /// Preview used when a message has no text on its first line.
    pub no_title: &'a str,
}

/// Messages of one channel within a run.
#[derive(Debug)]
pub struct ChannelBucket<'a> {
    pub name: &'a str,
    /// Id of the first message seen for this name.
    pub channel_id: ChannelId,
    pub messages: Vec<&'a CollectedMessage>,
}

/// A rendered channel section: header line plus one entry per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: String,
    pub entries: Vec<String>,
}

impl Section {
    pub fn text(&self) -> String {
        let mut out = self.header.clone();
        for entry in &self.entries {
            out.push_str(entry);
        }
        out
    }
}

/// Group messages by channel name, keeping first-seen order.
pub fn group_by_channel(messages: &[CollectedMessage]) -> Vec<ChannelBucket<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<ChannelBucket<'_>> = Vec::new();
    for msg in messages {
        let name = msg.channel.name.as_str();
        match index.get(name) {
            Some(&i) => buckets[i].messages.push(msg),
            None => {
                index.insert(name, buckets.len());
                buckets.push(ChannelBucket {
                    name,
                    channel_id: msg.channel.id,
                    messages: vec![msg],
                });
            }
        }
    }
    buckets
}

/// Listed channels first in list order, then the rest by volume (stable).
pub fn order_buckets<'a>(
    buckets: Vec<ChannelBucket<'a>>,
    priority: &[ChannelId],
) -> Vec<ChannelBucket<'a>> {
    let position: HashMap<ChannelId, usize> = priority
        .iter()
        .enumerate()
        .rev()
        .map(|(i, id)| (*id, i))
        .collect();

    let (mut ranked, mut unranked): (Vec<_>, Vec<_>) = buckets
        .into_iter()
        .partition(|b| position.contains_key(&b.channel_id));

    ranked.sort_by_key(|b| position.get(&b.channel_id).copied().unwrap_or(usize::MAX));
    unranked.sort_by(|a, b| b.messages.len().cmp(&a.messages.len()));

    ranked.extend(unranked);
    ranked
}

/// Strip a channel name down to letters, digits, whitespace, and `-`, then
/// capitalize it (first character upper, rest lower).
pub fn sanitize_channel_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, 'а'..='я' | 'А'..='Я' | '-')
                || c.is_whitespace()
        })
        .collect();

    let mut chars = kept.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One-line preview of a message: first line, heading marker and bold
/// markers removed, cut at [`PREVIEW_CHARS`] characters.
pub fn preview(content: &str, no_title: &str) -> String {
    let first_line = content.split('\n').next().unwrap_or_default();
    let text = HEADING.replace(first_line, "");
    let text = BOLD.replace_all(&text, "$1");

    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if out.is_empty() {
        return no_title.to_string();
    }
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

pub fn render_section(bucket: &ChannelBucket<'_>, no_title: &str) -> Section {
    Section {
        header: format!("\n**__{}__**\n", sanitize_channel_name(bucket.name)),
        entries: bucket
            .messages
            .iter()
            .map(|m| format!("{}\n{}\n", preview(&m.content, no_title), m.permalink))
            .collect(),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Pack sections into payloads of at most [`MAX_PAYLOAD_CHARS`] characters.
///
/// The first payload starts with `title`; continuation payloads carry no
/// title. A section that does not fit in the current payload starts a new
/// one; a section too large for any payload is split between entries.
/// The role tag goes on a line of its own at the end of the last payload.
pub fn pack(title: &str, sections: &[Section], role_tag: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    let mut buffer = format!("{title}\n");

    for section in sections {
        let text = section.text();
        if char_len(&buffer) + char_len(&text) <= MAX_PAYLOAD_CHARS {
            buffer.push_str(&text);
            continue;
        }

        if !buffer.is_empty() {
            payloads.push(std::mem::take(&mut buffer));
        }

        if char_len(&text) <= MAX_PAYLOAD_CHARS {
            buffer = text;
            continue;
        }

        let mut piece = section.header.clone();
        let mut piece_has_entry = false;
        for entry in &section.entries {
            if piece_has_entry && char_len(&piece) + char_len(entry) > MAX_PAYLOAD_CHARS {
                payloads.push(std::mem::take(&mut piece));
            }
            piece.push_str(entry);
            piece_has_entry = true;
        }
        buffer = piece;
    }

    if !buffer.is_empty() {
        buffer.push('\n');
        buffer.push_str(role_tag);
        payloads.push(buffer);
    }
    payloads
}

/// Build the full digest. No messages → no payloads.
pub fn format_digest(messages: &[CollectedMessage], layout: &DigestLayout<'_>) -> Vec<String> {
    if messages.is_empty() {
        return Vec::new();
    }
    let buckets = order_buckets(group_by_channel(messages), layout.priority);
    let sections: Vec<Section> = buckets
        .iter()
        .map(|b| render_section(b, layout.no_title))
        .collect();
    pack(&layout.title, &sections, &layout.role_tag)
}
