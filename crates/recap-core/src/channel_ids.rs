//! Parsing of comma-separated channel id lists from configuration.

use crate::message::ChannelId;

/// Parse a comma-separated list of channel ids.
///
/// Each segment is trimmed and empty segments are skipped. A segment counts
/// when it starts with a run of ASCII digits; anything after the run is
/// ignored (`"123 # general"` yields `123`). Segments without leading digits
/// are dropped silently, as are digit runs too large for a [`ChannelId`].
pub fn parse_channel_ids(raw: &str) -> Vec<ChannelId> {
    raw.trim()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let end = part
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(part.len());
            part[..end].parse().ok()
        })
        .collect()
}

/// Compare two channel lists, returning `(added, removed)` in list order.
pub fn diff_channel_ids(
    old: &[ChannelId],
    new: &[ChannelId],
) -> (Vec<ChannelId>, Vec<ChannelId>) {
    let added = new.iter().filter(|id| !old.contains(id)).copied().collect();
    let removed = old.iter().filter(|id| !new.contains(id)).copied().collect();
    (added, removed)
}
