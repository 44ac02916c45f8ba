//! REST calls: channels, history pages, and message create/edit/delete.

use super::types::{DcChannel, DcError, DcMessage};
use super::{parse_snowflake, snowflake_from_time, DiscordChannel};
use recap_core::{
    error::RecapError,
    message::{ChannelRef, CollectedMessage, GuildChannel, HistoryQuery, PostedMessage},
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

/// Hard limit on message length imposed by Discord.
pub(crate) const DISCORD_MSG_LIMIT: usize = 2000;

/// Largest page Discord returns for a history request.
const PAGE_SIZE: usize = 100;

/// Discord JSON error code for "Unknown Channel".
const UNKNOWN_CHANNEL: i64 = 10003;

impl DiscordChannel {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("Authorization", self.auth_header())
            .header(
                "User-Agent",
                concat!("DiscordBot (recap, ", env!("CARGO_PKG_VERSION"), ")"),
            )
    }

    /// Turn a non-2xx response into a [`RecapError`].
    async fn check(resp: Response, what: &str) -> Result<Response, RecapError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<DcError> = serde_json::from_str(&body).ok();
        let code = parsed.as_ref().map(|e| e.code);
        let retry_after = parsed.as_ref().and_then(|e| e.retry_after);
        let detail = parsed
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                "discord {what} rate limited, retry after {}s",
                retry_after.unwrap_or_default()
            );
        }
        if status == StatusCode::NOT_FOUND || code == Some(UNKNOWN_CHANNEL) {
            return Err(RecapError::Lookup(format!("discord {what}: {detail}")));
        }
        Err(RecapError::Platform(format!(
            "discord {what} failed ({status}): {detail}"
        )))
    }

    /// All channels of a guild, sorted by their sidebar position.
    pub(crate) async fn fetch_guild_channels(
        &self,
        guild_id: u64,
    ) -> Result<Vec<GuildChannel>, RecapError> {
        let resp = self
            .request(Method::GET, &format!("/guilds/{guild_id}/channels"))
            .send()
            .await
            .map_err(|e| RecapError::Platform(format!("discord get channels failed: {e}")))?;
        let mut channels: Vec<DcChannel> = Self::check(resp, "get channels")
            .await?
            .json()
            .await
            .map_err(|e| RecapError::Platform(format!("discord channels parse failed: {e}")))?;

        channels.sort_by_key(|c| c.position);
        Ok(channels
            .into_iter()
            .filter_map(|c| {
                let id = parse_snowflake(&c.id)?;
                let kind = c.channel_kind();
                Some(GuildChannel {
                    channel: ChannelRef {
                        id,
                        name: c.name.unwrap_or_default(),
                    },
                    kind,
                })
            })
            .collect())
    }

    /// One page of messages around a cursor, returned oldest first.
    async fn fetch_page(
        &self,
        channel_id: u64,
        cursor: Cursor,
        limit: usize,
    ) -> Result<Vec<DcMessage>, RecapError> {
        let limit = limit.clamp(1, PAGE_SIZE);
        let query = match cursor {
            Cursor::After(id) => format!("after={id}&limit={limit}"),
            Cursor::Before(id) => format!("before={id}&limit={limit}"),
        };
        let resp = self
            .request(
                Method::GET,
                &format!("/channels/{channel_id}/messages?{query}"),
            )
            .send()
            .await
            .map_err(|e| RecapError::Platform(format!("discord get messages failed: {e}")))?;
        let mut page: Vec<DcMessage> = Self::check(resp, "get messages")
            .await?
            .json()
            .await
            .map_err(|e| RecapError::Platform(format!("discord messages parse failed: {e}")))?;

        page.sort_by_key(|m| parse_snowflake(&m.id).unwrap_or_default());
        Ok(page)
    }

    /// Page through a channel's history between `query.after` and `query.before`.
    ///
    /// At most `query.limit` messages are returned; automated authors are
    /// included so the caller can count them against the limit.
    pub(crate) async fn fetch_history(
        &self,
        channel: &ChannelRef,
        query: &HistoryQuery,
    ) -> Result<Vec<CollectedMessage>, RecapError> {
        let mut out = Vec::new();
        let mut cursor = if query.oldest_first {
            Cursor::After(snowflake_from_time(query.after).saturating_sub(1))
        } else {
            Cursor::Before(
                snowflake_from_time(query.before + chrono::Duration::milliseconds(1)),
            )
        };

        while out.len() < query.limit {
            let wanted = (query.limit - out.len()).min(PAGE_SIZE);
            let mut page = self.fetch_page(channel.id, cursor, wanted).await?;
            let page_len = page.len();
            if !query.oldest_first {
                page.reverse();
            }

            let mut reached_end = false;
            for msg in page {
                let Some(id) = parse_snowflake(&msg.id) else {
                    continue;
                };
                cursor = if query.oldest_first {
                    Cursor::After(id)
                } else {
                    Cursor::Before(id)
                };
                let past_bound = if query.oldest_first {
                    msg.timestamp > query.before
                } else {
                    msg.timestamp < query.after
                };
                if past_bound {
                    reached_end = true;
                    break;
                }
                let skip = if query.oldest_first {
                    msg.timestamp < query.after
                } else {
                    msg.timestamp > query.before
                };
                if skip {
                    continue;
                }
                out.push(self.collected(channel, id, msg));
                if out.len() >= query.limit {
                    break;
                }
            }

            if reached_end || page_len < wanted {
                break;
            }
        }

        debug!(
            "discord history #{}: {} messages (limit {})",
            channel.name,
            out.len(),
            query.limit
        );
        Ok(out)
    }

    fn collected(&self, channel: &ChannelRef, id: u64, msg: DcMessage) -> CollectedMessage {
        CollectedMessage {
            id,
            channel: channel.clone(),
            author_is_bot: msg.is_automated(),
            permalink: self.permalink(channel.id, id),
            content: msg.content,
            timestamp: msg.timestamp,
        }
    }

    /// Post text, splitting at line breaks when it exceeds Discord's limit.
    /// Returns the handle of the first posted part.
    pub(crate) async fn post_message(
        &self,
        channel_id: u64,
        text: &str,
    ) -> Result<PostedMessage, RecapError> {
        let mut first = None;
        for chunk in split_message(text, DISCORD_MSG_LIMIT) {
            let resp = self
                .request(Method::POST, &format!("/channels/{channel_id}/messages"))
                .json(&serde_json::json!({
                    "content": chunk,
                    "allowed_mentions": { "parse": ["roles", "users"] },
                }))
                .send()
                .await
                .map_err(|e| RecapError::Platform(format!("discord send failed: {e}")))?;
            let posted: DcMessage = Self::check(resp, "send")
                .await?
                .json()
                .await
                .map_err(|e| RecapError::Platform(format!("discord send parse failed: {e}")))?;
            if first.is_none() {
                first = parse_snowflake(&posted.id).map(|message_id| PostedMessage {
                    channel_id,
                    message_id,
                });
            }
        }
        first.ok_or_else(|| RecapError::Platform("discord send returned no message id".into()))
    }

    pub(crate) async fn patch_message(
        &self,
        message: &PostedMessage,
        text: &str,
    ) -> Result<(), RecapError> {
        let text = truncate_chars(text, DISCORD_MSG_LIMIT);
        let resp = self
            .request(
                Method::PATCH,
                &format!(
                    "/channels/{}/messages/{}",
                    message.channel_id, message.message_id
                ),
            )
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await
            .map_err(|e| RecapError::Platform(format!("discord edit failed: {e}")))?;
        Self::check(resp, "edit").await?;
        Ok(())
    }

    pub(crate) async fn delete_message(&self, message: &PostedMessage) -> Result<(), RecapError> {
        let resp = self
            .request(
                Method::DELETE,
                &format!(
                    "/channels/{}/messages/{}",
                    message.channel_id, message.message_id
                ),
            )
            .send()
            .await
            .map_err(|e| RecapError::Platform(format!("discord delete failed: {e}")))?;
        Self::check(resp, "delete").await?;
        Ok(())
    }
}

/// Where a history page starts.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    After(u64),
    Before(u64),
}

/// Keep at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// line breaks as split points.
pub(crate) fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    if text.chars().count() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let head = truncate_chars(rest, max_chars);
        let break_at = if head.len() < rest.len() {
            head.rfind('\n').map(|i| i + 1).unwrap_or(head.len())
        } else {
            head.len()
        };
        chunks.push(&rest[..break_at]);
        rest = &rest[break_at..];
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use recap_core::config::DiscordConfig;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, Request, Respond, ResponseTemplate,
    };

    /// Serves `/channels/{id}/messages` pages from a fixed, one-per-second history.
    struct ChannelHistory {
        start: DateTime<Utc>,
        count: i64,
    }

    impl ChannelHistory {
        fn messages(&self) -> Vec<(u64, DateTime<Utc>)> {
            (0..self.count)
                .map(|i| {
                    let at = self.start + Duration::seconds(i);
                    (snowflake_from_time(at) + 7, at)
                })
                .collect()
        }
    }

    impl Respond for ChannelHistory {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let mut after = None;
            let mut before = None;
            let mut limit = 50;
            for (key, value) in request.url.query_pairs() {
                match key.as_ref() {
                    "after" => after = value.parse::<u64>().ok(),
                    "before" => before = value.parse::<u64>().ok(),
                    "limit" => limit = value.parse::<usize>().unwrap(),
                    _ => {}
                }
            }
            assert!(limit <= 100, "page limit {limit} above Discord's maximum");

            let all = self.messages();
            let page: Vec<_> = match (after, before) {
                (Some(after), _) => all
                    .into_iter()
                    .filter(|(id, _)| *id > after)
                    .take(limit)
                    .collect(),
                (None, Some(before)) => {
                    let older: Vec<_> = all.into_iter().filter(|(id, _)| *id < before).collect();
                    let skip = older.len().saturating_sub(limit);
                    older.into_iter().skip(skip).collect()
                }
                (None, None) => unreachable!("history is always requested with a cursor"),
            };
            // Discord returns newest first.
            let body: Vec<_> = page
                .iter()
                .rev()
                .map(|(id, at)| {
                    serde_json::json!({
                        "id": id.to_string(),
                        "author": {"id": "5", "username": "alice"},
                        "content": format!("at {}", at.format("%H:%M:%S")),
                        "timestamp": at.to_rfc3339(),
                    })
                })
                .collect();
            ResponseTemplate::new(200).set_body_json(body)
        }
    }

    async fn channel_with_history(start: DateTime<Utc>, count: i64) -> (MockServer, DiscordChannel) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/10/messages"))
            .respond_with(ChannelHistory { start, count })
            .mount(&server)
            .await;
        let config = DiscordConfig {
            guild_id: 1,
            ..DiscordConfig::default()
        };
        let channel = DiscordChannel::with_base_url(config, &server.uri());
        (server, channel)
    }

    fn general() -> ChannelRef {
        ChannelRef {
            id: 10,
            name: "general".into(),
        }
    }

    fn window_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 22, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_history_pages_through_the_whole_window() {
        let start = window_start();
        let (_server, channel) = channel_with_history(start, 250).await;
        let query = HistoryQuery {
            after: start,
            before: start + Duration::seconds(199),
            oldest_first: true,
            limit: 500,
        };

        let messages = channel.fetch_history(&general(), &query).await.unwrap();
        assert_eq!(messages.len(), 200);
        assert_eq!(messages[0].timestamp, start);
        assert_eq!(messages[0].content, "at 22:00:00");
        assert_eq!(messages[199].timestamp, start + Duration::seconds(199));
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(
            messages[0].permalink,
            format!("https://discord.com/channels/1/10/{}", messages[0].id)
        );
    }

    #[tokio::test]
    async fn test_history_stops_at_limit_oldest_first() {
        let start = window_start();
        let (_server, channel) = channel_with_history(start, 250).await;
        let query = HistoryQuery {
            after: start,
            before: start + Duration::seconds(249),
            oldest_first: true,
            limit: 120,
        };

        let messages = channel.fetch_history(&general(), &query).await.unwrap();
        assert_eq!(messages.len(), 120);
        assert_eq!(messages[0].timestamp, start);
        assert_eq!(messages[119].timestamp, start + Duration::seconds(119));
        assert!(messages.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[tokio::test]
    async fn test_history_newest_first_from_window_end() {
        let start = window_start();
        let (_server, channel) = channel_with_history(start, 250).await;
        let query = HistoryQuery {
            after: start + Duration::seconds(10),
            before: start + Duration::seconds(199),
            oldest_first: false,
            limit: 150,
        };

        let messages = channel.fetch_history(&general(), &query).await.unwrap();
        assert_eq!(messages.len(), 150);
        assert_eq!(messages[0].timestamp, start + Duration::seconds(199));
        assert_eq!(messages[149].timestamp, start + Duration::seconds(50));
        assert!(messages.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn test_history_newest_first_stops_at_window_start() {
        let start = window_start();
        let (_server, channel) = channel_with_history(start, 250).await;
        let query = HistoryQuery {
            after: start + Duration::seconds(10),
            before: start + Duration::seconds(199),
            oldest_first: false,
            limit: 500,
        };

        let messages = channel.fetch_history(&general(), &query).await.unwrap();
        assert_eq!(messages.len(), 190);
        assert_eq!(messages[189].timestamp, start + Duration::seconds(10));
    }

    #[tokio::test]
    async fn test_history_unknown_channel_is_lookup_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/10/messages"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"message": "Unknown Channel", "code": 10003}"#),
            )
            .mount(&server)
            .await;
        let channel = DiscordChannel::with_base_url(DiscordConfig::default(), &server.uri());
        let query = HistoryQuery {
            after: window_start(),
            before: window_start() + Duration::hours(24),
            oldest_first: true,
            limit: 10,
        };

        let err = channel.fetch_history(&general(), &query).await.unwrap_err();
        assert!(matches!(err, RecapError::Lookup(_)), "{err}");
    }

    #[test]
    fn test_split_short_message() {
        let chunks = split_message("hello", DISCORD_MSG_LIMIT);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_split_long_message_on_newlines() {
        let text = "a\n".repeat(1500);
        let chunks = split_message(&text, DISCORD_MSG_LIMIT);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= DISCORD_MSG_LIMIT);
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_multibyte_without_newlines() {
        let text = "я".repeat(4500);
        let chunks = split_message(&text, DISCORD_MSG_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 2000);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
