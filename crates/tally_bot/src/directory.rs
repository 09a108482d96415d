//! Channel liveness checks over the Discord HTTP API.

use async_trait::async_trait;
use serenity::http::{Http, HttpError};
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tally_core::ChannelDirectory;
use tally_error::{DiscordError, DiscordErrorKind, TallyResult};

/// `ChannelDirectory` backed by Serenity's HTTP client.
///
/// Used by startup reconciliation to decide which persisted counting
/// channels are still backed by a live Discord channel.
pub struct HttpChannelDirectory {
    http: Arc<Http>,
}

impl HttpChannelDirectory {
    /// Create a directory sharing the bot's HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChannelDirectory for HttpChannelDirectory {
    async fn channel_exists(&self, channel_id: i64) -> TallyResult<bool> {
        match self.http.get_channel(ChannelId::new(channel_id as u64)).await {
            Ok(_) => Ok(true),
            // A channel the bot can no longer see is gone for counting
            // purposes.
            Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)))
                if matches!(resp.status_code.as_u16(), 403 | 404) =>
            {
                Ok(false)
            }
            Err(e) => Err(DiscordError::new(DiscordErrorKind::Api(e.to_string())).into()),
        }
    }
}
