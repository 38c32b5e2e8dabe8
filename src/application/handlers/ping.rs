//! `GET /ping` - liveness probe returning the current epoch milliseconds.

use async_trait::async_trait;

use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone, Copy, Default)]
pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(&self, _request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        Ok(HandlerResult::number(Timestamp::now().epoch_millis()))
    }
}
