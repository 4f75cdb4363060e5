use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Like TTL this command returns the remaining time to live of a key that has an expire set, with
/// the sole difference that TTL returns the amount of remaining time in seconds while PTTL returns
/// it in milliseconds.
///
/// Ref: <https://redis.io/docs/latest/commands/pttl/>
#[derive(Debug, PartialEq)]
pub struct Pttl {
    pub key: Bytes,
}

impl Executable for Pttl {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let ttl = match store.lock().ttl(&self.key) {
            Some(Some(ttl)) => ttl.as_millis() as i64,
            Some(None) => -1,
            None => -2,
        };

        Ok(Frame::Integer(ttl))
    }
}

impl TryFrom<&mut CommandParser> for Pttl {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
