use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Set a timeout on `key`, in seconds. After the timeout has expired, the key will
/// automatically be deleted. A timeout that is not positive deletes the key right away.
///
/// Replies with 1 if the timeout was set and 0 if the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/expire/>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: Bytes,
    pub seconds: i64,
}

impl Executable for Expire {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let updated = store.lock().expire(&self.key, self.seconds);
        Ok(Frame::Integer(updated as i64))
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let seconds = parser.next_integer()?;

        Ok(Self { key, seconds })
    }
}
