use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Store, StoreError};
use crate::Error;

/// Renames `key` to `newkey`, carrying its time to live along. If `newkey` already exists it is
/// overwritten. Returns an error when `key` does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/rename/>
#[derive(Debug, PartialEq)]
pub struct Rename {
    pub key: Bytes,
    pub new_key: Bytes,
}

impl Executable for Rename {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = if store.lock().rename(&self.key, self.new_key) {
            Frame::Simple("OK".to_string())
        } else {
            StoreError::NoSuchKey.into()
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Rename {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let new_key = parser.next_bytes()?;

        Ok(Self { key, new_key })
    }
}
