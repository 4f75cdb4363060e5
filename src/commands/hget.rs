use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the value associated with `field` in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hget/>
#[derive(Debug, PartialEq)]
pub struct Hget {
    pub key: Bytes,
    pub field: Bytes,
}

impl Executable for Hget {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hget(&self.key, &self.field) {
            Ok(Some(value)) => Frame::Bulk(value),
            Ok(None) => Frame::Null,
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;

        Ok(Self { key, field })
    }
}
