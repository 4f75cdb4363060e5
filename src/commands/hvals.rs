use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns all values in the hash stored at `key`, ordered by field name.
///
/// Ref: <https://redis.io/docs/latest/commands/hvals/>
#[derive(Debug, PartialEq)]
pub struct Hvals {
    pub key: Bytes,
}

impl Executable for Hvals {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hgetall(&self.key) {
            Ok(pairs) => Frame::Array(
                pairs
                    .into_iter()
                    .map(|(_, value)| Frame::Bulk(value))
                    .collect(),
            ),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hvals {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
