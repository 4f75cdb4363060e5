use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns all field names in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hkeys/>
#[derive(Debug, PartialEq)]
pub struct Hkeys {
    pub key: Bytes,
}

impl Executable for Hkeys {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hgetall(&self.key) {
            Ok(pairs) => Frame::Array(
                pairs
                    .into_iter()
                    .map(|(field, _)| Frame::Bulk(field))
                    .collect(),
            ),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hkeys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}
