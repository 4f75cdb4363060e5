use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Side, Store};
use crate::Error;

/// LPOP and RPOP. Removes and returns the first (LPOP) or last (RPOP) element of the list stored
/// at `key`. Popping the last element deletes the key.
///
/// Ref: <https://redis.io/docs/latest/commands/lpop/>
#[derive(Debug, PartialEq)]
pub struct Pop {
    pub side: Side,
    pub key: Bytes,
}

impl Pop {
    pub(crate) fn parse(
        parser: &mut CommandParser,
        side: Side,
    ) -> Result<Self, CommandParserError> {
        let key = parser.next_bytes()?;
        Ok(Self { side, key })
    }
}

impl Executable for Pop {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().pop(&self.key, self.side) {
            Ok(Some(value)) => Frame::Bulk(value),
            Ok(None) => Frame::Null,
            Err(err) => err.into(),
        };

        Ok(res)
    }
}
