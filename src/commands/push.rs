use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Side, Store};
use crate::Error;

/// LPUSH and RPUSH. Insert all the specified values at the head (LPUSH) or tail (RPUSH) of the
/// list stored at `key`, creating it when needed. Values are pushed one after the other, so
/// `LPUSH mylist a b c` results in a list starting with `c`.
///
/// Replies with the length of the list after the push.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct Push {
    pub side: Side,
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl Push {
    pub(crate) fn parse(
        parser: &mut CommandParser,
        side: Side,
    ) -> Result<Self, CommandParserError> {
        let key = parser.next_bytes()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { side, key, values })
    }
}

impl Executable for Push {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().push(self.key, self.values, self.side) {
            Ok(len) => Frame::Integer(len as i64),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}
