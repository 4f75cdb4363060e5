use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes the first `count` occurrences of `element` from the list stored at `key`. A positive
/// count removes from head to tail, a negative one from tail to head and zero removes them all.
///
/// Ref: <https://redis.io/docs/latest/commands/lrem/>
#[derive(Debug, PartialEq)]
pub struct Lrem {
    pub key: Bytes,
    pub count: i64,
    pub element: Bytes,
}

impl Executable for Lrem {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().lrem(&self.key, self.count, &self.element) {
            Ok(removed) => Frame::Integer(removed as i64),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Lrem {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let count = parser.next_integer()?;
        let element = parser.next_bytes()?;

        Ok(Self {
            key,
            count,
            element,
        })
    }
}
