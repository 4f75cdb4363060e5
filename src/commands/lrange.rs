use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the elements of the list stored at `key` between `start` and `stop`, both inclusive.
/// Negative offsets count from the tail. LGET is the same command over the whole list.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: Bytes,
    pub start: i64,
    pub stop: i64,
}

impl Lrange {
    pub(crate) fn whole_list(parser: &mut CommandParser) -> Result<Self, CommandParserError> {
        let key = parser.next_bytes()?;

        Ok(Self {
            key,
            start: 0,
            stop: -1,
        })
    }
}

impl Executable for Lrange {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().lrange(&self.key, self.start, self.stop) {
            Ok(values) => Frame::Array(values.into_iter().map(Frame::Bulk).collect()),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;

        if !parser.has_next() {
            return Ok(Self {
                key,
                start: 0,
                stop: -1,
            });
        }

        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}
