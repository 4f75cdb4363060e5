use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Sets the list element at `index` to `element`. An error is returned for out of range
/// indexes and for a missing key.
///
/// Ref: <https://redis.io/docs/latest/commands/lset/>
#[derive(Debug, PartialEq)]
pub struct Lset {
    pub key: Bytes,
    pub index: i64,
    pub element: Bytes,
}

impl Executable for Lset {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().lset(&self.key, self.index, self.element) {
            Ok(()) => Frame::Simple("OK".to_string()),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Lset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let index = parser.next_integer()?;
        let element = parser.next_bytes()?;

        Ok(Self {
            key,
            index,
            element,
        })
    }
}
