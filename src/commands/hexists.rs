use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns if `field` is an existing field in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hexists/>
#[derive(Debug, PartialEq)]
pub struct Hexists {
    pub key: Bytes,
    pub field: Bytes,
}

impl Executable for Hexists {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hexists(&self.key, &self.field) {
            Ok(exists) => Frame::Integer(exists as i64),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hexists {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;

        Ok(Self { key, field })
    }
}
