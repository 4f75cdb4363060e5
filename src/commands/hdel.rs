use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes the specified fields from the hash stored at `key`, ignoring fields that do not
/// exist. The key is deleted once the hash is empty.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

impl Executable for Hdel {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hdel(&self.key, &self.fields) {
            Ok(removed) => Frame::Integer(removed as i64),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let fields = parser.remaining_bytes()?;

        Ok(Self { key, fields })
    }
}
