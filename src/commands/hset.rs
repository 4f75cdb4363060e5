use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Sets the specified fields to their respective values in the hash stored at `key`, creating
/// the hash when it does not exist. Replies with the number of fields that were added.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

/// Same as HSET, replying with `OK` instead of the number of new fields.
///
/// Ref: <https://redis.io/docs/latest/commands/hmset/>
#[derive(Debug, PartialEq)]
pub struct Hmset {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

fn parse_pairs(
    parser: &mut CommandParser,
) -> Result<(Bytes, Vec<(Bytes, Bytes)>), CommandParserError> {
    let key = parser.next_bytes()?;

    let mut pairs = vec![(parser.next_bytes()?, parser.next_bytes()?)];
    while parser.has_next() {
        // A field without a value runs out of arguments.
        pairs.push((parser.next_bytes()?, parser.next_bytes()?));
    }

    Ok((key, pairs))
}

impl Executable for Hset {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hset(self.key, self.pairs) {
            Ok(added) => Frame::Integer(added as i64),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let (key, pairs) = parse_pairs(parser)?;
        Ok(Self { key, pairs })
    }
}

impl Executable for Hmset {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.lock().hset(self.key, self.pairs) {
            Ok(_) => Frame::Simple("OK".to_string()),
            Err(err) => err.into(),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hmset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let (key, pairs) = parse_pairs(parser)?;
        Ok(Self { key, pairs })
    }
}
