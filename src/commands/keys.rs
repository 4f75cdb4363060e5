use bytes::Bytes;
use glob_match::glob_match;
use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns all live keys matching `pattern`, in every namespace. Without a pattern every key is
/// returned. Keys are sorted.
///
/// Ref: <https://redis.io/docs/latest/commands/keys/>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: Option<Bytes>,
}

impl Executable for Keys {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let keys = store.lock().keys();

        let pattern = self
            .pattern
            .filter(|pattern| &pattern[..] != b"*")
            .map(|pattern| String::from_utf8_lossy(&pattern).into_owned());

        let res = keys
            .into_iter()
            .filter(|key| match &pattern {
                Some(pattern) => glob_match(pattern, &String::from_utf8_lossy(key)),
                None => true,
            })
            .sorted()
            .map(Frame::Bulk)
            .collect();

        Ok(Frame::Array(res))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = match parser.next_bytes() {
            Ok(pattern) => Some(pattern),
            Err(CommandParserError::EndOfStream) => None,
            Err(err) => return Err(err),
        };

        Ok(Self { pattern })
    }
}
