use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Remove the existing timeout on `key`. Replies with 1 if the timeout was removed, 0 if the key
/// does not exist or has no timeout.
///
/// Ref: <https://redis.io/docs/latest/commands/persist/>
#[derive(Debug, PartialEq)]
pub struct Persist {
    pub key: Bytes,
}

impl Executable for Persist {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let removed = store.lock().persist(&self.key);
        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Persist {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_the_timeout() {
        let store = Store::new();
        store.lock().set(Bytes::from("foo"), Bytes::from("1"));
        store.lock().expire(b"foo", 30);

        let persist = || {
            Persist {
                key: Bytes::from("foo"),
            }
            .exec(store.clone())
            .unwrap()
        };

        assert_eq!(persist(), Frame::Integer(1));
        assert_eq!(persist(), Frame::Integer(0));
        assert_eq!(store.lock().ttl(b"foo"), Some(None));
    }
}
