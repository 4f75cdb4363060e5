use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Connection metadata sent by client libraries during their handshake. Names and library info
/// are acknowledged but not recorded, so only the subcommand is parsed.
///
/// Ref: <https://redis.io/docs/latest/commands/client-setinfo/>
#[derive(Debug, PartialEq)]
pub struct Client {
    pub subcommand: String,
}

impl Executable for Client {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        let res = match self.subcommand.as_str() {
            "setinfo" | "setname" => Frame::Simple("OK".to_string()),
            "getname" => Frame::Null,
            _ => Frame::Error(format!(
                "ERR unknown subcommand '{}'. Try CLIENT HELP.",
                self.subcommand
            )),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Client {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let subcommand = parser.next_bytes()?;
        let subcommand = String::from_utf8_lossy(&subcommand).to_lowercase();

        Ok(Self { subcommand })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use crate::commands::Command;

    #[tokio::test]
    async fn setinfo() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("CLIENT")),
            Frame::Bulk(Bytes::from("SETINFO")),
            Frame::Bulk(Bytes::from("LIB-NAME")),
            Frame::Bulk(Bytes::from("redis-rs")),
        ]);
        let cmd = Command::try_from(frame).unwrap();
        assert_eq!(
            cmd,
            Command::Client(Client {
                subcommand: "setinfo".to_string()
            })
        );

        assert_eq!(
            cmd.exec(Store::new()).unwrap(),
            Frame::Simple("OK".to_string())
        );
    }
}
