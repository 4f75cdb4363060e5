pub mod client;
pub mod dbsize;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod flushall;
pub mod get;
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hkeys;
pub mod hlen;
pub mod hset;
pub mod hvals;
pub mod keys;
pub mod lindex;
pub mod llen;
pub mod lrange;
pub mod lrem;
pub mod lset;
pub mod persist;
pub mod ping;
pub mod pop;
pub mod pttl;
pub mod push;
pub mod rename;
pub mod set;
pub mod ttl;
pub mod type_;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::{Side, Store, StoreError};
use crate::Error;

use client::Client;
use dbsize::DBSize;
use del::Del;
use echo::Echo;
use exists::Exists;
use expire::Expire;
use flushall::FlushAll;
use get::Get;
use hdel::Hdel;
use hexists::Hexists;
use hget::Hget;
use hgetall::Hgetall;
use hkeys::Hkeys;
use hlen::Hlen;
use hset::{Hmset, Hset};
use hvals::Hvals;
use keys::Keys;
use lindex::Lindex;
use llen::Llen;
use lrange::Lrange;
use lrem::Lrem;
use lset::Lset;
use persist::Persist;
use ping::Ping;
use pop::Pop;
use pttl::Pttl;
use push::Push;
use rename::Rename;
use set::Set;
use ttl::Ttl;
use type_::Type;

#[derive(Debug, PartialEq)]
pub enum Command {
    Client(Client),
    DBSize(DBSize),
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    FlushAll(FlushAll),
    Get(Get),
    Keys(Keys),
    Persist(Persist),
    Pttl(Pttl),
    Rename(Rename),
    Set(Set),
    Ttl(Ttl),
    Type(Type),
    Unlink(Del),

    Lindex(Lindex),
    Llen(Llen),
    Lpop(Pop),
    Lpush(Push),
    Lrange(Lrange),
    Lrem(Lrem),
    Lset(Lset),
    Rpop(Pop),
    Rpush(Push),

    Hdel(Hdel),
    Hexists(Hexists),
    Hget(Hget),
    Hgetall(Hgetall),
    Hkeys(Hkeys),
    Hlen(Hlen),
    Hmset(Hmset),
    Hset(Hset),
    Hvals(Hvals),

    Echo(Echo),
    Ping(Ping),
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::Client(cmd) => cmd.exec(store),
            Command::DBSize(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Expire(cmd) => cmd.exec(store),
            Command::FlushAll(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Hdel(cmd) => cmd.exec(store),
            Command::Hexists(cmd) => cmd.exec(store),
            Command::Hget(cmd) => cmd.exec(store),
            Command::Hgetall(cmd) => cmd.exec(store),
            Command::Hkeys(cmd) => cmd.exec(store),
            Command::Hlen(cmd) => cmd.exec(store),
            Command::Hmset(cmd) => cmd.exec(store),
            Command::Hset(cmd) => cmd.exec(store),
            Command::Hvals(cmd) => cmd.exec(store),
            Command::Keys(cmd) => cmd.exec(store),
            Command::Lindex(cmd) => cmd.exec(store),
            Command::Llen(cmd) => cmd.exec(store),
            Command::Lpop(cmd) => cmd.exec(store),
            Command::Lpush(cmd) => cmd.exec(store),
            Command::Lrange(cmd) => cmd.exec(store),
            Command::Lrem(cmd) => cmd.exec(store),
            Command::Lset(cmd) => cmd.exec(store),
            Command::Persist(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Pttl(cmd) => cmd.exec(store),
            Command::Rename(cmd) => cmd.exec(store),
            Command::Rpop(cmd) => cmd.exec(store),
            Command::Rpush(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::Ttl(cmd) => cmd.exec(store),
            Command::Type(cmd) => cmd.exec(store),
            Command::Unlink(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let parser = &mut CommandParser {
            command: String::new(),
            parts: frames.into_iter(),
        };

        let command_name = match parser.parse_command_name() {
            Ok(name) => name,
            Err(CommandParserError::EndOfStream) => return Err(CommandParserError::EmptyCommand),
            Err(err) => return Err(err),
        };

        let command = match &command_name[..] {
            "client" => Client::try_from(parser).map(Command::Client),
            "dbsize" => DBSize::try_from(parser).map(Command::DBSize),
            "del" => Del::try_from(parser).map(Command::Del),
            "echo" => Echo::try_from(parser).map(Command::Echo),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "expire" => Expire::try_from(parser).map(Command::Expire),
            "flushall" => FlushAll::try_from(parser).map(Command::FlushAll),
            "get" => Get::try_from(parser).map(Command::Get),
            "hdel" => Hdel::try_from(parser).map(Command::Hdel),
            "hexists" => Hexists::try_from(parser).map(Command::Hexists),
            "hget" => Hget::try_from(parser).map(Command::Hget),
            "hgetall" => Hgetall::try_from(parser).map(Command::Hgetall),
            "hkeys" => Hkeys::try_from(parser).map(Command::Hkeys),
            "hlen" => Hlen::try_from(parser).map(Command::Hlen),
            "hmset" => Hmset::try_from(parser).map(Command::Hmset),
            "hset" => Hset::try_from(parser).map(Command::Hset),
            "hvals" => Hvals::try_from(parser).map(Command::Hvals),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "lget" => Lrange::whole_list(parser).map(Command::Lrange),
            "lindex" => Lindex::try_from(parser).map(Command::Lindex),
            "llen" => Llen::try_from(parser).map(Command::Llen),
            "lpop" => Pop::parse(parser, Side::Left).map(Command::Lpop),
            "lpush" => Push::parse(parser, Side::Left).map(Command::Lpush),
            "lrange" => Lrange::try_from(parser).map(Command::Lrange),
            "lrem" => Lrem::try_from(parser).map(Command::Lrem),
            "lset" => Lset::try_from(parser).map(Command::Lset),
            "persist" => Persist::try_from(parser).map(Command::Persist),
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "pttl" => Pttl::try_from(parser).map(Command::Pttl),
            "rename" => Rename::try_from(parser).map(Command::Rename),
            "rpop" => Pop::parse(parser, Side::Right).map(Command::Rpop),
            "rpush" => Push::parse(parser, Side::Right).map(Command::Rpush),
            "set" => Set::try_from(parser).map(Command::Set),
            "ttl" => Ttl::try_from(parser).map(Command::Ttl),
            "type" => Type::try_from(parser).map(Command::Type),
            "unlink" => Del::try_from(parser).map(Command::Unlink),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name.clone(),
            }),
        };

        // Running out of arguments while parsing means the client sent too few of them.
        command.map_err(|err| match err {
            CommandParserError::EndOfStream => CommandParserError::WrongNumberOfArguments {
                command: command_name,
            },
            err => err,
        })
    }
}

pub(crate) struct CommandParser {
    command: String,
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self
            .parts
            .next()
            .ok_or(CommandParserError::EndOfStream)?;

        let command_name = match command_name {
            Frame::Simple(s) => s.to_lowercase(),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String)?,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "simple string".to_string(),
                    actual: frame,
                })
            }
        };

        self.command = command_name.clone();
        Ok(command_name)
    }

    fn has_next(&self) -> bool {
        self.parts.len() > 0
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or(CommandParserError::EndOfStream)?;

        let not_an_integer = || CommandParserError::NotAnInteger {
            command: self.command.clone(),
        };

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => string.parse::<i64>().map_err(|_| not_an_integer()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(not_an_integer),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Collects every remaining argument, requiring at least one.
    fn remaining_bytes(&mut self) -> Result<Vec<Bytes>, CommandParserError> {
        let mut values = vec![self.next_bytes()?];
        while self.has_next() {
            values.push(self.next_bytes()?);
        }
        Ok(values)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR Protocol error: invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("ERR value is not an integer or out of range for '{command}' command")]
    NotAnInteger { command: String },
    #[error("ERR Protocol error: invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("ERR Protocol error: empty command")]
    EmptyCommand,
    #[error("ERR Protocol error: the frame was fully consumed")]
    EndOfStream,
}

impl From<StoreError> for Frame {
    fn from(err: StoreError) -> Frame {
        Frame::Error(err.to_string())
    }
}
