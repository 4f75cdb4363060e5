use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::codec::FrameCodec;
use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::frame::Frame;
use crate::store::Store;

/// The per-connection protocol state machine, independent from any transport.
///
/// Raw chunks go in as they come off the wire and the replies for every request completed by
/// that chunk come out, in order. Requests split across chunks are buffered until complete.
pub struct Session {
    store: Store,
    codec: FrameCodec,
    // Data received from the client is appended to the buffer. When a frame is parsed, the
    // corresponding data is removed from the buffer.
    buffer: BytesMut,
}

impl Session {
    pub fn new(store: Store, codec: FrameCodec) -> Session {
        Session {
            store,
            codec,
            buffer: BytesMut::with_capacity(4096),
        }
    }

    pub fn process(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut replies = vec![];
        loop {
            match self.codec.decode(&mut self.buffer) {
                Ok(Some(frame)) => replies.push(self.execute(frame)),
                Ok(None) => break,
                Err(err) => {
                    // The codec always drops the offending bytes, so decoding can carry on.
                    warn!(error = %err, "Malformed request");
                    replies.push(Frame::Error("ERR Protocol error".to_string()));
                }
            }
        }

        replies
    }

    fn execute(&self, frame: Frame) -> Frame {
        debug!("Received frame from client: {:?}", frame);

        let cmd = match Command::try_from(frame) {
            Ok(cmd) => cmd,
            Err(err) => return Frame::Error(err.to_string()),
        };

        let res = match cmd.exec(self.store.clone()) {
            Ok(res) => res,
            Err(err) => Frame::Error(format!("ERR {}", err)),
        };

        debug!("Sending response to client: {:?}", res);
        res
    }
}
