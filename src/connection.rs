use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::session::Session;
use crate::store::Store;
use crate::Error;

const READ_CHUNK_SIZE: usize = 4096;

/// Drives a [`Session`] over a duplex byte stream until the peer goes away.
pub struct Connection<S> {
    pub id: Uuid,
    stream: S,
    session: Session,
    codec: FrameCodec,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, store: Store, codec: FrameCodec) -> Connection<S> {
        Connection {
            id: Uuid::new_v4(),
            stream,
            session: Session::new(store, codec),
            codec,
        }
    }

    /// Returns once the client closes its end of the stream. Read and write failures are
    /// returned as errors and end the connection as well.
    pub async fn run(&mut self) -> Result<(), Error> {
        let mut chunk = vec![0; READ_CHUNK_SIZE];
        let mut out = BytesMut::new();

        loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }

            for reply in self.session.process(&chunk[..n]) {
                self.codec.encode(reply, &mut out)?;
            }

            if !out.is_empty() {
                self.stream.write_all(&out).await?;
                out.clear();
            }
        }
    }
}
