use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::codec::FrameCodec;
use crate::config::Config;
use crate::connection::Connection;
use crate::snapshot;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::new();
    let dump_path = config.dump_path.clone();

    match snapshot::load(&store, &dump_path) {
        Ok(true) => info!(
            path = %dump_path.display(),
            keys = store.lock().size(),
            "Loaded snapshot"
        ),
        Ok(false) => info!(path = %dump_path.display(), "No snapshot found, starting empty"),
        Err(e) => error!(
            error = %e,
            path = %dump_path.display(),
            "Failed to load snapshot, starting empty"
        ),
    }

    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;
    info!("Redis server listening on {}", listener.local_addr()?);

    if config.dump_interval > 0 {
        tokio::spawn(snapshot::run_periodic_dump(
            store.clone(),
            dump_path.clone(),
            Duration::from_secs(config.dump_interval),
        ));
    }

    let codec = FrameCodec::new(config.max_frame_size);

    tokio::select! {
        res = serve(listener, store.clone(), codec) => {
            if let Err(e) = res {
                error!(error = %e, "Failed to accept connections");
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
        }
    }

    match snapshot::dump(&store, &dump_path) {
        Ok(keys) => info!(path = %dump_path.display(), keys, "Snapshot written on shutdown"),
        Err(e) => error!(
            error = %e,
            path = %dump_path.display(),
            "Failed to write snapshot on shutdown"
        ),
    }

    Ok(())
}

/// Accepts clients forever, each one served by its own task against the shared store.
pub async fn serve(listener: TcpListener, store: Store, codec: FrameCodec) -> Result<(), Error> {
    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, codec).await {
                error!(error = %e, "Connection failed");
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, codec),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    codec: FrameCodec,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, store, codec);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    conn.run().await?;

    info!("Connection closed");
    Ok(())
}
