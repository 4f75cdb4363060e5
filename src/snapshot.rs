use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::collections::{HashMap, VecDeque};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error as ThisError;
use tracing::{debug, error, info};

use crate::store::{Entry, Store, Value};

const MAGIC: &[u8] = b"RUDIS";
const VERSION: u8 = 1;

const TAG_STRING: u8 = 0;
const TAG_LIST: u8 = 1;
const TAG_HASH: u8 = 2;
const TAG_EOF: u8 = 0xFF;

#[derive(Debug, ThisError)]
pub enum SnapshotError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("not a snapshot file")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    #[error("snapshot is truncated")]
    Truncated,
    #[error("invalid record tag {0:#04x}")]
    InvalidTag(u8),
    #[error("length {0} does not fit a snapshot record")]
    TooLarge(usize),
}

/// Serializes entries into the snapshot layout.
///
/// The file starts with the `RUDIS` magic and a version byte, followed by one record per key
/// and a closing `0xFF` tag. A record is a type tag, the absolute expiry in unix milliseconds
/// (0 when the key never expires), the key and the payload. Every variable length field is
/// prefixed with its big-endian `u32` length, collections with their `u32` element count.
pub fn encode(entries: &[Entry]) -> Result<Bytes, SnapshotError> {
    let now = SystemTime::now();
    let mut buf = BytesMut::new();

    buf.put_slice(MAGIC);
    buf.put_u8(VERSION);

    for entry in entries {
        let tag = match entry.value {
            Value::String(_) => TAG_STRING,
            Value::List(_) => TAG_LIST,
            Value::Hash(_) => TAG_HASH,
        };
        buf.put_u8(tag);
        buf.put_u64(expires_at_unix_ms(now, entry.ttl));
        put_blob(&mut buf, &entry.key)?;

        match &entry.value {
            Value::String(data) => put_blob(&mut buf, data)?,
            Value::List(list) => {
                put_len(&mut buf, list.len())?;
                for item in list {
                    put_blob(&mut buf, item)?;
                }
            }
            Value::Hash(hash) => {
                put_len(&mut buf, hash.len())?;
                for (field, value) in hash {
                    put_blob(&mut buf, field)?;
                    put_blob(&mut buf, value)?;
                }
            }
        }
    }

    buf.put_u8(TAG_EOF);
    Ok(buf.freeze())
}

/// Parses a snapshot produced by [`encode`]. Deadlines are re-based on the current clock and
/// records that expired in the meantime are skipped.
pub fn decode(mut buf: &[u8]) -> Result<Vec<Entry>, SnapshotError> {
    let now = SystemTime::now();

    if buf.remaining() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    buf.advance(MAGIC.len());

    let version = get_u8(&mut buf)?;
    if version != VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let mut entries = vec![];

    loop {
        let tag = get_u8(&mut buf)?;
        if tag == TAG_EOF {
            break;
        }

        let expires_at = get_u64(&mut buf)?;
        let key = get_blob(&mut buf)?;

        let value = match tag {
            TAG_STRING => Value::String(get_blob(&mut buf)?),
            TAG_LIST => {
                let len = get_u32(&mut buf)? as usize;
                let mut list = VecDeque::with_capacity(len.min(buf.remaining()));
                for _ in 0..len {
                    list.push_back(get_blob(&mut buf)?);
                }
                Value::List(list)
            }
            TAG_HASH => {
                let len = get_u32(&mut buf)? as usize;
                let mut hash = HashMap::with_capacity(len.min(buf.remaining()));
                for _ in 0..len {
                    let field = get_blob(&mut buf)?;
                    let value = get_blob(&mut buf)?;
                    hash.insert(field, value);
                }
                Value::Hash(hash)
            }
            tag => return Err(SnapshotError::InvalidTag(tag)),
        };

        let ttl = match expires_at {
            0 => None,
            ms => match (UNIX_EPOCH + Duration::from_millis(ms)).duration_since(now) {
                Ok(remaining) => Some(remaining),
                // Expired while on disk.
                Err(_) => continue,
            },
        };

        entries.push(Entry { key, value, ttl });
    }

    Ok(entries)
}

/// Writes a point in time image of the store to `path`.
///
/// The lock is only held while the live entries are copied out. The file is written next to
/// `path` and renamed over it once complete, so a crash mid-write never corrupts the previous
/// snapshot.
pub fn dump(store: &Store, path: &Path) -> Result<usize, SnapshotError> {
    let entries = store.lock().snapshot();
    let bytes = encode(&entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)?;

    Ok(entries.len())
}

/// Replaces the content of the store with the snapshot at `path`.
///
/// Returns `Ok(false)` when there is no snapshot yet. The file is decoded completely before the
/// store is touched, so a corrupt snapshot leaves the store as it was.
pub fn load(store: &Store, path: &Path) -> Result<bool, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err.into()),
    };

    let entries = decode(&bytes)?;
    store.lock().restore(entries);

    Ok(true)
}

pub async fn run_periodic_dump(store: Store, path: PathBuf, interval: Duration) {
    info!(path = %path.display(), ?interval, "Periodic snapshot task started");

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let res = tokio::task::spawn_blocking({
            let store = store.clone();
            let path = path.clone();
            move || dump(&store, &path)
        })
        .await;

        match res {
            Ok(Ok(keys)) => debug!(path = %path.display(), keys, "Snapshot written"),
            Ok(Err(err)) => error!(error = %err, path = %path.display(), "Failed to write snapshot"),
            Err(err) => error!(error = %err, "Snapshot task panicked"),
        }
    }
}

fn expires_at_unix_ms(now: SystemTime, ttl: Option<Duration>) -> u64 {
    ttl.and_then(|ttl| now.checked_add(ttl))
        .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
        .map(|at| (at.as_millis() as u64).max(1))
        .unwrap_or(0)
}

/// The file a dump is written to before being renamed over `path`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn put_len(buf: &mut BytesMut, len: usize) -> Result<(), SnapshotError> {
    let len = u32::try_from(len).map_err(|_| SnapshotError::TooLarge(len))?;
    buf.put_u32(len);
    Ok(())
}

fn put_blob(buf: &mut BytesMut, blob: &[u8]) -> Result<(), SnapshotError> {
    put_len(buf, blob.len())?;
    buf.put_slice(blob);
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8, SnapshotError> {
    if buf.remaining() < 1 {
        return Err(SnapshotError::Truncated);
    }
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut &[u8]) -> Result<u32, SnapshotError> {
    if buf.remaining() < 4 {
        return Err(SnapshotError::Truncated);
    }
    Ok(buf.get_u32())
}

fn get_u64(buf: &mut &[u8]) -> Result<u64, SnapshotError> {
    if buf.remaining() < 8 {
        return Err(SnapshotError::Truncated);
    }
    Ok(buf.get_u64())
}

fn get_blob(buf: &mut &[u8]) -> Result<Bytes, SnapshotError> {
    let len = get_u32(buf)? as usize;
    if buf.remaining() < len {
        return Err(SnapshotError::Truncated);
    }
    Ok(buf.copy_to_bytes(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Side;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_path() -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("rudis_snapshot_{}_{}.rdb", std::process::id(), n))
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry {
                key: Bytes::from("name"),
                value: Value::String(Bytes::from("ada")),
                ttl: None,
            },
            Entry {
                key: Bytes::from("queue"),
                value: Value::List(VecDeque::from([Bytes::from("a"), Bytes::from("b")])),
                ttl: Some(Duration::from_secs(60)),
            },
            Entry {
                key: Bytes::from("user"),
                value: Value::Hash(HashMap::from([(Bytes::from("lang"), Bytes::from("en"))])),
                ttl: None,
            },
        ]
    }

    #[test]
    fn decode_what_was_encoded() {
        let decoded = decode(&encode(&entries()).unwrap()).unwrap();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], entries()[0]);
        assert_eq!(decoded[2], entries()[2]);
        assert_eq!(decoded[1].value, entries()[1].value);

        let ttl = decoded[1].ttl.unwrap();
        assert!(ttl <= Duration::from_secs(60));
        assert!(ttl > Duration::from_secs(58));
    }

    #[test]
    fn binary_keys_and_values() {
        let entry = Entry {
            key: Bytes::from_static(b"\x00\r\n\xff"),
            value: Value::String(Bytes::from_static(b"\r\n\r\n")),
            ttl: None,
        };

        assert_eq!(decode(&encode(&[entry.clone()]).unwrap()).unwrap(), vec![entry]);
    }

    #[test]
    fn skips_records_expired_on_disk() {
        let mut buf = BytesMut::new();
        buf.put_slice(MAGIC);
        buf.put_u8(VERSION);
        buf.put_u8(TAG_STRING);
        buf.put_u64(1_000);
        put_blob(&mut buf, b"stale").unwrap();
        put_blob(&mut buf, b"value").unwrap();
        buf.put_u8(TAG_EOF);

        assert_eq!(decode(&buf).unwrap(), vec![]);
    }

    #[test]
    fn rejects_corrupt_input() {
        assert!(matches!(
            decode(b"REDIS\x01\xff"),
            Err(SnapshotError::BadMagic)
        ));
        assert!(matches!(
            decode(b"RUDIS\x07\xff"),
            Err(SnapshotError::UnsupportedVersion(7))
        ));
        assert!(matches!(
            decode(b"RUDIS\x01\x09\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00"),
            Err(SnapshotError::InvalidTag(9))
        ));

        let encoded = encode(&entries()).unwrap();
        for len in [6, 10, encoded.len() - 1] {
            assert!(matches!(
                decode(&encoded[..len]),
                Err(SnapshotError::Truncated)
            ));
        }
    }

    #[tokio::test]
    async fn dump_and_load() {
        let path = temp_path();

        let store = Store::new();
        store.lock().set(Bytes::from("name"), Bytes::from("ada"));
        store
            .lock()
            .push(Bytes::from("queue"), vec![Bytes::from("a")], Side::Right)
            .unwrap();

        assert_eq!(dump(&store, &path).unwrap(), 2);

        let restored = Store::new();
        assert!(load(&restored, &path).unwrap());
        assert_eq!(restored.lock().get(b"name"), Ok(Some(Bytes::from("ada"))));
        assert_eq!(restored.lock().llen(b"queue"), Ok(1));
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn tmp_file_keeps_the_full_name() {
        assert_eq!(
            tmp_path(Path::new("data/dump.my_rdb")),
            PathBuf::from("data/dump.my_rdb.tmp")
        );
        assert_eq!(tmp_path(Path::new("snap.tmp")), PathBuf::from("snap.tmp.tmp"));
        assert_eq!(tmp_path(Path::new("dump")), PathBuf::from("dump.tmp"));
    }

    #[test]
    fn oversized_length_is_an_error() {
        let mut buf = BytesMut::new();

        assert!(put_len(&mut buf, u32::MAX as usize).is_ok());
        assert!(matches!(
            put_len(&mut buf, u32::MAX as usize + 1),
            Err(SnapshotError::TooLarge(_))
        ));
        assert_eq!(buf.len(), 4);
    }

    #[tokio::test]
    async fn load_missing_file() {
        let store = Store::new();

        assert!(!load(&store, &temp_path()).unwrap());
        assert_eq!(store.lock().size(), 0);
    }

    #[tokio::test]
    async fn failed_load_leaves_the_store_untouched() {
        let path = temp_path();
        let mut corrupt = encode(&entries()).unwrap().to_vec();
        corrupt.truncate(corrupt.len() - 3);
        fs::write(&path, corrupt).unwrap();

        let store = Store::new();
        assert!(matches!(load(&store, &path), Err(SnapshotError::Truncated)));
        assert_eq!(store.lock().size(), 0);

        let _ = fs::remove_file(&path);
    }
}
