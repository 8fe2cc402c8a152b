//! Key-value backends for `KvCellStore`.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::KVStoreError;
use crate::ports::outbound::{KeyValueStore, ScanResult};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

fn scan(data: &Entries, prefix: &[u8]) -> ScanResult {
    data.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// In-memory key-value store for tests and volatile deployments.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: Entries,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

/// File-backed key-value store.
///
/// The whole map lives in memory; `flush` rewrites the file atomically via a
/// temp file and rename.
///
/// File format: `[key_len:u32 LE][key][value_len:u32 LE][value]...`
pub struct FileBackedKVStore {
    data: Entries,
    path: PathBuf,
    dirty: bool,
}

impl FileBackedKVStore {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                let data = decode_entries(&bytes)?;
                info!(path = %path.display(), keys = data.len(), "Loaded store file");
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No existing store file, starting empty");
                Entries::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            data,
            path,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&encode_entries(&self.data))?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), keys = self.data.len(), "Store file written");
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        self.dirty = true;
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }

    fn flush(&mut self) -> Result<(), KVStoreError> {
        if self.dirty {
            self.save()?;
            self.dirty = false;
        }
        Ok(())
    }
}

fn encode_entries(data: &Entries) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (key, value) in data {
        bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(key);
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(value);
    }
    bytes
}

fn decode_entries(bytes: &[u8]) -> Result<Entries, KVStoreError> {
    let mut data = Entries::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let key = read_chunk(bytes, &mut cursor)?;
        let value = read_chunk(bytes, &mut cursor)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let truncated = |at: usize| KVStoreError::CorruptionError {
        message: format!("truncated entry at byte {}", at),
    };

    let len_end = cursor.checked_add(4).filter(|end| *end <= bytes.len()).ok_or_else(|| truncated(*cursor))?;
    let mut len = [0u8; 4];
    len.copy_from_slice(&bytes[*cursor..len_end]);
    let len = u32::from_le_bytes(len) as usize;

    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| truncated(len_end))?;
    let chunk = bytes[len_end..end].to_vec();
    *cursor = end;
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let mut store = InMemoryKVStore::new();
        store.put(b"b/2", b"2").unwrap();
        store.put(b"a/1", b"x").unwrap();
        store.put(b"b/1", b"1").unwrap();
        store.put(b"c/1", b"y").unwrap();

        let keys: Vec<_> = store.prefix_scan(b"b/").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"b/1".to_vec(), b"b/2".to_vec()]);
    }

    #[test]
    fn test_file_store_persists_only_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zarya.db");

        let mut store = FileBackedKVStore::open(&path).unwrap();
        store.put(b"k", b"v").unwrap();
        assert!(!path.exists());

        store.flush().unwrap();
        let reopened = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(reopened.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_file_store_flush_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("zarya.db");

        let mut store = FileBackedKVStore::open(&path).unwrap();
        store.put(b"a", b"1").unwrap();
        store.flush().unwrap();
        store.put(b"a", b"2").unwrap();
        store.put(b"b", b"3").unwrap();
        store.flush().unwrap();

        let reopened = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(reopened.get(b"a").unwrap(), Some(b"2".to_vec()));
        assert_eq!(reopened.prefix_scan(b"").unwrap().len(), 2);
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.db");
        std::fs::write(&path, [5, 0, 0, 0, b'a']).unwrap();

        assert!(matches!(
            FileBackedKVStore::open(&path),
            Err(KVStoreError::CorruptionError { .. })
        ));
    }
}
