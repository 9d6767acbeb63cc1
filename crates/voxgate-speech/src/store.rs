use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::warn;
use voxgate_core::{SessionId, VoxgateError, VoxgateResult};

/// A synthesized utterance waiting to be fetched by the telephony provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ephemeral per-session audio storage.
///
/// Keyed by session id with at most one artifact per key: `put` replaces
/// whatever was stored before.
#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn put(&self, id: SessionId, artifact: AudioArtifact) -> VoxgateResult<()>;
    async fn get(&self, id: SessionId) -> VoxgateResult<Option<AudioArtifact>>;
    /// Remove the artifact. Deleting a missing artifact is not an error.
    async fn delete(&self, id: SessionId) -> VoxgateResult<()>;

    /// Fetch and remove in one step. Removal is advisory: a failed delete is
    /// logged and the artifact is still returned.
    async fn take(&self, id: SessionId) -> VoxgateResult<Option<AudioArtifact>> {
        let artifact = self.get(id).await?;
        if artifact.is_some() {
            if let Err(e) = self.delete(id).await {
                warn!(session_id = %id, error = %e, "Failed to delete delivered audio");
            }
        }
        Ok(artifact)
    }
}

/// In-memory audio store. Operations are serialized under one lock.
pub struct InMemoryAudioStore {
    store: RwLock<HashMap<SessionId, AudioArtifact>>,
}

impl InMemoryAudioStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryAudioStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioStore for InMemoryAudioStore {
    async fn put(&self, id: SessionId, artifact: AudioArtifact) -> VoxgateResult<()> {
        self.store.write().await.insert(id, artifact);
        Ok(())
    }

    async fn get(&self, id: SessionId) -> VoxgateResult<Option<AudioArtifact>> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: SessionId) -> VoxgateResult<()> {
        self.store.write().await.remove(&id);
        Ok(())
    }

    async fn take(&self, id: SessionId) -> VoxgateResult<Option<AudioArtifact>> {
        Ok(self.store.write().await.remove(&id))
    }
}

/// Audio store backed by one file per session in a directory.
///
/// Every file in the directory shares the store's content type. Writes go
/// through a temporary file and a rename so a concurrent reader never sees a
/// partially written artifact.
pub struct FileAudioStore {
    dir: PathBuf,
    content_type: String,
}

impl FileAudioStore {
    pub async fn new(dir: PathBuf, content_type: impl Into<String>) -> VoxgateResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            content_type: content_type.into(),
        })
    }

    fn artifact_path(&self, id: SessionId) -> PathBuf {
        self.dir
            .join(format!("{id}.{}", extension_for(&self.content_type)))
    }
}

/// File extension used for a given audio MIME type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/basic" | "audio/x-mulaw" => "ulaw",
        _ => "bin",
    }
}

#[async_trait]
impl AudioStore for FileAudioStore {
    async fn put(&self, id: SessionId, artifact: AudioArtifact) -> VoxgateResult<()> {
        if artifact.content_type != self.content_type {
            return Err(VoxgateError::Store(format!(
                "store holds {} audio, got {}",
                self.content_type, artifact.content_type
            )));
        }
        let path = self.artifact_path(id);
        let tmp = path.with_extension("part");
        tokio::fs::write(&tmp, &artifact.bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, id: SessionId) -> VoxgateResult<Option<AudioArtifact>> {
        match tokio::fs::read(self.artifact_path(id)).await {
            Ok(bytes) => Ok(Some(AudioArtifact::new(bytes, self.content_type.clone()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: SessionId) -> VoxgateResult<()> {
        match tokio::fs::remove_file(self.artifact_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
