//! Per-workspace persistent storage.
//!
//! Each workspace is a directory under a single storage root, named by the
//! normalized workspace key:
//!
//! ```text
//! <root>/<workspace>/
//!     docs/               uploaded source documents
//!     chunks.json         ordered chunk texts (position = identity)
//!     index.bin           serialized VectorIndex
//!     chat_history.json   user/assistant messages, in order
//! ```
//!
//! ## Consistency
//!
//! The chunk list and the vector index are positionally aligned: chunk `i`'s
//! embedding is vector `i`. [`WorkspaceStore::persist`] refuses misaligned
//! input, and [`WorkspaceStore::load`] re-checks the invariant so a reader
//! never acts on a torn pair. Every file is written to a temporary sibling
//! and renamed into place, so a retrieval racing a reindex observes either
//! the old artifacts or the new ones, never a partial write. No locking is
//! assumed beyond that.

use crate::error::{Result, RetrieverError};
use crate::retrieval::vector_index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File holding the ordered chunk texts.
pub const CHUNKS_FILE: &str = "chunks.json";
/// File holding the serialized vector index.
pub const INDEX_FILE: &str = "index.bin";
/// File holding the persisted chat history.
pub const CHAT_HISTORY_FILE: &str = "chat_history.json";
/// Subdirectory holding uploaded documents.
pub const DOCS_DIR: &str = "docs";

/// Normalize a raw workspace name into a directory-safe key.
///
/// Trimmed, lower-cased, spaces replaced with underscores, giving the same key for
/// "Project X", " project x" and "PROJECT X".
pub fn normalize_workspace_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Owns one storage root and all workspace state beneath it.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one workspace (normalized key).
    pub fn workspace_dir(&self, workspace: &str) -> PathBuf {
        self.root.join(normalize_workspace_key(workspace))
    }

    /// Directory holding a workspace's uploaded documents.
    pub fn docs_dir(&self, workspace: &str) -> PathBuf {
        self.workspace_dir(workspace).join(DOCS_DIR)
    }

    /// Store one uploaded document under the workspace, creating the
    /// workspace on first upload. Returns the stored path.
    pub async fn add_document(
        &self,
        workspace: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<PathBuf> {
        let docs = self.docs_dir(workspace);
        tokio::fs::create_dir_all(&docs).await?;
        let path = docs.join(file_name);
        write_atomic(&path, contents).await?;
        debug!(workspace = %normalize_workspace_key(workspace), file = file_name, "stored document");
        Ok(path)
    }

    /// List the workspace's uploaded documents, sorted by file name so
    /// indexing order is deterministic. Empty if the workspace or its docs
    /// directory does not exist.
    pub async fn list_documents(&self, workspace: &str) -> Result<Vec<PathBuf>> {
        let docs = self.docs_dir(workspace);
        let mut entries = match tokio::fs::read_dir(&docs).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Persist a freshly built chunk list and index together, replacing any
    /// prior version.
    ///
    /// Fails with [`RetrieverError::ChunkVectorMismatch`] before touching disk
    /// if the two are not positionally aligned. The chunk list is renamed
    /// into place before the index, so a concurrent loader that sees the new
    /// index also sees a chunk list at least as new.
    pub async fn persist(
        &self,
        workspace: &str,
        chunks: &[String],
        index: &VectorIndex,
    ) -> Result<()> {
        if chunks.len() != index.len() {
            return Err(RetrieverError::ChunkVectorMismatch {
                chunks: chunks.len(),
                vectors: index.len(),
            });
        }
        let dir = self.workspace_dir(workspace);
        tokio::fs::create_dir_all(&dir).await?;
        write_atomic(&dir.join(CHUNKS_FILE), &serde_json::to_vec(chunks)?).await?;
        write_atomic(&dir.join(INDEX_FILE), &index.to_bytes()).await?;
        debug!(
            workspace = %normalize_workspace_key(workspace),
            chunks = chunks.len(),
            dimension = index.dimension(),
            "persisted chunk list and vector index"
        );
        Ok(())
    }

    /// Load the workspace's persisted index and chunk list.
    ///
    /// Fails with [`RetrieverError::WorkspaceNotIndexed`] if either artifact
    /// is missing, and with [`RetrieverError::ChunkVectorMismatch`] if the
    /// persisted pair is misaligned (which the persist contract should make
    /// impossible).
    pub async fn load(&self, workspace: &str) -> Result<(VectorIndex, Vec<String>)> {
        let dir = self.workspace_dir(workspace);
        let not_indexed = || RetrieverError::WorkspaceNotIndexed {
            workspace: normalize_workspace_key(workspace),
        };

        let index_bytes = read_or(&dir.join(INDEX_FILE), not_indexed).await?;
        let chunk_bytes = read_or(&dir.join(CHUNKS_FILE), not_indexed).await?;

        let index = VectorIndex::from_bytes(&index_bytes)?;
        let chunks: Vec<String> = serde_json::from_slice(&chunk_bytes)?;
        if chunks.len() != index.len() {
            return Err(RetrieverError::ChunkVectorMismatch {
                chunks: chunks.len(),
                vectors: index.len(),
            });
        }
        Ok((index, chunks))
    }

    /// Whether the workspace currently has a persisted index.
    pub async fn is_indexed(&self, workspace: &str) -> bool {
        let dir = self.workspace_dir(workspace);
        tokio::fs::try_exists(dir.join(INDEX_FILE))
            .await
            .unwrap_or(false)
    }

    /// Append one message to the workspace's chat history.
    ///
    /// System-role messages (the preamble and the retrieval-context message)
    /// are never persisted; they are reconstructed on every turn.
    pub async fn append_history(&self, workspace: &str, message: &ChatMessage) -> Result<()> {
        if message.role == ChatRole::System {
            warn!("refusing to persist a system-role message to chat history");
            return Ok(());
        }
        let mut history = self.load_history(workspace).await?;
        history.push(message.clone());
        self.write_history(workspace, &history).await
    }

    /// Append a completed chat turn, the user message and the assistant
    /// reply, in one atomic history write.
    ///
    /// A turn is only meaningful as a pair: persisting the halves separately
    /// could leave a dangling user message if the process died between the
    /// writes.
    pub async fn append_turn(
        &self,
        workspace: &str,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<()> {
        let mut history = self.load_history(workspace).await?;
        history.push(ChatMessage::user(user));
        history.push(ChatMessage::assistant(assistant));
        self.write_history(workspace, &history).await
    }

    async fn write_history(&self, workspace: &str, history: &[ChatMessage]) -> Result<()> {
        let dir = self.workspace_dir(workspace);
        tokio::fs::create_dir_all(&dir).await?;
        write_atomic(&dir.join(CHAT_HISTORY_FILE), &serde_json::to_vec_pretty(history)?).await?;
        Ok(())
    }

    /// Load the workspace's chat history, oldest first. Empty if the
    /// workspace has no history yet.
    pub async fn load_history(&self, workspace: &str) -> Result<Vec<ChatMessage>> {
        let path = self.workspace_dir(workspace).join(CHAT_HISTORY_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a workspace and all of its state: documents, chunk list, index
    /// and chat history. Returns whether the workspace existed.
    pub async fn delete_workspace(&self, workspace: &str) -> Result<bool> {
        let dir = self.workspace_dir(workspace);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to a temporary sibling of `path`, then rename it into
/// place. Rename within one directory is atomic on the platforms we care
/// about, so readers never observe a half-written file.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_or<F>(path: &Path, missing: F) -> Result<Vec<u8>>
where
    F: Fn() -> RetrieverError,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(missing()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn workspace_keys_are_normalized() {
        assert_eq!(normalize_workspace_key("  Project X "), "project_x");
        assert_eq!(normalize_workspace_key("default"), "default");
        assert_eq!(normalize_workspace_key("Quarterly Budget Review"), "quarterly_budget_review");
    }

    #[test]
    fn distinct_spellings_share_a_directory() {
        let store = WorkspaceStore::new("/tmp/carrel");
        assert_eq!(
            store.workspace_dir("Project X"),
            store.workspace_dir(" project x ")
        );
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
        let index = VectorIndex::build(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        store.persist("notes", &chunks, &index).await.unwrap();
        assert!(store.is_indexed("notes").await);

        let (loaded_index, loaded_chunks) = store.load("notes").await.unwrap();
        assert_eq!(loaded_chunks, chunks);
        assert_eq!(
            index.search(&[0.9, 0.1], 2).unwrap(),
            loaded_index.search(&[0.9, 0.1], 2).unwrap()
        );
    }

    #[tokio::test]
    async fn persist_rejects_misaligned_input() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let index = VectorIndex::build(&[vec![1.0]]).unwrap();
        let err = store
            .persist("notes", &["a".to_string(), "b".to_string()], &index)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RetrieverError::ChunkVectorMismatch {
                chunks: 2,
                vectors: 1
            }
        ));
        // Nothing was written.
        assert!(!store.is_indexed("notes").await);
    }

    #[tokio::test]
    async fn loading_an_unindexed_workspace_fails_benignly() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let err = store.load("never seen").await.unwrap_err();
        match err {
            RetrieverError::WorkspaceNotIndexed { workspace } => {
                assert_eq!(workspace, "never_seen");
            }
            other => panic!("expected WorkspaceNotIndexed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_appends_in_order_and_skips_system_messages() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());

        assert!(store.load_history("notes").await.unwrap().is_empty());

        store
            .append_history("notes", &ChatMessage::user("hello"))
            .await
            .unwrap();
        store
            .append_history("notes", &ChatMessage::system("retrieval context"))
            .await
            .unwrap();
        store
            .append_history("notes", &ChatMessage::assistant("hi there"))
            .await
            .unwrap();

        let history = store.load_history("notes").await.unwrap();
        assert_eq!(
            history,
            vec![ChatMessage::user("hello"), ChatMessage::assistant("hi there")]
        );
    }

    #[tokio::test]
    async fn append_turn_persists_the_pair_in_one_write() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());

        store
            .append_turn("notes", "first question", "first answer")
            .await
            .unwrap();
        store
            .append_turn("notes", "second question", "second answer")
            .await
            .unwrap();

        let history = store.load_history("notes").await.unwrap();
        assert_eq!(
            history,
            vec![
                ChatMessage::user("first question"),
                ChatMessage::assistant("first answer"),
                ChatMessage::user("second question"),
                ChatMessage::assistant("second answer"),
            ]
        );
        // History is always a complete user/assistant pairing: no turn ever
        // lands half-written.
        assert_eq!(history.len() % 2, 0);
        assert!(
            history
                .chunks(2)
                .all(|turn| turn[0].role == ChatRole::User
                    && turn[1].role == ChatRole::Assistant)
        );
    }

    #[tokio::test]
    async fn documents_are_listed_sorted_and_deleted_with_the_workspace() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path());

        store.add_document("notes", "b.txt", b"bravo").await.unwrap();
        store.add_document("notes", "a.txt", b"alpha").await.unwrap();

        let docs = store.list_documents("notes").await.unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        assert!(store.delete_workspace("notes").await.unwrap());
        assert!(!store.delete_workspace("notes").await.unwrap());
        assert!(store.list_documents("notes").await.unwrap().is_empty());
    }
}
