//! Raw transcript persistence, kept apart from the replay engine.
//!
//! Layout under the data dir:
//! `<user_id>/<session_id>.txt` holds the transcript byte-for-byte and
//! `<user_id>/<user_id>_writing_sessions.txt` lists session ids, one per line,
//! in save order.

use crate::errors::AnkyError;
use crate::runtime::FileSystem;
use crate::transcript::parse_header;
use crate::types::SessionHeader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub header: SessionHeader,
    pub transcript_path: PathBuf,
    pub index_path: PathBuf,
}

pub trait SessionStore: Send + Sync {
    fn save_transcript(&self, raw: &str) -> Result<StoredSession, AnkyError>;
    fn session_ids(&self, user_id: &str) -> Result<Vec<String>, AnkyError>;
}

pub struct FsSessionStore {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FsSessionStore {
    pub fn new(root: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user_id: &str) -> Result<PathBuf, AnkyError> {
        validate_component("user id", user_id)?;
        Ok(self.root.join(user_id))
    }

    fn index_path(&self, user_id: &str) -> Result<PathBuf, AnkyError> {
        Ok(self
            .user_dir(user_id)?
            .join(format!("{user_id}_writing_sessions.txt")))
    }
}

impl SessionStore for FsSessionStore {
    fn save_transcript(&self, raw: &str) -> Result<StoredSession, AnkyError> {
        let header = parse_header(raw)?;
        let user_dir = self.user_dir(&header.user_id)?;
        validate_component("session id", &header.session_id)?;

        self.fs.create_dir_all(&user_dir)?;
        let transcript_path = user_dir.join(format!("{}.txt", header.session_id));
        self.fs.write_string(&transcript_path, raw)?;

        let index_path = self.index_path(&header.user_id)?;
        self.fs
            .append_string(&index_path, &format!("{}\n", header.session_id))?;

        Ok(StoredSession {
            header,
            transcript_path,
            index_path,
        })
    }

    fn session_ids(&self, user_id: &str) -> Result<Vec<String>, AnkyError> {
        let index_path = self.index_path(user_id)?;
        if !self.fs.exists(&index_path) {
            return Ok(Vec::new());
        }
        let contents = self.fs.read_to_string(&index_path)?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn validate_component(what: &str, value: &str) -> Result<(), AnkyError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(AnkyError::InvalidIdentifier(format!(
            "{what} {value:?} cannot be used as a path component"
        )));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(AnkyError::InvalidIdentifier(format!(
            "{what} {value:?} contains a path separator"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FsSessionStore, SessionStore};
    use crate::errors::{AnkyError, ParseError};
    use crate::runtime::{FakeFileSystem, ProductionFileSystem};
    use std::path::Path;
    use std::sync::Arc;

    const TRANSCRIPT: &str = "user123\nsess456\nWrite about gratitude\n2024-01-01T00:00:00Z\nH 0.3\n";

    #[test]
    fn saves_transcript_verbatim_and_indexes_session() {
        let fs = FakeFileSystem::default();
        let store = FsSessionStore::new("/data", Arc::new(fs.clone()));

        let stored = store.save_transcript(TRANSCRIPT).expect("save");

        assert_eq!(
            stored.transcript_path,
            Path::new("/data/user123/sess456.txt")
        );
        assert_eq!(fs.file(&stored.transcript_path).as_deref(), Some(TRANSCRIPT));
        assert_eq!(
            fs.file("/data/user123/user123_writing_sessions.txt").as_deref(),
            Some("sess456\n")
        );
        assert_eq!(fs.created_dirs(), vec![Path::new("/data/user123").to_path_buf()]);
    }

    #[test]
    fn index_accumulates_in_save_order() {
        let fs = FakeFileSystem::default();
        let store = FsSessionStore::new("/data", Arc::new(fs));
        store.save_transcript("u\nfirst\np\nt\n").expect("first");
        store.save_transcript("u\nsecond\np\nt\n").expect("second");

        assert_eq!(
            store.session_ids("u").expect("ids"),
            vec!["first".to_string(), "second".to_string()]
        );
        assert!(store.session_ids("someone-else").expect("ids").is_empty());
    }

    #[test]
    fn rejects_ids_that_escape_the_data_dir() {
        let store = FsSessionStore::new("/data", Arc::new(FakeFileSystem::default()));
        let err = store
            .save_transcript("../etc\ns\np\nt\n")
            .expect_err("traversal");
        assert!(matches!(err, AnkyError::InvalidIdentifier(_)));

        let err = store
            .save_transcript("u\na/b\np\nt\n")
            .expect_err("separator");
        assert!(matches!(err, AnkyError::InvalidIdentifier(_)));

        let err = store.save_transcript("\ns\np\nt\n").expect_err("empty");
        assert!(matches!(err, AnkyError::InvalidIdentifier(_)));
    }

    #[test]
    fn short_transcripts_are_not_written() {
        let fs = FakeFileSystem::default();
        let store = FsSessionStore::new("/data", Arc::new(fs.clone()));
        let err = store.save_transcript("u\ns\np").expect_err("short");
        assert!(matches!(
            err,
            AnkyError::Transcript(ParseError::TooFewLines { found: 3 })
        ));
        assert!(fs.created_dirs().is_empty());
    }

    #[test]
    fn production_filesystem_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsSessionStore::new(dir.path(), Arc::new(ProductionFileSystem));
        let stored = store.save_transcript(TRANSCRIPT).expect("save");
        store.save_transcript(TRANSCRIPT).expect("save again");

        let on_disk = std::fs::read_to_string(&stored.transcript_path).expect("read");
        assert_eq!(on_disk, TRANSCRIPT);
        assert_eq!(
            store.session_ids("user123").expect("ids"),
            vec!["sess456".to_string(), "sess456".to_string()]
        );
    }
}
