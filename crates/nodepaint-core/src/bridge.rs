//! Commit side-effects: rasterize, upload, persist, and the backing image
//! reference.
//!
//! Uploads are the only asynchronous operation in the core. Commits can be
//! issued faster than they complete, so every commit is stamped with a
//! monotonically increasing sequence number and a response is applied only
//! if its number is still the latest issued; stale responses complete and
//! are discarded.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::scene::SceneGraph;
use crate::settings::{
    BoxFuture, CanvasSize, PersistedSettings, SettingsRegistry, SettingsResult, SettingsStore,
};

/// A single upload: rasterized canvas plus an overwrite flag.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target name, derived from the node identifier.
    pub name: String,
    /// PNG-encoded canvas raster.
    pub bytes: Vec<u8>,
    pub overwrite: bool,
}

/// Upload response: the canonical identifier for the committed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub name: String,
}

/// Upload failures.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The server answered with a non-success status.
    #[error("Upload rejected: {status} {message}")]
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    #[error("Upload transport error: {0}")]
    Transport(String),
}

/// Upload transport contract; the wire protocol lives outside the core.
pub trait Uploader: Send + Sync {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, Result<UploadResponse, UploadError>>;
}

/// Rasterizes the scene through the external renderer.
pub trait Rasterizer<S: SceneGraph> {
    /// Produce the PNG bytes for the full canvas.
    fn rasterize(&self, scene: &S, size: CanvasSize) -> Vec<u8>;
}

/// Raw backing-image value as the host hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    Plain(String),
    Structured {
        filename: String,
        subfolder: Option<String>,
        kind: Option<String>,
    },
}

/// Normalize a raw image reference into a single path string.
///
/// Subfolder prefixes with a slash; a kind other than `input` is appended in
/// brackets.
pub fn normalize_image_ref(raw: &ImageRef) -> String {
    match raw {
        ImageRef::Plain(value) => value.clone(),
        ImageRef::Structured {
            filename,
            subfolder,
            kind,
        } => {
            let mut value = String::new();
            if let Some(sub) = subfolder {
                if !sub.is_empty() {
                    value.push_str(sub);
                    value.push('/');
                }
            }
            value.push_str(filename);
            if let Some(kind) = kind {
                if kind != "input" {
                    value.push_str(&format!(" [{kind}]"));
                }
            }
            value
        }
    }
}

/// Monotonic commit sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CommitSeq(u64);

/// A commit whose upload is still in flight. The host drives the future and
/// hands the outcome back through `finish_commit` with the same sequence
/// number.
pub struct PendingCommit {
    pub seq: CommitSeq,
    pub upload: BoxFuture<'static, Result<UploadResponse, UploadError>>,
}

/// How a completed upload was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The response became the new backing image reference.
    Applied(String),
    /// A newer commit was issued meanwhile; this response was discarded.
    Stale,
    /// The upload never reached the server; previous reference kept.
    TransportFailed,
}

/// Commit failures the host must surface to the user.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Upload rejected: {status} {message}")]
    UploadRejected { status: u16, message: String },
}

/// Performs the commit side-effects and owns the backing image reference.
pub struct PersistenceBridge<U: Uploader, S: SettingsStore> {
    uploader: Arc<U>,
    registry: SettingsRegistry<S>,
    node_key: String,
    next_seq: u64,
    latest: Option<CommitSeq>,
    uploaded: Option<ImageRef>,
    default_ref: Option<ImageRef>,
}

impl<U: Uploader + 'static, S: SettingsStore + 'static> PersistenceBridge<U, S> {
    pub fn new(uploader: Arc<U>, store: Arc<S>, node_key: impl Into<String>) -> Self {
        Self {
            uploader,
            registry: SettingsRegistry::open(store),
            node_key: node_key.into(),
            next_seq: 0,
            latest: None,
            uploaded: None,
            default_ref: None,
        }
    }

    pub fn node_key(&self) -> &str {
        &self.node_key
    }

    /// Externally supplied default for the backing image reference.
    pub fn set_default_ref(&mut self, default: Option<ImageRef>) {
        self.default_ref = default;
    }

    /// Current backing image reference, preferring an uploaded value over
    /// the external default.
    pub fn current_ref(&self) -> Option<String> {
        self.uploaded
            .as_ref()
            .or(self.default_ref.as_ref())
            .map(normalize_image_ref)
    }

    /// Start uploading a rasterized frame. Stamps the next sequence number
    /// and makes it the latest issued.
    pub fn begin_commit(&mut self, bytes: Vec<u8>) -> PendingCommit {
        self.next_seq += 1;
        let seq = CommitSeq(self.next_seq);
        self.latest = Some(seq);
        let request = UploadRequest {
            name: self.node_key.clone(),
            bytes,
            overwrite: true,
        };
        let uploader = Arc::clone(&self.uploader);
        PendingCommit {
            seq,
            upload: Box::pin(async move { uploader.upload(request).await }),
        }
    }

    /// Apply a completed upload.
    ///
    /// Stale responses (a newer commit was issued) are discarded. Transport
    /// errors are logged only; the previous image reference stays intact.
    /// Rejected uploads are returned as errors for the host to surface.
    pub fn finish_commit(
        &mut self,
        seq: CommitSeq,
        result: Result<UploadResponse, UploadError>,
    ) -> Result<CommitOutcome, CommitError> {
        if self.latest != Some(seq) {
            log::debug!("discarding stale commit response (seq {:?})", seq);
            return Ok(CommitOutcome::Stale);
        }
        match result {
            Ok(response) => {
                self.uploaded = Some(ImageRef::Plain(response.name.clone()));
                Ok(CommitOutcome::Applied(response.name))
            }
            Err(UploadError::Rejected { status, message }) => {
                Err(CommitError::UploadRejected { status, message })
            }
            Err(UploadError::Transport(error)) => {
                log::warn!("upload transport error, keeping previous frame: {error}");
                Ok(CommitOutcome::TransportFailed)
            }
        }
    }

    /// Stage the settings for this node; written out by [`Self::flush`].
    pub fn stage_settings(&mut self, settings: PersistedSettings) {
        self.registry.insert(self.node_key.clone(), settings);
    }

    /// Write the staged settings to the backing store.
    pub fn flush(&self) -> BoxFuture<'static, SettingsResult<()>> {
        self.registry.flush(&self.node_key)
    }

    /// Read this node's persisted settings from the backing store.
    pub fn load_settings(&mut self) -> BoxFuture<'_, SettingsResult<PersistedSettings>> {
        let key = self.node_key.clone();
        self.registry.load(&key)
    }

    /// Flush everything and drop the registry. Called when the editing
    /// surface is disposed.
    pub fn close(self) -> BoxFuture<'static, SettingsResult<()>> {
        self.registry.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneSnapshot;
    use crate::settings::tests::block_on;
    use crate::settings::MemorySettings;
    use std::sync::Mutex;

    /// Uploader stub serving scripted responses in arrival order.
    struct ScriptedUploader {
        responses: Mutex<Vec<Result<UploadResponse, UploadError>>>,
    }

    impl ScriptedUploader {
        fn new(responses: Vec<Result<UploadResponse, UploadError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        fn ok(name: &str) -> Result<UploadResponse, UploadError> {
            Ok(UploadResponse {
                name: name.to_string(),
            })
        }
    }

    impl Uploader for ScriptedUploader {
        fn upload(
            &self,
            _request: UploadRequest,
        ) -> BoxFuture<'_, Result<UploadResponse, UploadError>> {
            let mut responses = self.responses.lock().unwrap();
            let response = if responses.is_empty() {
                Err(UploadError::Transport("script exhausted".into()))
            } else {
                responses.remove(0)
            };
            Box::pin(async move { response })
        }
    }

    fn bridge(
        responses: Vec<Result<UploadResponse, UploadError>>,
    ) -> PersistenceBridge<ScriptedUploader, MemorySettings> {
        PersistenceBridge::new(
            Arc::new(ScriptedUploader::new(responses)),
            Arc::new(MemorySettings::new()),
            "painter_node_1",
        )
    }

    #[test]
    fn test_normalize_image_ref() {
        assert_eq!(
            normalize_image_ref(&ImageRef::Plain("frame.png".into())),
            "frame.png"
        );
        assert_eq!(
            normalize_image_ref(&ImageRef::Structured {
                filename: "frame.png".into(),
                subfolder: Some("painter".into()),
                kind: Some("temp".into()),
            }),
            "painter/frame.png [temp]"
        );
        assert_eq!(
            normalize_image_ref(&ImageRef::Structured {
                filename: "frame.png".into(),
                subfolder: None,
                kind: Some("input".into()),
            }),
            "frame.png"
        );
    }

    #[test]
    fn test_uploaded_ref_preferred_over_default() {
        let mut bridge = bridge(vec![ScriptedUploader::ok("uploaded.png")]);
        bridge.set_default_ref(Some(ImageRef::Plain("default.png".into())));
        assert_eq!(bridge.current_ref().as_deref(), Some("default.png"));

        let pending = bridge.begin_commit(vec![1, 2, 3]);
        let result = block_on(pending.upload);
        bridge.finish_commit(pending.seq, result).unwrap();
        assert_eq!(bridge.current_ref().as_deref(), Some("uploaded.png"));
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut bridge = bridge(vec![
            ScriptedUploader::ok("late-commit.png"),
            ScriptedUploader::ok("early-commit.png"),
        ]);

        let first = bridge.begin_commit(vec![1]);
        let second = bridge.begin_commit(vec![2]);

        // The second (later-initiated) commit completes first and wins.
        let second_result = block_on(second.upload);
        assert_eq!(
            bridge.finish_commit(second.seq, second_result).unwrap(),
            CommitOutcome::Applied("late-commit.png".to_string())
        );

        // The first commit straggles in afterwards and is discarded.
        let first_result = block_on(first.upload);
        assert_eq!(
            bridge.finish_commit(first.seq, first_result).unwrap(),
            CommitOutcome::Stale
        );
        assert_eq!(bridge.current_ref().as_deref(), Some("late-commit.png"));
    }

    #[test]
    fn test_transport_error_keeps_previous_ref() {
        let mut bridge = bridge(vec![
            ScriptedUploader::ok("good.png"),
            Err(UploadError::Transport("connection reset".into())),
        ]);

        let first = bridge.begin_commit(vec![1]);
        let result = block_on(first.upload);
        bridge.finish_commit(first.seq, result).unwrap();
        assert_eq!(bridge.current_ref().as_deref(), Some("good.png"));

        let second = bridge.begin_commit(vec![2]);
        let result = block_on(second.upload);
        assert_eq!(
            bridge.finish_commit(second.seq, result).unwrap(),
            CommitOutcome::TransportFailed
        );
        assert_eq!(bridge.current_ref().as_deref(), Some("good.png"));
    }

    #[test]
    fn test_rejected_upload_surfaces_error() {
        let mut bridge = bridge(vec![Err(UploadError::Rejected {
            status: 500,
            message: "Internal Server Error".into(),
        })]);
        let pending = bridge.begin_commit(vec![1]);
        let result = block_on(pending.upload);
        assert!(matches!(
            bridge.finish_commit(pending.seq, result),
            Err(CommitError::UploadRejected { status: 500, .. })
        ));
        assert_eq!(bridge.current_ref(), None);
    }

    #[test]
    fn test_settings_staged_and_flushed() {
        let store = Arc::new(MemorySettings::new());
        let mut bridge = PersistenceBridge::new(
            Arc::new(ScriptedUploader::new(vec![])),
            Arc::clone(&store),
            "node_2",
        );
        bridge.stage_settings(PersistedSettings {
            scene: SceneSnapshot::from_raw("{}".to_string()),
            canvas_size: CanvasSize::default(),
        });
        block_on(bridge.flush()).unwrap();
        assert!(block_on(store.exists("node_2")).unwrap());
    }
}
