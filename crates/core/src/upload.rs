use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rag_explorer_backend::{Backend, Document};

use crate::client::BackendClient;
use crate::error::{UploadError, display_message};

/// The confirmation shown when the backend doesn't send one.
pub const UPLOADED_MESSAGE: &str = "Uploaded successfully.";

/// The error shown when an upload fails without any usable message.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed.";

/// A successfully ingested document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UploadReceipt {
    /// The name of the uploaded file.
    pub file_name: String,
    /// The confirmation to show.
    pub message: String,
}

#[derive(Default)]
struct UploadState {
    selected: Option<Document>,
    busy: bool,
}

type UploadedFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Uploads one selected file at a time.
///
/// Clones share the selection and the busy flag.
#[derive(Clone)]
pub struct Uploader {
    client: BackendClient,
    state: Arc<Mutex<UploadState>>,
    on_uploaded: Option<UploadedFn>,
}

impl Uploader {
    /// Creates an uploader for the specified backend.
    #[inline]
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self::with_client(BackendClient::new(backend))
    }

    /// Creates an uploader sharing an existing client.
    #[inline]
    pub fn with_client(client: BackendClient) -> Self {
        Self {
            client,
            state: Default::default(),
            on_uploaded: None,
        }
    }

    /// Attaches a callback to be invoked with the confirmation message
    /// after every successful upload.
    #[inline]
    pub fn on_uploaded(
        mut self,
        on_uploaded: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_uploaded = Some(Arc::new(on_uploaded));
        self
    }

    /// Selects the file to upload next, replacing any previous selection.
    pub fn select_file(&self, doc: Document) {
        debug!("selected {} ({} bytes)", doc.file_name(), doc.len());
        self.lock_state().selected = Some(doc);
    }

    /// Drops the current selection.
    #[inline]
    pub fn clear_selection(&self) {
        self.lock_state().selected = None;
    }

    /// Returns the name of the selected file.
    pub fn selected_file(&self) -> Option<String> {
        self.lock_state()
            .selected
            .as_ref()
            .map(|doc| doc.file_name().to_owned())
    }

    /// Returns `true` while an upload is in progress.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    /// Uploads the selected file.
    ///
    /// Whatever the outcome, the selection is cleared and the uploader is
    /// no longer busy once this returns (or is dropped).
    #[inline]
    pub async fn submit(&self) -> Result<UploadReceipt, UploadError> {
        self.upload(None).await
    }

    /// Selects `doc` and uploads it in one step.
    ///
    /// Unlike [`select_file`](Self::select_file) followed by
    /// [`submit`](Self::submit), the selection is left untouched when
    /// another upload is still in progress.
    #[inline]
    pub async fn upload_file(
        &self,
        doc: Document,
    ) -> Result<UploadReceipt, UploadError> {
        self.upload(Some(doc)).await
    }

    async fn upload(
        &self,
        doc: Option<Document>,
    ) -> Result<UploadReceipt, UploadError> {
        let doc = {
            let mut state = self.lock_state();
            if state.busy {
                return Err(UploadError::Busy);
            }
            if let Some(doc) = doc {
                state.selected = Some(doc);
            }
            let Some(doc) = state.selected.clone() else {
                return Err(UploadError::NoFileSelected);
            };
            state.busy = true;
            doc
        };
        let _guard = BusyGuard(&self.state);

        let file_name = doc.file_name().to_owned();
        match self.client.upload_document(doc).await {
            Ok(resp) => {
                let message = resp
                    .message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| UPLOADED_MESSAGE.to_owned());
                info!("uploaded {file_name}: {message}");
                if let Some(on_uploaded) = &self.on_uploaded {
                    on_uploaded(&message);
                }
                Ok(UploadReceipt { file_name, message })
            }
            Err(err) => {
                let detail = display_message(&*err, UPLOAD_FAILED_MESSAGE);
                warn!("failed to upload {file_name}: {detail}");
                Err(UploadError::TransportFailure(detail))
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, UploadState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<UploadState>) -> MutexGuard<'_, UploadState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the uploader when an upload settles.
struct BusyGuard<'a>(&'a Mutex<UploadState>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.0);
        state.busy = false;
        state.selected = None;
    }
}
