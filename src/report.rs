//! Reproducible diagnostics for failed recording downloads.
//!
//! Every terminal transport failure gets a block in a durable log holding
//! the exact curl command that reproduces the failed request, so an
//! operator can replay it without the tool. The reporter is a pure
//! side-effecting sink: append failures are logged and swallowed, never
//! propagated into the pipeline.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

/// Default diagnostic log filename.
pub const CURL_LOG_FILE: &str = "falhas_com_curl.txt";

/// Appends curl-reproduction diagnostics for failed downloads.
pub struct FailureReporter {
    log_path: PathBuf,
    base_url: String,
    token: String,
    // Serializes appends so concurrent workers never interleave blocks.
    write_lock: Mutex<()>,
}

impl FailureReporter {
    /// Creates a reporter writing to `log_path`, reproducing requests
    /// against `base_url` with `token`.
    #[must_use]
    pub fn new(
        log_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            log_path: log_path.into(),
            base_url: base_url.into(),
            token: token.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The path of the diagnostic log.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Appends a diagnostic block for one failed download.
    ///
    /// `error_status` is the observed HTTP status, or `"N/A"` when the
    /// server never answered. Best-effort: an unwritable log is warned
    /// about and otherwise ignored.
    #[instrument(skip(self))]
    pub async fn report(&self, campaign_id: i64, call_id: i64, error_status: &str) {
        let body = format!(
            r#"{{"idCampanha":{campaign_id},"idLigacao":{call_id},"formato":"MP3"}}"#
        );
        let curl = format!(
            "curl -X POST \"{base}/cmd/downloadgravacao\" \
             -H \"Content-Type: application/json\" \
             -H \"Token-Signature: {token}\" -d '{body}'",
            base = self.base_url,
            token = self.token,
        );
        let block = format!(
            "\n-----------------------------------------\n\
             Falha ao baixar a ligacao ID: {call_id} (Campanha ID: {campaign_id})\n\
             Status do Erro: {error_status}\n\
             Comando cURL para reproduzir o erro:\n\
             {curl}\n\
             -----------------------------------------\n"
        );

        let _guard = self.write_lock.lock().await;
        if let Err(e) = append(&self.log_path, &block).await {
            warn!(path = %self.log_path.display(), error = %e, "could not append failure diagnostic");
        }
    }
}

async fn append(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}
