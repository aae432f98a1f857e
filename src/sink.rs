//! Filesystem outcome sink: MP3 artifacts, per-campaign CSV, durable logs.
//!
//! One sink instance serves one campaign. Artifacts are uniquely named per
//! call so concurrent workers never contend on a file; the CSV and the two
//! run-level logs are append-only and guarded by per-file mutexes so each
//! line lands whole. The sink never fails the pipeline - every I/O error is
//! logged and swallowed.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::api::{CallRecord, Campaign};
use crate::report::CURL_LOG_FILE;
use crate::scheduler::{OutcomeKind, OutcomeSink};

/// Log of terminally failed downloads.
pub const FAILED_LOG_FILE: &str = "downloads_falhos.txt";

/// Log of calls with no recording available.
pub const NOT_FOUND_LOG_FILE: &str = "gravacoes_nao_encontradas.txt";

/// Per-campaign call-details CSV.
pub const CALL_DETAILS_CSV: &str = "detalhes_ligacoes.csv";

/// CSV metadata columns, in the order the API documents them. The download
/// status column is appended at the end of each row.
const CSV_COLUMNS: [&str; 30] = [
    "idLigacao",
    "dataHoraLigacao",
    "idTronco",
    "troncoDesc",
    "nrLead",
    "tipoAgendaLigacao",
    "tipoLigacao",
    "idStatusLigacao",
    "resultadoLigacao",
    "tempoSegundos",
    "telefone",
    "idLote",
    "lote",
    "idSkill",
    "skill",
    "nomeCliente",
    "dataImportacao",
    "cpfCnpj",
    "codCliente",
    "idGrupoUsuario",
    "grupoOrigem",
    "idUsuario",
    "usuarioOperador",
    "idPlanPopup",
    "statusAtendimento",
    "tipoAgenda",
    "idTabulacao",
    "tabulacao",
    "categoriaTabulacao",
    "historico",
];

/// Filesystem sink for one campaign's outcomes.
pub struct FsSink {
    campaign_dir: PathBuf,
    csv_path: PathBuf,
    not_found_path: PathBuf,
    failed_path: PathBuf,
    csv_lock: Mutex<()>,
    log_lock: Mutex<()>,
}

impl FsSink {
    /// Creates the campaign output directory under `output_root`, writes a
    /// fresh CSV header, and returns the sink.
    ///
    /// The run-level failure/not-found logs live directly under
    /// `output_root` and are shared across campaigns.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or CSV header cannot be created;
    /// without them no outcome could be persisted at all.
    #[instrument(skip(campaign), fields(campaign_id = campaign.id))]
    pub async fn create(output_root: &Path, campaign: &Campaign) -> io::Result<Self> {
        let campaign_dir = output_root.join(sanitize_campaign_name(&campaign.name));
        tokio::fs::create_dir_all(&campaign_dir).await?;

        let csv_path = campaign_dir.join(CALL_DETAILS_CSV);
        let mut header: Vec<&str> = CSV_COLUMNS.to_vec();
        header.push("StatusDownload");
        tokio::fs::write(&csv_path, format!("{}\n", header.join(","))).await?;

        info!(dir = %campaign_dir.display(), "campaign output directory ready");

        Ok(Self {
            campaign_dir,
            csv_path,
            not_found_path: output_root.join(NOT_FOUND_LOG_FILE),
            failed_path: output_root.join(FAILED_LOG_FILE),
            csv_lock: Mutex::new(()),
            log_lock: Mutex::new(()),
        })
    }

    /// The campaign's output directory.
    #[must_use]
    pub fn campaign_dir(&self) -> &Path {
        &self.campaign_dir
    }

    /// The destination path of one call's recording artifact.
    #[must_use]
    pub fn artifact_path(&self, campaign_id: i64, call_id: i64) -> PathBuf {
        self.campaign_dir
            .join(format!("gravacao_camp{campaign_id}_lig{call_id}.mp3"))
    }

    async fn append_log(&self, path: &Path, line: &str) {
        let _guard = self.log_lock.lock().await;
        if let Err(e) = append_line(path, line).await {
            warn!(path = %path.display(), error = %e, "could not append log entry");
        }
    }

    async fn append_csv_row(&self, call: &CallRecord, status: &str) {
        let mut fields = Vec::with_capacity(CSV_COLUMNS.len() + 1);
        fields.push(escape_csv_field(&call.id.to_string()));
        for key in CSV_COLUMNS.iter().skip(1) {
            fields.push(escape_csv_field(&call.detail_text(key)));
        }
        fields.push(escape_csv_field(status));
        let row = fields.join(",");

        let _guard = self.csv_lock.lock().await;
        if let Err(e) = append_line(&self.csv_path, &row).await {
            warn!(path = %self.csv_path.display(), error = %e, "could not append CSV row");
        }
    }
}

#[async_trait]
impl OutcomeSink for FsSink {
    async fn artifact_exists(&self, campaign_id: i64, call_id: i64) -> bool {
        tokio::fs::try_exists(self.artifact_path(campaign_id, call_id))
            .await
            .unwrap_or(false)
    }

    async fn record(&self, campaign_id: i64, call: &CallRecord, outcome: OutcomeKind) {
        match &outcome {
            OutcomeKind::Success(bytes) => {
                let path = self.artifact_path(campaign_id, call.id);
                if let Err(e) = tokio::fs::write(&path, bytes).await {
                    warn!(path = %path.display(), error = %e, "could not persist recording");
                }
            }
            OutcomeKind::NotFound => {
                self.append_log(
                    &self.not_found_path,
                    &format!("Campanha: {campaign_id}, Ligacao: {}", call.id),
                )
                .await;
            }
            OutcomeKind::Failed => {
                self.append_log(
                    &self.failed_path,
                    &format!("Campanha: {campaign_id}, Ligacao: {}", call.id),
                )
                .await;
            }
            OutcomeKind::Existing => {}
        }

        self.append_csv_row(call, outcome.label()).await;
    }
}

/// Removes the previous run's failure/not-found/diagnostic logs so each run
/// reports only its own events. Missing files are fine.
pub async fn reset_run_logs(output_root: &Path) {
    for name in [FAILED_LOG_FILE, NOT_FOUND_LOG_FILE, CURL_LOG_FILE] {
        let path = output_root.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not reset log"),
        }
    }
}

/// Turns a campaign display name into a safe directory name: ASCII
/// alphanumerics lowercased, everything else replaced by `_`.
#[must_use]
pub fn sanitize_campaign_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Quotes a CSV field when it contains a comma, quote, or newline,
/// doubling embedded quotes.
#[must_use]
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

async fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}
