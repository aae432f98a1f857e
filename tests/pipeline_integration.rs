//! End-to-end test of the scheduler driving the filesystem sink: a second
//! run over the same period must skip everything already on disk.

use std::sync::Arc;
use std::time::Duration;

use argus_core::{
    ArgusClient, CallRecord, Campaign, DownloadScheduler, FailureReporter, FsSink, OutcomeSink,
    RecordingDownloader, RetryPolicy,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn calls(ids: impl IntoIterator<Item = i64>) -> Vec<CallRecord> {
    ids.into_iter()
        .map(|id| serde_json::from_value(json!({"idLigacao": id})).unwrap())
        .collect()
}

fn scheduler_for(server: &MockServer, temp: &TempDir) -> DownloadScheduler {
    let client = Arc::new(ArgusClient::new(server.uri(), "test-token"));
    let reporter = Arc::new(FailureReporter::new(
        temp.path().join("falhas_com_curl.txt"),
        client.base_url(),
        client.token(),
    ));
    let downloader = Arc::new(RecordingDownloader::new(
        client,
        RetryPolicy::new(3, Duration::from_millis(10)),
        reporter,
    ));
    DownloadScheduler::new(downloader, 2, Duration::from_millis(0)).unwrap()
}

#[tokio::test]
async fn test_rerun_skips_artifacts_downloaded_by_a_previous_run() {
    let temp = TempDir::new().unwrap();
    let campaign = Campaign {
        id: 10,
        name: "Cobranca".to_string(),
    };

    // First run: two recordings come down.
    {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cmd/downloadgravacao"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(b"mp3".to_vec()),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let sink = Arc::new(FsSink::create(temp.path(), &campaign).await.unwrap());
        let scheduler = scheduler_for(&mock_server, &temp);
        let stats = scheduler
            .run(10, calls([1, 2]), Arc::clone(&sink) as Arc<dyn OutcomeSink>)
            .await;

        assert_eq!(stats.success(), 2);
        assert!(sink.artifact_exists(10, 1).await);
        assert!(sink.artifact_exists(10, 2).await);
    }

    // Second run against a server that must not be called at all.
    {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cmd/downloadgravacao"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let sink = Arc::new(FsSink::create(temp.path(), &campaign).await.unwrap());
        let scheduler = scheduler_for(&mock_server, &temp);
        let stats = scheduler
            .run(10, calls([1, 2]), Arc::clone(&sink) as Arc<dyn OutcomeSink>)
            .await;

        assert_eq!(stats.existing(), 2);
        assert_eq!(stats.total(), 2);

        let csv = std::fs::read_to_string(sink.campaign_dir().join("detalhes_ligacoes.csv"))
            .unwrap();
        let statuses: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.rsplit(',').next().unwrap())
            .collect();
        assert_eq!(statuses, vec!["EXISTING", "EXISTING"]);
    }
}
