//! Cursor pagination over call records.
//!
//! The call-listing endpoint pages by id: each response carries the cursor
//! for the next page (`idProxPagina`) and an `endOfTable` flag. The loop is
//! an explicit two-state machine so the termination conditions stay
//! auditable in one place.

use tracing::{debug, error, info, instrument};

use crate::api::{ApiError, ArgusClient, CallRecord};
use crate::chunk::DateChunk;

/// Pagination state: either another page to request, or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    /// Request the next page with this cursor.
    More(i64),
    /// Pagination exhausted (or abandoned after a failure).
    Done,
}

/// Fetches all call records for one campaign within one date chunk.
///
/// Pagination advances while the API reports more pages (`!endOfTable`) and
/// hands back a strictly increasing positive cursor; a non-advancing cursor
/// ends the loop so no page is ever re-requested.
///
/// A non-1 application status or an empty page ends pagination. A transport
/// failure also ends pagination immediately - there is no retry at this
/// layer - and the records accumulated so far are still returned. Known
/// limitation: a partial result after a mid-stream failure is not
/// distinguishable from a complete-but-empty period; the failure is logged
/// but not signalled to the caller.
#[instrument(skip(client, chunk), fields(start = %chunk.start_param(), end = %chunk.end_param()))]
pub async fn fetch_all_calls(
    client: &ArgusClient,
    campaign_id: i64,
    chunk: &DateChunk,
) -> Vec<CallRecord> {
    let start = chunk.start_param();
    let end = chunk.end_param();
    let mut calls = Vec::new();
    let mut state = PageState::More(0);

    info!(campaign_id, "fetching call records for period");

    loop {
        let cursor = match state {
            PageState::More(cursor) => cursor,
            PageState::Done => break,
        };

        match client
            .fetch_calls_page(campaign_id, &start, &end, cursor)
            .await
        {
            Ok(page) => {
                if page.cod_status == 1 && !page.ligacoes_detalhadas.is_empty() {
                    debug!(
                        page_records = page.qtde_registros,
                        total = calls.len() + page.ligacoes_detalhadas.len(),
                        "fetched call page"
                    );
                    calls.extend(page.ligacoes_detalhadas);
                    let next = page.id_prox_pagina;
                    state = if !page.end_of_table && next > cursor {
                        PageState::More(next)
                    } else {
                        PageState::Done
                    };
                } else {
                    if page.cod_status != 1 {
                        let err = ApiError::application(
                            "/report/ligacoesdetalhadas",
                            page.cod_status,
                            page.desc_status,
                        );
                        error!(campaign_id, error = %err, "call listing returned an error status");
                    }
                    state = PageState::Done;
                }
            }
            Err(e) => {
                // No further data available for this chunk; partial results stand.
                error!(campaign_id, error = %e, "call listing request failed");
                state = PageState::Done;
            }
        }
    }

    info!(campaign_id, count = calls.len(), "call records fetched");
    calls
}
