//! Campaign catalog fetch with dedup.

use std::collections::HashSet;

use tracing::{error, info, instrument};

use crate::api::{ApiError, ArgusClient, Campaign};

/// Fetches the full campaign catalog, deduplicated by campaign id.
///
/// The catalog lists one entry per skill, so the same campaign can appear
/// several times; the first occurrence wins and first-seen order is kept.
///
/// Any failure degrades to an empty catalog: an application-level error
/// status or a transport failure is logged and an empty vec returned. There
/// is no retry here - the caller treats "no campaigns" as terminal for the
/// run.
#[instrument(skip(client))]
pub async fn fetch_all_campaigns(client: &ArgusClient) -> Vec<Campaign> {
    info!("fetching campaign catalog");
    match client.fetch_skills().await {
        Ok(response) => {
            if response.cod_status != 1 {
                let err = ApiError::application(
                    "/cmd/skills",
                    response.cod_status,
                    response.desc_status,
                );
                error!(error = %err, "campaign catalog returned an error status");
                return Vec::new();
            }

            let mut seen = HashSet::new();
            let campaigns: Vec<Campaign> = response
                .retorno_get_skills_itens
                .into_iter()
                .filter(|skill| seen.insert(skill.id_campanha))
                .map(|skill| Campaign {
                    id: skill.id_campanha,
                    name: skill.descricao_campanha,
                })
                .collect();
            info!(count = campaigns.len(), "campaign catalog fetched");
            campaigns
        }
        Err(e) => {
            error!(error = %e, "campaign catalog request failed");
            Vec::new()
        }
    }
}
