//! Wire types for the Argus API endpoints.
//!
//! Field names follow the API's Portuguese JSON keys. Call records are kept
//! opaque beyond their identity: everything except `idLigacao` is carried in
//! a flattened map so the CSV sink can emit whatever metadata the API sent.

use serde::{Deserialize, Serialize};

/// A campaign from the catalog, deduplicated by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    /// Campaign identity.
    pub id: i64,
    /// Display name, used for the output directory.
    pub name: String,
}

/// One skill entry from `/cmd/skills`. The catalog may list the same
/// campaign several times under different skills.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillItem {
    /// Campaign id this skill belongs to.
    pub id_campanha: i64,
    /// Campaign display name.
    #[serde(default)]
    pub descricao_campanha: String,
}

/// Response from the campaign-catalog endpoint `/cmd/skills`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsResponse {
    /// Application status; `1` means success.
    pub cod_status: i64,
    /// Human-readable status message.
    #[serde(default)]
    pub desc_status: String,
    /// Skill entries, absent on error responses.
    #[serde(default)]
    pub retorno_get_skills_itens: Vec<SkillItem>,
}

/// One call record from `/report/ligacoesdetalhadas`.
///
/// Only the call id is typed; the remaining metadata is preserved verbatim
/// for the output sink. Immutable once fetched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallRecord {
    /// Call identity.
    #[serde(rename = "idLigacao")]
    pub id: i64,
    /// Remaining metadata as returned by the API.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl CallRecord {
    /// Looks up a metadata field as display text (empty when absent or null).
    #[must_use]
    pub fn detail_text(&self, key: &str) -> String {
        match self.details.get(key) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Response from the call-listing endpoint `/report/ligacoesdetalhadas`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsPageResponse {
    /// Application status; `1` means success.
    pub cod_status: i64,
    /// Human-readable status message.
    #[serde(default)]
    pub desc_status: String,
    /// Number of records in this page.
    #[serde(default)]
    pub qtde_registros: i64,
    /// Cursor for the next page.
    #[serde(default)]
    pub id_prox_pagina: i64,
    /// Whether this is the last page.
    #[serde(default)]
    pub end_of_table: bool,
    /// The call records in this page.
    #[serde(default)]
    pub ligacoes_detalhadas: Vec<CallRecord>,
}

/// JSON error envelope returned by the recording endpoint when no audio
/// body is available.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Application status; `-6` means the recording does not exist.
    pub cod_status: i64,
    /// Human-readable status message.
    #[serde(default)]
    pub desc_status: String,
}
