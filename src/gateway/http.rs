//! HTTP gateway against the messenger and compute units.
//!
//! Signed items POST to the messenger unit; dry-runs and message results go
//! to the compute unit. Protocol tags (`Data-Protocol`, `Variant`, `Type`,
//! `SDK`) are appended here, beneath the dispatcher seam, so callers only
//! ever see their own tag order.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{ActionResult, Gateway, SpawnRequest};
use crate::ans104::{self, SignedItem};
use crate::tags::Tag;
use crate::types::{Error, MessageId, ProcessId, Result};
use crate::wallet::Signer;

/// Per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 60;

const DATA_PROTOCOL: &str = "ao";
const VARIANT: &str = "ao.TN.1";
const SDK: &str = "ao-deploy";

/// HTTP client for one messenger unit and one compute unit.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    mu_url: String,
    cu_url: String,
}

/// Dry-run message body. Id/Owner are placeholders: the compute unit only
/// evaluates, it never persists this item.
#[derive(Serialize)]
struct DryRunBody<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "Target")]
    target: &'a str,
    #[serde(rename = "Owner")]
    owner: &'a str,
    #[serde(rename = "Anchor")]
    anchor: &'a str,
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(rename = "Tags")]
    tags: &'a [Tag],
}

impl HttpGateway {
    pub fn new(mu_url: impl Into<String>, cu_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            mu_url: mu_url.into().trim_end_matches('/').to_string(),
            cu_url: cu_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// POST a signed item to the messenger unit.
    async fn submit(&self, item: &SignedItem) -> Result<()> {
        let url = format!("{}/", self.mu_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::ACCEPT, "application/json")
            .body(item.bytes.clone())
            .send()
            .await?;
        Self::read_success(response, "messenger unit").await?;
        Ok(())
    }

    /// Read a message's evaluation result from the compute unit.
    async fn fetch_result(
        &self,
        message_id: &MessageId,
        process_id: &ProcessId,
    ) -> Result<ActionResult> {
        let url = format!(
            "{}/result/{}?process-id={}",
            self.cu_url, message_id, process_id
        );
        let response = self.client.get(&url).send().await?;
        let body = Self::read_success(response, "compute unit").await?;
        serde_json::from_str(&body)
            .map_err(|err| Error::gateway(format!("compute unit returned malformed result: {err}")))
    }

    async fn read_success(response: reqwest::Response, unit: &str) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::gateway(format!(
                "{unit} returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn spawn(&self, request: SpawnRequest<'_>, signer: &dyn Signer) -> Result<ProcessId> {
        let mut tags = request.tags.to_vec();
        tags.push(Tag::new("Data-Protocol", DATA_PROTOCOL));
        tags.push(Tag::new("Variant", VARIANT));
        tags.push(Tag::new("Type", "Process"));
        tags.push(Tag::new("Module", request.module.as_str()));
        tags.push(Tag::new("Scheduler", request.scheduler));
        tags.push(Tag::new("SDK", SDK));

        let item = ans104::sign_item(signer, None, &tags, request.data.as_bytes())?;
        self.submit(&item).await?;
        ProcessId::from_string(item.id.as_str().to_string()).map_err(Error::transport)
    }

    async fn message(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
        signer: &dyn Signer,
    ) -> Result<(MessageId, ActionResult)> {
        let mut tags = tags.to_vec();
        tags.push(Tag::new("Data-Protocol", DATA_PROTOCOL));
        tags.push(Tag::new("Variant", VARIANT));
        tags.push(Tag::new("Type", "Message"));
        tags.push(Tag::new("SDK", SDK));

        let item = ans104::sign_item(
            signer,
            Some(target.as_str()),
            &tags,
            data.unwrap_or_default().as_bytes(),
        )?;
        self.submit(&item).await?;
        let result = self.fetch_result(&item.id, target).await?;
        Ok((item.id, result))
    }

    async fn dry_run(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
    ) -> Result<ActionResult> {
        let url = format!("{}/dry-run?process-id={}", self.cu_url, target);
        let body = DryRunBody {
            id: "1234",
            target: target.as_str(),
            owner: "1234",
            anchor: "0",
            data,
            tags,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let body = Self::read_success(response, "compute unit").await?;
        serde_json::from_str(&body).map_err(|err| {
            Error::gateway(format!("compute unit returned malformed dry-run result: {err}"))
        })
    }
}
