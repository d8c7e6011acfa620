/// Typed client for the relayer HTTP API
use async_trait::async_trait;
use rewards_ledger::{ActionId, Address, Amount, BadgeId, EventRecord, Role};
use rewards_network::{Config, NetworkError, RelayHttpClient};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    AccountResponse, ActionStatus, AuthorizeMintRequest, BadgeMintRequest, ErrorBody,
    HealthResponse, InfoResponse, PauseRequest, PendingStatus, PointsAward, PointsBalance,
    RateBody, Receipt, ReconcileRequest, ReconcileResponse, RedeemCheck, RelayMintRequest,
    RelayMintResponse, RoleRequest, TriggerResponse,
};
use crate::error::{Result, SdkError};
use crate::submission::Bundler;

pub struct RelayerClient {
    http: RelayHttpClient,
}

impl RelayerClient {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            http: RelayHttpClient::new(config)?,
        })
    }

    pub fn connect(base_url: &str) -> Result<Self> {
        Self::new(Config::default().with_base_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.http.config().base_url
    }

    pub fn config(&self) -> &Config {
        self.http.config()
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    pub async fn info(&self) -> Result<InfoResponse> {
        self.get("/info").await
    }

    pub async fn relay_mint(&self, request: &RelayMintRequest) -> Result<RelayMintResponse> {
        self.post("/mint/relay", request).await
    }

    /// Ask the relayer to sign and relay with its own signer key
    pub async fn authorize_mint(&self, to: Address, amount: Amount) -> Result<RelayMintResponse> {
        self.post("/mint/authorize", &AuthorizeMintRequest { to, amount })
            .await
    }

    pub async fn action_status(&self, action_id: &ActionId) -> Result<ActionStatus> {
        self.get(&format!("/actions/{}", action_id)).await
    }

    /// `None` while the relayer has no receipt for `tx_hash`
    pub async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>> {
        match self.http.get_json(&format!("/receipts/{}", tx_hash)).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(NetworkError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(into_sdk_error(e)),
        }
    }

    pub async fn reconcile(&self, users: &[Address], points: &[Amount]) -> Result<ReconcileResponse> {
        let request = ReconcileRequest {
            users: users.to_vec(),
            points: points.to_vec(),
        };
        self.post("/reconcile", &request).await
    }

    pub async fn reconcile_status(&self) -> Result<PendingStatus> {
        self.get("/reconcile/status").await
    }

    pub async fn trigger_reconcile(&self) -> Result<TriggerResponse> {
        self.post("/reconcile/trigger", &()).await
    }

    pub async fn award_points(&self, user: Address, points: Amount) -> Result<PointsBalance> {
        self.post("/points", &PointsAward { user, points }).await
    }

    pub async fn account(&self, address: &Address) -> Result<AccountResponse> {
        self.get(&format!("/accounts/{}", address)).await
    }

    pub async fn can_redeem(&self, user: &Address, amount: Amount) -> Result<RedeemCheck> {
        self.get(&format!("/redeem/check/{}/{}", user, amount)).await
    }

    pub async fn rate(&self) -> Result<Amount> {
        let body: RateBody = self.get("/rate").await?;
        Ok(body.rate)
    }

    pub async fn set_rate(&self, rate: Amount) -> Result<Amount> {
        let body: RateBody = self.post("/admin/rate", &RateBody { rate }).await?;
        Ok(body.rate)
    }

    pub async fn pause(&self, reason: Option<String>) -> Result<InfoResponse> {
        self.post("/admin/pause", &PauseRequest { reason }).await
    }

    pub async fn unpause(&self) -> Result<InfoResponse> {
        self.post("/admin/unpause", &PauseRequest::default()).await
    }

    pub async fn grant_role(&self, role: Role, account: Address) -> Result<Receipt> {
        self.post("/admin/roles/grant", &RoleRequest { role, account })
            .await
    }

    pub async fn revoke_role(&self, role: Role, account: Address) -> Result<Receipt> {
        self.post("/admin/roles/revoke", &RoleRequest { role, account })
            .await
    }

    pub async fn mint_badge(
        &self,
        to: Address,
        id: BadgeId,
        amount: Amount,
        soulbound: bool,
    ) -> Result<Receipt> {
        let request = BadgeMintRequest {
            to,
            id,
            amount,
            soulbound,
        };
        self.post("/badges/mint", &request).await
    }

    pub async fn events_since(&self, since: u64) -> Result<Vec<EventRecord>> {
        self.get(&format!("/events?since={}", since)).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.http.get_json(path).await.map_err(into_sdk_error)
    }

    async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        self.http.post_json(path, body).await.map_err(into_sdk_error)
    }
}

/// 4xx responses carrying the relayer's error body are ledger rejections;
/// everything else stays a transport error
fn into_sdk_error(err: NetworkError) -> SdkError {
    if let NetworkError::Http { status, body } = &err {
        if (400..500).contains(status) {
            if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
                return SdkError::Rejected {
                    kind: parsed.kind,
                    message: parsed.error,
                };
            }
        }
    }
    SdkError::Network(err)
}

#[async_trait]
impl Bundler for RelayerClient {
    async fn submit_relay_mint(&self, request: &RelayMintRequest) -> Result<Receipt> {
        Ok(self.relay_mint(request).await?.receipt)
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>> {
        RelayerClient::receipt(self, tx_hash).await
    }

    async fn action_status(&self, action_id: &ActionId) -> Result<ActionStatus> {
        RelayerClient::action_status(self, action_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_body_becomes_rejected() {
        let err = into_sdk_error(NetworkError::Http {
            status: 409,
            body: r#"{"success":false,"error":"Authorization already used","kind":"AuthorizationReplayed"}"#
                .into(),
        });
        assert_eq!(err.rejection_kind(), Some("AuthorizationReplayed"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_stay_retryable() {
        let err = into_sdk_error(NetworkError::Http {
            status: 503,
            body: r#"{"success":false,"error":"no signer","kind":"SignerUnavailable"}"#.into(),
        });
        assert!(matches!(err, SdkError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unparseable_client_error_is_network_error() {
        let err = into_sdk_error(NetworkError::Http {
            status: 400,
            body: "bad request".into(),
        });
        assert!(matches!(err, SdkError::Network(_)));
    }
}
