mod health;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use cosign_core::application::CoordinatorContext;
use cosign_core::domain::ChainRegistry;
use cosign_core::infrastructure::ledger::DevnetLedger;
use cosign_core::infrastructure::storage::MemoryStorage;
use cosign_service::api::{build_router, ApiState};
use cosign_service::service::metrics::Metrics;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const CHAIN_RID: &str = "0x9c1e7b3d5f2a4c6e8b0d1f3a5c7e9b2d4f6a8c0e1b3d5f7a9c2e4b6d8f0a1c3e";
pub const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";

/// A wallet as a browser client would hold it: signs with EIP-191 and reports its checksum-free address.
pub struct Wallet {
    secret: SecretKey,
    pub address: String,
}

impl Wallet {
    pub fn from_seed(seed: u8) -> Self {
        let secret = SecretKey::from_slice(&[seed; 32]).expect("secret key");
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret).serialize_uncompressed();
        let hash = Keccak256::digest(&public[1..]);
        Self { secret, address: format!("0x{}", hex::encode(&hash[12..])) }
    }

    pub fn sign(&self, message: &[u8]) -> Value {
        let mut hasher = Keccak256::new();
        hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
        hasher.update(message);
        let digest = Message::from_digest(hasher.finalize().into());
        let (recovery_id, compact) = Secp256k1::new().sign_ecdsa_recoverable(&digest, &self.secret).serialize_compact();
        json!({
            "r": format!("0x{}", hex::encode(&compact[..32])),
            "s": format!("0x{}", hex::encode(&compact[32..])),
            "v": 27 + recovery_id.to_i32(),
        })
    }

    pub fn signer_json(&self, name: &str) -> Value {
        json!({ "publicKey": self.address, "name": name })
    }
}

pub fn wallets(count: u8) -> Vec<Wallet> {
    (1..=count).map(Wallet::from_seed).collect()
}

pub struct TestApp {
    pub router: Router,
    pub ledger: Arc<DevnetLedger>,
    pub metrics: Arc<Metrics>,
}

pub fn test_app(token: Option<&str>) -> TestApp {
    test_app_with_chains(token, ChainRegistry::default())
}

pub fn test_app_with_chains(token: Option<&str>, chains: ChainRegistry) -> TestApp {
    let ledger = Arc::new(DevnetLedger::with_auto_fee());
    let metrics = Arc::new(Metrics::new().expect("metrics"));
    let ctx = CoordinatorContext::new(Arc::new(MemoryStorage::new()), ledger.clone(), Duration::from_secs(2))
        .with_observer(metrics.clone())
        .with_chains(chains);
    let state = ApiState::new(ctx, metrics.clone()).with_token(token.map(str::to_string));
    TestApp { router: build_router(Arc::new(state)), ledger, metrics }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let text = String::from_utf8_lossy(&bytes).to_string();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse { status, headers, text, body }
}

pub async fn call(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    send(&app.router, request).await
}

pub fn account_body(owners: &[Wallet], signatures_required: u16, creator: &Wallet) -> Value {
    let signers: Vec<Value> = owners.iter().enumerate().map(|(idx, w)| w.signer_json(&format!("owner-{}", idx))).collect();
    json!({
        "name": "vault",
        "signers": signers,
        "signaturesRequired": signatures_required,
        "userAddress": creator.address,
        "network": "testnet",
        "blockchainRid": CHAIN_RID,
    })
}

/// Creates, registers and executes the account over HTTP; returns the account record id.
pub async fn registered_account(app: &TestApp, owners: &[Wallet], signatures_required: u16) -> String {
    let created = call(app, "POST", "/multisig-accounts", Some(account_body(owners, signatures_required, &owners[0]))).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    let id = created.body["id"].as_str().expect("id").to_string();

    let fee = call(app, "POST", &format!("/multisig-accounts/{}/transfer-fee", id), None).await;
    assert_eq!(fee.body["status"], "transferFee", "{}", fee.text);

    let payload = format!("register:{}", id).into_bytes();
    let register = call(
        app,
        "POST",
        &format!("/multisig-accounts/{}/register", id),
        Some(json!({ "tx": hex::encode(&payload), "signature": owners[0].sign(&payload), "userAddress": owners[0].address })),
    )
    .await;
    assert_eq!(register.status, StatusCode::CREATED, "{}", register.text);
    let tx_id = register.body["id"].as_str().expect("tx id").to_string();

    for owner in &owners[1..] {
        let signed = call(
            app,
            "POST",
            &format!("/transactions/{}/sign", tx_id),
            Some(json!({ "signature": owner.sign(&payload), "userAddress": owner.address })),
        )
        .await;
        assert_eq!(signed.status, StatusCode::OK, "{}", signed.text);
    }

    let executed =
        call(app, "POST", &format!("/transactions/{}/execute", tx_id), Some(json!({ "userAddress": owners[0].address }))).await;
    assert_eq!(executed.body["status"], "completed", "{}", executed.text);
    id
}
