use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use stormarket::{
    api::{
        Env,
        error::ErrorResponse,
        handlers::{Info, JournalEntry},
        result::ResultResponse,
        router,
    },
    block::Block,
    config::Config,
    event::EventSubscriber,
    market::{Contract, Dispute, FileMetadata, PlatformStats, Provider},
    reactor,
    test_utils::{administrator, new_test_db},
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn create_test_server() -> Result<(TestServer, CancellationToken, TempDir)> {
    let (reader, writer, temp_dir) = new_test_db().await?;
    let cancel_token = CancellationToken::new();
    let (reactor, _) = reactor::run(administrator(), cancel_token.clone(), writer, None).await?;
    let env = Env {
        config: Config::new_na(temp_dir.path().to_path_buf()),
        cancel_token: cancel_token.clone(),
        reader,
        reactor,
        event_subscriber: EventSubscriber::new(),
    };
    Ok((TestServer::new(router::new(env))?, cancel_token, temp_dir))
}

fn purchase_block() -> Value {
    json!({
        "calls": [
            {
                "caller": "wallet_1",
                "op": {
                    "function": "register-provider",
                    "args": { "total-space": 1000, "price-per-gb": 50 }
                }
            },
            {
                "caller": "wallet_1",
                "op": {
                    "function": "create-listing",
                    "args": { "space-gb": 100, "price-per-gb": 45, "duration-days": 30 }
                }
            },
            {
                "caller": "wallet_2",
                "op": {
                    "function": "purchase-storage",
                    "args": { "listing-id": 1, "space-gb": 50 }
                }
            }
        ]
    })
}

#[tokio::test]
async fn test_post_block_and_query() -> Result<()> {
    let (server, _cancel_token, _temp_dir) = create_test_server().await?;

    let response = server.post("/api/blocks").json(&purchase_block()).await;
    response.assert_status_ok();
    let block = response.json::<ResultResponse<Block>>().result;
    assert_eq!(block.height, 1);
    assert_eq!(block.receipts.len(), 3);
    let raw: Value = response.json();
    assert_eq!(raw["result"]["receipts"][1]["result"], json!({ "ok": 1 }));

    let provider = server
        .get("/api/providers/wallet_1")
        .await
        .json::<ResultResponse<Provider>>()
        .result;
    assert_eq!(provider.available_space, 900);

    let contract = server
        .get("/api/contracts/1")
        .await
        .json::<ResultResponse<Contract>>()
        .result;
    assert_eq!(contract.total_price, 2250);
    assert_eq!(contract.platform_fee, 11);

    let stats = server
        .get("/api/stats")
        .await
        .json::<ResultResponse<PlatformStats>>()
        .result;
    assert_eq!(stats.total_listings, 1);
    assert_eq!(stats.total_contracts, 1);
    assert_eq!(stats.total_fees, 11);

    let latest = server
        .get("/api/blocks/latest")
        .await
        .json::<ResultResponse<Block>>()
        .result;
    assert_eq!(latest, block);
    let at_height = server
        .get("/api/blocks/1")
        .await
        .json::<ResultResponse<Block>>()
        .result;
    assert_eq!(at_height, block);

    let info = server.get("/api").await.json::<ResultResponse<Info>>().result;
    assert_eq!(info.height, 1);
    assert_eq!(info.administrator, administrator());
    Ok(())
}

#[tokio::test]
async fn test_failed_call_reports_code() -> Result<()> {
    let (server, _cancel_token, _temp_dir) = create_test_server().await?;
    server.post("/api/blocks").json(&purchase_block()).await;

    let response = server
        .post("/api/blocks")
        .json(&json!({
            "calls": [
                {
                    "caller": "wallet_3",
                    "op": { "function": "complete-contract", "args": { "contract-id": 1 } }
                },
                {
                    "caller": "wallet_2",
                    "op": {
                        "function": "create-dispute",
                        "args": { "contract-id": 1, "reason": "offline" }
                    }
                },
                {
                    "caller": "wallet_3",
                    "op": {
                        "function": "resolve-dispute",
                        "args": { "dispute-id": 1, "resolution": "refund" }
                    }
                },
                {
                    "caller": "wallet_2",
                    "op": {
                        "function": "store-file-metadata",
                        "args": {
                            "contract-id": 1,
                            "content-hash": "11".repeat(32),
                            "file-size": 2048,
                            "file-name": "backup.tar",
                            "encryption-key": "22".repeat(32)
                        }
                    }
                }
            ]
        }))
        .await;
    response.assert_status_ok();
    let raw: Value = response.json();
    let results: Vec<Value> = raw["result"]["receipts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["result"].clone())
        .collect();
    assert_eq!(
        results,
        vec![
            json!({ "err": 104 }),
            json!({ "ok": 1 }),
            json!({ "err": 104 }),
            json!({ "ok": 1 }),
        ]
    );

    let dispute = server
        .get("/api/disputes/1")
        .await
        .json::<ResultResponse<Dispute>>()
        .result;
    assert!(!dispute.is_resolved);

    let file = server
        .get("/api/files/1")
        .await
        .json::<ResultResponse<FileMetadata>>()
        .result;
    assert_eq!(file.file_name, "backup.tar");
    assert_eq!(file.content_hash, [0x11; 32]);

    let entries = server
        .get("/api/callers/wallet_3/receipts")
        .await
        .json::<ResultResponse<Vec<JournalEntry>>>()
        .result;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.height == 2 && !e.receipt.result.is_ok()));
    Ok(())
}

#[tokio::test]
async fn test_not_found_and_bad_request() -> Result<()> {
    let (server, _cancel_token, _temp_dir) = create_test_server().await?;

    let response = server.get("/api/listings/1").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error = response.json::<ErrorResponse>().error;
    assert!(error.contains("listing: 1"));

    server
        .get("/api/blocks/latest")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/blocks/5")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/providers/wallet_1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/blocks")
        .json(&json!({ "calls": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_stop_cancels() -> Result<()> {
    let (server, cancel_token, _temp_dir) = create_test_server().await?;
    server.get("/api/stop").await.assert_status_ok();
    assert!(cancel_token.is_cancelled());

    server
        .post("/api/blocks")
        .json(&purchase_block())
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn test_empty_caller_is_rejected() -> Result<()> {
    let (server, _cancel_token, _temp_dir) = create_test_server().await?;
    server
        .post("/api/blocks")
        .json(&json!({
            "calls": [
                {
                    "caller": "",
                    "op": {
                        "function": "register-provider",
                        "args": { "total-space": 1000, "price-per-gb": 50 }
                    }
                }
            ]
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .get("/api/blocks/latest")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let info = server.get("/api").await.json::<ResultResponse<Info>>().result;
    assert_eq!(info.height, 0);
    Ok(())
}

#[tokio::test]
async fn test_repeat_registration_is_unauthorized() -> Result<()> {
    let (server, _cancel_token, _temp_dir) = create_test_server().await?;
    let register = |total_space: u64, price_per_gb: u64| {
        json!({
            "caller": "wallet_1",
            "op": {
                "function": "register-provider",
                "args": { "total-space": total_space, "price-per-gb": price_per_gb }
            }
        })
    };
    let response = server
        .post("/api/blocks")
        .json(&json!({ "calls": [register(1000, 50), register(2000, 60)] }))
        .await;
    response.assert_status_ok();
    let raw: Value = response.json();
    assert_eq!(raw["result"]["receipts"][0]["result"], json!({ "ok": true }));
    assert_eq!(raw["result"]["receipts"][1]["result"], json!({ "err": 104 }));

    let provider = server
        .get("/api/providers/wallet_1")
        .await
        .json::<ResultResponse<Provider>>()
        .result;
    assert_eq!(provider.total_space, 1000);
    assert_eq!(provider.price_per_gb, 50);
    Ok(())
}
