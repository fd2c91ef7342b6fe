//! Attack Simulation Tests
//!
//! Hostile callers presenting capabilities the host never issued, altered
//! capabilities, capabilities for another document, and expired ones.
//! Every refusal must look identical from the outside.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{TestHost, TEST_SECRET};
use wopi_core::{Capability, CapabilityClaims, CapabilitySigner, Clock, FileId, Subject};
use wopi_host::{CapabilityEntry, CapabilityStore};

/// Unsigned token claiming `sample-document` until 2100
const ALG_NONE_TOKEN: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJmaWxlX2lkIjoic2FtcGxlLWRvY3VtZW50Iiwic3ViIjoiYW5vbnltb3VzIiwiaWF0IjoxNzAwMDAwMDAwLCJleHAiOjQxMDI0NDQ4MDAsIm5vbmNlIjoiMDAwMDAwMDAtMDAwMC00MDAwLTgwMDAtMDAwMDAwMDAwMDAwIn0.";

fn claims_for(host: &TestHost, file_id: &str) -> CapabilityClaims {
    CapabilityClaims::new(
        FileId::new(file_id),
        Subject::anonymous(),
        host.clock.now(),
        Duration::hours(1),
    )
}

/// Assert both protocol endpoints refuse `token` with the uniform 401 body
async fn assert_refused(host: &TestHost, file_id: &str, token: &str) -> Vec<u8> {
    let (status, _, meta_body) = host.get(&TestHost::metadata_uri(file_id, token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "metadata accepted {token}");

    let (status, _, content_body) = host.get(&TestHost::contents_uri(file_id, token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "contents accepted {token}");

    assert_eq!(meta_body, content_body);
    meta_body
}

#[tokio::test]
async fn test_garbage_token() {
    let host = TestHost::new();
    assert_refused(&host, "sample-document", "not-a-token").await;
    assert_refused(&host, "sample-document", "a.b.c").await;
}

#[tokio::test]
async fn test_token_signed_with_foreign_secret() {
    let host = TestHost::new();
    let forger = CapabilitySigner::new(b"attacker-controlled-secret-0123456789");
    let forged = forger.sign(&claims_for(&host, "sample-document")).unwrap();

    assert_refused(&host, "sample-document", forged.as_str()).await;
}

#[tokio::test]
async fn test_unsigned_token() {
    let host = TestHost::new();
    assert_refused(&host, "sample-document", ALG_NONE_TOKEN).await;
}

#[tokio::test]
async fn test_well_signed_but_never_issued() {
    // A leaked secret alone does not produce a usable capability
    let host = TestHost::new();
    let signer = CapabilitySigner::new(TEST_SECRET);
    let minted = signer.sign(&claims_for(&host, "sample-document")).unwrap();

    assert_refused(&host, "sample-document", minted.as_str()).await;
}

#[tokio::test]
async fn test_spliced_payload() {
    let host = TestHost::new();
    let genuine = host.access_token().await;

    let other = CapabilitySigner::new(TEST_SECRET)
        .sign(&claims_for(&host, "other-document"))
        .unwrap();

    // Genuine header and signature around a different payload
    let parts: Vec<&str> = genuine.split('.').collect();
    let other_payload = other.as_str().split('.').nth(1).unwrap();
    let spliced = format!("{}.{}.{}", parts[0], other_payload, parts[2]);

    assert_refused(&host, "sample-document", &spliced).await;
    assert_refused(&host, "other-document", &spliced).await;
}

#[tokio::test]
async fn test_flipped_signature_character() {
    let host = TestHost::new();
    let genuine = host.access_token().await;

    let mut bytes = genuine.clone().into_bytes();
    let last = bytes.len() - 2;
    bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert_refused(&host, "sample-document", &tampered).await;

    // The genuine capability is unaffected
    let (status, _) = host.get_json(&TestHost::metadata_uri("sample-document", &genuine)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_capability_for_another_file() {
    let host = TestHost::new();

    // A genuinely issued capability bound to a different document
    let now = host.clock.now();
    let claims = claims_for(&host, "other-document");
    let token = CapabilitySigner::new(TEST_SECRET).sign(&claims).unwrap();
    host.store
        .put(
            token.clone(),
            CapabilityEntry {
                file_id: FileId::new("other-document"),
                subject: Subject::anonymous(),
                created_at: now,
                expires_at: now + Duration::hours(1),
            },
        )
        .await
        .unwrap();

    // Refused against the served document, before any document lookup
    assert_refused(&host, "sample-document", token.as_str()).await;

    // Against its own id it validates, and only then is the document missing
    let (status, body) = host.get_json(&TestHost::metadata_uri("other-document", token.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_served_capability_against_unknown_path() {
    // Mismatch wins over a missing document: no existence oracle
    let host = TestHost::new();
    let token = host.access_token().await;

    assert_refused(&host, "secret-payroll", &token).await;
    assert_refused(&host, "sample-document%2F..%2Fother", &token).await;
}

#[tokio::test]
async fn test_replay_after_expiry() {
    let host = TestHost::new();
    let token = host.access_token().await;

    let (status, _) = host.get_json(&TestHost::metadata_uri("sample-document", &token)).await;
    assert_eq!(status, StatusCode::OK);

    host.clock.advance(Duration::hours(1) + Duration::seconds(1));
    assert_refused(&host, "sample-document", &token).await;

    // Rewinding the clock does not resurrect an evicted capability
    host.clock.advance(Duration::hours(-1));
    assert!(host.store.get(&Capability::new(token.clone())).await.unwrap().is_none());
    assert_refused(&host, "sample-document", &token).await;
}

#[tokio::test]
async fn test_refusals_are_indistinguishable() {
    let host = TestHost::new();

    let forged = CapabilitySigner::new(b"attacker-controlled-secret-0123456789")
        .sign(&claims_for(&host, "sample-document"))
        .unwrap();
    let forged_body = assert_refused(&host, "sample-document", forged.as_str()).await;

    let genuine = host.access_token().await;
    let mismatch_body = assert_refused(&host, "elsewhere", &genuine).await;

    host.clock.advance(Duration::hours(2));
    let expired_body = assert_refused(&host, "sample-document", &genuine).await;

    let missing = host.get("/wopi/files/sample-document").await.2;

    assert_eq!(forged_body, mismatch_body);
    assert_eq!(forged_body, expired_body);
    assert_eq!(forged_body, missing);
}

#[tokio::test]
async fn test_refusal_does_not_echo_token() {
    let host = TestHost::new();
    let token = host.access_token().await;
    host.clock.advance(Duration::hours(2));

    let body = assert_refused(&host, "sample-document", &token).await;
    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains(&token));
}
