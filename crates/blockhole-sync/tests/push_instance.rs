//! Pushing to a mock Mastodon server through the real instance client.

use blockhole_client::InstanceClient;
use blockhole_core::{Blocklist, DomainBlock, FieldSet, SeverityLevel};
use blockhole_sync::{push_blocklist, Pacer, PushOptions};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> InstanceClient {
    InstanceClient::builder("social.example.org")
        .base_url(server.uri())
        .token("s3cret")
        .build()
        .unwrap()
}

#[tokio::test]
async fn update_keeps_fields_that_are_not_imported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/domain_blocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "42", "domain": "gab.ai", "severity": "suspend",
             "public_comment": "old", "private_comment": "internal note",
             "reject_media": true, "reject_reports": true, "obfuscate": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/admin/domain_blocks/42"))
        .and(body_json(json!({
            "domain": "gab.ai", "severity": "suspend",
            "public_comment": "new", "private_comment": "internal note",
            "reject_media": true, "reject_reports": true, "obfuscate": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut incoming = DomainBlock::new("gab.ai", SeverityLevel::Suspend);
    incoming.public_comment = "new".into();
    let merged = Blocklist::from_blocks("merged", [incoming]);
    let options = PushOptions {
        import_fields: FieldSet::from_names(["public_comment"]).unwrap(),
        ..PushOptions::default()
    };

    let client = client_for(&server);
    let report = push_blocklist(&client, &merged, &options, &Pacer::unpaced())
        .await
        .unwrap();
    assert_eq!(report.updated(), 1);
    assert_eq!(report.unchanged, 0);
}

#[tokio::test]
async fn matching_block_is_left_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/domain_blocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "42", "domain": "gab.ai", "severity": "suspend",
             "public_comment": "nazis", "private_comment": "internal note",
             "reject_media": true, "reject_reports": false, "obfuscate": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut incoming = DomainBlock::new("gab.ai", SeverityLevel::Suspend);
    incoming.public_comment = "nazis".into();
    let merged = Blocklist::from_blocks("merged", [incoming]);
    let options = PushOptions {
        import_fields: FieldSet::from_names(["public_comment"]).unwrap(),
        ..PushOptions::default()
    };

    let client = client_for(&server);
    let report = push_blocklist(&client, &merged, &options, &Pacer::unpaced())
        .await
        .unwrap();
    assert_eq!(report.unchanged, 1);
    assert!(report.changes.is_empty());
}
