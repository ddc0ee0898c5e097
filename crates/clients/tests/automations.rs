use ethers::types::{Address, Bytes, H256, U256};
use modulor_clients::{
    automations::{Action, AutomationAccount, AutomationRequest, AutomationsClient},
    ClientError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{body_json, body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const API_KEY: &str = "automations-key";

fn client(server: &MockServer) -> AutomationsClient {
    let account = AutomationAccount::safe(
        "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap(),
        11155111,
        "0x00000000002B0eCfbD0496EE71e01257dA0E37DE".parse().unwrap(),
    );
    AutomationsClient::with_url(&server.uri(), API_KEY, account)
}

#[tokio::test]
async fn create_sign_and_read_logs() {
    let server = MockServer::start().await;
    let hash = H256::repeat_byte(0xab);

    Mock::given(method("POST"))
        .and(path("/automations"))
        .and(header("x-api-key", API_KEY))
        .and(body_partial_json(json!({
            "accountType": "SAFE",
            "network": 11155111,
            "type": "time-based",
            "data": {"maxNumberOfExecutions": 2}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "auto-1", "hash": hash})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/automations/auto-1/sign"))
        .and(body_json(json!({"signature": "0x0102"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "auto-1",
            "hash": hash,
            "status": "ACTIVE"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/automations/auto-1/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "SUCCESS", "userOpHash": H256::repeat_byte(0x01)},
            {"status": "FAILED", "error": "AA23 reverted"}
        ])))
        .mount(&server)
        .await;

    let automations = client(&server);
    let request = AutomationRequest::time_based(
        "* * * * *",
        1_700_000_000_000,
        vec![Action::Static {
            target: Address::repeat_byte(0x0a),
            value: U256::zero(),
            call_data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
        }],
        2,
    );

    let automation = automations.create_automation(&request).await.unwrap();
    assert_eq!(automation.id, "auto-1");
    assert_eq!(automation.hash, hash);

    let signed =
        automations.sign_automation(&automation.id, &Bytes::from(vec![0x01, 0x02])).await.unwrap();
    assert_eq!(signed.status.as_deref(), Some("ACTIVE"));

    let logs = automations.get_automation_logs(&automation.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].user_op_hash, Some(H256::repeat_byte(0x01)));
    assert_eq!(logs[1].error.as_deref(), Some("AA23 reverted"));
}

#[tokio::test]
async fn missing_automation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/automations/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client(&server).get_automation("nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 404, .. }));
}
