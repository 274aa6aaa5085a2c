use intercom_core::ClientId;

use crate::utils::{RelayTestClient, init_tracing, spawn_relay, wait_for_participants};

#[tokio::test]
async fn clients_are_greeted_with_sequential_ids() {
    init_tracing();
    let (url, hub) = spawn_relay().await;

    let mut first = RelayTestClient::connect(&url).await;
    assert_eq!(first.expect_greeting().await, ClientId(1));

    let mut second = RelayTestClient::connect(&url).await;
    assert_eq!(second.expect_greeting().await, ClientId(2));

    assert_eq!(hub.participant_count(), 2);
}

#[tokio::test]
async fn disconnect_removes_the_participant() {
    init_tracing();
    let (url, hub) = spawn_relay().await;

    let mut first = RelayTestClient::connect(&url).await;
    first.expect_greeting().await;
    let mut second = RelayTestClient::connect(&url).await;
    second.expect_greeting().await;
    wait_for_participants(&hub, 2).await;

    first.close().await;
    wait_for_participants(&hub, 1).await;
}

#[tokio::test]
async fn ids_are_not_reused_after_disconnect() {
    init_tracing();
    let (url, hub) = spawn_relay().await;

    let mut first = RelayTestClient::connect(&url).await;
    assert_eq!(first.expect_greeting().await, ClientId(1));
    first.close().await;
    wait_for_participants(&hub, 0).await;

    let mut next = RelayTestClient::connect(&url).await;
    assert_eq!(next.expect_greeting().await, ClientId(2));
}
