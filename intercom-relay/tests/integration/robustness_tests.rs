use intercom_core::SignalMessage;

use crate::utils::{RelayTestClient, init_tracing, spawn_relay, wait_for_participants};

#[tokio::test]
async fn malformed_messages_are_dropped_without_side_effects() {
    init_tracing();
    let (url, hub) = spawn_relay().await;

    let mut sender = RelayTestClient::connect(&url).await;
    sender.expect_greeting().await;
    let mut receiver = RelayTestClient::connect(&url).await;
    receiver.expect_greeting().await;

    sender.send_raw("not even json").await;
    sender.send_raw(r#"{"sdp":"missing the type field"}"#).await;
    receiver.expect_silence().await;
    assert_eq!(hub.participant_count(), 2);

    // The sender's connection survives and keeps relaying.
    sender
        .send_signal(&SignalMessage::Offer {
            sdp: "still alive".to_owned(),
        })
        .await;
    assert_eq!(
        receiver.recv_signal().await,
        SignalMessage::Offer {
            sdp: "still alive".to_owned()
        }
    );
}

#[tokio::test]
async fn unknown_message_types_are_forwarded_verbatim() {
    init_tracing();
    let (url, _hub) = spawn_relay().await;

    let mut sender = RelayTestClient::connect(&url).await;
    sender.expect_greeting().await;
    let mut receiver = RelayTestClient::connect(&url).await;
    receiver.expect_greeting().await;

    sender.send_raw(r#"{"type":"ping","payload":1}"#).await;

    // Structurally valid, semantically unknown: the relay forwards it and
    // the receiving side classifies it as unknown.
    assert_eq!(receiver.recv_signal().await, SignalMessage::Unknown);
}

#[tokio::test]
async fn disconnect_mid_negotiation_leaves_the_hub_consistent() {
    init_tracing();
    let (url, hub) = spawn_relay().await;

    let mut sender = RelayTestClient::connect(&url).await;
    sender.expect_greeting().await;
    let mut receiver = RelayTestClient::connect(&url).await;
    receiver.expect_greeting().await;

    sender
        .send_signal(&SignalMessage::Offer {
            sdp: "X".to_owned(),
        })
        .await;
    receiver.recv_signal().await;

    // The answering side goes away before replying.
    receiver.close().await;
    wait_for_participants(&hub, 1).await;

    // The survivor can keep sending into the void without being dropped.
    sender
        .send_signal(&SignalMessage::IceCandidate {
            candidate: "late".to_owned(),
        })
        .await;
    sender.expect_silence().await;
    assert_eq!(hub.participant_count(), 1);

    // A fresh participant picks the exchange back up.
    let mut replacement = RelayTestClient::connect(&url).await;
    replacement.expect_greeting().await;
    sender
        .send_signal(&SignalMessage::Offer {
            sdp: "retry".to_owned(),
        })
        .await;
    assert_eq!(
        replacement.recv_signal().await,
        SignalMessage::Offer {
            sdp: "retry".to_owned()
        }
    );
}
