use intercom_core::SignalMessage;
use intercom_peer::{ControllerEvent, SessionState};

use crate::utils::{TransportCall, spawn_controller, wait_until};

/// Candidates arriving before the offer must wait for the remote
/// description, then apply in their original order with none dropped.
#[tokio::test]
async fn early_candidates_flush_in_arrival_order_after_the_offer() {
    let mut h = spawn_controller();

    h.send(ControllerEvent::LinkOpened).await;
    for i in 0..3 {
        h.send_message(&format!(
            r#"{{"type":"ice-candidate","candidate":"c{i}"}}"#
        ))
        .await;
    }
    h.send_message(r#"{"type":"offer","sdp":"remote-offer"}"#)
        .await;

    h.wait_for_state(SessionState::AnswerSent).await;

    let transport = h.factory.latest();
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::RemoteOffer("remote-offer".to_owned()),
            TransportCall::CreateAnswer,
            TransportCall::Candidate("c0".to_owned()),
            TransportCall::Candidate("c1".to_owned()),
            TransportCall::Candidate("c2".to_owned()),
        ]
    );
}

#[tokio::test]
async fn candidates_after_the_description_apply_immediately() {
    let mut h = spawn_controller();

    h.send(ControllerEvent::LinkOpened).await;
    h.send_message(r#"{"type":"offer","sdp":"remote-offer"}"#)
        .await;
    h.wait_for_state(SessionState::AnswerSent).await;

    h.send_message(r#"{"type":"ice-candidate","candidate":"late"}"#)
        .await;

    let transport = h.factory.latest();
    let probe = transport.clone();
    wait_until("late candidate applied", move || {
        probe.candidates() == vec!["late".to_owned()]
    })
    .await;
}

#[tokio::test]
async fn a_rejected_candidate_does_not_kill_the_session() {
    let mut h = spawn_controller();

    h.send(ControllerEvent::LinkOpened).await;
    h.send_message(r#"{"type":"offer","sdp":"remote-offer"}"#)
        .await;
    h.wait_for_state(SessionState::AnswerSent).await;

    let transport = h.factory.latest();
    transport.set_fail_candidate(true);
    h.send_message(r#"{"type":"ice-candidate","candidate":"bad"}"#)
        .await;

    let probe = transport.clone();
    wait_until("rejected candidate attempted", move || {
        probe.candidates() == vec!["bad".to_owned()]
    })
    .await;

    // Still answer-sent, still accepting candidates.
    assert_eq!(*h.state.borrow(), SessionState::AnswerSent);
    transport.set_fail_candidate(false);
    h.send_message(r#"{"type":"ice-candidate","candidate":"good"}"#)
        .await;

    let probe = transport.clone();
    wait_until("next candidate applied", move || {
        probe.candidates() == vec!["bad".to_owned(), "good".to_owned()]
    })
    .await;
}

#[tokio::test]
async fn local_candidates_are_sent_through_the_relay() {
    let h = spawn_controller();

    h.send(ControllerEvent::LinkOpened).await;
    let factory = h.factory.clone();
    wait_until("transport created", move || factory.created_count() == 1).await;

    h.send(ControllerEvent::CandidateDiscovered {
        generation: h.factory.latest_generation(),
        candidate: "local-1".to_owned(),
    })
    .await;

    let link = h.link.clone();
    wait_until("candidate forwarded", move || {
        link.sent_candidates() == vec!["local-1".to_owned()]
    })
    .await;
}

#[tokio::test]
async fn local_candidates_are_dropped_when_the_link_is_down() {
    let h = spawn_controller();

    h.send(ControllerEvent::LinkOpened).await;
    let factory = h.factory.clone();
    wait_until("transport created", move || factory.created_count() == 1).await;

    h.link.set_open(false);
    h.send(ControllerEvent::CandidateDiscovered {
        generation: h.factory.latest_generation(),
        candidate: "never-sent".to_owned(),
    })
    .await;

    let status = h.status.clone();
    wait_until("drop diagnostic logged", move || {
        status.contains("not open")
    })
    .await;

    assert!(h.link.sent_candidates().is_empty());
    assert!(
        !h.link
            .sent()
            .iter()
            .any(|m| matches!(m, SignalMessage::IceCandidate { .. }))
    );
}
