//! # Forged Handshake
//!
//! Attempts to make the popup accept a peer without answering its own
//! request: unsolicited responses, guessed request ids, responses that hide
//! their source window.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use serde_json::json;
    use shared_types::{generate_request_id, PeerWindow, RequestIdGenerator};
    use std::collections::HashSet;
    use tb_01_token_bridge::{ConnectionState, IgnoreReason, InboundOutcome, PopupBridgeApi};

    fn response(scenario: &Scenario, request_id: &str) -> serde_json::Value {
        let (timestamp, _) = scenario.fresh_window();
        envelope(
            "HANDSHAKE_RESPONSE",
            request_id,
            json!({ "ready": true }),
            timestamp,
            None,
        )
    }

    #[test]
    fn test_unsolicited_response_is_ignored() {
        let mut scenario = Scenario::new();
        let forged = response(&scenario, "never-requested");

        scenario
            .popup_window
            .post_message(forged, POPUP_ORIGIN, &scenario.opener_window.as_source())
            .unwrap();

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Ignored(IgnoreReason::UnexpectedState { .. })]
        ));
        assert_eq!(scenario.popup.state(), ConnectionState::Disconnected);
        assert!(!scenario.popup.session().has_peer());
    }

    #[test]
    fn test_guessed_request_id_is_ignored() {
        let mut scenario = Scenario::new();
        scenario.popup.initiate().unwrap();

        for _ in 0..16 {
            let guess = response(&scenario, &generate_request_id(32));
            scenario
                .popup_window
                .post_message(guess, POPUP_ORIGIN, &scenario.opener_window.as_source())
                .unwrap();
        }

        let outcomes = scenario.popup.pump();
        assert_eq!(outcomes.len(), 16);
        assert!(outcomes
            .iter()
            .all(|o| *o == InboundOutcome::Ignored(IgnoreReason::RequestIdMismatch)));
        assert_eq!(scenario.popup.state(), ConnectionState::HandshakeInitiated);
    }

    #[test]
    fn test_response_without_source_window_is_ignored() {
        let mut scenario = Scenario::new();
        let pending = scenario.popup.initiate().unwrap();
        let forged = response(&scenario, &pending.request_id);

        let mut anonymous = scenario.opener_window.as_source();
        anonymous.window = None;
        scenario
            .popup_window
            .post_message(forged, POPUP_ORIGIN, &anonymous)
            .unwrap();

        assert_eq!(
            scenario.popup.pump(),
            vec![InboundOutcome::Ignored(IgnoreReason::MissingSource)]
        );
        assert_eq!(scenario.popup.state(), ConnectionState::HandshakeInitiated);
        assert_eq!(
            scenario.popup.pending_request_id(),
            Some(pending.request_id.as_str())
        );
    }

    #[test]
    fn test_response_after_timeout_is_ignored() {
        let mut scenario = Scenario::new();
        let pending = scenario.popup.initiate().unwrap();
        scenario.popup.on_handshake_timeout(&pending.request_id);

        scenario.opener.pump();
        let outcomes = scenario.popup.pump();

        assert!(matches!(
            outcomes.as_slice(),
            [InboundOutcome::Ignored(IgnoreReason::UnexpectedState { .. })]
        ));
        assert_eq!(scenario.popup.state(), ConnectionState::Error);
    }

    #[test]
    fn test_request_ids_are_unpredictable() {
        let ids = RequestIdGenerator::default();
        let seen: HashSet<String> = (0..1_000).map(|_| ids.generate()).collect();

        assert_eq!(seen.len(), 1_000);
        assert!(seen
            .iter()
            .all(|id| id.len() == 32 && id.chars().all(|c| c.is_ascii_alphanumeric())));
    }
}
