//! # Premature Transfer
//!
//! Token traffic from the trusted origin before any handshake completed, and
//! malformed token payloads after it did.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use serde_json::json;
    use shared_types::{BridgeError, PeerWindow};
    use tb_01_token_bridge::{
        ConnectionState, IgnoreReason, InboundOutcome, OpenerBridgeApi, PopupBridgeApi,
        StatusKind,
    };

    fn push_transfer(scenario: &Scenario, data: serde_json::Value) {
        let (timestamp, expires_at) = scenario.fresh_window();
        scenario
            .popup_window
            .post_message(
                envelope("TOKEN_TRANSFER", "early", data, timestamp, expires_at),
                POPUP_ORIGIN,
                &scenario.opener_window.as_source(),
            )
            .unwrap();
    }

    #[test]
    fn test_transfer_while_disconnected_is_ignored() {
        let mut scenario = Scenario::new();

        push_transfer(&scenario, token_data("a", "b", "u1"));

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Ignored(IgnoreReason::UnexpectedState { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 0);
        assert_eq!(scenario.popup.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_transfer_during_handshake_is_ignored() {
        let mut scenario = Scenario::new();
        scenario.popup.initiate().unwrap();

        push_transfer(&scenario, token_data("a", "b", "u1"));

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Ignored(IgnoreReason::UnexpectedState { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 0);
        assert_eq!(scenario.popup.state(), ConnectionState::HandshakeInitiated);
    }

    #[test]
    fn test_opener_refuses_to_send_before_handshake() {
        let mut scenario = Scenario::new();

        let result = scenario.opener.send_tokens(&transfer("a", "b", "u1"));

        assert!(matches!(result, Err(BridgeError::NotConnected { .. })));
        assert!(scenario.popup.pump().is_empty());
    }

    #[test]
    fn test_partial_token_payloads_are_rejected() {
        let mut scenario = Scenario::new();
        scenario.handshake();

        for data in [
            json!({ "tokens": { "accessToken": "a" } }),
            json!({ "tokens": { "refreshToken": "b" } }),
            json!({ "tokens": { "accessToken": "", "refreshToken": "b" } }),
            json!({ "tokens": null }),
            json!({}),
        ] {
            push_transfer(&scenario, data);
        }

        let outcomes = scenario.popup.pump();
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes
            .iter()
            .all(|o| *o == InboundOutcome::Failed(BridgeError::InvalidTokenPayload)));
        assert_eq!(scenario.store.store_calls(), 0);
        assert_eq!(scenario.popup.state(), ConnectionState::Connected);
        assert!(scenario.popup_status.contains_kind(StatusKind::Error));
    }
}
