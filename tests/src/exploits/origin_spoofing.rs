//! # Origin Spoofing
//!
//! A hostile context posts protocol messages to the popup, claiming the app's
//! origin in `metadata.sender`. The platform-stamped origin is the only thing
//! the popup trusts.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use chrono::Duration;
    use shared_types::Rejection;
    use tb_01_token_bridge::{
        ConnectionState, InboundOutcome, OpenerBridgeApi, PopupBridgeApi, ResponderState,
    };

    #[test]
    fn test_spoofed_transfer_never_reaches_store() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let mut attacker = scenario.attacker();
        let (timestamp, expires_at) = scenario.fresh_window();

        attacker.post(
            &scenario.popup_window,
            envelope(
                "TOKEN_TRANSFER",
                "evil-1",
                token_data("stolen", "stolen", "victim"),
                timestamp,
                expires_at,
            ),
        );
        let outcomes = scenario.popup.pump();

        assert!(matches!(
            outcomes.as_slice(),
            [InboundOutcome::Dropped(Rejection::OriginMismatch { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 0);
        assert_eq!(scenario.popup.state(), ConnectionState::Connected);
        assert!(attacker.received().is_empty(), "no acknowledgment leaks");
    }

    #[test]
    fn test_spoofed_response_cannot_hijack_handshake() {
        let mut scenario = Scenario::new();
        let pending = scenario.popup.initiate().unwrap();
        let mut attacker = scenario.attacker();
        let (timestamp, _) = scenario.fresh_window();

        // Even with the right request id.
        attacker.post(
            &scenario.popup_window,
            envelope(
                "HANDSHAKE_RESPONSE",
                &pending.request_id,
                serde_json::json!({ "ready": true }),
                timestamp,
                None,
            ),
        );
        let outcomes = scenario.popup.pump();

        assert!(matches!(
            outcomes.as_slice(),
            [InboundOutcome::Dropped(Rejection::OriginMismatch { .. })]
        ));
        assert_eq!(scenario.popup.state(), ConnectionState::HandshakeInitiated);
        assert!(!scenario.popup.session().has_peer());

        // The real opener still completes the handshake.
        scenario.opener.pump();
        scenario.popup.pump();
        assert_eq!(scenario.popup.state(), ConnectionState::Connected);
        assert!(attacker.received().is_empty());
    }

    #[test]
    fn test_navigated_opener_never_sees_request() {
        // The opener tab was navigated to the attacker's origin.
        let mut scenario = Scenario::with_opener_origin(EVIL_ORIGIN);
        let mut eavesdropper = scenario.opener_window.subscribe();

        let pending = scenario.popup.initiate();

        assert!(pending.is_ok(), "a filtered delivery is not a send failure");
        assert!(matches!(eavesdropper.try_recv(), Ok(None)));
        assert!(scenario.opener.pump().is_empty());
        assert_eq!(scenario.opener.state(), ResponderState::Listening);
        assert_eq!(scenario.popup.state(), ConnectionState::HandshakeInitiated);
    }

    #[test]
    fn test_subdomain_and_scheme_variants_are_foreign() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();

        for origin in [
            "http://app.example.com",
            "https://app.example.com:8443",
            "https://evil.app.example.com",
            "https://app.example.com.evil.com",
        ] {
            let attacker = Attacker::new(origin);
            attacker.post(
                &scenario.popup_window,
                envelope(
                    "TOKEN_TRANSFER",
                    "evil",
                    token_data("x", "y", "victim"),
                    Some(now),
                    Some(now + Duration::seconds(60)),
                ),
            );
        }

        let outcomes = scenario.popup.pump();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, InboundOutcome::Dropped(Rejection::OriginMismatch { .. }))));
        assert_eq!(scenario.store.store_calls(), 0);
    }
}
