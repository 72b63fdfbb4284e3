//! # Replay and Time Attacks
//!
//! Captured or pre-dated messages re-posted from the legitimate origin.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use chrono::Duration;
    use shared_types::{PeerWindow, Rejection};
    use tb_01_token_bridge::{ConnectionState, IgnoreReason, InboundOutcome, PopupBridgeApi};

    /// Post `data` to the popup as if from the real opener.
    fn from_opener(scenario: &Scenario, data: serde_json::Value) {
        scenario
            .popup_window
            .post_message(data, POPUP_ORIGIN, &scenario.opener_window.as_source())
            .unwrap();
    }

    #[test]
    fn test_replayed_transfer_after_delivery_is_ignored() {
        let mut scenario = Scenario::new();
        let mut tap = scenario.eavesdrop_popup();
        scenario.complete_exchange(&transfer("a", "b", "u1"));

        let captured: Vec<_> = std::iter::from_fn(|| tap.try_recv().ok().flatten())
            .filter(|event| event.data["type"] == "TOKEN_TRANSFER")
            .collect();
        assert_eq!(captured.len(), 1);

        from_opener(&scenario, captured[0].data.clone());
        let outcomes = scenario.popup.pump();

        assert!(matches!(
            outcomes.as_slice(),
            [InboundOutcome::Ignored(IgnoreReason::UnexpectedState { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 1);
    }

    #[test]
    fn test_captured_transfer_expires() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();
        let captured = envelope(
            "TOKEN_TRANSFER",
            "captured",
            token_data("old", "old", "u1"),
            Some(now),
            Some(now + Duration::seconds(60)),
        );

        scenario.clock.advance(Duration::seconds(61));
        from_opener(&scenario, captured);

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Dropped(Rejection::Expired { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 0);
    }

    #[test]
    fn test_long_lived_expiry_does_not_defeat_replay_window() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();
        let captured = envelope(
            "TOKEN_TRANSFER",
            "captured",
            token_data("old", "old", "u1"),
            Some(now),
            Some(now + Duration::days(1)),
        );

        scenario.clock.advance(Duration::seconds(121));
        from_opener(&scenario, captured);

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Dropped(Rejection::Stale { .. })]
        ));
        assert_eq!(scenario.popup.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_message_at_replay_boundary_is_accepted() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();
        let data = envelope(
            "TOKEN_TRANSFER",
            "edge",
            token_data("a", "b", "u1"),
            Some(now - Duration::seconds(120)),
            Some(now + Duration::seconds(1)),
        );

        from_opener(&scenario, data);

        assert!(scenario.popup.pump().iter().all(InboundOutcome::is_handled));
        assert!(scenario.store.store_calls() == 1);
    }

    #[test]
    fn test_future_dated_transfer_is_dropped() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();
        let data = envelope(
            "TOKEN_TRANSFER",
            "pre-dated",
            token_data("a", "b", "u1"),
            Some(now + Duration::hours(1)),
            Some(now + Duration::hours(2)),
        );

        from_opener(&scenario, data);

        assert!(matches!(
            scenario.popup.pump().as_slice(),
            [InboundOutcome::Dropped(Rejection::FromFuture { .. })]
        ));
        assert_eq!(scenario.store.store_calls(), 0);
    }

    #[test]
    fn test_clock_skew_within_tolerance_is_accepted() {
        let mut scenario = Scenario::new();
        scenario.handshake();
        let now = scenario.now();
        let data = envelope(
            "TOKEN_TRANSFER",
            "skewed",
            token_data("a", "b", "u1"),
            Some(now + Duration::seconds(60)),
            Some(now + Duration::seconds(120)),
        );

        from_opener(&scenario, data);

        assert!(scenario.popup.pump().iter().all(InboundOutcome::is_handled));
        assert_eq!(scenario.popup.state(), ConnectionState::TokensReceived);
    }

    #[test]
    fn test_transfer_without_timestamps_is_dropped() {
        let mut scenario = Scenario::new();
        scenario.handshake();

        from_opener(
            &scenario,
            envelope("TOKEN_TRANSFER", "bare", token_data("a", "b", "u1"), None, None),
        );

        assert_eq!(
            scenario.popup.pump(),
            vec![InboundOutcome::Dropped(Rejection::MissingTimestamp)]
        );
    }
}
