use std::rc::Rc;

use tcproxy_app_shell::{BridgeError, ProxyBridge, ProxyConnection};
use tcproxy_core::Runtime;
use tcproxy_foundation::{
    FloatRect, IntRect, Point, PointerChange, PointerEvent, PointerEventKind, TextInputState,
    TextRange,
};
use tcproxy_testing::{
    BridgeTestRule, FixedMetrics, PlatformEvent, ProxyEvent, RecordingCharSender,
    RecordingPlatform, RecordingProxyClient, TableKeyTranslator,
};
use tcproxy_ui::{InputType, SessionConfig};

fn starts(rule: &BridgeTestRule) -> usize {
    rule.platform
        .count(|event| matches!(event, PlatformEvent::StartInput(_)))
}

fn finishes(rule: &BridgeTestRule) -> usize {
    rule.platform
        .count(|event| matches!(event, PlatformEvent::FinishInput))
}

#[test]
fn first_remote_state_starts_a_session() {
    let rule = BridgeTestRule::new();
    assert!(rule.client.has_handler());
    assert!(rule.bridge.active_session().is_none());

    let handle = rule.start_session("hello");

    assert!(handle.is_active());
    assert_eq!(starts(&rule), 1);
    assert_eq!(handle.get_text_before_cursor(3).as_deref(), Some("llo"));
    assert!(rule.client.sent_states().is_empty());
}

#[test]
fn session_uses_configured_input_type() {
    let input_type = InputType::TEXT_NORMAL.union(InputType::FLAG_NO_SUGGESTIONS);
    let rule = BridgeTestRule::with_config(SessionConfig::default().with_input_type(input_type));
    rule.start_session("");

    assert!(matches!(
        rule.platform.events().first(),
        Some(PlatformEvent::StartInput(info)) if info.input_type == input_type
    ));
}

#[test]
fn local_edits_are_sent_to_the_remote() {
    let rule = BridgeTestRule::new();
    let handle = rule.start_session("hello");

    handle.commit_text(" world", 1);
    handle.commit_text("\n", 1);

    let sent = rule.client.sent_states();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "hello world");
    assert_eq!(rule.chars.enter_count(), 1);
}

#[test]
fn remote_update_mid_session_restarts_input_without_echo() {
    let rule = BridgeTestRule::new();
    let handle = rule.start_session("hello");
    rule.platform.take_events();

    rule.push_state(Some(TextInputState::with_text("bye")));

    assert_eq!(
        rule.platform.count(|event| matches!(event, PlatformEvent::RestartInput)),
        1
    );
    assert_eq!(handle.get_text_before_cursor(10).as_deref(), Some("bye"));
    assert_eq!(starts(&rule), 0);
    assert!(rule.client.sent_states().is_empty());
}

#[test]
fn out_of_range_remote_states_are_clamped() {
    let rule = BridgeTestRule::new();
    rule.push_state(Some(TextInputState {
        text: "abc".into(),
        selection: TextRange::cursor(10),
        selection_left: false,
        composition: Some(TextRange::new(2, 0)),
    }));

    assert!(matches!(
        rule.platform.events().first(),
        Some(PlatformEvent::StartInput(info)) if info.initial_selection == TextRange::cursor(3)
    ));
    rule.platform.take_events();

    rule.push_state(Some(TextInputState {
        text: "abc".into(),
        selection: TextRange::new(1, usize::MAX),
        selection_left: true,
        composition: None,
    }));
    assert_eq!(
        rule.platform.take_events(),
        vec![PlatformEvent::SelectionUpdated {
            selection: TextRange::new(1, 2),
            composition: None,
        }]
    );
}

#[test]
fn terminator_ends_the_session_and_next_state_starts_another() {
    let rule = BridgeTestRule::new();
    let first = rule.start_session("one");

    rule.push_state(None);
    assert!(!first.is_active());
    assert!(rule.bridge.active_session().is_none());
    assert_eq!(finishes(&rule), 1);

    let second = rule.start_session("two");
    assert!(second.is_active());
    assert!(!first.commit_text("x", 1));
    assert_eq!(starts(&rule), 2);
}

#[test]
fn terminator_without_a_session_is_ignored() {
    let rule = BridgeTestRule::new();
    rule.push_state(None);

    assert_eq!(finishes(&rule), 0);
    assert!(rule.start_session("x").is_active());
}

#[test]
fn new_client_gets_the_handler_and_the_outbound_states() {
    let rule = BridgeTestRule::new();
    let handle = rule.start_session("a");

    let replacement = Rc::new(RecordingProxyClient::new());
    rule.connection.connect(replacement.clone());
    rule.pump_until_idle();
    assert_eq!(replacement.handler_registrations(), 1);

    handle.commit_text("b", 1);
    assert!(rule.client.sent_states().is_empty());
    assert_eq!(replacement.sent_states()[0].text, "ab");

    assert!(replacement.push_state(None));
    rule.pump_until_idle();
    assert!(!handle.is_active());
}

#[test]
fn edits_while_disconnected_are_dropped() {
    let rule = BridgeTestRule::new();
    let handle = rule.start_session("a");
    rule.connection.disconnect();
    rule.pump_until_idle();

    assert!(handle.commit_text("b", 1));
    assert!(rule.client.sent_states().is_empty());
    assert_eq!(handle.get_text_before_cursor(5).as_deref(), Some("ab"));
}

#[test]
fn rectangles_are_scaled_to_device_pixels() {
    let rule = BridgeTestRule::new();
    let expected = IntRect::new(540, 600, 675, 750);

    rule.push_cursor(Some(FloatRect::new(0.5, 0.25, 0.125, 0.0625)));
    rule.push_area(Some(FloatRect::new(0.0, 0.5, 1.0, 0.5)));

    assert_eq!(rule.bridge.cursor_rect(), Some(expected));
    assert_eq!(rule.bridge.area_rect(), Some(IntRect::new(0, 1200, 1080, 2400)));
    assert_eq!(rule.cursor_hook_calls(), vec![Some(expected)]);
    assert_eq!(rule.area_hook_calls().len(), 1);

    rule.push_cursor(None);
    assert_eq!(rule.bridge.cursor_rect(), None);
    assert_eq!(rule.cursor_hook_calls().last(), Some(&None));
}

#[test]
fn caret_geometry_reaches_the_platform_while_a_session_runs() {
    let rule = BridgeTestRule::new();
    rule.push_cursor(Some(FloatRect::new(0.5, 0.25, 0.125, 0.0625)));
    assert_eq!(
        rule.platform
            .count(|event| matches!(event, PlatformEvent::CursorAnchorUpdated(_))),
        0
    );

    rule.start_session("abc");
    let anchors: Vec<_> = rule
        .platform
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            PlatformEvent::CursorAnchorUpdated(info) => Some(info),
            _ => None,
        })
        .collect();
    assert_eq!(anchors.len(), 1);
    let marker = anchors[0].insertion_marker.expect("caret known");
    assert_eq!(marker.horizontal, 540.0);
    assert_eq!(marker.bottom, 750.0);
    assert_eq!(anchors[0].editor_bounds, None);

    rule.push_area(Some(FloatRect::new(0.0, 0.5, 1.0, 0.5)));
    let events = rule.platform.take_events();
    assert!(matches!(
        events.as_slice(),
        [PlatformEvent::CursorAnchorUpdated(info)]
            if info.editor_bounds == Some(IntRect::new(0, 1200, 1080, 2400))
    ));

    rule.push_state(None);
    rule.platform.take_events();
    rule.push_area(None);
    assert!(rule.platform.events().is_empty());
}

#[test]
fn pointer_events_reach_the_remote_normalised() {
    let rule = BridgeTestRule::new();

    rule.send_pointer(PointerEvent::single(
        PointerEventKind::Press,
        PointerChange::down(10, Point::new(540.0, 1200.0)),
    ));
    rule.send_pointer(PointerEvent::single(
        PointerEventKind::Press,
        PointerChange::down(11, Point::new(0.0, 0.0)),
    ));
    rule.send_pointer(PointerEvent::single(
        PointerEventKind::Move,
        PointerChange::moved(10, Point::new(270.0, 600.0)),
    ));
    rule.send_pointer(PointerEvent::single(
        PointerEventKind::Release,
        PointerChange::up(10, Point::new(270.0, 600.0)),
    ));

    assert_eq!(
        rule.client.events(),
        vec![
            ProxyEvent::PointerAdded { id: 1, x: 0.5, y: 0.5 },
            ProxyEvent::PointerAdded { id: 2, x: 0.0, y: 0.0 },
            ProxyEvent::PointerAdded { id: 1, x: 0.25, y: 0.25 },
            ProxyEvent::PointerRemoved(1),
        ]
    );
}

#[test]
fn pointer_positions_follow_surface_resizes() {
    let rule = BridgeTestRule::new();
    rule.metrics.set_size(200.0, 100.0);

    rule.send_pointer(PointerEvent::single(
        PointerEventKind::Press,
        PointerChange::down(1, Point::new(50.0, 50.0)),
    ));

    assert_eq!(
        rule.client.events(),
        vec![ProxyEvent::PointerAdded { id: 1, x: 0.25, y: 0.5 }]
    );
}

#[test]
fn detach_ends_session_and_unregisters() {
    let mut rule = BridgeTestRule::new();
    let handle = rule.start_session("abc");

    rule.bridge.detach();

    assert!(!rule.bridge.is_attached());
    assert!(!handle.is_active());
    assert_eq!(finishes(&rule), 1);
    assert!(!rule.client.has_handler());
    assert!(rule.bridge.pointer_events().is_none());
    assert!(!rule.client.push_state(Some(TextInputState::with_text("late"))));
}

#[test]
fn dropping_the_rule_finishes_platform_input() {
    let rule = BridgeTestRule::new();
    rule.start_session("abc");
    let platform = Rc::clone(&rule.platform);

    drop(rule);

    assert_eq!(
        platform.count(|event| matches!(event, PlatformEvent::FinishInput)),
        1
    );
}

#[test]
fn build_reports_the_first_missing_collaborator() {
    let missing_platform = ProxyBridge::builder(ProxyConnection::new()).build();
    assert_eq!(
        missing_platform.err(),
        Some(BridgeError::MissingCollaborator("platform input"))
    );

    let missing_metrics = ProxyBridge::builder(ProxyConnection::new())
        .platform(Rc::new(RecordingPlatform::new()))
        .key_translator(Rc::new(TableKeyTranslator::new()))
        .char_sender(Rc::new(RecordingCharSender::new()))
        .build();
    assert_eq!(
        missing_metrics.err(),
        Some(BridgeError::MissingCollaborator("surface metrics"))
    );
}

#[test]
fn attach_rejects_second_attach_and_dead_runtime() {
    let build = || {
        ProxyBridge::builder(ProxyConnection::new())
            .platform(Rc::new(RecordingPlatform::new()))
            .key_translator(Rc::new(TableKeyTranslator::new()))
            .char_sender(Rc::new(RecordingCharSender::new()))
            .metrics(Rc::new(FixedMetrics::new(100.0, 100.0)))
            .build()
            .expect("all required collaborators supplied")
    };

    let runtime = Runtime::new();
    let mut bridge = build();
    assert_eq!(bridge.attach(&runtime.handle()), Ok(()));
    assert_eq!(
        bridge.attach(&runtime.handle()),
        Err(BridgeError::AlreadyAttached)
    );

    let handle = {
        let gone = Runtime::new();
        gone.handle()
    };
    let mut orphan = build();
    assert_eq!(orphan.attach(&handle), Err(BridgeError::RuntimeUnavailable));
    assert!(!orphan.is_attached());
}
