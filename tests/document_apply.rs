//! Tests of document apply/reload behavior through the public engine API.

use rackroute::prelude::*;
use rackroute::Error;

const ROUTING: &str = r#"{"matrix": {"3": [1, 2]}}"#;

const RACKS: &str = r#"{
    "racks": {
        "1": {
            "name": "FX",
            "enabled": true,
            "midiSteps": [
                {"type": "cc", "channel": 1, "controller": 10, "value": 64, "delay": 0}
            ]
        }
    }
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn engine() -> RackRouteEngine {
    init_tracing();
    RackRouteEngine::builder()
        .routing_json(ROUTING)
        .racks_json(RACKS)
        .build()
        .unwrap()
}

#[test]
fn rack_id_beyond_limit_rejects_document_and_keeps_previous() {
    let engine = RackRouteEngine::builder()
        .max_racks(4)
        .routing_json(ROUTING)
        .build()
        .unwrap();

    let bad = r#"{"matrix": {"3": [1, 5]}}"#;
    let err = engine
        .apply_document(DocumentKind::Routing, bad)
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)));

    // Previous routing stays in effect.
    assert_eq!(engine.document_text(DocumentKind::Routing), ROUTING);
}

#[test]
fn malformed_json_rejects_document_and_keeps_previous() {
    let engine = engine();
    let err = engine
        .apply_document(DocumentKind::Racks, "{not json")
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    assert_eq!(engine.document_text(DocumentKind::Racks), RACKS);
}

#[test]
fn duplicate_rack_id_in_one_route_is_rejected() {
    let engine = engine();
    let bad = r#"{"matrix": {"3": [1, 1]}}"#;
    assert!(engine.apply_document(DocumentKind::Routing, bad).is_err());
}

#[test]
fn duplicate_source_index_is_rejected() {
    let engine = engine();
    let bad = r#"{
        "channels": [{"index": 1, "label": "Vox"}],
        "buses": [{"index": 1, "label": "Bus"}]
    }"#;
    assert!(engine.apply_document(DocumentKind::Sources, bad).is_err());
}

#[test]
fn strict_mode_rejects_partial_catalog() {
    let engine = RackRouteEngine::builder().strict().build().unwrap();
    let partial = r#"{"channels": [{"index": 1, "label": "Vox", "type": "channel"}]}"#;
    assert!(engine
        .apply_document(DocumentKind::Sources, partial)
        .is_err());
}

#[test]
fn relaxed_mode_accepts_partial_catalog() {
    let engine = engine();
    let partial = r#"{"channels": [{"index": 1, "label": "Vox"}]}"#;
    engine
        .apply_document(DocumentKind::Sources, partial)
        .unwrap();
    assert_eq!(engine.source_label(1), "Vox");
}

#[test]
fn reload_all_reinstalls_cached_documents() {
    let engine = engine();
    let sources = r#"{"channels": [{"index": 7, "label": "Git"}]}"#;
    engine
        .apply_document(DocumentKind::Sources, sources)
        .unwrap();

    engine.reload_all().unwrap();

    assert_eq!(engine.source_label(7), "Git");
    assert_eq!(engine.document_text(DocumentKind::Routing), ROUTING);
    assert_eq!(engine.document_text(DocumentKind::Racks), RACKS);
}

#[test]
fn reload_all_skips_documents_never_applied() {
    // Only racks was provided; sources and routing stay empty and the
    // reload must not try to parse them.
    let engine = RackRouteEngine::builder()
        .racks_json(RACKS)
        .build()
        .unwrap();

    engine.reload_all().unwrap();

    assert_eq!(engine.document_text(DocumentKind::Sources), "");
    assert_eq!(engine.document_text(DocumentKind::Racks), RACKS);
}

#[test]
fn empty_routing_clears_the_matrix() {
    let engine = engine();
    let text = engine.empty_routing();

    assert_eq!(engine.document_text(DocumentKind::Routing), text);
    // The cleared document is itself valid for re-apply.
    engine.apply_document(DocumentKind::Routing, &text).unwrap();
}

#[test]
fn builder_rejects_invalid_initial_document() {
    let res = RackRouteEngine::builder()
        .routing_json(r#"{"matrix": {"3": [0]}}"#)
        .build();
    assert!(res.is_err());
}

#[test]
fn builder_rejects_zero_rack_limit() {
    let err = RackRouteEngine::builder().max_racks(0).build().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn step_channel_out_of_range_is_rejected() {
    let engine = engine();
    let bad = r#"{
        "racks": {
            "1": {
                "name": "FX",
                "enabled": true,
                "midiSteps": [
                    {"type": "cc", "channel": 17, "controller": 10, "value": 64, "delay": 0}
                ]
            }
        }
    }"#;
    assert!(engine.apply_document(DocumentKind::Racks, bad).is_err());
}
