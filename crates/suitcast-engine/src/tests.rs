use super::*;

fn predict(engine: &mut Engine, text: &str) -> Option<String> {
    match engine.should_predict(text) {
        Verdict::Predict {
            source_round,
            combination,
        } => Some(engine.make_prediction(source_round, combination).unwrap().1),
        Verdict::Skip(_) => None,
    }
}

#[test]
fn test_round_trip_correct_at_offset_zero() {
    let mut engine = Engine::new();
    let sent = predict(&mut engine, "Jeu #n744 👉 (♠️♥️♦️) - 8 (♠️♥️) ✅").unwrap();
    assert_eq!(sent, "🔵745 🔵3K: statut :⏳");

    let res = engine
        .resolve("Jeu #n745 👉 (K♠️ 2♥️ 9♦️) - 7 (♣️♥️) ✅", true)
        .unwrap();
    assert_eq!(res.round_number, 745);
    assert_eq!(res.old_rendered_text, "🔵745 🔵3K: statut :⏳");
    assert_eq!(res.new_rendered_text, "🔵745 🔵3K: statut :✅0️⃣");
    assert_eq!(
        engine.store().get(745).unwrap().status,
        Status::Correct { offset: 0 }
    );
}

#[test]
fn test_round_trip_failed_at_offset_four() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️) (♠️♥️) ✅").unwrap();

    let res = engine.resolve("#n749 (♠️) ✅", true).unwrap();
    assert_eq!(res.new_rendered_text, "🔵745 🔵3K: statut :⭕⭕");
    assert_eq!(engine.store().get(745).unwrap().status, Status::Failed);
}

#[test]
fn test_no_marker_means_no_verdict_anywhere() {
    let mut engine = Engine::new();
    let text = "(♠️♥️♦️) (♠️) ✅";
    assert_eq!(
        engine.should_predict(text),
        Verdict::Skip(SkipReason::NoRound)
    );
    assert!(engine.resolve(text, true).is_none());
}

#[test]
fn test_same_text_triggers_once() {
    let mut engine = Engine::new();
    let text = "#n744 (♠️♥️♦️) (♠️♥️) ✅";
    assert!(predict(&mut engine, text).is_some());
    // Duplicate target check fires before the fingerprint check.
    assert_eq!(
        engine.should_predict(text),
        Verdict::Skip(SkipReason::DuplicateTarget)
    );

    // Once 745 is concluded, the fingerprint still blocks the same text.
    engine.resolve("#n749", true).unwrap();
    assert_eq!(
        engine.should_predict(text),
        Verdict::Skip(SkipReason::AlreadySeen)
    );
}

#[test]
fn test_edited_variant_of_trigger_is_new_text() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 ⏰ (♠️♥️♦️)").unwrap();
    engine.resolve("#n749", true).unwrap();
    // Different text for the same round is a new fingerprint.
    assert!(predict(&mut engine, "#n744 ✅ (♠️♥️♦️)").is_some());
    assert!(engine.store().has_pending(745));
}

#[test]
fn test_low_count_keeps_pending() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    assert!(engine.resolve("#n746 (♠️♥️) ✅", true).is_none());
    assert!(engine.store().has_pending(745));
}

#[test]
fn test_count_uses_occurrences_not_distinct() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    let res = engine.resolve("#n747 (♠️♠️♠️) ✅", true).unwrap();
    assert_eq!(res.status, Status::Correct { offset: 2 });
    assert_eq!(res.new_rendered_text, "🔵745 🔵3K: statut :✅2️⃣");
}

#[test]
fn test_stop_at_first_with_two_eligible() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    predict(&mut engine, "#n745 (♣️♥️♦️)").unwrap();
    assert_eq!(engine.store().pending_rounds(), vec![745, 746]);

    let text = "#n746 (♠️♣️♦️) ✅";
    let first = engine.resolve(text, true).unwrap();
    assert_eq!(first.round_number, 745);
    assert_eq!(first.status, Status::Correct { offset: 1 });
    assert!(engine.store().has_pending(746));

    let second = engine.resolve(text, true).unwrap();
    assert_eq!(second.round_number, 746);
    assert_eq!(second.status, Status::Correct { offset: 0 });
    assert!(engine.resolve(text, true).is_none());
}

#[test]
fn test_fresh_message_never_confirms() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    assert!(engine.resolve("#n745 (♠️♥️♦️) ✅", false).is_none());
    assert!(engine.resolve("#n745 (♠️♥️♦️) ⏰", true).is_none());
    assert!(engine.store().has_pending(745));
}

#[test]
fn test_fresh_message_can_fail_overdue_prediction() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    let res = engine.resolve("#n750 ⏰", false).unwrap();
    assert_eq!(res.status, Status::Failed);
}

#[test]
fn test_concluded_prediction_is_not_resolved_again() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    engine.resolve("#n745 (♠️♥️♦️) ✅", true).unwrap();
    assert!(engine.resolve("#n760", true).is_none());
    assert_eq!(
        engine.store().get(745).unwrap().status,
        Status::Correct { offset: 0 }
    );
}

#[test]
fn test_deliveries_follow_prediction() {
    let mut engine = Engine::new();
    predict(&mut engine, "#n744 (♠️♥️♦️)").unwrap();
    assert!(engine.record_deliveries(745, DeliveryMap::from([(-1001, 7)])));
    assert_eq!(engine.deliveries(745), DeliveryMap::from([(-1001, 7)]));
    assert!(engine.deliveries(900).is_empty());
}

#[test]
fn test_reset_clears_predictions_and_fingerprints() {
    let mut engine = Engine::new();
    let text = "#n744 (♠️♥️♦️)";
    predict(&mut engine, text).unwrap();
    engine.reset();
    assert!(engine.store().is_empty());
    assert!(predict(&mut engine, text).is_some());
}
