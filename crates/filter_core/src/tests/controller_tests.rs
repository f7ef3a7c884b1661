use super::*;

use crate::feedback::NoticeBoard;

fn values(items: &[&str]) -> Vec<OptionValue> {
    items.iter().map(|item| OptionValue::from(*item)).collect()
}

fn set(items: &[&str]) -> BTreeSet<OptionValue> {
    items.iter().map(|item| OptionValue::from(*item)).collect()
}

fn key(name: &str) -> FilterGroupKey {
    FilterGroupKey::from(name)
}

fn controller() -> (Arc<FilterController>, Arc<NoticeBoard>) {
    let notices = Arc::new(NoticeBoard::default());
    (FilterController::new(notices.clone()), notices)
}

struct RecordingView {
    key: FilterGroupKey,
    synced: Mutex<Vec<BTreeSet<OptionValue>>>,
}

impl SelectionView for RecordingView {
    fn group(&self) -> &FilterGroupKey {
        &self.key
    }

    fn sync_checked(&self, selected: &BTreeSet<OptionValue>) {
        self.synced.lock().expect("lock").push(selected.clone());
    }
}

#[test]
fn register_group_is_idempotent() {
    let (controller, _) = controller();
    controller.register_group(&key("players"));
    controller.update_group(&key("players"), values(&["A"]));
    controller.register_group(&key("players"));

    assert_eq!(controller.pending_group("players").len(), 1);
    assert!(controller.applied().contains_group("players"));
}

#[test]
fn applied_snapshot_ignores_later_pending_updates() {
    let (controller, _) = controller();
    controller.register_group(&key("players"));
    controller.update_group(&key("players"), values(&["A", "B"]));
    controller.update_group(&key("players"), values(&["A"]));
    controller.apply();
    let snapshot = controller.applied();

    controller.update_group(&key("players"), values(&["C"]));
    controller.update_group(&key("stat"), values(&["attack_stars"]));

    assert_eq!(controller.applied(), snapshot);
    assert_eq!(controller.applied_group("players"), set(&["A"]));
    assert!(!controller.applied().contains_group("stat"));
    assert_eq!(controller.pending_group("players"), set(&["C"]));
}

#[test]
fn delivered_apply_payload_is_a_snapshot() {
    let (controller, _) = controller();
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    controller.subscribe_fn(FilterEventKind::Apply, move |_, selections| {
        sink.lock().expect("lock").push(selections.clone());
    });

    controller.update_group(&key("players"), values(&["A"]));
    controller.apply();
    controller.update_group(&key("players"), values(&["B"]));

    let delivered = delivered.lock().expect("lock");
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].values("players"), set(&["A"]));
}

#[test]
fn reset_empties_every_known_group() {
    let (controller, notices) = controller();
    controller.register_group(&key("players"));
    controller.update_group(&key("players"), values(&["A"]));
    controller.seed_group(&key("stat"), values(&["attack_stars"]));
    controller.apply();
    controller.update_group(&key("season"), values(&["2025-11"]));

    controller.reset();

    for selections in [controller.applied(), controller.pending()] {
        assert_eq!(selections.len(), 3);
        assert!(selections.iter().all(|(_, values)| values.is_empty()));
    }
    let notice = notices.visible().expect("reset notice");
    assert_eq!(notice.message, "Filters reset!");
    assert_eq!(notice.kind, NoticeKind::Info);
}

#[test]
fn reset_resyncs_views_and_fires_apply() {
    let (controller, _) = controller();
    let view = Arc::new(RecordingView {
        key: key("players"),
        synced: Mutex::new(Vec::new()),
    });
    controller.attach_view(view.clone());
    let applied_events = Arc::new(Mutex::new(Vec::new()));
    let sink = applied_events.clone();
    controller.subscribe_fn(FilterEventKind::Apply, move |kind, selections| {
        sink.lock().expect("lock").push((kind, selections.has_active()));
    });

    controller.update_group(&key("players"), values(&["A"]));
    controller.reset();

    assert_eq!(view.synced.lock().expect("lock").as_slice(), &[BTreeSet::new()]);
    assert_eq!(
        applied_events.lock().expect("lock").as_slice(),
        &[(FilterEventKind::Apply, false)]
    );
}

#[test]
fn change_listeners_receive_full_pending_map() {
    let (controller, _) = controller();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    controller.subscribe_fn(FilterEventKind::Change, move |_, selections| {
        sink.lock().expect("lock").push(selections.clone());
    });

    controller.update_group(&key("players"), values(&["A"]));
    controller.update_group(&key("stat"), values(&["attack_stars", "attack_stars"]));

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].len(), 2);
    assert_eq!(seen[1].values("stat").len(), 1);
    assert_eq!(seen[1].values("players"), set(&["A"]));
}

#[test]
fn listeners_run_in_registration_order_without_dedupe() {
    let (controller, _) = controller();
    let order = Arc::new(Mutex::new(Vec::new()));
    for label in ["table", "chart", "table"] {
        let sink = order.clone();
        controller.subscribe_fn(FilterEventKind::Apply, move |_, _| {
            sink.lock().expect("lock").push(label);
        });
    }
    let change_sink = order.clone();
    controller.subscribe_fn(FilterEventKind::Change, move |_, _| {
        change_sink.lock().expect("lock").push("change");
    });

    controller.apply();

    assert_eq!(
        order.lock().expect("lock").as_slice(),
        &["table", "chart", "table"]
    );
}

#[test]
fn listeners_may_read_controller_during_dispatch() {
    let (controller, _) = controller();
    let reader = Arc::downgrade(&controller);
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    controller.subscribe_fn(FilterEventKind::Apply, move |_, _| {
        let controller = reader.upgrade().expect("controller alive");
        *sink.lock().expect("lock") = Some(controller.applied_group("players"));
    });

    controller.update_group(&key("players"), values(&["A"]));
    controller.apply();

    assert_eq!(
        seen.lock().expect("lock").clone(),
        Some(set(&["A"]))
    );
}

#[test]
fn unregistered_groups_read_as_empty() {
    let (controller, _) = controller();
    assert!(controller.applied_group("ghost").is_empty());
    assert!(controller.pending_group("ghost").is_empty());
    controller.apply();
    assert!(controller.applied().is_empty());
}

#[test]
fn set_group_syncs_only_matching_views() {
    let (controller, _) = controller();
    let players = Arc::new(RecordingView {
        key: key("players"),
        synced: Mutex::new(Vec::new()),
    });
    let stat = Arc::new(RecordingView {
        key: key("stat"),
        synced: Mutex::new(Vec::new()),
    });
    controller.attach_view(players.clone());
    controller.attach_view(stat.clone());

    controller.set_group(&key("players"), values(&["B"]));

    assert_eq!(players.synced.lock().expect("lock").len(), 1);
    assert!(stat.synced.lock().expect("lock").is_empty());
    assert!(controller.applied_group("players").is_empty());
}

#[test]
fn seed_group_sets_pending_and_applied_quietly() {
    let (controller, notices) = controller();
    let calls = Arc::new(Mutex::new(0));
    let sink = calls.clone();
    controller.subscribe_fn(FilterEventKind::Change, move |_, _| {
        *sink.lock().expect("lock") += 1;
    });

    controller.seed_group(&key("stat"), values(&["attack_stars"]));

    assert_eq!(*calls.lock().expect("lock"), 0);
    assert_eq!(controller.applied(), controller.pending());
    assert!(notices.visible().is_none());
    assert_eq!(controller.group_keys(), vec![key("stat")]);
}

#[test]
fn apply_shows_success_notice() {
    let (controller, notices) = controller();
    controller.apply();
    let notice = notices.visible().expect("notice");
    assert_eq!(notice.message, "Filters applied!");
    assert_eq!(notice.kind, NoticeKind::Success);
}
