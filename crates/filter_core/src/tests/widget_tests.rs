use super::*;

use crate::{controller::FilterEventKind, feedback::NoticeBoard, registry::FilterOption};

fn players() -> FilterDescriptor {
    FilterDescriptor::new("players", "Players").with_options(vec![
        FilterOption::plain("A"),
        FilterOption::plain("B"),
        FilterOption::plain("C"),
    ])
}

fn stat() -> FilterDescriptor {
    FilterDescriptor::new("stat", "Stat")
        .single_select()
        .with_options(vec![
            FilterOption::new("attack_stars", "Attack Stars"),
            FilterOption::new("defense_stars", "Defense Stars"),
        ])
        .with_default("attack_stars")
}

fn setup() -> (Arc<FilterController>, Arc<PanelCoordinator>) {
    (
        FilterController::new(Arc::new(NoticeBoard::default())),
        PanelCoordinator::new(),
    )
}

fn pending(controller: &FilterController, key: &str) -> Vec<String> {
    controller
        .pending_group(key)
        .into_iter()
        .map(|value| value.0)
        .collect()
}

#[test]
fn mounting_registers_group() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);
    assert!(controller.pending().contains_group("players"));
    assert!(controller.applied().contains_group("players"));
    assert_eq!(widget.summary_label(), "Select Players");
    assert_eq!(widget.master_state(), MasterState::Unchecked);
}

#[test]
fn checkbox_changes_update_pending_only() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);

    widget.input_changed("A", true);
    widget.input_changed("C", true);
    assert_eq!(pending(&controller, "players"), vec!["A", "C"]);
    assert!(controller.applied_group("players").is_empty());
    assert_eq!(widget.summary_label(), "2 selected");
    assert_eq!(widget.master_state(), MasterState::Indeterminate);

    widget.input_changed("A", false);
    assert_eq!(pending(&controller, "players"), vec!["C"]);
    assert_eq!(widget.summary_label(), "1 selected");
}

#[test]
fn row_click_toggles_through_same_path() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);
    let changes = Arc::new(Mutex::new(0));
    let sink = changes.clone();
    controller.subscribe_fn(FilterEventKind::Change, move |_, _| {
        *sink.lock().expect("lock") += 1;
    });

    widget.click_option("B", ClickTarget::Row);
    assert!(widget.is_checked("B"));
    widget.click_option("B", ClickTarget::Row);
    assert!(!widget.is_checked("B"));
    widget.click_option("B", ClickTarget::Input);
    assert!(widget.is_checked("B"));
    widget.click_option("B", ClickTarget::Label);
    assert!(!widget.is_checked("B"));

    assert_eq!(*changes.lock().expect("lock"), 4);
    assert!(pending(&controller, "players").is_empty());
}

#[test]
fn select_all_drives_master_state() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);

    widget.select_all_changed(true);
    assert_eq!(widget.master_state(), MasterState::Checked);
    assert_eq!(pending(&controller, "players"), vec!["A", "B", "C"]);
    assert_eq!(widget.summary_label(), "3 selected");

    widget.input_changed("B", false);
    assert_eq!(widget.master_state(), MasterState::Indeterminate);

    widget.select_all_changed(false);
    assert_eq!(widget.master_state(), MasterState::Unchecked);
    assert!(pending(&controller, "players").is_empty());
}

#[test]
fn master_state_with_no_options_is_unchecked() {
    assert_eq!(MasterState::from_counts(0, 0), MasterState::Unchecked);
    assert_eq!(MasterState::from_counts(2, 2), MasterState::Checked);
}

#[test]
fn single_select_default_is_seeded_as_applied() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(stat(), controller.clone(), panels);

    assert_eq!(widget.summary_label(), "Attack Stars");
    assert_eq!(pending(&controller, "stat"), vec!["attack_stars"]);
    assert_eq!(controller.applied(), controller.pending());
}

#[test]
fn radio_semantics_keep_one_value() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(stat(), controller.clone(), panels);

    widget.click_option("defense_stars", ClickTarget::Input);
    assert_eq!(pending(&controller, "stat"), vec!["defense_stars"]);
    assert_eq!(widget.summary_label(), "Defense Stars");

    // clicking a checked radio leaves it checked
    widget.click_option("defense_stars", ClickTarget::Label);
    assert_eq!(pending(&controller, "stat"), vec!["defense_stars"]);

    // a row click flips the input, which can clear a radio
    widget.click_option("defense_stars", ClickTarget::Row);
    assert!(pending(&controller, "stat").is_empty());
    assert_eq!(widget.summary_label(), "Select Stat");

    widget.select_all_changed(true);
    assert!(pending(&controller, "stat").is_empty());
}

#[test]
fn unknown_option_is_ignored() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);
    widget.input_changed("Z", true);
    assert!(pending(&controller, "players").is_empty());
}

#[test]
fn opening_one_panel_closes_the_other() {
    let (controller, panels) = setup();
    let players = SelectionWidget::mount(players(), controller.clone(), panels.clone());
    let stat = SelectionWidget::mount(stat(), controller, panels.clone());

    assert!(players.toggle_panel());
    assert!(players.is_open());
    assert!(stat.toggle_panel());
    assert!(stat.is_open());
    assert!(!players.is_open());

    assert!(!stat.toggle_panel());
    assert_eq!(panels.open_group(), None);
}

#[test]
fn reset_clears_widget_state() {
    let (controller, panels) = setup();
    let players = SelectionWidget::mount(players(), controller.clone(), panels.clone());
    let stat = SelectionWidget::mount(stat(), controller.clone(), panels);
    players.input_changed("A", true);
    controller.apply();

    controller.reset();

    assert!(players.checked().is_empty());
    assert!(stat.checked().is_empty());
    assert_eq!(players.summary_label(), "Select Players");
    assert_eq!(stat.summary_label(), "Select Stat");
}

#[test]
fn set_group_reflects_in_widget() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(players(), controller.clone(), panels);
    controller.set_group(
        &FilterGroupKey::from("players"),
        [OptionValue::from("B"), OptionValue::from("Z")],
    );
    assert_eq!(
        widget.checked(),
        [OptionValue::from("B")].into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn render_escapes_labels_and_marks_state() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(
        FilterDescriptor::new("players", "Players").with_options(vec![
            FilterOption::new("x<y", "<b>X</b>"),
            FilterOption::plain("B"),
        ]),
        controller,
        panels,
    );
    widget.input_changed("B", true);
    widget.toggle_panel();

    let html = widget.render();
    assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
    assert!(!html.contains("<b>X</b>"));
    assert!(html.contains("value=\"x&lt;y\""));
    assert!(html.contains("value=\"B\" id=\"players-B\" checked"));
    assert!(html.contains("multi-select-panel show"));
    assert!(html.contains("data-indeterminate=\"true\""));
    assert!(html.contains(">1 selected<"));
}

#[test]
fn single_select_renders_radios_without_master() {
    let (controller, panels) = setup();
    let widget = SelectionWidget::mount(stat(), controller, panels);
    let html = widget.render();
    assert!(html.contains("type=\"radio\""));
    assert!(!html.contains("select-all-stat"));
    assert!(html.contains("value=\"attack_stars\" id=\"stat-attack_stars\" checked"));
}
