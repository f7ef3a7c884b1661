//! Dropdown selection widgets bound to one filter group each.

use std::{
    collections::BTreeSet,
    fmt::Write as _,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{FilterGroupKey, OptionValue, SelectionMode};
use tracing::{debug, warn};

use crate::{
    controller::{FilterController, SelectionView},
    html::{escape_html, id_fragment},
    registry::FilterDescriptor,
};

/// Where inside an option row the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Input,
    Label,
    Row,
}

/// Derived state of the "Select All" master checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl MasterState {
    pub fn from_counts(checked: usize, total: usize) -> Self {
        if total > 0 && checked == total {
            MasterState::Checked
        } else if checked > 0 {
            MasterState::Indeterminate
        } else {
            MasterState::Unchecked
        }
    }
}

/// Keeps at most one dropdown panel open across all widgets sharing it.
#[derive(Debug, Default)]
pub struct PanelCoordinator {
    open: Mutex<Option<FilterGroupKey>>,
}

impl PanelCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn open(&self) -> MutexGuard<'_, Option<FilterGroupKey>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens `key`'s panel (closing any other) or closes it if it was already open.
    pub fn toggle(&self, key: &FilterGroupKey) -> bool {
        let mut open = self.open();
        if open.as_ref() == Some(key) {
            *open = None;
            false
        } else {
            *open = Some(key.clone());
            true
        }
    }

    /// Closes whichever panel is open, as a click outside every dropdown does.
    pub fn close_all(&self) {
        *self.open() = None;
    }

    pub fn is_open(&self, key: &FilterGroupKey) -> bool {
        self.open().as_ref() == Some(key)
    }

    pub fn open_group(&self) -> Option<FilterGroupKey> {
        self.open().clone()
    }
}

pub struct SelectionWidget {
    descriptor: FilterDescriptor,
    controller: Arc<FilterController>,
    panels: Arc<PanelCoordinator>,
    checked: Mutex<BTreeSet<OptionValue>>,
}

impl SelectionWidget {
    /// Builds the widget, registers its group and attaches it to the controller.
    ///
    /// A descriptor default is checked and seeded as both pending and applied state.
    pub fn mount(
        descriptor: FilterDescriptor,
        controller: Arc<FilterController>,
        panels: Arc<PanelCoordinator>,
    ) -> Arc<Self> {
        controller.register_group(&descriptor.key);

        let mut checked = BTreeSet::new();
        if let Some(default) = &descriptor.default {
            if descriptor.option(default.as_str()).is_some() {
                checked.insert(default.clone());
                controller.seed_group(&descriptor.key, [default.clone()]);
            } else {
                warn!(group = %descriptor.key, %default, "default is not one of the options");
            }
        }

        let widget = Arc::new(Self {
            descriptor,
            controller: Arc::clone(&controller),
            panels,
            checked: Mutex::new(checked),
        });
        controller.attach_view(widget.clone());
        debug!(group = %widget.descriptor.key, "selection widget mounted");
        widget
    }

    fn checked_guard(&self) -> MutexGuard<'_, BTreeSet<OptionValue>> {
        self.checked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> &FilterGroupKey {
        &self.descriptor.key
    }

    pub fn mode(&self) -> SelectionMode {
        self.descriptor.mode
    }

    pub fn descriptor(&self) -> &FilterDescriptor {
        &self.descriptor
    }

    pub fn checked(&self) -> BTreeSet<OptionValue> {
        self.checked_guard().clone()
    }

    pub fn is_checked(&self, value: &str) -> bool {
        self.checked_guard().contains(value)
    }

    /// The single path through which every input state change reaches the controller.
    pub fn input_changed(&self, value: &str, checked: bool) {
        let Some(option) = self.descriptor.option(value) else {
            debug!(group = %self.descriptor.key, value, "ignoring change for unknown option");
            return;
        };

        let selection = {
            let mut current = self.checked_guard();
            match (self.descriptor.mode, checked) {
                (SelectionMode::Single, true) => {
                    current.clear();
                    current.insert(option.value.clone());
                }
                (_, true) => {
                    current.insert(option.value.clone());
                }
                (_, false) => {
                    current.remove(value);
                }
            }
            current.clone()
        };
        self.controller.update_group(&self.descriptor.key, selection);
    }

    /// Routes a click inside an option row.
    ///
    /// Input and label clicks get native input semantics (a radio only ever becomes checked);
    /// a click elsewhere on the row flips the input. Both re-dispatch via [`Self::input_changed`].
    pub fn click_option(&self, value: &str, target: ClickTarget) {
        let currently = self.is_checked(value);
        let next = match (target, self.descriptor.mode) {
            (ClickTarget::Input | ClickTarget::Label, SelectionMode::Single) => true,
            _ => !currently,
        };
        self.input_changed(value, next);
    }

    /// Master "Select All" toggle; multi-select only.
    pub fn select_all_changed(&self, checked: bool) {
        if self.descriptor.mode == SelectionMode::Single {
            debug!(group = %self.descriptor.key, "single-select widget has no select-all control");
            return;
        }
        let selection = {
            let mut current = self.checked_guard();
            if checked {
                current.extend(self.descriptor.options.iter().map(|o| o.value.clone()));
            } else {
                current.clear();
            }
            current.clone()
        };
        self.controller.update_group(&self.descriptor.key, selection);
    }

    pub fn master_state(&self) -> MasterState {
        MasterState::from_counts(self.checked_guard().len(), self.descriptor.options.len())
    }

    /// Trigger text reflecting the pending (not applied) selection.
    pub fn summary_label(&self) -> String {
        let checked = self.checked_guard();
        match self.descriptor.mode {
            SelectionMode::Single => checked
                .iter()
                .next()
                .and_then(|value| self.descriptor.option(value.as_str()))
                .map(|option| option.label.clone())
                .unwrap_or_else(|| self.descriptor.placeholder()),
            SelectionMode::Multi if checked.is_empty() => self.descriptor.placeholder(),
            SelectionMode::Multi => format!("{} selected", checked.len()),
        }
    }

    pub fn toggle_panel(&self) -> bool {
        self.panels.toggle(&self.descriptor.key)
    }

    pub fn is_open(&self) -> bool {
        self.panels.is_open(&self.descriptor.key)
    }

    pub fn render(&self) -> String {
        let key = escape_html(self.descriptor.key.as_str());
        let id = id_fragment(self.descriptor.key.as_str());
        let label = escape_html(&self.descriptor.label);
        let open = self.is_open();
        let single = self.descriptor.mode == SelectionMode::Single;
        let input_type = if single { "radio" } else { "checkbox" };

        let mut out = String::new();
        let _ = write!(
            out,
            "<label>Select {label}:</label>\
             <div class=\"multi-select-dropdown\" data-filter-type=\"{key}\">\
             <div class=\"multi-select-trigger{active}\" id=\"{id}-trigger\">\
             <span id=\"{id}-count\">{summary}</span><div class=\"arrow\">&#9660;</div></div>\
             <div class=\"multi-select-panel{show}\" id=\"{id}-panel\">",
            active = if open { " active" } else { "" },
            summary = escape_html(&self.summary_label()),
            show = if open { " show" } else { "" },
        );

        if !single {
            let master = match self.master_state() {
                MasterState::Checked => " checked",
                MasterState::Indeterminate => " data-indeterminate=\"true\"",
                MasterState::Unchecked => "",
            };
            let _ = write!(
                out,
                "<div class=\"multi-select-option select-all-option\">\
                 <input type=\"checkbox\" id=\"select-all-{id}\"{master}><span>Select All</span></div>"
            );
        }

        let checked = self.checked();
        for option in &self.descriptor.options {
            let value = escape_html(option.value.as_str());
            let input_id = format!("{id}-{}", id_fragment(option.value.as_str()));
            let _ = write!(
                out,
                "<div class=\"multi-select-option\">\
                 <input type=\"{input_type}\" name=\"{id}-input\" class=\"{id}-checkbox\" \
                 value=\"{value}\" id=\"{input_id}\"{checked}>\
                 <label for=\"{input_id}\">{label}</label></div>",
                checked = if checked.contains(&option.value) { " checked" } else { "" },
                label = escape_html(&option.label),
            );
        }
        out.push_str("</div></div>");
        out
    }
}

impl SelectionView for SelectionWidget {
    fn group(&self) -> &FilterGroupKey {
        &self.descriptor.key
    }

    fn sync_checked(&self, selected: &BTreeSet<OptionValue>) {
        let mut checked = self.checked_guard();
        *checked = selected
            .iter()
            .filter(|value| self.descriptor.option(value.as_str()).is_some())
            .cloned()
            .collect();
    }
}

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod tests;
