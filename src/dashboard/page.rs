//! The rendered document as the user interacts with it.
//!
//! `Page` owns the table body produced by the renderer and stands in for the
//! browser: it flips checkbox state on user input and dispatches a change
//! event to the single attached observer. Nothing else writes to it.

use crate::dashboard::index::CheckboxId;
use crate::dashboard::markup::Element;
use crate::dashboard::render::{CHECKBOX_CLASS, SUMMARY_ROW_CLASS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub target: CheckboxId,
    pub checked: bool,
}

pub type ChangeObserver = Box<dyn Fn(&ChangeEvent) + Send>;

pub struct Page {
    tbody: Element,
    observer: Option<ChangeObserver>,
}

impl Page {
    pub fn new(tbody: Element) -> Self {
        Self {
            tbody,
            observer: None,
        }
    }

    pub fn summary_rows(&self) -> Vec<&Element> {
        self.tbody.children().filter(|row| row.has_class(SUMMARY_ROW_CLASS)).collect()
    }

    pub fn is_checked(&self, id: &str) -> Option<bool> {
        self.tbody
            .descendants()
            .into_iter()
            .find(|e| is_checkbox(e) && e.get_attr("id") == Some(id))
            .map(|e| e.has_attr("checked"))
    }

    /// Registers the page's change observer. Only the first call takes effect.
    pub fn attach_change_observer(&mut self, observer: ChangeObserver) -> bool {
        if self.observer.is_some() {
            tracing::warn!("change observer already attached");
            return false;
        }
        self.observer = Some(observer);
        true
    }

    /// Sets a checkbox as the user would. Returns whether a change event fired.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        let Some(checkbox) = self.tbody.find_by_id_mut(id).filter(|e| is_checkbox(e)) else {
            tracing::debug!(id, "no such checkbox");
            return false;
        };

        if checkbox.has_attr("checked") == checked {
            return false;
        }
        if checked {
            checkbox.set_attr("checked", "");
        } else {
            checkbox.remove_attr("checked");
        }

        let event = ChangeEvent {
            target: CheckboxId::from(id),
            checked,
        };
        if let Some(observer) = &self.observer {
            observer(&event);
        }
        true
    }
}

#[cfg(test)]
impl Page {
    pub fn html(&self) -> String {
        self.tbody.to_string()
    }

    pub fn detail_rows(&self) -> Vec<&Element> {
        use crate::dashboard::render::DETAIL_ROW_CLASS;
        self.tbody.children().filter(|row| row.has_class(DETAIL_ROW_CLASS)).collect()
    }

    pub fn checkbox_ids(&self) -> Vec<CheckboxId> {
        self.tbody
            .descendants()
            .into_iter()
            .filter(|e| is_checkbox(e))
            .filter_map(|e| e.get_attr("id"))
            .map(CheckboxId::from)
            .collect()
    }

    /// Flips a checkbox.
    pub fn click(&mut self, id: &str) -> bool {
        match self.is_checked(id) {
            Some(checked) => self.set_checked(id, !checked),
            None => false,
        }
    }
}

fn is_checkbox(element: &Element) -> bool {
    element.tag() == "input" && element.get_attr("type") == Some("checkbox") && element.has_class(CHECKBOX_CLASS)
}
