//! Selection controls shared between the directory and the coordinators.

use std::sync::{Arc, Mutex, MutexGuard};

/// One entry of a selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// An option shown for information only; it can never be selected.
    pub fn disabled(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            disabled: true,
            ..Self::new(value, label)
        }
    }

    /// Option whose value and label are the same text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }
}

/// A single-selection control: ordered options, current value, enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    options: Vec<SelectOption>,
    value: String,
    enabled: bool,
}

/// Selector shared between its renderer and its reader.
pub type SharedSelector = Arc<Mutex<Selector>>;

impl Selector {
    pub fn new(options: Vec<SelectOption>) -> Self {
        let mut selector = Self {
            options,
            value: String::new(),
            enabled: true,
        };
        selector.select_first();
        selector
    }

    /// Single empty-valued placeholder option.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self::new(vec![SelectOption::new("", label)])
    }

    pub fn shared(self) -> SharedSelector {
        Arc::new(Mutex::new(self))
    }

    /// Replace every option. The current value survives if an enabled
    /// option still carries it; otherwise selection falls back to the first option.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        let kept = options
            .iter()
            .any(|o| !o.disabled && o.value == self.value);
        self.options = options;
        if !kept {
            self.select_first();
        }
    }

    /// Replace every option and select the first one.
    pub fn reset_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.select_first();
    }

    pub fn select_first(&mut self) {
        self.value = self
            .options
            .first()
            .map(|o| o.value.clone())
            .unwrap_or_default();
    }

    /// Select the option with exactly this value. Disabled options are skipped.
    pub fn select(&mut self, value: &str) -> bool {
        self.select_where(|o| o.value == value)
    }

    /// Select the first enabled option matching `predicate`.
    pub fn select_where<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&SelectOption) -> bool,
    {
        match self.options.iter().find(|o| !o.disabled && predicate(o)) {
            Some(option) => {
                self.value = option.value.clone();
                true
            }
            None => false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Option values in display order.
    pub fn values(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Lock a shared selector, recovering the data if a holder panicked.
pub fn lock(selector: &SharedSelector) -> MutexGuard<'_, Selector> {
    selector.lock().unwrap_or_else(|e| e.into_inner())
}
