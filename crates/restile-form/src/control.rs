//! Rendered control handles.

use std::collections::BTreeMap;

use crate::options::SelectOption;

/// Presentation state of one rendered field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlHandle {
    pub hidden: bool,
    /// Text shown by a field whose value is not bound to the form data.
    pub display: Option<String>,
    /// Choices loaded for a select widget.
    pub choices: Option<Vec<SelectOption>>,
}

/// Control handles of a rendered form, keyed by dotted field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    handles: BTreeMap<String, ControlHandle>,
}

impl Controls {
    /// Creates a visible handle for every path.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handles = paths
            .into_iter()
            .map(|path| (path.into(), ControlHandle::default()))
            .collect();
        Self { handles }
    }

    pub fn get(&self, path: &str) -> Option<&ControlHandle> {
        self.handles.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut ControlHandle> {
        self.handles.get_mut(path)
    }

    /// Hides the control at `path`; returns whether it exists.
    pub fn hide(&mut self, path: &str) -> bool {
        match self.handles.get_mut(path) {
            Some(handle) => {
                handle.hidden = true;
                true
            }
            None => false,
        }
    }

    pub fn is_hidden(&self, path: &str) -> bool {
        self.handles.get(path).is_some_and(|handle| handle.hidden)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }
}
