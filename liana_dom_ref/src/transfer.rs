// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording data transfer for fixtures.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Vec2;

use liana_dom::{DataTransfer, DropEffect, SetDataError};

use crate::NodeKey;

/// A [`DataTransfer`] implementation that records what the backend did.
///
/// Reads answer fixture data; writes land in public fields for assertions.
/// The `rejecting_set_data` switch simulates engines that refuse custom
/// payload types.
#[derive(Clone, Debug, Default)]
pub struct RefTransfer {
    types: Vec<String>,
    data: HashMap<String, String>,
    files: Vec<String>,
    supports_drag_image: bool,
    reject_set_data: bool,

    /// The last drop effect the backend set, if any.
    pub drop_effect: Option<DropEffect>,
    /// The drag image the backend installed, if any.
    pub drag_image: Option<(NodeKey, Vec2)>,
    /// Every accepted `set_data` call, in order.
    pub set_data_log: Vec<(String, String)>,
}

impl RefTransfer {
    /// An empty transfer (an internal drag with no native payload).
    #[must_use]
    pub fn new() -> Self {
        Self {
            supports_drag_image: true,
            ..Self::default()
        }
    }

    /// A transfer advertising dragged files.
    #[must_use]
    pub fn with_files(names: &[&str]) -> Self {
        let mut transfer = Self::new();
        transfer.types.push("Files".to_string());
        transfer.files = names.iter().map(|n| (*n).to_string()).collect();
        transfer
    }

    /// A transfer advertising a URL payload.
    #[must_use]
    pub fn with_urls(uri_list: &str) -> Self {
        let mut transfer = Self::new();
        transfer.types.push("text/uri-list".to_string());
        transfer
            .data
            .insert("text/uri-list".to_string(), uri_list.to_string());
        transfer
    }

    /// A transfer advertising an arbitrary type with no payload data.
    #[must_use]
    pub fn with_type(name: &str) -> Self {
        let mut transfer = Self::new();
        transfer.types.push(name.to_string());
        transfer
    }

    /// A transfer advertising a plain-text payload.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut transfer = Self::new();
        transfer.types.push("text/plain".to_string());
        transfer
            .data
            .insert("text/plain".to_string(), text.to_string());
        transfer
    }

    /// Simulate an engine without custom drag images.
    #[must_use]
    pub fn without_drag_image_support(mut self) -> Self {
        self.supports_drag_image = false;
        self
    }

    /// Simulate an engine that rejects custom `set_data` types.
    #[must_use]
    pub fn rejecting_set_data(mut self) -> Self {
        self.reject_set_data = true;
        self
    }
}

impl DataTransfer<NodeKey> for RefTransfer {
    fn type_names(&self) -> Vec<String> {
        self.types.clone()
    }

    fn string_data(&self, format: &str) -> Option<String> {
        self.data.get(format).cloned()
    }

    fn file_names(&self) -> Vec<String> {
        self.files.clone()
    }

    fn set_drop_effect(&mut self, effect: DropEffect) {
        self.drop_effect = Some(effect);
    }

    fn supports_set_drag_image(&self) -> bool {
        self.supports_drag_image
    }

    fn set_drag_image(&mut self, node: NodeKey, offset: Vec2) {
        self.drag_image = Some((node, offset));
    }

    fn set_data(&mut self, format: &str, data: &str) -> Result<(), SetDataError> {
        if self.reject_set_data {
            return Err(SetDataError);
        }
        self.set_data_log.push((format.to_string(), data.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_constructors_advertise_the_right_types() {
        assert_eq!(RefTransfer::new().type_names(), Vec::<String>::new());
        assert_eq!(RefTransfer::with_files(&["a.txt"]).type_names(), ["Files"]);
        assert_eq!(
            RefTransfer::with_urls("https://example.com").type_names(),
            ["text/uri-list"]
        );
        assert_eq!(RefTransfer::with_text("hi").type_names(), ["text/plain"]);
    }

    #[test]
    fn rejecting_set_data_errors_and_records_nothing() {
        let mut transfer = RefTransfer::new().rejecting_set_data();
        assert!(transfer.set_data("application/json", "{}").is_err());
        assert!(transfer.set_data_log.is_empty());
    }
}
