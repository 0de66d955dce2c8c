// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native drag payloads: files, URLs, and plain text.
//!
//! Drags that originate outside the managed application — a file from the
//! desktop, a link from another tab — carry no registered source. The
//! backend recognizes them from the data transfer's type list and registers
//! a synthetic source for the duration of the drag, so targets can treat
//! native payloads like any other drag item.
//!
//! Payload *contents* are only readable inside the drop handler on most
//! engines; until then a native source carries an empty
//! [`NativeItem`]. [`NativeDragSource::mutate_item_by_reading_data_transfer`]
//! fills it in synchronously at drop time.

use alloc::string::String;
use alloc::vec::Vec;

use liana_dom::DataTransfer;

/// The recognized kinds of native drag payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeItemKind {
    /// One or more files.
    File,
    /// One or more URLs.
    Url,
    /// Plain text.
    Text,
}

impl NativeItemKind {
    /// The data-transfer type names that advertise this kind.
    fn type_matches(self, name: &str) -> bool {
        match self {
            Self::File => name == "Files",
            Self::Url => name == "Url" || name == "text/uri-list",
            Self::Text => name == "Text" || name == "text/plain",
        }
    }

    /// The formats to read the payload from, in preference order.
    fn data_formats(self) -> &'static [&'static str] {
        match self {
            Self::File => &[],
            Self::Url => &["Url", "text/uri-list"],
            Self::Text => &["Text", "text/plain"],
        }
    }
}

/// Recognize a native payload from the transfer's advertised types.
///
/// Checked in file → URL → text order; returns `None` for transfers that
/// advertise none of the known kinds (those are left to the browser).
#[must_use]
pub fn match_native_item_type<N, T: DataTransfer<N>>(transfer: &T) -> Option<NativeItemKind> {
    let types = transfer.type_names();
    [NativeItemKind::File, NativeItemKind::Url, NativeItemKind::Text]
        .into_iter()
        .find(|kind| types.iter().any(|t| kind.type_matches(t)))
}

/// The payload of a native drag, filled at drop time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeItem {
    /// Dragged file names, for [`NativeItemKind::File`].
    pub files: Vec<String>,
    /// Dragged URLs, for [`NativeItemKind::Url`].
    pub urls: Vec<String>,
    /// Dragged text, for [`NativeItemKind::Text`].
    pub text: String,
}

/// A synthetic drag source standing in for a native payload.
///
/// Registered with the external registry for the duration of the native
/// drag and removed when it ends.
#[derive(Clone, Debug)]
pub struct NativeDragSource {
    kind: NativeItemKind,
    item: NativeItem,
}

impl NativeDragSource {
    /// Which native kind this source stands in for.
    #[must_use]
    pub fn kind(&self) -> NativeItemKind {
        self.kind
    }

    /// The payload read so far. Empty until a drop has been captured.
    #[must_use]
    pub fn item(&self) -> &NativeItem {
        &self.item
    }

    /// Read the payload out of the drop event's data transfer.
    ///
    /// Synchronous by necessity: drag data is only readable inside the drop
    /// handler in most engines. Multi-line URL and text payloads split into
    /// one entry per line.
    pub fn mutate_item_by_reading_data_transfer<N, T: DataTransfer<N>>(&mut self, transfer: &T) {
        match self.kind {
            NativeItemKind::File => {
                self.item.files = transfer.file_names();
            }
            NativeItemKind::Url => {
                self.item.urls = first_data(transfer, self.kind)
                    .map(|data| data.lines().map(String::from).collect())
                    .unwrap_or_default();
            }
            NativeItemKind::Text => {
                self.item.text = first_data(transfer, self.kind).unwrap_or_default();
            }
        }
    }
}

/// The first readable payload among the kind's formats.
fn first_data<N, T: DataTransfer<N>>(transfer: &T, kind: NativeItemKind) -> Option<String> {
    kind.data_formats()
        .iter()
        .find_map(|&format| transfer.string_data(format))
}

/// Create an empty synthetic source for a recognized native kind.
#[must_use]
pub fn create_native_drag_source(kind: NativeItemKind) -> NativeDragSource {
    NativeDragSource {
        kind,
        item: NativeItem::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::borrow::ToOwned;
    use alloc::string::ToString;
    use alloc::vec;
    use hashbrown::HashMap;
    use kurbo::Vec2;
    use liana_dom::{DropEffect, SetDataError};

    #[derive(Default)]
    struct FakeTransfer {
        types: Vec<String>,
        data: HashMap<String, String>,
        files: Vec<String>,
    }

    impl DataTransfer<u32> for FakeTransfer {
        fn type_names(&self) -> Vec<String> {
            self.types.clone()
        }
        fn string_data(&self, format: &str) -> Option<String> {
            self.data.get(format).cloned()
        }
        fn file_names(&self) -> Vec<String> {
            self.files.clone()
        }
        fn set_drop_effect(&mut self, _effect: DropEffect) {}
        fn supports_set_drag_image(&self) -> bool {
            false
        }
        fn set_drag_image(&mut self, _node: u32, _offset: Vec2) {}
        fn set_data(&mut self, _format: &str, _data: &str) -> Result<(), SetDataError> {
            Ok(())
        }
    }

    #[test]
    fn matches_files_before_urls_and_text() {
        let t = FakeTransfer {
            types: vec!["Files".to_owned(), "text/uri-list".to_owned()],
            ..FakeTransfer::default()
        };
        assert_eq!(match_native_item_type(&t), Some(NativeItemKind::File));
    }

    #[test]
    fn matches_url_aliases() {
        for name in ["Url", "text/uri-list"] {
            let t = FakeTransfer {
                types: vec![name.to_owned()],
                ..FakeTransfer::default()
            };
            assert_eq!(match_native_item_type(&t), Some(NativeItemKind::Url));
        }
    }

    #[test]
    fn unknown_types_match_nothing() {
        let t = FakeTransfer {
            types: vec!["application/x-custom".to_owned()],
            ..FakeTransfer::default()
        };
        assert_eq!(match_native_item_type(&t), None);
        assert_eq!(match_native_item_type(&FakeTransfer::default()), None);
    }

    #[test]
    fn url_payload_splits_lines() {
        let mut source = create_native_drag_source(NativeItemKind::Url);
        let mut data = HashMap::new();
        data.insert(
            "text/uri-list".to_owned(),
            "https://a.example\nhttps://b.example".to_owned(),
        );
        let t = FakeTransfer {
            types: vec!["text/uri-list".to_owned()],
            data,
            ..FakeTransfer::default()
        };
        source.mutate_item_by_reading_data_transfer(&t);
        assert_eq!(
            source.item().urls,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn file_payload_reads_names() {
        let mut source = create_native_drag_source(NativeItemKind::File);
        let t = FakeTransfer {
            types: vec!["Files".to_owned()],
            files: vec!["report.pdf".to_owned()],
            ..FakeTransfer::default()
        };
        source.mutate_item_by_reading_data_transfer(&t);
        assert_eq!(source.item().files, vec!["report.pdf".to_string()]);
        assert!(source.item().text.is_empty());
    }

    #[test]
    fn text_payload_prefers_the_first_readable_format() {
        let mut source = create_native_drag_source(NativeItemKind::Text);
        let mut data = HashMap::new();
        data.insert("text/plain".to_owned(), "hello".to_owned());
        let t = FakeTransfer {
            types: vec!["text/plain".to_owned()],
            data,
            ..FakeTransfer::default()
        };
        source.mutate_item_by_reading_data_transfer(&t);
        assert_eq!(source.item().text, "hello");
    }
}
