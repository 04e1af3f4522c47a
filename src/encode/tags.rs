//! Tag sets are merged into the record rather than nested under one key, so collectors
//! can index valued tags as ordinary fields.

use super::Record;
use crate::event::{TagSet, Value};

/// Merges `tags` into `out`.
///
/// Flag tags are appended to the list at `out[label]`. A non-list value already stored
/// there is replaced, since flags must not be lost to a scalar collision.
/// Valued tags are written under their own key.
pub fn flatten(label: &str, tags: &TagSet, out: &mut Record) {
    let mut flags = tags.flags().peekable();
    if flags.peek().is_some() {
        let list = out.list_mut(label);
        list.extend(flags.map(|flag| Value::Str(flag.to_string())));
    }
    for (key, value) in tags.values() {
        out.insert(key, value.clone());
    }
}
