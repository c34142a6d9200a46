//! Transitive closure of message and enum types reachable from root messages.

use std::collections::BTreeSet;

use crate::descriptor::FieldType;
use crate::error::Result;
use crate::index::{DescriptorIndex, MessageDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Want {
    Messages,
    Enums,
}

/// Types related to a set of roots. Ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    pub messages: BTreeSet<String>,
    pub enums: BTreeSet<String>,
}

impl Closure {
    pub fn select(self, want: Want) -> BTreeSet<String> {
        match want {
            Want::Messages => self.messages,
            Want::Enums => self.enums,
        }
    }
}

/// Walk field references starting at `roots`.
///
/// - Roots and `excluded` are never reported and never expanded.
/// - Map entries are looked through: their key/value fields are inspected, the
///   entry type itself is never reported.
/// - Enums are leaves.
pub fn related_types<S: AsRef<str>>(
    index: &DescriptorIndex,
    roots: &[S],
    excluded: &BTreeSet<String>,
) -> Result<Closure> {
    let mut result = Closure::default();
    let mut visited: BTreeSet<String> = excluded.clone();
    let mut pending: Vec<&MessageDescriptor> = Vec::new();

    for root in roots {
        let root = root.as_ref();
        visited.insert(root.to_string());
        if !excluded.contains(root) {
            pending.push(index.message(root)?);
        }
    }

    while let Some(message) = pending.pop() {
        for field in &message.fields {
            let Some(target) = field.type_name.as_deref() else {
                continue;
            };
            match field.field_type()? {
                FieldType::Enum => {
                    if !excluded.contains(target) {
                        result.enums.insert(target.to_string());
                    }
                }
                FieldType::Message | FieldType::Group => {
                    if visited.contains(target) {
                        continue;
                    }
                    let nested = index.message(target)?;
                    visited.insert(target.to_string());
                    if !nested.map_entry {
                        result.messages.insert(target.to_string());
                    }
                    pending.push(nested);
                }
                _ => {}
            }
        }
    }

    Ok(result)
}

pub fn closure<S: AsRef<str>>(
    index: &DescriptorIndex,
    roots: &[S],
    excluded: &BTreeSet<String>,
    want: Want,
) -> Result<BTreeSet<String>> {
    Ok(related_types(index, roots, excluded)?.select(want))
}
