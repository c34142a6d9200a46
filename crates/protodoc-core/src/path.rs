//! Structural path → symbol decoding.
//!
//! `SourceCodeInfo.Location.path` addresses a node by alternating
//! `(field number, index)` pairs starting at `FileDescriptorProto`. The field
//! numbers below are those of `descriptor.proto`; they must move in lockstep
//! with [`crate::descriptor`] or comments attach to the wrong symbol.
//!
//! Decoding rules:
//! - a tag naming a child collection (message, field, enum value, ...)
//!   consumes the next item as an index and appends the child's name;
//! - the `name` tag of a node, and the file-level options, source info and
//!   syntax tags, end decoding on the symbol accumulated so far;
//! - any other tag `descriptor.proto` defines for the current context ends
//!   decoding on a [`Resolved::Statement`]: an option, `reserved` range or
//!   similar declaration that has no symbol of its own;
//! - anything else is a [`MalformedPathError`].

use crate::descriptor::{
    DescriptorProto, EnumDescriptorProto, FileDescriptorProto, ServiceDescriptorProto,
};
use crate::error::MalformedPathError;
use crate::index::{file_label, package_scope};

// FileDescriptorProto
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const FILE_EXTENSION: i32 = 7;
const FILE_METADATA: &[i32] = &[1, 2, 3, 8, 9, 10, 11, 12, 14];
const FILE_HEADER: &[i32] = &[8, 9, 12];

// `name` on every node kind below the file.
const NAME: i32 = 1;

// DescriptorProto
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;
const MESSAGE_EXTENSION: i32 = 6;
const MESSAGE_ONEOF_DECL: i32 = 8;
const MESSAGE_METADATA: &[i32] = &[1, 5, 7, 9, 10];

// EnumDescriptorProto
const ENUM_VALUE: i32 = 2;
const ENUM_METADATA: &[i32] = &[1, 3, 4, 5];

// ServiceDescriptorProto
const SERVICE_METHOD: i32 = 2;
const SERVICE_METADATA: &[i32] = &[1, 3];

// Leaves
const FIELD_METADATA: &[i32] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 17];
const ENUM_VALUE_METADATA: &[i32] = &[1, 2, 3];
const METHOD_METADATA: &[i32] = &[1, 2, 3, 4, 5, 6];
const ONEOF_METADATA: &[i32] = &[1, 2];

#[derive(Clone, Copy)]
enum Context<'a> {
    File(&'a FileDescriptorProto),
    Message(&'a DescriptorProto),
    Enum(&'a EnumDescriptorProto),
    Service(&'a ServiceDescriptorProto),
    Field,
    EnumValue,
    Method,
    Oneof,
}

impl<'a> Context<'a> {
    fn label(&self) -> &'static str {
        match self {
            Context::File(_) => "file",
            Context::Message(_) => "message",
            Context::Enum(_) => "enum",
            Context::Service(_) => "service",
            Context::Field => "field",
            Context::EnumValue => "enum value",
            Context::Method => "method",
            Context::Oneof => "oneof",
        }
    }

    /// Whether `tag` addresses the current node itself rather than a
    /// statement inside it.
    fn names_self(&self, tag: i32) -> bool {
        match self {
            Context::File(_) => FILE_HEADER.contains(&tag),
            _ => tag == NAME,
        }
    }

    fn metadata_tags(&self) -> &'static [i32] {
        match self {
            Context::File(_) => FILE_METADATA,
            Context::Message(_) => MESSAGE_METADATA,
            Context::Enum(_) => ENUM_METADATA,
            Context::Service(_) => SERVICE_METADATA,
            Context::Field => FIELD_METADATA,
            Context::EnumValue => ENUM_VALUE_METADATA,
            Context::Method => METHOD_METADATA,
            Context::Oneof => ONEOF_METADATA,
        }
    }

    /// Number of children reachable through `tag`, or `None` when `tag` does
    /// not name a child collection here.
    fn collection_len(&self, tag: i32) -> Option<usize> {
        match (self, tag) {
            (Context::File(f), FILE_MESSAGE_TYPE) => Some(f.message_type.len()),
            (Context::File(f), FILE_ENUM_TYPE) => Some(f.enum_type.len()),
            (Context::File(f), FILE_SERVICE) => Some(f.service.len()),
            (Context::File(f), FILE_EXTENSION) => Some(f.extension.len()),
            (Context::Message(m), MESSAGE_FIELD) => Some(m.field.len()),
            (Context::Message(m), MESSAGE_NESTED_TYPE) => Some(m.nested_type.len()),
            (Context::Message(m), MESSAGE_ENUM_TYPE) => Some(m.enum_type.len()),
            (Context::Message(m), MESSAGE_EXTENSION) => Some(m.extension.len()),
            (Context::Message(m), MESSAGE_ONEOF_DECL) => Some(m.oneof_decl.len()),
            (Context::Enum(e), ENUM_VALUE) => Some(e.value.len()),
            (Context::Service(s), SERVICE_METHOD) => Some(s.method.len()),
            _ => None,
        }
    }

    /// Child at `(tag, idx)`; callers check the bounds first.
    fn child(&self, tag: i32, idx: usize) -> (&'a str, Context<'a>) {
        match (*self, tag) {
            (Context::File(f), FILE_MESSAGE_TYPE) => {
                let m = &f.message_type[idx];
                (m.name(), Context::Message(m))
            }
            (Context::File(f), FILE_ENUM_TYPE) => {
                let e = &f.enum_type[idx];
                (e.name(), Context::Enum(e))
            }
            (Context::File(f), FILE_SERVICE) => {
                let s = &f.service[idx];
                (s.name(), Context::Service(s))
            }
            (Context::File(f), FILE_EXTENSION) => (f.extension[idx].name(), Context::Field),
            (Context::Message(m), MESSAGE_FIELD) => (m.field[idx].name(), Context::Field),
            (Context::Message(m), MESSAGE_NESTED_TYPE) => {
                let n = &m.nested_type[idx];
                (n.name(), Context::Message(n))
            }
            (Context::Message(m), MESSAGE_ENUM_TYPE) => {
                let e = &m.enum_type[idx];
                (e.name(), Context::Enum(e))
            }
            (Context::Message(m), MESSAGE_EXTENSION) => (m.extension[idx].name(), Context::Field),
            (Context::Message(m), MESSAGE_ONEOF_DECL) => (m.oneof_decl[idx].name(), Context::Oneof),
            (Context::Enum(e), ENUM_VALUE) => (e.value[idx].name(), Context::EnumValue),
            (Context::Service(s), SERVICE_METHOD) => (s.method[idx].name(), Context::Method),
            _ => unreachable!("child() called for a tag without a collection"),
        }
    }
}

/// What a structural path addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A symbol, or the name span of one.
    Symbol(String),
    /// A statement inside `owner` with no symbol of its own (`reserved`,
    /// `option ...;`, extension ranges). `tag` is the field of `owner` it
    /// belongs to.
    Statement { owner: String, tag: i32 },
}

impl Resolved {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Resolved::Symbol(symbol) => Some(symbol),
            Resolved::Statement { .. } => None,
        }
    }
}

/// Resolve a structural path recorded in `file` to what it addresses.
pub fn resolve(file: &FileDescriptorProto, path: &[i32]) -> Result<Resolved, MalformedPathError> {
    let malformed = |reason: String| MalformedPathError {
        file: file_label(file).to_string(),
        path: path.to_vec(),
        reason,
    };

    let mut symbol = package_scope(file.package());
    let mut context = Context::File(file);
    let mut items = path.iter().copied();

    while let Some(tag) = items.next() {
        let Some(len) = context.collection_len(tag) else {
            if context.names_self(tag) {
                break;
            }
            if context.metadata_tags().contains(&tag) {
                return Ok(Resolved::Statement { owner: symbol, tag });
            }
            return Err(malformed(format!(
                "unexpected tag {tag} at {} level",
                context.label()
            )));
        };

        let idx = items
            .next()
            .ok_or_else(|| malformed(format!("missing index after tag {tag}")))?;
        let idx = usize::try_from(idx)
            .ok()
            .filter(|i| *i < len)
            .ok_or_else(|| {
                malformed(format!(
                    "index {idx} out of range for tag {tag} at {} level ({len} entries)",
                    context.label()
                ))
            })?;

        let (name, next) = context.child(tag, idx);
        symbol.push('.');
        symbol.push_str(name);
        context = next;
    }

    Ok(Resolved::Symbol(symbol))
}

/// Every navigable node of `file` with its structural path and symbol, in
/// declaration order.
pub fn structural_paths(file: &FileDescriptorProto) -> Vec<(Vec<i32>, String)> {
    let mut out = Vec::new();
    let scope = package_scope(file.package());

    for (i, m) in file.message_type.iter().enumerate() {
        walk_message(m, vec![FILE_MESSAGE_TYPE, i as i32], &scope, &mut out);
    }
    for (i, e) in file.enum_type.iter().enumerate() {
        walk_enum(e, vec![FILE_ENUM_TYPE, i as i32], &scope, &mut out);
    }
    for (i, s) in file.service.iter().enumerate() {
        let path = vec![FILE_SERVICE, i as i32];
        let symbol = format!("{scope}.{}", s.name());
        for (j, method) in s.method.iter().enumerate() {
            out.push((
                extend(&path, SERVICE_METHOD, j),
                format!("{symbol}.{}", method.name()),
            ));
        }
        out.push((path, symbol));
    }
    for (i, ext) in file.extension.iter().enumerate() {
        out.push((
            vec![FILE_EXTENSION, i as i32],
            format!("{scope}.{}", ext.name()),
        ));
    }
    out
}

fn walk_message(
    m: &DescriptorProto,
    path: Vec<i32>,
    scope: &str,
    out: &mut Vec<(Vec<i32>, String)>,
) {
    let symbol = format!("{scope}.{}", m.name());
    for (i, f) in m.field.iter().enumerate() {
        out.push((extend(&path, MESSAGE_FIELD, i), format!("{symbol}.{}", f.name())));
    }
    for (i, n) in m.nested_type.iter().enumerate() {
        walk_message(n, extend(&path, MESSAGE_NESTED_TYPE, i), &symbol, out);
    }
    for (i, e) in m.enum_type.iter().enumerate() {
        walk_enum(e, extend(&path, MESSAGE_ENUM_TYPE, i), &symbol, out);
    }
    for (i, x) in m.extension.iter().enumerate() {
        out.push((extend(&path, MESSAGE_EXTENSION, i), format!("{symbol}.{}", x.name())));
    }
    for (i, o) in m.oneof_decl.iter().enumerate() {
        out.push((extend(&path, MESSAGE_ONEOF_DECL, i), format!("{symbol}.{}", o.name())));
    }
    out.push((path, symbol));
}

fn walk_enum(
    e: &EnumDescriptorProto,
    path: Vec<i32>,
    scope: &str,
    out: &mut Vec<(Vec<i32>, String)>,
) {
    let symbol = format!("{scope}.{}", e.name());
    for (i, v) in e.value.iter().enumerate() {
        out.push((extend(&path, ENUM_VALUE, i), format!("{symbol}.{}", v.name())));
    }
    out.push((path, symbol));
}

fn extend(base: &[i32], tag: i32, index: usize) -> Vec<i32> {
    let mut path = base.to_vec();
    path.push(tag);
    path.push(index as i32);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumValueDescriptorProto, FieldDescriptorProto};

    fn file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("yamcs/api/events.proto".into()),
            package: Some("yamcs.protobuf.events".into()),
            message_type: vec![DescriptorProto {
                name: Some("Event".into()),
                field: vec![
                    FieldDescriptorProto {
                        name: Some("source".into()),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: Some("severity".into()),
                        ..Default::default()
                    },
                ],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("EventSeverity".into()),
                    value: vec![
                        EnumValueDescriptorProto {
                            name: Some("INFO".into()),
                            number: Some(0),
                        },
                        EnumValueDescriptorProto {
                            name: Some("WARNING".into()),
                            number: Some(1),
                        },
                    ],
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn symbol(s: &str) -> Resolved {
        Resolved::Symbol(s.to_string())
    }

    #[test]
    fn resolves_nested_enum_value() {
        let f = file();
        assert_eq!(
            resolve(&f, &[4, 0, 4, 0, 2, 1]).unwrap(),
            symbol(".yamcs.protobuf.events.Event.EventSeverity.WARNING")
        );
    }

    #[test]
    fn name_span_and_file_header_address_the_owner() {
        let f = file();
        assert_eq!(
            resolve(&f, &[4, 0, 1]).unwrap(),
            symbol(".yamcs.protobuf.events.Event")
        );
        assert_eq!(
            resolve(&f, &[4, 0, 2, 1, 1]).unwrap(),
            symbol(".yamcs.protobuf.events.Event.severity")
        );
        assert_eq!(resolve(&f, &[12]).unwrap(), symbol(".yamcs.protobuf.events"));
        assert_eq!(resolve(&f, &[8, 11]).unwrap(), symbol(".yamcs.protobuf.events"));
    }

    #[test]
    fn statements_inside_a_node_are_not_the_node() {
        let f = file();
        // Message options (7) followed by anything.
        assert_eq!(
            resolve(&f, &[4, 0, 7, 99]).unwrap(),
            Resolved::Statement {
                owner: ".yamcs.protobuf.events.Event".to_string(),
                tag: 7,
            }
        );
        // `reserved` range inside a message.
        assert_eq!(resolve(&f, &[4, 0, 9, 0]).unwrap().symbol(), None);
        // `option allow_alias` inside an enum.
        assert_eq!(resolve(&f, &[4, 0, 4, 0, 3]).unwrap().symbol(), None);
        // Import statement.
        assert_eq!(resolve(&f, &[3, 0]).unwrap().symbol(), None);
    }

    #[test]
    fn rejects_unknown_tag_at_enum_value_level() {
        let f = file();
        let err = resolve(&f, &[4, 0, 4, 0, 2, 0, 9]).unwrap_err();
        assert_eq!(err.path, vec![4, 0, 4, 0, 2, 0, 9]);
        assert!(err.reason.contains("enum value"));
    }

    #[test]
    fn rejects_missing_and_out_of_range_indices() {
        let f = file();
        assert!(resolve(&f, &[4]).is_err());
        assert!(resolve(&f, &[4, 3]).is_err());
        assert!(resolve(&f, &[4, -1]).is_err());
    }

    #[test]
    fn enumerated_paths_resolve_to_their_symbols() {
        let f = file();
        let paths = structural_paths(&f);
        assert_eq!(paths.len(), 6);
        for (path, expected) in paths {
            assert_eq!(resolve(&f, &path).unwrap(), Resolved::Symbol(expected));
        }
    }
}
