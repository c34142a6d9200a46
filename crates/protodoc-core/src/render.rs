//! Text rendering of messages, enums and methods.
//!
//! Output uses a TypeScript-like declaration style:
//!
//! ```text
//! // Info about a parameter.
//! interface ParameterInfo {
//!
//!   // Qualified name.
//!   qualifiedName: string;
//!   rawValue: string;  // Base64
//!   tags: {[key: string]: number};
//! }
//! ```

use crate::closure::related_types;
use crate::comments::CommentIndex;
use crate::config::RenderOptions;
use crate::descriptor::FieldType;
use crate::error::{ProtoDocError, Result};
use crate::index::{local_name, DescriptorIndex, FieldDescriptor, MethodDescriptor};
use crate::route::{extract_route, partition_fields, request_symbol, HttpVerb};

pub const TIMESTAMP: &str = ".google.protobuf.Timestamp";

const INDENT: &str = "  ";

/// Display form of a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayType {
    pub name: String,
    pub array: bool,
    /// Note on the JSON encoding when the display type does not say it all.
    pub annotation: Option<&'static str>,
}

impl DisplayType {
    fn scalar(name: &str, annotation: Option<&'static str>) -> Self {
        Self {
            name: name.to_string(),
            array: false,
            annotation,
        }
    }
}

/// Which parts of a method to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RpcSections {
    pub input: bool,
    pub output: bool,
    pub related: bool,
}

impl RpcSections {
    pub fn all() -> Self {
        Self {
            input: true,
            output: true,
            related: true,
        }
    }
}

pub struct TypeRenderer<'a> {
    index: &'a DescriptorIndex,
    comments: &'a CommentIndex,
    options: &'a RenderOptions,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(
        index: &'a DescriptorIndex,
        comments: &'a CommentIndex,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            index,
            comments,
            options,
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn display_type(&self, field: &FieldDescriptor) -> Result<DisplayType> {
        let mut display = self.base_type(field)?;
        display.array = field.is_repeated() && !self.is_map(field)?;
        Ok(display)
    }

    fn base_type(&self, field: &FieldDescriptor) -> Result<DisplayType> {
        let unsupported = || ProtoDocError::UnsupportedFieldType {
            field: field.symbol.clone(),
            type_code: field.type_code,
        };

        let display = match field.field_type()? {
            FieldType::Bool => DisplayType::scalar("boolean", None),
            FieldType::Bytes => DisplayType::scalar("string", Some("Base64")),
            FieldType::Double
            | FieldType::Float
            | FieldType::Int32
            | FieldType::Uint32
            | FieldType::Sint32 => DisplayType::scalar("number", None),
            FieldType::Int64 | FieldType::Uint64 | FieldType::Sint64 => {
                DisplayType::scalar("string", Some("String decimal"))
            }
            FieldType::String => DisplayType::scalar("string", None),
            FieldType::Enum => {
                let target = field.type_name.as_deref().ok_or_else(unsupported)?;
                DisplayType::scalar(local_name(target), None)
            }
            FieldType::Message => {
                let target = field.type_name.as_deref().ok_or_else(unsupported)?;
                if target == TIMESTAMP {
                    DisplayType::scalar("string", Some("RFC 3339"))
                } else {
                    let message = self.index.message(target)?;
                    if message.map_entry {
                        let key = message.field_by_number(1).ok_or_else(unsupported)?;
                        let value = message.field_by_number(2).ok_or_else(unsupported)?;
                        let key = self.base_type(key)?;
                        let value = self.base_type(value)?;
                        // The value's wire note matters more than the key's.
                        DisplayType {
                            name: format!("{{[key: {}]: {}}}", key.name, value.name),
                            array: false,
                            annotation: value.annotation.or(key.annotation),
                        }
                    } else {
                        DisplayType::scalar(local_name(target), None)
                    }
                }
            }
            FieldType::Fixed64
            | FieldType::Fixed32
            | FieldType::Group
            | FieldType::Sfixed32
            | FieldType::Sfixed64 => return Err(unsupported()),
        };
        Ok(display)
    }

    fn is_map(&self, field: &FieldDescriptor) -> Result<bool> {
        if field.field_type()? != FieldType::Message {
            return Ok(false);
        }
        match field.type_name.as_deref() {
            Some(TIMESTAMP) | None => Ok(false),
            Some(target) => Ok(self.index.message(target)?.map_entry),
        }
    }

    pub fn render_message(&self, symbol: &str, excluded_fields: &[String]) -> Result<String> {
        let message = self.index.message(symbol)?;
        let mut buf = String::new();
        if let Some(comment) = self.comments.get(symbol) {
            buf.push_str(&comment_block(comment, ""));
        }

        buf.push_str(&format!("interface {} {{\n", message.name));
        for field in &message.fields {
            if excluded_fields.iter().any(|f| f == &field.json_name) {
                continue;
            }
            if let Some(comment) = self.comments.get(&field.symbol) {
                buf.push('\n');
                buf.push_str(&comment_block(comment, INDENT));
            }

            let display = self.display_type(field)?;
            buf.push_str(INDENT);
            buf.push_str(&field.json_name);
            buf.push_str(": ");
            buf.push_str(&display.name);
            if display.array {
                buf.push_str("[]");
            }
            buf.push(';');
            if let Some(annotation) = display.annotation {
                buf.push_str("  // ");
                buf.push_str(annotation);
            }
            buf.push('\n');
        }
        buf.push_str("}\n");
        Ok(buf)
    }

    pub fn render_enum(&self, symbol: &str) -> Result<String> {
        let enumeration = self.index.enumeration(symbol)?;
        let mut buf = format!("enum {} {{\n", enumeration.name);
        for value in &enumeration.values {
            if let Some(comment) = self.comments.get(&value.symbol) {
                buf.push('\n');
                buf.push_str(&comment_block(comment, INDENT));
            }
            buf.push_str(&format!("{INDENT}{0} = \"{0}\",\n", value.name));
        }
        buf.push_str("}\n");
        Ok(buf)
    }

    // =========================================================================
    // Methods
    // =========================================================================

    /// Request, response and related type declarations of a method, separated
    /// by blank lines.
    pub fn render_rpc(&self, method_symbol: &str, sections: RpcSections) -> Result<String> {
        let method = self.index.method(method_symbol)?;
        let route = extract_route(self.index, method)?;
        let request = request_symbol(self.index, method)?;

        let mut blocks = Vec::new();
        if sections.input {
            // Transcoding fills route variables from the URL.
            let excluded: Vec<String> = route
                .as_ref()
                .map(|r| r.params.iter().map(|p| p.name.clone()).collect())
                .unwrap_or_default();
            blocks.push(self.render_message(&request, &excluded)?);
        }
        if sections.output {
            blocks.push(self.render_message(&method.output_type, &[])?);
        }
        if sections.related {
            let roots = [request.as_str(), method.output_type.as_str()];
            let related = related_types(self.index, &roots, &self.options.default_excludes)?;
            for symbol in &related.messages {
                blocks.push(self.render_message(symbol, &[])?);
            }
            for symbol in &related.enums {
                blocks.push(self.render_enum(symbol)?);
            }
        }
        Ok(blocks.join("\n"))
    }

    /// Route page of a method: description, streaming notices, URI template
    /// and parameter tables.
    pub fn render_route_doc(&self, method_symbol: &str) -> Result<String> {
        let method = self.index.method(method_symbol)?;
        let mut sections = Vec::new();

        if let Some(comment) = self.comments.get(method_symbol) {
            sections.push(comment.to_string());
        }
        sections.extend(method_notices(method));

        let Some(route) = extract_route(self.index, method)? else {
            return Ok(join_sections(sections));
        };
        sections.push(format!("URI Template\n{INDENT}{INDENT}{route}"));

        let partition = partition_fields(self.index, &method.input_type, &route)?;
        if !route.params.is_empty() {
            let mut table = String::from("Path Parameters");
            for param in &route.params {
                let bound = partition.path.iter().find(|f| f.json_name == param.name);
                let field_comment = match bound {
                    Some(field) => self.comments.get(&field.symbol),
                    None => self
                        .comments
                        .get(&format!("{}.{}", method.input_type, param.name)),
                };
                table.push_str(&definition(&param.placeholder, field_comment));
            }
            sections.push(table);
        }

        if route.verb == HttpVerb::Get && !partition.query.is_empty() {
            let mut table = String::from("Query Parameters");
            for field in &partition.query {
                table.push_str(&definition(&field.json_name, self.comments.get(&field.symbol)));
            }
            sections.push(table);
        }

        Ok(join_sections(sections))
    }
}

fn method_notices(method: &MethodDescriptor) -> Vec<String> {
    let mut notices = Vec::new();
    if method.deprecated {
        notices.push("Warning: This method is deprecated.".to_string());
    }
    if method.client_streaming {
        notices.push("Warning: This method uses client-streaming.".to_string());
    }
    if method.server_streaming {
        notices.push(
            "Warning: This method uses server-streaming. The server sends an unspecified \
             amount of data using chunked transfer encoding."
                .to_string(),
        );
    }
    notices
}

fn definition(term: &str, description: Option<&str>) -> String {
    let mut out = format!("\n{INDENT}{INDENT}{term}\n");
    if let Some(text) = description {
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("{INDENT}{INDENT}{INDENT}{INDENT}{line}\n"));
            }
        }
    }
    out
}

fn join_sections(sections: Vec<String>) -> String {
    let mut out = sections
        .iter()
        .map(|s| s.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

/// `// `-prefixed comment lines at `indent`.
fn comment_block(comment: &str, indent: &str) -> String {
    let mut buf = String::new();
    for line in comment.lines() {
        let line = format!("{indent}// {line}");
        buf.push_str(line.trim_end());
        buf.push('\n');
    }
    buf
}
