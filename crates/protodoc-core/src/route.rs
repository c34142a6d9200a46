//! HTTP routes of methods: verb, URI template, and how the request message is
//! split over path, query and body.

use std::fmt;

use serde::Serialize;

use crate::descriptor::FieldType;
use crate::error::{ProtoDocError, Result};
use crate::index::{DescriptorIndex, FieldDescriptor, MethodDescriptor};
use crate::template::{parse_path_params, PathParam};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the request body comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body; everything travels in the URL.
    None,
    /// `body: "*"`: the whole input message.
    Whole { symbol: String },
    /// `body: "<json name>"`: one input field is promoted to be the body.
    /// `symbol` is the field's message type, if it has one.
    Field {
        json_name: String,
        field: String,
        symbol: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    pub verb: HttpVerb,
    pub template: String,
    pub params: Vec<PathParam>,
    pub body: RequestBody,
}

impl RouteSpec {
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn body_symbol(&self) -> Option<&str> {
        match &self.body {
            RequestBody::None => None,
            RequestBody::Whole { symbol } => Some(symbol),
            RequestBody::Field { symbol, .. } => symbol.as_deref(),
        }
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.template)
    }
}

/// Route of `method`, or `None` when it carries no route metadata.
pub fn extract_route(
    index: &DescriptorIndex,
    method: &MethodDescriptor,
) -> Result<Option<RouteSpec>> {
    let Some(http) = &method.http else {
        return Ok(None);
    };
    let params = parse_path_params(&http.template)?;

    let body = match http.body.as_deref() {
        None => RequestBody::None,
        Some("*") => RequestBody::Whole {
            symbol: method.input_type.clone(),
        },
        Some(json_name) => {
            let input = index.message(&method.input_type)?;
            let field = input.field_by_json_name(json_name).ok_or_else(|| {
                ProtoDocError::NotFound(format!("{}.{json_name}", method.input_type))
            })?;
            let symbol = match field.field_type()? {
                FieldType::Message | FieldType::Group => field.type_name.clone(),
                _ => None,
            };
            RequestBody::Field {
                json_name: json_name.to_string(),
                field: field.symbol.clone(),
                symbol,
            }
        }
    };

    Ok(Some(RouteSpec {
        verb: http.verb,
        template: http.template.clone(),
        params,
        body,
    }))
}

/// Effective request body type of `method`.
///
/// A promoted body field replaces the input type; `*` keeps it; no body
/// directive (or no route at all) means there is no body.
pub fn body_symbol(index: &DescriptorIndex, method: &MethodDescriptor) -> Result<Option<String>> {
    Ok(extract_route(index, method)?.and_then(|r| r.body_symbol().map(str::to_string)))
}

/// The message documented as "the request": the body type when there is one,
/// otherwise the input type.
pub fn request_symbol(index: &DescriptorIndex, method: &MethodDescriptor) -> Result<String> {
    Ok(body_symbol(index, method)?.unwrap_or_else(|| method.input_type.clone()))
}

/// Input fields split by where they travel.
#[derive(Debug, Clone, Default)]
pub struct FieldPartition<'a> {
    /// Fields bound to template variables, in template order.
    pub path: Vec<&'a FieldDescriptor>,
    /// URL query fields (GET routes only).
    pub query: Vec<&'a FieldDescriptor>,
    /// Remaining fields of non-GET routes.
    pub body: Vec<&'a FieldDescriptor>,
}

pub fn partition_fields<'a>(
    index: &'a DescriptorIndex,
    input_type: &str,
    route: &RouteSpec,
) -> Result<FieldPartition<'a>> {
    let input = index.message(input_type)?;
    let names = route.param_names();

    let mut partition = FieldPartition {
        path: names
            .iter()
            .filter_map(|name| input.field_by_json_name(name))
            .collect(),
        ..Default::default()
    };

    for field in &input.fields {
        if names.contains(&field.json_name.as_str()) {
            continue;
        }
        if route.verb == HttpVerb::Get {
            partition.query.push(field);
        } else {
            partition.body.push(field);
        }
    }
    Ok(partition)
}
