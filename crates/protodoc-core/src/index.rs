//! Symbol table over a descriptor set.
//!
//! Every service, method, message, enum, enum value and field gets one entry
//! keyed by its fully-qualified symbol (`.package.Outer.Inner.field`). The
//! leading dot matches the form `protoc` writes into `type_name`, so field
//! references resolve with a plain lookup.

use std::collections::{BTreeMap, HashMap};

use crate::descriptor::{
    decode_descriptor_set, http_route, http_rule, DescriptorProto, EnumDescriptorProto,
    FieldDescriptorProto, FieldLabel, FieldType, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, MethodOptions, ServiceDescriptorProto,
};
use crate::error::{ProtoDocError, Result};
use crate::route::HttpVerb;

// =============================================================================
// Descriptor model
// =============================================================================

/// Owner of a descriptor node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// Top-level declaration; carries the file name.
    File(String),
    Message(String),
    Enum(String),
    Service(String),
}

#[derive(Debug, Clone)]
pub enum Descriptor {
    Service(ServiceDescriptor),
    Method(MethodDescriptor),
    Message(MessageDescriptor),
    Enum(EnumDescriptor),
    EnumValue(EnumValueDescriptor),
    Field(FieldDescriptor),
}

impl Descriptor {
    pub fn name(&self) -> &str {
        match self {
            Descriptor::Service(d) => &d.name,
            Descriptor::Method(d) => &d.name,
            Descriptor::Message(d) => &d.name,
            Descriptor::Enum(d) => &d.name,
            Descriptor::EnumValue(d) => &d.name,
            Descriptor::Field(d) => &d.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Descriptor::Service(d) => &d.symbol,
            Descriptor::Method(d) => &d.symbol,
            Descriptor::Message(d) => &d.symbol,
            Descriptor::Enum(d) => &d.symbol,
            Descriptor::EnumValue(d) => &d.symbol,
            Descriptor::Field(d) => &d.symbol,
        }
    }

    pub fn parent(&self) -> &Parent {
        match self {
            Descriptor::Service(d) => &d.parent,
            Descriptor::Method(d) => &d.parent,
            Descriptor::Message(d) => &d.parent,
            Descriptor::Enum(d) => &d.parent,
            Descriptor::EnumValue(d) => &d.parent,
            Descriptor::Field(d) => &d.parent,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::Service(_) => "service",
            Descriptor::Method(_) => "method",
            Descriptor::Message(_) => "message",
            Descriptor::Enum(_) => "enum",
            Descriptor::EnumValue(_) => "enum value",
            Descriptor::Field(_) => "field",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    /// Method symbols in declaration order.
    pub methods: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub deprecated: bool,
    pub http: Option<HttpAnnotation>,
}

/// Raw route metadata as declared on the method options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAnnotation {
    pub verb: HttpVerb,
    pub template: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    pub fields: Vec<FieldDescriptor>,
    pub map_entry: bool,
}

impl MessageDescriptor {
    pub fn field_by_json_name(&self, json_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.json_name == json_name)
    }

    pub fn field_by_number(&self, number: i32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    pub number: i32,
    pub json_name: String,
    pub label: Option<FieldLabel>,
    pub type_code: i32,
    pub type_name: Option<String>,
}

impl FieldDescriptor {
    /// Wire type of the field; unknown codes are reported, not guessed.
    pub fn field_type(&self) -> Result<FieldType> {
        FieldType::try_from(self.type_code).map_err(|_| ProtoDocError::UnsupportedFieldType {
            field: self.symbol.clone(),
            type_code: self.type_code,
        })
    }

    pub fn is_repeated(&self) -> bool {
        self.label == Some(FieldLabel::Repeated)
    }
}

#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    pub values: Vec<EnumValueDescriptor>,
}

#[derive(Debug, Clone)]
pub struct EnumValueDescriptor {
    pub symbol: String,
    pub name: String,
    pub parent: Parent,
    pub number: i32,
}

// =============================================================================
// Index
// =============================================================================

/// Immutable symbol → descriptor table plus the symbol → package map.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    descriptors: BTreeMap<String, Descriptor>,
    packages: HashMap<String, String>,
}

impl DescriptorIndex {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let set = decode_descriptor_set(bytes)?;
        Self::build(&set)
    }

    pub fn build(set: &FileDescriptorSet) -> Result<Self> {
        let mut builder = IndexBuilder::default();
        for file in &set.file {
            let file_name = file_label(file).to_string();
            let package = file.package().to_string();
            let scope = package_scope(&package);

            for service in &file.service {
                builder.add_service(&file_name, &scope, service)?;
            }
            for message in &file.message_type {
                builder.add_message(
                    &file_name,
                    &package,
                    &scope,
                    Parent::File(file_name.clone()),
                    message,
                )?;
            }
            for enum_type in &file.enum_type {
                builder.add_enum(
                    &file_name,
                    &package,
                    &scope,
                    Parent::File(file_name.clone()),
                    enum_type,
                )?;
            }
        }

        tracing::debug!(
            files = set.file.len(),
            symbols = builder.index.descriptors.len(),
            "built descriptor index"
        );
        Ok(builder.index)
    }

    pub fn get(&self, symbol: &str) -> Option<&Descriptor> {
        self.descriptors.get(symbol)
    }

    pub fn lookup(&self, symbol: &str) -> Result<&Descriptor> {
        self.get(symbol)
            .ok_or_else(|| ProtoDocError::NotFound(symbol.to_string()))
    }

    pub fn message(&self, symbol: &str) -> Result<&MessageDescriptor> {
        match self.lookup(symbol)? {
            Descriptor::Message(m) => Ok(m),
            _ => Err(wrong_kind(symbol, "message")),
        }
    }

    pub fn enumeration(&self, symbol: &str) -> Result<&EnumDescriptor> {
        match self.lookup(symbol)? {
            Descriptor::Enum(e) => Ok(e),
            _ => Err(wrong_kind(symbol, "enum")),
        }
    }

    pub fn method(&self, symbol: &str) -> Result<&MethodDescriptor> {
        match self.lookup(symbol)? {
            Descriptor::Method(m) => Ok(m),
            _ => Err(wrong_kind(symbol, "method")),
        }
    }

    pub fn service(&self, symbol: &str) -> Result<&ServiceDescriptor> {
        match self.lookup(symbol)? {
            Descriptor::Service(s) => Ok(s),
            _ => Err(wrong_kind(symbol, "service")),
        }
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.values().filter_map(|d| match d {
            Descriptor::Service(s) => Some(s),
            _ => None,
        })
    }

    pub fn package_of(&self, symbol: &str) -> Option<&str> {
        self.packages.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn wrong_kind(symbol: &str, expected: &'static str) -> ProtoDocError {
    ProtoDocError::WrongKind {
        symbol: symbol.to_string(),
        expected,
    }
}

// =============================================================================
// Builder
// =============================================================================

#[derive(Default)]
struct IndexBuilder {
    index: DescriptorIndex,
    origin: HashMap<String, String>,
}

impl IndexBuilder {
    fn insert(&mut self, file: &str, descriptor: Descriptor) -> Result<()> {
        let symbol = descriptor.symbol().to_string();
        if let Some(first) = self.origin.get(&symbol) {
            return Err(ProtoDocError::DuplicateSymbol {
                symbol,
                first_file: first.clone(),
                second_file: file.to_string(),
            });
        }
        self.origin.insert(symbol.clone(), file.to_string());
        self.index.descriptors.insert(symbol, descriptor);
        Ok(())
    }

    fn add_service(
        &mut self,
        file: &str,
        scope: &str,
        service: &ServiceDescriptorProto,
    ) -> Result<()> {
        let symbol = format!("{scope}.{}", service.name());
        let mut methods = Vec::with_capacity(service.method.len());
        for method in &service.method {
            let method_symbol = format!("{symbol}.{}", method.name());
            let descriptor = method_descriptor(&symbol, method_symbol.clone(), method);
            self.insert(file, Descriptor::Method(descriptor))?;
            methods.push(method_symbol);
        }
        self.insert(
            file,
            Descriptor::Service(ServiceDescriptor {
                symbol,
                name: service.name().to_string(),
                parent: Parent::File(file.to_string()),
                methods,
            }),
        )
    }

    fn add_message(
        &mut self,
        file: &str,
        package: &str,
        scope: &str,
        parent: Parent,
        message: &DescriptorProto,
    ) -> Result<()> {
        let symbol = format!("{scope}.{}", message.name());

        let fields: Vec<FieldDescriptor> = message
            .field
            .iter()
            .map(|f| field_descriptor(&symbol, f))
            .collect();
        for field in &fields {
            self.insert(file, Descriptor::Field(field.clone()))?;
        }

        for nested in &message.nested_type {
            self.add_message(file, package, &symbol, Parent::Message(symbol.clone()), nested)?;
        }
        for enum_type in &message.enum_type {
            self.add_enum(file, package, &symbol, Parent::Message(symbol.clone()), enum_type)?;
        }

        self.index
            .packages
            .insert(symbol.clone(), package.to_string());
        self.insert(
            file,
            Descriptor::Message(MessageDescriptor {
                symbol: symbol.clone(),
                name: message.name().to_string(),
                parent,
                fields,
                map_entry: message.is_map_entry(),
            }),
        )
    }

    fn add_enum(
        &mut self,
        file: &str,
        package: &str,
        scope: &str,
        parent: Parent,
        enum_type: &EnumDescriptorProto,
    ) -> Result<()> {
        let symbol = format!("{scope}.{}", enum_type.name());
        let mut values = Vec::with_capacity(enum_type.value.len());
        for v in &enum_type.value {
            let value = EnumValueDescriptor {
                symbol: format!("{symbol}.{}", v.name()),
                name: v.name().to_string(),
                parent: Parent::Enum(symbol.clone()),
                number: v.number.unwrap_or_default(),
            };
            self.insert(file, Descriptor::EnumValue(value.clone()))?;
            values.push(value);
        }

        self.index
            .packages
            .insert(symbol.clone(), package.to_string());
        self.insert(
            file,
            Descriptor::Enum(EnumDescriptor {
                symbol,
                name: enum_type.name().to_string(),
                parent,
                values,
            }),
        )
    }
}

fn method_descriptor(
    service: &str,
    symbol: String,
    method: &MethodDescriptorProto,
) -> MethodDescriptor {
    let options = method.options.as_ref();
    MethodDescriptor {
        symbol,
        name: method.name().to_string(),
        parent: Parent::Service(service.to_string()),
        input_type: method.input_type().to_string(),
        output_type: method.output_type().to_string(),
        client_streaming: method.client_streaming(),
        server_streaming: method.server_streaming(),
        deprecated: options.is_some_and(|o| o.deprecated()),
        http: options.and_then(http_annotation),
    }
}

/// Route annotation first, `google.api.http` as fallback.
fn http_annotation(options: &MethodOptions) -> Option<HttpAnnotation> {
    if let Some(route) = &options.route {
        if let Some(pattern) = &route.pattern {
            let (verb, template) = match pattern {
                http_route::Pattern::Get(t) => (HttpVerb::Get, t),
                http_route::Pattern::Put(t) => (HttpVerb::Put, t),
                http_route::Pattern::Post(t) => (HttpVerb::Post, t),
                http_route::Pattern::Delete(t) => (HttpVerb::Delete, t),
                http_route::Pattern::Patch(t) => (HttpVerb::Patch, t),
            };
            return Some(HttpAnnotation {
                verb,
                template: template.clone(),
                body: non_empty(route.body.as_deref()),
            });
        }
    }

    let rule = options.http.as_ref()?;
    let (verb, template) = match rule.pattern.as_ref()? {
        http_rule::Pattern::Get(t) => (HttpVerb::Get, t),
        http_rule::Pattern::Put(t) => (HttpVerb::Put, t),
        http_rule::Pattern::Post(t) => (HttpVerb::Post, t),
        http_rule::Pattern::Delete(t) => (HttpVerb::Delete, t),
        http_rule::Pattern::Patch(t) => (HttpVerb::Patch, t),
    };
    Some(HttpAnnotation {
        verb,
        template: template.clone(),
        body: non_empty(rule.body.as_deref()),
    })
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(str::to_string)
}

fn field_descriptor(message: &str, field: &FieldDescriptorProto) -> FieldDescriptor {
    let name = field.name().to_string();
    FieldDescriptor {
        symbol: format!("{message}.{name}"),
        json_name: field
            .json_name
            .clone()
            .unwrap_or_else(|| to_json_name(&name)),
        name,
        parent: Parent::Message(message.to_string()),
        number: field.number(),
        label: field.label.and_then(|l| FieldLabel::try_from(l).ok()),
        type_code: field.r#type.unwrap_or_default(),
        type_name: field.type_name.clone(),
    }
}

/// Root scope of a package: `.pkg` (or empty for the default package).
pub(crate) fn package_scope(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{package}")
    }
}

/// File name for diagnostics; `protoc` always sets it.
pub(crate) fn file_label(file: &FileDescriptorProto) -> &str {
    file.name.as_deref().unwrap_or("<unknown>")
}

/// `protoc`'s json name rule: drop underscores, upper-case the next letter.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Last segment of a dotted symbol.
pub fn local_name(symbol: &str) -> &str {
    symbol.rsplit('.').next().unwrap_or(symbol)
}
