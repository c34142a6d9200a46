//! Protobuf API documentation core (descriptor sets → text artifacts).
//!
//! Given a serialized `google.protobuf.FileDescriptorSet` this crate:
//!
//! - indexes every service, method, message, enum, enum value and field by its
//!   fully-qualified symbol ([`index`]),
//! - attaches leading comments to symbols by decoding `SourceCodeInfo`
//!   structural paths ([`path`], [`comments`]),
//! - computes the message/enum types reachable from a method ([`closure`]),
//! - derives HTTP routes and the path/query/body split of request fields from
//!   route annotations ([`route`], [`template`]),
//! - renders interface/enum declarations and route pages as plain text
//!   ([`render`]).
//!
//! [`SchemaIndex`] bundles all of it behind one immutable value.
//!
//! Nothing here performs I/O: bytes come in, text goes out.

pub mod closure;
pub mod comments;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod path;
pub mod render;
pub mod route;
pub mod schema;
pub mod template;

pub use closure::{Closure, Want};
pub use config::{DocConfig, RenderOptions};
pub use error::{MalformedPathError, ProtoDocError, Result};
pub use index::{Descriptor, DescriptorIndex};
pub use render::RpcSections;
pub use route::{HttpVerb, RequestBody, RouteSpec};
pub use schema::SchemaIndex;
pub use template::PathParam;
