//! The immutable schema index every documentation unit is rendered from.

use std::collections::BTreeSet;

use crate::closure::{self, Closure, Want};
use crate::comments::CommentIndex;
use crate::config::RenderOptions;
use crate::descriptor::{decode_descriptor_set, FileDescriptorSet};
use crate::error::{MalformedPathError, Result};
use crate::index::{Descriptor, DescriptorIndex};
use crate::render::{RpcSections, TypeRenderer};
use crate::route::{self, FieldPartition, RouteSpec};

/// Descriptors, comments and package map of one descriptor set.
///
/// Built once and read-only afterwards; a reload builds a new value and
/// replaces the old one wholesale.
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    descriptors: DescriptorIndex,
    comments: CommentIndex,
    options: RenderOptions,
}

impl SchemaIndex {
    pub fn build(bytes: &[u8]) -> Result<Self> {
        Self::build_with_options(bytes, RenderOptions::default())
    }

    pub fn build_with_options(bytes: &[u8], options: RenderOptions) -> Result<Self> {
        let set = decode_descriptor_set(bytes)?;
        Self::from_set(&set, options)
    }

    pub fn from_set(set: &FileDescriptorSet, options: RenderOptions) -> Result<Self> {
        let descriptors = DescriptorIndex::build(set)?;

        let mut comments = CommentIndex::default();
        for file in &set.file {
            if let Some(info) = &file.source_code_info {
                comments.extend(file, &info.location);
            }
        }

        tracing::debug!(
            symbols = descriptors.len(),
            comments = comments.len(),
            skipped = comments.skipped().len(),
            "built schema index"
        );

        Ok(Self {
            descriptors,
            comments,
            options,
        })
    }

    pub fn descriptors(&self) -> &DescriptorIndex {
        &self.descriptors
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn lookup(&self, symbol: &str) -> Result<&Descriptor> {
        self.descriptors.lookup(symbol)
    }

    pub fn comment(&self, symbol: &str) -> Option<&str> {
        self.comments.get(symbol)
    }

    pub fn package_of(&self, symbol: &str) -> Option<&str> {
        self.descriptors.package_of(symbol)
    }

    /// Comment locations dropped because their structural path did not decode.
    pub fn skipped_locations(&self) -> &[MalformedPathError] {
        self.comments.skipped()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Closure of `roots`, excluding `excluded` and the configured defaults.
    pub fn closure<S: AsRef<str>>(
        &self,
        roots: &[S],
        excluded: &BTreeSet<String>,
        want: Want,
    ) -> Result<BTreeSet<String>> {
        Ok(self.related_types(roots, excluded)?.select(want))
    }

    pub fn related_types<S: AsRef<str>>(
        &self,
        roots: &[S],
        excluded: &BTreeSet<String>,
    ) -> Result<Closure> {
        let excluded: BTreeSet<String> = excluded
            .union(&self.options.default_excludes)
            .cloned()
            .collect();
        closure::related_types(&self.descriptors, roots, &excluded)
    }

    pub fn route(&self, method_symbol: &str) -> Result<Option<RouteSpec>> {
        let method = self.descriptors.method(method_symbol)?;
        route::extract_route(&self.descriptors, method)
    }

    pub fn body_symbol(&self, method_symbol: &str) -> Result<Option<String>> {
        let method = self.descriptors.method(method_symbol)?;
        route::body_symbol(&self.descriptors, method)
    }

    pub fn request_symbol(&self, method_symbol: &str) -> Result<String> {
        let method = self.descriptors.method(method_symbol)?;
        route::request_symbol(&self.descriptors, method)
    }

    /// Path/query/body split of the input fields of a routed method.
    pub fn partition_fields(&self, method_symbol: &str) -> Result<Option<FieldPartition<'_>>> {
        let method = self.descriptors.method(method_symbol)?;
        let Some(spec) = route::extract_route(&self.descriptors, method)? else {
            return Ok(None);
        };
        route::partition_fields(&self.descriptors, &method.input_type, &spec).map(Some)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn renderer(&self) -> TypeRenderer<'_> {
        TypeRenderer::new(&self.descriptors, &self.comments, &self.options)
    }

    pub fn render_message(&self, symbol: &str, excluded_fields: &[String]) -> Result<String> {
        self.renderer().render_message(symbol, excluded_fields)
    }

    pub fn render_enum(&self, symbol: &str) -> Result<String> {
        self.renderer().render_enum(symbol)
    }

    pub fn render_rpc(&self, method_symbol: &str, sections: RpcSections) -> Result<String> {
        self.renderer().render_rpc(method_symbol, sections)
    }

    pub fn render_route_doc(&self, method_symbol: &str) -> Result<String> {
        self.renderer().render_route_doc(method_symbol)
    }
}
