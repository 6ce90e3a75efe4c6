//! Detection results
//!
//! A [`Mime`] is a standalone copy of the matched node and its whole ancestor
//! chain. It shares nothing with the canonical tree, so callers may mutate it
//! freely and it stays stable while the tree is extended.

use std::fmt;

use serde::Serialize;

use crate::mediatype::{self, Params};
use crate::node::Node;

/// Compares `expected`, stripped of parameters, against a type and its
/// aliases. Unparseable input is compared trimmed.
pub(crate) fn type_matches(mime_type: &str, aliases: &[String], expected: &str) -> bool {
    let expected = mediatype::essence(expected);
    mime_type == expected || aliases.iter().any(|alias| *alias == expected)
}

/// A detected content type, with its ancestry.
///
/// ```
/// let mime = mimetree::detect(b"<html><body>hi</body></html>");
/// assert_eq!(mime.mime_type(), "text/html");
/// assert_eq!(mime.extension(), ".html");
/// assert!(mime.parent().is_some_and(|p| p.is("text/plain")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mime {
    #[serde(rename = "type")]
    mime_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    #[serde(skip_serializing_if = "Params::is_empty")]
    params: Params,
    #[serde(skip_serializing_if = "String::is_empty")]
    extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Box<Mime>>,
}

impl Mime {
    /// Copies `node` and all of its ancestors.
    ///
    /// `overlay` is merged over the node's own parameters (overlay wins) and
    /// applies to the returned result only; ancestors keep their own
    /// parameters.
    pub(crate) fn from_hierarchy(node: &Node, overlay: Params) -> Self {
        let mut ancestors = Vec::new();
        let mut next = node.parent();
        while let Some(ancestor) = next {
            next = ancestor.parent();
            ancestors.push(ancestor);
        }

        let parent = ancestors
            .iter()
            .rev()
            .fold(None, |parent, ancestor| {
                Some(Box::new(Self::copy_of(ancestor, Params::new(), parent)))
            });

        Self::copy_of(node, overlay, parent)
    }

    fn copy_of(node: &Node, overlay: Params, parent: Option<Box<Mime>>) -> Self {
        let mut params = node.params().clone();
        params.extend(overlay);
        Self {
            mime_type: node.mime_type().to_string(),
            aliases: node.aliases().to_vec(),
            params,
            extension: node.extension().to_string(),
            parent,
        }
    }

    /// Bare type without parameters, e.g. `application/zip`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Extension with its leading dot, e.g. `.html`, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The more generic type this one refines. `None` only for the root type.
    pub fn parent(&self) -> Option<&Mime> {
        self.parent.as_deref()
    }

    /// Iterates over this result and then each ancestor up to the root.
    pub fn hierarchy(&self) -> impl Iterator<Item = &Mime> {
        std::iter::successors(Some(self), |mime| mime.parent())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Sets a parameter, returning the previous value.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(name.into(), value.into())
    }

    pub fn remove_param(&mut self, name: &str) -> Option<String> {
        self.params.remove(name)
    }

    /// Whether `expected` names this type or one of its aliases.
    ///
    /// Only the `type/subtype` part of `expected` counts: surrounding
    /// whitespace, parameters and the case of the type are ignored.
    pub fn is(&self, expected: &str) -> bool {
        type_matches(&self.mime_type, &self.aliases, expected)
    }
}

impl fmt::Display for Mime {
    /// Type plus parameters, e.g. `text/html; charset=utf-8`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return f.write_str(&self.mime_type);
        }
        match mediatype::format(&self.mime_type, &self.params) {
            Some(formatted) => f.write_str(&formatted),
            None => f.write_str(&self.mime_type),
        }
    }
}
