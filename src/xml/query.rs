//! Namespace-scoped queries over a raw record
//!
//! Supports the XPath subset the transformers rely on: relative location
//! paths made of child (`/`) and descendant (`//`) steps with prefixed name
//! tests or `*`, combined with `|` unions. Results are in document order.

use super::tree::{RawRecord, XmlNode};
use crate::error::{AppError, AppResult};

/// A fixed prefix → namespace URI mapping
#[derive(Debug, Clone, Copy)]
pub struct Namespaces {
    bindings: &'static [(&'static str, &'static str)],
}

impl Namespaces {
    pub const fn new(bindings: &'static [(&'static str, &'static str)]) -> Self {
        Self { bindings }
    }

    /// Namespace URI bound to a prefix
    pub fn resolve(&self, prefix: &str) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }

    /// Compile an expression against this mapping
    pub fn compile(&self, expression: &str) -> AppResult<XPath> {
        XPath::compile(expression, self)
    }

    /// Text of the first matching node
    ///
    /// `None` when nothing matches or the matched node has no text;
    /// whitespace-only text is returned as is. An expression that does not
    /// compile is logged and treated as no match.
    pub fn query_text(&self, record: &RawRecord, expression: &str) -> Option<String> {
        match self.compile(expression) {
            Ok(xpath) => xpath.first_text(record.root()),
            Err(e) => {
                tracing::warn!("Ignoring query '{}': {}", expression, e);
                None
            }
        }
    }

    /// All matching nodes, possibly none
    pub fn query_nodes<'r>(&self, record: &'r RawRecord, expression: &str) -> Vec<&'r XmlNode> {
        match self.compile(expression) {
            Ok(xpath) => xpath.select(record.root()),
            Err(e) => {
                tracing::warn!("Ignoring query '{}': {}", expression, e);
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name {
        namespace: Option<&'static str>,
        local_name: String,
    },
}

impl NameTest {
    fn matches(&self, node: &XmlNode) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name { namespace, local_name } => node.is(*namespace, local_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
}

/// A compiled query expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    branches: Vec<Vec<Step>>,
}

impl XPath {
    /// Compile an expression, resolving prefixes through `namespaces`
    pub fn compile(expression: &str, namespaces: &Namespaces) -> AppResult<Self> {
        let branches = expression
            .split('|')
            .map(|branch| compile_path(branch.trim(), namespaces))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { branches })
    }

    /// Evaluate against a context node, results in document order without duplicates
    pub fn select<'n>(&self, context: &'n XmlNode) -> Vec<&'n XmlNode> {
        let mut matches: Vec<&XmlNode> = self
            .branches
            .iter()
            .flat_map(|steps| evaluate(steps, context))
            .collect();

        matches.sort_by_key(|node| node.position);
        matches.dedup_by_key(|node| node.position);
        matches
    }

    /// Text of the first match, `None` if absent or empty
    pub fn first_text(&self, context: &XmlNode) -> Option<String> {
        self.select(context)
            .first()
            .and_then(|node| node.text.as_deref())
            .filter(|text| !text.is_empty())
            .map(String::from)
    }
}

fn compile_path(path: &str, namespaces: &Namespaces) -> AppResult<Vec<Step>> {
    if path.is_empty() {
        return Err(AppError::InvalidExpression("empty path".to_string()));
    }

    let mut rest = match path.strip_prefix('.') {
        Some(rest) if rest.starts_with('/') => rest,
        Some(_) => {
            return Err(AppError::InvalidExpression(format!(
                "unsupported path '{}'",
                path
            )))
        }
        None if path.starts_with('/') => {
            return Err(AppError::InvalidExpression(format!(
                "absolute path '{}' is not supported",
                path
            )))
        }
        None => path,
    };

    let mut steps = Vec::new();
    while !rest.is_empty() {
        let axis = if let Some(r) = rest.strip_prefix("//") {
            rest = r;
            Axis::Descendant
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
            Axis::Child
        } else if steps.is_empty() {
            Axis::Child
        } else {
            return Err(AppError::InvalidExpression(format!("malformed path '{}'", path)));
        };

        let end = rest.find('/').unwrap_or(rest.len());
        let (name, tail) = rest.split_at(end);
        steps.push(Step {
            axis,
            test: compile_name_test(name.trim(), path, namespaces)?,
        });
        rest = tail;
    }

    if steps.is_empty() {
        return Err(AppError::InvalidExpression(format!("path '{}' has no steps", path)));
    }
    Ok(steps)
}

fn compile_name_test(name: &str, path: &str, namespaces: &Namespaces) -> AppResult<NameTest> {
    if name.is_empty() {
        return Err(AppError::InvalidExpression(format!("empty step in '{}'", path)));
    }
    if name == "*" {
        return Ok(NameTest::Any);
    }

    match name.split_once(':') {
        Some((prefix, local_name)) => {
            let namespace = namespaces.resolve(prefix).ok_or_else(|| {
                AppError::InvalidExpression(format!("unknown prefix '{}' in '{}'", prefix, path))
            })?;
            Ok(NameTest::Name {
                namespace: Some(namespace),
                local_name: local_name.to_string(),
            })
        }
        None => Ok(NameTest::Name {
            namespace: None,
            local_name: name.to_string(),
        }),
    }
}

fn evaluate<'n>(steps: &[Step], context: &'n XmlNode) -> Vec<&'n XmlNode> {
    let mut current = vec![context];

    for step in steps {
        let mut next = Vec::new();
        for node in current {
            match step.axis {
                Axis::Child => next.extend(node.children.iter().filter(|c| step.test.matches(c))),
                Axis::Descendant => next.extend(
                    node.descendants()
                        .into_iter()
                        .filter(|d| step.test.matches(d)),
                ),
            }
        }
        next.sort_by_key(|node| node.position);
        next.dedup_by_key(|node| node.position);
        current = next;
    }

    current
}
