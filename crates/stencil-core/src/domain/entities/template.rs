//! Template descriptors and placeholder rendering.
//!
//! ```text
//! TemplateDescriptor (aggregate root)
//! ├── TemplateTier        which scaffold this is
//! ├── TemplateMetadata    display name, description, next steps
//! └── TemplateTree        ordered files and directories
//!      ├── FileSpec       path, content, permissions
//!      └── DirectorySpec  path, permissions
//!
//! RenderContext           {{PROJECT_NAME}} -> "Demo"
//! ```
//!
//! Descriptors are built once, when the template store loads, and are
//! never mutated afterwards. Rendering produces a fresh
//! [`ProjectStructure`](super::project_structure::ProjectStructure).

use std::collections::{HashMap, HashSet};

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
    value_objects::TemplateTier,
};

// ============================================================================
// Render Context
// ============================================================================

/// Variables available to parameterized template files.
///
/// | Variable | Example |
/// |----------|---------|
/// | `PROJECT_NAME` | "My Awesome App" |
/// | `PROJECT_NAME_SNAKE` | "my_awesome_app" |
/// | `PROJECT_NAME_KEBAB` | "my-awesome-app" |
/// | `PROJECT_NAME_PASCAL` | "MyAwesomeApp" |
#[derive(Debug, Clone)]
pub struct RenderContext {
    project_name: String,
    variables: HashMap<String, String>,
}

impl RenderContext {
    pub const PROJECT_NAME: &'static str = "PROJECT_NAME";

    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let mut vars = HashMap::new();

        vars.insert(Self::PROJECT_NAME.to_string(), name.clone());
        vars.insert("PROJECT_NAME_SNAKE".to_string(), to_snake_case(&name));
        vars.insert("PROJECT_NAME_KEBAB".to_string(), to_kebab_case(&name));
        vars.insert("PROJECT_NAME_PASCAL".to_string(), to_pascal_case(&name));

        Self {
            project_name: name,
            variables: vars,
        }
    }

    /// Add a custom variable, consuming self and returning a new context.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace every known `{{VARIABLE}}` in one left-to-right pass.
    ///
    /// Substituted values are never rescanned, so a project name that itself
    /// contains braces cannot trigger a second replacement.
    ///
    /// - `{{UNKNOWN}}` stays as written
    /// - `{{{PROJECT_NAME}}}` keeps the outer braces, the inner token is replaced
    /// - an unterminated `{{` is copied through
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            match self.variables.get(&after[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    // Step one brace so `{{{KEY}}}` still finds the inner token.
                    out.push('{');
                    rest = &rest[start + 1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

/// "MyApp" -> "my_app", "HTTPRequest" -> "http_request"
fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// "MyApp" -> "my-app"
fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// "my-app" -> "MyApp"
fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Split on `_`, `-`, whitespace, lower->upper transitions and acronym
/// boundaries (`HTTPServer` -> `http`, `server`). Words come back lowercase.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        current.push(c);

        if let Some(&next) = chars.peek() {
            let camel = c.is_lowercase() && next.is_uppercase();
            let acronym = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase());

            if camel || acronym {
                words.push(current.to_lowercase());
                current.clear();
            }
        }
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

// ============================================================================
// Template Descriptor
// ============================================================================

/// A tier's complete file tree plus display metadata.
///
/// ## Invariants (enforced by `validate()`)
///
/// 1. `metadata.name` is non-empty
/// 2. `tree` contains at least one file
/// 3. All paths in `tree` are unique
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    pub tier: TemplateTier,
    pub metadata: TemplateMetadata,
    pub tree: TemplateTree,
}

impl TemplateDescriptor {
    pub fn builder(tier: TemplateTier) -> TemplateBuilder {
        TemplateBuilder::new(tier)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.metadata.name.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "template '{}' has an empty display name",
                self.tier
            )));
        }

        if self.tree.files().next().is_none() {
            return Err(DomainError::EmptyTemplate {
                template_id: self.id(),
            });
        }

        let mut seen = HashSet::new();
        for node in &self.tree.nodes {
            let path = node.path().to_slash_string();
            if !seen.insert(path.clone()) {
                return Err(DomainError::DuplicatePath { path });
            }
        }

        Ok(())
    }

    /// `tier@version`, e.g. `hello-world@1.0.0`.
    pub fn id(&self) -> String {
        format!("{}@{}", self.tier, self.metadata.version)
    }

    /// Relative paths of every file the tier declares, in tree order.
    pub fn file_paths(&self) -> Vec<&RelativePath> {
        self.tree.files().map(|f| &f.path).collect()
    }

    pub fn file_count(&self) -> usize {
        self.tree.files().count()
    }
}

/// Builder for [`TemplateDescriptor`]; validation runs in `build()`.
#[derive(Debug)]
pub struct TemplateBuilder {
    tier: TemplateTier,
    metadata: Option<TemplateMetadata>,
    tree: TemplateTree,
}

impl TemplateBuilder {
    fn new(tier: TemplateTier) -> Self {
        Self {
            tier,
            metadata: None,
            tree: TemplateTree::default(),
        }
    }

    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the entire tree at once (replaces any previous nodes).
    pub fn tree(mut self, tree: TemplateTree) -> Self {
        self.tree = tree;
        self
    }

    pub fn add_node(mut self, node: TemplateNode) -> Self {
        self.tree.push(node);
        self
    }

    pub fn build(self) -> Result<TemplateDescriptor, DomainError> {
        let metadata = self
            .metadata
            .unwrap_or_else(|| TemplateMetadata::new(self.tier.as_str()));

        let descriptor = TemplateDescriptor {
            tier: self.tier,
            metadata: metadata.description_or(self.tier.summary()),
            tree: self.tree,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

// ============================================================================
// Template Metadata
// ============================================================================

/// Human-readable information about a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    /// Short display name (e.g., "Hello World")
    pub name: String,
    pub description: String,
    pub version: String,
    pub tags: Vec<String>,
    /// Shell instructions printed after a successful materialization.
    pub next_steps: Vec<String>,
}

impl TemplateMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: "0.1.0".to_string(),
            tags: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn version(mut self, ver: impl Into<String>) -> Self {
        self.version = ver.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn next_steps(mut self, steps: Vec<String>) -> Self {
        self.next_steps = steps;
        self
    }

    fn description_or(mut self, fallback: &str) -> Self {
        if self.description.trim().is_empty() {
            self.description = fallback.to_string();
        }
        self
    }
}

// ============================================================================
// Template Tree
// ============================================================================

/// Ordered description of a project's filesystem structure.
#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileSpec> {
        self.nodes.iter().filter_map(|n| match n {
            TemplateNode::File(f) => Some(f),
            TemplateNode::Directory(_) => None,
        })
    }

    /// Keep nodes in path order so output is deterministic regardless of
    /// how the source directory was walked.
    pub fn sort(&mut self) {
        self.nodes
            .sort_by(|a, b| a.path().to_slash_string().cmp(&b.path().to_slash_string()));
    }
}

#[derive(Debug, Clone)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

impl From<FileSpec> for TemplateNode {
    fn from(spec: FileSpec) -> Self {
        Self::File(spec)
    }
}

impl From<DirectorySpec> for TemplateNode {
    fn from(spec: DirectorySpec) -> Self {
        Self::Directory(spec)
    }
}

/// Specification for a file to create.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub path: RelativePath,
    pub content: TemplateContent,
    pub permissions: Permissions,
}

impl FileSpec {
    pub fn new(path: RelativePath, content: TemplateContent) -> Self {
        Self {
            path,
            content,
            permissions: Permissions::read_write(),
        }
    }

    /// Mark this file as executable (e.g., shell entry points).
    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }
}

/// Specification for a directory that must exist even when empty.
#[derive(Debug, Clone)]
pub struct DirectorySpec {
    pub path: RelativePath,
    pub permissions: Permissions,
}

impl DirectorySpec {
    pub fn new(path: RelativePath) -> Self {
        Self {
            path,
            permissions: Permissions::read_write(),
        }
    }
}

// ============================================================================
// Content Types
// ============================================================================

/// Content specification for a file.
///
/// **Literal** content is copied byte-for-byte. **Parameterized** content
/// goes through [`RenderContext::render`].
#[derive(Debug, Clone)]
pub enum TemplateContent {
    Literal(TemplateSource),
    Parameterized(TemplateSource),
}

impl TemplateContent {
    /// Pick `Parameterized` when the text contains placeholder syntax.
    pub fn detect(source: impl Into<TemplateSource>) -> Self {
        let source = source.into();
        if source.contains_placeholder() {
            Self::Parameterized(source)
        } else {
            Self::Literal(source)
        }
    }

    pub fn source(&self) -> &TemplateSource {
        match self {
            Self::Literal(s) | Self::Parameterized(s) => s,
        }
    }

    pub fn render(&self, ctx: &RenderContext) -> String {
        match self {
            Self::Literal(source) => source.as_str().to_string(),
            Self::Parameterized(source) => ctx.render(source.as_str()),
        }
    }
}

/// Source of template content: compiled in, or loaded at runtime.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Embedded in the binary (built-in templates).
    Static(&'static str),
    /// Read from a templates directory.
    Owned(String),
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }

    /// Quick heuristic used by loaders when a manifest gives no file type.
    pub fn contains_placeholder(&self) -> bool {
        let s = self.as_str();
        s.find("{{")
            .is_some_and(|start| s[start + 2..].contains("}}"))
    }
}
