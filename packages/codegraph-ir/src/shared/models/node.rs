//! Universal Code Entity node: one row per extracted symbol, independent
//! of source language.

use serde::{Deserialize, Serialize};

use super::span::Span;

/// Kind of a Universal Code Entity node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Module,
    Class,
    Interface,
    Trait,
    TraitImpl,
    Struct,
    Enum,
    EnumMember,
    Record,
    DataClass,
    SealedClass,
    CompanionObject,
    AnnotationDecl,
    Function,
    Method,
    ExtensionFunction,
    SuspendFunction,
    Lambda,
    Variable,
    Constant,
    Field,
    Parameter,
    TypeParameter,
    AssociatedType,
    Lifetime,
    Import,
    Type,
    TypeAlias,
    Signature,
    Macro,
    Channel,
    Expression,
    CfgBlock,
    Try,
    Catch,
    Finally,
    Raise,
    Throw,
    // External/unresolved references (ghost-adjacent)
    ExternalFunction,
    ExternalModule,
    ExternalType,
    // Role-based specializations assigned by the graph builder
    Route,
    Service,
    Repository,
    Config,
    Job,
    Middleware,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Trait => "trait",
            NodeKind::TraitImpl => "trait_impl",
            NodeKind::Struct => "struct",
            NodeKind::Enum => "enum",
            NodeKind::EnumMember => "enum_member",
            NodeKind::Record => "record",
            NodeKind::DataClass => "data_class",
            NodeKind::SealedClass => "sealed_class",
            NodeKind::CompanionObject => "companion_object",
            NodeKind::AnnotationDecl => "annotation_decl",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::ExtensionFunction => "extension_function",
            NodeKind::SuspendFunction => "suspend_function",
            NodeKind::Lambda => "lambda",
            NodeKind::Variable => "variable",
            NodeKind::Constant => "constant",
            NodeKind::Field => "field",
            NodeKind::Parameter => "parameter",
            NodeKind::TypeParameter => "type_parameter",
            NodeKind::AssociatedType => "associated_type",
            NodeKind::Lifetime => "lifetime",
            NodeKind::Import => "import",
            NodeKind::Type => "type",
            NodeKind::TypeAlias => "type_alias",
            NodeKind::Signature => "signature",
            NodeKind::Macro => "macro",
            NodeKind::Channel => "channel",
            NodeKind::Expression => "expression",
            NodeKind::CfgBlock => "cfg_block",
            NodeKind::Try => "try",
            NodeKind::Catch => "catch",
            NodeKind::Finally => "finally",
            NodeKind::Raise => "raise",
            NodeKind::Throw => "throw",
            NodeKind::ExternalFunction => "external_function",
            NodeKind::ExternalModule => "external_module",
            NodeKind::ExternalType => "external_type",
            NodeKind::Route => "route",
            NodeKind::Service => "service",
            NodeKind::Repository => "repository",
            NodeKind::Config => "config",
            NodeKind::Job => "job",
            NodeKind::Middleware => "middleware",
        }
    }
}

/// A single extracted entity: a file, a class, a function, a variable, and
/// so on. Only `id`/`kind`/`fqn`/`file_path`/`span`/`language` are always
/// present; everything else is populated when the source language and
/// extractor support it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub fqn: String,
    pub file_path: String,
    pub span: Span,
    pub language: String,

    /// Content-addressed identity, stable across renames at the same
    /// location. Populated by the identity/hashing stage.
    pub stable_id: Option<String>,
    pub content_hash: Option<String>,

    pub name: Option<String>,
    pub module_path: Option<String>,
    pub parent_id: Option<String>,
    pub body_span: Option<Span>,
    pub docstring: Option<String>,
    pub decorators: Option<Vec<String>>,
    pub annotations: Option<Vec<String>>,
    pub modifiers: Option<Vec<String>>,

    pub is_async: Option<bool>,
    pub is_generator: Option<bool>,
    pub is_static: Option<bool>,
    pub is_abstract: Option<bool>,

    pub parameters: Option<Vec<String>>,
    pub return_type: Option<String>,
    pub base_classes: Option<Vec<String>>,
    pub metaclass: Option<String>,
    pub type_annotation: Option<String>,
    pub initial_value: Option<String>,

    /// Opaque JSON-encoded extra attributes, kept as a string for
    /// cross-language (de)serialization stability.
    pub metadata: Option<String>,

    /// Role hint used by the graph builder to specialize `NodeKind`
    /// (e.g. "controller" -> `NodeKind::Route`).
    pub role: Option<String>,
    pub is_test_file: Option<bool>,
    pub signature_id: Option<String>,
    pub declared_type_id: Option<String>,
    pub attrs: Option<String>,
    pub raw: Option<String>,
    pub flavor: Option<String>,
    pub is_nullable: Option<bool>,
    pub owner_node_id: Option<String>,
    pub condition_expr_id: Option<String>,
    pub condition_text: Option<String>,
}

impl Node {
    pub fn new(
        id: String,
        kind: NodeKind,
        fqn: String,
        file_path: String,
        span: Span,
    ) -> Self {
        Self {
            id,
            kind,
            fqn,
            file_path,
            span,
            language: String::new(),
            stable_id: None,
            content_hash: None,
            name: None,
            module_path: None,
            parent_id: None,
            body_span: None,
            docstring: None,
            decorators: None,
            annotations: None,
            modifiers: None,
            is_async: None,
            is_generator: None,
            is_static: None,
            is_abstract: None,
            parameters: None,
            return_type: None,
            base_classes: None,
            metaclass: None,
            type_annotation: None,
            initial_value: None,
            metadata: None,
            role: None,
            is_test_file: None,
            signature_id: None,
            declared_type_id: None,
            attrs: None,
            raw: None,
            flavor: None,
            is_nullable: None,
            owner_node_id: None,
            condition_expr_id: None,
            condition_text: None,
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_docstring(mut self, docstring: String) -> Self {
        self.docstring = Some(docstring);
        self
    }
}

/// Fluent constructor for `Node`, for call sites that set many optional
/// fields at once instead of chaining `with_*`.
#[derive(Default)]
pub struct NodeBuilder {
    node: Option<Node>,
}

impl NodeBuilder {
    pub fn new(id: String, kind: NodeKind, fqn: String, file_path: String, span: Span) -> Self {
        Self {
            node: Some(Node::new(id, kind, fqn, file_path, span)),
        }
    }

    fn node_mut(&mut self) -> &mut Node {
        self.node.as_mut().expect("NodeBuilder used after build()")
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.node_mut().name = Some(name.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.node_mut().language = language.into();
        self
    }

    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.node_mut().parent_id = Some(parent_id.into());
        self
    }

    pub fn build(mut self) -> Node {
        self.node.take().expect("NodeBuilder used after build()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_has_empty_optional_fields() {
        let node = Node::new(
            "n1".to_string(),
            NodeKind::Function,
            "mod.f".to_string(),
            "f.py".to_string(),
            Span::zero(),
        );
        assert_eq!(node.id, "n1");
        assert!(node.name.is_none());
        assert!(node.language.is_empty());
    }

    #[test]
    fn with_methods_chain() {
        let node = Node::new(
            "n1".to_string(),
            NodeKind::Function,
            "mod.f".to_string(),
            "f.py".to_string(),
            Span::zero(),
        )
        .with_name("f".to_string())
        .with_language("python".to_string())
        .with_docstring("doc".to_string());

        assert_eq!(node.name.as_deref(), Some("f"));
        assert_eq!(node.language, "python");
        assert_eq!(node.docstring.as_deref(), Some("doc"));
    }

    #[test]
    fn builder_sets_parent_id() {
        let node = NodeBuilder::new(
            "n2".to_string(),
            NodeKind::Variable,
            "mod.f.x".to_string(),
            "f.py".to_string(),
            Span::zero(),
        )
        .name("x")
        .parent_id("n1")
        .build();

        assert_eq!(node.parent_id.as_deref(), Some("n1"));
    }
}
