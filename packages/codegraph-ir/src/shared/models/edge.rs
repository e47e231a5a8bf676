//! Universal Code Entity edge: a directed relationship between two nodes.

use serde::{Deserialize, Serialize};

use super::edge_context::{ControlFlowContext, ReadWriteContext};
use super::span::Span;

/// Kind of relationship an `Edge` expresses between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Defines,
    Calls,
    Invokes,
    Instantiates,
    Imports,
    Alias,
    Extends,
    Implements,
    ImplementsTrait,
    Inherits,
    Overrides,
    DelegatesTo,
    TraitImpl,
    BoundedBy,
    TypeArgumentOf,
    LifetimeOf,
    AnnotatedWith,
    DecoratedWith,
    Decorates,
    Reads,
    Read,
    Writes,
    Assign,
    DataFlow,
    DefUse,
    Shadows,
    Captures,
    BorrowsFrom,
    References,
    ReferencesSymbol,
    ReferencesType,
    ReferencesExternal,
    TypeAnnotation,
    ControlFlow,
    Sequential,
    Normal,
    TrueBranch,
    FalseBranch,
    LoopBack,
    LoopExit,
    CfgNext,
    CfgBranch,
    CfgLoop,
    CfgHandler,
    Catches,
    Throws,
    Exception,
    Finally,
    MacroExpands,
    ChannelSend,
    ChannelReceive,
    SpawnsGoroutine,
    SuspendsTo,
    RouteHandler,
    HandlesRequest,
    UsesRepository,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::Defines => "defines",
            EdgeKind::Calls => "calls",
            EdgeKind::Invokes => "invokes",
            EdgeKind::Instantiates => "instantiates",
            EdgeKind::Imports => "imports",
            EdgeKind::Alias => "alias",
            EdgeKind::Extends => "extends",
            EdgeKind::Implements => "implements",
            EdgeKind::ImplementsTrait => "implements_trait",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Overrides => "overrides",
            EdgeKind::DelegatesTo => "delegates_to",
            EdgeKind::TraitImpl => "trait_impl",
            EdgeKind::BoundedBy => "bounded_by",
            EdgeKind::TypeArgumentOf => "type_argument_of",
            EdgeKind::LifetimeOf => "lifetime_of",
            EdgeKind::AnnotatedWith => "annotated_with",
            EdgeKind::DecoratedWith => "decorated_with",
            EdgeKind::Decorates => "decorates",
            EdgeKind::Reads => "reads",
            EdgeKind::Read => "read",
            EdgeKind::Writes => "writes",
            EdgeKind::Assign => "assign",
            EdgeKind::DataFlow => "data_flow",
            EdgeKind::DefUse => "def_use",
            EdgeKind::Shadows => "shadows",
            EdgeKind::Captures => "captures",
            EdgeKind::BorrowsFrom => "borrows_from",
            EdgeKind::References => "references",
            EdgeKind::ReferencesSymbol => "references_symbol",
            EdgeKind::ReferencesType => "references_type",
            EdgeKind::ReferencesExternal => "references_external",
            EdgeKind::TypeAnnotation => "type_annotation",
            EdgeKind::ControlFlow => "control_flow",
            EdgeKind::Sequential => "sequential",
            EdgeKind::Normal => "normal",
            EdgeKind::TrueBranch => "true_branch",
            EdgeKind::FalseBranch => "false_branch",
            EdgeKind::LoopBack => "loop_back",
            EdgeKind::LoopExit => "loop_exit",
            EdgeKind::CfgNext => "cfg_next",
            EdgeKind::CfgBranch => "cfg_branch",
            EdgeKind::CfgLoop => "cfg_loop",
            EdgeKind::CfgHandler => "cfg_handler",
            EdgeKind::Catches => "catches",
            EdgeKind::Throws => "throws",
            EdgeKind::Exception => "exception",
            EdgeKind::Finally => "finally",
            EdgeKind::MacroExpands => "macro_expands",
            EdgeKind::ChannelSend => "channel_send",
            EdgeKind::ChannelReceive => "channel_receive",
            EdgeKind::SpawnsGoroutine => "spawns_goroutine",
            EdgeKind::SuspendsTo => "suspends_to",
            EdgeKind::RouteHandler => "route_handler",
            EdgeKind::HandlesRequest => "handles_request",
            EdgeKind::UsesRepository => "uses_repository",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extra, edge-kind-specific context. Most edges carry none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    /// Import alias (`import foo as f` -> `alias = Some("f")`).
    pub alias: Option<String>,
    pub read_write: Option<ReadWriteContext>,
    pub control_flow: Option<ControlFlowContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
    pub span: Option<Span>,
    pub metadata: Option<EdgeMetadata>,
    pub attrs: Option<String>,
}

impl Edge {
    pub fn new(source_id: String, target_id: String, kind: EdgeKind) -> Self {
        Self {
            source_id,
            target_id,
            kind,
            span: None,
            metadata: None,
            attrs: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_edge_has_no_metadata() {
        let edge = Edge::new("a".to_string(), "b".to_string(), EdgeKind::Calls);
        assert!(edge.metadata.is_none());
        assert!(edge.span.is_none());
    }

    #[test]
    fn with_metadata_sets_alias() {
        let edge = Edge::new("a".to_string(), "b".to_string(), EdgeKind::Imports).with_metadata(
            EdgeMetadata {
                alias: Some("np".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(
            edge.metadata.as_ref().and_then(|m| m.alias.clone()),
            Some("np".to_string())
        );
    }
}
