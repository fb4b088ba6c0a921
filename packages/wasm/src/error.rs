//! Error types for the hierarchy axis core.
//!
//! Malformed input and precondition violations are reported as typed errors.
//! Out-of-range lookups (pixel outside every tick, pointer outside the
//! hierarchy band) are not errors; they surface as `None`.

use crate::tree::NodeIndex;

/// Malformed label input rejected by the tree builder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// A label string was empty.
    #[error("empty label at path {path:?}")]
    EmptyLabel { path: Vec<usize> },

    /// A leaf descriptor asked to be collapsed or focused.
    #[error("node '{label}' has no children but expand is {expand}")]
    LeafNotExpandable { label: String, expand: &'static str },

    /// More than one node was marked as focused.
    #[error("only one node may be focused, found '{first}' and '{second}'")]
    MultipleFocus { first: String, second: String },

    /// A focused node sits below a collapsed ancestor and could never be shown.
    #[error("focused node '{label}' is below collapsed ancestor '{ancestor}'")]
    FocusUnderCollapsed { label: String, ancestor: String },

    /// An `expand` string other than `"focus"`.
    #[error("unknown expand value '{0}'")]
    UnknownExpand(String),
}

/// Shadow-tree shape mismatches between a dataset and the label tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// The dataset has no value slot for a label node.
    #[error("dataset '{dataset}' has no value for path {path:?}")]
    MissingSlot { dataset: String, path: Vec<usize> },

    /// A dataset group has a different number of children than its label.
    #[error("dataset '{dataset}' has {actual} values at path {path:?}, labels have {expected}")]
    ChildCountMismatch {
        dataset: String,
        path: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// A dataset carries children beneath a label leaf.
    #[error("dataset '{dataset}' has children under leaf label at path {path:?}")]
    ChildrenUnderLeaf { dataset: String, path: Vec<usize> },

    /// The per-dataset attribute overrides were not a JSON object.
    #[error("dataset '{dataset}' attributes must be an object")]
    AttributesNotObject { dataset: String },
}

/// Invalid axis options.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("levelPercentage must be in (0, 1], got {0}")]
    LevelPercentage(f32),

    #[error("rowHeight must be positive, got {0}")]
    RowHeight(f32),

    #[error("padding must not be negative, got {0}")]
    Padding(f32),
}

/// The state-machine operation a precondition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Expand,
    Collapse,
    ZoomIn,
    ZoomOut,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Expand => "expand",
            Self::Collapse => "collapse",
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
        };
        f.write_str(name)
    }
}

/// Top-level error returned by the axis engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AxisError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A transition was requested on a node in the wrong state.
    #[error("{operation} on {node}: {reason}")]
    Precondition {
        operation: Operation,
        node: NodeIndex,
        reason: &'static str,
    },

    #[error("unknown node {0}")]
    UnknownNode(NodeIndex),

    #[error("unknown dataset {0}")]
    UnknownDataset(usize),

    /// A snapshot referenced a path that does not exist in the current tree.
    #[error("snapshot path {path:?} does not match the label tree")]
    InvalidSnapshot { path: Vec<usize> },
}

impl AxisError {
    pub(crate) fn precondition(operation: Operation, node: NodeIndex, reason: &'static str) -> Self {
        log::warn!("rejected {operation} on {node}: {reason}");
        Self::Precondition {
            operation,
            node,
            reason,
        }
    }
}

pub type Result<T, E = AxisError> = std::result::Result<T, E>;
