#![forbid(unsafe_code)]

//! Error types for tree mutation.
//!
//! Dispatch itself is infallible (an [`Event`](crate::Event) is consumed by
//! value, so re-dispatching an in-flight event is unrepresentable); the only
//! fallible operations in this crate are the tree mutations, which mirror the
//! failure cases of the hierarchy they model.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Caller action |
//! |---------|-------|---------------|
//! | `HierarchyRequest` | Inserting a node under itself or a descendant | Fix the insertion site |
//! | `NotFound` | Removing a node that is not a child of the receiver | Treat as already removed |

/// Errors from node-tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The insertion would make a node its own ancestor.
    HierarchyRequest,
    /// The node to remove is not a child of the receiver.
    NotFound,
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HierarchyRequest => {
                write!(f, "hierarchy violation: node cannot become its own ancestor")
            }
            Self::NotFound => write!(f, "node is not a child of the target"),
        }
    }
}

impl std::error::Error for DomError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            DomError::HierarchyRequest.to_string(),
            "hierarchy violation: node cannot become its own ancestor"
        );
        assert_eq!(DomError::NotFound.to_string(), "node is not a child of the target");
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<DomError>();
    }
}
