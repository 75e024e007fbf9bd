use std::fmt;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    StaleNode(NodeId),
    NotAChild { parent: NodeId, child: NodeId },
    NotAContainer(NodeId),
    NotText(NodeId),
    HierarchyRequest { parent: NodeId, child: NodeId },
    StillAttached(NodeId),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::StaleNode(id) => write!(f, "node {id:?} is no longer part of the document"),
            DomError::NotAChild { parent, child } => {
                write!(f, "node {child:?} is not a child of {parent:?}")
            }
            DomError::NotAContainer(id) => write!(f, "node {id:?} cannot have children"),
            DomError::NotText(id) => write!(f, "node {id:?} is not a text node"),
            DomError::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child:?} into its own subtree at {parent:?}")
            }
            DomError::StillAttached(id) => write!(f, "node {id:?} still has a parent"),
        }
    }
}

impl std::error::Error for DomError {}
