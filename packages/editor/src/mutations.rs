//! # Block Mutations
//!
//! High-level semantic operations on a page's block tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each mutation represents one editor action
//! 2. **Validated**: Registry and structural constraints are checked first
//! 3. **All-or-nothing**: A rejected mutation leaves the tree untouched
//!
//! ## Mutation Semantics
//!
//! ### InsertBlock
//! - Props start from the registry defaults, given props overlay them
//! - Fails if the parent's component cannot hold children
//!
//! ### MoveBlock
//! - Relocates the block with its whole subtree
//! - Fails if the destination is the block itself or one of its descendants
//!
//! ### DeleteBlock
//! - Removes block and all descendants

use crate::block::{Block, BlockId, Props};
use crate::registry::ComponentRegistry;
use crate::tree::BlockTree;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Semantic mutations on the block tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Create a block from a registry component
    InsertBlock {
        component_name: String,
        #[serde(default)]
        parent_id: Option<BlockId>,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        props: Props,
    },

    /// Move a block (and subtree) to a new parent at index
    MoveBlock {
        block_id: BlockId,
        #[serde(default)]
        new_parent_id: Option<BlockId>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Reorder within one sibling group
    ReorderBlocks {
        #[serde(default)]
        parent_id: Option<BlockId>,
        old_index: usize,
        new_index: usize,
    },

    DeleteBlock {
        block_id: BlockId,
    },

    DuplicateBlock {
        block_id: BlockId,
    },

    /// Merge props into a block's existing props
    UpdateProps {
        block_id: BlockId,
        props: Props,
    },

    SetProp {
        block_id: BlockId,
        key: String,
        value: Value,
    },

    SetCustomCss {
        block_id: BlockId,
        css: Option<String>,
    },

    SetCustomClasses {
        block_id: BlockId,
        classes: Option<String>,
    },

    SetVisibility {
        block_id: BlockId,
        visible: bool,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Parent block not found: {0}")]
    ParentNotFound(BlockId),

    #[error("Cannot move a block into itself or one of its children")]
    CycleDetected,

    #[error("{0} cannot contain other blocks")]
    ChildrenNotSupported(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Index {index} is out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidProp { field: String, reason: String },

    #[error("Invalid block tree: {0}")]
    InvalidTree(String),

    #[error("Duplicate block id: {0}")]
    DuplicateId(BlockId),
}

/// What a successful mutation touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Created or edited block
    pub block_id: Option<BlockId>,

    /// Blocks removed from the tree
    pub removed: Vec<BlockId>,
}

impl MutationOutcome {
    fn touched(id: BlockId) -> Self {
        Self {
            block_id: Some(id),
            removed: Vec::new(),
        }
    }
}

impl Mutation {
    /// Apply mutation to the tree with validation
    pub fn apply(
        &self,
        tree: &mut BlockTree,
        registry: &dyn ComponentRegistry,
    ) -> Result<MutationOutcome, MutationError> {
        self.validate(tree, registry)?;

        match self {
            Mutation::InsertBlock { component_name, parent_id, index, props } => {
                let block = Block::new(component_name.clone())
                    .with_props(Self::seeded_props(registry, component_name, props));
                let id = tree.insert(block, parent_id.as_ref(), *index)?;
                Ok(MutationOutcome::touched(id))
            }

            Mutation::MoveBlock { block_id, new_parent_id, index } => {
                tree.move_block(block_id, new_parent_id.as_ref(), *index)?;
                Ok(MutationOutcome::touched(block_id.clone()))
            }

            Mutation::ReorderBlocks { parent_id, old_index, new_index } => {
                tree.reorder(parent_id.as_ref(), *old_index, *new_index)?;
                Ok(MutationOutcome::default())
            }

            Mutation::DeleteBlock { block_id } => {
                let removed = tree.delete(block_id)?;
                Ok(MutationOutcome {
                    block_id: None,
                    removed: removed.into_iter().map(|b| b.id).collect(),
                })
            }

            Mutation::DuplicateBlock { block_id } => {
                let id = tree.duplicate(block_id)?;
                Ok(MutationOutcome::touched(id))
            }

            Mutation::UpdateProps { block_id, props } => {
                let block = Self::block_mut(tree, block_id)?;
                block.props.extend(props.clone());
                Ok(MutationOutcome::touched(block_id.clone()))
            }

            Mutation::SetProp { block_id, key, value } => {
                let block = Self::block_mut(tree, block_id)?;
                block.props.insert(key.clone(), value.clone());
                Ok(MutationOutcome::touched(block_id.clone()))
            }

            Mutation::SetCustomCss { block_id, css } => {
                Self::block_mut(tree, block_id)?.custom_css = non_empty(css);
                Ok(MutationOutcome::touched(block_id.clone()))
            }

            Mutation::SetCustomClasses { block_id, classes } => {
                Self::block_mut(tree, block_id)?.custom_classes = non_empty(classes);
                Ok(MutationOutcome::touched(block_id.clone()))
            }

            Mutation::SetVisibility { block_id, visible } => {
                Self::block_mut(tree, block_id)?.is_visible = *visible;
                Ok(MutationOutcome::touched(block_id.clone()))
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, tree: &BlockTree, registry: &dyn ComponentRegistry) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { component_name, parent_id, props, .. } => {
                if registry.entry(component_name).is_none() {
                    return Err(MutationError::UnknownComponent(component_name.clone()));
                }
                if let Some(parent) = parent_id {
                    Self::check_container(tree, registry, parent)?;
                }
                let seeded = Self::seeded_props(registry, component_name, props);
                Self::check_props(registry, component_name, &seeded)
            }

            Mutation::MoveBlock { block_id, new_parent_id, .. } => {
                Self::block(tree, block_id)?;
                if let Some(parent) = new_parent_id {
                    if !tree.contains(parent) {
                        return Err(MutationError::ParentNotFound(parent.clone()));
                    }
                    if tree.would_create_cycle(block_id, Some(parent))? {
                        return Err(MutationError::CycleDetected);
                    }
                    Self::check_container(tree, registry, parent)?;
                }
                Ok(())
            }

            Mutation::ReorderBlocks { parent_id, old_index, new_index } => {
                if let Some(parent) = parent_id {
                    if !tree.contains(parent) {
                        return Err(MutationError::ParentNotFound(parent.clone()));
                    }
                }
                let len = tree.children(parent_id.as_ref()).len();
                for index in [*old_index, *new_index] {
                    if index >= len {
                        return Err(MutationError::IndexOutOfRange { index, len });
                    }
                }
                Ok(())
            }

            Mutation::DeleteBlock { block_id }
            | Mutation::DuplicateBlock { block_id }
            | Mutation::SetCustomCss { block_id, .. }
            | Mutation::SetCustomClasses { block_id, .. }
            | Mutation::SetVisibility { block_id, .. } => {
                Self::block(tree, block_id)?;
                Ok(())
            }

            Mutation::UpdateProps { block_id, props } => {
                let block = Self::block(tree, block_id)?;
                let mut merged = block.props.clone();
                merged.extend(props.clone());
                Self::check_props(registry, &block.component_name, &merged)
            }

            Mutation::SetProp { block_id, key, value } => {
                let block = Self::block(tree, block_id)?;
                let mut merged = block.props.clone();
                merged.insert(key.clone(), value.clone());
                Self::check_props(registry, &block.component_name, &merged)
            }
        }
    }

    /// Short label for history entries and logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "Insert block",
            Mutation::MoveBlock { .. } => "Move block",
            Mutation::ReorderBlocks { .. } => "Reorder blocks",
            Mutation::DeleteBlock { .. } => "Delete block",
            Mutation::DuplicateBlock { .. } => "Duplicate block",
            Mutation::UpdateProps { .. } | Mutation::SetProp { .. } => "Edit properties",
            Mutation::SetCustomCss { .. } => "Edit custom CSS",
            Mutation::SetCustomClasses { .. } => "Edit custom classes",
            Mutation::SetVisibility { .. } => "Toggle visibility",
        }
    }

    /// Whether the mutation can remove blocks from the tree
    pub fn is_destructive(&self) -> bool {
        matches!(self, Mutation::DeleteBlock { .. })
    }

    fn seeded_props(registry: &dyn ComponentRegistry, component: &str, props: &Props) -> Props {
        let mut seeded = registry
            .entry(component)
            .map(|e| e.default_props())
            .unwrap_or_default();
        seeded.extend(props.clone());
        seeded
    }

    /// Blocks whose component is not in the registry are not prop-checked
    fn check_props(registry: &dyn ComponentRegistry, component: &str, props: &Props) -> Result<(), MutationError> {
        match registry.entry(component) {
            Some(entry) => entry
                .validate_props(props)
                .map_err(|(field, reason)| MutationError::InvalidProp { field, reason }),
            None => Ok(()),
        }
    }

    fn check_container(
        tree: &BlockTree,
        registry: &dyn ComponentRegistry,
        parent: &BlockId,
    ) -> Result<(), MutationError> {
        let parent_block = tree
            .get(parent)
            .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
        if registry.supports_children(&parent_block.component_name) {
            Ok(())
        } else {
            Err(MutationError::ChildrenNotSupported(parent_block.component_name.clone()))
        }
    }

    fn block<'a>(tree: &'a BlockTree, id: &BlockId) -> Result<&'a Block, MutationError> {
        tree.get(id).ok_or_else(|| MutationError::BlockNotFound(id.clone()))
    }

    fn block_mut<'a>(tree: &'a mut BlockTree, id: &BlockId) -> Result<&'a mut Block, MutationError> {
        tree.get_mut(id).ok_or_else(|| MutationError::BlockNotFound(id.clone()))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticRegistry;
    use serde_json::json;

    fn insert(tree: &mut BlockTree, registry: &StaticRegistry, component: &str, parent: Option<&BlockId>) -> BlockId {
        Mutation::InsertBlock {
            component_name: component.to_string(),
            parent_id: parent.cloned(),
            index: None,
            props: Props::new(),
        }
        .apply(tree, registry)
        .unwrap()
        .block_id
        .unwrap()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::SetProp {
            block_id: BlockId::new("b1"),
            key: "title".to_string(),
            value: json!("Hello World"),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains("\"op\":\"set_prop\""));
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_seeds_default_props() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();

        let id = insert(&mut tree, &registry, "Hero", None);
        assert_eq!(tree.get(&id).unwrap().props.get("title"), Some(&json!("Welcome")));
    }

    #[test]
    fn test_insert_unknown_component() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();

        let err = Mutation::InsertBlock {
            component_name: "Carousel3D".into(),
            parent_id: None,
            index: None,
            props: Props::new(),
        }
        .apply(&mut tree, &registry)
        .unwrap_err();

        assert_eq!(err, MutationError::UnknownComponent("Carousel3D".into()));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_into_leaf_rejected() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();
        let hero = insert(&mut tree, &registry, "Hero", None);
        let before = tree.clone();

        let err = Mutation::InsertBlock {
            component_name: "Text".into(),
            parent_id: Some(hero),
            index: None,
            props: Props::new(),
        }
        .apply(&mut tree, &registry)
        .unwrap_err();

        assert_eq!(err, MutationError::ChildrenNotSupported("Hero".into()));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_invalid_prop_rejected() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();
        let heading = insert(&mut tree, &registry, "Heading", None);

        let err = Mutation::SetProp {
            block_id: heading.clone(),
            key: "level".into(),
            value: json!(9),
        }
        .apply(&mut tree, &registry)
        .unwrap_err();

        assert!(matches!(err, MutationError::InvalidProp { ref field, .. } if field == "level"));
        assert_eq!(tree.get(&heading).unwrap().props.get("level"), Some(&json!(2)));
    }

    #[test]
    fn test_update_props_merges() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();
        let button = insert(&mut tree, &registry, "Button", None);

        let mut props = Props::new();
        props.insert("href".into(), json!("/contact"));
        Mutation::UpdateProps { block_id: button.clone(), props }
            .apply(&mut tree, &registry)
            .unwrap();

        let block = tree.get(&button).unwrap();
        assert_eq!(block.prop_str("href"), Some("/contact"));
        assert_eq!(block.prop_str("label"), Some("Click me"));
    }

    #[test]
    fn test_blank_custom_css_clears() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();
        let text = insert(&mut tree, &registry, "Text", None);

        Mutation::SetCustomCss { block_id: text.clone(), css: Some("color: red;".into()) }
            .apply(&mut tree, &registry)
            .unwrap();
        assert_eq!(tree.get(&text).unwrap().custom_css.as_deref(), Some("color: red;"));

        Mutation::SetCustomCss { block_id: text.clone(), css: Some("   ".into()) }
            .apply(&mut tree, &registry)
            .unwrap();
        assert_eq!(tree.get(&text).unwrap().custom_css, None);
    }

    #[test]
    fn test_move_into_leaf_rejected() {
        let registry = StaticRegistry::builtin();
        let mut tree = BlockTree::new();
        let text = insert(&mut tree, &registry, "Text", None);
        let image = insert(&mut tree, &registry, "Image", None);

        let err = Mutation::MoveBlock {
            block_id: text,
            new_parent_id: Some(image),
            index: None,
        }
        .validate(&tree, &registry)
        .unwrap_err();

        assert_eq!(err, MutationError::ChildrenNotSupported("Image".into()));
    }
}
