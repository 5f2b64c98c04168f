//! Tests for longer edit sequences
//!
//! This tests:
//! - Move + delete chains
//! - Undo/redo sequences
//! - Mutation scripts deserialized from JSON
//! - Tree integrity after operations

use pagecraft_editor::{Block, Editor, Mutation, StaticRegistry};
use std::sync::Arc;

fn editor() -> Editor {
    Editor::new(Arc::new(StaticRegistry::builtin()))
}

#[test]
fn test_move_then_delete_sequence() {
    let mut editor = editor();
    let first = editor.insert("Section", None, None).unwrap();
    let second = editor.insert("Section", None, None).unwrap();
    let child = editor.insert("Text", Some(&second), None).unwrap();

    // Move second into first
    editor.move_block(&second, Some(&first), Some(0)).unwrap();
    assert_eq!(editor.tree().children(Some(&first)).len(), 1);

    // Delete first, taking second and child with it
    let removed = editor.delete(&first).unwrap();
    assert_eq!(removed, vec![first.clone(), second.clone(), child.clone()]);
    assert!(editor.blocks().is_empty());

    // Undo delete restores all three
    editor.undo();
    assert!(editor.tree().contains(&child));
    assert_eq!(editor.tree().get(&second).unwrap().parent_block_id.as_ref(), Some(&first));

    // Undo move puts second back at root
    editor.undo();
    assert!(editor.tree().get(&second).unwrap().is_root());
    assert_eq!(editor.tree().roots().len(), 2);
}

#[test]
fn test_undo_redo_walks_every_snapshot() {
    let mut editor = editor();
    let mut snapshots: Vec<Vec<Block>> = vec![editor.snapshot()];

    let section = editor.insert("Section", None, None).unwrap();
    snapshots.push(editor.snapshot());
    let text = editor.insert("Text", Some(&section), None).unwrap();
    snapshots.push(editor.snapshot());
    editor.set_visibility(&text, false).unwrap();
    snapshots.push(editor.snapshot());
    editor.duplicate(&section).unwrap();
    snapshots.push(editor.snapshot());

    for expected in snapshots.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(&editor.snapshot(), expected);
    }
    assert!(!editor.undo());

    for expected in snapshots.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(&editor.snapshot(), expected);
    }
    assert!(!editor.redo());
}

#[test]
fn test_new_edit_after_undo_drops_redo() {
    let mut editor = editor();
    editor.insert("Hero", None, None).unwrap();
    editor.undo();
    assert!(editor.can_redo());

    editor.insert("Text", None, None).unwrap();
    assert!(!editor.can_redo());
}

#[test]
fn test_history_depth_is_bounded() {
    let mut editor = Editor::with_max_history(Arc::new(StaticRegistry::builtin()), 3);
    for _ in 0..10 {
        editor.insert("Spacer", None, None).unwrap();
    }

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(editor.blocks().len(), 7);
}

#[test]
fn test_mutation_script_from_json() -> anyhow::Result<()> {
    let mut editor = editor();
    let script = r#"[
        { "op": "insert_block", "component_name": "Section" },
        { "op": "insert_block", "component_name": "Hero", "props": { "title": "Hello" } },
        { "op": "reorder_blocks", "old_index": 1, "new_index": 0 }
    ]"#;
    let mutations: Vec<Mutation> = serde_json::from_str(script)?;

    for mutation in mutations {
        editor.apply(mutation)?;
    }

    let roots = editor.tree().roots();
    assert_eq!(roots[0].component_name, "Hero");
    assert_eq!(roots[0].prop_str("title"), Some("Hello"));
    assert_eq!(roots[1].component_name, "Section");
    Ok(())
}

#[test]
fn test_hidden_blocks_stay_in_tree() {
    let mut editor = editor();
    let hero = editor.insert("Hero", None, None).unwrap();
    editor.set_visibility(&hero, false).unwrap();

    let block = editor.tree().get(&hero).unwrap();
    assert!(!block.is_visible);
    assert!(editor.tree().check_invariants().is_ok());
}
