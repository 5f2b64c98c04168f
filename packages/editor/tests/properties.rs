//! Property tests over random edit sequences

use pagecraft_editor::{BlockId, Editor, MutationError, EditorError, StaticRegistry};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    InsertRoot(usize),
    InsertChild(usize, usize),
    Delete(usize),
    Move(usize, usize),
    Duplicate(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8).prop_map(Op::InsertRoot),
        (0usize..32, 0usize..8).prop_map(|(p, i)| Op::InsertChild(p, i)),
        (0usize..32).prop_map(Op::Delete),
        (0usize..32, 0usize..32).prop_map(|(a, b)| Op::Move(a, b)),
        (0usize..32).prop_map(Op::Duplicate),
    ]
}

fn pick(editor: &Editor, n: usize) -> Option<BlockId> {
    let blocks = editor.blocks();
    if blocks.is_empty() {
        None
    } else {
        Some(blocks[n % blocks.len()].id.clone())
    }
}

fn run(editor: &mut Editor, op: &Op) {
    let _ = match op {
        Op::InsertRoot(i) => editor.insert("Section", None, Some(*i)).map(|_| ()),
        Op::InsertChild(p, i) => match pick(editor, *p) {
            Some(parent) => editor.insert("Section", Some(&parent), Some(*i)).map(|_| ()),
            None => Ok(()),
        },
        Op::Delete(n) => match pick(editor, *n) {
            Some(id) => editor.delete(&id).map(|_| ()),
            None => Ok(()),
        },
        Op::Move(a, b) => match (pick(editor, *a), pick(editor, *b)) {
            (Some(id), Some(parent)) => editor.move_block(&id, Some(&parent), None),
            _ => Ok(()),
        },
        Op::Duplicate(n) => match pick(editor, *n) {
            Some(id) => editor.duplicate(&id).map(|_| ()),
            None => Ok(()),
        },
    };
}

fn assert_sort_orders_unique(editor: &Editor) {
    let mut groups: HashMap<Option<BlockId>, HashSet<i64>> = HashMap::new();
    for block in editor.blocks() {
        let orders = groups.entry(block.parent_block_id.clone()).or_default();
        assert!(orders.insert(block.sort_order), "duplicate sort_order in group");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sort_order_stays_unique(ops in prop::collection::vec(op(), 1..40)) {
        let mut editor = Editor::new(Arc::new(StaticRegistry::builtin()));
        for op in &ops {
            run(&mut editor, op);
            assert_sort_orders_unique(&editor);
            prop_assert!(editor.tree().check_invariants().is_ok());
        }
    }

    #[test]
    fn undo_restores_prior_snapshot(ops in prop::collection::vec(op(), 1..30)) {
        let mut editor = Editor::new(Arc::new(StaticRegistry::builtin()));
        for op in &ops {
            let before = editor.snapshot();
            let version = editor.version();
            run(&mut editor, op);
            if editor.version() == version {
                continue;
            }
            let after = editor.snapshot();

            prop_assert!(editor.undo());
            prop_assert_eq!(&editor.snapshot(), &before);
            prop_assert!(editor.redo());
            prop_assert_eq!(&editor.snapshot(), &after);
        }
    }

    #[test]
    fn move_under_descendant_always_fails(depth in 1usize..6, pick in 0usize..6) {
        let mut editor = Editor::new(Arc::new(StaticRegistry::builtin()));
        let root = editor.insert("Section", None, None).unwrap();
        let mut chain = vec![root.clone()];
        for _ in 0..depth {
            let last = chain.last().unwrap().clone();
            chain.push(editor.insert("Section", Some(&last), None).unwrap());
        }
        let target = chain[pick % chain.len()].clone();
        let before = editor.snapshot();

        let err = editor.move_block(&root, Some(&target), None).unwrap_err();
        prop_assert_eq!(err, EditorError::Mutation(MutationError::CycleDetected));
        prop_assert_eq!(editor.snapshot(), before);
    }
}
