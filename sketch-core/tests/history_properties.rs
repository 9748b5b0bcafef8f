//! History Buffer Property Tests
//!
//! Randomized push/undo/redo sequences against the linear undo stack.

use proptest::prelude::*;
use sketch_core::{HistoryBuffer, HistoryConfig, HistorySnapshot, SketchController, Tool};

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Push),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn apply(history: &mut HistoryBuffer<u32>, op: &Op) {
    match op {
        Op::Push(v) => history.push(*v),
        Op::Undo => {
            history.undo();
        }
        Op::Redo => {
            history.redo();
        }
    }
}

proptest! {
    #[test]
    fn undo_then_redo_restores_current(ops in prop::collection::vec(op(), 1..120)) {
        let mut history = HistoryBuffer::new(50);
        for op in &ops {
            apply(&mut history, op);
        }
        let before = history.current().copied();
        if history.can_undo() {
            history.undo();
            prop_assert_eq!(history.redo(), before);
        } else {
            // At the oldest entry undo is a no-op.
            prop_assert_eq!(history.undo(), None);
            prop_assert_eq!(history.current().copied(), before);
        }
    }

    #[test]
    fn redo_at_tip_is_noop(values in prop::collection::vec(any::<u32>(), 1..80)) {
        let mut history = HistoryBuffer::new(50);
        for v in &values {
            history.push(*v);
        }
        prop_assert_eq!(history.redo(), None);
        prop_assert_eq!(history.current(), values.last());
    }

    #[test]
    fn length_never_exceeds_cap_and_order_is_kept(
        values in prop::collection::vec(any::<u32>(), 0..200),
        cap in 1usize..60,
    ) {
        let mut history = HistoryBuffer::new(cap);
        for v in &values {
            history.push(*v);
            prop_assert!(history.len() <= cap);
        }
        let kept: Vec<u32> = history.iter().copied().collect();
        let expected: Vec<u32> = values[values.len().saturating_sub(cap)..].to_vec();
        prop_assert_eq!(kept, expected);
    }
}

#[test]
fn default_cap_is_fifty() {
    let config = HistoryConfig::default();
    assert_eq!(config.capacity, 50);
    assert_eq!(config.debounce_ms, 1000);

    let mut history = HistoryBuffer::new(config.capacity);
    for i in 0..75 {
        history.push(i);
    }
    assert_eq!(history.len(), 50);
    assert_eq!(history.iter().next(), Some(&25));
}

#[test]
fn controller_history_is_capped_by_config() {
    let mut controller = SketchController::with_config(HistoryConfig {
        capacity: 3,
        debounce_ms: 0,
    });
    controller.set_tool(Tool::Server);
    for i in 0..10u16 {
        let x = f32::from(i) * 200.0;
        controller.handle(&sketch_core::InputEvent::PointerDown(
            sketch_core::PointerEvent::new(x, 100.0, u64::from(i)),
        ));
        controller.tick(u64::from(i));
    }
    assert_eq!(controller.history().len(), 3);
    let tip: &HistorySnapshot = controller.history().current().expect("tip");
    assert_eq!(tip.elements.len(), 10);
}
