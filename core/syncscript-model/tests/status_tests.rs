mod common;

use common::TaskStatus;
use syncscript_model::StatusMachine;

#[test]
fn allowed_transition_yields_next_state() {
    assert_eq!(TaskStatus::Todo.transition(TaskStatus::Doing), Ok(TaskStatus::Doing));
    assert_eq!(TaskStatus::Doing.transition(TaskStatus::Done), Ok(TaskStatus::Done));
}

#[test]
fn same_state_is_accepted() {
    assert_eq!(TaskStatus::Done.transition(TaskStatus::Done), Ok(TaskStatus::Done));
}

#[test]
fn illegal_transition_is_rejected_with_wire_names() {
    let err = TaskStatus::Done.transition(TaskStatus::Todo).unwrap_err();
    assert_eq!(err.from, "done");
    assert_eq!(err.to, "todo");
    assert_eq!(err.to_string(), "illegal status transition: done -> todo");
}

#[test]
fn terminal_states_have_no_successors() {
    assert!(TaskStatus::Done.is_terminal());
    assert!(!TaskStatus::Todo.is_terminal());
}

#[test]
fn can_transition_matches_table() {
    assert!(TaskStatus::Todo.can_transition(TaskStatus::Done));
    assert!(!TaskStatus::Doing.can_transition(TaskStatus::Todo));
}
