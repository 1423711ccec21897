#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn buffer_captures_lines() {
    let handler = buffer_handler();
    handler.print(&Location::new("t.lark", 1, 1), "hello");
    handler.print(&Location::new("t.lark", 2, 1), "world");
    assert_eq!(handler.output(), "hello\nworld\n");
}

#[test]
fn buffer_records_locations() {
    let handler = buffer_handler();
    handler.print(&Location::new("t.lark", 3, 7), "x");
    assert_eq!(
        handler.events(),
        vec![PrintEvent {
            location: Location::new("t.lark", 3, 7),
            message: "x".to_string(),
        }]
    );
}

#[test]
fn clear_empties_buffer() {
    let handler = buffer_handler();
    handler.print(&Location::builtin(), "hello");
    handler.clear();
    assert!(handler.output().is_empty());
}

#[test]
fn silent_discards_output() {
    let handler = silent_handler();
    handler.print(&Location::builtin(), "hello");
    assert_eq!(handler.output(), "");
    assert!(handler.events().is_empty());
}

#[test]
fn stdout_captures_nothing() {
    let handler = stdout_handler();
    assert_eq!(handler.output(), "");
}
