//! Tests for #[derive(Action)] macro

use reactive_stores_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum SearchAction {
    #[command]
    SetQuery { query: String },

    #[command]
    Clear,

    #[event]
    ResultsLoaded(Vec<String>),

    #[event]
    SearchFailed { error: String },

    Evaluate,
}

#[test]
fn test_is_command() {
    let action = SearchAction::SetQuery {
        query: "rust".to_string(),
    };
    assert!(action.is_command());
    assert!(!action.is_event());
    assert!(SearchAction::Clear.is_command());
}

#[test]
fn test_is_event() {
    let action = SearchAction::ResultsLoaded(vec!["crate".to_string()]);
    assert!(!action.is_command());
    assert!(action.is_event());
}

#[test]
fn test_unmarked_variant_is_neither() {
    assert!(!SearchAction::Evaluate.is_command());
    assert!(!SearchAction::Evaluate.is_event());
}

#[test]
fn test_name_covers_every_variant_shape() {
    assert_eq!(SearchAction::SetQuery { query: String::new() }.name(), "SetQuery");
    assert_eq!(SearchAction::Clear.name(), "Clear");
    assert_eq!(SearchAction::ResultsLoaded(Vec::new()).name(), "ResultsLoaded");
    assert_eq!(
        SearchAction::SearchFailed {
            error: "timeout".to_string()
        }
        .name(),
        "SearchFailed"
    );
    assert_eq!(SearchAction::Evaluate.name(), "Evaluate");
}

#[derive(Action, Clone, Debug)]
enum Wrapped<T: Clone> {
    #[event]
    Value(T),
    #[command]
    Reset,
}

#[test]
fn test_generic_enums_are_supported() {
    assert!(Wrapped::Value(3_u8).is_event());
    assert_eq!(Wrapped::<u8>::Reset.name(), "Reset");
}
