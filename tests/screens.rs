//! End-to-end: a terminal host driving a screens engine through resizes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::Event;
use serde_json::json;
use spark_screens::{
    Resolved, ScreenEntry, Screens, ScreensConfig, ScreensInput, TerminalConfig,
    TerminalViewport, Viewport,
};
use spark_signals::effect;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn terminal(cols: u16) -> (TerminalViewport, Screens) {
    init_tracing();
    let term = TerminalViewport::new(cols, 24, TerminalConfig::default());
    let screens = Screens::new(None, Some(term.environment())).unwrap();
    (term, screens)
}

#[test]
fn test_terminal_resize_updates_breakpoints() {
    // 80 cols * 8px = 640px
    let (term, screens) = terminal(80);
    assert_eq!(screens.list(), vec!["sm"]);

    term.handle_event(&Event::Resize(130, 40));
    assert_eq!(screens.list(), vec!["sm", "md", "lg"]);
    assert_eq!(screens.current().as_deref(), Some("lg"));

    term.handle_event(&Event::Resize(40, 40));
    assert!(screens.list().is_empty());
    assert_eq!(screens.current(), None);
}

#[test]
fn test_effect_follows_terminal() {
    let (term, screens) = terminal(100);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let runs = Rc::new(Cell::new(0));

    let sink = seen.clone();
    let r = runs.clone();
    let reader = screens.clone();
    let _stop = effect(move || {
        sink.borrow_mut().push(reader.current());
        r.set(r.get() + 1);
    });

    term.resize(170, 24);
    let last = seen.borrow().last().cloned().flatten();
    assert_eq!(last.as_deref(), Some("xl"));
    assert!(runs.get() >= 2);
}

#[test]
fn test_custom_breakpoints_from_json() {
    init_tracing();
    let input = ScreensInput::from_json_str(
        r#"{
            "narrow": { "max": "399px" },
            "split": [{ "max": "199px" }, { "min": "600px" }],
            "print": { "raw": "print" }
        }"#,
    )
    .unwrap();
    let viewport = Viewport::new(300, 300);
    let screens = Screens::new(Some(input), Some(Rc::new(viewport.clone()))).unwrap();

    assert_eq!(screens.query("split").as_deref(), Some("(max-width: 199px), (min-width: 600px)"));
    assert_eq!(screens.query("print").as_deref(), Some("print"));
    assert_eq!(screens.list(), vec!["narrow"]);

    viewport.resize(700, 300);
    assert_eq!(screens.list(), vec!["split"]);
    assert_eq!(screens.get("split"), ScreenEntry::Match(Some(true)));
    assert_eq!(screens.get("narrow"), ScreenEntry::Match(Some(false)));
}

#[test]
fn test_resolver_across_sizes() {
    let (term, screens) = terminal(60);
    let config = ScreensConfig::new().with("sm", 1).with("md", 2);

    assert_eq!(screens.resolve(&config, Some(0)), Some(0));
    term.resize(80, 24);
    assert_eq!(screens.resolve(&config, Some(0)), Some(1));
    term.resize(200, 24);
    assert_eq!(screens.resolve(&config, Some(0)), Some(2));
    assert_eq!(screens.current_with(&config, Some(0)), Some(Resolved::Name("xl".into())));
}

#[test]
fn test_nested_tuple_root_fails_construction() {
    let input = ScreensInput::from_json(json!([["sm", "640px"]]));
    assert!(Screens::new(Some(input), None).is_err());
}

#[test]
fn test_cleanup_then_setup_reads_current_size() {
    let (term, screens) = terminal(80);
    screens.cleanup();
    screens.cleanup();
    assert!(screens.matches_map().is_empty());

    term.resize(200, 24);
    assert!(screens.matches_map().is_empty());

    screens.setup().unwrap();
    assert_eq!(screens.current().as_deref(), Some("xl"));
}
