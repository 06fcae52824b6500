use std::fs;

use cascade::{AttributeSpec, StyleContext};
use elements::log_init::init_logger;
use elements::{Document, ElementError};
use log::LevelFilter;

// A process has one global logger, so everything lives in a single test.
#[test]
fn test_file_logger_records_tree_changes() {
    let path = std::env::temp_dir().join(format!("stylecast-{}.log", std::process::id()));
    let _ = fs::remove_file(&path);
    let path_str = path.to_string_lossy().to_string();

    init_logger(&path_str, LevelFilter::Debug).unwrap();
    assert!(matches!(
        init_logger(&path_str, LevelFilter::Trace),
        Err(ElementError::Logger(_))
    ));

    let mut cx = StyleContext::new();
    cx.register_attribute(AttributeSpec::new("paint", "opacity", 1.0_f64))
        .unwrap();
    cx.register_type("Panel", None).unwrap();
    let document = Document::new(cx);
    let parent = document.create_named("Panel").unwrap();
    let child = document.create_named("Panel").unwrap();
    parent.append_child(&child).unwrap();
    log::logger().flush();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[DEBUG]"));
    assert!(contents.contains("attached Panel under Panel"));
    assert!(!contents.contains("[TRACE]"));

    let _ = fs::remove_file(&path);
}
