use appctl::tokens::{substitute_content, substitute_file_name, TokenContext};
use std::cell::Cell;
use std::rc::Rc;

fn context() -> TokenContext {
    TokenContext::new()
        .with_value("APP_NAME", "demo")
        .with_value("APP_DISPLAY_NAME", "Demo")
}

#[test]
fn test_content_without_tokens_is_unchanged() {
    let context = context();
    for text in ["", "plain", "module.exports = {};", "<<APP_NAME>>", "<<<lower>>>", "__APP_NAME__"] {
        assert_eq!(substitute_content(text, &context), text);
    }
}

#[test]
fn test_content_known_and_unknown_tokens() {
    let context = context();
    assert_eq!(
        substitute_content(r#"module.exports = { name: "<<<APP_NAME>>>" };"#, &context),
        r#"module.exports = { name: "demo" };"#
    );
    assert_eq!(substitute_content("a<<<MISSING>>>b", &context), "ab");
    assert_eq!(
        substitute_content("<<<APP_DISPLAY_NAME>>> (<<<APP_NAME>>>)", &context),
        "Demo (demo)"
    );
}

#[test]
fn test_file_name_known_and_unknown_tokens() {
    let context = context();
    assert_eq!(substitute_file_name("__APP_NAME__.config.js", &context), "demo.config.js");
    assert_eq!(substitute_file_name("__MISSING__.txt", &context), "MISSING.txt");
    assert_eq!(substitute_file_name("index.js", &context), "index.js");
}

#[test]
fn test_file_name_cleanup_removes_markers() {
    let context = context();
    assert_eq!(substitute_file_name("config__.json", &context), "config.json");
    assert_eq!(substitute_file_name("__init__.py", &context), "init.py");
}

#[test]
fn test_file_name_grammar_ignores_content_tokens() {
    let context = context();
    assert_eq!(substitute_file_name("<<<APP_NAME>>>.txt", &context), "<<<APP_NAME>>>.txt");
    assert_eq!(substitute_content("__APP_NAME__", &context), "__APP_NAME__");
}

#[test]
fn test_output_is_not_rescanned() {
    let context = TokenContext::new()
        .with_value("OUTER", "<<<INNER>>>")
        .with_value("INNER", "expanded");
    assert_eq!(substitute_content("<<<OUTER>>>", &context), "<<<INNER>>>");
}

#[test]
fn test_producer_called_per_occurrence() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let context = TokenContext::new().with("COUNT", move || {
        counter.set(counter.get() + 1);
        counter.get().to_string()
    });

    assert_eq!(substitute_content("<<<COUNT>>>-<<<COUNT>>>", &context), "1-2");
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_file_name_boundaries_are_ascii() {
    let context = context();
    assert_eq!(substitute_file_name("é__APP_NAME__.txt", &context), "édemo.txt");
    assert_eq!(substitute_file_name("x__APP_NAME__.txt", &context), "xAPP_NAME.txt");
}
