use htmlreader::compose::{ComposeOptions, RESET_STYLES, compose, compose_with};
use htmlreader::source::SourceSet;
use proptest::prelude::*;

fn sources() -> impl Strategy<Value = SourceSet> {
    ("\\PC{0,200}", "\\PC{0,200}", "\\PC{0,200}")
        .prop_map(|(markup, styles, script)| SourceSet::new(markup, styles, script))
}

#[test]
fn test_empty_sources_still_compose_a_full_document() {
    let doc = compose(&SourceSet::default());
    let text = doc.as_str();
    assert!(text.starts_with("<!DOCTYPE html>"));
    assert!(text.contains("<meta charset=\"utf-8\">"));
    assert!(text.contains(RESET_STYLES));
    assert!(text.ends_with("</body>\n</html>\n"));
}

proptest! {
    #[test]
    fn prop_compose_is_deterministic(sources in sources()) {
        prop_assert_eq!(compose(&sources), compose(&sources.clone()));
    }

    #[test]
    fn prop_markup_is_contiguous_in_body(sources in sources()) {
        let doc = compose(&sources);
        let expected = format!("<body>\n{}\n<script>\n", sources.markup);
        prop_assert!(doc.as_str().contains(&expected));
    }

    #[test]
    fn prop_styles_follow_reset_block(sources in sources()) {
        let doc = compose(&sources);
        let expected = format!("{RESET_STYLES}\n</style>\n<style>\n{}\n</style>\n</head>", sources.styles);
        prop_assert!(doc.as_str().contains(&expected));
    }

    #[test]
    fn prop_user_script_is_last(sources in sources()) {
        let doc = compose(&sources);
        let expected = format!("<script>\n{}\n</script>\n</body>\n</html>\n", sources.script);
        prop_assert!(doc.as_str().ends_with(&expected));
    }

    #[test]
    fn prop_title_does_not_disturb_buffers(sources in sources(), title in "[A-Za-z ]{0,20}") {
        let options = ComposeOptions { title: title.clone() };
        let doc = compose_with(&sources, &options);
        let title_tag = format!("<title>{title}</title>");
        prop_assert!(doc.as_str().contains(&title_tag));
        let body = format!("<body>\n{}\n<script>\n", sources.markup);
        prop_assert!(doc.as_str().contains(&body));
    }
}
