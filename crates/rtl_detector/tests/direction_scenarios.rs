//! Scenarios for a single read-classify-apply pass over an in-memory page.

mod common;

use common::{Page, RTL_URL, init_logging, insert_widget};
use dom::NodeKey;
use rtl_detector::{DetectorConfig, Direction, DirectionError, apply_text_direction, update_text_direction};

fn update(page: &mut Page) -> Result<Direction, DirectionError> {
    update_text_direction(&mut page.dom, &DetectorConfig::default())
}

#[test]
fn persian_root_lang_switches_to_rtl() {
    init_logging();
    let mut page = Page::ready(Some("fa"));
    assert_eq!(update(&mut page), Ok(Direction::Rtl));
    assert_eq!(page.dir(), Some("rtl"));
    assert_eq!(page.href(), Some(RTL_URL));
    assert!(page.body_has("is-rtl"));
    assert!(!page.body_has("is-ltr"));
}

#[test]
fn english_root_lang_stays_ltr() {
    let mut page = Page::ready(Some("en"));
    assert_eq!(update(&mut page), Ok(Direction::Ltr));
    assert_eq!(page.dir(), Some("ltr"));
    assert_eq!(page.href(), Some(""));
    assert!(page.body_has("is-ltr"));
    assert!(!page.body_has("is-rtl"));
}

#[test]
fn widget_selection_beats_root_lang() {
    let mut page = Page::ready(Some("en"));
    let body = page.body;
    insert_widget(&mut page.dom, body, "he-IL");
    assert_eq!(update(&mut page), Ok(Direction::Rtl));
    assert_eq!(page.dir(), Some("rtl"));
}

#[test]
fn widget_without_selection_defers_to_root_lang() {
    let mut page = Page::ready(Some("ur"));
    let body = page.body;
    insert_widget(&mut page.dom, body, "");
    assert_eq!(update(&mut page), Ok(Direction::Rtl));
}

#[test]
fn no_language_anywhere_defaults_to_english() {
    let mut page = Page::ready(None);
    assert_eq!(update(&mut page), Ok(Direction::Ltr));
    assert_eq!(page.dir(), Some("ltr"));
    assert!(page.body_has("is-ltr"));
}

#[test]
fn lang_change_flips_back_and_forth() {
    let mut page = Page::ready(Some("ar"));
    update(&mut page).unwrap();
    let html = page.html;
    page.dom.set_attribute(html, "lang", "en").unwrap();
    update(&mut page).unwrap();
    assert_eq!(page.dir(), Some("ltr"));
    assert_eq!(page.href(), Some(""));
    assert!(page.body_has("is-ltr"));
    assert!(!page.body_has("is-rtl"));
}

#[test]
fn applying_twice_matches_applying_once() {
    let config = DetectorConfig::default();
    for direction in [Direction::Rtl, Direction::Ltr] {
        let mut once = Page::ready(None);
        apply_text_direction(&mut once.dom, direction, &config).unwrap();

        let mut twice = Page::ready(None);
        apply_text_direction(&mut twice.dom, direction, &config).unwrap();
        apply_text_direction(&mut twice.dom, direction, &config).unwrap();

        assert_eq!(once.dir(), twice.dir());
        assert_eq!(once.href(), twice.href());
        assert_eq!(
            once.dom.index().attribute(once.body, "class"),
            twice.dom.index().attribute(twice.body, "class")
        );
    }
}

#[test]
fn existing_body_classes_are_kept() {
    let mut page = Page::ready(Some("ps"));
    let body = page.body;
    page.dom.set_attribute(body, "class", "layout is-ltr").unwrap();
    update(&mut page).unwrap();
    assert_eq!(page.dom.index().attribute(body, "class"), Some("layout is-rtl"));
}

#[test]
fn missing_stylesheet_link_is_reported_after_other_writes() {
    let mut page = Page::ready(Some("ar"));
    let link = page.link;
    page.dom.remove_attribute(link, "id").unwrap();

    let result = update(&mut page);
    assert!(
        matches!(result, Err(DirectionError::MissingElement(hook, ref detail)) if hook == "stylesheet link" && detail == "#bootstrap-rtl"),
        "unexpected result: {result:?}"
    );
    assert_eq!(page.dir(), Some("rtl"));
    assert!(page.body_has("is-rtl"));
}

#[test]
fn missing_body_is_reported() {
    let mut dom = dom::Dom::new();
    let html = dom.create_element(NodeKey::ROOT, "html").unwrap();
    dom.set_attribute(html, "lang", "he").unwrap();
    let link = dom.create_element(html, "link").unwrap();
    dom.set_attribute(link, "id", "bootstrap-rtl").unwrap();

    let result = update_text_direction(&mut dom, &DetectorConfig::default());
    assert!(matches!(result, Err(DirectionError::MissingElement("body", _))));
    assert_eq!(dom.index().attribute(html, "dir"), Some("rtl"));
    assert_eq!(dom.index().attribute(link, "href"), Some(RTL_URL));
}

#[test]
fn custom_hooks_are_honoured() {
    let config = DetectorConfig::from_json(
        r#"{"rtl_class": "rtl", "ltr_class": "ltr", "default_language": "ar"}"#,
    )
    .unwrap();
    let mut page = Page::ready(None);
    assert_eq!(update_text_direction(&mut page.dom, &config), Ok(Direction::Rtl));
    assert!(page.body_has("rtl"));
    assert!(!page.body_has("is-rtl"));
}
