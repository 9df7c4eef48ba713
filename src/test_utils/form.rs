//! Assertions about the HTMX forms on the ledger and log-in pages.

use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Assert that HTMX submits `form` as a POST to `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_post(form: &ElementRef<'_>, endpoint: &str) {
    assert_eq!(
        form.value().attr("hx-post"),
        Some(endpoint),
        "want form to be posted to {endpoint}"
    );
}

/// The input in `form` named `name`.
#[track_caller]
pub(crate) fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

/// Assert that the input `name` has type `type_` and must be filled in.
#[track_caller]
pub(crate) fn assert_required_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);

    assert_eq!(input.value().attr("type"), Some(type_), "type of {name}");
    assert!(
        input.value().attr("required").is_some(),
        "want input {name} to be required"
    );
}

/// Assert that the input `name` has type `type_` and may be left blank.
#[track_caller]
pub(crate) fn assert_optional_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);

    assert_eq!(input.value().attr("type"), Some(type_), "type of {name}");
    assert!(
        input.value().attr("required").is_none(),
        "want input {name} to be optional"
    );
}

/// Assert that the form has a submit button labelled `text`.
///
/// The label is compared after trimming, since buttons also hold a loading spinner.
#[track_caller]
pub(crate) fn assert_submit_button(form: &ElementRef<'_>, text: &str) {
    let button = form
        .select(&Selector::parse("button[type=submit]").unwrap())
        .next()
        .expect("No submit button found");

    let label = button.text().collect::<String>();
    assert_eq!(label.trim(), text);
}

/// Assert that the form shows `want_message` below its inputs.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_message: &str) {
    let message = form
        .select(&Selector::parse("p").unwrap())
        .next()
        .expect("No error message found")
        .text()
        .collect::<String>();

    assert_eq!(message.trim(), want_message);
}
