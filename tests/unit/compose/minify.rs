use super::*;

fn minify(s: &str) -> String {
    Minifier::default().minify(s)
}

#[test]
fn drops_declarations_comments_and_blank_text() {
    let src = "<?xml version=\"1.0\"?>\n<!-- generated -->\n<svg a=\"1\">\n  <g>\n  </g>\n</svg>\n";
    assert_eq!(minify(src), r#"<svg a="1"><g></g></svg>"#);
}

#[test]
fn compacts_whitespace_inside_tags() {
    let src = "<path  d = \"M0 0 L10 10\"\n   fill-opacity = \"0.237500\" />";
    assert_eq!(minify(src), r#"<path d="M0 0 L10 10" fill-opacity=".2375"/>"#);
    assert_eq!(minify("</g >"), "</g>");
}

#[test]
fn collapses_text_runs() {
    assert_eq!(
        minify("<text>  hello \n\t world </text>"),
        "<text> hello world </text>"
    );
}

#[test]
fn keeps_cdata_and_quoted_values() {
    let src = "<style><![CDATA[ .a  {  fill: red; } ]]></style><g data-x=\"a > b\"  >";
    assert_eq!(
        minify(src),
        "<style><![CDATA[ .a  {  fill: red; } ]]></style><g data-x=\"a > b\">"
    );
}

#[test]
fn only_numeric_presentation_attrs_are_shortened() {
    assert_eq!(
        minify(r#"<g id="1.50" opacity="1.000" width="100.0"/>"#),
        r#"<g id="1.50" opacity="1" width="100"/>"#
    );
    let opts = MinifyOptions {
        shorten_numbers: false,
        ..MinifyOptions::default()
    };
    assert_eq!(
        Minifier::new(opts).minify(r#"<g opacity="1.000"/>"#),
        r#"<g opacity="1.000"/>"#
    );
}

#[test]
fn comments_can_be_kept() {
    let m = Minifier::new(MinifyOptions {
        keep_comments: true,
        ..MinifyOptions::default()
    });
    assert_eq!(m.minify("<g><!-- x --></g>"), "<g><!-- x --></g>");
    assert!(m.options().keep_comments);
}

#[test]
fn shorten_number_forms() {
    assert_eq!(shorten_number("0.237500").as_deref(), Some(".2375"));
    assert_eq!(shorten_number("1.000").as_deref(), Some("1"));
    assert_eq!(shorten_number("0.0").as_deref(), Some("0"));
    assert_eq!(shorten_number("-0.50").as_deref(), Some("-.5"));
    assert_eq!(shorten_number("007.5").as_deref(), Some("7.5"));
    assert_eq!(shorten_number("12"), None);
    assert_eq!(shorten_number(".5"), None);
    assert_eq!(shorten_number("1e5"), None);
    assert_eq!(shorten_number("red"), None);
}

#[test]
fn minify_is_idempotent() {
    let src = "<svg viewBox=\"0 0 10 10\">\n <g id=\"face\">\n  <path fill-opacity=\"0.400000\" d=\"M0 0h1\"/>\n </g>\n</svg>\n";
    let once = minify(src);
    assert_eq!(minify(&once), once);
}
