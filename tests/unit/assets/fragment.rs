use super::*;

#[test]
fn valid_fragment_exposes_template() {
    let f = Fragment::new(
        "hair_1",
        r##"<svg><path fill="#FF0000"/></svg>"##,
        FragmentTags {
            hair_colored: true,
            ..FragmentTags::default()
        },
    );
    assert_eq!(f.name(), "hair_1");
    assert!(f.tags().hair_colored);
    assert_eq!(f.template().unwrap().inner(), r##"<path fill="#FF0000"/>"##);
    f.validate(Layer::Hair).unwrap();
}

#[test]
fn broken_fragment_reports_layer_and_name() {
    let f = Fragment::new("mouth_7", "<svg><path></svg>", FragmentTags::default());
    assert!(f.template().is_err());
    let err = f.validate(Layer::Mouth).unwrap_err();
    let NatriconError::FragmentParse { layer, message } = err else {
        panic!("expected fragment parse error");
    };
    assert_eq!(layer, Layer::Mouth);
    assert!(message.starts_with("mouth_7: "));
}

#[test]
fn clones_share_parsed_template() {
    let f = Fragment::new("eye", "<svg><g/></svg>", FragmentTags::default());
    let g = f.clone();
    assert!(std::ptr::eq(f.template().unwrap(), g.template().unwrap()));
    assert_eq!(f.markup(), g.markup());
}

#[test]
fn tags_deserialize_with_defaults() {
    let tags: FragmentTags =
        serde_json::from_value(serde_json::json!({"dark_colored": true})).unwrap();
    assert!(tags.dark_colored);
    assert!(!tags.body_colored);
    assert!(serde_json::from_value::<FragmentTags>(serde_json::json!({"shiny": true})).is_err());
}
