use super::*;
use crate::assets::{CatalogEntry, Fragment, FragmentCatalog, FragmentTags};
use crate::foundation::config::DerivationConfig;

const HASH: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn svg(inner: &str) -> String {
    format!("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1080 1080\">{inner}</svg>")
}

fn catalog() -> FragmentCatalog {
    let body = FragmentTags {
        body_colored: true,
        ..FragmentTags::default()
    };
    let hair = FragmentTags {
        hair_colored: true,
        ..FragmentTags::default()
    };
    FragmentCatalog::builder()
        .face(CatalogEntry::new(
            1,
            Fragment::new(
                "face_1",
                svg(r##"<circle cx="540" cy="540" r="400" fill="#06c2b5"/>"##),
                body,
            ),
        ))
        .face(CatalogEntry::new(
            2,
            Fragment::new(
                "face_2",
                svg(r##"<rect x="140" y="140" width="800" height="800" fill="#06c2b5"/>"##),
                body,
            ),
        ))
        .hair(CatalogEntry::new(
            1,
            Fragment::new(
                "hair_1",
                svg(r##"<path d="M140 140h800v200H140z" fill="#FF0000"/>"##),
                hair,
            ),
        ))
        .eye(CatalogEntry::new(
            1,
            Fragment::new(
                "eye_1",
                svg(r#"<circle cx="440" cy="500" r="40" fill="black"/>"#),
                FragmentTags {
                    dark_colored: true,
                    ..FragmentTags::default()
                },
            ),
        ))
        .badge(
            BadgeKind::Donor,
            Fragment::new(
                "badge_donor",
                svg(r#"<circle cx="900" cy="900" r="80" fill="white"/>"#),
                FragmentTags::default(),
            ),
        )
        .build(DerivationConfig::default())
        .unwrap()
}

fn service() -> AvatarService {
    AvatarService::new(AvatarConfig::default(), Arc::new(catalog())).unwrap()
}

#[test]
fn output_format_parses_with_svg_default() {
    assert_eq!("".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
    assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
    assert!("gif".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::Svg.mime_type(), "image/svg+xml");
    assert_eq!(OutputFormat::Webp.raster(), Some(RasterFormat::Webp));
}

#[test]
fn request_validation_resolves_size() {
    let cfg = RasterConfig::default();
    let svg = AvatarRequest::default();
    assert_eq!(svg.validate(&cfg).unwrap(), None);

    let png = AvatarRequest {
        format: OutputFormat::Png,
        ..AvatarRequest::default()
    };
    assert_eq!(png.validate(&cfg).unwrap(), Some(128));

    let too_big = AvatarRequest {
        size: Some(5000),
        ..png
    };
    let err = too_big.validate(&cfg).unwrap_err();
    assert!(matches!(err, NatriconError::Validation(_)));
    assert!(err.to_string().contains("between 100 and 1000"));

    // svg ignores size entirely
    let svg_big = AvatarRequest {
        size: Some(5000),
        ..AvatarRequest::default()
    };
    assert!(svg_big.validate(&cfg).unwrap().is_none());
}

#[test]
fn vector_avatar_is_deterministic() {
    let s = service();
    let a = s
        .generate_vector_avatar(HASH, BadgeKind::None, false, None)
        .unwrap();
    let b = s
        .generate_vector_avatar(HASH, BadgeKind::None, false, None)
        .unwrap();
    assert_eq!(a, b);
    assert!(a.as_str().contains("<g id=\"face\">"));
    assert!(!a.as_str().contains("#06c2b5"));
}

#[test]
fn raster_avatar_has_requested_size() {
    let png = service()
        .generate_raster_avatar(HASH, BadgeKind::Donor, true, None, RasterFormat::Png, 100)
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (100, 100));
}

#[test]
fn generate_for_hash_honors_format() {
    let s = service();
    let svg = s.generate_for_hash(HASH, &AvatarRequest::default()).unwrap();
    assert_eq!(svg.format, OutputFormat::Svg);
    assert!(svg.bytes.starts_with(b"<svg"));

    let webp = s
        .generate_for_hash(
            HASH,
            &AvatarRequest {
                format: OutputFormat::Webp,
                ..AvatarRequest::default()
            },
        )
        .unwrap();
    assert_eq!(webp.mime_type(), "image/webp");
    assert_eq!(&webp.bytes[0..4], b"RIFF");
}

#[test]
fn account_hash_feeds_procedural_path() {
    let s = service().with_server_seed("seed");
    let request = AvatarRequest::default();
    let via_account = s.generate_for_account("key", Some(3), &request).unwrap();
    let via_hash = s
        .generate_for_hash(&account_hash("key", Some(3), "seed"), &request)
        .unwrap();
    assert_eq!(via_account, via_hash);
}

#[test]
fn vanity_selection_bypasses_derivation() {
    let mut table = VanityTable::new();
    table.insert(
        "vip",
        VanityOverride {
            badge: Some(BadgeKind::Donor),
            body_color: Some(Rgb::new(1.0, 2.0, 3.0)),
            hair_color: Some(Rgb::new(4.0, 5.0, 6.0)),
            face_id: Some(2),
            hair_id: Some(1),
            ..VanityOverride::default()
        },
    );
    let s = service().with_vanities(table);
    let out = s
        .generate_for_account("vip", None, &AvatarRequest::default())
        .unwrap();
    let svg = String::from_utf8(out.bytes).unwrap();
    assert!(svg.contains("#010203"));
    assert!(svg.contains("#040506"));
    assert!(svg.contains("<g id=\"badge\">"));
    assert!(svg.contains("<rect"));
}

#[test]
fn vanity_hash_and_fallback() {
    let s = service();
    let request = AvatarRequest::default();
    let with_hash = VanityOverride {
        hash: Some(HASH.to_owned()),
        ..VanityOverride::default()
    };
    assert_eq!(
        s.generate_for_vanity(&with_hash, "ignored", &request).unwrap(),
        s.generate_for_hash(HASH, &request).unwrap()
    );

    let empty = VanityOverride::default();
    assert_eq!(
        s.generate_for_vanity(&empty, "key", &request).unwrap(),
        s.generate_for_hash(&account_hash("key", None, ""), &request)
            .unwrap()
    );
}

#[test]
fn missing_badge_surfaces_lookup_error() {
    let err = service()
        .generate_vector_avatar(HASH, BadgeKind::Node, false, None)
        .unwrap_err();
    assert!(matches!(err, NatriconError::AssetLookup(_)));
}

#[test]
fn describe_reports_derived_colors() {
    let s = service();
    let report = s.describe(HASH).unwrap();
    let palette = crate::color::ColorDeriver::default().palette(HASH).unwrap();
    assert_eq!(report.body_color, palette.body.to_html(false));
    assert_eq!(report.hair_color, palette.hair.to_html(false));
    assert!((18.0..=95.0).contains(&report.body_perceived_brightness));
    assert_eq!(
        report.delta_hsb.v,
        ((palette.hair.to_hsb().b - palette.body.to_hsb().b) * 100.0) as i16
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["hash"], HASH);
}

#[test]
fn compose_config_drives_minifier() {
    let face = Fragment::new(
        "face_commented",
        svg(r##"<!-- body --><circle cx="540" cy="540" r="400" fill="#06c2b5" fill-opacity="0.50"/>"##),
        FragmentTags::default(),
    );
    let catalog = FragmentCatalog::builder()
        .face(CatalogEntry::new(1, face))
        .build(DerivationConfig::default())
        .unwrap();
    let render = |config: AvatarConfig| {
        AvatarService::new(config, Arc::new(catalog.clone()))
            .unwrap()
            .generate_vector_avatar(HASH, BadgeKind::None, false, None)
            .unwrap()
    };

    let plain = render(AvatarConfig::default());
    assert!(!plain.as_str().contains("<!--"));
    assert!(plain.as_str().contains("fill-opacity=\".5\""));

    let mut config = AvatarConfig::default();
    config.compose.minify.keep_comments = true;
    config.compose.minify.shorten_numbers = false;
    let kept = render(config);
    assert!(kept.as_str().contains("<!-- body -->"));
    assert!(kept.as_str().contains("fill-opacity=\"0.50\""));
}
