use super::*;

#[test]
fn parses_canvas_font_shorthand() {
    let f: FontSpec = "50px Helvetica".parse().unwrap();
    assert_eq!(f.size_px, 50.0);
    assert_eq!(f.family, "Helvetica");
    assert_eq!(f.weight, None);
    assert!(!f.italic);

    let f: FontSpec = "italic bold 12pt 'Open Sans', serif".parse().unwrap();
    assert_eq!(f.size_px, 16.0);
    assert_eq!(f.family, "'Open Sans', serif");
    assert_eq!(f.weight, Some(700.0));
    assert!(f.italic);

    let f: FontSpec = "600 20px/1.5".parse().unwrap();
    assert_eq!(f.size_px, 20.0);
    assert_eq!(f.weight, Some(600.0));
    assert_eq!(f.family, DEFAULT_FONT_FAMILY);
}

#[test]
fn font_without_size_is_rejected() {
    for bad in ["Helvetica", "bold", "", "0px Arial", "-4px Arial"] {
        assert!(
            matches!(bad.parse::<FontSpec>(), Err(CopsError::InvalidOption(_))),
            "{bad:?}"
        );
    }
}

#[test]
fn align_keywords() {
    assert_eq!("start".parse::<TextAlign>().unwrap(), TextAlign::Left);
    assert_eq!("CENTER".parse::<TextAlign>().unwrap(), TextAlign::Center);
    assert_eq!("end".parse::<TextAlign>().unwrap(), TextAlign::Right);
    assert!("justify".parse::<TextAlign>().is_err());
}
