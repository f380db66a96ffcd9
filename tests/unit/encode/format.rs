use super::*;
use crate::assets::decode::decode_image;

#[test]
fn names_and_extensions() {
    assert_eq!(ImageFormat::from_name("PNG").unwrap(), ImageFormat::Png);
    assert_eq!(ImageFormat::from_name("jpg").unwrap(), ImageFormat::Jpeg);
    assert_eq!(ImageFormat::from_name("jpeg").unwrap(), ImageFormat::Jpeg);
    assert_eq!(
        ImageFormat::from_name("gif").unwrap_err(),
        CopsError::UnsupportedFormat("gif".to_owned())
    );

    assert_eq!(
        ImageFormat::from_path(Path::new("out/small.JPG")).unwrap(),
        Some(ImageFormat::Jpeg)
    );
    assert_eq!(ImageFormat::from_path(Path::new("out/noext")).unwrap(), None);
    assert!(ImageFormat::from_path(Path::new("a.webp")).is_err());
}

#[test]
fn png_keeps_size_and_alpha() {
    let mut s = Surface::new(3, 2).unwrap();
    s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba8::rgb(255, 0, 0)).unwrap();
    let bytes = encode_surface(&s, ImageFormat::Png, &EncodeOptions::default()).unwrap();
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
    assert_eq!(&img.rgba8_premul()[0..4], &[255, 0, 0, 255]);
    assert_eq!(&img.rgba8_premul()[4..8], &[0, 0, 0, 0]);
}

#[test]
fn jpeg_flattens_over_background() {
    let s = Surface::new(8, 8).unwrap();
    let opts = EncodeOptions {
        background: Some(Rgba8::WHITE),
        ..EncodeOptions::jpeg(90)
    };
    let bytes = encode_surface(&s, ImageFormat::Jpeg, &opts).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (8, 8));
    let px = &img.rgba8_premul()[0..4];
    assert!(px[0] > 250 && px[1] > 250 && px[2] > 250 && px[3] == 255, "{px:?}");
}
