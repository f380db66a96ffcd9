use super::*;
use crate::assets::decode::decode_image;
use crate::encode::format::encode_surface;

fn recipe(json: &str) -> Recipe {
    Recipe::from_reader(json.as_bytes(), "/recipes").unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cops_recipe_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn builds_every_operation_kind() {
    let r = recipe(
        r##"{
            "input": "in.png",
            "output": "out.jpg",
            "operations": [
                { "op": "resize", "size": "50%", "letterbox": "#fff", "preserveAspectRatio": "north" },
                { "op": "compose", "image": "logo.png", "gravity": "southeast" },
                { "op": "entitle", "text": "hi", "position": { "left": 10, "bottom": "10%" } }
            ]
        }"##,
    );
    let ops = r.operations().unwrap();
    let names: Vec<_> = ops.iter().map(Operation::name).collect();
    assert_eq!(names, ["resize", "compose", "entitle"]);

    let Operation::Resize(resize) = &ops[0] else {
        panic!("expected resize");
    };
    assert_eq!(resize.options().letterbox, Some(Rgba8::WHITE));
    assert_eq!(resize.options().preserve_aspect_ratio, Some(Gravity::North));
    assert_eq!(r.output().unwrap().format(), ImageFormat::Jpeg);
}

#[test]
fn relative_paths_resolve_against_the_recipe_directory() {
    let r = recipe(r#"{ "input": "in/photo.png" }"#);
    match r.source() {
        ImageSource::Path(p) => assert_eq!(p, Path::new("/recipes/in/photo.png")),
        other => panic!("unexpected source {other:?}"),
    }
    let r = recipe(r#"{ "input": "/abs/photo.png" }"#);
    match r.source() {
        ImageSource::Path(p) => assert_eq!(p, Path::new("/abs/photo.png")),
        other => panic!("unexpected source {other:?}"),
    }
}

#[test]
fn typed_value_errors_are_preserved() {
    let err = recipe(r#"{ "input": "a.png", "operations": [ { "op": "resize", "size": true } ] }"#)
        .operations()
        .unwrap_err();
    assert_eq!(err, CopsError::UnsupportedUnitType("boolean".to_owned()));

    let err = recipe(r#"{ "input": "a.png", "operations": [ { "op": "compose", "image": 7 } ] }"#)
        .operations()
        .unwrap_err();
    assert!(matches!(err, CopsError::UnsupportedSourceType(_)));

    let err = recipe(r#"{ "input": "a.png", "operations": [ { "op": "compose" } ] }"#)
        .operations()
        .unwrap_err();
    assert_eq!(err, CopsError::MissingImageOption);

    let err = recipe(
        r#"{ "input": "a.png", "operations": [ { "op": "entitle", "text": "x", "position": { "x": 1, "left": 2 } } ] }"#,
    )
    .operations()
    .unwrap_err();
    assert!(matches!(err, CopsError::InvalidPositionSpec(_)));

    let err = recipe(r#"{ "input": "a.png", "operations": [ { "op": "compose", "image": "a.png", "gravity": "up" } ] }"#)
        .operations()
        .unwrap_err();
    assert_eq!(err, CopsError::InvalidGravity("up".to_owned()));
}

#[test]
fn resize_needs_a_size() {
    let err = recipe(r#"{ "input": "a.png", "operations": [ { "op": "resize", "width": 10 } ] }"#)
        .operations()
        .unwrap_err();
    assert!(matches!(err, CopsError::InvalidOption(_)));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = Recipe::from_reader("{ \"operations\": [".as_bytes(), ".").unwrap_err();
    assert!(matches!(err, CopsError::Config(_)));
    let err = Recipe::from_reader(r#"{ "input": "a", "operations": [ { "op": "crop" } ] }"#.as_bytes(), ".")
        .unwrap_err();
    assert!(matches!(err, CopsError::Config(_)));
}

#[test]
fn unknown_output_format_is_rejected() {
    let err = recipe(r#"{ "input": "a.png", "output": "b.png", "format": "webp" }"#)
        .output()
        .unwrap_err();
    assert_eq!(err, CopsError::UnsupportedFormat("webp".to_owned()));
}

#[tokio::test]
async fn runs_from_disk() {
    let dir = scratch_dir("run");
    let mut src = Surface::new(40, 20).unwrap();
    src.clear(Rgba8::rgb(10, 20, 30));
    let png = encode_surface(&src, ImageFormat::Png, &EncodeOptions::png()).unwrap();
    std::fs::write(dir.join("in.png"), png).unwrap();
    std::fs::write(
        dir.join("recipe.json"),
        r#"{ "input": "in.png", "output": "out.png", "operations": [ { "op": "resize", "size": "50%" } ] }"#,
    )
    .unwrap();

    let r = Recipe::from_path(dir.join("recipe.json")).unwrap();
    let out = r.run().await.unwrap();
    assert_eq!((out.width(), out.height()), (20, 10));

    let written = decode_image(&std::fs::read(dir.join("out.png")).unwrap()).unwrap();
    assert_eq!((written.width(), written.height()), (20, 10));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn font_files_are_read_when_the_recipe_loads() {
    let err = Recipe::from_reader(
        r#"{ "input": "a.png", "operations": [ { "op": "entitle", "text": "x", "font_file": "missing.ttf" } ] }"#
            .as_bytes(),
        "/nonexistent/cops",
    )
    .unwrap_err();
    assert!(matches!(err, CopsError::Read(_)));

    let dir = scratch_dir("font");
    std::fs::write(dir.join("broken.ttf"), [0u8; 16]).unwrap();
    let r = Recipe::from_reader(
        r#"{ "input": "a.png", "operations": [ { "op": "entitle", "text": "x", "font_file": "broken.ttf" } ] }"#
            .as_bytes(),
        &dir,
    )
    .unwrap();
    std::fs::remove_dir_all(&dir).ok();

    // The bytes were captured at load time and reach the text engine, which rejects them.
    let err = r.operations().unwrap_err();
    assert!(matches!(err, CopsError::InvalidOption(_)));
}
