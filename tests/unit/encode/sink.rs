use super::*;
use crate::assets::decode::decode_image;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cops_sink_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn format_comes_from_option_then_extension_then_png() {
    let out = Output::new("a.jpeg", EncodeOptions::default()).unwrap();
    assert_eq!(out.format(), ImageFormat::Jpeg);

    let out = Output::new("a.jpeg", EncodeOptions::png()).unwrap();
    assert_eq!(out.format(), ImageFormat::Png);

    let out = Output::new("no_extension", EncodeOptions::default()).unwrap();
    assert_eq!(out.format(), ImageFormat::Png);

    let out = Output::new(MemorySink::new(), EncodeOptions::default()).unwrap();
    assert_eq!(out.format(), ImageFormat::Png);
}

#[test]
fn unknown_extension_is_rejected_up_front() {
    let err = Output::new("a.gif", EncodeOptions::default()).unwrap_err();
    assert_eq!(err, CopsError::UnsupportedFormat("gif".to_owned()));
}

#[test]
fn directories_are_not_writable_destinations() {
    let dir = scratch_dir("dir");
    let err = Output::new(dir.as_path(), EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, CopsError::NonStreamSink(_)));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn memory_sink_receives_encoded_png() {
    let mem = MemorySink::new();
    let out = Output::new(mem.clone(), EncodeOptions::default()).unwrap();
    let surface = Surface::new(4, 3).unwrap();
    out.write(&surface).await.unwrap();

    let img = decode_image(&mem.bytes()).unwrap();
    assert_eq!((img.width(), img.height()), (4, 3));
}

#[tokio::test]
async fn file_sink_writes_inferred_format() {
    let dir = scratch_dir("file");
    let path = dir.join("out.jpg");
    let out = Output::new(path.as_path(), EncodeOptions::default()).unwrap();
    out.write(&Surface::new(2, 2).unwrap()).await.unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn stream_sink_gets_all_bytes() {
    let (writer, mut reader) = tokio::io::duplex(1 << 20);
    let out = Output::new(Sink::stream(writer), EncodeOptions::png()).unwrap();
    out.write(&Surface::new(5, 5).unwrap()).await.unwrap();

    let mut bytes = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut bytes)
        .await
        .unwrap();
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (5, 5));
}
