use super::*;
use crate::assets::color::Rgba8;
use crate::encode::format::{EncodeOptions, ImageFormat, encode_surface};
use crate::foundation::position::Offset;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

const RED: Rgba8 = Rgba8::rgb(255, 0, 0);
const BLUE: Rgba8 = Rgba8::rgb(0, 0, 255);

fn solid(width: u32, height: u32, color: Rgba8) -> Surface {
    let mut s = Surface::new(width, height).unwrap();
    s.clear(color);
    s
}

fn red_png(width: u32, height: u32) -> Vec<u8> {
    encode_surface(&solid(width, height, RED), ImageFormat::Png, &EncodeOptions::png()).unwrap()
}

/// Counts how many times the wrapped stream was read to its end.
struct CountingReader {
    inner: tokio::io::DuplexStream,
    drained: Arc<AtomicUsize>,
}

impl AsyncRead for CountingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let wants = buf.remaining() > 0;
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) && wants && buf.filled().len() == before {
            self.drained.fetch_add(1, Ordering::SeqCst);
        }
        poll
    }
}

#[test]
fn missing_image_fails_at_construction() {
    let err = Compose::new(ComposeOptions::default()).unwrap_err();
    assert_eq!(err, CopsError::MissingImageOption);
}

#[tokio::test]
async fn default_placement_centers_the_overlay() {
    let compose = Compose::new(ComposeOptions::new(solid(2, 2, RED))).unwrap();
    let out = compose.apply(solid(6, 6, BLUE)).await.unwrap();

    assert_eq!(out.pixel(1, 1).unwrap(), BLUE.to_array());
    assert_eq!(out.pixel(2, 2).unwrap(), RED.to_array());
    assert_eq!(out.pixel(3, 3).unwrap(), RED.to_array());
    assert_eq!(out.pixel(4, 4).unwrap(), BLUE.to_array());
}

#[tokio::test]
async fn gravity_accounts_for_overlay_size() {
    let opts = ComposeOptions::new(solid(2, 2, RED)).with_gravity(Gravity::SouthEast);
    let out = Compose::new(opts).unwrap().apply(solid(6, 6, BLUE)).await.unwrap();

    assert_eq!(out.pixel(5, 5).unwrap(), RED.to_array());
    assert_eq!(out.pixel(4, 4).unwrap(), RED.to_array());
    assert_eq!(out.pixel(3, 3).unwrap(), BLUE.to_array());
}

#[tokio::test]
async fn position_wins_over_gravity_and_may_overflow() {
    let opts = ComposeOptions::new(solid(3, 3, RED))
        .with_gravity(Gravity::NorthWest)
        .with_position(Offset::xy(4, "-1px").into());
    let out = Compose::new(opts).unwrap().apply(solid(6, 6, BLUE)).await.unwrap();

    assert_eq!(out.pixel(0, 0).unwrap(), BLUE.to_array());
    assert_eq!(out.pixel(4, 0).unwrap(), RED.to_array());
    assert_eq!(out.pixel(5, 1).unwrap(), RED.to_array());
    assert_eq!(out.pixel(5, 2).unwrap(), BLUE.to_array());
}

#[tokio::test]
async fn overlay_is_resolved_from_bytes() {
    let compose = Compose::new(ComposeOptions::new(red_png(2, 2))).unwrap();
    let overlay = compose.overlay().await.unwrap();
    assert_eq!((overlay.width(), overlay.height()), (2, 2));
}

#[tokio::test]
async fn concurrent_applies_share_one_resolution() {
    let (reader, mut writer) = tokio::io::duplex(64);
    let drained = Arc::new(AtomicUsize::new(0));
    let reader = CountingReader {
        inner: reader,
        drained: drained.clone(),
    };
    let compose = Compose::new(ComposeOptions::new(ImageSource::stream(reader))).unwrap();
    let shared = compose.clone();

    let feed = async move {
        tokio::io::AsyncWriteExt::write_all(&mut writer, &red_png(2, 2))
            .await
            .unwrap();
    };
    let (a, b, c, ()) = tokio::join!(
        compose.overlay(),
        compose.apply(solid(4, 4, BLUE)),
        shared.overlay(),
        feed
    );

    let (a, c) = (a.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &c));
    assert_eq!(b.unwrap().pixel(1, 1).unwrap(), RED.to_array());
    assert!(Arc::ptr_eq(&a, &compose.overlay().await.unwrap()));
    compose.apply(solid(4, 4, BLUE)).await.unwrap();
    assert_eq!(drained.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failures_are_cached() {
    let compose = Compose::new(ComposeOptions::new("/nonexistent/cops/overlay.png")).unwrap();
    let first = compose.apply(solid(2, 2, BLUE)).await.unwrap_err();
    let second = compose.apply(solid(2, 2, BLUE)).await.unwrap_err();
    assert!(matches!(first, CopsError::Read(_)));
    assert_eq!(first, second);
}
