use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::color::Rgba8;
use crate::encode::format::EncodeOptions;
use crate::encode::sink::MemorySink;
use crate::foundation::error::CopsError;
use crate::ops::{Draw, ResizeOptions};

fn counting(counter: &Arc<AtomicUsize>) -> Operation {
    let counter = Arc::clone(counter);
    Draw::from_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .into()
}

#[tokio::test]
async fn first_error_stops_everything_after_it() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ops = vec![
        counting(&calls),
        Draw::from_fn(|_| Err(CopsError::draw("second stage"))).into(),
        counting(&calls),
    ];
    let mem = MemorySink::new();
    let output = Output::new(mem.clone(), EncodeOptions::default()).unwrap();

    let err = run_pipeline(Surface::new(4, 4).unwrap().into(), &ops, output)
        .await
        .unwrap_err();

    assert_eq!(err, CopsError::Draw("second stage".to_owned()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(mem.is_empty());
}

#[tokio::test]
async fn coercion_failure_runs_no_operations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let err = process(ImageSource::Bytes(b"not an image".to_vec()), &[counting(&calls)])
        .await
        .unwrap_err();
    assert!(matches!(err, CopsError::Decode(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn operations_run_in_order() {
    let ops = vec![
        Draw::from_fn(|s| {
            s.clear(Rgba8::rgb(255, 0, 0));
            Ok(())
        })
        .into(),
        Draw::from_fn(|s| s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba8::rgb(0, 255, 0))).into(),
    ];
    let out = process(Surface::new(2, 1).unwrap().into(), &ops).await.unwrap();
    assert_eq!(out.pixel(0, 0).unwrap(), [0, 255, 0, 255]);
    assert_eq!(out.pixel(1, 0).unwrap(), [255, 0, 0, 255]);
}

#[tokio::test]
async fn builder_is_reusable() {
    let pipeline = Pipeline::new().then(Operation::resize(ResizeOptions::uniform("50%")).unwrap());
    for (w, h) in [(8, 4), (20, 10)] {
        let out = pipeline.process(Surface::new(w, h).unwrap()).await.unwrap();
        assert_eq!((out.width(), out.height()), (w / 2, h / 2));
    }
    assert_eq!(pipeline.operations().len(), 1);
}

#[tokio::test]
async fn successful_run_writes_the_final_surface() {
    let mem = MemorySink::new();
    let output = Output::new(mem.clone(), EncodeOptions::png()).unwrap();
    let pipeline: Pipeline = [Operation::resize(ResizeOptions::uniform(3)).unwrap()]
        .into_iter()
        .collect();

    let out = pipeline.run(Surface::new(6, 6).unwrap(), output).await.unwrap();
    assert_eq!((out.width(), out.height()), (3, 3));

    let written = crate::assets::decode::decode_image(&mem.bytes()).unwrap();
    assert_eq!((written.width(), written.height()), (3, 3));
}
