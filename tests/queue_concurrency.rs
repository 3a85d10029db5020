use std::sync::Arc;
use std::thread;

use gdi_drawer::drawer::{BoxStyle, Canvas, RgbaBuffer, Color};

#[test]
fn concurrent_appends_are_all_kept() {
    let canvas = Arc::new(Canvas::new(100, 100).unwrap());
    let workers: Vec<_> = (0..2)
        .map(|worker| {
            let canvas = Arc::clone(&canvas);
            thread::spawn(move || {
                for i in 0..1000 {
                    canvas
                        .add_rectangle(worker * 10, i % 90, 5, 5, BoxStyle::default())
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(canvas.shape_count(), 2000);
}

#[test]
fn rendering_while_appending_never_loses_shapes() {
    let canvas = Arc::new(Canvas::new(64, 64).unwrap());
    let producer = {
        let canvas = Arc::clone(&canvas);
        thread::spawn(move || {
            for i in 0..500 {
                canvas
                    .add_ellipse(i % 60, i % 60, 3, 3, BoxStyle::filled(Color::RED))
                    .unwrap();
            }
        })
    };
    let mut frame = RgbaBuffer::new(64, 64, Color::BLACK);
    for _ in 0..20 {
        canvas.render_frame(&mut frame).unwrap();
    }
    producer.join().unwrap();
    assert_eq!(canvas.render_frame(&mut frame).unwrap(), 500);
}
