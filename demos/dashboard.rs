//! Inline build dashboard.
//!
//! Steps run one after another on a live status line; each finished step is
//! finalized and left behind in the scrollback. Press `q` (or Ctrl-C) to
//! stop early.
//!
//! Run with: cargo run --example dashboard

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use spark_inline::components::{container, format_elapsed, input, spinner, stopwatch};
use spark_inline::{
    ComponentRef, DEFAULT_REFRESH_RATE, Document, Edges, InputEvent, TerminalRenderer, finalize,
    text,
};

const STEPS: &[(&str, u64)] = &[
    ("resolve dependencies", 800),
    ("compile crates", 1600),
    ("link binary", 600),
    ("run tests", 1200),
];

fn running(label: &str, started: Instant) -> ComponentRef {
    Arc::new(
        container([
            Arc::new(spinner()) as ComponentRef,
            Arc::new(container([Arc::new(text(label)) as ComponentRef]).margin(Edges::LEFT, 1)),
            Arc::new(
                container([Arc::new(stopwatch(started)) as ComponentRef]).margin(Edges::LEFT, 1),
            ),
        ])
        .row(),
    )
}

fn finished(label: &str, took: Duration) -> ComponentRef {
    finalize(Arc::new(text(format!("✓ {label} ({})", format_elapsed(took)))))
}

fn main() {
    let doc = Document::new();
    doc.set_renderer(TerminalRenderer::stdout());

    let (quit, quit_requested) = mpsc::channel();
    let listener: ComponentRef = Arc::new(input(move |event| {
        if let InputEvent::Data(bytes) = event {
            if bytes.iter().any(|&b| b == b'q' || b == 0x03) {
                let _ = quit.send(());
            }
        }
    }));

    let overall = Instant::now();
    let mut stopped = false;

    for (label, millis) in STEPS {
        let started = Instant::now();
        doc.set([running(label, started), listener.clone()]);

        while started.elapsed() < Duration::from_millis(*millis) {
            doc.render_frame();
            if quit_requested.try_recv().is_ok() {
                stopped = true;
                break;
            }
            thread::sleep(DEFAULT_REFRESH_RATE);
        }
        if stopped {
            break;
        }

        // The previous frame pruned everything finalized, so only the live
        // line is replaced here.
        doc.set([finished(label, started.elapsed()), listener.clone()]);
        doc.render_frame();
    }

    let summary = if stopped { "stopped" } else { "done" };
    doc.set([Arc::new(text(format!("{summary} in {}", format_elapsed(overall.elapsed())))) as ComponentRef]);
    doc.close();
}
