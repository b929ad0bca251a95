//! The scripted session the demo binary plays back.

use std::sync::Arc;

use parking_lot::Mutex;
use parley_modal::{ContentRef, ModalContext, ModalEvent, ModalRenderer, Props};
use serde_json::json;

use crate::console::ConsoleRenderer;
use crate::dialog::{Dialog, Document};

/// What happened during a session, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// One entry per step: the step name followed by the rendered stack.
    pub frames: Vec<Frame>,
    /// Names of the lifecycle events observed.
    pub events: Vec<&'static str>,
}

/// The stack as drawn after one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// What the step did.
    pub step: String,
    /// Rendered panes, bottom to top.
    pub lines: Vec<String>,
}

/// Plays a short session against `context`.
///
/// An about box and an editor are opened, the editor refuses to close while
/// its document has unsaved edits, then everything is dismissed.
pub async fn run(context: &ModalContext) -> Transcript {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscription = {
        let events = Arc::clone(&events);
        context.observe(move |event: &ModalEvent| events.lock().push(event.name()))
    };

    let mut renderer = ModalRenderer::new(context.clone(), ConsoleRenderer::default());
    let mut transcript = Transcript::default();

    let about = context.make_modal(ContentRef::new(Dialog::notice("About")));
    let document = Document::default();
    let editor = context.make_modal(ContentRef::new(Dialog::editor("Notes", document.clone())));

    about
        .open(Props::from(json!({ "detail": env!("CARGO_PKG_VERSION") })))
        .await;
    draw(&mut renderer, &mut transcript, "open about");

    editor.open(Props::new().with("detail", "untitled")).await;
    draw(&mut renderer, &mut transcript, "open editor");

    document.edit();
    editor.open(Props::new().with("detail", "untitled*")).await;
    draw(&mut renderer, &mut transcript, "edit document");

    let closed = editor.close().await;
    draw(
        &mut renderer,
        &mut transcript,
        if closed { "close editor" } else { "close editor (refused)" },
    );

    document.save();
    let closed = editor.close().await;
    draw(
        &mut renderer,
        &mut transcript,
        if closed { "save and close editor" } else { "save and close editor (refused)" },
    );

    let dismissed = context.close_all().await;
    draw(&mut renderer, &mut transcript, &format!("dismiss {dismissed}"));

    drop(subscription);
    transcript.events = core::mem::take(&mut *events.lock());
    transcript
}

fn draw(renderer: &mut ModalRenderer<ConsoleRenderer>, transcript: &mut Transcript, step: &str) {
    renderer.render();
    let lines: Vec<String> = renderer.instances().map(|(_, pane)| pane.line()).collect();

    tracing::info!(step, panes = lines.len(), "frame");
    for line in &lines {
        tracing::info!("  {line}");
    }

    transcript.frames.push(Frame {
        step: step.to_owned(),
        lines,
    });
}
