//! Renderer contract tests: mounting, diffing, ambient guard registration,
//! and visibility requests from the UI side.

mod test_utils;

use std::sync::{Arc, Mutex};

use parley_modal::{
    ContentRenderer, GuardOwner, ModalContext, ModalId, ModalRenderer, ModalScope, ModalView,
    Props, RenderPass, on_before_close,
};
use test_utils::{context, gated_guard, modal, wait_until};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST RENDERER
// ═══════════════════════════════════════════════════════════════════════════════

/// One mounted modal: its title and, if the props ask for it, a guard owner
/// that refuses to close while `dirty` is set.
struct Panel {
    title: String,
    _owner: Option<GuardOwner>,
}

#[derive(Default)]
struct Panels {
    log: Arc<Mutex<Vec<String>>>,
}

impl ContentRenderer for Panels {
    type Instance = Panel;

    fn mount(&mut self, view: &ModalView, scope: &ModalScope) -> Panel {
        let title: String = view.props.get_as("title").unwrap_or_default();
        self.log.lock().unwrap().push(format!("mount {title}"));

        let owner = view
            .props
            .get_as::<bool>("dirty")
            .filter(|dirty| *dirty)
            .map(|_| on_before_close(|| async { false }).unwrap());
        assert_eq!(ModalScope::current().unwrap().modal(), scope.modal());

        Panel {
            title,
            _owner: owner,
        }
    }

    fn update(&mut self, panel: &mut Panel, view: &ModalView) {
        panel.title = view.props.get_as("title").unwrap_or_default();
        self.log
            .lock()
            .unwrap()
            .push(format!("update {}", panel.title));
    }

    fn unmount(&mut self, panel: Panel) {
        self.log
            .lock()
            .unwrap()
            .push(format!("unmount {}", panel.title));
    }
}

fn renderer(context: &ModalContext) -> (ModalRenderer<Panels>, Arc<Mutex<Vec<String>>>) {
    let panels = Panels::default();
    let log = Arc::clone(&panels.log);
    (ModalRenderer::new(context.clone(), panels), log)
}

fn titled(title: &str) -> Props {
    Props::new().with("title", title)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIFFING
// ═══════════════════════════════════════════════════════════════════════════════

/// A render pass mounts new records, updates changed ones, and unmounts closed ones.
#[tokio::test]
async fn render_tracks_registry() {
    let context = context();
    let (mut renderer, log) = renderer(&context);
    let [a, b] = ["a", "b"].map(|name| modal(&context, name));

    a.open(titled("A")).await;
    b.open(titled("B")).await;
    assert_eq!(
        renderer.render(),
        RenderPass {
            mounted: 2,
            updated: 0,
            unmounted: 0
        }
    );
    assert!(!renderer.is_dirty());

    a.open(titled("A2")).await;
    assert!(b.close().await);
    assert!(renderer.is_dirty());
    assert_eq!(
        renderer.render(),
        RenderPass {
            mounted: 0,
            updated: 1,
            unmounted: 1
        }
    );

    assert_eq!(
        *log.lock().unwrap(),
        vec!["mount A", "mount B", "unmount B", "update A2"]
    );
    let titles: Vec<_> = renderer
        .instances()
        .map(|(_, panel)| panel.title.clone())
        .collect();
    assert_eq!(titles, vec!["A2"]);
}

/// Rendering twice without changes does nothing.
#[tokio::test]
async fn unchanged_registry_renders_nothing() {
    let context = context();
    let (mut renderer, _log) = renderer(&context);
    modal(&context, "a").open(titled("A")).await;

    renderer.render();
    assert!(renderer.render().is_empty());
    assert_eq!(renderer.len(), 1);
}

/// Instances are listed bottom to top.
#[tokio::test]
async fn instances_follow_stacking_order() {
    let context = context();
    let (mut renderer, _log) = renderer(&context);
    for name in ["low", "mid", "high"] {
        modal(&context, name).open(titled(name)).await;
    }

    renderer.render();

    let z: Vec<u32> = renderer.instances().map(|(view, _)| view.z_index).collect();
    assert_eq!(z, vec![1000, 1001, 1002]);
}

/// Dropping the renderer unmounts everything it mounted.
#[tokio::test]
async fn drop_unmounts_instances() {
    let context = context();
    let (mut renderer, log) = renderer(&context);
    modal(&context, "a").open(titled("A")).await;
    renderer.render();

    drop(renderer);

    assert_eq!(*log.lock().unwrap(), vec!["mount A", "unmount A"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// AMBIENT GUARDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Content mounted by the renderer can register guards through the ambient scope.
#[tokio::test]
async fn mounted_content_registers_guards() {
    let context = context();
    let (mut renderer, _log) = renderer(&context);
    let editor = modal(&context, "editor");

    editor
        .open(titled("Editor").with("dirty", true))
        .await;
    renderer.render();

    assert_eq!(context.guard_count(editor.id()), 1);
    assert!(!editor.close().await);
    assert!(editor.is_visible());
}

/// A reopened record is a fresh mount; the old instance's guards go with it.
#[tokio::test]
async fn reopen_remounts_and_drops_old_guards() {
    let context = context();
    let (mut renderer, log) = renderer(&context);
    let editor = modal(&context, "editor");
    editor.open(titled("v1")).await;
    renderer.render();

    let (mut gate, guard) = gated_guard();
    context
        .add_boxed_close_guard(editor.id(), parley_modal::OwnerId::new(), guard)
        .unwrap();
    let closing = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.close().await })
    };
    wait_until(|| gate.started()).await;

    editor.open(titled("v2")).await;
    let pass = renderer.render();
    gate.resolve(true);

    assert!(!closing.await.unwrap());
    assert_eq!(pass.mounted, 1);
    assert_eq!(pass.unmounted, 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["mount v1", "unmount v1", "mount v2"]
    );
}

/// A guard owner dropped on unmount no longer takes part in closes.
#[tokio::test]
async fn unmounted_owner_guards_are_removed() {
    let context = context();
    let editor = modal(&context, "editor");
    editor.open(Props::new()).await;

    let scope = ModalScope::new(context.clone(), editor.id().clone());
    let owner = scope.enter(|| on_before_close(|| async { false })).unwrap();
    assert!(!editor.close().await);

    drop(owner);
    assert!(editor.close().await);
}

// ═══════════════════════════════════════════════════════════════════════════════
// VISIBILITY REQUESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Hiding through the renderer negotiates; a refusal keeps the modal visible.
#[tokio::test]
async fn set_visible_false_negotiates() {
    let context = context();
    let (mut renderer, _log) = renderer(&context);
    let editor = modal(&context, "editor");
    editor.open(titled("Editor").with("dirty", true)).await;
    renderer.render();

    assert!(!renderer.set_visible(editor.id(), false).await);
    renderer.render();
    let (view, _) = renderer.instances().next().unwrap();
    assert!(view.visible);
}

/// Hiding an unguarded modal closes it; showing an unknown modal fails.
#[tokio::test]
async fn set_visible_round_trip() {
    let context = context();
    let (mut renderer, _log) = renderer(&context);
    let about = modal(&context, "about");
    about.open(titled("About")).await;
    renderer.render();

    assert!(renderer.set_visible(about.id(), false).await);
    renderer.render();
    assert!(renderer.is_empty());

    assert!(!renderer.set_visible(about.id(), true).await);
    assert!(!renderer.set_visible(&ModalId::new(), false).await);
}

/// Showing a modal whose close is pending cancels the close and keeps its props.
#[tokio::test]
async fn set_visible_true_mid_close_keeps_props() {
    let context = context();
    let (renderer, _log) = renderer(&context);
    let editor = modal(&context, "editor");
    editor.open(titled("Editor").with("draft", 3)).await;

    let (mut gate, guard) = gated_guard();
    context
        .add_boxed_close_guard(editor.id(), parley_modal::OwnerId::new(), guard)
        .unwrap();
    let closing = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.close().await })
    };
    wait_until(|| gate.started()).await;

    assert!(renderer.set_visible(editor.id(), true).await);
    gate.resolve(true);
    assert!(!closing.await.unwrap());

    let props = context.props(editor.id()).unwrap();
    assert_eq!(props.get_as::<String>("title").as_deref(), Some("Editor"));
    assert_eq!(props.get_as::<u32>("draft"), Some(3));
    assert!(editor.is_visible());
}
