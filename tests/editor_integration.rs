use std::sync::{Arc, Mutex};
use std::time::Duration;

use caption_edit::fonts::{FontLoader, LoadedFonts, WebFontRequest};
use caption_edit::outside::{InteractiveRegions, PointerHub, PointerRelease, PointerSource, Rect, RegionKind};
use caption_edit::surface::{Height, TextSurface};
use caption_edit::tasks::editor::EditorHandle;
use caption_edit::{
    CaptionEditor, Catalog, ColorValue, EditorCallbacks, EditorCommand, EditorProps, FontDescriptor,
    PickerState, SessionSnapshot,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Debug, Clone, PartialEq)]
enum SurfaceOp {
    Value(String),
    Height(Height),
    SelectAll,
}

#[derive(Clone, Default)]
struct RecordingSurface {
    ops: Arc<Mutex<Vec<SurfaceOp>>>,
}

impl RecordingSurface {
    fn selected(&self) -> usize {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == SurfaceOp::SelectAll)
            .count()
    }
}

impl TextSurface for RecordingSurface {
    fn set_value(&mut self, value: &str) {
        self.ops.lock().unwrap().push(SurfaceOp::Value(value.to_string()));
    }
    fn set_height(&mut self, height: Height) {
        self.ops.lock().unwrap().push(SurfaceOp::Height(height));
    }
    fn content_height(&self) -> f32 {
        40.0
    }
    fn select_all(&mut self) {
        self.ops.lock().unwrap().push(SurfaceOp::SelectAll);
    }
}

#[derive(Default)]
struct RecordingLoader {
    requests: Mutex<Vec<Vec<String>>>,
}

impl FontLoader for RecordingLoader {
    fn load(&self, request: WebFontRequest) -> BoxFuture<'static, caption_edit::Result<LoadedFonts>> {
        let queries: Vec<String> = request.queries().iter().map(|q| q.to_string()).collect();
        self.requests.lock().unwrap().push(queries);
        async { Ok(LoadedFonts::default()) }.boxed()
    }
}

struct GatedLoader(Mutex<Option<oneshot::Receiver<()>>>);

impl FontLoader for GatedLoader {
    fn load(&self, _request: WebFontRequest) -> BoxFuture<'static, caption_edit::Result<LoadedFonts>> {
        let gate = self.0.lock().unwrap().take();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(LoadedFonts::default())
        }
        .boxed()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Hook {
    Close,
    Change(String),
    Blur(String),
    Color(String),
    Font(String),
    FontsLoaded,
}

fn hooks() -> (EditorCallbacks, mpsc::UnboundedReceiver<Hook>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (a, b, c, d, e, f) = (tx.clone(), tx.clone(), tx.clone(), tx.clone(), tx.clone(), tx);
    let callbacks = EditorCallbacks::new()
        .on_close_modal(move || {
            let _ = a.send(Hook::Close);
        })
        .on_text_change(move |t| {
            let _ = b.send(Hook::Change(t.to_string()));
        })
        .on_text_blur(move |t| {
            let _ = c.send(Hook::Blur(t.to_string()));
        })
        .on_color_change(move |col| {
            let _ = d.send(Hook::Color(col.to_string()));
        })
        .on_font_change(move |font| {
            let _ = e.send(Hook::Font(font.family.clone()));
        })
        .on_fonts_loaded(move || {
            let _ = f.send(Hook::FontsLoaded);
        });
    (callbacks, rx)
}

fn catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::new(
            vec!["#ffffff".into(), "#eb5757".into(), "#27ae60".into()],
            vec![
                FontDescriptor::new("A").with_web_font("A:700").unwrap(),
                FontDescriptor::new("B"),
            ],
        )
        .unwrap(),
    )
}

struct Harness {
    handle: EditorHandle,
    surface: RecordingSurface,
    hooks: mpsc::UnboundedReceiver<Hook>,
    hub: PointerHub,
}

fn start(open: bool, delay: Duration, loader: Arc<dyn FontLoader>) -> Harness {
    let surface = RecordingSurface::default();
    let hub = PointerHub::default();
    let (callbacks, hooks) = hooks();
    let props = EditorProps {
        text_value: "caption".into(),
        text_color: ColorValue::from("#ffffff"),
        font_value: Some("B".into()),
        open,
    };
    let (editor, wakeups) =
        CaptionEditor::mount(props, catalog(), surface.clone(), callbacks, &hub, loader, delay);
    Harness {
        handle: EditorHandle::spawn(editor, wakeups),
        surface,
        hooks,
        hub,
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionSnapshot>,
    pred: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timeout waiting for snapshot")
        .expect("editor task stopped")
        .clone()
}

async fn next_hook(rx: &mut mpsc::UnboundedReceiver<Hook>) -> Hook {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timeout waiting for hook")
        .expect("hook channel closed")
}

/// Drains hooks until `wanted` shows up, failing on timeout.
async fn expect_hook(rx: &mut mpsc::UnboundedReceiver<Hook>, wanted: Hook) {
    loop {
        if next_hook(rx).await == wanted {
            return;
        }
    }
}

async fn no_hook_within(rx: &mut mpsc::UnboundedReceiver<Hook>, window: Duration, unwanted: Hook) {
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(hook)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        assert_ne!(hook, unwanted);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unmount_before_delay_never_selects() {
    let h = start(true, Duration::from_millis(200), Arc::new(RecordingLoader::default()));
    h.handle.unmount().await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(h.surface.selected(), 0, "select-all must not reach an unmounted surface");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_selects_all_once_after_delay() {
    let h = start(true, Duration::from_millis(30), Arc::new(RecordingLoader::default()));
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while h.surface.selected() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "select-all never fired");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.surface.selected(), 1);
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closing_before_delay_cancels_select_all() {
    let h = start(false, Duration::from_millis(100), Arc::new(RecordingLoader::default()));
    let mut snaps = h.handle.subscribe();
    h.handle.send(EditorCommand::SetOpen(true)).await.unwrap();
    h.handle.send(EditorCommand::SetOpen(false)).await.unwrap();
    wait_for(&mut snaps, |s| !s.open).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.surface.selected(), 0);
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pickers_are_exclusive_and_cleared_on_close() {
    let h = start(true, Duration::from_secs(60), Arc::new(RecordingLoader::default()));
    let mut snaps = h.handle.subscribe();

    h.handle.send(EditorCommand::ToggleColorPicker).await.unwrap();
    wait_for(&mut snaps, |s| s.picker == PickerState::ColorPicker).await;
    h.handle.send(EditorCommand::ToggleFontPicker).await.unwrap();
    wait_for(&mut snaps, |s| s.picker == PickerState::FontPicker).await;

    h.handle.send(EditorCommand::SetOpen(false)).await.unwrap();
    let closed = wait_for(&mut snaps, |s| !s.open).await;
    assert_eq!(closed.picker, PickerState::None);

    h.handle.send(EditorCommand::SetOpen(true)).await.unwrap();
    let reopened = wait_for(&mut snaps, |s| s.open).await;
    assert_eq!(reopened.picker, PickerState::None, "pickers stay closed after reopening");
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn typing_previews_and_blur_commits() {
    let mut h = start(true, Duration::from_secs(60), Arc::new(RecordingLoader::default()));
    h.handle.send(EditorCommand::Input("Hel".into())).await.unwrap();
    h.handle.send(EditorCommand::Input("Hello".into())).await.unwrap();
    h.handle.send(EditorCommand::Blur).await.unwrap();

    let mut seen = Vec::new();
    loop {
        match next_hook(&mut h.hooks).await {
            Hook::FontsLoaded => continue,
            hook => {
                let done = matches!(hook, Hook::Blur(_));
                seen.push(hook);
                if done {
                    break;
                }
            }
        }
    }
    assert_eq!(
        seen,
        vec![
            Hook::Change("Hel".into()),
            Hook::Change("Hello".into()),
            Hook::Blur("Hello".into()),
        ]
    );

    let ops = h.surface.ops.lock().unwrap().clone();
    let tail = &ops[ops.len() - 3..];
    assert_eq!(
        tail,
        &[
            SurfaceOp::Value("Hello".into()),
            SurfaceOp::Height(Height::Auto),
            SurfaceOp::Height(Height::Px(40.0)),
        ],
        "value reaches the surface before it is measured"
    );
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn color_pick_notifies_and_moves_swatch() {
    let mut h = start(true, Duration::from_secs(60), Arc::new(RecordingLoader::default()));
    let mut snaps = h.handle.subscribe();
    assert_eq!(h.handle.snapshot().active_swatch, Some(0));

    h.handle
        .send(EditorCommand::PickColor("#27ae60".into()))
        .await
        .unwrap();
    expect_hook(&mut h.hooks, Hook::Color("#27ae60".into())).await;
    let snap = wait_for(&mut snaps, |s| s.active_swatch == Some(2)).await;
    assert_eq!(snap.style.color, ColorValue::from("#27ae60"));
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn outside_release_requests_close_inside_does_not() {
    let mut h = start(true, Duration::from_secs(60), Arc::new(RecordingLoader::default()));
    let mut snaps = h.handle.subscribe();
    let regions = InteractiveRegions::new()
        .with(RegionKind::Controls, Rect::new(100.0, 16.0, 200.0, 40.0))
        .with(RegionKind::TextInput, Rect::new(0.0, 120.0, 400.0, 40.0));
    h.handle.send(EditorCommand::Layout(regions)).await.unwrap();
    // a toggle after the layout proves the layout was applied
    h.handle.send(EditorCommand::ToggleColorPicker).await.unwrap();
    wait_for(&mut snaps, |s| s.picker == PickerState::ColorPicker).await;

    let mut bystander = h.hub.subscribe();
    assert_eq!(h.hub.publish(PointerRelease::at(150.0, 30.0)), 2);
    assert_eq!(h.hub.publish(PointerRelease::at(20.0, 130.0)), 2);
    no_hook_within(&mut h.hooks, Duration::from_millis(200), Hook::Close).await;

    h.hub.publish(PointerRelease::at(5.0, 500.0));
    expect_hook(&mut h.hooks, Hook::Close).await;

    // the editor's listener never swallows events meant for others
    for _ in 0..3 {
        bystander.recv().await.unwrap();
    }

    // close is advisory: nothing changes until the host acts on it
    assert!(h.handle.snapshot().open);
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listener_lives_exactly_as_long_as_the_mount() {
    let h = start(false, Duration::from_secs(60), Arc::new(RecordingLoader::default()));
    assert_eq!(h.hub.listener_count(), 1);
    let hub = h.hub.clone();
    h.handle.unmount().await.unwrap();
    assert_eq!(hub.listener_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fonts_request_batches_web_fonts_and_reports_once() {
    let loader = Arc::new(RecordingLoader::default());
    let mut h = start(false, Duration::from_secs(60), loader.clone());
    let mut snaps = h.handle.subscribe();

    expect_hook(&mut h.hooks, Hook::FontsLoaded).await;
    wait_for(&mut snaps, |s| s.fonts_ready).await;
    h.handle.send(EditorCommand::SetOpen(true)).await.unwrap();
    h.handle.send(EditorCommand::Input("re-render".into())).await.unwrap();
    no_hook_within(&mut h.hooks, Duration::from_millis(200), Hook::FontsLoaded).await;

    assert_eq!(*loader.requests.lock().unwrap(), vec![vec!["A:700".to_string()]]);
    h.handle.unmount().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn font_completion_after_unmount_is_silent() {
    let (release, gate) = oneshot::channel();
    let loader = Arc::new(GatedLoader(Mutex::new(Some(gate))));
    let mut h = start(false, Duration::from_secs(60), loader);
    h.handle.unmount().await.unwrap();
    let _ = release.send(());
    no_hook_within(&mut h.hooks, Duration::from_millis(200), Hook::FontsLoaded).await;
}
