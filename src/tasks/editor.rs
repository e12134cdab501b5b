use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::editor::{CaptionEditor, SessionSnapshot};
use crate::events::{EditorCommand, Wakeup};
use crate::surface::TextSurface;

/// Drives a mounted editor until `cancel` fires or every command sender is gone.
///
/// Each command, wakeup or pointer release is applied in full before the next
/// snapshot is published, so observers never see an intermediate state.
/// Steps that leave the session unchanged publish nothing.
/// The editor is unmounted on exit.
pub async fn run<S: TextSurface>(
    mut editor: CaptionEditor<S>,
    mut wakeups: UnboundedReceiver<Wakeup>,
    mut commands: Receiver<EditorCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = commands.recv() => match maybe_cmd {
                Some(cmd) => {
                    if let Err(err) = editor.apply(cmd) {
                        warn!(error = %err, "command rejected");
                    }
                }
                None => {
                    debug!("command channel closed");
                    break;
                }
            },

            Some(wakeup) = wakeups.recv() => editor.wake(wakeup),

            Some(release) = editor.next_release() => {
                editor.on_pointer_release(release);
            }
        }
        let next = editor.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
    editor.unmount();
    Ok(())
}

/// Host-side handle to an editor running on its own task.
pub struct EditorHandle {
    commands: Sender<EditorCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
    join: JoinHandle<Result<()>>,
}

impl EditorHandle {
    /// Spawns [`run`] for an already mounted editor.
    pub fn spawn<S>(editor: CaptionEditor<S>, wakeups: UnboundedReceiver<Wakeup>) -> Self
    where
        S: TextSurface + Send + 'static,
    {
        let (commands, command_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshots) = watch::channel(editor.snapshot());
        let cancel = CancellationToken::new();
        let join = tokio::spawn(run(
            editor,
            wakeups,
            command_rx,
            snapshot_tx,
            cancel.clone(),
        ));
        Self {
            commands,
            snapshots,
            cancel,
            join,
        }
    }

    pub async fn send(&self, command: EditorCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow::anyhow!("editor task stopped"))
    }

    /// Sender usable from synchronous host callbacks via `try_send`.
    pub fn commands(&self) -> Sender<EditorCommand> {
        self.commands.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the task and waits for it to unmount the editor.
    pub async fn unmount(self) -> Result<()> {
        self.cancel.cancel();
        self.join.await?
    }
}
