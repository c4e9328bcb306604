//! Background work requested by the application. Each command runs on the
//! blocking pool and re-enters the event stream as one completion event.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::event::Event;
use crate::fs::operations;
use crate::viewer::{self, LoadContext, LoadRequest};

/// Side effects the event handler asks for instead of performing them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a resource into the content viewer.
    Load(LoadRequest),
    /// Read a file's raw text for the editor.
    OpenFile(PathBuf),
    /// Write an edited buffer back. `seq` is echoed on the completion.
    SaveFile {
        path: PathBuf,
        contents: String,
        seq: u64,
    },
}

pub struct JobRunner {
    tx: mpsc::UnboundedSender<Event>,
    ctx: Arc<LoadContext>,
}

impl JobRunner {
    pub fn new(tx: mpsc::UnboundedSender<Event>, ctx: LoadContext) -> Self {
        Self {
            tx,
            ctx: Arc::new(ctx),
        }
    }

    pub fn spawn(&self, command: Command) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let ctx = Arc::clone(&self.ctx);
        debug!(?command, "spawning job");
        tokio::task::spawn_blocking(move || {
            let event = run(command, &ctx);
            // The receiver is gone once the app is shutting down.
            if tx.send(event).is_err() {
                trace!("event channel closed, dropping completion");
            }
        })
    }
}

fn run(command: Command, ctx: &LoadContext) -> Event {
    match command {
        Command::Load(request) => Event::ContentLoaded(viewer::run_load(&request, ctx)),
        Command::OpenFile(path) => {
            let result = operations::read_text(&path);
            Event::EditorOpened { path, result }
        }
        Command::SaveFile {
            path,
            contents,
            seq,
        } => {
            let result = operations::write_content(&path, contents.as_bytes());
            Event::EditorSaved { path, seq, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;
    use crate::resource::ResourceRef;
    use crate::viewer::{LoadToken, RendererKind};
    use std::fs;
    use tempfile::TempDir;

    fn runner() -> (JobRunner, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (JobRunner::new(tx, LoadContext::new("base16-ocean.dark", 80)), rx)
    }

    #[tokio::test]
    async fn test_open_posts_file_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello\n").unwrap();
        let (jobs, mut rx) = runner();

        jobs.spawn(Command::OpenFile(path.clone())).await.unwrap();
        match rx.recv().await.unwrap() {
            Event::EditorOpened { path: p, result } => {
                assert_eq!(p, path);
                assert_eq!(result.unwrap(), "hello\n");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_writes_and_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let (jobs, mut rx) = runner();

        jobs.spawn(Command::SaveFile {
            path: path.clone(),
            contents: "new".to_string(),
            seq: 3,
        })
        .await
        .unwrap();
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::EditorSaved {
                seq: 3,
                result: Ok(()),
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_save_failure_is_persist_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.txt");
        let (jobs, mut rx) = runner();

        jobs.spawn(Command::SaveFile {
            path,
            contents: String::new(),
            seq: 1,
        })
        .await
        .unwrap();
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::EditorSaved {
                result: Err(ContentError::Persist { .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_carries_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();
        let (jobs, mut rx) = runner();
        let token = LoadToken {
            resource: ResourceRef::new(&path),
            seq: 7,
        };

        jobs.spawn(Command::Load(LoadRequest {
            token: token.clone(),
            kind: RendererKind::Json,
        }))
        .await
        .unwrap();
        match rx.recv().await.unwrap() {
            Event::ContentLoaded(loaded) => {
                assert_eq!(loaded.token, token);
                assert!(loaded.result.is_ok());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
