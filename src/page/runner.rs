use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::instance::Page;
use crate::error::{Result, SessionError};
use crate::media::DeviceLists;
use crate::session::CredentialPatch;
use crate::status::StatusView;
use crate::vendor::EventEnvelope;

type Reply<T> = oneshot::Sender<Result<T>>;

/// User intents carried to the page task
#[derive(Debug)]
pub enum PageCommand {
    Initialize(Reply<StatusView>),
    Connect(CredentialPatch, Reply<StatusView>),
    Disconnect(Reply<StatusView>),
    SelectDevices {
        camera: Option<String>,
        microphone: Option<String>,
        reply: Reply<DeviceLists>,
    },
    SetVolume(f32, Reply<StatusView>),
    SetMuted(bool, Reply<StatusView>),
    Play(Reply<StatusView>),
    Pause(Reply<StatusView>),
    Status(Reply<StatusView>),
    Devices(Reply<DeviceLists>),
}

/// Cloneable front of a running page
///
/// Every call is queued behind whatever the page is doing, so operations on
/// one page never overlap.
#[derive(Debug, Clone)]
pub struct PageHandle {
    tx: mpsc::Sender<PageCommand>,
}

impl PageHandle {
    pub async fn initialize(&self) -> Result<StatusView> {
        self.request(PageCommand::Initialize).await
    }

    pub async fn connect(&self, patch: CredentialPatch) -> Result<StatusView> {
        self.request(|reply| PageCommand::Connect(patch, reply)).await
    }

    pub async fn disconnect(&self) -> Result<StatusView> {
        self.request(PageCommand::Disconnect).await
    }

    pub async fn select_devices(
        &self,
        camera: Option<String>,
        microphone: Option<String>,
    ) -> Result<DeviceLists> {
        self.request(|reply| PageCommand::SelectDevices {
            camera,
            microphone,
            reply,
        })
        .await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<StatusView> {
        self.request(|reply| PageCommand::SetVolume(volume, reply)).await
    }

    pub async fn set_muted(&self, muted: bool) -> Result<StatusView> {
        self.request(|reply| PageCommand::SetMuted(muted, reply)).await
    }

    pub async fn play(&self) -> Result<StatusView> {
        self.request(PageCommand::Play).await
    }

    pub async fn pause(&self) -> Result<StatusView> {
        self.request(PageCommand::Pause).await
    }

    pub async fn status(&self) -> Result<StatusView> {
        self.request(PageCommand::Status).await
    }

    pub async fn devices(&self) -> Result<DeviceLists> {
        self.request(PageCommand::Devices).await
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> PageCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| page_closed())?;
        rx.await.map_err(|_| page_closed())?
    }
}

fn page_closed() -> SessionError {
    SessionError::InvalidState("page closed".to_string())
}

/// Move `page` onto its own task
///
/// Vendor events and user commands are applied one at a time in arrival
/// order. The task tears the page down once every handle is dropped.
pub fn spawn(
    page: Page,
    events: mpsc::UnboundedReceiver<EventEnvelope>,
) -> (PageHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(32);
    let task = tokio::spawn(run(page, events, rx));
    (PageHandle { tx }, task)
}

async fn run(
    mut page: Page,
    mut events: mpsc::UnboundedReceiver<EventEnvelope>,
    mut commands: mpsc::Receiver<PageCommand>,
) {
    info!("{} page running", page.variant());
    loop {
        tokio::select! {
            biased;

            Some(envelope) = events.recv() => {
                debug!("Vendor event for session {}", envelope.session);
                // Recorded as the page's last error
                let _ = page.handle_event(envelope).await;
            }
            command = commands.recv() => match command {
                Some(command) => dispatch(&mut page, command).await,
                None => break,
            },
        }
    }
    page.shutdown().await;
    info!("{} page stopped", page.variant());
}

async fn dispatch(page: &mut Page, command: PageCommand) {
    // A dropped receiver means the caller gave up waiting
    match command {
        PageCommand::Initialize(reply) => {
            let result = page.initialize().await.map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::Connect(patch, reply) => {
            let result = page.connect(patch).await.map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::Disconnect(reply) => {
            page.disconnect().await;
            let _ = reply.send(Ok(page.status()));
        }
        PageCommand::SelectDevices {
            camera,
            microphone,
            reply,
        } => {
            let _ = reply.send(page.select_devices(camera, microphone).await);
        }
        PageCommand::SetVolume(volume, reply) => {
            let result = page.set_volume(volume).map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::SetMuted(muted, reply) => {
            let result = page.set_muted(muted).map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::Play(reply) => {
            let result = page.play().map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::Pause(reply) => {
            let result = page.pause().map(|_| page.status());
            let _ = reply.send(result);
        }
        PageCommand::Status(reply) => {
            let _ = reply.send(Ok(page.status()));
        }
        PageCommand::Devices(reply) => {
            let _ = reply.send(Ok(page.devices()));
        }
    }
}
