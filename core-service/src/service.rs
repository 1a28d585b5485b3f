//! Player service: one task that owns the session controller.
//!
//! Commands from the host and status reports from the engine are merged in
//! a single `select!` loop and handled one at a time, each to completion,
//! so the controller never sees two operations interleave. After every
//! message a fresh [`SessionSnapshot`] is published on a `watch` channel.

use crate::command::Command;
use crate::error::{CoreError, Result};

use bridge_traits::{status_channel, PlaybackEngine, StatusReceiver};
use core_playback::{Playlist, SessionController, SessionSnapshot};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, Receiver};

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

type Controller = SessionController<dyn PlaybackEngine>;

enum Message {
    Command(Command),
    Shutdown(oneshot::Sender<()>),
}

/// Builder for [`PlayerService`].
#[derive(Default)]
pub struct PlayerServiceBuilder {
    config: Option<PlayerConfig>,
    engine: Option<Arc<dyn PlaybackEngine>>,
    playlist: Option<Playlist>,
}

impl PlayerServiceBuilder {
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Host playback engine. Required.
    pub fn engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Defaults to [`Playlist::builtin`].
    pub fn playlist(mut self, playlist: Playlist) -> Self {
        self.playlist = Some(playlist);
        self
    }

    pub fn build(self) -> Result<PlayerService> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let engine = self.engine.ok_or_else(|| CoreError::CapabilityMissing {
            capability: "PlaybackEngine".to_string(),
            message: "A PlaybackEngine implementation is required to load media. \
                      Inject the host's native player (AVPlayer/ExoPlayer/HTMLMediaElement) \
                      through PlayerServiceBuilder::engine."
                .to_string(),
        })?;
        let playlist = self.playlist.unwrap_or_else(Playlist::builtin);

        let events = EventBus::new(config.event_buffer_size);
        let (status_tx, status_rx) = status_channel();
        let controller = SessionController::new(engine, playlist, config, events.clone(), status_tx);

        Ok(PlayerService {
            controller,
            status_rx,
            events,
        })
    }
}

/// A configured player that has not started yet.
pub struct PlayerService {
    controller: Controller,
    status_rx: StatusReceiver,
    events: EventBus,
}

impl PlayerService {
    pub fn builder() -> PlayerServiceBuilder {
        PlayerServiceBuilder::default()
    }

    /// Subscribe before [`start`](Self::start) to observe the first load.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Spawn the service task on the current tokio runtime.
    ///
    /// The task applies the configured audio mode, loads the first entry
    /// paused, and then serves commands and engine status reports until
    /// [`PlayerHandle::shutdown`] is called or every handle is dropped.
    ///
    /// # Errors
    ///
    /// `CoreError::InitializationFailed` when called outside a tokio runtime.
    pub fn start(self) -> Result<PlayerHandle> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            CoreError::InitializationFailed(format!("PlayerService::start needs a tokio runtime: {}", e))
        })?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.controller.snapshot().into_loading());
        let events = self.events.clone();

        runtime.spawn(run(self.controller, self.status_rx, command_rx, snapshot_tx));

        Ok(PlayerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events,
        })
    }
}

/// Cloneable handle to a running player.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Message>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: EventBus,
}

impl PlayerHandle {
    /// Queue a command. Commands run in the order they were sent.
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(Message::Command(command))
            .map_err(|_| CoreError::ServiceStopped)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Release the live handle and stop the service task. Resolves once the
    /// handle has been released.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Message::Shutdown(ack_tx))
            .map_err(|_| CoreError::ServiceStopped)?;
        ack_rx.await.map_err(|_| CoreError::ServiceStopped)
    }
}

async fn run(
    mut controller: Controller,
    mut status_rx: StatusReceiver,
    mut command_rx: mpsc::UnboundedReceiver<Message>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
) {
    info!("Player service started");

    // Audio mode failures are logged by the controller; playback can still work
    let _ = controller.apply_audio_mode().await;
    if let Err(err) = controller.load_current(false).await {
        warn!(error = %err, "Initial load failed");
    }
    snapshot_tx.send_replace(controller.snapshot());

    loop {
        tokio::select! {
            message = command_rx.recv() => match message {
                Some(Message::Command(command)) => dispatch(&mut controller, command).await,
                Some(Message::Shutdown(ack)) => {
                    command_rx.close();
                    controller.teardown().await;
                    snapshot_tx.send_replace(controller.snapshot());
                    let _ = ack.send(());
                    break;
                }
                None => {
                    debug!("All player handles dropped");
                    controller.teardown().await;
                    break;
                }
            },
            Some(update) = status_rx.recv() => controller.on_engine_status(update).await,
        }

        snapshot_tx.send_replace(controller.snapshot());
    }

    info!("Player service stopped");
}

async fn dispatch(controller: &mut Controller, command: Command) {
    debug!(?command, "Handling command");

    let result = match command {
        Command::LoadCurrent { autoplay } => controller.load_current(autoplay).await,
        Command::Advance { forward } => {
            controller.advance(forward);
            Ok(())
        }
        Command::Next => controller.next().await,
        Command::Previous => controller.previous().await,
        Command::TogglePlayPause => controller.toggle_play_pause().await,
        Command::Stop => controller.stop().await,
        Command::SeekBegin => controller.seek_begin().await,
        Command::SeekCommit { fraction } => controller.seek_commit(fraction).await,
        Command::Skip { delta_millis } => controller.skip(delta_millis).await,
        Command::SkipForwardShort => controller.skip_forward_short().await,
        Command::SkipBackShort => controller.skip_back_short().await,
        Command::SkipForwardLong => controller.skip_forward_long().await,
        Command::SkipBackLong => controller.skip_back_long().await,
        Command::SetRate {
            rate,
            correct_pitch,
        } => controller.set_rate(rate, correct_pitch).await,
        Command::SetRateFraction { fraction } => controller.set_rate_fraction(fraction).await,
        Command::TogglePitchCorrection => controller.toggle_pitch_correction().await,
        Command::SetVolume { volume } => controller.set_volume(volume).await,
        Command::SetMuted { muted } => controller.set_muted(muted).await,
        Command::ToggleMuted => controller.toggle_muted().await,
        Command::SetLoopMode { mode } => controller.set_loop_mode(mode).await,
        Command::ToggleLoopMode => controller.toggle_loop_mode().await,
        Command::ToggleNativeControls => {
            controller.toggle_native_controls();
            Ok(())
        }
        Command::TogglePoster => {
            controller.toggle_poster();
            Ok(())
        }
        Command::PresentFullscreen => controller.present_fullscreen().await,
        Command::FullscreenUpdate { update } => {
            controller.on_fullscreen_update(update);
            Ok(())
        }
        Command::ReadyForDisplay { natural_size } => {
            controller.on_ready_for_display(natural_size);
            Ok(())
        }
        Command::ToggleEarpiece => controller.toggle_earpiece().await,
    };

    if let Err(err) = result {
        warn!(?command, error = %err, "Command failed");
    }
}
