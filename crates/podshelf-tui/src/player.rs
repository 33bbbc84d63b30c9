/// mpv IPC driver for episode playback.
///
/// ```text
///   MpvDriver::spawn_and_connect()
///         │
///         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///         └── reader_task   ← reads JSON lines, resolves the matching oneshot
/// ```
///
/// `MpvHandle` is cheaply cloneable. `Player` feeds one command task through a
/// queue, so the UI loop never waits on mpv and commands reach it in order.
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

use podshelf_core::platform;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    pub async fn load(&self, url: &str, volume: f32) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url])).await?;
        let vol_pct = (volume * 100.0).clamp(0.0, 100.0);
        let _ = self.send(json!(["set_property", "volume", vol_pct])).await;
        self.send(json!(["set_property", "pause", false])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }
}

/// Owns the mpv child process.
pub struct MpvDriver {
    socket_name: String,
    process: Option<tokio::process::Child>,
    volume: f32,
    log_dir: PathBuf,
}

impl MpvDriver {
    pub fn new(volume: f32, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            socket_name: platform::mpv_socket_name(),
            process: None,
            volume,
            log_dir: log_dir.into(),
        }
    }

    fn stderr_path(&self) -> PathBuf {
        self.log_dir.join("mpv-stderr.log")
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }

    fn spawn_process(&mut self) -> anyhow::Result<()> {
        let mpv_binary =
            platform::find_mpv_binary().ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;

        let vol_arg = format!(
            "--volume={}",
            (self.volume * 100.0).clamp(0.0, 100.0).round() as i64
        );

        let stderr_path = self.stderr_path();
        let stderr = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)
        {
            Ok(file) => std::process::Stdio::from(file),
            Err(e) => {
                warn!("mpv: cannot open {:?}: {}", stderr_path, e);
                std::process::Stdio::null()
            }
        };

        info!("mpv: spawning {:?}", mpv_binary);
        let child = tokio::process::Command::new(&mpv_binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg(platform::mpv_socket_arg())
            .arg("--quiet")
            .arg(vol_arg)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        self.kill().await;
        let socket_path = std::path::PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        self.spawn_process()?;

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        self.kill().await;
        self.spawn_process()?;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(reader: BufReader<R>, writer: W) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);
    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending));
    MpvHandle { tx: cmd_tx }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) else {
                    // Unsolicited event; playback state is owned by the app.
                    debug!("mpv reader: event {}", trimmed);
                    continue;
                };
                let mut map = pending.lock().await;
                if let Some(tx) = map.remove(&req_id) {
                    let result = if val["error"].as_str() == Some("success") {
                        Ok(val)
                    } else {
                        let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                        debug!("mpv reader: response req={} err={}", req_id, err);
                        Err(anyhow::anyhow!("mpv error: {}", err))
                    };
                    let _ = tx.send(result);
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register reply channel before writing so reader can match it
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

#[derive(Debug, Clone, PartialEq)]
enum PlayerCommand {
    Load(String),
    SetPause(bool),
    Stop,
}

/// Applies queued commands one at a time; a `load` finishes all of its
/// property writes before the next command starts.
async fn command_task(handle: MpvHandle, mut rx: mpsc::UnboundedReceiver<PlayerCommand>, volume: f32) {
    while let Some(cmd) = rx.recv().await {
        let result = match &cmd {
            PlayerCommand::Load(url) => handle.load(url, volume).await,
            PlayerCommand::SetPause(paused) => handle.set_pause(*paused).await,
            PlayerCommand::Stop => handle.stop().await,
        };
        if let Err(e) = result {
            warn!("mpv: {:?} failed: {:#}", cmd, e);
        }
    }
    debug!("mpv: command task exiting");
}

/// What the app drives: a connected command queue, or nothing when audio is off.
pub struct Player {
    driver: Option<MpvDriver>,
    commands: Option<mpsc::UnboundedSender<PlayerCommand>>,
}

impl Player {
    pub fn disabled() -> Self {
        Self {
            driver: None,
            commands: None,
        }
    }

    /// Spawn mpv, logging its stderr under `log_dir`. On failure playback
    /// degrades to selection-only.
    pub async fn start(volume: f32, log_dir: &Path) -> Self {
        let mut driver = MpvDriver::new(volume, log_dir);
        match driver.spawn_and_connect().await {
            Ok(handle) => Self::connected(handle, volume, Some(driver)),
            Err(e) => {
                warn!("audio output unavailable: {:#}", e);
                driver.kill().await;
                Self::disabled()
            }
        }
    }

    fn connected(handle: MpvHandle, volume: f32, driver: Option<MpvDriver>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(command_task(handle, rx, volume));
        Self {
            driver,
            commands: Some(tx),
        }
    }

    pub fn is_available(&self) -> bool {
        self.commands.is_some()
    }

    fn enqueue(&self, cmd: PlayerCommand) {
        let Some(tx) = &self.commands else {
            return;
        };
        if tx.send(cmd).is_err() {
            warn!("mpv: command task gone");
        }
    }

    pub fn load(&self, url: &str) {
        self.enqueue(PlayerCommand::Load(url.to_string()));
    }

    pub fn set_pause(&self, paused: bool) {
        self.enqueue(PlayerCommand::SetPause(paused));
    }

    pub fn stop(&self) {
        self.enqueue(PlayerCommand::Stop);
    }

    pub async fn shutdown(&mut self) {
        self.commands = None;
        if let Some(mut driver) = self.driver.take() {
            driver.kill().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers `count` command lines like mpv would, each after `delay`,
    /// failing `stop`.
    async fn fake_mpv(
        stream: tokio::io::DuplexStream,
        count: usize,
        delay: std::time::Duration,
    ) -> Vec<Value> {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut lines = BufReader::new(read_half).lines();
        let mut seen = Vec::new();
        while seen.len() < count {
            let line = lines.next_line().await.unwrap().unwrap();
            let msg: Value = serde_json::from_str(&line).unwrap();
            let req_id = msg["request_id"].as_u64().unwrap();
            tokio::time::sleep(delay).await;
            let error = if msg["command"][0] == "stop" {
                "command not allowed"
            } else {
                "success"
            };
            // Unsolicited events are interleaved and must be skipped.
            let reply = format!(
                "{{\"event\":\"idle\"}}\n{{\"request_id\":{},\"error\":\"{}\"}}\n",
                req_id, error
            );
            write_half.write_all(reply.as_bytes()).await.unwrap();
            seen.push(msg["command"].clone());
        }
        seen
    }

    #[tokio::test]
    async fn test_commands_round_trip_over_ipc() {
        let (client, server) = tokio::io::duplex(4096);
        let mpv = tokio::spawn(fake_mpv(server, 5, std::time::Duration::ZERO));

        let (read_half, write_half) = tokio::io::split(client);
        let handle = start_io_tasks(BufReader::new(read_half), write_half);

        handle.load("https://cdn/ep.mp3", 0.5).await.unwrap();
        handle.set_pause(true).await.unwrap();
        let err = handle.stop().await.unwrap_err();
        assert!(err.to_string().contains("command not allowed"));

        let seen = mpv.await.unwrap();
        assert_eq!(seen[0], json!(["loadfile", "https://cdn/ep.mp3"]));
        assert_eq!(seen[1], json!(["set_property", "volume", 50.0]));
        assert_eq!(seen[2], json!(["set_property", "pause", false]));
        assert_eq!(seen[3], json!(["set_property", "pause", true]));
        assert_eq!(seen[4], json!(["stop"]));
    }

    #[tokio::test]
    async fn test_pause_after_play_lands_after_the_whole_load() {
        let (client, server) = tokio::io::duplex(4096);
        let mpv = tokio::spawn(fake_mpv(server, 5, std::time::Duration::from_millis(20)));

        let (read_half, write_half) = tokio::io::split(client);
        let handle = start_io_tasks(BufReader::new(read_half), write_half);
        let mut player = Player::connected(handle, 0.7, None);
        assert!(player.is_available());

        player.load("https://cdn/ep.mp3");
        player.set_pause(true);
        player.stop();

        let seen = mpv.await.unwrap();
        assert_eq!(seen[0], json!(["loadfile", "https://cdn/ep.mp3"]));
        assert_eq!(seen[1][1], json!("volume"));
        assert_eq!(seen[2], json!(["set_property", "pause", false]));
        assert_eq!(seen[3], json!(["set_property", "pause", true]));
        assert_eq!(seen[4], json!(["stop"]));
        player.shutdown().await;
    }

    #[test]
    fn test_mpv_stderr_goes_to_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MpvDriver::new(0.5, dir.path());
        assert_eq!(driver.stderr_path(), dir.path().join("mpv-stderr.log"));
    }

    #[tokio::test]
    async fn test_disabled_player_is_inert() {
        let mut player = Player::disabled();
        assert!(!player.is_available());
        player.load("https://cdn/ep.mp3");
        player.set_pause(true);
        player.stop();
        player.shutdown().await;
    }
}
