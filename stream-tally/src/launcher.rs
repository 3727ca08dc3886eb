use std::{io, process::Stdio, sync::Arc};

use tokio::{
    fs::File,
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    task::JoinHandle,
    time::{Duration, sleep},
};
use tracing::{debug, info, warn};

use crate::{
    controller::Controller,
    error::{Error, Result},
    workspace::Workspace,
};

const CHUNK_SIZE: usize = 8 * 1024;
const SHUTDOWN_CHECK: Duration = Duration::from_millis(200);

fn script_command(ws: &Workspace) -> Command {
    let mut cmd = Command::new("bash");
    cmd.arg(ws.script_file_name())
        .current_dir(&ws.scripts_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn check_stderr(stderr: &[u8]) -> Result<()> {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        Ok(())
    } else {
        Err(Error::Script {
            stderr: stderr.to_string(),
        })
    }
}

/// Runs the script to completion and returns its stdout lines.
pub async fn run_to_completion(ws: &Workspace) -> Result<Vec<String>> {
    info!(script = %ws.script.display(), "running script");
    let output = script_command(ws).output().await?;
    check_stderr(&output.stderr)?;
    if !output.status.success() {
        warn!(status = %output.status, "script exited unsuccessfully");
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim_end().lines().map(str::to_string).collect())
}

/// Copies the script's stdout into the stream file until it exits or a
/// shutdown is requested. Marks the producer done either way.
pub async fn stream_to_file(ws: Workspace, controller: Arc<Controller>) -> Result<()> {
    let result = copy_stream(&ws, &controller).await;
    controller.mark_producer_done();
    controller.announce("Streaming terminated");
    result
}

async fn copy_stream(ws: &Workspace, controller: &Controller) -> Result<()> {
    let mut out = File::create(&ws.stream_file).await?;
    let mut child = script_command(ws).spawn()?;
    info!(script = %ws.script.display(), pid = ?child.id(), "streaming script output");

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("script stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("script stderr was not captured"))?;
    let stderr_handle = collect(stderr);

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0usize;
    loop {
        if controller.shutdown_requested() {
            stop(&mut child).await;
            // Grandchildren may still hold stderr open.
            stderr_handle.abort();
            return Ok(());
        }
        tokio::select! {
            read = stdout.read(&mut buf) => match read? {
                0 => break,
                n => {
                    out.write_all(&buf[..n]).await?;
                    out.flush().await?;
                    copied += n;
                }
            },
            _ = sleep(SHUTDOWN_CHECK) => {}
        }
    }

    let status = child.wait().await?;
    debug!(%status, bytes = copied, "script finished");
    check_stderr(&stderr_handle.await??)
}

fn collect<R>(mut reader: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

async fn stop(child: &mut Child) {
    info!("shutdown requested, stopping script");
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill script");
    }
}
