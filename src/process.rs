use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{VoiceError, VoiceResult};

/// Poll interval for the child's exit status while a deadline is armed.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long to wait for the reader threads once the child is gone.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(100);

#[must_use]
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

pub fn run_command(program: &str, args: &[String]) -> VoiceResult<Output> {
    run_command_with_timeout(program, args, None)
}

/// Run a subprocess with piped stdio and an optional hard deadline.
///
/// Stdout and stderr are drained on dedicated threads so a chatty child can
/// never deadlock against a full pipe. On deadline the child is killed and
/// reaped, and whatever stderr was captured rides along in the error.
pub fn run_command_with_timeout(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> VoiceResult<Output> {
    if !command_exists(program) {
        return Err(VoiceError::ExtractorMissing {
            command: program.to_owned(),
        });
    }

    let rendered = format!("{} {}", program, args.join(" "));
    let mut command = Command::new(program);
    command.args(args);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let Some(limit) = timeout else {
        let output = command.output()?;
        return validate_command_output(&rendered, output);
    };

    let mut child = command.spawn()?;
    let started_at = Instant::now();

    let stdout_rx = drain_on_thread(child.stdout.take().expect("stdout piped"));
    let stderr_rx = drain_on_thread(child.stderr.take().expect("stderr piped"));

    loop {
        if let Some(status) = child.try_wait()? {
            let output = Output {
                status,
                stdout: collect_drained(&stdout_rx),
                stderr: collect_drained(&stderr_rx),
            };
            return validate_command_output(&rendered, output);
        }

        if started_at.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            let stderr = String::from_utf8_lossy(&collect_drained(&stderr_rx)).into_owned();
            return Err(VoiceError::from_extractor_timeout(
                rendered,
                saturating_duration_ms(limit),
                stderr,
            ));
        }

        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

/// Read a child pipe to EOF on its own thread; the buffer arrives on the
/// returned channel when the pipe closes.
fn drain_on_thread(mut pipe: impl Read + Send + 'static) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        let _ = tx.send(buffer);
    });
    rx
}

/// Whatever a reader thread captured, or empty if the pipe is still held open
/// (a grandchild inheriting the descriptor) past the grace window.
fn collect_drained(rx: &mpsc::Receiver<Vec<u8>>) -> Vec<u8> {
    rx.recv_timeout(PIPE_DRAIN_GRACE).unwrap_or_default()
}

fn validate_command_output(rendered: &str, output: Output) -> VoiceResult<Output> {
    if output.status.success() {
        return Ok(output);
    }

    let status = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(VoiceError::from_extractor_failure(
        rendered.to_owned(),
        status,
        stderr,
    ))
}

fn saturating_duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
