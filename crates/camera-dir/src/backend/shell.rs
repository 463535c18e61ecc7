//! Elevated-privilege shell backend.
//!
//! Every logical operation is one `<program> -c '<command>'` invocation.
//! Exit status 0 is success; any other status, or failing to launch the
//! helper at all, is a failure carrying the captured stdout+stderr. There is
//! no cancellation once a command is running, so a hung helper blocks the
//! caller unless a timeout is configured. On unix the helper runs in its own
//! process group and a timeout kills the whole group, including whatever the
//! helper forked.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::{BackendError, StorageBackend};

const DEFAULT_PROGRAM: &str = "su";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Quote a path for interpolation into a POSIX shell command.
///
/// The whole path is wrapped in single quotes and every embedded `'` becomes
/// `'\''`, so no path can close the quoting early.
pub fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

#[derive(Debug, Clone)]
pub struct PrivilegedShellBackend {
    program: String,
    timeout: Option<Duration>,
}

impl Default for PrivilegedShellBackend {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[derive(Debug)]
struct ShellOutput {
    stdout: Vec<u8>,
    /// Combined stdout+stderr, or the command itself when both were empty.
    combined: String,
    streamed: u64,
}

impl PrivilegedShellBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run one command and return its combined output.
    pub fn run(&self, command: &str) -> Result<String, BackendError> {
        self.execute(command, None).map(|out| out.combined)
    }

    /// Run a command that prints `yes` or `no`.
    fn ask(&self, condition: &str) -> Result<bool, BackendError> {
        let out = self.execute(&format!("if {condition}; then echo yes; else echo no; fi"), None)?;
        Ok(String::from_utf8_lossy(&out.stdout).trim() == "yes")
    }

    fn execute(
        &self,
        command: &str,
        input: Option<&mut dyn Read>,
    ) -> Result<ShellOutput, BackendError> {
        debug!(program = %self.program, command, "Running privileged command");

        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(command)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

        let mut child = cmd
            .spawn()
            .map_err(|source| BackendError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let stdin = child.stdin.take();

        let child = Arc::new(Mutex::new(child));
        let watchdog = self
            .timeout
            .map(|limit| Watchdog::arm(Arc::clone(&child), limit));

        let mut streamed = 0;
        let mut stream_error = None;
        if let (Some(source), Some(mut stdin)) = (input, stdin) {
            match io::copy(source, &mut stdin) {
                Ok(n) => streamed = n,
                Err(e) => stream_error = Some(e),
            }
        }

        let status = wait_for(&child);
        if let Some(limit) = watchdog.and_then(Watchdog::disarm) {
            // Grandchildren may still hold the pipes; the drain threads are left detached.
            warn!(program = %self.program, command, "Privileged command timed out");
            return Err(BackendError::TimedOut(limit));
        }
        let stdout = collect(stdout);
        let stderr = collect(stderr);
        let status = status?;

        let mut combined = String::from_utf8_lossy(&stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&stderr));
        let combined = match combined.trim() {
            "" => command.to_string(),
            text => text.to_string(),
        };

        if !status.success() {
            return Err(BackendError::CommandFailed {
                status: describe(status),
                output: combined,
            });
        }
        if let Some(e) = stream_error {
            return Err(BackendError::Io {
                op: "stream",
                path: self.program.clone().into(),
                source: e,
            });
        }

        Ok(ShellOutput {
            stdout,
            combined,
            streamed,
        })
    }
}

impl StorageBackend for PrivilegedShellBackend {
    fn name(&self) -> &'static str {
        "privileged-shell"
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), BackendError> {
        self.run(&format!("mkdir -p {}", shell_quote(path))).map(|_| ())
    }

    fn exists(&self, path: &Path) -> Result<bool, BackendError> {
        self.ask(&format!("[ -e {} ]", shell_quote(path)))
    }

    fn is_non_empty_dir(&self, path: &Path) -> Result<bool, BackendError> {
        self.ask(&format!(
            "[ -n \"$(ls -A {} 2>/dev/null)\" ]",
            shell_quote(path)
        ))
    }

    fn touch(&self, path: &Path) -> Result<(), BackendError> {
        self.run(&format!("touch {}", shell_quote(path))).map(|_| ())
    }

    fn remove(&self, path: &Path) -> Result<(), BackendError> {
        self.run(&format!("rm -f {}", shell_quote(path))).map(|_| ())
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<(), BackendError> {
        self.run(&format!("cp {} {}", shell_quote(source), shell_quote(dest)))
            .map(|_| ())
    }

    fn write_stream(&self, source: &mut dyn Read, dest: &Path) -> Result<u64, BackendError> {
        let out = self
            .execute(&format!("cat > {}", shell_quote(dest)), Some(source))
            .map_err(|e| match e {
                BackendError::Io { op, source, .. } => BackendError::Io {
                    op,
                    path: dest.to_path_buf(),
                    source,
                },
                other => other,
            })?;
        Ok(out.streamed)
    }

    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
        if !self.exists(path)? {
            return Ok(None);
        }
        let out = self.execute(&format!("cat {}", shell_quote(path)), None)?;
        Ok(Some(out.stdout))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), BackendError> {
        self.run(&format!("mv -f {} {}", shell_quote(from), shell_quote(to)))
            .map(|_| ())
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn wait_for(child: &Mutex<Child>) -> Result<ExitStatus, BackendError> {
    loop {
        {
            let mut guard = child.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(status) = guard.try_wait().map_err(BackendError::Wait)? {
                return Ok(status);
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// SIGKILL the process group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: u32) {
    if let Ok(pid) = libc::pid_t::try_from(pid) {
        // SAFETY: kill(2) only sends a signal; a negative pid addresses the group.
        unsafe {
            libc::kill(-pid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

/// Kills the child, and on unix its process group, if it outlives `limit`.
struct Watchdog {
    limit: Duration,
    cancel: mpsc::Sender<()>,
    handle: JoinHandle<bool>,
}

impl Watchdog {
    fn arm(child: Arc<Mutex<Child>>, limit: Duration) -> Self {
        let (cancel, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || match rx.recv_timeout(limit) {
            Err(RecvTimeoutError::Timeout) => {
                let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
                if matches!(child.try_wait(), Ok(Some(_))) {
                    return false;
                }
                kill_group(child.id());
                let _ = child.kill();
                true
            }
            _ => false,
        });
        Self {
            limit,
            cancel,
            handle,
        }
    }

    /// Returns the limit if the watchdog fired.
    fn disarm(self) -> Option<Duration> {
        let _ = self.cancel.send(());
        match self.handle.join() {
            Ok(true) => Some(self.limit),
            _ => None,
        }
    }
}
