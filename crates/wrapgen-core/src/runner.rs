//! Generator subprocess runner.
//!
//! Spawns the external generator once per unit with a fully built argument
//! vector, waits for it with a timeout, and checks that the single declared
//! output was written.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::args::GeneratorMode;
use crate::error::GenerationError;
use crate::plan::Invocation;

/// Environment variable overriding the generator executable.
pub const GENERATOR_ENV: &str = "WRAPGEN_GENERATOR";

/// Default timeout for one generator run (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// How long to keep collecting stderr after the generator exits. A background
/// process that inherited the pipe can hold it open indefinitely.
const STDERR_GRACE: Duration = Duration::from_secs(2);

/// Executable names searched for in `PATH`, in order.
const GENERATOR_NAMES: &[&str] = &["swig", "swig4.0", "swig3.0"];

/// Configuration for the generator runner.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Explicit generator executable (path or bare name).
    pub executable: Option<PathBuf>,
    /// Arguments placed before the generated argument vector, e.g. a
    /// launcher's own flags.
    pub prefix_args: Vec<OsString>,
    /// Target language mode.
    pub mode: GeneratorMode,
    /// Timeout for one generator run.
    pub timeout: Duration,
    /// Whether to capture the generator's stderr.
    pub capture_stderr: bool,
    /// Working directory for the subprocess.
    pub working_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            executable: None,
            prefix_args: Vec::new(),
            mode: GeneratorMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_stderr: true,
            working_dir: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a config pointing at the given executable.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(executable.into()),
            ..Default::default()
        }
    }

    /// Appends a prefix argument.
    pub fn prefix_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.prefix_args.push(arg.into());
        self
    }

    /// Sets the generator mode.
    pub fn mode(mut self, mode: GeneratorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the subprocess working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Runs the generator for planned invocations.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: GeneratorConfig,
}

impl Runner {
    /// Creates a runner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the given configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Finds the generator executable.
    ///
    /// An explicitly configured executable must resolve; otherwise
    /// `WRAPGEN_GENERATOR` is consulted, then `PATH`.
    pub fn find_generator(&self) -> Result<PathBuf, GenerationError> {
        if let Some(ref executable) = self.config.executable {
            return resolve_executable(executable).ok_or(GenerationError::GeneratorNotFound);
        }

        if let Some(path) = std::env::var_os(GENERATOR_ENV) {
            let path = PathBuf::from(path);
            return resolve_executable(&path).ok_or(GenerationError::GeneratorNotFound);
        }

        GENERATOR_NAMES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(GenerationError::GeneratorNotFound)
    }

    /// Runs the generator for one invocation and returns the generated file.
    pub fn run(&self, invocation: &Invocation) -> Result<PathBuf, GenerationError> {
        let executable = self.find_generator()?;
        let output = invocation.output();
        let resolved = match self.config.working_dir {
            Some(ref cwd) => cwd.join(output),
            None => output.to_path_buf(),
        };

        prepare_output(&resolved)?;

        let mut cmd = Command::new(&executable);
        cmd.args(&self.config.prefix_args)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        if self.config.capture_stderr {
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stderr(Stdio::inherit());
        }
        if let Some(ref cwd) = self.config.working_dir {
            cmd.current_dir(cwd);
        }

        tracing::debug!(
            unit = %invocation.unit(),
            executable = %executable.display(),
            args = ?invocation.args(),
            inputs = invocation.declared_inputs().len(),
            "spawning generator"
        );

        let start = Instant::now();
        let child = cmd.spawn().map_err(|source| GenerationError::SpawnFailed {
            executable: executable.clone(),
            source,
        })?;

        let (status, stderr) = wait_with_timeout(child, self.config.timeout)?;

        if !status.success() {
            return Err(failure_from_status(status, stderr));
        }

        if !resolved.is_file() {
            return Err(GenerationError::OutputMissing {
                path: output.to_path_buf(),
                stderr,
            });
        }

        tracing::info!(
            unit = %invocation.unit(),
            output = %output.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generated wrapper"
        );

        Ok(output.to_path_buf())
    }
}

fn resolve_executable(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    which::which(path).ok()
}

/// Creates the output directory and removes a stale output, so a generator
/// that exits cleanly without writing is caught.
fn prepare_output(output: &Path) -> Result<(), GenerationError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| GenerationError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match std::fs::remove_file(output) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GenerationError::OutputDir {
            path: output.to_path_buf(),
            source,
        }),
    }
}

/// Stderr collected by a background thread.
///
/// The buffer is shared so that whatever was read so far survives a reader
/// that never sees end-of-file.
struct StderrCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl StderrCapture {
    /// Drains stderr on a separate thread so a chatty generator cannot block
    /// on a full pipe while we poll for exit.
    fn spawn(child: &mut Child) -> Option<Self> {
        let mut stderr = child.stderr.take()?;
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();

        let shared = Arc::clone(&buf);
        std::thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            loop {
                match stderr.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => shared
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend_from_slice(&chunk[..n]),
                }
            }
            let _ = tx.send(());
        });

        Some(Self { buf, done })
    }

    /// Waits up to `grace` for end-of-file, then returns what was read.
    fn finish(self, grace: Duration) -> String {
        let _ = self.done.recv_timeout(grace);
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> Result<(ExitStatus, String), GenerationError> {
    let capture = StderrCapture::spawn(&mut child);
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GenerationError::Timeout {
                        timeout_secs: timeout.as_secs(),
                        stderr: drain(capture, Duration::from_millis(100)),
                    });
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(GenerationError::process_failed(-1, e.to_string())),
        }
    };

    Ok((status, drain(capture, STDERR_GRACE)))
}

fn drain(capture: Option<StderrCapture>, grace: Duration) -> String {
    capture.map(|c| c.finish(grace)).unwrap_or_default()
}

/// Builds the error for a non-zero exit. A generator killed by a signal has
/// no exit code; the signal is reported in the diagnostics instead.
fn failure_from_status(status: ExitStatus, stderr: String) -> GenerationError {
    if let Some(code) = status.code() {
        return GenerationError::process_failed(code, stderr);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            let note = format!("generator terminated by signal {}", signal);
            let stderr = if stderr.is_empty() {
                note
            } else {
                format!("{}\n{}", note, stderr)
            };
            return GenerationError::process_failed(-1, stderr);
        }
    }

    GenerationError::process_failed(-1, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = GeneratorConfig::with_executable("/opt/swig/bin/swig")
            .mode(GeneratorMode::Java)
            .timeout_secs(30)
            .working_dir("/tmp");

        assert_eq!(config.executable, Some(PathBuf::from("/opt/swig/bin/swig")));
        assert_eq!(config.mode, GeneratorMode::Java);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.working_dir, Some(PathBuf::from("/tmp")));
        assert!(config.capture_stderr);
    }

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.executable, None);
        assert!(config.prefix_args.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_explicit_executable_must_exist() {
        let runner = Runner::with_config(GeneratorConfig::with_executable(
            "/this/generator/does/not/exist",
        ));
        assert!(matches!(
            runner.find_generator(),
            Err(GenerationError::GeneratorNotFound)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_bare_name_is_looked_up_in_path() {
        let runner = Runner::with_config(GeneratorConfig::with_executable("sh"));
        let path = runner.find_generator().unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_prepare_output_removes_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("unit_wrap.cc");

        prepare_output(&output).unwrap();
        assert!(output.parent().unwrap().is_dir());

        std::fs::write(&output, "stale").unwrap();
        prepare_output(&output).unwrap();
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_captures_stderr() {
        let child = Command::new("sh")
            .args(["-c", "echo hello 1>&2; exit 3"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(5)).unwrap();
        assert_eq!(status.code(), Some(3));
        assert!(stderr.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_kills_slow_process() {
        let child = Command::new("sh")
            .args(["-c", "sleep 5"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let err = wait_with_timeout(child, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_keeps_partial_stderr() {
        let child = Command::new("sh")
            .args(["-c", "echo started 1>&2; sleep 5"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let err = wait_with_timeout(child, Duration::from_millis(300)).unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
        assert!(err.diagnostics().contains("started"));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_process_holding_stderr_does_not_block() {
        let child = Command::new("sh")
            .args(["-c", "echo done 1>&2; sleep 10 & exit 0"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let start = Instant::now();
        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(30)).unwrap();
        assert!(status.success());
        assert!(stderr.contains("done"));
        assert!(start.elapsed() < Duration::from_secs(8));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_is_reported_in_diagnostics() {
        let child = Command::new("sh")
            .args(["-c", "echo dying 1>&2; kill -9 $$"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(5)).unwrap();
        assert_eq!(status.code(), None);

        let err = failure_from_status(status, stderr);
        assert_eq!(err.exit_code(), Some(-1));
        assert!(err.diagnostics().contains("signal 9"));
        assert!(err.diagnostics().contains("dying"));
    }
}
