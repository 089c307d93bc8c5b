//! Output channel for resolved values.
//!
//! Commands that compute a value (a resolved path, a CPU count) publish it
//! under a variable name through an [`EnvironmentSink`] handed to them,
//! instead of mutating ambient state directly.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::PipelineError;
use crate::Result;

/// Receives `name = value` assignments.
pub trait EnvironmentSink {
    /// Publishes `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfiguration` for names or values the
    /// channel cannot carry, and I/O errors from the channel.
    fn set(&self, name: &str, value: &str) -> Result<()>;
}

fn check_assignment(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || name.contains(['=', '\0', '\n', '\r']) {
        return Err(PipelineError::InvalidConfiguration {
            reason: format!("invalid variable name '{name}'"),
        });
    }
    if value.contains(['\0', '\n', '\r']) {
        return Err(PipelineError::InvalidConfiguration {
            reason: format!("value for {name} must be a single line"),
        });
    }
    Ok(())
}

/// Sets variables in the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSink for ProcessEnvironment {
    #[allow(unsafe_code)]
    fn set(&self, name: &str, value: &str) -> Result<()> {
        check_assignment(name, value)?;
        // SAFETY: the CLI is single-threaded when commands publish values;
        // no other thread reads or writes the environment concurrently.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }
}

/// Writes Azure Pipelines logging commands
/// (`##vso[task.setvariable variable=NAME]VALUE`) to a writer, usually
/// stdout.
#[derive(Debug)]
pub struct CiVariableProtocol<W> {
    out: Mutex<W>,
}

impl<W: Write> CiVariableProtocol<W> {
    /// Wraps `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write> EnvironmentSink for CiVariableProtocol<W> {
    fn set(&self, name: &str, value: &str) -> Result<()> {
        check_assignment(name, value)?;
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "##vso[task.setvariable variable={name}]{value}")?;
        out.flush()?;
        Ok(())
    }
}

/// Appends `NAME=VALUE` lines to a file, the GitHub Actions `GITHUB_ENV`
/// convention.
#[derive(Debug, Clone)]
pub struct AppendToFileProtocol {
    path: PathBuf,
}

impl AppendToFileProtocol {
    /// Targets `path`; the file is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EnvironmentSink for AppendToFileProtocol {
    fn set(&self, name: &str, value: &str) -> Result<()> {
        check_assignment(name, value)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{name}={value}")?;
        Ok(())
    }
}

/// Forwards each assignment to several sinks in order.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn EnvironmentSink>>,
}

impl FanOut {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: impl EnvironmentSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EnvironmentSink for FanOut {
    fn set(&self, name: &str, value: &str) -> Result<()> {
        for sink in &self.sinks {
            sink.set(name, value)?;
        }
        Ok(())
    }
}

/// Which sink a command publishes through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvSinkKind {
    /// Process environment plus the CI channel detected from the
    /// environment: the `GITHUB_ENV` file when set, Azure logging commands
    /// on stdout otherwise.
    #[default]
    Auto,
    /// Process environment only.
    Process,
    /// Azure logging commands on stdout only.
    Ci,
    /// `NAME=VALUE` lines appended to the given file only.
    File(PathBuf),
}

impl EnvSinkKind {
    /// Builds the sink. `github_env` is the value of `GITHUB_ENV`, consulted
    /// only by `Auto`. With `stdout_reserved` set (machine-readable output
    /// owns stdout), `Auto` leaves out the stdout logging commands.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfiguration` for `Ci` while stdout is
    /// reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipekit_core::env_sink::EnvSinkKind;
    /// use pipekit_core::env_sink::EnvironmentSink;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let env_file = dir.path().join("env");
    /// let sink = EnvSinkKind::File(env_file.clone()).build(None, false)?;
    /// sink.set("TOOL_HOME", "/opt/tool")?;
    /// assert_eq!(std::fs::read_to_string(env_file)?, "TOOL_HOME=/opt/tool\n");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build(
        &self,
        github_env: Option<PathBuf>,
        stdout_reserved: bool,
    ) -> Result<Box<dyn EnvironmentSink>> {
        let sink: Box<dyn EnvironmentSink> = match self {
            Self::Process => Box::new(ProcessEnvironment),
            Self::Ci if stdout_reserved => {
                return Err(PipelineError::InvalidConfiguration {
                    reason: "logging commands on stdout would mix with JSON output".into(),
                });
            }
            Self::Ci => Box::new(CiVariableProtocol::new(std::io::stdout())),
            Self::File(path) => Box::new(AppendToFileProtocol::new(path.clone())),
            Self::Auto => {
                let fan_out = FanOut::new().with(ProcessEnvironment);
                match github_env.filter(|p| !p.as_os_str().is_empty()) {
                    Some(path) => Box::new(fan_out.with(AppendToFileProtocol::new(path))),
                    None if stdout_reserved => Box::new(fan_out),
                    None => Box::new(fan_out.with(CiVariableProtocol::new(std::io::stdout()))),
                }
            }
        };
        Ok(sink)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ci_protocol_format() {
        let sink = CiVariableProtocol::new(Vec::new());
        sink.set("OUT_DIR", "/build/out").unwrap();
        sink.set("COUNT", "8").unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "##vso[task.setvariable variable=OUT_DIR]/build/out\n##vso[task.setvariable variable=COUNT]8\n"
        );
    }

    #[test]
    fn test_append_to_file_protocol() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("github_env");
        let sink = AppendToFileProtocol::new(&path);
        sink.set("A", "1").unwrap();
        sink.set("B", "two words").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\nB=two words\n");
    }

    #[test]
    fn test_process_environment() {
        ProcessEnvironment
            .set("PIPEKIT_ENV_SINK_TEST", "value")
            .unwrap();
        assert_eq!(std::env::var("PIPEKIT_ENV_SINK_TEST").unwrap(), "value");
    }

    #[test]
    fn test_rejects_multiline_and_bad_names() {
        let sink = CiVariableProtocol::new(Vec::new());
        assert!(sink.set("", "x").is_err());
        assert!(sink.set("A=B", "x").is_err());
        assert!(sink.set("A", "line\nbreak").is_err());
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_auto_prefers_github_env_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("env");
        let sink = EnvSinkKind::Auto.build(Some(path.clone()), false).unwrap();
        sink.set("PIPEKIT_AUTO_SINK_TEST", "v").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "PIPEKIT_AUTO_SINK_TEST=v\n"
        );
        assert_eq!(std::env::var("PIPEKIT_AUTO_SINK_TEST").unwrap(), "v");
    }

    #[test]
    fn test_ci_rejected_when_stdout_reserved() {
        let err = EnvSinkKind::Ci.build(None, true).err().unwrap();
        assert!(matches!(err, PipelineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_auto_with_stdout_reserved_still_sets_process_env() {
        let sink = EnvSinkKind::Auto.build(None, true).unwrap();
        sink.set("PIPEKIT_RESERVED_SINK_TEST", "v").unwrap();
        assert_eq!(std::env::var("PIPEKIT_RESERVED_SINK_TEST").unwrap(), "v");
    }
}
