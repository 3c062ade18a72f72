//! Scoped ssh-agent sessions

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment variable ssh clients read the agent socket from
pub const AUTH_SOCK_ENV: &str = "SSH_AUTH_SOCK";

const SOCKET_PATTERN: &str = r"SSH_AUTH_SOCK=(.*?);";
const PID_PATTERN: &str = r"SSH_AGENT_PID=(\d+);";

/// Options for starting an agent session
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Agent executable
    pub agent_program: String,

    /// Identity loader executable
    pub add_program: String,

    /// Directory for the agent socket; ssh-agent picks one when `None`
    pub socket_dir: Option<Utf8PathBuf>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            agent_program: "ssh-agent".to_string(),
            add_program: "ssh-add".to_string(),
            socket_dir: None,
        }
    }
}

/// Reference to a running agent's socket.
///
/// Handed to each git child process as an environment override. The process
/// environment of repomirror itself is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSocket {
    path: Utf8PathBuf,
}

impl AgentSocket {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Point `cmd` at this agent
    pub fn apply(&self, cmd: &mut Command) {
        cmd.env(AUTH_SOCK_ENV, self.path.as_str());
    }
}

/// An isolated ssh-agent process owned for the length of a run.
///
/// The agent receives `SIGHUP` on [`close`](Self::close) or, failing that,
/// when the session is dropped, so every exit path releases the credential.
#[derive(Debug)]
pub struct AgentSession {
    socket: AgentSocket,
    pid: i32,
    add_program: String,
    closed: bool,
}

impl AgentSession {
    /// Start an agent and capture its socket path and pid
    pub async fn open(options: &AgentOptions) -> Result<Self> {
        let mut cmd = Command::new(&options.agent_program);
        cmd.arg("-s");

        if let Some(dir) = &options.socket_dir {
            cmd.arg("-a").arg(socket_path_in(dir).as_str());
        }

        debug!("Running: {} -s", options.agent_program);
        let output = cmd
            .output()
            .await
            .map_err(|e| Error::agent_startup(format!("{}: {}", options.agent_program, e)))?;

        // An agent that announced its pid is stopped again if startup fails afterwards
        let stdout = String::from_utf8_lossy(&output.stdout);
        let pid = parse_agent_pid(&stdout);

        if !output.status.success() {
            abandon(pid.as_ref().ok().copied());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::agent_startup(stderr.trim().to_string()));
        }

        let pid = pid?;
        let socket = parse_agent_socket(&stdout).inspect_err(|_| abandon(Some(pid)))?;

        info!("ssh-agent started (pid {})", pid);
        Ok(Self {
            socket: AgentSocket::new(socket),
            pid,
            add_program: options.add_program.clone(),
            closed: false,
        })
    }

    /// Load a private key into this agent only
    pub async fn add_identity(&self, identity: &Utf8Path) -> Result<()> {
        info!("Adding identity: {}", identity);

        let mut cmd = Command::new(&self.add_program);
        cmd.arg(identity.as_str());
        self.socket.apply(&mut cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::identity_add(identity.as_str(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::identity_add(identity.as_str(), stderr.trim()));
        }

        Ok(())
    }

    pub fn socket(&self) -> &AgentSocket {
        &self.socket
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Terminate the agent. Consumes the session, so the socket cannot be used afterwards.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        terminate(self.pid)
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = terminate(self.pid) {
            warn!("{}", e);
        }
    }
}

/// Send SIGHUP to the agent. An already exited agent is not an error.
fn terminate(pid: i32) -> Result<()> {
    debug!("Stopping ssh-agent (pid {})", pid);

    // SAFETY: kill(2) has no memory-safety preconditions
    let rc = unsafe { libc::kill(pid, libc::SIGHUP) };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        return Ok(());
    }
    Err(Error::AgentShutdown {
        pid,
        message: err.to_string(),
    })
}

/// Stop an agent whose startup failed part way
fn abandon(pid: Option<i32>) {
    if let Some(pid) = pid {
        if let Err(e) = terminate(pid) {
            warn!("{}", e);
        }
    }
}

/// Extract the socket path and pid from ssh-agent's shell output
pub fn parse_agent_output(output: &str) -> Result<(Utf8PathBuf, i32)> {
    let socket = parse_agent_socket(output)?;
    let pid = parse_agent_pid(output)?;
    Ok((socket, pid))
}

fn parse_agent_socket(output: &str) -> Result<Utf8PathBuf> {
    let socket_re = Regex::new(SOCKET_PATTERN)?;
    socket_re
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(Utf8PathBuf::from)
        .ok_or_else(|| Error::agent_startup("SSH_AUTH_SOCK not found in agent output"))
}

fn parse_agent_pid(output: &str) -> Result<i32> {
    let pid_re = Regex::new(PID_PATTERN)?;
    pid_re
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .filter(|pid| *pid > 0)
        .ok_or_else(|| Error::agent_startup("SSH_AGENT_PID not found in agent output"))
}

/// `<dir>/agent.sock.<unix-seconds>`
fn socket_path_in(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(format!("agent.sock.{}", chrono::Utc::now().timestamp()))
}
