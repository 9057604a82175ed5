//! Privilege context for writes to root-owned files
//!
//! Elevation is resolved once, on the first privileged operation:
//!
//! 1. running as root, or elevation disabled → run directly
//! 2. `sudo -n true` succeeds → passwordless sudo
//! 3. otherwise ask for the password once (masked) and keep it for the
//!    lifetime of the context
//!
//! Privileged operations are serialized.

use crate::error::{HostsError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};

/// How privileged commands are run
#[derive(Clone, PartialEq, Eq)]
pub enum Elevation {
    Direct,
    Passwordless,
    Password(String),
}

impl std::fmt::Debug for Elevation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Elevation::Direct => f.write_str("Direct"),
            Elevation::Passwordless => f.write_str("Passwordless"),
            Elevation::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// Source of the sudo password
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    async fn ask(&self, message: &str) -> Result<String>;
}

/// Masked prompt on the controlling terminal
pub struct TerminalPrompt;

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn ask(&self, message: &str) -> Result<String> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || read_masked(&message))
            .await
            .map_err(|e| HostsError::Terminal(e.to_string()))?
    }
}

fn read_masked(message: &str) -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
    use crossterm::terminal;
    use std::io::Write;

    eprint!("{}", message);
    std::io::stderr().flush()?;

    terminal::enable_raw_mode().map_err(|e| HostsError::Terminal(e.to_string()))?;

    let mut password = String::new();
    let outcome = loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => break Err(HostsError::Terminal(e.to_string())),
        };
        let Event::Key(key) = event else { continue };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        match key.code {
            KeyCode::Enter => break Ok(()),
            KeyCode::Esc => break Err(HostsError::PromptCancelled),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                break Err(HostsError::PromptCancelled);
            }
            KeyCode::Backspace => {
                if password.pop().is_some() {
                    eprint!("\x08 \x08");
                }
            }
            KeyCode::Char(ch) => {
                password.push(ch);
                eprint!("*");
            }
            _ => {}
        }
        let _ = std::io::stderr().flush();
    };

    let _ = terminal::disable_raw_mode();
    eprintln!();

    outcome.map(|()| password)
}

/// Captured output of a privileged command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub struct PrivilegeContext {
    enabled: bool,
    root: bool,
    sudo: String,
    prompt: Box<dyn CredentialPrompt>,
    elevation: OnceCell<Elevation>,
    lock: Mutex<()>,
}

impl PrivilegeContext {
    pub fn new(prompt: Box<dyn CredentialPrompt>) -> Self {
        Self {
            enabled: true,
            root: is_root(),
            sudo: "sudo".to_string(),
            prompt,
            elevation: OnceCell::new(),
            lock: Mutex::new(()),
        }
    }

    /// Context that never elevates (`--no-sudo`)
    pub fn unprivileged() -> Self {
        let mut ctx = Self::new(Box::new(TerminalPrompt));
        ctx.enabled = false;
        ctx
    }

    pub fn with_sudo_program(mut self, program: impl Into<String>) -> Self {
        self.sudo = program.into();
        self
    }

    /// Resolved elevation. The prompt is shown at most once.
    pub async fn elevation(&self) -> Result<&Elevation> {
        self.elevation.get_or_try_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> Result<Elevation> {
        if !self.enabled || self.root {
            tracing::debug!("Running privileged commands directly");
            return Ok(Elevation::Direct);
        }

        let probe = Command::new(&self.sudo)
            .args(["-n", "true"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        if probe.success() {
            tracing::debug!("Passwordless sudo available");
            return Ok(Elevation::Passwordless);
        }

        let password = self.prompt.ask("[sudo] password: ").await?;
        let check = run_with_input(
            &self.sudo,
            &["-S", "-p", "", "-v"],
            Some(format!("{}\n", password).as_bytes()),
        )
        .await?;
        if !check.0 {
            return Err(HostsError::PrivilegeDenied(check.1.stderr.trim().to_string()));
        }

        tracing::debug!("sudo password accepted");
        Ok(Elevation::Password(password))
    }

    /// Run `program args` with elevated privileges, feeding `input` on stdin.
    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        input: Option<&[u8]>,
    ) -> Result<CommandOutput> {
        let _guard = self.lock.lock().await;
        let elevation = self.elevation().await?;

        let (ok, output) = match elevation {
            Elevation::Direct => run_with_input(program, args, input).await?,
            Elevation::Passwordless => {
                let mut full = vec!["-n", program];
                full.extend_from_slice(args);
                run_with_input(&self.sudo, &full, input).await?
            }
            Elevation::Password(password) => {
                // -k: ignore the cached ticket so sudo always consumes the password line
                let mut full = vec!["-S", "-k", "-p", "", program];
                full.extend_from_slice(args);
                let mut stdin = format!("{}\n", password).into_bytes();
                if let Some(input) = input {
                    stdin.extend_from_slice(input);
                }
                run_with_input(&self.sudo, &full, Some(&stdin)).await?
            }
        };

        if !ok {
            return Err(HostsError::CommandFailed {
                program: program.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

async fn run_with_input(
    program: &str,
    args: &[&str],
    input: Option<&[u8]>,
) -> Result<(bool, CommandOutput)> {
    tracing::debug!("Running: {} {}", program, args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        match stdin.write_all(input).await {
            Ok(()) => {}
            // the child exited without reading; its status tells the story
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e.into()),
        }
        // close stdin so the child sees EOF
        drop(stdin);
    }

    let output = child.wait_with_output().await?;
    Ok((
        output.status.success(),
        CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
    ))
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}
