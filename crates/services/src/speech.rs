//! Optional speech-to-text and text-to-speech.
//!
//! Availability is checked once at startup. When a capability is missing the
//! UI hides the matching control instead of disabling it.

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use shared::settings::SpeechSettings;
use shared::{MessageId, Result, VizionError};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::runtime::Handle;

/// Placeholder replaced by the configured locale in recognizer arguments
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Speech-to-text engine
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// One non-continuous pass. Resolves with the first final transcript, or
    /// `None` when nothing was recognized.
    async fn recognize(&self, locale: &str) -> Result<Option<String>>;
}

/// Text-to-speech engine
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Resolves when the utterance has finished. Dropping the future stops it.
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Speech engines present on this host
#[derive(Clone, Default)]
pub struct SpeechCapabilities {
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl SpeechCapabilities {
    pub fn none() -> Self {
        Self::default()
    }

    /// Check the host once.
    pub fn detect(settings: &SpeechSettings) -> Self {
        if !settings.enabled {
            tracing::info!("speech disabled in settings");
            return Self::none();
        }

        let synthesizer = CommandSynthesizer::detect()
            .map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>);
        let recognizer = CommandRecognizer::from_argv(&settings.recognizer_command)
            .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>);

        tracing::info!(
            synthesizer = synthesizer.as_ref().map(|s| s.name()).unwrap_or("none"),
            recognizer = recognizer.as_ref().map(|r| r.name()).unwrap_or("none"),
            "speech capabilities detected"
        );

        Self {
            recognizer,
            synthesizer,
        }
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }
}

/// Look up an executable by name on PATH, or check an explicit path.
pub fn find_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Speaks through a host TTS program that reads the text on stdin.
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// First TTS program available for this platform.
    pub fn detect() -> Option<Self> {
        let candidates: Vec<(&str, Vec<&str>)> = if cfg!(target_os = "macos") {
            vec![("say", vec![])]
        } else if cfg!(windows) {
            vec![(
                "powershell",
                vec![
                    "-NoProfile",
                    "-Command",
                    "Add-Type -AssemblyName System.Speech; \
                     (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak([Console]::In.ReadToEnd())",
                ],
            )]
        } else {
            vec![("espeak-ng", vec!["--stdin"]), ("espeak", vec!["--stdin"])]
        };

        candidates
            .into_iter()
            .find(|(program, _)| find_program(program).is_some())
            .map(|(program, args)| Self::new(program, &args))
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn speak(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(VizionError::Speech(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Runs a user-configured recognizer and reads the transcript from stdout.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Build from a configured argv; `None` when empty or not installed.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if find_program(program).is_none() {
            tracing::warn!(program = %program, "configured speech recognizer not found");
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn recognize(&self, locale: &str) -> Result<Option<String>> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(LOCALE_PLACEHOLDER, locale))
            .collect();

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(VizionError::Speech(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }
}

/// What the speech controls should currently show
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpeechState {
    pub listening: bool,
    pub speaking: Option<MessageId>,
}

struct Utterance {
    id: MessageId,
    token: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct SpeechInner {
    listening: bool,
    current: Option<Utterance>,
    next_token: u64,
}

impl SpeechInner {
    fn cancel_current(&mut self) {
        if let Some(utterance) = self.current.take() {
            utterance.abort.abort();
        }
    }
}

/// Tracks the single recognition pass and the single audible utterance.
#[derive(Clone)]
pub struct SpeechController {
    capabilities: SpeechCapabilities,
    locale: String,
    runtime: Handle,
    inner: Arc<Mutex<SpeechInner>>,
}

impl SpeechController {
    pub fn new(capabilities: SpeechCapabilities, locale: impl Into<String>, runtime: Handle) -> Self {
        Self {
            capabilities,
            locale: locale.into(),
            runtime,
            inner: Arc::new(Mutex::new(SpeechInner::default())),
        }
    }

    pub fn capabilities(&self) -> &SpeechCapabilities {
        &self.capabilities
    }

    pub fn state(&self) -> SpeechState {
        let inner = self.inner.lock();
        SpeechState {
            listening: inner.listening,
            speaking: inner.current.as_ref().map(|u| u.id),
        }
    }

    pub fn listening(&self) -> bool {
        self.inner.lock().listening
    }

    pub fn speaking(&self) -> Option<MessageId> {
        self.inner.lock().current.as_ref().map(|u| u.id)
    }

    /// Run one recognition pass. Returns `None` if recognition is unavailable,
    /// already running, failed, or heard nothing.
    pub async fn listen(&self) -> Option<String> {
        let recognizer = self.capabilities.recognizer.clone()?;
        {
            let mut inner = self.inner.lock();
            if inner.listening {
                return None;
            }
            inner.listening = true;
        }
        let _reset = ListeningReset {
            inner: self.inner.clone(),
        };

        match recognizer.recognize(&self.locale).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(recognizer = recognizer.name(), "speech recognition error: {}", e);
                None
            }
        }
    }

    /// Read a message aloud, or stop it if it is the one already playing.
    ///
    /// Returns whether `id` is speaking afterwards.
    pub fn toggle_speak(&self, id: MessageId, text: &str) -> bool {
        let mut inner = self.inner.lock();

        if inner.current.as_ref().map(|u| u.id) == Some(id) {
            inner.cancel_current();
            return false;
        }
        inner.cancel_current();

        let Some(synthesizer) = self.capabilities.synthesizer.clone() else {
            return false;
        };

        let token = inner.next_token;
        inner.next_token += 1;
        let (abort, registration) = AbortHandle::new_pair();
        inner.current = Some(Utterance { id, token, abort });

        let shared = self.inner.clone();
        let text = text.to_string();
        self.runtime.spawn(async move {
            let result = Abortable::new(synthesizer.speak(&text), registration).await;
            if let Ok(Err(e)) = result {
                tracing::warn!(synthesizer = synthesizer.name(), "speech synthesis error: {}", e);
            }

            let mut inner = shared.lock();
            if inner.current.as_ref().map(|u| u.token) == Some(token) {
                inner.current = None;
            }
        });

        true
    }

    /// Silence whatever is playing.
    pub fn stop(&self) {
        self.inner.lock().cancel_current();
    }
}

struct ListeningReset {
    inner: Arc<Mutex<SpeechInner>>,
}

impl Drop for ListeningReset {
    fn drop(&mut self) {
        self.inner.lock().listening = false;
    }
}
