use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use conversation_log::{export_file_name, Clock};
use crew_debugger::{SessionController, SessionEvent, SessionRejection, TurnOutcome};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::files::ArtifactPaths;

/// Line-oriented session host.
///
/// Replies go to `out`; warnings, failures and rejections go to `err`.
pub struct Repl<'a, O, E> {
    controller: &'a SessionController,
    paths: &'a ArtifactPaths,
    clock: Arc<dyn Clock>,
    export_dir: PathBuf,
    out: O,
    err: E,
}

impl<'a, O: Write, E: Write> Repl<'a, O, E> {
    pub fn new(
        controller: &'a SessionController,
        paths: &'a ArtifactPaths,
        clock: Arc<dyn Clock>,
        export_dir: impl Into<PathBuf>,
        out: O,
        err: E,
    ) -> Self {
        Self {
            controller,
            paths,
            clock,
            export_dir: export_dir.into(),
            out,
            err,
        }
    }

    /// Starts the session from disk, then serves lines until EOF or `/quit`.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        self.start()?;

        for line in input.lines() {
            let line = line?;
            match parse_slash_command(&line) {
                Some(SlashCommand::Quit) => break,
                Some(command) => self.handle_command(command)?,
                None if line.trim().is_empty() => {}
                None => self.turn(|controller, emit| controller.send_message(&line, emit))?,
            }
        }

        self.out.flush()?;
        self.err.flush()
    }

    fn start(&mut self) -> io::Result<()> {
        let artifacts = match self.paths.load() {
            Ok(artifacts) => artifacts,
            Err(error) => {
                writeln!(self.err, "{error}")?;
                return Ok(());
            }
        };

        writeln!(self.err, "Analyzing your CrewAI system...")?;
        self.turn(|controller, emit| controller.submit_artifacts(artifacts, emit))
    }

    fn handle_command(&mut self, command: SlashCommand) -> io::Result<()> {
        match command {
            SlashCommand::Help => writeln!(self.out, "{HELP_TEXT}"),
            SlashCommand::Retry => self.turn(|controller, emit| controller.retry_initial(emit)),
            SlashCommand::Export(path) => self.export(path),
            SlashCommand::Reset => {
                self.controller.reset();
                writeln!(self.err, "Session reset.")?;
                self.start()
            }
            SlashCommand::Unknown(name) => {
                writeln!(self.err, "Unknown command {name}. Type /help for commands.")
            }
            SlashCommand::Quit => Ok(()),
        }
    }

    fn export(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        if self.controller.turns().is_empty() {
            return writeln!(self.err, "Nothing to export yet.");
        }

        let path =
            path.unwrap_or_else(|| self.export_dir.join(export_file_name(self.clock.now())));
        match write_transcript(&path, &self.controller.export()) {
            Ok(()) => writeln!(self.err, "Conversation exported to {}", path.display()),
            Err(error) => writeln!(self.err, "Failed to export to {}: {error}", path.display()),
        }
    }

    fn turn(
        &mut self,
        call: impl FnOnce(
            &SessionController,
            &mut dyn FnMut(SessionEvent),
        ) -> Result<TurnOutcome, SessionRejection>,
    ) -> io::Result<()> {
        let err = &mut self.err;
        let result = call(self.controller, &mut |event| report_event(&mut *err, event));
        self.report(result)
    }

    fn report(&mut self, result: Result<TurnOutcome, SessionRejection>) -> io::Result<()> {
        match result {
            Ok(TurnOutcome::Completed { reply }) => {
                writeln!(self.out, "{reply}")?;
                writeln!(self.out)
            }
            // Already reported through `SessionEvent::Failed`.
            Ok(TurnOutcome::Failed { .. }) => Ok(()),
            Ok(TurnOutcome::Superseded) => Ok(()),
            Err(rejection) => writeln!(self.err, "{rejection}"),
        }
    }
}

fn report_event<W: Write>(err: &mut W, event: SessionEvent) {
    let written = match event {
        SessionEvent::RetryWarning { message, .. } => writeln!(err, "warning: {message}"),
        SessionEvent::Failed { message, .. } => writeln!(err, "{message}"),
    };
    if let Err(error) = written {
        tracing::warn!(%error, "failed to write session event");
    }
}

fn write_transcript(path: &Path, transcript: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, transcript)
}
