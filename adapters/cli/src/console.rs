//! Text backend that prints HUD frames to a writer.

use std::io::Write;

use anyhow::{Context, Result};
use frostbloom_rendering::{Frame, RenderingBackend};

/// Prints every `every`-th frame and every banner as plain text lines.
#[derive(Debug)]
pub(crate) struct ConsoleBackend<W> {
    out: W,
    every: u64,
    presented: u64,
    end_shown: bool,
}

impl<W: Write> ConsoleBackend<W> {
    /// Creates a backend writing to `out`. An `every` of zero prints only banners.
    pub(crate) fn new(out: W, every: u64) -> Self {
        Self {
            out,
            every,
            presented: 0,
            end_shown: false,
        }
    }

    /// Consumes the backend and returns its writer.
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for ConsoleBackend<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.presented += 1;
        let end_screen = frame.hud.end_screen.as_ref().filter(|_| !self.end_shown);
        self.end_shown = frame.hud.end_screen.is_some();
        let due = self.every != 0 && self.presented % self.every == 0;
        if !due && end_screen.is_none() {
            return Ok(());
        }

        let distance = frame
            .hud
            .distance
            .as_ref()
            .map_or("Distance: -", |readout| readout.text.as_str());
        writeln!(
            self.out,
            "[{:>6}] {} | {} | {} | entities {} | particles {}",
            self.presented,
            frame.hud.health.text,
            distance,
            frame.hud.score_line,
            frame.entities.len(),
            frame.particles.len(),
        )
        .context("failed to write frame")?;

        if let Some(screen) = end_screen {
            writeln!(self.out, "== {} ==", screen.title).context("failed to write end screen")?;
            for line in &screen.lines {
                writeln!(self.out, "   {line}").context("failed to write end screen")?;
            }
        }
        Ok(())
    }

    fn announce(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, ">> {text}").context("failed to write announcement")
    }
}
