#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Text rendering of the informational panels.

use std::io::Write;

use vibewatch_traits::{Display, DisplayFrame};

/// Shown when the panel choice is outside the known panels.
pub const OUT_OF_RANGE: &str = "Out of range";

/// Lines of the panel selected by `frame.choice`.
pub fn render_lines(frame: &DisplayFrame) -> Vec<String> {
    match frame.choice {
        0 => vec![
            format!("Vib Threshold: {:.2}", frame.vibration_threshold),
            format!("Temp Threshold: {:.2}", frame.temperature_threshold),
            format!("Min vib: {:.2}", frame.min_floor),
        ],
        1 => {
            let [x, y, z] = frame.axes;
            vec![
                format!("Current Vib: {:.2}", frame.total_vibration),
                format!("Current Temp: {:.2}", frame.temperature),
                format!("Vib(x,y,z): {x:.2}, {y:.2}, {z:.2}"),
            ]
        }
        2 => vec![
            format!("Current Pot1 value: {:.2}", frame.temperature_input),
            format!("Current Pot2 value: {:.2}", frame.vibration_input),
        ],
        _ => vec![OUT_OF_RANGE.to_string()],
    }
}

/// Writes each message and panel as a block of lines, separated by a blank line.
///
/// Write errors are logged and otherwise ignored; a broken terminal must not
/// stop the monitor.
pub struct TerminalDisplay<W: Write> {
    out: W,
    last: Vec<String>,
    redraw_unchanged: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Vec::new(),
            redraw_unchanged: false,
        }
    }

    /// Also print panels identical to the previous one.
    pub fn redraw_unchanged(mut self, yes: bool) -> Self {
        self.redraw_unchanged = yes;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, lines: &[String]) {
        let res = lines
            .iter()
            .try_for_each(|l| writeln!(self.out, "{l}"))
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = res {
            tracing::warn!(error = %e, "display write failed");
        }
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn show_message(&mut self, text: &str) {
        let lines = vec![text.to_string()];
        self.emit(&lines);
        self.last = lines;
    }

    fn render(&mut self, frame: &DisplayFrame) {
        let lines = render_lines(frame);
        if !self.redraw_unchanged && lines == self.last {
            return;
        }
        self.emit(&lines);
        self.last = lines;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_panel_is_not_reprinted() {
        let mut d = TerminalDisplay::new(Vec::new());
        let f = DisplayFrame::default();
        d.render(&f);
        d.render(&f);
        let text = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(text.matches("Vib Threshold").count(), 1);
    }

    #[test]
    fn redraw_option_prints_every_frame() {
        let mut d = TerminalDisplay::new(Vec::new()).redraw_unchanged(true);
        let f = DisplayFrame::default();
        d.render(&f);
        d.render(&f);
        let text = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(text.matches("Vib Threshold").count(), 2);
    }
}
