// Input module: where the session loop blocks waiting for the user.
// Every read either yields a line or reports that the user interrupted.
// `ReaderSource` wraps any buffered reader (tests, piped input);
// `ConsoleSource` reads stdin on a helper thread so Ctrl-C can be
// observed while a read is pending.

use crossbeam_channel::{bounded, select, unbounded, Receiver};
use std::io::{self, BufRead};
use std::thread;
use tracing::debug;

/// Outcome of a single read point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One line of text without its line terminator.
    Line(String),
    /// Ctrl-C, or the input stream ended.
    Interrupted,
}

/// Something the session can read one line at a time from.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Input>;
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Line source over any `BufRead`. End of input reads as `Interrupted`.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> io::Result<Input> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Interrupted);
        }
        Ok(Input::Line(strip_newline(line)))
    }
}

enum StdinEvent {
    Line(String),
    Eof,
    Failed(io::Error),
}

/// Line source over the process console.
///
/// Installs the process-wide Ctrl-C handler, so only one may be created.
pub struct ConsoleSource {
    lines: Receiver<StdinEvent>,
    interrupts: Receiver<()>,
}

impl ConsoleSource {
    pub fn new() -> anyhow::Result<Self> {
        let (int_tx, interrupts) = bounded(1);
        ctrlc::set_handler(move || {
            // A second Ctrl-C before the first is seen is redundant.
            let _ = int_tx.try_send(());
        })?;

        let (line_tx, lines) = unbounded();
        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                let stdin = io::stdin();
                let mut handle = stdin.lock();
                loop {
                    let mut line = String::new();
                    let event = match handle.read_line(&mut line) {
                        Ok(0) => StdinEvent::Eof,
                        Ok(_) => StdinEvent::Line(strip_newline(line)),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => StdinEvent::Failed(e),
                    };
                    let last = !matches!(event, StdinEvent::Line(_));
                    if line_tx.send(event).is_err() || last {
                        break;
                    }
                }
            })?;

        Ok(ConsoleSource { lines, interrupts })
    }
}

impl LineSource for ConsoleSource {
    fn next_line(&mut self) -> io::Result<Input> {
        // A pending interrupt beats a pending line.
        if self.interrupts.try_recv().is_ok() {
            debug!("interrupt received");
            return Ok(Input::Interrupted);
        }
        select! {
            recv(self.interrupts) -> _ => {
                debug!("interrupt received");
                Ok(Input::Interrupted)
            }
            recv(self.lines) -> event => match event {
                Ok(StdinEvent::Line(line)) => Ok(Input::Line(line)),
                Ok(StdinEvent::Failed(e)) => Err(e),
                Ok(StdinEvent::Eof) | Err(_) => {
                    debug!("stdin closed");
                    Ok(Input::Interrupted)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_source_strips_terminators() {
        let mut src = ReaderSource::new(Cursor::new("1\r\n 2 \nlast"));
        assert_eq!(src.next_line().unwrap(), Input::Line("1".into()));
        assert_eq!(src.next_line().unwrap(), Input::Line(" 2 ".into()));
        assert_eq!(src.next_line().unwrap(), Input::Line("last".into()));
    }

    #[test]
    fn reader_source_eof_is_interrupt() {
        let mut src = ReaderSource::new(Cursor::new("y\n"));
        assert_eq!(src.next_line().unwrap(), Input::Line("y".into()));
        assert_eq!(src.next_line().unwrap(), Input::Interrupted);
        assert_eq!(src.next_line().unwrap(), Input::Interrupted);
    }

    #[test]
    fn empty_line_is_still_a_line() {
        let mut src = ReaderSource::new(Cursor::new("\n"));
        assert_eq!(src.next_line().unwrap(), Input::Line(String::new()));
    }
}
