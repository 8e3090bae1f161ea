//! Process-level integrations: interrupt signals and cancellable stdin reads.

use std::io;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use assistant_provider::CancelSignal;

/// How long one stdin poll waits before re-checking the cancellation flag.
pub const INPUT_POLL_MS: i32 = 25;

/// Outcome of one line read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    Line(String),
    Eof,
    Interrupted,
}

/// Line reader over fd 0 that never blocks longer than one poll interval.
///
/// Bytes read past a newline stay buffered for the next call.
#[derive(Debug, Default)]
pub struct StdinReader {
    pending: Vec<u8>,
    eof: bool,
}

impl StdinReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_line(&mut self, cancel: &CancelSignal) -> io::Result<LineRead> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(LineRead::Line(line));
            }
            if self.eof {
                if self.pending.is_empty() {
                    return Ok(LineRead::Eof);
                }
                let rest = std::mem::take(&mut self.pending);
                return Ok(LineRead::Line(decode_line(&rest)));
            }
            if cancel.load(Ordering::SeqCst) {
                return Ok(LineRead::Interrupted);
            }
            self.fill(cancel)?;
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=newline).collect();
        Some(decode_line(&line[..newline]))
    }

    #[cfg(unix)]
    fn fill(&mut self, cancel: &CancelSignal) -> io::Result<()> {
        let fd = libc::STDIN_FILENO;
        if !poll_readable(fd, INPUT_POLL_MS) {
            return Ok(());
        }
        if cancel.load(Ordering::SeqCst) {
            return Ok(());
        }

        let mut buffer = [0u8; 1024];
        let read = unsafe { libc::read(fd, buffer.as_mut_ptr().cast(), buffer.len()) };
        match read {
            0 => self.eof = true,
            n if n > 0 => self.pending.extend_from_slice(&buffer[..n as usize]),
            _ => {
                let error = io::Error::last_os_error();
                if error.kind() != io::ErrorKind::Interrupted {
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    // Without poll the read blocks; cancellation is noticed after the line arrives.
    #[cfg(not(unix))]
    fn fill(&mut self, _cancel: &CancelSignal) -> io::Result<()> {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            self.eof = true;
        } else {
            self.pending.extend_from_slice(line.as_bytes());
        }
        Ok(())
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let line = String::from_utf8_lossy(bytes);
    line.trim_end_matches(['\r', '\n']).to_string()
}

#[cfg(unix)]
fn poll_readable(fd: libc::c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0
}

/// Keeps the signal thread alive; dropping it unregisters the handlers.
pub struct InterruptGuard {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Raises `cancel` on SIGINT/SIGTERM. A second signal exits immediately,
/// for the case where the current step cannot observe the flag.
#[cfg(unix)]
pub fn install_interrupt_handler(cancel: CancelSignal) -> io::Result<InterruptGuard> {
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    let handle = signals.handle();

    let thread = thread::Builder::new()
        .name("interrupt-watch".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if cancel.swap(true, Ordering::SeqCst) {
                    tracing::debug!(signal, "second interrupt, exiting");
                    std::process::exit(0);
                }
                tracing::debug!(signal, "interrupt received");
            }
        })?;

    Ok(InterruptGuard {
        handle,
        thread: Some(thread),
    })
}

#[cfg(not(unix))]
pub fn install_interrupt_handler(_cancel: CancelSignal) -> io::Result<InterruptGuard> {
    Ok(InterruptGuard { thread: None })
}
