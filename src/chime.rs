use std::io::{self, Write};

/// Audible cue played when a reminder fires. Callers ignore failures.
pub trait Chime: Send + Sync {
    fn play(&self) -> io::Result<()>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Chime for Silent {
    fn play(&self) -> io::Result<()> {
        Ok(())
    }
}
