use std::io::{self, BufRead, Write};

pub fn write_stdout_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_with_broken_pipe_tolerance(&mut stdout, text.as_bytes())?;
    flush_with_broken_pipe_tolerance(&mut stdout)
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_with_broken_pipe_tolerance(&mut stdout, text.as_bytes())?;
    write_with_broken_pipe_tolerance(&mut stdout, b"\n")?;
    flush_with_broken_pipe_tolerance(&mut stdout)
}

/// Asks on stderr so JSON on stdout stays parseable. Anything other than
/// `y`/`yes` declines, including a closed stdin.
pub fn confirm_on_stdin(message: &str) -> bool {
    let mut stderr = io::stderr().lock();
    if write!(stderr, "{message} [y/N] ").is_err() || stderr.flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}

fn write_with_broken_pipe_tolerance(writer: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    match writer.write_all(bytes) {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn flush_with_broken_pipe_tolerance(writer: &mut dyn Write) -> io::Result<()> {
    match writer.flush() {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::is_affirmative;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(is_affirmative("sim"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("maybe"));
    }
}
