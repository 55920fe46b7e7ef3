//! Interactive stdin prompting, kept apart from the issuance layer so
//! issuance can be exercised without simulating terminal input.

use std::io::{self, BufRead, Write};

/// Ask a yes/no question; anything but `y`/`Y` counts as a decline.
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = line(&format!("{question} (y/n): "))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

/// Print a prompt and read one trimmed line.
pub fn line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim().to_owned())
}

/// Read a comma-separated list; entries are trimmed, empties dropped.
pub fn csv_list(prompt: &str) -> io::Result<Vec<String>> {
    Ok(split_csv(&line(prompt)?))
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
