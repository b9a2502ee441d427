pub mod io;
pub mod log;

/// Get the tool name by stripping the 'f' prefix.
/// e.g., "furlsort" -> "urlsort"
#[inline]
pub fn tool_name(binary_name: &str) -> &str {
    binary_name.strip_prefix('f').unwrap_or(binary_name)
}

/// Reset SIGPIPE to default behavior (SIG_DFL) so `furlcsv ... | head`
/// terminates quietly instead of failing with EPIPE.
/// Rust sets SIGPIPE to SIG_IGN by default. This must be called at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Render an I/O error for a diagnostic line, dropping the " (os error N)"
/// tail std appends to OS errors.
pub fn io_error_msg(e: &std::io::Error) -> String {
    let msg = e.to_string();
    match e.raw_os_error() {
        Some(raw) => {
            let tail = format!(" (os error {})", raw);
            msg.strip_suffix(tail.as_str()).unwrap_or(&msg).to_string()
        }
        None => msg,
    }
}

#[cfg(test)]
pub(crate) mod testutil;
