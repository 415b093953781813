// src/exec/shell.rs

//! Pure helpers for deciding *how* a command line is executed.
//!
//! A command string is run in one of two ways:
//!
//! - **Direct**: naive whitespace split — first token is the executable,
//!   the rest are its arguments. No shell involved.
//! - **Via the platform shell** (`sh -c` / `cmd /C`): chosen when the string
//!   contains shell metacharacters (pipes, redirections, logical operators,
//!   expansions) or when the first token is a shell builtin that has no
//!   standalone executable.
//!
//! When the shell path is taken, the command string travels as a *single
//! argv element*, so embedded quotes reach the shell byte-for-byte and no
//! quoting/escaping step is needed.
//!
//! Everything here is a pure function over the command string, so the
//! heuristics are directly unit-testable.

/// Characters that hand interpretation over to a shell.
pub const SHELL_METACHARS: &[char] = &[
    '|', '&', ';', '<', '>', '(', ')', '$', '`', '"', '\'', '*', '?', '~',
];

/// POSIX shell builtins with no standalone executable worth invoking.
const POSIX_BUILTINS: &[&str] = &[
    "cd", "export", "source", "alias", "unalias", "set", "unset", "ulimit", "umask", "exec",
];

/// `cmd.exe` builtins (no corresponding .exe on PATH).
const WINDOWS_BUILTINS: &[&str] = &[
    "cd", "dir", "copy", "del", "type", "echo", "md", "mkdir", "rd", "rmdir", "ren", "move",
    "cls", "set", "ver", "vol",
];

/// Naive whitespace split: first token = executable, remainder = arguments.
/// Returns `None` for an empty or all-whitespace command.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?.to_string();
    let args = parts.map(str::to_string).collect();
    Some((program, args))
}

pub fn contains_metachars(command: &str) -> bool {
    command.chars().any(|c| SHELL_METACHARS.contains(&c))
}

/// Whether `program` only exists as a shell builtin on the current platform.
pub fn is_shell_builtin(program: &str) -> bool {
    let table = if cfg!(windows) {
        WINDOWS_BUILTINS
    } else {
        POSIX_BUILTINS
    };
    table.iter().any(|b| program.eq_ignore_ascii_case(b))
}

/// Whether the command must go through the platform shell.
pub fn needs_shell(command: &str) -> bool {
    if contains_metachars(command) {
        return true;
    }
    match command.split_whitespace().next() {
        Some(program) => is_shell_builtin(program),
        None => false,
    }
}
