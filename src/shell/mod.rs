pub mod command;
pub mod parse;

use crate::shell::{
    command::{execute_command, Command},
    parse::parse_command,
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use sfs::{disk::init::Boot, FileDisk, FileSystem};
use std::{io::stdout, path::PathBuf};

const COMMANDS: &[&str] = &[
    "help", "ls", "pwd", "mkdir", "cd", "create", "write", "append", "cat", "rm", "stat", "df",
    "format", "open", "close", "fread", "fwrite", "seek", "exit",
];

pub fn start_shell(mut fs: FileSystem<FileDisk>, boot: Boot) {
    banner(&fs, boot);

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sfs_history");

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => println!("{} {}", "⚠️  History disabled:".yellow(), e),
    }

    let completer =
        DefaultCompleter::new_with_wordlen(COMMANDS.iter().map(|c| c.to_string()).collect(), 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let cwd = fs.pwd().unwrap_or_else(|_| "?".to_string());
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!(
                "{}:{}",
                format!("{}@{}", username, hostname).green(),
                cwd.blue()
            )),
            DefaultPromptSegment::Basic("SFS".bright_blue().bold().to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut fs) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting SFS...".yellow());
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    // open descriptors are flushed on the way out
    if let Err(e) = fs.unmount() {
        println!("{} {}", "❌ Unmount failed:".red().bold(), e);
    }
    println!("{}", "GoodBye!".bright_yellow());
}

fn banner(fs: &FileSystem<FileDisk>, boot: Boot) {
    let mut stdout = stdout();
    let _ = execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to SFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    );

    let layout = fs.layout();
    let how = match boot {
        Boot::Formatted => "🔧 Formatted new file system",
        Boot::Mounted => "⚙️  Mounted existing file system",
    };
    println!(
        "{} on {} ({} sectors × {} bytes, {} inodes)",
        how,
        fs.disk().path().display().to_string().cyan(),
        layout.total_sectors,
        layout.sector_size,
        layout.inode_capacity()
    );
}
