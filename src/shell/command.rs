use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sfs::{fs::directory::EntryKind, FileDisk, FileSystem};
use std::error::Error;
use std::time::Duration;

#[derive(Debug)]
pub enum Command {
    Help,
    Ls(Option<String>),
    Pwd,
    Mkdir(String),
    Cd(String),
    Create(String),
    Write(String, String),
    Append(String, String),
    Cat(String),
    Rm(String),
    Stat(String),
    Df,
    Format,
    Open(String),
    Close(u32),
    Fread(u32, usize),
    Fwrite(u32, String),
    Seek(u32, u32),
    Exit,
}

pub fn execute_command(
    cmd: &Command,
    fs: &mut FileSystem<FileDisk>,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Ls(path) => {
            let names = match path {
                Some(p) => fs.list_path(p)?,
                None => fs.list()?,
            };
            let dir = path.as_deref().unwrap_or(".");
            for name in names {
                let full = format!("{}/{}", dir, name);
                match fs.stat(&full).map(|m| m.kind) {
                    Ok(EntryKind::Directory) => println!("📁  {}", name.blue().bold()),
                    _ => println!("📄  {}", name),
                }
            }
        }
        Command::Pwd => println!("📍 {}", fs.pwd()?.cyan()),
        Command::Mkdir(path) => {
            fs.mkdir(path)?;
            println!("✅ Created directory: {}", path.green());
        }
        Command::Cd(path) => {
            fs.change_directory(path)?;
            println!("📂 Moved to {}", fs.pwd()?.blue());
        }
        Command::Create(path) => {
            let fd = fs.open(path)?;
            fs.close(fd)?;
            println!("📝 Created file: {}", path.green());
        }
        Command::Write(path, content) => {
            let fd = fs.open(path)?;
            let written = fs.write(fd, content.as_bytes())?;
            fs.close(fd)?;
            println!("✏️  Wrote {} bytes to {}", written, path.cyan());
        }
        Command::Append(path, content) => {
            let fd = fs.open(path)?;
            // reading to the end is the only way to park the cursor there
            let size = fs.stat(path)?.size as usize;
            fs.read(fd, size)?;
            let written = fs.write(fd, content.as_bytes())?;
            fs.close(fd)?;
            println!("✏️  Appended {} bytes to {}", written, path.cyan());
        }
        Command::Cat(path) => {
            let meta = fs.stat(path)?;
            if meta.kind == EntryKind::Directory {
                return Err(format!("{} is a directory", path).into());
            }
            let fd = fs.open(path)?;
            let bytes = fs.read(fd, meta.size as usize)?;
            fs.close(fd)?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Rm(path) => {
            fs.remove(path)?;
            println!("🗑️ Removed: {}", path.red());
        }
        Command::Stat(path) => {
            let meta = fs.stat(path)?;
            println!(
                "{}\n{}: {}\n{}: {}\n{}: {}\n{}: {} bytes\n{}: {}\n",
                "📊 File Info".bright_yellow().bold(),
                "Name".blue(),
                if meta.name.is_empty() { "/" } else { meta.name.as_str() },
                "Inode".blue(),
                meta.inode,
                "Type".blue(),
                meta.kind,
                "Size".blue(),
                meta.size,
                "Slots".blue(),
                meta.slots_used
            );
        }
        Command::Df => {
            let layout = *fs.layout();
            let data = layout.total_sectors - layout.data_start();
            println!(
                "{}: {} of {} data sectors free ({} bytes each)",
                "Sectors".blue(),
                fs.free_sectors()?,
                data,
                layout.sector_size
            );
            println!(
                "{}: {} of {} free",
                "Inodes".blue(),
                fs.free_inodes()?,
                layout.inode_capacity()
            );
        }
        Command::Format => {
            println!("💾 Formatting virtual disk...");
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")?
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.enable_steady_tick(Duration::from_millis(80));
            pb.set_message("zeroing metadata regions");
            let result = fs.reformat();
            match &result {
                Ok(()) => pb.finish_with_message("✅ Disk formatted successfully!"),
                Err(_) => pb.abandon_with_message("❌ Format failed"),
            }
            result?;
        }
        Command::Open(path) => {
            let fd = fs.open(path)?;
            println!("🔓 {} opened as fd {}", path.cyan(), fd.to_string().bold());
        }
        Command::Close(fd) => {
            fs.close(*fd)?;
            println!("🔒 fd {} closed", fd);
        }
        Command::Fread(fd, length) => {
            let bytes = fs.read(*fd, *length)?;
            println!(
                "{} {}",
                format!("({} bytes)", bytes.len()).bright_black(),
                String::from_utf8_lossy(&bytes)
            );
        }
        Command::Fwrite(fd, content) => {
            let written = fs.write(*fd, content.as_bytes())?;
            println!("✏️  Wrote {} bytes to fd {}", written, fd);
        }
        Command::Seek(fd, position) => {
            let at = fs.seek(*fd, *position)?;
            println!("↪️  fd {} now at {}", fd, at);
        }
        Command::Exit => println!("{}", "👋 Exiting SFS shell...".yellow().bold()),
    }

    Ok(())
}

fn print_help() {
    println!("{}", "📘 SFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  ls [dir]              List a directory (default: current)
  pwd                   Print current path
  mkdir <dir>           Create directory
  cd [dir]              Change directory (no argument: root)
  create <file>         Create an empty file
  write <file> <text>   Overwrite the start of a file with text
  append <file> <text>  Append text to a file
  cat <file>            Print file content
  rm <path>             Remove a file or an empty directory
  stat <path>           Show inode info
  df                    Show free sectors and inodes
  format                Format virtual disk
  open <file>           Open a file, print its descriptor
  close <fd>            Flush and close a descriptor
  fread <fd> <n>        Read up to n bytes at the cursor
  fwrite <fd> <text>    Write text at the cursor
  seek <fd> <pos>       Move the cursor
  help                  Show this help message
  exit                  Quit the shell
"
        .bright_black()
    );
}
