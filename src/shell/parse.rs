use crate::shell::command::Command;

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];
    let path = || args.first().map(|&p| p.to_string());
    let number = |i: usize| args.get(i).and_then(|n| n.parse::<u32>().ok());
    let text = |from: usize| (args.len() > from).then(|| args[from..].join(" "));

    match cmd {
        "help" => Some(Command::Help),
        "ls" => Some(Command::Ls(path())),
        "pwd" => Some(Command::Pwd),
        "mkdir" => path().map(Command::Mkdir),
        "cd" => Some(Command::Cd(path().unwrap_or_default())),
        "create" | "touch" => path().map(Command::Create),
        "write" => Some(Command::Write(path()?, text(1)?)),
        "append" => Some(Command::Append(path()?, text(1)?)),
        "cat" | "read" => path().map(Command::Cat),
        "rm" | "rmdir" => path().map(Command::Rm),
        "stat" => path().map(Command::Stat),
        "df" => Some(Command::Df),
        "format" => Some(Command::Format),
        "open" => path().map(Command::Open),
        "close" => number(0).map(Command::Close),
        "fread" => Some(Command::Fread(number(0)?, number(1)? as usize)),
        "fwrite" => Some(Command::Fwrite(number(0)?, text(1)?)),
        "seek" => Some(Command::Seek(number(0)?, number(1)?)),
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}
