//! completions command - Print shell completion scripts

use clap::Args;
use clap_complete::{Shell, generate};

use crate::exit_code::ExitCode;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `args.shell` to stdout
pub fn execute(args: CompletionsArgs, command: &mut clap::Command) -> ExitCode {
    let name = command.get_name().to_string();
    generate(args.shell, command, name, &mut std::io::stdout());
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_for_every_shell() {
        let mut command = clap::Command::new("docgate").subcommand(clap::Command::new("stat"));
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
            let mut buf = Vec::new();
            generate(shell, &mut command, "docgate", &mut buf);
            assert!(String::from_utf8(buf).unwrap().contains("docgate"));
        }
    }
}
