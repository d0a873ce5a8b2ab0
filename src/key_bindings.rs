use crate::cook_actions::CookCommand;

#[derive(Clone, Copy, Debug)]
pub struct KeyBinding {
    pub keys: &'static [&'static str],
    pub command: CookCommand,
    pub help: &'static str,
}

/// Enter alone advances; a lone space toggles the timer.
pub const KEY_BINDINGS: [KeyBinding; 5] = [
    KeyBinding {
        keys: &["n", "next", ""],
        command: CookCommand::Advance,
        help: "next step",
    },
    KeyBinding {
        keys: &["p", "pause", "start", " "],
        command: CookCommand::ToggleTimer,
        help: "pause/start timer",
    },
    KeyBinding {
        keys: &["r", "reset"],
        command: CookCommand::ResetTimer,
        help: "reset timer",
    },
    KeyBinding {
        keys: &["s", "share"],
        command: CookCommand::Share,
        help: "share (after finishing)",
    },
    KeyBinding {
        keys: &["q", "quit"],
        command: CookCommand::Abandon,
        help: "quit",
    },
];

pub fn parse_command(line: &str) -> Option<CookCommand> {
    let line = line.trim_end_matches(['\r', '\n']);
    let key = if line == " " {
        line.to_string()
    } else {
        line.trim().to_lowercase()
    };
    KEY_BINDINGS
        .iter()
        .find(|binding| binding.keys.contains(&key.as_str()))
        .map(|binding| binding.command)
}

pub fn help_line() -> String {
    KEY_BINDINGS
        .iter()
        .map(|binding| {
            let key = match binding.keys[0] {
                "" => "enter",
                " " => "space",
                other => other,
            };
            format!("{key}: {}", binding.help)
        })
        .collect::<Vec<_>>()
        .join("  ")
}
