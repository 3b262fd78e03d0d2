//! The command table.

/// How a command consumes the `<target>::<command>>><argument>` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `::name` only; acts on the session immediately.
    Session,
    /// `<target>::name`.
    Target,
    /// `<target>::name>><argument>`.
    TargetAndArgument,
    /// Parsed by its own rules before generic validation.
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Clear,
    CopyTo,
    CurrDir,
    Editor,
    Info,
    List,
    MoveTo,
    New,
    NewDir,
    Purge,
    Quit,
    Remove,
    Rename,
    RunCmd,
    Variable,
    VarList,
}

/// Every command, in the order names are offered as suggestions.
pub const COMMANDS: [Command; 16] = [
    Command::Clear,
    Command::CopyTo,
    Command::CurrDir,
    Command::Editor,
    Command::Info,
    Command::List,
    Command::MoveTo,
    Command::New,
    Command::NewDir,
    Command::Purge,
    Command::Quit,
    Command::Remove,
    Command::Rename,
    Command::RunCmd,
    Command::Variable,
    Command::VarList,
];

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Clear => "clear",
            Command::CopyTo => "copyto",
            Command::CurrDir => "currdir",
            Command::Editor => "editor",
            Command::Info => "info",
            Command::List => "list",
            Command::MoveTo => "moveto",
            Command::New => "new",
            Command::NewDir => "newdir",
            Command::Purge => "purge",
            Command::Quit => "quit",
            Command::Remove => "remove",
            Command::Rename => "rename",
            Command::RunCmd => "runcmd",
            Command::Variable => "variable",
            Command::VarList => "varlist",
        }
    }

    /// Look a command up by name. The long session-command spellings are
    /// accepted as aliases.
    pub fn from_name(name: &str) -> Option<Command> {
        let alias = match name {
            "clear-screen" => Some(Command::Clear),
            "print-working-dir" => Some(Command::CurrDir),
            "list-current" => Some(Command::List),
            "list-variables" => Some(Command::VarList),
            _ => None,
        };
        alias.or_else(|| COMMANDS.iter().copied().find(|c| c.name() == name))
    }

    pub fn arity(self) -> Arity {
        match self {
            Command::Clear | Command::CurrDir | Command::Quit | Command::VarList => Arity::Session,
            Command::Info
            | Command::List
            | Command::New
            | Command::NewDir
            | Command::Purge
            | Command::Remove => Arity::Target,
            Command::CopyTo | Command::Editor | Command::MoveTo | Command::Rename => {
                Arity::TargetAndArgument
            }
            Command::RunCmd | Command::Variable => Arity::Special,
        }
    }

    /// Commands that create their target, so it need not exist beforehand.
    pub fn creates_target(self) -> bool {
        matches!(self, Command::New | Command::NewDir)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        COMMANDS.iter().map(|c| c.name())
    }
}
