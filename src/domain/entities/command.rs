/// A parsed chat command with its raw card-id arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    MarkHave(Vec<i64>),
    MarkNeed(Vec<i64>),
    RecordTrade { traded_out: Vec<i64>, traded_in: Vec<i64> },
    ShowTrades,
    /// A keyword matched but its arguments did not parse
    Malformed { keyword: &'static str },
    Unrecognized,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::MarkHave(_) => "i have",
            Command::MarkNeed(_) => "i need",
            Command::RecordTrade { .. } => "i traded",
            Command::ShowTrades => "show trades",
            Command::Malformed { .. } => "malformed",
            Command::Unrecognized => "unrecognized",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::MarkHave(_) | Command::MarkNeed(_) | Command::RecordTrade { .. }
        )
    }
}
