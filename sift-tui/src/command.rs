/// Which panels a `/expand` or `/collapse` applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelTarget {
    Selected,
    All,
    /// 1-based, as shown on screen.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Expand(PanelTarget),   // /expand [n|all]
    Collapse(PanelTarget), // /collapse [n|all]
    Clear,                 // /clear
    Help,                  // /help
    Quit,                  // /quit or /exit
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Unknown(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let target = match rest {
        None => Some(PanelTarget::Selected),
        Some("all") => Some(PanelTarget::All),
        Some(n) => n.parse::<usize>().ok().filter(|n| *n > 0).map(PanelTarget::Index),
    };

    match (verb, target) {
        ("/expand", Some(target)) => Command::Expand(target),
        ("/collapse", Some(target)) => Command::Collapse(target),
        ("/clear", _) => Command::Clear,
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_panel_targets() {
        assert_eq!(parse_command("/expand"), Command::Expand(PanelTarget::Selected));
        assert_eq!(parse_command(" /expand all "), Command::Expand(PanelTarget::All));
        assert_eq!(parse_command("/collapse 3"), Command::Collapse(PanelTarget::Index(3)));
    }

    #[test]
    fn rejects_bad_targets_and_verbs() {
        assert_eq!(parse_command("/expand 0"), Command::Unknown("/expand 0".into()));
        assert_eq!(parse_command("/collapse x"), Command::Unknown("/collapse x".into()));
        assert_eq!(parse_command("/claim"), Command::Unknown("/claim".into()));
        assert_eq!(parse_command("/exit"), Command::Quit);
    }
}
