/// A line read from the control surface on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Fullscreen { monitor: usize, on: bool },
    Status,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "toggle" => Command::Toggle,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            "fullscreen" => {
                let monitor = words.next()?.parse().ok()?;
                let on = match words.next()? {
                    "on" | "true" | "1" => true,
                    "off" | "false" | "0" => false,
                    _ => return None,
                };
                Command::Fullscreen { monitor, on }
            }
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("toggle"), Some(Command::Toggle));
        assert_eq!(Command::parse("  status \n"), Some(Command::Status));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn parses_fullscreen() {
        assert_eq!(
            Command::parse("fullscreen 1 on"),
            Some(Command::Fullscreen {
                monitor: 1,
                on: true
            })
        );
        assert_eq!(
            Command::parse("fullscreen 0 off"),
            Some(Command::Fullscreen {
                monitor: 0,
                on: false
            })
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("fullscreen"), None);
        assert_eq!(Command::parse("fullscreen x on"), None);
        assert_eq!(Command::parse("fullscreen 0 maybe"), None);
        assert_eq!(Command::parse("toggle now"), None);
        assert_eq!(Command::parse("suspend"), None);
    }
}
