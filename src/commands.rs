use crate::events::Event;

pub const HELP: &str = "\
commands:
  connect              connect the wallet
  disconnect           forget the wallet
  more                 load the next page
  price <id> <amount>  type a price for a card
  list <id> [amount]   list a token (uses the typed price)
  buy <id>             buy a listed token
  quit";

/// Turn a typed line into UI events. Blank lines produce nothing.
pub fn parse_command(line: &str) -> Result<Vec<Event>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };
    let args: Vec<&str> = words.collect();

    let token = |i: usize| {
        args.get(i)
            .map(|s| s.to_string())
            .ok_or_else(|| format!("{}: missing token id", command))
    };

    let events = match (command.to_ascii_lowercase().as_str(), args.len()) {
        ("connect", 0) => vec![Event::Connect],
        ("disconnect", 0) => vec![Event::Disconnect],
        ("more", 0) => vec![Event::LoadMore],
        ("price", 2) => vec![Event::PriceInput {
            token_id: token(0)?,
            value: args[1].to_string(),
        }],
        ("list", 1) => vec![Event::List { token_id: token(0)? }],
        ("list", 2) => vec![
            Event::PriceInput {
                token_id: token(0)?,
                value: args[1].to_string(),
            },
            Event::List { token_id: token(0)? },
        ],
        ("buy", 1) => vec![Event::Buy { token_id: token(0)? }],
        ("quit" | "exit", 0) => vec![Event::Shutdown],
        ("help", _) => return Err(HELP.to_string()),
        _ => return Err(format!("unknown command '{}'\n{}", line.trim(), HELP)),
    };
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert!(parse_command("   ").unwrap().is_empty());
        assert!(matches!(parse_command("connect").unwrap()[..], [Event::Connect]));
        assert!(matches!(parse_command("QUIT").unwrap()[..], [Event::Shutdown]));
        assert!(matches!(
            parse_command("buy 42").unwrap()[..],
            [Event::Buy { ref token_id }] if token_id == "42"
        ));
    }

    #[test]
    fn test_list_with_price_types_it_first() {
        let events = parse_command("list 7 0.5").unwrap();
        match &events[..] {
            [Event::PriceInput { token_id, value }, Event::List { token_id: listed }] => {
                assert_eq!(token_id, "7");
                assert_eq!(value, "0.5");
                assert_eq!(listed, "7");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        assert!(parse_command("sell 7").is_err());
        assert!(parse_command("buy").is_err());
        assert!(parse_command("connect now").is_err());
        assert!(parse_command("help").unwrap_err().contains("commands:"));
    }
}
