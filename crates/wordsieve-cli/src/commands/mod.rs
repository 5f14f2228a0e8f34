mod inspect;
mod lexical_data;
mod pipeline;
mod select;

/// Subcommands for wordsieve
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Select the top-N covered tokens and write the pruned vocabulary.
    Select(select::SelectArgs),

    /// Join a full frequency list against a pruned one as JSONL lexical data.
    LexicalData(lexical_data::LexicalDataArgs),

    /// Run every stage from a JSON config document.
    Pipeline(pipeline::PipelineArgs),

    /// Print the header and leading records of an embedding table.
    Inspect(inspect::InspectArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Select(cmd) => cmd.run(),
            Commands::LexicalData(cmd) => cmd.run(),
            Commands::Pipeline(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
        }
    }
}

/// Parse a frequency list delimiter.
///
/// Accepts a single character, or one of `\t`, `tab`, `space`.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    let c = match s {
        "\\t" | "tab" => '\t',
        "space" => ' ',
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("expected a single character, got {s:?}")),
            }
        }
    };
    if matches!(c, '\n' | '\r') {
        return Err("the delimiter cannot be a line break".to_string());
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("\\t"), Ok('\t'));
        assert_eq!(parse_delimiter("tab"), Ok('\t'));
        assert_eq!(parse_delimiter("\t"), Ok('\t'));
        assert_eq!(parse_delimiter("space"), Ok(' '));
        assert_eq!(parse_delimiter(","), Ok(','));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("\n").is_err());
    }
}
