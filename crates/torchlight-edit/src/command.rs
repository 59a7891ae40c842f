use std::fmt;
use std::str::FromStr;

use torchlight_blocks::RegistryError;
use torchlight_geom::Cell;

/// Failure reported by the host for a single world-edit command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("syntax error: {0}")]
    Parse(String),
    #[error("unknown block `{0}`")]
    UnknownBlock(String),
    #[error(transparent)]
    InvalidState(#[from] RegistryError),
    #[error("no blocks filled between {from} and {to}")]
    NoBlocksFilled { from: Cell, to: Cell },
    #[error("command rejected: {0}")]
    Rejected(String),
}

/// Block name plus optional state properties, e.g. `light_block ["block_light_level" = 10]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    pub name: String,
    pub props: Vec<(String, String)>,
}

impl BlockSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
        }
    }

    pub fn with_prop(mut self, prop: impl Into<String>, value: impl ToString) -> Self {
        self.props.push((prop.into(), value.to_string()));
        self
    }
}

impl fmt::Display for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.props.is_empty() {
            return Ok(());
        }
        f.write_str(" [")?;
        for (i, (k, v)) in self.props.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            // Numbers and booleans go unquoted, everything else is a string literal.
            if v.parse::<i64>().is_ok() || v == "true" || v == "false" {
                write!(f, "\"{}\" = {}", k, v)?;
            } else {
                write!(f, "\"{}\" = \"{}\"", k, v)?;
            }
        }
        f.write_str("]")
    }
}

/// `fill <from> <to> <block> [replace <filter>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillCommand {
    pub from: Cell,
    pub to: Cell,
    pub block: BlockSpec,
    pub replace: Option<String>,
}

impl FillCommand {
    /// Single-cell fill that only applies when the cell currently holds `filter`.
    pub fn replace_at(cell: Cell, block: BlockSpec, filter: impl Into<String>) -> Self {
        Self {
            from: cell,
            to: cell,
            block,
            replace: Some(filter.into()),
        }
    }

    /// Inclusive (min, max) corners.
    pub fn bounds(&self) -> (Cell, Cell) {
        let min = Cell::new(
            self.from.x.min(self.to.x),
            self.from.y.min(self.to.y),
            self.from.z.min(self.to.z),
        );
        let max = Cell::new(
            self.from.x.max(self.to.x),
            self.from.y.max(self.to.y),
            self.from.z.max(self.to.z),
        );
        (min, max)
    }

    pub fn volume(&self) -> u64 {
        let (min, max) = self.bounds();
        let span = |a: i32, b: i32| (b as i64 - a as i64 + 1) as u64;
        span(min.x, max.x) * span(min.y, max.y) * span(min.z, max.z)
    }
}

impl fmt::Display for FillCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fill {} {} {}", self.from, self.to, self.block)?;
        if let Some(filter) = &self.replace {
            write!(f, " replace {}", filter)?;
        }
        Ok(())
    }
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest.chars().next()
    }

    fn word(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || c == '[')
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (w, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(w)
    }

    fn expect_word(&mut self, what: &str) -> Result<&'a str, CommandError> {
        self.word()
            .ok_or_else(|| CommandError::Parse(format!("expected {}", what)))
    }

    fn int(&mut self) -> Result<i32, CommandError> {
        let w = self.expect_word("coordinate")?;
        w.parse::<i32>()
            .map_err(|_| CommandError::Parse(format!("invalid coordinate `{}`", w)))
    }

    fn cell(&mut self) -> Result<Cell, CommandError> {
        Ok(Cell::new(self.int()?, self.int()?, self.int()?))
    }

    fn literal(&mut self) -> Result<String, CommandError> {
        self.skip_ws();
        if let Some(body) = self.rest.strip_prefix('"') {
            let end = body
                .find('"')
                .ok_or_else(|| CommandError::Parse("unterminated string".into()))?;
            self.rest = &body[end + 1..];
            return Ok(body[..end].to_string());
        }
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || c == ',' || c == ']' || c == '=')
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(CommandError::Parse("expected a value".into()));
        }
        let (w, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(w.to_string())
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.rest = &self.rest[c.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn props(&mut self) -> Result<Vec<(String, String)>, CommandError> {
        let mut props = Vec::new();
        if !self.eat('[') {
            return Ok(props);
        }
        if self.eat(']') {
            return Ok(props);
        }
        loop {
            let key = self.literal()?;
            if !self.eat('=') && !self.eat(':') {
                return Err(CommandError::Parse(format!("expected `=` after \"{}\"", key)));
            }
            let value = self.literal()?;
            props.push((key, value));
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(props);
            }
            return Err(CommandError::Parse("expected `,` or `]`".into()));
        }
    }
}

impl FromStr for FillCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cur = Cursor {
            rest: s.trim().trim_start_matches('/'),
        };
        match cur.word() {
            Some("fill") => {}
            Some(other) => return Err(CommandError::Parse(format!("unknown command `{}`", other))),
            None => return Err(CommandError::Parse("empty command".into())),
        }
        let from = cur.cell()?;
        let to = cur.cell()?;
        let name = cur.expect_word("block name")?.to_string();
        let props = cur.props()?;
        let replace = match cur.word() {
            None => None,
            Some("replace") => Some(cur.expect_word("replace filter")?.to_string()),
            Some(other) => {
                return Err(CommandError::Parse(format!("unexpected `{}`", other)));
            }
        };
        if let Some(extra) = cur.word() {
            return Err(CommandError::Parse(format!("trailing `{}`", extra)));
        }
        Ok(FillCommand {
            from,
            to,
            block: BlockSpec { name, props },
            replace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_placement_text_matches_host_syntax() {
        let cmd = FillCommand::replace_at(
            Cell::new(-1, 64, 0),
            BlockSpec::named("light_block").with_prop("block_light_level", 10),
            "air",
        );
        assert_eq!(
            cmd.to_string(),
            "fill -1 64 0 -1 64 0 light_block [\"block_light_level\" = 10] replace air"
        );
    }

    #[test]
    fn clear_text_has_no_state() {
        let cmd = FillCommand::replace_at(Cell::new(3, 70, -2), BlockSpec::named("air"), "light_block");
        assert_eq!(cmd.to_string(), "fill 3 70 -2 3 70 -2 air replace light_block");
    }

    #[test]
    fn parses_formatted_command() {
        let text = "fill 1 2 3 1 2 3 light_block [\"block_light_level\" = 10] replace flowing_water";
        let cmd: FillCommand = text.parse().unwrap();
        assert_eq!(cmd.from, Cell::new(1, 2, 3));
        assert_eq!(cmd.block.name, "light_block");
        assert_eq!(cmd.block.props, vec![("block_light_level".to_string(), "10".to_string())]);
        assert_eq!(cmd.replace.as_deref(), Some("flowing_water"));
        assert_eq!(cmd.to_string(), text);
    }

    #[test]
    fn parses_attached_state_and_slash_prefix() {
        let cmd: FillCommand = "/fill 0 0 0 2 1 0 stone[\"variant\":\"smooth\"]".parse().unwrap();
        assert_eq!(cmd.block.props, vec![("variant".to_string(), "smooth".to_string())]);
        assert_eq!(cmd.replace, None);
        assert_eq!(cmd.volume(), 6);
    }

    #[test]
    fn rejects_malformed_commands() {
        for bad in [
            "",
            "setblock 0 0 0 air",
            "fill 0 0 0 0 0 air",
            "fill 0 0 0 0 0 0",
            "fill 0 0 0 0 0 0 air replace",
            "fill 0 0 0 0 0 0 air keep",
            "fill 0 0 0 0 0 0 light_block [\"block_light_level\" 10]",
            "fill 0 0 0 0 0 0 light_block [\"block_light_level\" = 10",
        ] {
            assert!(
                matches!(bad.parse::<FillCommand>(), Err(CommandError::Parse(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
