use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};

use crate::common::{Domain, Error};
use crate::query_engine::JoinType;

/// One user action, as typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load {
        path: PathBuf,
        name: Option<String>,
        domain: Option<Domain>,
        alias: Option<String>,
    },
    Connect {
        view: String,
        domain: Option<Domain>,
    },
    Tables,
    Show {
        table: String,
        limit: Option<usize>,
    },
    Describe {
        table: String,
    },
    Suggest {
        left: String,
        right: String,
    },
    Join {
        left: String,
        right: String,
        keys: Option<(String, String)>,
        join_type: JoinType,
        name: Option<String>,
    },
    Report {
        table: String,
    },
    Values {
        column: String,
    },
    Filter {
        column: String,
        values: Vec<String>,
    },
    ClearFilter,
    Group {
        by: String,
        metric: Option<String>,
    },
    ClearGroup,
    Metric(Option<String>),
    Select(BTreeSet<usize>),
    Export {
        path: Option<PathBuf>,
    },
    Help,
    Quit,
}

pub const HELP: &str = "\
load <path> [as <name>] [domain <domain>] [alias <alias>]
connect <view> [domain <domain>]
tables
show <table> [<rows>]
describe <table>
suggest <left> <right>
join <left> <right> [on <left key> <right key>] [type inner|left|right|outer] [as <name>]
report <table>
values <column>
filter <column> [<value>...] | filter none
group <column> [sum <metric>] | group none
metric <column> | metric none
select <row>... | select none
export [<path>]
help
quit

Quote names containing spaces, -- or /*: 'Sales 2024' or \"Sales 2024\".";

// A word of user input. Quoted words never act as keywords.
#[derive(Debug, Clone, PartialEq)]
struct Arg {
    text: String,
    quoted: bool,
}

impl Arg {
    fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Splits a line into words with the SQL tokenizer, so quoting and numbers
/// behave as users expect. Adjacent tokens with no whitespace between them
/// form one word, which keeps paths like `data/budget.csv` together.
fn split_words(line: &str) -> Result<VecDeque<Arg>, Error> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, line)
        .tokenize()
        .map_err(|err| Error::ParseError(err.to_string()))?;

    let mut words = VecDeque::new();
    let mut current: Option<Arg> = None;
    for token in tokens {
        let (text, quoted) = match token {
            Token::Whitespace(Whitespace::SingleLineComment { prefix, .. }) => {
                return Err(comment_error(&prefix));
            }
            Token::Whitespace(Whitespace::MultiLineComment(_)) => {
                return Err(comment_error("/*"));
            }
            Token::Whitespace(_) | Token::EOF => {
                words.extend(current.take());
                continue;
            }
            Token::Word(word) => (word.value, word.quote_style.is_some()),
            Token::SingleQuotedString(text) => (text, true),
            other => (other.to_string(), false),
        };
        match current.as_mut() {
            Some(arg) => {
                arg.text.push_str(&text);
                arg.quoted |= quoted;
            }
            None => current = Some(Arg { text, quoted }),
        }
    }
    words.extend(current);
    Ok(words)
}

fn comment_error(marker: &str) -> Error {
    Error::ParseError(format!(
        "'{}' would start a comment; quote the word that contains it",
        marker.trim()
    ))
}

struct Args {
    command: String,
    words: VecDeque<Arg>,
}

impl Args {
    fn required(&mut self, what: &str) -> Result<String, Error> {
        self.words
            .pop_front()
            .map(|arg| arg.text)
            .ok_or_else(|| Error::ParseError(format!("{}: missing {}", self.command, what)))
    }

    fn optional(&mut self) -> Option<String> {
        self.words.pop_front().map(|arg| arg.text)
    }

    fn next_is(&self, keyword: &str) -> bool {
        self.words.front().map_or(false, |arg| arg.is_keyword(keyword))
    }

    fn rest(&mut self) -> Vec<String> {
        self.words.drain(..).map(|arg| arg.text).collect()
    }

    // Consumes `<keyword> <value>` pairs in any order.
    fn options(&mut self, allowed: &[&str]) -> Result<Vec<(String, Vec<String>)>, Error> {
        let mut options = Vec::new();
        while let Some(arg) = self.words.pop_front() {
            let keyword = arg.text.to_ascii_lowercase();
            if arg.quoted || !allowed.contains(&keyword.as_str()) {
                return Err(Error::ParseError(format!(
                    "{}: unexpected '{}'",
                    self.command, arg.text
                )));
            }
            let arity = if keyword == "on" { 2 } else { 1 };
            let mut values = Vec::with_capacity(arity);
            for _ in 0..arity {
                values.push(self.required(&format!("value after {}", keyword))?);
            }
            options.push((keyword, values));
        }
        Ok(options)
    }

    fn finish(&self) -> Result<(), Error> {
        match self.words.front() {
            Some(arg) => Err(Error::ParseError(format!(
                "{}: unexpected '{}'",
                self.command, arg.text
            ))),
            None => Ok(()),
        }
    }
}

fn parse_number(command: &str, raw: &str) -> Result<usize, Error> {
    raw.parse()
        .map_err(|_| Error::ParseError(format!("{}: '{}' is not a row number", command, raw)))
}

/// Parses one prompt line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, Error> {
    let mut words = split_words(line)?;
    let Some(head) = words.pop_front() else {
        return Ok(None);
    };
    let command = head.text.to_ascii_lowercase();
    let mut args = Args {
        command: command.clone(),
        words,
    };

    let parsed = match command.as_str() {
        "load" => {
            let path = PathBuf::from(args.required("file path")?);
            let (mut name, mut domain, mut alias) = (None, None, None);
            for (keyword, mut values) in args.options(&["as", "domain", "alias"])? {
                let value = values.remove(0);
                match keyword.as_str() {
                    "as" => name = Some(value),
                    "domain" => domain = Some(value.parse()?),
                    _ => alias = Some(value),
                }
            }
            Command::Load {
                path,
                name,
                domain,
                alias,
            }
        }
        "connect" => {
            let view = args.required("view name")?;
            let mut domain = None;
            for (_, mut values) in args.options(&["domain"])? {
                domain = Some(values.remove(0).parse()?);
            }
            Command::Connect { view, domain }
        }
        "tables" => Command::Tables,
        "show" => {
            let table = args.required("table name")?;
            let limit = match args.optional() {
                Some(raw) => Some(parse_number("show", &raw)?),
                None => None,
            };
            Command::Show { table, limit }
        }
        "describe" => Command::Describe {
            table: args.required("table name")?,
        },
        "suggest" => Command::Suggest {
            left: args.required("left table")?,
            right: args.required("right table")?,
        },
        "join" => {
            let left = args.required("left table")?;
            let right = args.required("right table")?;
            let (mut keys, mut join_type, mut name) = (None, JoinType::default(), None);
            for (keyword, mut values) in args.options(&["on", "type", "as"])? {
                match keyword.as_str() {
                    "on" => {
                        let right_key = values.remove(1);
                        keys = Some((values.remove(0), right_key));
                    }
                    "type" => join_type = values.remove(0).parse()?,
                    _ => name = Some(values.remove(0)),
                }
            }
            Command::Join {
                left,
                right,
                keys,
                join_type,
                name,
            }
        }
        "report" => Command::Report {
            table: args.required("table name")?,
        },
        "values" => Command::Values {
            column: args.required("column name")?,
        },
        "filter" => {
            if args.next_is("none") {
                args.words.pop_front();
                Command::ClearFilter
            } else {
                let column = args.required("column name or none")?;
                Command::Filter {
                    column,
                    values: args.rest(),
                }
            }
        }
        "group" => {
            if args.next_is("none") {
                args.words.pop_front();
                Command::ClearGroup
            } else {
                let by = args.required("column name or none")?;
                let metric = if args.next_is("sum") {
                    args.words.pop_front();
                    Some(args.required("metric column")?)
                } else {
                    None
                };
                Command::Group { by, metric }
            }
        }
        "metric" => {
            if args.next_is("none") {
                args.words.pop_front();
                Command::Metric(None)
            } else {
                Command::Metric(Some(args.required("column name or none")?))
            }
        }
        "select" => {
            if args.next_is("none") {
                args.words.pop_front();
                Command::Select(BTreeSet::new())
            } else {
                let rows = args.rest();
                if rows.is_empty() {
                    return Err(Error::ParseError("select: missing row numbers or none".into()));
                }
                let selected = rows
                    .iter()
                    .map(|raw| parse_number("select", raw))
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Command::Select(selected)
            }
        }
        "export" => Command::Export {
            path: args.optional().map(PathBuf::from),
        },
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(Error::ParseError(format!(
                "Unknown command '{}', type help for the list",
                other
            )))
        }
    };
    args.finish()?;
    Ok(Some(parsed))
}
