//! Argument parsing
//!
//! `etsy-cli [--config <path>] <command> [args...]`

use crate::error::{Error, Result};

pub const USAGE: &str = "\
usage: etsy-cli [--config <path>] <command>

commands:
  authorize-url                    print a consent URL with a fresh PKCE verifier and state
  exchange <code> <verifier>       trade an authorization code for tokens
  listing <listing_id>             fetch one listing
  receipts <shop_id> [limit]       fetch a page of shop receipts
  receipt <shop_id> <receipt_id>   fetch one receipt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AuthorizeUrl,
    Exchange { code: String, verifier: String },
    Listing { listing_id: i64 },
    Receipts { shop_id: i64, limit: Option<u32> },
    Receipt { shop_id: i64, receipt_id: i64 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config_path: Option<String>,
    pub command: Command,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config_path = None;
        let mut positional = Vec::new();
        let mut iter = args.into_iter().map(Into::into);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => config_path = Some(iter.next().ok_or(Error::MissingConfigPath)?),
                "-h" | "--help" | "help" => {
                    return Ok(Self {
                        config_path,
                        command: Command::Help,
                    });
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let name = positional.next().ok_or(Error::MissingCommand)?;
        let command = match name.as_str() {
            "authorize-url" => Command::AuthorizeUrl,
            "exchange" => Command::Exchange {
                code: required(&mut positional, "exchange", "code")?,
                verifier: required(&mut positional, "exchange", "verifier")?,
            },
            "listing" => Command::Listing {
                listing_id: number(&required(&mut positional, "listing", "listing_id")?, "listing_id")?,
            },
            "receipts" => Command::Receipts {
                shop_id: number(&required(&mut positional, "receipts", "shop_id")?, "shop_id")?,
                limit: positional
                    .next()
                    .map(|limit| number(&limit, "limit"))
                    .transpose()?,
            },
            "receipt" => Command::Receipt {
                shop_id: number(&required(&mut positional, "receipt", "shop_id")?, "shop_id")?,
                receipt_id: number(&required(&mut positional, "receipt", "receipt_id")?, "receipt_id")?,
            },
            _ => return Err(Error::UnknownCommand(name)),
        };

        if let Some(arg) = positional.next() {
            return Err(Error::UnexpectedArgument {
                command: command.name(),
                arg,
            });
        }

        Ok(Self {
            config_path,
            command,
        })
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AuthorizeUrl => "authorize-url",
            Command::Exchange { .. } => "exchange",
            Command::Listing { .. } => "listing",
            Command::Receipts { .. } => "receipts",
            Command::Receipt { .. } => "receipt",
            Command::Help => "help",
        }
    }
}

fn required(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String> {
    args.next().ok_or(Error::MissingArgument { command, name })
}

fn number<T: std::str::FromStr>(value: &str, name: &'static str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
