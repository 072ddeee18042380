use std::ffi::OsString;

use clap::{error::ErrorKind, CommandFactory, Parser};

use dmon_core::domain::ChatId;

#[derive(Parser, Debug)]
#[command(
    name = "dmon",
    version,
    about = "Device monitoring via Telegram bot",
    override_usage = "dmon --token <TOKEN> --chatid <CHAT_ID>\n       dmon -stop"
)]
struct Args {
    /// Telegram bot token
    #[arg(short = 't', long)]
    token: Option<String>,

    /// Telegram chat id (negative for groups)
    #[arg(short = 'c', long = "chatid", allow_hyphen_values = true)]
    chat_id: Option<i64>,

    /// Ask a running monitor to stop, then exit
    #[arg(long)]
    stop: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Stop,
    Run { token: String, chat_id: ChatId },
}

/// Parse the process arguments. `-stop` is accepted as a spelling of `--stop`.
pub fn parse<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = args.into_iter().map(|a| {
        let a: OsString = a.into();
        if a == "-stop" {
            OsString::from("--stop")
        } else {
            a
        }
    });
    let parsed = Args::try_parse_from(args)?;

    if parsed.stop {
        return Ok(Invocation::Stop);
    }

    match (parsed.token, parsed.chat_id) {
        (Some(token), Some(chat_id)) if !token.trim().is_empty() => Ok(Invocation::Run {
            token,
            chat_id: ChatId(chat_id),
        }),
        _ => Err(Args::command().error(
            ErrorKind::MissingRequiredArgument,
            "Both --token and --chatid are required to start monitoring.",
        )),
    }
}
