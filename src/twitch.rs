//! Twitch chat over anonymous (or token-authenticated) IRC
//!
//! The worker joins one channel, normalizes every PRIVMSG into a
//! [`ChatEntry`] and hands it to the consumer over an mpsc channel. Drops
//! are retried every five seconds until the consumer goes away.

use std::collections::HashMap;

use rand::Rng;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpStream},
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{sleep, Duration},
};

use crate::types::ChatEntry;

const IRC_HOST: &str = "irc.chat.twitch.tv";
const IRC_PORT: u16 = 6667;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("chat connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("chat server closed the connection")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub channel: String,
    /// Anonymous `justinfanNNNNN` when unset
    pub nick: Option<String>,
    /// OAuth token for `nick`, without the `oauth:` prefix
    pub token: Option<String>,
}

#[derive(Debug, PartialEq)]
struct ParsedPrivmsg {
    display_name: Option<String>,
    login: String,
    text: String,
}

pub fn spawn_chat_worker(config: TwitchConfig, tx: UnboundedSender<ChatEntry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        run_chat_loop(config, tx).await;
    })
}

async fn run_chat_loop(config: TwitchConfig, tx: UnboundedSender<ChatEntry>) {
    let channel = normalize_channel(&config.channel);
    if channel.is_empty() {
        tracing::warn!("Chat worker started without a channel; not connecting");
        return;
    }

    let nick = config
        .nick
        .as_deref()
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(random_justinfan_nick);
    tracing::info!("Starting chat worker for #{} as {}", channel, nick);

    loop {
        match run_chat_session(&channel, &nick, config.token.as_deref(), &tx).await {
            Ok(()) => {
                tracing::info!("Chat consumer dropped; stopping chat worker");
                return;
            }
            Err(e) => {
                tracing::warn!("Chat for #{} dropped: {}", channel, e);
            }
        }

        tracing::info!("Reconnecting to #{} in {}s", channel, RECONNECT_DELAY.as_secs());
        sleep(RECONNECT_DELAY).await;
    }
}

async fn run_chat_session(
    channel: &str,
    nick: &str,
    token: Option<&str>,
    tx: &UnboundedSender<ChatEntry>,
) -> Result<(), TransportError> {
    let stream = TcpStream::connect((IRC_HOST, IRC_PORT)).await?;
    let (read_half, mut write_half) = stream.into_split();

    write_line(&mut write_half, "CAP REQ :twitch.tv/tags twitch.tv/commands").await?;
    let pass = match token {
        Some(token) => format!("PASS oauth:{}", token.trim_start_matches("oauth:")),
        None => "PASS oauth:kappa".to_string(),
    };
    write_line(&mut write_half, &pass).await?;
    write_line(&mut write_half, &format!("NICK {nick}")).await?;
    write_line(&mut write_half, &format!("JOIN #{channel}")).await?;

    let mut lines = BufReader::new(read_half).lines();
    tracing::info!("Connected to #{}", channel);

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if let Some(token) = line.strip_prefix("PING ") {
            write_line(&mut write_half, &format!("PONG {token}")).await?;
            continue;
        }
        let Some(msg) = parse_privmsg(line, channel) else {
            continue;
        };
        // Lines we send ourselves come back with our own login
        if msg.login == nick {
            continue;
        }

        let entry = ChatEntry::from_parts(
            msg.display_name.as_deref(),
            Some(msg.login.as_str()),
            msg.text,
            chrono::Utc::now().timestamp_millis(),
        );
        if tx.send(entry).is_err() {
            // Consumer is gone
            return Ok(());
        }
    }
    Err(TransportError::Closed)
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> Result<(), TransportError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    Ok(())
}

fn parse_privmsg(line: &str, expected_channel: &str) -> Option<ParsedPrivmsg> {
    let (tags, payload) = parse_irc_tags(line);
    let mut parts = payload.splitn(4, ' ');
    let prefix = parts.next()?;
    let command = parts.next()?;
    let target = parts.next()?;
    let trailing = parts.next()?;

    if !prefix.starts_with(':') || command != "PRIVMSG" {
        return None;
    }
    if normalize_channel(target) != expected_channel {
        return None;
    }

    let login = prefix[1..]
        .split('!')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let text = trailing.strip_prefix(':').unwrap_or(trailing);
    let display_name = tags
        .get("display-name")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Some(ParsedPrivmsg {
        display_name,
        login,
        text: text.to_owned(),
    })
}

fn parse_irc_tags(line: &str) -> (HashMap<String, String>, &str) {
    let Some(stripped) = line.strip_prefix('@') else {
        return (HashMap::new(), line);
    };
    let Some((tags_part, payload)) = stripped.split_once(' ') else {
        return (HashMap::new(), line);
    };

    let tags = tags_part
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_owned(), decode_irc_tag_value(value)))
        .collect();
    (tags, payload)
}

fn decode_irc_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some(':') => out.push(';'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn normalize_channel(value: &str) -> String {
    value.trim().trim_start_matches('#').to_ascii_lowercase()
}

fn random_justinfan_nick() -> String {
    format!("justinfan{}", rand::rng().random_range(10000..100000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FALLBACK_CHAT_USER;

    #[test]
    fn test_parses_privmsg_with_display_name() {
        let line = "@display-name=Quizzer;color=#1E90FF;user-id=1 :quizzer!quizzer@quizzer.tmi.twitch.tv PRIVMSG #QuizNight :B for sure";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        assert_eq!(parsed.display_name.as_deref(), Some("Quizzer"));
        assert_eq!(parsed.login, "quizzer");
        assert_eq!(parsed.text, "B for sure");
    }

    #[test]
    fn test_display_name_escapes_decoded() {
        let line = "@display-name=Big\\sFan :bigfan!bigfan@bigfan.tmi.twitch.tv PRIVMSG #quiznight :A";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        assert_eq!(parsed.display_name.as_deref(), Some("Big Fan"));
    }

    #[test]
    fn test_rejects_wrong_channel() {
        let line = ":foo!foo@foo.tmi.twitch.tv PRIVMSG #other :hello";
        assert!(parse_privmsg(line, "expected").is_none());
    }

    #[test]
    fn test_ignores_other_commands() {
        assert!(parse_privmsg(":tmi.twitch.tv 001 justinfan1 :Welcome, GLHF!", "x").is_none());
        assert!(parse_privmsg(
            ":foo!foo@foo.tmi.twitch.tv JOIN #quiznight",
            "quiznight"
        )
        .is_none());
    }

    #[test]
    fn test_text_kept_verbatim() {
        let line = ":foo!foo@foo.tmi.twitch.tv PRIVMSG #quiznight : b ";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        assert_eq!(parsed.text, " b ");

        // Whitespace-only lines still count as the speaker talking
        let line = ":foo!foo@foo.tmi.twitch.tv PRIVMSG #quiznight :   ";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        assert_eq!(parsed.text, "   ");
        assert_eq!(parsed.login, "foo");
    }

    #[test]
    fn test_identity_fallbacks() {
        let line = "@display-name= :viewer42!viewer42@viewer42.tmi.twitch.tv PRIVMSG #quiznight :C";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        let entry = ChatEntry::from_parts(
            parsed.display_name.as_deref(),
            Some(parsed.login.as_str()),
            parsed.text,
            0,
        );
        assert_eq!(entry.user, "viewer42");

        let line = ":!@host PRIVMSG #quiznight :D";
        let parsed = parse_privmsg(line, "quiznight").unwrap();
        let entry = ChatEntry::from_parts(None, Some(parsed.login.as_str()), parsed.text, 0);
        assert_eq!(entry.user, FALLBACK_CHAT_USER);
    }

    #[test]
    fn test_decodes_irc_tag_escapes() {
        assert_eq!(decode_irc_tag_value("A\\sB\\:C\\\\D"), "A B;C\\D");
    }

    #[test]
    fn test_normalizes_channel_names() {
        assert_eq!(normalize_channel("#QuizNight "), "quiznight");
    }

    #[test]
    fn test_anonymous_nick_shape() {
        let nick = random_justinfan_nick();
        let digits = nick.strip_prefix("justinfan").unwrap();
        assert_eq!(digits.len(), 5);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
