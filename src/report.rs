//! Moderation log embeds and the message link lists they carry.

use crate::config::DISCORD_FIELD_LIMIT;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

pub const EXCEEDED_COLOUR: u32 = 0x00FF00;
pub const DELETED_COLOUR: u32 = 0xFF0000;
pub const INFO_COLOUR: u32 = 0xFFFF00;

const DELETED_NOTE: &str = "A message was deleted, and it was removed from the database.";
const DEAD_LINK_LABEL: &str = "Link to message (won't work)";

/// Footer stamped on every report. Resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReportFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

impl ReportFooter {
    pub fn to_embed_footer(&self) -> serenity::CreateEmbedFooter {
        let footer = serenity::CreateEmbedFooter::new(&self.text);
        match &self.icon_url {
            Some(url) => footer.icon_url(url),
            None => footer,
        }
    }
}

pub fn message_link(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!("https://discord.com/channels/{guild_id}/{channel_id}/{message_id}")
}

fn numbered_link(index: usize, guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "[{}: {}]({})\n",
        index,
        message_id,
        message_link(guild_id, channel_id, message_id)
    )
}

/// One markdown link per line, numbered from 1 in post order.
pub fn format_message_links(guild_id: u64, channel_id: u64, message_ids: &[u64]) -> String {
    message_ids
        .iter()
        .enumerate()
        .map(|(i, id)| numbered_link(i + 1, guild_id, channel_id, *id))
        .collect()
}

/// A user's full link list, plus whether it is too long to inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLinks {
    pub text: String,
    pub oversized: bool,
}

impl MessageLinks {
    pub fn build(guild_id: u64, channel_id: u64, message_ids: &[u64], inline_limit: usize) -> Self {
        let text = format_message_links(guild_id, channel_id, message_ids);
        let oversized = text.chars().count() > inline_limit;
        Self { text, oversized }
    }

    /// The full list, or `fallback` when it has to go in a file.
    pub fn inline_or(&self, fallback: impl FnOnce() -> String) -> String {
        if self.oversized {
            fallback()
        } else {
            self.text.clone()
        }
    }

    pub fn attachment(&self, user_id: u64) -> Option<serenity::CreateAttachment> {
        self.oversized.then(|| {
            serenity::CreateAttachment::bytes(self.text.clone().into_bytes(), format!("{user_id}.txt"))
        })
    }
}

/// Shown inline instead of an oversized list in a violation report.
pub fn latest_link_note(total: usize, guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "{}Rest is in file",
        numbered_link(total, guild_id, channel_id, message_id)
    )
}

/// Split text into field-sized chunks on line boundaries.
pub fn split_field(value: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in value.lines() {
        let line_len = line.chars().count();
        if current_len > 0 && current_len + 1 + line_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Add `value` as one or more consecutive fields.
pub fn add_split_field(mut embed: serenity::CreateEmbed, name: &str, value: &str) -> serenity::CreateEmbed {
    let chunks = split_field(value, DISCORD_FIELD_LIMIT);
    if chunks.is_empty() {
        return embed.field(name, "-", false);
    }

    for (i, chunk) in chunks.into_iter().enumerate() {
        let field_name = if i == 0 {
            name.to_string()
        } else {
            format!("{name} (cont.)")
        };
        embed = embed.field(field_name, chunk, false);
    }
    embed
}

fn truncate_field(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "*(no text)*".to_string();
    }
    let mut out: String = trimmed.chars().take(DISCORD_FIELD_LIMIT - 3).collect();
    if trimmed.chars().count() > DISCORD_FIELD_LIMIT - 3 {
        out.push_str("...");
    }
    out
}

pub fn exceeded_embed(
    author: &serenity::User,
    total: usize,
    channel_id: u64,
    links: &str,
    timestamp: serenity::Timestamp,
    footer: &ReportFooter,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .title("Messages Exceeded")
        .description(format!(
            "`{}` **|** `{}`\nThis user has sent `{}` messages in <#{}>",
            author.tag(),
            author.id,
            total,
            channel_id
        ))
        .colour(EXCEEDED_COLOUR);

    add_split_field(embed, "Message links", links)
        .thumbnail(author.face())
        .timestamp(timestamp)
        .footer(footer.to_embed_footer())
}

/// Deletion of a message we still had in the local cache.
pub fn deleted_embed(message: &serenity::Message, guild_id: u64, footer: &ReportFooter) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("Message Deleted")
        .description(format!(
            "`{}` **|** `{}`\n{}",
            message.author.tag(),
            message.author.id,
            DELETED_NOTE
        ))
        .colour(DELETED_COLOUR)
        .field("Content", truncate_field(&message.content), false);

    if !message.attachments.is_empty() {
        let urls: Vec<&str> = message.attachments.iter().map(|a| a.url.as_str()).collect();
        embed = add_split_field(embed, "Attachments", &urls.join("\n"));
    }

    embed
        .field(
            "Link",
            format!(
                "[{}]({})",
                DEAD_LINK_LABEL,
                message_link(guild_id, message.channel_id.get(), message.id.get())
            ),
            false,
        )
        .thumbnail(message.author.face())
        .timestamp(message.timestamp)
        .footer(footer.to_embed_footer())
}

/// Deletion resolved through the reverse index only.
pub fn deleted_uncached_embed(
    user: &serenity::User,
    guild_id: u64,
    channel_id: u64,
    message_id: u64,
    footer: &ReportFooter,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Message Deleted")
        .description(format!(
            "`{}` **|** `{}` **|** Not cached\n{}",
            user.tag(),
            user.id,
            DELETED_NOTE
        ))
        .colour(DELETED_COLOUR)
        .field(
            "Link",
            format!(
                "[{}]({})",
                DEAD_LINK_LABEL,
                message_link(guild_id, channel_id, message_id)
            ),
            false,
        )
        .thumbnail(user.face())
        .footer(footer.to_embed_footer())
}

/// Post a report to the guild's log channel, followed by the link file if any.
pub async fn send_report(
    http: impl serenity::CacheHttp,
    log_channel: Option<u64>,
    embed: serenity::CreateEmbed,
    attachment: Option<serenity::CreateAttachment>,
) -> Result<(), serenity::Error> {
    let Some(log_channel) = log_channel else {
        warn!("No log channel configured, dropping report");
        return Ok(());
    };

    let channel = serenity::ChannelId::new(log_channel);
    channel
        .send_message(&http, serenity::CreateMessage::new().embed(embed))
        .await?;
    if let Some(file) = attachment {
        channel
            .send_message(&http, serenity::CreateMessage::new().add_file(file))
            .await?;
    }

    debug!("Report sent to log channel {}", log_channel);
    Ok(())
}
