use super::CommandError;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Discord's cap on messages per history request
const PAGE_SIZE: usize = 100;

/// Fetch the intro channel's history into the database
#[poise::command(slash_command, prefix_command, owners_only, guild_only)]
pub async fn fetchall(
    ctx: Context<'_>,
    #[description = "Max messages to fetch (default 2000)"]
    #[min = 1]
    limit: Option<usize>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;
    let guild = guild_id.get();
    let data = ctx.data();
    let limit = limit.unwrap_or(data.config.backfill_default_limit);

    let intro_channel = data
        .guild_config
        .get_intro_channel(guild)
        .await?
        .ok_or(CommandError::IntroChannelUnset)?;

    let status = ctx
        .say("Getting history... (this might take a while)")
        .await?;
    let history = fetch_history(ctx.http(), serenity::ChannelId::new(intro_channel), limit).await?;

    status
        .edit(
            ctx,
            poise::CreateReply::default().content("History gotten, beginning processing..."),
        )
        .await?;

    let mut batch = data.ledger.begin_batch(guild);
    batch.ingest(backfill_records(&history));
    if batch.is_empty() {
        status
            .edit(
                ctx,
                poise::CreateReply::default().content("Processing done! No member posts to record."),
            )
            .await?;
        return Ok(());
    }

    let staged = batch.len();
    let summary = {
        let _guard = data.guild_locks.lock(guild).await;
        batch.commit().await?
    };

    info!(
        "Backfilled guild {}: {} fetched, {} staged, {} recorded, {} already known",
        guild,
        history.len(),
        staged,
        summary.inserted,
        summary.duplicates
    );

    status
        .edit(
            ctx,
            poise::CreateReply::default().content(format!(
                "Processing done! Recorded `{}` posts (`{}` were already known). Enjoy your new database!",
                summary.inserted, summary.duplicates
            )),
        )
        .await?;
    Ok(())
}

/// Page through a channel from its first message, oldest first.
async fn fetch_history(
    http: &serenity::Http,
    channel: serenity::ChannelId,
    limit: usize,
) -> Result<Vec<serenity::Message>, serenity::Error> {
    let mut messages: Vec<serenity::Message> = Vec::new();
    let mut after = serenity::MessageId::new(1);

    while messages.len() < limit {
        let page_size = (limit - messages.len()).min(PAGE_SIZE) as u8;
        let mut page = channel
            .messages(http, serenity::GetMessages::new().after(after).limit(page_size))
            .await?;
        page.sort_by_key(|m| m.id);

        let Some(last) = page.last() else {
            break;
        };
        after = last.id;
        messages.extend(page);
    }

    Ok(messages)
}

/// `(user, message)` pairs in channel order, without bot posts.
pub fn backfill_records(messages: &[serenity::Message]) -> Vec<(u64, u64)> {
    messages
        .iter()
        .filter(|m| !m.author.bot)
        .map(|m| (m.author.id.get(), m.id.get()))
        .collect()
}
