use crate::{deletions, intake, Data, Error};
use poise::serenity_prelude as serenity;

/// Gateway events the bot reacts to. Everything else is ignored.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            intake::handle_message(ctx, new_message, data).await
        }
        serenity::FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            guild_id,
        } => deletions::handle_delete(ctx, *channel_id, *deleted_message_id, *guild_id, data).await,
        serenity::FullEvent::MessageDeleteBulk {
            channel_id,
            multiple_deleted_messages_ids,
            guild_id,
        } => {
            deletions::handle_bulk_delete(
                ctx,
                *channel_id,
                multiple_deleted_messages_ids,
                *guild_id,
                data,
            )
            .await
        }
        _ => Ok(()),
    }
}
