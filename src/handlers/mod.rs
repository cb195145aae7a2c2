mod nominate;
mod rankings;

use crate::commands;
use crate::db::VoteStore;
use log::{error, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::prelude::*;

// Handle slash commands
pub async fn handle_command(
    store: &dyn VoteStore,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Received command: {}", command.data.name);
    match command.data.name.as_str() {
        commands::nominate::NAME => nominate::open_nomination_modal(ctx, command).await?,
        commands::rankings::NAME => rankings::handle_rankings_command(store, ctx, command).await?,
        _ => {
            warn!("Unknown command: {}", command.data.name);
            command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| message.content("Unknown command").ephemeral(true))
                })
                .await?;
        }
    }
    Ok(())
}

// Handle submitted forms
pub async fn handle_modal(
    store: &dyn VoteStore,
    ctx: &Context,
    modal: &ModalSubmitInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match modal.data.custom_id.as_str() {
        nominate::MODAL_ID => nominate::handle_nomination_submit(store, ctx, modal).await?,
        _ => {
            warn!("Unhandled modal custom_id: {}", modal.data.custom_id);
            modal
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| message.content("Unknown form").ephemeral(true))
                })
                .await?;
        }
    }
    Ok(())
}

pub async fn handle_interaction(store: &dyn VoteStore, ctx: &Context, interaction: Interaction) {
    let result = match interaction {
        Interaction::ApplicationCommand(command) => handle_command(store, ctx, &command).await,
        Interaction::ModalSubmit(modal) => handle_modal(store, ctx, &modal).await,
        _ => {
            warn!("Unhandled interaction type: {:?}", interaction.kind());
            Ok(())
        }
    };

    if let Err(why) = result {
        error!("Interaction handler error: {:?}", why);
    }
}
