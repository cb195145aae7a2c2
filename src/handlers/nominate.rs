use crate::ballot::submit_ballot;
use crate::db::VoteStore;
use crate::error::{SubmitError, SERVER_ERROR_MESSAGE};
use crate::models::SubmitReceipt;
use log::{error, info};
use serenity::model::application::component::{ActionRow, ActionRowComponent, InputTextStyle};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::*;

pub const MODAL_ID: &str = "nominate_modal";
const NAME_FIELD: &str = "voter_name";
const NOMINEES_FIELD: &str = "nominees";

// The name is pre-filled but stays free text
pub async fn open_nomination_modal(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let suggested_name = command.user.name.clone();

    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::Modal)
                .interaction_response_data(|modal| {
                    modal
                        .custom_id(MODAL_ID)
                        .title("Cast your nominations")
                        .components(|components| {
                            components
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id(NAME_FIELD)
                                            .label("Your name")
                                            .style(InputTextStyle::Short)
                                            .value(&suggested_name)
                                            .required(true)
                                    })
                                })
                                .create_action_row(|row| {
                                    row.create_input_text(|input| {
                                        input
                                            .custom_id(NOMINEES_FIELD)
                                            .label("Nominees, one per line")
                                            .style(InputTextStyle::Paragraph)
                                            .required(true)
                                    })
                                })
                        })
                })
        })
        .await?;

    Ok(())
}

fn input_value<'a>(rows: &'a [ActionRow], custom_id: &str) -> Option<&'a str> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == custom_id => Some(input.value.as_str()),
            _ => None,
        })
}

fn receipt_message(receipt: &SubmitReceipt) -> String {
    format!("Recorded {} nomination(s) for {}.", receipt.votes, receipt.voter)
}

pub async fn handle_nomination_submit(
    store: &dyn VoteStore,
    ctx: &Context,
    modal: &ModalSubmitInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Received nomination form from user {}", modal.user.id);

    let name = input_value(&modal.data.components, NAME_FIELD).unwrap_or_default();
    let text = input_value(&modal.data.components, NOMINEES_FIELD).unwrap_or_default();

    let reply = match submit_ballot(store, name, text).await {
        Ok(receipt) => receipt_message(&receipt),
        Err(SubmitError::Store(e)) => {
            error!("Failed to store nominations: {}", e);
            SERVER_ERROR_MESSAGE.to_string()
        }
        Err(e) => e.user_message(),
    };

    modal
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message
                        .content(&reply)
                        .ephemeral(true)
                        .allowed_mentions(|mentions| mentions.empty_parse())
                })
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_mentions_count_and_voter() {
        let receipt = SubmitReceipt {
            voter: "Ada".to_string(),
            votes: 3,
        };
        assert_eq!(receipt_message(&receipt), "Recorded 3 nomination(s) for Ada.");
    }
}
