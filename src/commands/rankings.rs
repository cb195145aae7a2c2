use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub const NAME: &str = "rankings";
pub const VIEW_OPTION: &str = "view";
pub const FORMAT_OPTION: &str = "format";

pub fn create_rankings_command(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name(NAME)
        .description("Show the current nomination rankings")
        .create_option(|option| {
            option
                .name(VIEW_OPTION)
                .description("Order by weighted score or by raw vote count")
                .kind(CommandOptionType::String)
                .add_string_choice("Weighted score", "score")
                .add_string_choice("Vote count", "votes")
                .required(false)
        })
        .create_option(|option| {
            option
                .name(FORMAT_OPTION)
                .description("How to deliver the results")
                .kind(CommandOptionType::String)
                .add_string_choice("Summary", "summary")
                .add_string_choice("JSON", "json")
                .add_string_choice("Legacy JSON (counts only)", "legacy")
                .required(false)
        })
}
